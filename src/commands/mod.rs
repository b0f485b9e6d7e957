/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint:

- `serve`: web chat server
- `chat`: interactive terminal chat

Both build the same [`SessionController`] from configuration and differ only
in the surface they drive it from.
*/

use crate::agent::LlmDataAgent;
use crate::config::Config;
use crate::error::Result;
use crate::providers::{create_provider, Provider};
use crate::services::{AssistantServices, PlantUmlRenderer};
use crate::session::SessionController;
use crate::spreadsheet::GoogleSheetsLoader;

use std::sync::Arc;

pub mod chat;
pub mod serve;
pub mod special_commands;

/// Wire the configured provider, loader, renderer and agent into a controller
///
/// # Errors
///
/// Returns error if the provider type is unknown or an HTTP client cannot
/// be built
pub fn build_controller(config: &Config) -> Result<SessionController> {
    let provider: Arc<dyn Provider> = Arc::from(create_provider(
        &config.provider.provider_type,
        &config.provider,
    )?);

    let diagram_renderer = Arc::new(PlantUmlRenderer::new(&config.diagram)?);
    let services = Arc::new(AssistantServices::new(
        Arc::clone(&provider),
        diagram_renderer,
    ));
    let loader = Arc::new(GoogleSheetsLoader::new(&config.spreadsheet)?);
    let agent = Arc::new(LlmDataAgent::new(provider, config.agent.max_prompt_rows));

    Ok(SessionController::new(
        loader,
        services,
        agent,
        config.welcome.clone(),
        config.agent.clone(),
    ))
}

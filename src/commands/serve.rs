//! Web server command handler

use super::build_controller;
use crate::config::Config;
use crate::error::{Result, SheetchatError};
use crate::web::{router, AppState, SessionRegistry};

use std::sync::Arc;
use std::time::Duration;

/// Serve the web chat until the process is stopped
///
/// # Errors
///
/// Returns error if the controller cannot be built or the address cannot be
/// bound
pub async fn run_serve(config: Config) -> Result<()> {
    let controller = Arc::new(build_controller(&config)?);
    let sessions = SessionRegistry::new(
        Duration::from_secs(config.server.session_idle_minutes * 60),
        config.server.max_sessions,
    );
    let state = AppState::new(controller, config.diagram.cache_dir.clone()).with_sessions(sessions);
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| SheetchatError::Config(format!("Cannot bind {}: {}", addr, e)))?;

    tracing::info!("Sheetchat listening on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}

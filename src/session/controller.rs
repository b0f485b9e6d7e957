//! Session lifecycle controller
//!
//! Wires the spreadsheet loader, assistant services and data agent to a
//! [`Session`]. One controller serves every session; all per-user state
//! lives in the session passed to each call.

use super::dispatch::{dispatch, DispatchOutcome};
use super::state::Session;
use super::welcome::WelcomeSequence;
use crate::agent::DataAgent;
use crate::config::{AgentConfig, WelcomeConfig};
use crate::services::AssistantServices;
use crate::spreadsheet::SpreadsheetLoader;

use std::sync::Arc;

/// Drives sessions through load, welcome and question turns
pub struct SessionController {
    loader: Arc<dyn SpreadsheetLoader>,
    services: Arc<AssistantServices>,
    agent: Arc<dyn DataAgent>,
    welcome: WelcomeConfig,
    agent_options: AgentConfig,
}

impl SessionController {
    pub fn new(
        loader: Arc<dyn SpreadsheetLoader>,
        services: Arc<AssistantServices>,
        agent: Arc<dyn DataAgent>,
        welcome: WelcomeConfig,
        agent_options: AgentConfig,
    ) -> Self {
        Self {
            loader,
            services,
            agent,
            welcome,
            agent_options,
        }
    }

    /// Reset the session and load the spreadsheet behind `url`
    ///
    /// Load errors are logged and swallowed; the session ends up `Empty`
    /// with the fixed load warning. Returns whether the load succeeded.
    pub async fn submit_url(&self, session: &mut Session, url: &str) -> bool {
        session.begin_load();
        tracing::info!("Loading spreadsheet from {}", url);

        match self.loader.load(url).await {
            Ok(dataset) => {
                session.load_succeeded(dataset);
                true
            }
            Err(e) => {
                tracing::warn!("Spreadsheet load failed: {:#}", e);
                session.load_failed();
                false
            }
        }
    }

    /// Bring the session up to date before it is displayed
    ///
    /// Runs the welcome sequence when a dataset was loaded and not yet
    /// introduced. Safe to call on every redraw. Returns whether the welcome
    /// sequence ran.
    pub async fn refresh(&self, session: &mut Session) -> bool {
        WelcomeSequence::new(&self.services, &self.welcome)
            .run(session)
            .await
    }

    /// Dispatch a free-text question
    pub async fn dispatch(&self, session: &mut Session, prompt: &str) -> DispatchOutcome {
        self.refresh(session).await;
        dispatch(
            session,
            self.agent.as_ref(),
            &self.services,
            self.agent_options.rewrite_answers,
            prompt,
        )
        .await
    }

    /// Select a suggested question by key; see [`Session::select_suggestion`]
    pub fn select_suggestion(&self, session: &mut Session, key: &str) -> bool {
        match session.select_suggestion(key) {
            Some(question) => {
                tracing::debug!("Selected suggestion: {}", question);
                true
            }
            None => {
                tracing::debug!("Ignoring unknown suggestion key {}", key);
                false
            }
        }
    }

    /// Dispatch the pending selected question, if any
    pub async fn dispatch_pending(&self, session: &mut Session) -> Option<DispatchOutcome> {
        let question = session.take_pending_question()?;
        Some(self.dispatch(session, &question).await)
    }
}

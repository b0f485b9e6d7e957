//! Data agent module for Sheetchat
//!
//! The data agent answers natural-language questions about a [`Dataset`].
//! Answers are never returned directly: the agent delivers each result to a
//! [`ResultHandler`], which decides how the answer enters the conversation.

pub mod llm;

pub use llm::LlmDataAgent;

use crate::dataset::{Dataset, Table};
use crate::error::Result;
use crate::session::ImageRef;

use async_trait::async_trait;

/// A typed answer produced by the data agent
#[derive(Debug, Clone, PartialEq)]
pub enum AgentOutput {
    /// Tabular result; column names may repeat
    Table(Table),
    /// A chart or other image
    Plot(ImageRef),
    /// A single numeric result
    Number(serde_json::Number),
    /// Free-form text
    Text(String),
}

impl AgentOutput {
    /// Short name of the result kind, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            AgentOutput::Table(_) => "table",
            AgentOutput::Plot(_) => "plot",
            AgentOutput::Number(_) => "number",
            AgentOutput::Text(_) => "text",
        }
    }
}

/// Receives results from a [`DataAgent`]
#[async_trait]
pub trait ResultHandler: Send {
    /// Called once per result the agent produces
    async fn on_result(&mut self, output: AgentOutput) -> Result<()>;
}

/// Answers questions about a dataset
///
/// # Examples
///
/// ```no_run
/// use async_trait::async_trait;
/// use sheetchat::agent::{AgentOutput, DataAgent, ResultHandler};
/// use sheetchat::dataset::Dataset;
/// use sheetchat::error::Result;
///
/// struct CountingAgent;
///
/// #[async_trait]
/// impl DataAgent for CountingAgent {
///     async fn chat(
///         &self,
///         dataset: &Dataset,
///         _question: &str,
///         handler: &mut dyn ResultHandler,
///     ) -> Result<()> {
///         handler.on_result(AgentOutput::Number(dataset.len().into())).await
///     }
/// }
/// ```
#[async_trait]
pub trait DataAgent: Send + Sync {
    /// Answer `question`, delivering results through `handler`
    ///
    /// # Errors
    ///
    /// Returns error if the agent fails before producing an answer
    async fn chat(
        &self,
        dataset: &Dataset,
        question: &str,
        handler: &mut dyn ResultHandler,
    ) -> Result<()>;
}

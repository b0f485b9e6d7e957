//! Prompt dispatch
//!
//! Records a question, hands it to the data agent, and turns the agent's
//! results into assistant messages through [`ChatResultHandler`].

use super::message::{Content, Role};
use super::state::{Session, NO_DATASET_WARNING};
use super::store::MessageStore;
use crate::agent::{AgentOutput, DataAgent, ResultHandler};
use crate::error::Result;
use crate::services::AssistantServices;

use async_trait::async_trait;

/// Assistant reply used when the agent produced nothing
pub const NO_ANSWER: &str = "Sorry, I could not find an answer to that question.";

/// What happened to a dispatched question
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The agent delivered at least one result
    Answered,
    /// The agent failed or delivered nothing; a "no answer" reply was appended
    NoAnswer,
    /// No dataset is loaded; nothing was recorded or sent
    NoDataset,
}

/// Result handler that appends agent results to the conversation
pub struct ChatResultHandler<'a> {
    messages: &'a mut MessageStore,
    services: &'a AssistantServices,
    question: &'a str,
    rewrite_answers: bool,
    answered: bool,
}

impl<'a> ChatResultHandler<'a> {
    pub fn new(
        messages: &'a mut MessageStore,
        services: &'a AssistantServices,
        question: &'a str,
        rewrite_answers: bool,
    ) -> Self {
        Self {
            messages,
            services,
            question,
            rewrite_answers,
            answered: false,
        }
    }

    /// Whether any result has been appended
    pub fn answered(&self) -> bool {
        self.answered
    }

    async fn friendly(&self, raw: String) -> String {
        if !self.rewrite_answers {
            return raw;
        }
        match self.services.rewrite_answer(self.question, &raw).await {
            Ok(rewritten) if !rewritten.is_empty() => rewritten,
            Ok(_) => raw,
            Err(e) => {
                tracing::warn!("Answer rewrite failed, using raw answer: {:#}", e);
                raw
            }
        }
    }
}

#[async_trait]
impl<'a> ResultHandler for ChatResultHandler<'a> {
    async fn on_result(&mut self, output: AgentOutput) -> Result<()> {
        let content = match output {
            AgentOutput::Table(mut table) => {
                if table.dedupe_columns() {
                    tracing::debug!("Renamed duplicate columns in agent table");
                }
                Content::Table(table)
            }
            AgentOutput::Plot(image) => Content::Image(image),
            AgentOutput::Number(number) => Content::Text(self.friendly(number.to_string()).await),
            AgentOutput::Text(text) => Content::Text(self.friendly(text).await),
        };

        self.messages.append(Role::Assistant, content);
        self.answered = true;
        Ok(())
    }
}

/// Send `prompt` to the agent on behalf of `session`
///
/// Without a dataset the prompt is dropped: the message log is untouched and
/// a transient warning is set. Otherwise the user message is recorded first,
/// and an agent failure appends an explicit "no answer" reply.
pub async fn dispatch(
    session: &mut Session,
    agent: &dyn DataAgent,
    services: &AssistantServices,
    rewrite_answers: bool,
    prompt: &str,
) -> DispatchOutcome {
    if session.dataset().is_none() {
        tracing::warn!("Question submitted without a dataset; ignoring");
        session.set_warning(NO_DATASET_WARNING);
        return DispatchOutcome::NoDataset;
    }

    session.clear_warning();
    session.append(Role::User, Content::Text(prompt.to_string()));
    session.set_last_question(prompt);

    let (dataset, messages) = session.dataset_and_messages();
    let Some(dataset) = dataset else {
        return DispatchOutcome::NoDataset;
    };

    let mut handler = ChatResultHandler::new(messages, services, prompt, rewrite_answers);
    let result = agent.chat(dataset, prompt, &mut handler).await;
    let answered = handler.answered();

    match result {
        Ok(()) if answered => DispatchOutcome::Answered,
        Ok(()) => {
            tracing::warn!("Agent finished without a result");
            append_no_answer(session);
            DispatchOutcome::NoAnswer
        }
        Err(e) if answered => {
            tracing::error!("Agent failed after answering: {:#}", e);
            DispatchOutcome::Answered
        }
        Err(e) => {
            tracing::error!("Agent failed to answer: {:#}", e);
            append_no_answer(session);
            DispatchOutcome::NoAnswer
        }
    }
}

fn append_no_answer(session: &mut Session) {
    session.append(Role::Assistant, Content::Text(NO_ANSWER.to_string()));
}

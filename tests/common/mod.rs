//! Shared fakes for the integration tests
//!
//! Every external collaborator of the session layer has an in-process stand
//! in here: a provider that answers by prompt type, a stub diagram renderer,
//! an in-memory spreadsheet loader and a scripted data agent.

#![allow(dead_code)]

use async_trait::async_trait;
use sheetchat::agent::{AgentOutput, DataAgent, ResultHandler};
use sheetchat::config::{AgentConfig, WelcomeConfig};
use sheetchat::dataset::{Dataset, Table};
use sheetchat::error::{Result, SheetchatError};
use sheetchat::providers::{CompletionResponse, Message, Provider};
use sheetchat::services::{AssistantServices, DiagramRenderer};
use sheetchat::session::{ImageRef, SessionController};
use sheetchat::spreadsheet::SpreadsheetLoader;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const SALES_URL: &str = "https://docs.google.com/spreadsheets/d/sales/edit";
pub const HR_URL: &str = "https://docs.google.com/spreadsheets/d/hr/edit";

pub const DIAGRAM_REPLY: &str =
    "```plantuml\n@startuml\nentity customers\nentity orders\ncustomers ||--o{ orders\n@enduml\n```";

/// Provider that answers each service prompt with a canned reply
///
/// `None` for a reply makes that service fail with a provider error.
/// With `stall_diagram` set the diagram request never completes.
#[derive(Clone)]
pub struct ScriptedProvider {
    pub stall_diagram: bool,
    pub diagram: Option<String>,
    pub fields: Option<String>,
    pub suggestions: Option<String>,
    pub rewrite: Option<String>,
    pub agent: Option<String>,
    pub prompts: Arc<Mutex<Vec<String>>>,
}

impl Default for ScriptedProvider {
    fn default() -> Self {
        Self {
            stall_diagram: false,
            diagram: Some(DIAGRAM_REPLY.to_string()),
            fields: Some(
                r#"[{"id": "customer id", "name": "customer name"},
                    {"id": "order id", "customer_id": "buyer", "total": "order value"}]"#
                    .to_string(),
            ),
            suggestions: Some(
                r#"["How many customers are there?", "What is the largest order?"]"#.to_string(),
            ),
            rewrite: Some("There are 42 of them.".to_string()),
            agent: Some(r#"{"type": "number", "value": 42}"#.to_string()),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ScriptedProvider {
    /// Every user prompt received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn reply_for(&self, messages: &[Message]) -> Option<String> {
        if messages.first().map(|m| m.role.as_str()) == Some("system") {
            return self.agent.clone();
        }

        let prompt = messages.last().map(|m| m.content.as_str()).unwrap_or("");
        if prompt.contains("ER Diagram") {
            self.diagram.clone()
        } else if prompt.starts_with("Describe the meaning") {
            self.fields.clone()
        } else if prompt.starts_with("Suggest") {
            self.suggestions.clone()
        } else if prompt.contains("is the answer of the question") {
            self.rewrite.clone()
        } else {
            None
        }
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        if let Some(last) = messages.last() {
            self.prompts.lock().unwrap().push(last.content.clone());
            if self.stall_diagram && last.content.contains("ER Diagram") {
                std::future::pending::<()>().await;
            }
        }
        match self.reply_for(messages) {
            Some(reply) => Ok(CompletionResponse::new(Message::assistant(reply))),
            None => Err(SheetchatError::Provider("scripted failure".to_string()).into()),
        }
    }
}

/// Diagram renderer returning a fixed file, or failing when `path` is `None`
pub struct StubRenderer {
    pub path: Option<PathBuf>,
    calls: AtomicUsize,
}

impl StubRenderer {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self {
            path,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DiagramRenderer for StubRenderer {
    async fn render(&self, _source: &str) -> Result<ImageRef> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.path {
            Some(path) => Ok(ImageRef::file(path.clone())),
            None => Err(SheetchatError::Diagram("renderer offline".to_string()).into()),
        }
    }
}

/// Loader serving datasets keyed by URL; unknown URLs fail
#[derive(Default)]
pub struct MemoryLoader {
    datasets: HashMap<String, Dataset>,
}

impl MemoryLoader {
    pub fn with(mut self, url: &str, dataset: Dataset) -> Self {
        self.datasets.insert(url.to_string(), dataset);
        self
    }
}

#[async_trait]
impl SpreadsheetLoader for MemoryLoader {
    async fn load(&self, url: &str) -> Result<Dataset> {
        self.datasets
            .get(url)
            .cloned()
            .ok_or_else(|| SheetchatError::SpreadsheetLoad(format!("no sheet at {}", url)).into())
    }
}

/// Agent that delivers a fixed list of outputs, then optionally fails
#[derive(Default)]
pub struct ScriptedAgent {
    pub outputs: Vec<AgentOutput>,
    pub fail: bool,
    pub questions: Mutex<Vec<String>>,
}

impl ScriptedAgent {
    pub fn answering(outputs: Vec<AgentOutput>) -> Self {
        Self {
            outputs,
            ..Self::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn questions(&self) -> Vec<String> {
        self.questions.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataAgent for ScriptedAgent {
    async fn chat(
        &self,
        _dataset: &Dataset,
        question: &str,
        handler: &mut dyn ResultHandler,
    ) -> Result<()> {
        self.questions.lock().unwrap().push(question.to_string());
        for output in &self.outputs {
            handler.on_result(output.clone()).await?;
        }
        if self.fail {
            return Err(SheetchatError::Agent("scripted agent failure".to_string()).into());
        }
        Ok(())
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Two related tables: customers and orders
pub fn sales_dataset() -> Dataset {
    Dataset::new(vec![
        Table::new(
            "customers",
            strings(&["id", "name"]),
            vec![strings(&["1", "Ada"]), strings(&["2", "Grace"])],
        ),
        Table::new(
            "orders",
            strings(&["id", "customer_id", "total"]),
            vec![strings(&["10", "1", "99.5"]), strings(&["11", "2", "12"])],
        ),
    ])
}

/// A single employees table
pub fn hr_dataset() -> Dataset {
    Dataset::new(vec![Table::new(
        "employees",
        strings(&["name", "team"]),
        vec![strings(&["Linus", "kernel"])],
    )])
}

pub fn default_loader() -> MemoryLoader {
    MemoryLoader::default()
        .with(SALES_URL, sales_dataset())
        .with(HR_URL, hr_dataset())
}

/// Welcome options with only the mandatory steps enabled
pub fn minimal_welcome() -> WelcomeConfig {
    WelcomeConfig {
        describe_fields: false,
        suggest_questions: false,
        ..WelcomeConfig::default()
    }
}

pub fn no_rewrite() -> AgentConfig {
    AgentConfig {
        rewrite_answers: false,
        ..AgentConfig::default()
    }
}

/// Controller wired to the given fakes
pub fn controller(
    provider: ScriptedProvider,
    renderer: Arc<StubRenderer>,
    agent: Arc<dyn DataAgent>,
    welcome: WelcomeConfig,
    agent_options: AgentConfig,
) -> SessionController {
    let services = Arc::new(AssistantServices::new(Arc::new(provider), renderer));
    SessionController::new(
        Arc::new(default_loader()),
        services,
        agent,
        welcome,
        agent_options,
    )
}

/// Controller with a working diagram renderer and the given agent
pub fn simple_controller(agent: Arc<dyn DataAgent>) -> SessionController {
    controller(
        ScriptedProvider::default(),
        Arc::new(StubRenderer::new(Some(PathBuf::from("cache/plantuml_img.png")))),
        agent,
        minimal_welcome(),
        no_rewrite(),
    )
}

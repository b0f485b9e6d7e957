//! LLM-backed data agent
//!
//! Sends the dataset and the question to the chat provider and classifies the
//! JSON reply into an [`AgentOutput`].

use super::{AgentOutput, DataAgent, ResultHandler};
use crate::dataset::{Dataset, Table};
use crate::error::{Result, SheetchatError};
use crate::prompts::build_agent_prompt;
use crate::providers::{Message, Provider};
use crate::session::ImageRef;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Data agent that asks an LLM to answer from a textual copy of the tables
pub struct LlmDataAgent {
    provider: Arc<dyn Provider>,
    max_prompt_rows: usize,
}

#[derive(Debug, Deserialize)]
struct AgentReply {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    value: Value,
}

#[derive(Debug, Deserialize)]
struct TableValue {
    columns: Vec<String>,
    #[serde(default)]
    rows: Vec<Vec<Value>>,
}

impl LlmDataAgent {
    /// Create an agent that includes up to `max_prompt_rows` rows per table
    pub fn new(provider: Arc<dyn Provider>, max_prompt_rows: usize) -> Self {
        Self {
            provider,
            max_prompt_rows,
        }
    }
}

#[async_trait]
impl DataAgent for LlmDataAgent {
    async fn chat(
        &self,
        dataset: &Dataset,
        question: &str,
        handler: &mut dyn ResultHandler,
    ) -> Result<()> {
        let messages = vec![
            Message::system(build_agent_prompt(dataset, self.max_prompt_rows)),
            Message::user(question),
        ];

        let response = self.provider.complete(&messages).await?;
        let reply = response.text().trim();
        if reply.is_empty() {
            return Err(SheetchatError::Agent("agent returned an empty reply".to_string()).into());
        }

        let output = classify_reply(reply);
        tracing::debug!(kind = output.kind(), "Agent produced result");
        handler.on_result(output).await
    }
}

/// Classify a raw agent reply
///
/// A reply that is not a recognised `{"type", "value"}` object is delivered
/// as text.
pub fn classify_reply(reply: &str) -> AgentOutput {
    let fallback = || AgentOutput::Text(reply.trim().to_string());

    let parsed = match (reply.find('{'), reply.rfind('}')) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<AgentReply>(&reply[start..=end]).ok()
        }
        _ => None,
    };
    let Some(parsed) = parsed else {
        return fallback();
    };

    match parsed.kind.as_str() {
        "number" => match parsed.value {
            Value::Number(number) => AgentOutput::Number(number),
            Value::String(text) => match serde_json::from_str::<serde_json::Number>(text.trim()) {
                Ok(number) => AgentOutput::Number(number),
                Err(_) => AgentOutput::Text(text),
            },
            other => AgentOutput::Text(value_text(other)),
        },
        "text" | "string" => AgentOutput::Text(value_text(parsed.value)),
        "table" | "dataframe" => match serde_json::from_value::<TableValue>(parsed.value) {
            Ok(table) => {
                let rows = table
                    .rows
                    .into_iter()
                    .map(|row| row.into_iter().map(value_text).collect())
                    .collect();
                AgentOutput::Table(Table::new("answer", table.columns, rows))
            }
            Err(_) => fallback(),
        },
        "plot" | "image" => match &parsed.value {
            Value::String(value) => {
                // base64 image bytes, otherwise a path to the chart file
                let value = value.trim();
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(value)
                    .ok()
                    .filter(|bytes| image::guess_format(bytes).is_ok());
                match bytes {
                    Some(bytes) => AgentOutput::Plot(ImageRef::inline(bytes)),
                    None if !value.is_empty() => AgentOutput::Plot(ImageRef::file(value)),
                    None => fallback(),
                }
            }
            _ => fallback(),
        },
        _ => fallback(),
    }
}

fn value_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::CompletionResponse;
    use std::sync::Mutex;

    #[test]
    fn test_classify_number() {
        assert_eq!(
            classify_reply(r#"{"type": "number", "value": 42}"#),
            AgentOutput::Number(42.into())
        );
    }

    #[test]
    fn test_classify_number_as_string() {
        match classify_reply(r#"{"type": "number", "value": "3.5"}"#) {
            AgentOutput::Number(n) => assert_eq!(n.as_f64(), Some(3.5)),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_text_inside_fence() {
        let reply = "```json\n{\"type\": \"text\", \"value\": \"Hanoi\"}\n```";
        assert_eq!(classify_reply(reply), AgentOutput::Text("Hanoi".into()));
    }

    #[test]
    fn test_classify_table_keeps_duplicate_columns() {
        let reply = r#"{"type": "table", "value": {"columns": ["id", "id"], "rows": [[1, "a"]]}}"#;
        match classify_reply(reply) {
            AgentOutput::Table(table) => {
                assert_eq!(table.columns(), &["id".to_string(), "id".to_string()]);
                assert_eq!(table.rows()[0], vec!["1".to_string(), "a".to_string()]);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_plot_decodes_base64() {
        let reply = r#"{"type": "plot", "value": "iVBORw0KGgo="}"#;
        match classify_reply(reply) {
            AgentOutput::Plot(ImageRef::Inline { mime_type, .. }) => {
                assert_eq!(mime_type, "image/png")
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_classify_plot_path_is_file_image() {
        let reply = r#"{"type": "plot", "value": "exports/charts/temp_chart.png"}"#;
        assert_eq!(
            classify_reply(reply),
            AgentOutput::Plot(ImageRef::file("exports/charts/temp_chart.png"))
        );
    }

    #[test]
    fn test_classify_empty_plot_is_text() {
        let reply = r#"{"type": "plot", "value": " "}"#;
        assert!(matches!(classify_reply(reply), AgentOutput::Text(_)));
    }

    #[test]
    fn test_classify_plot_path_that_decodes_as_base64_is_file() {
        let reply = r#"{"type": "plot", "value": "charts/sales"}"#;
        assert_eq!(
            classify_reply(reply),
            AgentOutput::Plot(ImageRef::file("charts/sales"))
        );
    }

    #[test]
    fn test_classify_plain_prose_is_text() {
        assert_eq!(
            classify_reply(" There are 3 customers. "),
            AgentOutput::Text("There are 3 customers.".into())
        );
    }

    #[test]
    fn test_classify_unknown_type_is_text() {
        let reply = r#"{"type": "chart", "value": 1}"#;
        assert_eq!(classify_reply(reply), AgentOutput::Text(reply.into()));
    }

    struct Recorder(Vec<AgentOutput>);

    #[async_trait]
    impl ResultHandler for Recorder {
        async fn on_result(&mut self, output: AgentOutput) -> Result<()> {
            self.0.push(output);
            Ok(())
        }
    }

    struct CapturingProvider {
        reply: String,
        seen: Mutex<Vec<Message>>,
    }

    #[async_trait]
    impl Provider for CapturingProvider {
        async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
            self.seen.lock().unwrap().extend_from_slice(messages);
            Ok(CompletionResponse::new(Message::assistant(self.reply.clone())))
        }
    }

    fn dataset() -> Dataset {
        Dataset::new(vec![Table::new(
            "orders",
            vec!["id".into()],
            vec![vec!["1".into()], vec!["2".into()]],
        )])
    }

    #[tokio::test]
    async fn test_chat_delivers_result_through_handler() {
        let provider = Arc::new(CapturingProvider {
            reply: r#"{"type": "number", "value": 2}"#.to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let agent = LlmDataAgent::new(provider.clone(), 10);
        let mut recorder = Recorder(Vec::new());

        agent
            .chat(&dataset(), "How many orders?", &mut recorder)
            .await
            .unwrap();

        assert_eq!(recorder.0, vec![AgentOutput::Number(2.into())]);
        let seen = provider.seen.lock().unwrap();
        assert_eq!(seen[0].role, "system");
        assert!(seen[0].content.contains("TABLE orders"));
        assert_eq!(seen[1], Message::user("How many orders?"));
    }

    #[tokio::test]
    async fn test_chat_empty_reply_is_error() {
        let provider = Arc::new(CapturingProvider {
            reply: "   ".to_string(),
            seen: Mutex::new(Vec::new()),
        });
        let agent = LlmDataAgent::new(provider, 10);
        let mut recorder = Recorder(Vec::new());

        let err = agent
            .chat(&dataset(), "?", &mut recorder)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("empty reply"));
        assert!(recorder.0.is_empty());
    }
}

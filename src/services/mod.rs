//! Language services used by the session layer
//!
//! [`AssistantServices`] wraps a chat [`Provider`] and turns its free-form
//! replies into the structured values the welcome sequence and the answer
//! pipeline need: diagram source, field descriptions, suggested questions,
//! and rewritten answers. Malformed replies are reported as
//! [`SheetchatError::MalformedResponse`]; deciding whether to swallow them is
//! left to the caller.

pub mod diagram;

pub use diagram::{DiagramRenderer, PlantUmlRenderer};

use crate::dataset::Dataset;
use crate::error::{Result, SheetchatError};
use crate::prompts;
use crate::providers::Provider;
use crate::session::{ImageRef, SuggestionSet};

use regex::Regex;
use serde_json::Value;
use std::sync::Arc;

/// Field descriptions for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFields {
    /// Table name
    pub table: String,
    /// `(field, description)` pairs
    pub fields: Vec<(String, String)>,
}

/// Field descriptions for a whole dataset, in table order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldDescriptions {
    pub tables: Vec<TableFields>,
}

impl FieldDescriptions {
    /// Markdown rendering: one heading per table, one bullet per field
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetchat::services::{FieldDescriptions, TableFields};
    ///
    /// let descriptions = FieldDescriptions {
    ///     tables: vec![TableFields {
    ///         table: "orders".to_string(),
    ///         fields: vec![("id".to_string(), "Order number".to_string())],
    ///     }],
    /// };
    /// assert_eq!(descriptions.to_markdown(), "**orders**\n- `id`: Order number");
    /// ```
    pub fn to_markdown(&self) -> String {
        self.tables
            .iter()
            .map(|table| {
                let mut block = format!("**{}**", table.table);
                for (field, description) in &table.fields {
                    block.push_str(&format!("\n- `{}`: {}", field, description));
                }
                block
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    pub fn is_empty(&self) -> bool {
        self.tables.iter().all(|t| t.fields.is_empty())
    }
}

/// Diagram, description, suggestion and rewrite services
pub struct AssistantServices {
    provider: Arc<dyn Provider>,
    diagram_renderer: Arc<dyn DiagramRenderer>,
}

impl AssistantServices {
    pub fn new(provider: Arc<dyn Provider>, diagram_renderer: Arc<dyn DiagramRenderer>) -> Self {
        Self {
            provider,
            diagram_renderer,
        }
    }

    /// Ask the LLM for PlantUML entity-relationship code
    ///
    /// Returns the first `@startuml ... @enduml` block of the reply.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if the reply has no such block
    pub async fn diagram_code(&self, summaries: &[String]) -> Result<String> {
        let reply = self
            .provider
            .send_chat_completion(&prompts::diagram_prompt(summaries))
            .await?;

        extract_diagram_code(&reply)
            .map(str::to_string)
            .ok_or_else(|| {
                SheetchatError::MalformedResponse(
                    "diagram reply has no @startuml/@enduml block".to_string(),
                )
                .into()
            })
    }

    /// Generate the entity-relationship diagram image
    pub async fn create_diagram(&self, summaries: &[String]) -> Result<ImageRef> {
        let code = self.diagram_code(summaries).await?;
        self.diagram_renderer.render(&code).await
    }

    /// Ask the LLM what each field of each table means
    ///
    /// The reply must be a JSON array with one object per table (code fences
    /// are tolerated). Entries are paired with tables by position; extra
    /// entries are ignored.
    pub async fn describe_fields(
        &self,
        dataset: &Dataset,
        summaries: &[String],
    ) -> Result<FieldDescriptions> {
        let reply = self
            .provider
            .send_chat_completion(&prompts::field_description_prompt(summaries))
            .await?;

        let entries = parse_json_array(&reply)?;
        let tables = dataset
            .tables()
            .iter()
            .zip(entries)
            .map(|(table, entry)| TableFields {
                table: table.name().to_string(),
                fields: object_fields(entry),
            })
            .collect();

        let descriptions = FieldDescriptions { tables };
        if descriptions.is_empty() {
            return Err(SheetchatError::MalformedResponse(
                "field description reply has no fields".to_string(),
            )
            .into());
        }
        Ok(descriptions)
    }

    /// Ask the LLM for `count` questions worth asking about the data
    ///
    /// Blank entries are dropped and entries past `count` are ignored.
    ///
    /// # Errors
    ///
    /// Returns `MalformedResponse` if the reply is not a JSON array or
    /// contains no usable question
    pub async fn suggest_questions(
        &self,
        summaries: &[String],
        descriptions: &str,
        count: usize,
    ) -> Result<SuggestionSet> {
        let reply = self
            .provider
            .send_chat_completion(&prompts::suggestion_prompt(summaries, descriptions, count))
            .await?;

        let questions: Vec<String> = parse_json_array(&reply)?
            .into_iter()
            .filter_map(|value| match value {
                Value::String(text) => Some(text.trim().to_string()),
                _ => None,
            })
            .filter(|text| !text.is_empty())
            .take(count)
            .collect();

        if questions.is_empty() {
            return Err(SheetchatError::MalformedResponse(
                "suggestion reply has no questions".to_string(),
            )
            .into());
        }

        Ok(SuggestionSet::from_questions(questions))
    }

    /// Rephrase a raw agent answer as a friendly sentence
    pub async fn rewrite_answer(&self, question: &str, answer: &str) -> Result<String> {
        let reply = self
            .provider
            .send_chat_completion(&prompts::rewrite_prompt(question, answer))
            .await?;
        Ok(reply.trim().to_string())
    }
}

/// First `@startuml ... @enduml` block, spanning lines
///
/// # Examples
///
/// ```
/// use sheetchat::services::extract_diagram_code;
///
/// let reply = "Here:\n```\n@startuml\nA -> B\n@enduml\n```";
/// assert_eq!(extract_diagram_code(reply), Some("@startuml\nA -> B\n@enduml"));
/// assert_eq!(extract_diagram_code("no diagram"), None);
/// ```
pub fn extract_diagram_code(text: &str) -> Option<&str> {
    let pattern = Regex::new(r"(?s)@startuml.*?@enduml").ok()?;
    pattern.find(text).map(|m| m.as_str())
}

/// Parse a JSON array out of an LLM reply, tolerating surrounding prose and
/// code fences
pub fn parse_json_array(text: &str) -> Result<Vec<Value>> {
    let malformed = || SheetchatError::MalformedResponse("reply is not a JSON array".to_string());

    let start = text.find('[').ok_or_else(malformed)?;
    let end = text.rfind(']').ok_or_else(malformed)?;
    if end < start {
        return Err(malformed().into());
    }

    match serde_json::from_str::<Value>(&text[start..=end]) {
        Ok(Value::Array(values)) => Ok(values),
        _ => Err(malformed().into()),
    }
}

fn object_fields(value: Value) -> Vec<(String, String)> {
    match value {
        Value::Object(map) => map
            .into_iter()
            .map(|(field, description)| {
                let description = match description {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                (field, description)
            })
            .collect(),
        _ => Vec::new(),
    }
}

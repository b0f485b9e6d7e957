//! Conversation message types
//!
//! A [`Message`] pairs a [`Role`] with a [`Content`] payload. The content kind
//! is derived from the payload variant, so a message can never carry a kind
//! that disagrees with its content.

use crate::dataset::Table;
use base64::Engine;
use serde::{Serialize, Serializer};
use std::path::{Path, PathBuf};

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person asking questions
    User,
    /// Sheetchat itself (welcome sequence, agent answers)
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Content kind discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Text,
    Markdown,
    Table,
    Image,
    Questions,
}

/// Reference to a displayable bitmap
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum ImageRef {
    /// Image persisted on disk (for example the cached diagram)
    File { path: PathBuf },
    /// Image held in memory (for example a plot returned by the agent)
    Inline {
        mime_type: String,
        #[serde(serialize_with = "serialize_base64")]
        data: Vec<u8>,
    },
}

impl ImageRef {
    /// Reference an image file
    pub fn file(path: impl Into<PathBuf>) -> Self {
        ImageRef::File { path: path.into() }
    }

    /// Hold image bytes in memory, guessing the MIME type from the bytes
    pub fn inline(data: Vec<u8>) -> Self {
        let mime_type = image::guess_format(&data)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string());
        ImageRef::Inline { mime_type, data }
    }

    /// Path of a file-backed image
    pub fn path(&self) -> Option<&Path> {
        match self {
            ImageRef::File { path } => Some(path),
            ImageRef::Inline { .. } => None,
        }
    }

    /// Pixel dimensions, when the image can be decoded
    pub fn dimensions(&self) -> Option<(u32, u32)> {
        match self {
            ImageRef::File { path } => image::image_dimensions(path).ok(),
            ImageRef::Inline { data, .. } => {
                use image::GenericImageView;
                image::load_from_memory(data).ok().map(|img| img.dimensions())
            }
        }
    }
}

fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
}

/// One selectable suggested question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    /// Opaque key used to select this question
    pub key: String,
    /// Question text
    pub question: String,
}

/// Suggested questions keyed by opaque identifiers
///
/// Keys are fresh uuid v4 strings, so they never collide across sets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SuggestionSet {
    entries: Vec<Suggestion>,
}

impl SuggestionSet {
    /// Build a set from question texts, assigning each a new key
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetchat::session::SuggestionSet;
    ///
    /// let set = SuggestionSet::from_questions(vec!["How many rows?".to_string()]);
    /// let key = set.iter().next().unwrap().key.clone();
    /// assert_eq!(set.get(&key), Some("How many rows?"));
    /// ```
    pub fn from_questions(questions: Vec<String>) -> Self {
        let entries = questions
            .into_iter()
            .map(|question| Suggestion {
                key: uuid::Uuid::new_v4().to_string(),
                question,
            })
            .collect();
        Self { entries }
    }

    /// Look up a question by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| entry.question.as_str())
    }

    /// Question at a zero-based position
    pub fn nth(&self, index: usize) -> Option<&Suggestion> {
        self.entries.get(index)
    }

    /// Entries in generation order
    pub fn iter(&self) -> impl Iterator<Item = &Suggestion> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Message payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Content {
    /// Plain text
    Text(String),
    /// Markdown-formatted text
    Markdown(String),
    /// A tabular answer
    Table(Table),
    /// A diagram or plot
    Image(ImageRef),
    /// Selectable suggested questions
    Questions(SuggestionSet),
}

impl Content {
    /// Kind matching this payload
    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Text(_) => ContentKind::Text,
            Content::Markdown(_) => ContentKind::Markdown,
            Content::Table(_) => ContentKind::Table,
            Content::Image(_) => ContentKind::Image,
            Content::Questions(_) => ContentKind::Questions,
        }
    }
}

/// One conversation turn
///
/// Messages are immutable once created; the store only hands out shared
/// references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    role: Role,
    #[serde(flatten)]
    content: Content,
}

impl Message {
    pub fn new(role: Role, content: Content) -> Self {
        Self { role, content }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Kind derived from the content variant
    pub fn kind(&self) -> ContentKind {
        self.content.kind()
    }

    /// Text of a `Text` or `Markdown` message
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            Content::Text(text) | Content::Markdown(text) => Some(text),
            _ => None,
        }
    }
}

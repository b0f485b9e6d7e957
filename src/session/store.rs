//! Append-only message log

use super::message::{Content, Message, Role};

/// Ordered, append-only log of conversation turns
///
/// Insertion order is the only ordering. There is no public way to remove or
/// edit a message; the log is emptied only when the owning session resets.
#[derive(Debug, Clone, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message and return a reference to it
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetchat::session::{Content, MessageStore, Role};
    ///
    /// let mut store = MessageStore::new();
    /// store.append(Role::User, Content::Text("hi".to_string()));
    /// assert_eq!(store.len(), 1);
    /// ```
    pub fn append(&mut self, role: Role, content: Content) -> &Message {
        tracing::trace!(%role, kind = ?content.kind(), "Appending message");
        self.messages.push(Message::new(role, content));
        &self.messages[self.messages.len() - 1]
    }

    /// Every message in insertion order
    pub fn all(&self) -> &[Message] {
        &self.messages
    }

    /// Messages appended at or after `index`
    ///
    /// Used by incremental renderers to draw only what is new since the last
    /// pass. An index past the end yields an empty slice.
    pub fn since(&self, index: usize) -> &[Message] {
        self.messages.get(index..).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.messages.clear();
    }
}

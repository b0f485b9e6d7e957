//! Conversational session layer
//!
//! - [`message`]: message, content and suggestion types
//! - [`store`]: the append-only message log
//! - [`state`]: per-user [`Session`] state and its lifecycle phases
//! - [`welcome`]: the introductory sequence run after each load
//! - [`dispatch`]: question dispatch and the agent result handler
//! - [`controller`]: [`SessionController`], which ties them to the external
//!   services

pub mod controller;
pub mod dispatch;
pub mod message;
pub mod state;
pub mod store;
pub mod welcome;

pub use controller::SessionController;
pub use dispatch::{ChatResultHandler, DispatchOutcome, NO_ANSWER};
pub use message::{Content, ContentKind, ImageRef, Message, Role, Suggestion, SuggestionSet};
pub use state::{Session, SessionPhase, LOAD_FAILED_WARNING, NO_DATASET_WARNING};
pub use store::MessageStore;
pub use welcome::{size_announcement, WelcomeSequence, DIAGRAM_INTENT};

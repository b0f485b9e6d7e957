//! Sheetchat - chat with the tables of a spreadsheet
//!
//! This library loads every table of a spreadsheet, introduces the dataset
//! with a size summary, an entity-relationship diagram, field descriptions
//! and suggested questions, then answers natural-language questions through
//! an LLM-backed data agent.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `session`: message store, session state machine, welcome sequence,
//!   prompt dispatch and the `SessionController`
//! - `render`: HTML and terminal message renderers
//! - `agent`: data agent and result handler abstractions
//! - `services`: diagram, field description, suggestion and rewrite services
//! - `spreadsheet`: spreadsheet loading
//! - `providers`: LLM provider abstraction and implementations (OpenAI, Ollama)
//! - `web`: the axum web surface
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use sheetchat::{commands::build_controller, Config, Session};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let controller = build_controller(&config)?;
//!     let mut session = Session::new();
//!     if controller
//!         .submit_url(&mut session, "https://docs.google.com/spreadsheets/d/<id>")
//!         .await
//!     {
//!         controller.refresh(&mut session).await;
//!         controller.dispatch(&mut session, "How many rows are there?").await;
//!     }
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod dataset;
pub mod error;
pub mod prompts;
pub mod providers;
pub mod render;
pub mod services;
pub mod session;
pub mod spreadsheet;
pub mod web;

// Re-export commonly used types
pub use config::Config;
pub use dataset::{Dataset, Table};
pub use error::{Result, SheetchatError};
pub use session::{Message, Session, SessionController};

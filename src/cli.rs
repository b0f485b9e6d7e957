//! Command-line interface definition for Sheetchat
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the web UI and the terminal chat.

use clap::{Parser, Subcommand};

/// Sheetchat - chat with the tables of a spreadsheet
///
/// Paste a spreadsheet link, get an overview and a relationship diagram
/// of its tables, then ask questions about the data.
#[derive(Parser, Debug, Clone)]
#[command(name = "sheetchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, env = "SHEETCHAT_CONFIG", default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the LLM provider from config (openai, ollama)
    #[arg(short, long, global = true)]
    pub provider: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Sheetchat
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the web UI
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Chat with a spreadsheet from the terminal
    Chat {
        /// Spreadsheet link to load before the first prompt
        #[arg(short, long)]
        url: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    ///
    /// # Returns
    ///
    /// Returns the parsed CLI structure
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            provider: None,
            command: Commands::Serve {
                host: None,
                port: None,
            },
        }
    }
}

//! Configuration management for Sheetchat
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{Result, SheetchatError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Sheetchat
///
/// Holds everything needed to wire the session layer to its external
/// collaborators: the web server, the LLM provider, the spreadsheet API,
/// the diagram renderer, and the welcome/answer behavior switches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Web server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// LLM provider configuration (OpenAI-compatible, Ollama)
    pub provider: ProviderConfig,
    /// Spreadsheet API settings
    #[serde(default)]
    pub spreadsheet: SpreadsheetConfig,
    /// Diagram rendering settings
    #[serde(default)]
    pub diagram: DiagramConfig,
    /// Welcome sequence settings
    #[serde(default)]
    pub welcome: WelcomeConfig,
    /// Data agent settings
    #[serde(default)]
    pub agent: AgentConfig,
}

/// Web server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to bind
    #[serde(default = "default_server_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_server_port")]
    pub port: u16,

    /// Minutes a browser session may stay idle before it is dropped
    #[serde(default = "default_session_idle_minutes")]
    pub session_idle_minutes: u64,

    /// Maximum number of live browser sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    8501
}

fn default_session_idle_minutes() -> u64 {
    60
}

fn default_max_sessions() -> usize {
    1000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            session_idle_minutes: default_session_idle_minutes(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Provider configuration
///
/// Specifies which LLM provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type")]
    pub provider_type: String,

    /// OpenAI-compatible chat completions configuration
    #[serde(default)]
    pub openai: OpenAiConfig,

    /// Ollama configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
}

/// OpenAI-compatible provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL (everything before `/chat/completions`)
    #[serde(default = "default_openai_api_base")]
    pub api_base: String,

    /// Model to use for chat completions
    #[serde(default = "default_openai_model")]
    pub model: String,

    /// API key; usually supplied through `OPENAI_API_KEY` rather than the file
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_openai_api_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_model() -> String {
    "gpt-3.5-turbo".to_string()
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: default_openai_api_base(),
            model: default_openai_model(),
            api_key: None,
        }
    }
}

/// Ollama provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Ollama server host
    #[serde(default = "default_ollama_host")]
    pub host: String,

    /// Model to use for Ollama
    #[serde(default = "default_ollama_model")]
    pub model: String,
}

fn default_ollama_host() -> String {
    "http://localhost:11434".to_string()
}

fn default_ollama_model() -> String {
    "llama3.2:latest".to_string()
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: default_ollama_host(),
            model: default_ollama_model(),
        }
    }
}

/// Spreadsheet API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpreadsheetConfig {
    /// Base URL of the Google Sheets API
    #[serde(default = "default_sheets_api_base")]
    pub api_base: String,

    /// API key for public sheets; usually supplied through `GOOGLE_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,

    /// Request timeout (seconds)
    #[serde(default = "default_sheets_timeout")]
    pub timeout_seconds: u64,
}

fn default_sheets_api_base() -> String {
    "https://sheets.googleapis.com".to_string()
}

fn default_sheets_timeout() -> u64 {
    60
}

impl Default for SpreadsheetConfig {
    fn default() -> Self {
        Self {
            api_base: default_sheets_api_base(),
            api_key: None,
            timeout_seconds: default_sheets_timeout(),
        }
    }
}

/// Diagram rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagramConfig {
    /// PlantUML server URL (everything before `/png/...`)
    #[serde(default = "default_plantuml_url")]
    pub server_url: String,

    /// Directory holding the cached diagram source and image
    #[serde(default = "default_cache_dir")]
    pub cache_dir: PathBuf,

    /// File name (without extension) of the cached diagram
    #[serde(default = "default_file_stem")]
    pub file_stem: String,
}

fn default_plantuml_url() -> String {
    "http://www.plantuml.com/plantuml".to_string()
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_file_stem() -> String {
    "plantuml_img".to_string()
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            server_url: default_plantuml_url(),
            cache_dir: default_cache_dir(),
            file_stem: default_file_stem(),
        }
    }
}

/// Welcome sequence configuration
///
/// Steps 1-3 of the welcome sequence always run; these switches control
/// the optional steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeConfig {
    /// Ask the LLM to describe the meaning of every field
    #[serde(default = "default_true")]
    pub describe_fields: bool,

    /// Ask the LLM for follow-up questions
    #[serde(default = "default_true")]
    pub suggest_questions: bool,

    /// Number of suggested questions requested
    #[serde(default = "default_suggestion_count")]
    pub suggestion_count: usize,

    /// Example rows per table included in table summaries
    #[serde(default = "default_sample_rows")]
    pub sample_rows: usize,
}

fn default_true() -> bool {
    true
}

fn default_suggestion_count() -> usize {
    5
}

fn default_sample_rows() -> usize {
    3
}

impl Default for WelcomeConfig {
    fn default() -> Self {
        Self {
            describe_fields: true,
            suggest_questions: true,
            suggestion_count: default_suggestion_count(),
            sample_rows: default_sample_rows(),
        }
    }
}

/// Data agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Rephrase scalar answers into a conversational sentence
    #[serde(default = "default_true")]
    pub rewrite_answers: bool,

    /// Maximum rows per table sent to the agent
    #[serde(default = "default_max_prompt_rows")]
    pub max_prompt_rows: usize,
}

fn default_max_prompt_rows() -> usize {
    200
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            rewrite_answers: true,
            max_prompt_rows: default_max_prompt_rows(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Returns
    ///
    /// Returns the loaded and merged configuration
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default_config()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn default_config() -> Self {
        Self {
            server: ServerConfig::default(),
            provider: ProviderConfig {
                provider_type: "openai".to_string(),
                openai: OpenAiConfig::default(),
                ollama: OllamaConfig::default(),
            },
            spreadsheet: SpreadsheetConfig::default(),
            diagram: DiagramConfig::default(),
            welcome: WelcomeConfig::default(),
            agent: AgentConfig::default(),
        }
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SheetchatError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SheetchatError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        // Provider overrides
        if let Ok(provider_type) = std::env::var("SHEETCHAT_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        if let Ok(model) = std::env::var("SHEETCHAT_OPENAI_MODEL") {
            self.provider.openai.model = model;
        }

        if let Ok(api_base) = std::env::var("SHEETCHAT_OPENAI_API_BASE") {
            self.provider.openai.api_base = api_base;
        }

        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            self.provider.openai.api_key = Some(api_key);
        }

        if let Ok(ollama_host) = std::env::var("SHEETCHAT_OLLAMA_HOST") {
            self.provider.ollama.host = ollama_host;
        }

        if let Ok(ollama_model) = std::env::var("SHEETCHAT_OLLAMA_MODEL") {
            self.provider.ollama.model = ollama_model;
        }

        // Server overrides
        if let Ok(host) = std::env::var("SHEETCHAT_HOST") {
            self.server.host = host;
        }

        if let Ok(port) = std::env::var("SHEETCHAT_PORT") {
            match port.parse::<u16>() {
                Ok(v) => {
                    self.server.port = v;
                    tracing::debug!(port = v, "Env override: SHEETCHAT_PORT");
                }
                Err(_) => {
                    tracing::warn!("Invalid value for SHEETCHAT_PORT: {}", port);
                }
            }
        }

        // Spreadsheet overrides
        if let Ok(api_base) = std::env::var("SHEETCHAT_SHEETS_API_BASE") {
            self.spreadsheet.api_base = api_base;
        }

        if let Ok(api_key) = std::env::var("GOOGLE_API_KEY") {
            self.spreadsheet.api_key = Some(api_key);
        }

        // Diagram overrides
        if let Ok(url) = std::env::var("SHEETCHAT_PLANTUML_URL") {
            self.diagram.server_url = url;
        }

        if let Ok(dir) = std::env::var("SHEETCHAT_CACHE_DIR") {
            self.diagram.cache_dir = PathBuf::from(dir);
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if cli.verbose {
            tracing::debug!("Verbose mode enabled");
        }

        if let Some(provider) = &cli.provider {
            tracing::debug!("CLI override: provider={}", provider);
            self.provider.provider_type = provider.clone();
        }

        if let crate::cli::Commands::Serve { host, port } = &cli.command {
            if let Some(host) = host {
                self.server.host = host.clone();
            }
            if let Some(port) = port {
                self.server.port = *port;
            }
        }
    }

    /// Validate the configuration
    ///
    /// Ensures all configuration values are within acceptable ranges
    /// and that required fields are properly set.
    ///
    /// # Returns
    ///
    /// Returns Ok if configuration is valid
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(SheetchatError::Config("Provider type cannot be empty".to_string()).into());
        }

        let valid_providers = ["openai", "ollama"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(SheetchatError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        if self.server.port == 0 {
            return Err(
                SheetchatError::Config("server.port must be greater than 0".to_string()).into(),
            );
        }

        if self.server.max_sessions == 0 || self.server.session_idle_minutes == 0 {
            return Err(SheetchatError::Config(
                "server.max_sessions and server.session_idle_minutes must be greater than 0"
                    .to_string(),
            )
            .into());
        }

        for (name, value) in [
            ("provider.openai.api_base", &self.provider.openai.api_base),
            ("provider.ollama.host", &self.provider.ollama.host),
            ("spreadsheet.api_base", &self.spreadsheet.api_base),
            ("diagram.server_url", &self.diagram.server_url),
        ] {
            if url::Url::parse(value).is_err() {
                return Err(
                    SheetchatError::Config(format!("{} is not a valid URL: {}", name, value))
                        .into(),
                );
            }
        }

        if self.diagram.file_stem.is_empty()
            || self.diagram.file_stem.contains(['/', '\\'])
            || self.diagram.file_stem.starts_with('.')
        {
            return Err(SheetchatError::Config(format!(
                "diagram.file_stem must be a plain file name: {:?}",
                self.diagram.file_stem
            ))
            .into());
        }

        if self.welcome.suggest_questions && self.welcome.suggestion_count == 0 {
            return Err(SheetchatError::Config(
                "welcome.suggestion_count must be greater than 0".to_string(),
            )
            .into());
        }

        if self.welcome.sample_rows == 0 {
            return Err(SheetchatError::Config(
                "welcome.sample_rows must be greater than 0".to_string(),
            )
            .into());
        }

        if self.agent.max_prompt_rows == 0 {
            return Err(SheetchatError::Config(
                "agent.max_prompt_rows must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}

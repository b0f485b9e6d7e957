//! Error types for Sheetchat
//!
//! This module defines all error types used throughout the application,
//! using `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Main error type for Sheetchat operations
///
/// Lower layers (spreadsheet loading, LLM providers, assistant services, the
/// data agent) always report failures through this type. Only the session
/// layer decides which of them are swallowed and how the conversation degrades.
#[derive(Error, Debug)]
pub enum SheetchatError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// LLM provider errors (API calls, authentication, response shape)
    #[error("Provider error: {0}")]
    Provider(String),

    /// Spreadsheet could not be fetched or turned into tables
    #[error("Spreadsheet load error: {0}")]
    SpreadsheetLoad(String),

    /// Diagram rendering errors
    #[error("Diagram error: {0}")]
    Diagram(String),

    /// Data agent errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// An external service answered, but not in the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Result type alias for Sheetchat operations
///
/// This is a convenience alias that uses `anyhow::Error` as the error type,
/// allowing for rich error context and easy error propagation.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let error = SheetchatError::Config("invalid port".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid port");
    }

    #[test]
    fn test_provider_error_display() {
        let error = SheetchatError::Provider("API timeout".to_string());
        assert_eq!(error.to_string(), "Provider error: API timeout");
    }

    #[test]
    fn test_spreadsheet_load_error_display() {
        let error = SheetchatError::SpreadsheetLoad("no sheets".to_string());
        assert_eq!(error.to_string(), "Spreadsheet load error: no sheets");
    }

    #[test]
    fn test_diagram_error_display() {
        let error = SheetchatError::Diagram("server returned 500".to_string());
        assert_eq!(error.to_string(), "Diagram error: server returned 500");
    }

    #[test]
    fn test_malformed_response_display() {
        let error = SheetchatError::MalformedResponse("missing @startuml".to_string());
        assert_eq!(error.to_string(), "Malformed response: missing @startuml");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: SheetchatError = io_error.into();
        assert!(matches!(error, SheetchatError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: SheetchatError = json_error.into();
        assert!(matches!(error, SheetchatError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: SheetchatError = yaml_error.into();
        assert!(matches!(error, SheetchatError::Yaml(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SheetchatError>();
    }
}

//! Provider module for Sheetchat
//!
//! This module contains the LLM provider abstraction and implementations
//! for OpenAI-compatible endpoints and Ollama.

pub mod base;
pub mod ollama;
pub mod openai;

pub use base::{CompletionResponse, Message, Provider, TokenUsage};
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;

use crate::config::ProviderConfig;
use crate::error::Result;

/// Create a provider instance based on configuration
///
/// # Arguments
///
/// * `provider_type` - Type of provider ("openai" or "ollama")
/// * `config` - Provider configuration
///
/// # Returns
///
/// Returns a boxed provider instance
///
/// # Errors
///
/// Returns error if provider type is invalid or initialization fails
pub fn create_provider(provider_type: &str, config: &ProviderConfig) -> Result<Box<dyn Provider>> {
    match provider_type {
        "openai" => Ok(Box::new(OpenAiProvider::new(config.openai.clone())?)),
        "ollama" => Ok(Box::new(OllamaProvider::new(config.ollama.clone())?)),
        _ => Err(crate::error::SheetchatError::Provider(format!(
            "Unknown provider type: {}",
            provider_type
        ))
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OllamaConfig, OpenAiConfig};

    fn config() -> ProviderConfig {
        ProviderConfig {
            provider_type: "openai".to_string(),
            openai: OpenAiConfig::default(),
            ollama: OllamaConfig::default(),
        }
    }

    #[test]
    fn test_create_provider_openai() {
        let provider = create_provider("openai", &config()).unwrap();
        assert_eq!(provider.get_current_model().unwrap(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_create_provider_ollama() {
        let provider = create_provider("ollama", &config()).unwrap();
        assert_eq!(provider.get_current_model().unwrap(), "llama3.2:latest");
    }

    #[test]
    fn test_create_provider_invalid_type() {
        let result = create_provider("invalid", &config());
        assert!(result.is_err());
        if let Err(e) = result {
            assert!(e.to_string().contains("Unknown provider type"));
        }
    }
}

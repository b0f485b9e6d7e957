//! OpenAI-compatible chat completions provider
//!
//! Talks to any endpoint exposing `POST {api_base}/chat/completions` with a
//! bearer token: OpenAI itself, Azure-style gateways, LiteLLM, vLLM, and so on.

use crate::config::OpenAiConfig;
use crate::error::{Result, SheetchatError};
use crate::providers::{CompletionResponse, Message, Provider, TokenUsage};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI-compatible provider
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: usize,
    #[serde(default)]
    completion_tokens: usize,
}

impl OpenAiProvider {
    /// Create a new OpenAI-compatible provider
    ///
    /// A missing API key is not an error here: local gateways often accept
    /// unauthenticated requests, and hosted endpoints reject the first call
    /// with a clear 401 instead.
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetchat::config::OpenAiConfig;
    /// use sheetchat::providers::OpenAiProvider;
    ///
    /// let provider = OpenAiProvider::new(OpenAiConfig::default());
    /// assert!(provider.is_ok());
    /// ```
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(300))
            .user_agent(concat!("sheetchat/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SheetchatError::Provider(format!("Failed to create HTTP client: {}", e)))?;

        if config.api_key.is_none() {
            tracing::warn!("No API key configured for OpenAI provider (set OPENAI_API_KEY)");
        }

        tracing::info!(
            "Initialized OpenAI provider: api_base={}, model={}",
            config.api_base,
            config.model
        );

        Ok(Self { client, config })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    async fn complete(&self, messages: &[Message]) -> Result<CompletionResponse> {
        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
        };

        tracing::debug!("Sending chat completion request: {} messages", messages.len());

        let mut builder = self.client.post(self.completions_url()).json(&request);
        if let Some(key) = &self.config.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!("Chat completion request failed: {}", e);
            SheetchatError::Provider(format!("Chat completion request failed: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Chat completion returned error {}: {}", status, error_text);
            return Err(SheetchatError::Provider(format!(
                "Chat completion returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse chat completion response: {}", e);
            SheetchatError::Provider(format!("Failed to parse chat completion response: {}", e))
        })?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                SheetchatError::Provider("Chat completion returned no choices".to_string())
            })?;

        let message = Message::assistant(content);
        Ok(match body.usage {
            Some(usage) => CompletionResponse::with_usage(
                message,
                TokenUsage::new(usage.prompt_tokens, usage.completion_tokens),
            ),
            None => CompletionResponse::new(message),
        })
    }

    fn get_current_model(&self) -> Result<String> {
        Ok(self.config.model.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config_for(api_base: String, api_key: Option<&str>) -> OpenAiConfig {
        OpenAiConfig {
            api_base,
            model: "gpt-3.5-turbo".to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    #[test]
    fn test_completions_url_trims_trailing_slash() {
        let provider =
            OpenAiProvider::new(config_for("https://api.example.com/v1/".to_string(), None))
                .unwrap();
        assert_eq!(
            provider.completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[tokio::test]
    async fn test_complete_sends_bearer_and_parses_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [
                    {"message": {"role": "assistant", "content": "first"}},
                    {"message": {"role": "assistant", "content": "second"}}
                ],
                "usage": {"prompt_tokens": 9, "completion_tokens": 1, "total_tokens": 10}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(config_for(server.uri(), Some("sk-test"))).unwrap();
        let response = provider.complete(&[Message::user("hi")]).await.unwrap();
        assert_eq!(response.text(), "first");
        assert_eq!(response.usage, Some(TokenUsage::new(9, 1)));
    }

    #[tokio::test]
    async fn test_complete_empty_choices_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})),
            )
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(config_for(server.uri(), None)).unwrap();
        let err = provider.complete(&[Message::user("hi")]).await.unwrap_err();
        assert!(err.to_string().contains("no choices"));
    }

    #[tokio::test]
    async fn test_complete_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let provider = OpenAiProvider::new(config_for(server.uri(), Some("bad"))).unwrap();
        let err = provider.complete(&[Message::user("hi")]).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid api key"));
    }
}

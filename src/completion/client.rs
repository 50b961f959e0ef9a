/// HTTP completion client implementation.
///
/// This module provides `HttpCompletionClient` for making synchronous chat completion
/// requests, along with error types, the client traits and a builder for configuration.
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::message::ChatMessage;
use crate::config::{DEFAULT_TIMEOUT, ModelConfig, Provider};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of characters of an error body kept in `CompletionError::Http`.
const ERROR_BODY_CHARS: usize = 200;

/// Errors that can occur when calling the completion service.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out")]
    Timeout(#[source] reqwest::Error),

    /// Non-success HTTP status returned by the provider
    #[error("HTTP error: status {status}: {body}")]
    Http { status: u16, body: String },

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Provider reply that is valid JSON but lacks the expected content
    #[error("Completion API error: {message}")]
    Api { message: String },

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl From<reqwest::Error> for CompletionError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err)
        } else {
            Self::Network(err)
        }
    }
}

/// Narrow interface the annotation pipeline depends on.
///
/// Implementations send role-tagged messages to a model and return the plain
/// text of its reply. Failures are returned as-is; callers decide what to do.
pub trait CompletionClient: Send + Sync {
    /// Sends `messages` to the model and returns the reply text.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` on transport or provider failures.
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError>;
}

/// Builds a `CompletionClient` for a configured model entry.
///
/// The orchestrator receives one of these so tests can substitute a stub.
pub trait CompletionClientFactory: Send + Sync {
    /// Creates a client for `model`.
    ///
    /// # Errors
    ///
    /// Returns `CompletionError` if the model entry cannot be turned into a client
    /// (for example an invalid base URL).
    fn connect(&self, model: &ModelConfig) -> Result<Arc<dyn CompletionClient>, CompletionError>;
}

/// Factory producing `HttpCompletionClient` instances.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpClientFactory;

impl CompletionClientFactory for HttpClientFactory {
    fn connect(&self, model: &ModelConfig) -> Result<Arc<dyn CompletionClient>, CompletionError> {
        let client = HttpCompletionClientBuilder::from_config(model).build()?;
        Ok(Arc::new(client))
    }
}

/// Builder for constructing `HttpCompletionClient` instances.
///
/// # Examples
///
/// ```
/// use llm_annotator::completion::HttpCompletionClientBuilder;
/// use llm_annotator::config::Provider;
///
/// let client = HttpCompletionClientBuilder::new()
///     .provider(Provider::Ollama)
///     .model("llama3.1:8b")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.base_url(), "http://localhost:11434");
/// ```
#[derive(Debug, Default)]
pub struct HttpCompletionClientBuilder {
    provider: Provider,
    base_url: Option<String>,
    model: Option<String>,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout: Option<Duration>,
}

impl HttpCompletionClientBuilder {
    /// Creates a new `HttpCompletionClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-populated from a configured model entry.
    ///
    /// The API key is resolved here (explicit key, then `api_key_env`, then the
    /// provider's conventional environment variable).
    pub fn from_config(model: &ModelConfig) -> Self {
        Self {
            provider: model.provider,
            base_url: model.api_base.clone(),
            model: Some(model.model.clone()),
            api_key: model.resolve_api_key(),
            temperature: model.temperature,
            max_tokens: model.max_tokens,
            timeout: Some(model.timeout()),
        }
    }

    /// Sets the wire protocol spoken by the endpoint.
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = provider;
        self
    }

    /// Sets the base URL of the endpoint (e.g., "https://api.openai.com/v1").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the provider model identifier (e.g., "gpt-4o-mini").
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the bearer token sent with each request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Sets the whole-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `HttpCompletionClient` with the configured settings.
    ///
    /// # Returns
    ///
    /// Returns `Ok(HttpCompletionClient)` if the client was created successfully,
    /// or `Err(CompletionError)` if the base URL is invalid or the HTTP client
    /// cannot be constructed.
    ///
    /// If `base_url()` was not called, the provider's default endpoint is used.
    pub fn build(self) -> Result<HttpCompletionClient, CompletionError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
            .trim_end_matches('/')
            .to_string();

        reqwest::Url::parse(&base_url)
            .map_err(|e| CompletionError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        let client = reqwest::blocking::Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(CompletionError::Network)?;

        Ok(HttpCompletionClient {
            client,
            provider: self.provider,
            base_url,
            model: self.model.unwrap_or_default(),
            api_key: self.api_key,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        })
    }
}

/// Synchronous HTTP client for chat completion endpoints.
///
/// Performs exactly one request per `complete` call; nothing is retried.
/// It should be constructed using `HttpCompletionClientBuilder`.
pub struct HttpCompletionClient {
    client: reqwest::blocking::Client,
    provider: Provider,
    base_url: String,
    model: String,
    api_key: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Default, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAiChoice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl HttpCompletionClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model identifier configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Full URL of the chat endpoint for the configured provider.
    pub fn endpoint(&self) -> String {
        match self.provider {
            Provider::OpenAi => format!("{}/chat/completions", self.base_url),
            Provider::Ollama => format!("{}/api/chat", self.base_url),
        }
    }

    fn request_body(&self, messages: &[ChatMessage]) -> Result<serde_json::Value, CompletionError> {
        let body = match self.provider {
            Provider::OpenAi => serde_json::to_value(OpenAiRequest {
                model: &self.model,
                messages,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            }),
            Provider::Ollama => serde_json::to_value(OllamaRequest {
                model: &self.model,
                messages,
                stream: false,
                options: OllamaOptions {
                    temperature: self.temperature,
                    num_predict: self.max_tokens,
                },
            }),
        };
        body.map_err(CompletionError::Serialization)
    }

    fn send(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        let url = self.endpoint();
        let body = self.request_body(messages)?;
        debug!(url = %url, model = %self.model, "sending completion request");

        let mut request = self.client.post(&url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            return Err(CompletionError::Http {
                status: status.as_u16(),
                body: text.chars().take(ERROR_BODY_CHARS).collect(),
            });
        }

        parse_reply(self.provider, &text)
    }
}

impl CompletionClient for HttpCompletionClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        self.send(messages)
    }
}

/// Pulls the reply text out of a provider response body.
fn parse_reply(provider: Provider, body: &str) -> Result<String, CompletionError> {
    let message = match provider {
        Provider::OpenAi => {
            let parsed: OpenAiResponse =
                serde_json::from_str(body).map_err(CompletionError::Serialization)?;
            parsed
                .choices
                .into_iter()
                .next()
                .ok_or_else(|| CompletionError::Api {
                    message: "Response contained no choices".to_string(),
                })?
                .message
        }
        Provider::Ollama => {
            let parsed: OllamaResponse =
                serde_json::from_str(body).map_err(CompletionError::Serialization)?;
            parsed.message
        }
    };

    message.content.ok_or_else(|| CompletionError::Api {
        message: "Missing 'content' field in response message".to_string(),
    })
}

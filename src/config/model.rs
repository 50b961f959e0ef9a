use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Request timeout applied when a model entry does not set `timeout_secs`.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Wire protocol spoken by a completion endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    /// OpenAI-compatible `/chat/completions` (OpenAI, Groq, vLLM, LiteLLM proxy, ...)
    #[default]
    #[serde(rename = "openai")]
    OpenAi,
    /// Ollama `/api/chat`
    #[serde(rename = "ollama")]
    Ollama,
}

impl Provider {
    /// Base URL used when a model entry does not set `api_base`.
    pub fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Ollama => "http://localhost:11434",
        }
    }

    /// Environment variable consulted when no key is configured.
    fn conventional_key_env(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("OPENAI_API_KEY"),
            Self::Ollama => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Ollama => write!(f, "ollama"),
        }
    }
}

/// Connection parameters for one named model.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Name used to select this entry.
    pub name: String,
    #[serde(default)]
    pub provider: Provider,
    /// Provider-side model identifier.
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Name of an environment variable holding the API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key_env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ModelConfig {
    pub fn new(name: impl Into<String>, provider: Provider, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            provider,
            model: model.into(),
            api_base: None,
            api_key: None,
            api_key_env: None,
            temperature: None,
            max_tokens: None,
            timeout_secs: None,
        }
    }

    /// Resolves the API key: explicit `api_key`, then the variable named by
    /// `api_key_env`, then the provider's conventional variable.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(key) = self.api_key.as_deref().filter(|k| !k.is_empty()) {
            return Some(key.to_string());
        }

        self.api_key_env
            .as_deref()
            .or_else(|| self.provider.conventional_key_env())
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TIMEOUT)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("model entry has an empty name".to_string());
        }
        if self.model.trim().is_empty() {
            return Err(format!("model '{}' has an empty model identifier", self.name));
        }
        if let Some(t) = self.temperature
            && !(0.0..=2.0).contains(&t)
        {
            return Err(format!(
                "model '{}' has temperature {} outside 0.0-2.0",
                self.name, t
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelConfig")
            .field("name", &self.name)
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_key_env", &self.api_key_env)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

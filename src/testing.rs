//! Test doubles shared by the in-crate test modules.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::completion::{
    ChatMessage, CompletionClient, CompletionClientFactory, CompletionError,
};
use crate::config::{Config, ModelConfig};

pub(crate) const SAMPLE_CONFIG: &str = r#"
models:
  - name: gpt-mini
    model: gpt-4o-mini
  - name: local
    provider: ollama
    model: llama3.1:8b
annotators:
  - name: stock-chat-tagging
    mode: multilabel
    instruction: Tag finance chat messages.
    labels: ["US Stock", "Accounting"]
  - name: open-tagging
    mode: zeroshot-multilabel
    instruction: Tag anything.
    labels: ["US Stock", "Accounting"]
    max_new_labels: 1
"#;

pub(crate) fn sample_config() -> Config {
    Config::from_yaml_str(SAMPLE_CONFIG).expect("sample config is valid")
}

/// Factory returning a client with a fixed reply, counting every use.
#[derive(Default)]
pub(crate) struct StubFactory {
    reply: Option<String>,
    failure: Option<String>,
    pub connects: AtomicUsize,
    pub completions: Arc<AtomicUsize>,
    pub models: Mutex<Vec<String>>,
    pub requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl StubFactory {
    pub fn replying(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: Some(reply.to_string()),
            ..Default::default()
        })
    }

    /// Every completion fails with `CompletionError::Api { message }`.
    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            failure: Some(message.to_string()),
            ..Default::default()
        })
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn completions(&self) -> usize {
        self.completions.load(Ordering::SeqCst)
    }
}

struct StubClient {
    reply: Result<String, String>,
    completions: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl CompletionClient for StubClient {
    fn complete(&self, messages: &[ChatMessage]) -> Result<String, CompletionError> {
        self.completions.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(messages.to_vec());
        self.reply
            .clone()
            .map_err(|message| CompletionError::Api { message })
    }
}

impl CompletionClientFactory for StubFactory {
    fn connect(&self, model: &ModelConfig) -> Result<Arc<dyn CompletionClient>, CompletionError> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        self.models.lock().unwrap().push(model.name.clone());

        let reply = match (&self.failure, &self.reply) {
            (Some(message), _) => Err(message.clone()),
            (None, Some(reply)) => Ok(reply.clone()),
            (None, None) => Ok(r#"{"tags": []}"#.to_string()),
        };
        Ok(Arc::new(StubClient {
            reply,
            completions: Arc::clone(&self.completions),
            requests: Arc::clone(&self.requests),
        }))
    }
}

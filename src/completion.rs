/// Completion service client module.
///
/// This module wraps the external LLM chat endpoint behind the `CompletionClient`
/// trait, with an HTTP implementation for OpenAI-compatible and Ollama providers.
mod client;
mod message;

pub use client::{
    CompletionClient, CompletionClientFactory, CompletionError, HttpClientFactory,
    HttpCompletionClient, HttpCompletionClientBuilder,
};
pub use message::{ChatMessage, Role};

//! Wire-format tests for the HTTP completion client against a local mock server.

use std::time::Duration;

use llm_annotator::completion::{
    ChatMessage, CompletionClient, CompletionError, HttpCompletionClientBuilder,
};
use llm_annotator::config::Provider;
use mockito::Matcher;
use serde_json::json;

fn messages() -> Vec<ChatMessage> {
    vec![
        ChatMessage::system("You are a tagger."),
        ChatMessage::user("<context>\nTSLA up\n</context>"),
    ]
}

#[test]
fn openai_provider_posts_chat_completions_with_bearer_auth() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::PartialJson(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.0,
            "messages": [
                {"role": "system", "content": "You are a tagger."},
                {"role": "user", "content": "<context>\nTSLA up\n</context>"}
            ]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices":[{"index":0,"message":{"role":"assistant","content":"{\"tags\": [\"US Stock\"]}"}}]}"#)
        .create();

    let client = HttpCompletionClientBuilder::new()
        .provider(Provider::OpenAi)
        .base_url(server.url())
        .model("gpt-4o-mini")
        .api_key("sk-test")
        .temperature(0.0)
        .build()
        .unwrap();

    let reply = client.complete(&messages()).unwrap();
    assert_eq!(reply, r#"{"tags": ["US Stock"]}"#);
    mock.assert();
}

#[test]
fn ollama_provider_posts_api_chat_without_streaming() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/api/chat")
        .match_body(Matcher::PartialJson(json!({
            "model": "llama3.1:8b",
            "stream": false,
            "options": {"num_predict": 128}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"model":"llama3.1:8b","message":{"role":"assistant","content":"{\"tags\": []}"},"done":true}"#)
        .create();

    let client = HttpCompletionClientBuilder::new()
        .provider(Provider::Ollama)
        .base_url(format!("{}/", server.url()))
        .model("llama3.1:8b")
        .max_tokens(128)
        .build()
        .unwrap();

    assert_eq!(client.complete(&messages()).unwrap(), r#"{"tags": []}"#);
    mock.assert();
}

#[test]
fn request_without_key_sends_no_authorization_header() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
        .create();

    let client = HttpCompletionClientBuilder::new()
        .base_url(server.url())
        .model("local-model")
        .build()
        .unwrap();

    assert_eq!(client.complete(&messages()).unwrap(), "ok");
    mock.assert();
}

#[test]
fn error_status_is_reported_with_truncated_body() {
    let mut server = mockito::Server::new();
    let long_body = format!("{{\"error\":\"{}\"}}", "x".repeat(500));
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(long_body)
        .create();

    let client = HttpCompletionClientBuilder::new()
        .base_url(server.url())
        .model("gpt-4o-mini")
        .build()
        .unwrap();

    match client.complete(&messages()) {
        Err(CompletionError::Http { status, body }) => {
            assert_eq!(status, 429);
            assert_eq!(body.chars().count(), 200);
        }
        other => panic!("expected HTTP error, got {other:?}"),
    }
    mock.assert();
}

#[test]
fn request_is_made_exactly_once_on_failure() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .with_status(500)
        .with_body("internal")
        .expect(1)
        .create();

    let client = HttpCompletionClientBuilder::new()
        .base_url(server.url())
        .build()
        .unwrap();

    assert!(client.complete(&messages()).is_err());
    mock.assert();
}

#[test]
fn non_json_success_body_is_serialization_error() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/api/chat")
        .with_status(200)
        .with_body("<html>proxy page</html>")
        .create();

    let client = HttpCompletionClientBuilder::new()
        .provider(Provider::Ollama)
        .base_url(server.url())
        .build()
        .unwrap();

    assert!(matches!(
        client.complete(&messages()),
        Err(CompletionError::Serialization(_))
    ));
}

#[test]
fn unreachable_endpoint_is_network_error() {
    let client = HttpCompletionClientBuilder::new()
        .base_url("http://127.0.0.1:9")
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();

    let err = client.complete(&messages()).unwrap_err();
    assert!(matches!(
        err,
        CompletionError::Network(_) | CompletionError::Timeout(_)
    ));
}

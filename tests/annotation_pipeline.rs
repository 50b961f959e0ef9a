//! End-to-end annotation through the public service API.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use llm_annotator::annotation::AnnotationStatus;
use llm_annotator::completion::{
    ChatMessage, CompletionClient, CompletionClientFactory, CompletionError,
};
use llm_annotator::config::{Config, ModelConfig};
use llm_annotator::{AnnotateError, AnnotationService, LookupError};

struct CountingFactory {
    reply: String,
    calls: Arc<AtomicUsize>,
}

struct CountingClient {
    reply: String,
    calls: Arc<AtomicUsize>,
}

impl CompletionClient for CountingClient {
    fn complete(&self, _messages: &[ChatMessage]) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reply.clone())
    }
}

impl CompletionClientFactory for CountingFactory {
    fn connect(&self, _model: &ModelConfig) -> Result<Arc<dyn CompletionClient>, CompletionError> {
        Ok(Arc::new(CountingClient {
            reply: self.reply.clone(),
            calls: Arc::clone(&self.calls),
        }))
    }
}

fn config(api_base: &str) -> Config {
    Config::from_yaml_str(&format!(
        r#"
models:
  - name: mock
    provider: openai
    model: gpt-4o-mini
    api_base: {api_base}
    api_key: sk-test
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
"#
    ))
    .unwrap()
}

fn counting_service(reply: &str) -> (AnnotationService, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let factory = CountingFactory {
        reply: reply.to_string(),
        calls: Arc::clone(&calls),
    };
    let service =
        AnnotationService::with_client_factory(config("http://unused.invalid"), Arc::new(factory));
    (service, calls)
}

const FENCED: &str = "```json\n{\"tags\": [\"US Stock\",\"Crypto\"]}\n```";

#[test]
fn fixed_and_zero_shot_modes_over_the_same_reply() {
    let (service, calls) = counting_service(FENCED);

    let fixed = service
        .annotate("TSLA", Some("stock-chat-tagging"), None)
        .unwrap();
    assert_eq!(fixed.tags, vec!["US Stock"]);

    let open = service.annotate("TSLA", Some("open-tagging"), None).unwrap();
    assert_eq!(open.tags, vec!["US Stock", "Crypto"]);
    assert_eq!(
        open.metadata.unwrap().new_tags,
        Some(vec!["Crypto".to_string()])
    );

    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn missing_annotator_never_reaches_the_client() {
    let (service, calls) = counting_service(FENCED);

    let err = service.annotate("x", Some("missing"), None).unwrap_err();
    assert!(matches!(
        err,
        AnnotateError::Lookup(LookupError::AnnotatorNotFound(_))
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn truncated_reply_is_failed_result() {
    let (service, _) = counting_service(r#"{"tags": ["US Stock""#);

    let response = service.annotate("x", None, None).unwrap();
    assert_eq!(response.status, AnnotationStatus::Failed);
    assert!(response.tags.is_empty());
    assert!(!response.error().unwrap().is_empty());
}

#[test]
fn real_http_client_round_trip_through_mock_endpoint() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": FENCED}}]
            })
            .to_string(),
        )
        .create();

    let service = AnnotationService::new(config(&server.url()));
    let response = service
        .annotate("Is TSLA a buy?", Some("stock-chat-tagging"), Some("mock"))
        .unwrap();

    assert_eq!(response.status, AnnotationStatus::Success);
    assert_eq!(response.tags, vec!["US Stock"]);
    assert_eq!(
        response.metadata.unwrap().raw_response.as_deref(),
        Some(FENCED)
    );
    mock.assert();
}

#[test]
fn upstream_failure_surfaces_as_completion_error() {
    let mut server = mockito::Server::new();
    server
        .mock("POST", "/chat/completions")
        .with_status(401)
        .with_body(r#"{"error":"invalid api key"}"#)
        .create();

    let service = AnnotationService::new(config(&server.url()));
    let err = service.annotate("x", None, None).unwrap_err();

    assert!(!err.is_user_error());
    assert!(err.to_string().contains("401"));
}

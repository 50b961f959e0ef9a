use super::*;
use crate::annotation::AnnotationStatus;
use crate::completion::Role;
use crate::testing::{StubFactory, sample_config};

const FENCED_REPLY: &str = "```json\n{\"tags\": [\"US Stock\",\"Crypto\"]}\n```";

fn service_with(factory: Arc<StubFactory>) -> AnnotationService {
    AnnotationService::with_client_factory(sample_config(), factory)
}

#[test]
fn list_operations_return_names_in_config_order() {
    let service = service_with(StubFactory::replying("{}"));

    assert_eq!(
        service.list_annotators(),
        vec!["stock-chat-tagging", "open-tagging"]
    );
    assert_eq!(service.list_models(), vec!["gpt-mini", "local"]);
}

#[test]
fn annotate_defaults_to_first_annotator_and_model() {
    let factory = StubFactory::replying(FENCED_REPLY);
    let service = service_with(factory.clone());

    let response = service
        .annotate("TSLA up 5% after earnings", None, None)
        .expect("annotate should succeed");

    assert_eq!(response.status, AnnotationStatus::Success);
    assert_eq!(response.tags, vec!["US Stock"]);
    assert_eq!(*factory.models.lock().unwrap(), vec!["gpt-mini"]);
    assert_eq!(factory.completions(), 1);
}

#[test]
fn annotate_with_zero_shot_annotator_keeps_capped_new_tags() {
    let factory = StubFactory::replying(FENCED_REPLY);
    let service = service_with(factory);

    let response = service
        .annotate("BTC rallies", Some("open-tagging"), Some("local"))
        .expect("annotate should succeed");

    assert_eq!(response.tags, vec!["US Stock", "Crypto"]);
    let metadata = response.metadata.expect("metadata present");
    assert_eq!(metadata.new_tags, Some(vec!["Crypto".to_string()]));
}

#[test]
fn unknown_annotator_fails_before_any_external_call() {
    let factory = StubFactory::replying(FENCED_REPLY);
    let service = service_with(factory.clone());

    let err = service
        .annotate("anything", Some("missing"), None)
        .expect_err("lookup should fail");

    assert!(matches!(
        err,
        AnnotateError::Lookup(LookupError::AnnotatorNotFound(ref name)) if name == "missing"
    ));
    assert!(err.is_user_error());
    assert_eq!(err.to_string(), "Annotator 'missing' not found in config");
    assert_eq!(factory.connects(), 0);
    assert_eq!(factory.completions(), 0);
}

#[test]
fn unknown_model_fails_before_any_external_call() {
    let factory = StubFactory::replying(FENCED_REPLY);
    let service = service_with(factory.clone());

    let err = service
        .annotate("anything", Some("stock-chat-tagging"), Some("gpt-9"))
        .expect_err("lookup should fail");

    assert_eq!(err.to_string(), "Model 'gpt-9' not found in config");
    assert_eq!(factory.connects(), 0);
}

#[test]
fn empty_configuration_reports_nothing_configured() {
    let factory = StubFactory::replying("{}");
    let service = AnnotationService::with_client_factory(Config::default(), factory.clone());

    let err = service.annotate("x", None, None).unwrap_err();
    assert_eq!(err.to_string(), "No annotators configured");
    assert_eq!(factory.connects(), 0);
}

#[test]
fn blank_names_select_defaults() {
    let factory = StubFactory::replying(r#"{"tags": ["Accounting"]}"#);
    let service = service_with(factory.clone());

    let response = service.annotate("ledger", Some(""), Some("   ")).unwrap();
    assert_eq!(response.tags, vec!["Accounting"]);
    assert_eq!(*factory.models.lock().unwrap(), vec!["gpt-mini"]);
}

#[test]
fn completion_failure_is_not_a_user_error() {
    let factory = StubFactory::failing("upstream unavailable");
    let service = service_with(factory.clone());

    let err = service.annotate("x", None, None).unwrap_err();
    assert!(matches!(err, AnnotateError::Completion(_)));
    assert!(!err.is_user_error());
    assert!(err.to_string().contains("upstream unavailable"));
    assert_eq!(factory.completions(), 1);
}

#[test]
fn unparseable_reply_returns_failed_response_not_error() {
    let service = service_with(StubFactory::replying("I think it is about stocks."));

    let response = service.annotate("x", None, None).unwrap();
    assert_eq!(response.status, AnnotationStatus::Failed);
    assert!(response.tags.is_empty());
    assert!(response.error().is_some());
}

#[test]
fn empty_tag_list_is_success() {
    let service = service_with(StubFactory::replying(r#"{"tags": []}"#));

    let response = service.annotate("x", None, None).unwrap();
    assert_eq!(response.status, AnnotationStatus::Success);
    assert!(response.tags.is_empty());
}

#[test]
fn prompt_carries_context_and_instruction() {
    let factory = StubFactory::replying("{}");
    let service = service_with(factory.clone());

    service
        .annotate("Is TSMC cheap at 15x?", Some("stock-chat-tagging"), None)
        .unwrap();

    let requests = factory.requests.lock().unwrap();
    let messages = &requests[0];
    assert_eq!(messages[0].role, Role::System);
    assert!(messages[0].content.contains("Tag finance chat messages."));
    assert!(messages[0].content.contains("\"US Stock\", \"Accounting\""));
    assert_eq!(messages[1].role, Role::User);
    assert!(messages[1].content.contains("Is TSMC cheap at 15x?"));
}

#[test]
fn clones_share_configuration() {
    let service = service_with(StubFactory::replying("{}"));
    let clone = service.clone();

    assert!(std::ptr::eq(service.config(), clone.config()));
}

#[test]
fn concurrent_calls_run_independently() {
    let factory = StubFactory::replying(r#"{"tags": ["US Stock"]}"#);
    let service = service_with(factory.clone());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let service = service.clone();
            std::thread::spawn(move || service.annotate(&format!("message {i}"), None, None))
        })
        .collect();

    for handle in handles {
        let response = handle.join().unwrap().unwrap();
        assert_eq!(response.tags, vec!["US Stock"]);
    }
    assert_eq!(factory.completions(), 8);
}

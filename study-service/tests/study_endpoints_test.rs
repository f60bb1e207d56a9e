mod common;

use axum::http::StatusCode;
use common::{json_request, router_with, send, Behavior, RecordingPdfExtractor, RecordingTextProvider};
use study_service::models::Capability;

#[tokio::test]
async fn summarize_forwards_normalized_text() {
    let provider = RecordingTextProvider::new(Behavior::Echo);
    let router = router_with(provider.clone(), RecordingPdfExtractor::returning("unused"));

    let (status, body) = send(
        router,
        json_request("/summarize", r#"{"text": "  hello   world  "}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"], "summary:hello world");
    assert_eq!(
        provider.calls(),
        vec![(Capability::Summary, "hello world".to_string())]
    );
}

#[tokio::test]
async fn each_endpoint_returns_exactly_its_key() {
    let cases = [
        ("/summarize", "summary", Capability::Summary),
        ("/generate-quiz", "quiz", Capability::Quiz),
        ("/explain", "explanation", Capability::Explanation),
        ("/study-plan", "plan", Capability::StudyPlan),
        ("/flashcards", "flashcards", Capability::Flashcards),
    ];

    for (path, key, capability) in cases {
        let provider = RecordingTextProvider::new(Behavior::Echo);
        let router = router_with(provider.clone(), RecordingPdfExtractor::returning("unused"));

        let (status, body) = send(router, json_request(path, r#"{"text": "mitosis\n\tphases"}"#)).await;

        assert_eq!(status, StatusCode::OK, "{path}");
        let object = body.as_object().expect("response must be an object");
        assert_eq!(object.len(), 1, "{path} returned {body}");
        assert!(object[key].is_string(), "{path} missing {key}");
        assert_eq!(provider.calls(), vec![(capability, "mitosis phases".to_string())]);
    }
}

#[tokio::test]
async fn empty_text_is_accepted() {
    let provider = RecordingTextProvider::new(Behavior::Echo);
    let router = router_with(provider.clone(), RecordingPdfExtractor::returning("unused"));

    let (status, body) = send(router, json_request("/explain", r#"{"text": "   "}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["explanation"], "explanation:");
    assert_eq!(provider.calls(), vec![(Capability::Explanation, String::new())]);
}

#[tokio::test]
async fn missing_text_is_client_error_on_every_endpoint() {
    for capability in Capability::ALL {
        let provider = RecordingTextProvider::new(Behavior::Echo);
        let router = router_with(provider.clone(), RecordingPdfExtractor::returning("unused"));

        let (status, body) = send(router, json_request(capability.route(), r#"{"content": "x"}"#)).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", capability.route());
        assert!(body["error"].as_str().unwrap().contains("text"), "{body}");
        assert!(provider.calls().is_empty());
    }
}

#[tokio::test]
async fn malformed_json_is_structured_client_error() {
    let provider = RecordingTextProvider::new(Behavior::Echo);
    let router = router_with(provider.clone(), RecordingPdfExtractor::returning("unused"));

    let (status, body) = send(router, json_request("/generate-quiz", r#"{"text": "#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn non_string_text_is_client_error() {
    let provider = RecordingTextProvider::new(Behavior::Echo);
    let router = router_with(provider, RecordingPdfExtractor::returning("unused"));

    let (status, _) = send(router, json_request("/flashcards", r#"{"text": 42}"#)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn provider_failure_is_bad_gateway_without_details() {
    let provider = RecordingTextProvider::new(Behavior::Fail);
    let router = router_with(provider.clone(), RecordingPdfExtractor::returning("unused"));

    let (status, body) = send(router, json_request("/study-plan", r#"{"text": "algebra"}"#)).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"], "Upstream service error");
    assert!(!body.to_string().contains("secret-123"));
    assert_eq!(provider.calls().len(), 1);
}

#[tokio::test]
async fn slow_provider_times_out() {
    let provider = RecordingTextProvider::new(Behavior::Hang);
    let router = router_with(provider, RecordingPdfExtractor::returning("unused"));

    let (status, body) = send(router, json_request("/summarize", r#"{"text": "slow"}"#)).await;

    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(body["error"], "Upstream service timed out");
}

#[tokio::test]
async fn get_on_text_endpoint_is_not_allowed() {
    let provider = RecordingTextProvider::new(Behavior::Echo);
    let router = router_with(provider, RecordingPdfExtractor::returning("unused"));

    let request = axum::http::Request::builder()
        .uri("/summarize")
        .body(axum::body::Body::empty())
        .unwrap();
    let (status, _) = send(router, request).await;

    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

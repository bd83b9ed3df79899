use orian_chat::message::{ChatResponse, ErrorBody, PROBE_HEADER};
use orian_chat::routes::create_router;
use orian_chat::services::completion::{CompletionClient, UpstreamError};
use orian_chat::services::relay::{FALLBACK_MESSAGE, SYSTEM_PROMPT};
use orian_chat::state::AppState;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use std::sync::{Arc, Mutex};
use tower::util::ServiceExt;

#[derive(Default)]
struct FakeCompletion {
    reply: Option<String>,
    seen: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl CompletionClient for FakeCompletion {
    async fn complete(&self, system: &str, user: &str) -> Result<String, UpstreamError> {
        self.seen.lock().unwrap().push((system.to_string(), user.to_string()));
        match &self.reply {
            Some(r) => Ok(r.clone()),
            None => Err(UpstreamError::Status { status: 401, message: "Incorrect API key provided".to_string() }),
        }
    }
}

fn app(completion: Arc<FakeCompletion>) -> axum::Router {
    let state = Arc::new(AppState::new(completion));
    create_router("public").with_state(state)
}

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

#[tokio::test]
async fn test_chat_endpoint_relays_reply() {
    let completion = Arc::new(FakeCompletion {
        reply: Some("Greetings, traveler.".to_string()),
        ..Default::default()
    });
    let response = app(completion.clone())
        .oneshot(post(
            "/chat",
            r#"{"message": "Who are you?", "clientId": "client_x", "conversationId": "conv_1_a",
                "preferences": {"responseStyle": "strategic"}, "timestamp": "2026-10-17T10:00:00.000Z"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(chat_resp.content, "Greetings, traveler.");
    assert_eq!(chat_resp.follow_up_questions, None);

    let seen = completion.seen.lock().unwrap();
    assert_eq!(seen.as_slice(), &[(SYSTEM_PROMPT.to_string(), "Who are you?".to_string())]);
}

#[tokio::test]
async fn test_netlify_path_is_served_by_same_handler() {
    let completion = Arc::new(FakeCompletion { reply: Some("Aye.".to_string()), ..Default::default() });
    let response = app(completion)
        .oneshot(post("/.netlify/functions/chat", r#"{"message": "hi"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_message_uses_fallback_prompt() {
    let completion = Arc::new(FakeCompletion { reply: Some("I am Orian.".to_string()), ..Default::default() });
    let response = app(completion.clone()).oneshot(post("/chat", "{}")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(completion.seen.lock().unwrap()[0].1, FALLBACK_MESSAGE);
}

#[tokio::test]
async fn test_upstream_failure_is_500_with_error_body() {
    let completion = Arc::new(FakeCompletion::default());
    let response = app(completion).oneshot(post("/chat", r#"{"message": "hello"}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(body.error.starts_with("AI function failed. "));
    assert!(body.error.contains("Incorrect API key provided"));
}

#[tokio::test]
async fn test_flagged_connectivity_check_answered_without_upstream() {
    let completion = Arc::new(FakeCompletion::default());
    let mut request = post("/chat", r#"{"message": "connection_test"}"#);
    request.headers_mut().insert(PROBE_HEADER, "1".parse().unwrap());
    let response = app(completion.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(chat_resp.status.as_deref(), Some("connected"));
    assert!(completion.seen.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_400() {
    let completion = Arc::new(FakeCompletion::default());
    let response = app(completion).oneshot(post("/chat", "not json")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(!body.error.is_empty());
}

#[tokio::test]
async fn test_health() {
    let completion = Arc::new(FakeCompletion::default());
    let response = app(completion)
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}

#[tokio::test]
async fn test_typed_connection_test_reaches_completion_client() {
    let completion = Arc::new(FakeCompletion {
        reply: Some("Speak plainly, traveler.".to_string()),
        ..Default::default()
    });
    let response = app(completion.clone())
        .oneshot(post("/chat", r#"{"message": "connection_test"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let chat_resp: ChatResponse = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert_eq!(chat_resp.content, "Speak plainly, traveler.");
    assert_eq!(chat_resp.status, None);
    assert_eq!(completion.seen.lock().unwrap()[0].1, "connection_test");
}

#[tokio::test]
async fn test_missing_content_type_keeps_415() {
    let completion = Arc::new(FakeCompletion::default());
    let request = Request::builder()
        .method("POST")
        .uri("/chat")
        .body(Body::from(r#"{"message": "hello"}"#))
        .unwrap();
    let response = app(completion.clone()).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    let body: ErrorBody = serde_json::from_slice(&body_bytes(response).await).unwrap();
    assert!(!body.error.is_empty());
    assert!(completion.seen.lock().unwrap().is_empty());
}

use std::time::{Duration, Instant};

use mavix::backend::{AccountRole, BackendError, HttpBackend, Role, ThreadBackend};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Helper Functions
// ============================================================================

fn backend_for(server: &MockServer) -> HttpBackend {
    HttpBackend::new(server.uri(), None, 5)
}

// ============================================================================
// Thread List
// ============================================================================

#[tokio::test]
async fn test_list_threads_parses_server_order() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!([
        {"threadId": "t1", "title": "Trip Plan", "updatedAt": "2026-08-01T10:00:00Z"},
        {"threadId": "t2", "title": "recipe"}
    ]);
    Mock::given(method("GET"))
        .and(path("/api/thread"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let threads = backend_for(&mock_server).list_threads().await.unwrap();
    assert_eq!(threads.len(), 2);
    assert_eq!(threads[0].thread_id, "t1");
    assert_eq!(threads[0].title, "Trip Plan");
    assert!(threads[0].updated_at.is_some());
    assert!(threads[1].updated_at.is_none());
}

#[tokio::test]
async fn test_list_threads_server_error_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/thread"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&mock_server)
        .await;

    let result = backend_for(&mock_server).list_threads().await;
    assert!(matches!(result, Err(BackendError::Api { status: 500, .. })));
}

#[tokio::test]
async fn test_list_threads_network_failure() {
    // Nothing is listening on this port.
    let backend = HttpBackend::new("http://127.0.0.1:1".to_string(), None, 1);
    let result = backend.list_threads().await;
    assert!(matches!(result, Err(BackendError::Network(_))));
}

// ============================================================================
// Transcript Fetch / Delete
// ============================================================================

#[tokio::test]
async fn test_fetch_thread_returns_ordered_turns() {
    let mock_server = MockServer::start().await;

    let body = serde_json::json!([
        {"role": "user", "content": "hi"},
        {"role": "assistant", "content": "hello"}
    ]);
    Mock::given(method("GET"))
        .and(path("/api/thread/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&mock_server)
        .await;

    let turns = backend_for(&mock_server).fetch_thread("t1").await.unwrap();
    assert_eq!(turns.len(), 2);
    assert_eq!(turns[0].role, Role::User);
    assert_eq!(turns[1].role, Role::Assistant);
    assert_eq!(turns[1].content, "hello");
}

#[tokio::test]
async fn test_delete_thread_acks() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/thread/t1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(backend_for(&mock_server).delete_thread("t1").await.is_ok());
}

#[tokio::test]
async fn test_delete_missing_thread_is_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/thread/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&mock_server)
        .await;

    let result = backend_for(&mock_server).delete_thread("nope").await;
    assert!(matches!(result, Err(BackendError::Api { status: 404, .. })));
}

// ============================================================================
// Exchange
// ============================================================================

#[tokio::test]
async fn test_post_exchange_sends_prompt_and_returns_reply() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(serde_json::json!({
            "threadId": "t1",
            "messages": "What is Rust?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "reply": {"response": "A systems language."}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let reply = backend_for(&mock_server)
        .post_exchange("t1", "What is Rust?", CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(reply, "A systems language.");
}

#[tokio::test]
async fn test_post_exchange_auth_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .mount(&mock_server)
        .await;

    let result = backend_for(&mock_server)
        .post_exchange("t1", "hi", CancellationToken::new())
        .await;
    assert!(matches!(result, Err(BackendError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_post_exchange_malformed_body_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let result = backend_for(&mock_server)
        .post_exchange("t1", "hi", CancellationToken::new())
        .await;
    assert!(matches!(result, Err(BackendError::Parse(_))));
}

#[tokio::test]
async fn test_post_exchange_cancellation_aborts_before_completion() {
    let mock_server = MockServer::start().await;

    // Server "generates" for 5 seconds; the user stops after 50ms.
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(serde_json::json!({"reply": {"response": "too late"}})),
        )
        .mount(&mock_server)
        .await;

    let backend = backend_for(&mock_server);
    let token = CancellationToken::new();
    let cancel = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        cancel.cancel();
    });

    let started = Instant::now();
    let result = backend.post_exchange("t1", "hi", token).await;

    assert!(matches!(result, Err(BackendError::Cancelled)));
    // The transport aborted; we did not wait out the server delay.
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[tokio::test]
async fn test_already_cancelled_token_short_circuits() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_secs(5))
                .set_body_json(serde_json::json!({"reply": {"response": "unused"}})),
        )
        .mount(&mock_server)
        .await;

    let token = CancellationToken::new();
    token.cancel();
    let result = backend_for(&mock_server)
        .post_exchange("t1", "hi", token)
        .await;
    assert!(matches!(result, Err(BackendError::Cancelled)));
}

// ============================================================================
// Auth / Session
// ============================================================================

#[tokio::test]
async fn test_current_role_parses_admin() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/auth/me/role"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"role": "admin"})))
        .mount(&mock_server)
        .await;

    let role = backend_for(&mock_server).current_role().await.unwrap();
    assert_eq!(role, AccountRole::Admin);
}

#[tokio::test]
async fn test_session_cookie_attached_when_configured() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/thread"))
        .and(header("Cookie", "session=abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let backend = HttpBackend::new(mock_server.uri(), Some("session=abc123".to_string()), 5);
    assert!(backend.list_threads().await.unwrap().is_empty());
}

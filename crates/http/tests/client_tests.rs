//! Integration tests for the Taskpad HTTP client

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use taskpad_core::{MemoryTokenStore, TaskDraft, TokenStore};
use taskpad_http::{ClientError, Gateway, SessionStore, TaskClient};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn session_over(uri: &str) -> (SessionStore, Arc<MemoryTokenStore>) {
    let client = TaskClient::new(uri).unwrap();
    let store = Arc::new(MemoryTokenStore::new());
    let session = SessionStore::new(client, store.clone() as Arc<dyn TokenStore>);
    (session, store)
}

fn gateway_over(uri: &str) -> (Gateway, Arc<MemoryTokenStore>) {
    let client = TaskClient::new(uri).unwrap();
    let (session, store) = session_over(uri);
    (Gateway::new(client, session), store)
}

fn task_json(id: i64, title: &str, completed: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": null,
        "is_completed": completed,
        "created_at": "2026-01-05T10:00:00Z",
        "updated_at": "2026-01-05T10:00:00Z"
    })
}

#[tokio::test]
async fn test_client_builder() {
    let client = TaskClient::builder()
        .base_url("http://localhost:8000/api/")
        .build();

    assert!(client.is_ok());
    let client = client.unwrap();
    assert_eq!(client.base_url(), "http://localhost:8000/api");
}

#[tokio::test]
async fn test_client_builder_requires_base_url() {
    let result = TaskClient::builder().build();
    assert!(matches!(result, Err(ClientError::Configuration(_))));
}

#[tokio::test]
async fn test_login_stores_tokens() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/"))
        .and(body_json(json!({"username": "alice", "password": "password123"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .mount(&mock_server)
        .await;

    let (session, store) = session_over(&mock_server.uri());
    assert!(!session.is_authenticated());

    let pair = session.login("alice", "password123").await.unwrap();
    assert_eq!(pair.access, "a1");
    assert_eq!(pair.refresh, "r1");
    assert!(session.is_authenticated());
    assert_eq!(store.access_token().as_deref(), Some("a1"));
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_login_rejected_surfaces_detail() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "No active account found with the given credentials"
        })))
        .mount(&mock_server)
        .await;

    let (session, _) = session_over(&mock_server.uri());
    let result = session.login("alice", "wrong").await;

    match result {
        Err(ClientError::AuthenticationFailed(message)) => {
            assert_eq!(message, "No active account found with the given credentials");
        }
        other => panic!("expected AuthenticationFailed, got {other:?}"),
    }
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_register_establishes_no_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/register/"))
        .and(body_json(json!({
            "username": "alice",
            "email": "alice@example.com",
            "password": "password123"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1, "username": "alice", "email": "alice@example.com"
        })))
        .mount(&mock_server)
        .await;

    let (session, _) = session_over(&mock_server.uri());
    session
        .register("alice", "alice@example.com", "password123")
        .await
        .unwrap();
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_register_field_errors_checked_in_order() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "email": ["Enter a valid email address."],
            "password": ["This password is too short."]
        })))
        .mount(&mock_server)
        .await;

    let (session, _) = session_over(&mock_server.uri());
    let result = session.register("alice", "not-an-email", "pw").await;

    match result {
        Err(ClientError::Validation(message)) => {
            assert_eq!(message, "Enter a valid email address.");
        }
        other => panic!("expected Validation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_refresh_replaces_access_and_preserves_refresh() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a2"})))
        .mount(&mock_server)
        .await;

    let (session, store) = session_over(&mock_server.uri());
    store.set_pair("a1", "r1");

    let access = session.refresh().await;
    assert_eq!(access.as_deref(), Some("a2"));
    assert_eq!(store.access_token().as_deref(), Some("a2"));
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_refresh_without_token_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (session, _) = session_over(&mock_server.uri());
    assert_eq!(session.refresh().await, None);
}

#[tokio::test]
async fn test_refresh_failure_clears_session() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is invalid or expired"
        })))
        .mount(&mock_server)
        .await;

    let (session, store) = session_over(&mock_server.uri());
    store.set_pair("a1", "r-bad");

    assert_eq!(session.refresh().await, None);
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), None);
}

#[tokio::test]
async fn test_logout_is_idempotent() {
    let mock_server = MockServer::start().await;
    let (session, store) = session_over(&mock_server.uri());
    store.set_pair("a1", "r1");

    session.logout();
    assert!(!session.is_authenticated());
    session.logout();
    assert!(!session.is_authenticated());
    assert_eq!(store.refresh_token(), None);
}

#[tokio::test]
async fn test_gateway_sends_bearer_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&mock_server)
        .await;

    let (gateway, store) = gateway_over(&mock_server.uri());
    store.set_pair("a1", "r1");

    let page = gateway.list_tasks().await.unwrap();
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_gateway_omits_header_without_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(header_exists("authorization"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&mock_server)
        .await;

    let (gateway, _) = gateway_over(&mock_server.uri());
    gateway.list_tasks().await.unwrap();
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_retried_once() {
    let mock_server = MockServer::start().await;

    // First attempt carries the stale token and is rejected.
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!({"results": [task_json(1, "Buy milk", false)]})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gateway, store) = gateway_over(&mock_server.uri());
    store.set_pair("stale", "r1");

    let page = gateway.list_tasks().await.unwrap();
    assert_eq!(page.results.len(), 1);
    assert_eq!(store.access_token().as_deref(), Some("fresh"));
    assert_eq!(store.refresh_token().as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_second_unauthorized_is_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
        .expect(2)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "fresh"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let (gateway, store) = gateway_over(&mock_server.uri());
    store.set_pair("stale", "r1");

    let result = gateway.list_tasks().await;
    assert!(matches!(result, Err(ClientError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn test_fatal_session_loss_notifies_handler() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let expired = Arc::new(AtomicBool::new(false));
    let flag = expired.clone();

    let (gateway, store) = gateway_over(&mock_server.uri());
    let gateway = gateway.on_session_expired(move || flag.store(true, Ordering::SeqCst));
    store.set_pair("stale", "r-bad");

    let result = gateway.list_tasks().await;
    assert!(matches!(result, Err(ClientError::SessionExpired)));
    assert!(expired.load(Ordering::SeqCst));
    assert_eq!(store.access_token(), None);
    assert_eq!(store.refresh_token(), None);
}

#[tokio::test]
async fn test_other_errors_are_not_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/tasks/9/"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not found"))
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token/refresh/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (gateway, store) = gateway_over(&mock_server.uri());
    store.set_pair("a1", "r1");

    let result = gateway.get_task(9).await;
    assert!(matches!(result, Err(ClientError::NotFound(_))));
}

#[tokio::test]
async fn test_empty_title_rejected_before_any_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&mock_server)
        .await;

    let (gateway, store) = gateway_over(&mock_server.uri());
    store.set_pair("a1", "r1");

    let result = gateway.create_task(&TaskDraft::new("")).await;
    assert!(matches!(result, Err(ClientError::Validation(_))));
}

#[tokio::test]
async fn test_toggle_sends_partial_update() {
    let mock_server = MockServer::start().await;

    Mock::given(method("PATCH"))
        .and(path("/tasks/1/"))
        .and(body_json(json!({"is_completed": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(1, "Buy milk", true)))
        .mount(&mock_server)
        .await;

    let (gateway, store) = gateway_over(&mock_server.uri());
    store.set_pair("a1", "r1");

    let task = gateway.toggle_task(1, false).await.unwrap();
    assert!(task.is_completed);
}

#[tokio::test]
async fn test_delete_task_accepts_empty_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/tasks/1/"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let (gateway, store) = gateway_over(&mock_server.uri());
    store.set_pair("a1", "r1");

    gateway.delete_task(1).await.unwrap();
}

#[tokio::test]
async fn test_register_login_and_empty_list_flow() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/register/"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "id": 1, "username": "alice", "email": "alice@example.com"
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/token/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})),
        )
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .mount(&mock_server)
        .await;

    let client = TaskClient::new(mock_server.uri()).unwrap();
    let store = Arc::new(MemoryTokenStore::new());
    let session = SessionStore::new(client.clone(), store.clone() as Arc<dyn TokenStore>);
    let gateway = Gateway::new(client, session.clone());

    session
        .register("alice", "alice@example.com", "password123")
        .await
        .unwrap();
    let pair = session.login("alice", "password123").await.unwrap();
    assert_eq!(pair.access, "a1");

    let page = gateway.list_tasks().await.unwrap();
    assert!(page.results.is_empty());
}

#[tokio::test]
async fn test_create_then_toggle_flow() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tasks/"))
        .and(body_json(json!({"title": "Buy milk"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(task_json(1, "Buy milk", false)))
        .mount(&mock_server)
        .await;
    // The list reflects the task as not completed until the toggle lands.
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!({"results": [task_json(1, "Buy milk", false)]})))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/tasks/1/"))
        .and(body_json(json!({"is_completed": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(task_json(1, "Buy milk", true)))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tasks/"))
        .respond_with(ResponseTemplate::new(200)
            .set_body_json(json!({"results": [task_json(1, "Buy milk", true)]})))
        .mount(&mock_server)
        .await;

    let (gateway, store) = gateway_over(&mock_server.uri());
    store.set_pair("a1", "r1");

    let created = gateway.create_task(&TaskDraft::new("Buy milk")).await.unwrap();
    assert!(!created.is_completed);

    let page = gateway.list_tasks().await.unwrap();
    assert_eq!(page.results[0].title, "Buy milk");
    assert!(!page.results[0].is_completed);

    gateway.toggle_task(1, page.results[0].is_completed).await.unwrap();

    let page = gateway.list_tasks().await.unwrap();
    assert!(page.results[0].is_completed);
}

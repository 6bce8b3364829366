//! Mock API tests for authsession-http.
//!
//! A wiremock server stands in for the REST API so the client, the
//! controller and the interceptor can be exercised end to end without a
//! real backend.

use std::sync::Arc;
use std::time::Duration;

use authsession_core::{
    AccessToken, ApiUrl, AuthApi, Credentials, Error, SessionController, SessionEvent,
    SessionState, TokenPair, TokenStore,
};
use authsession_http::{AuthorizedClient, ClientConfig, HttpAuthClient};
use futures_util::future::join_all;
use serde_json::{Value, json};
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const EMAIL: &str = "test@test.com";
const PASSWORD: &str = "password123";

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig::new(ApiUrl::new(server.uri()).unwrap())
}

fn client(server: &MockServer) -> HttpAuthClient {
    HttpAuthClient::new(&config(server)).unwrap()
}

fn token_body(token: &str) -> Value {
    json!({ "access_token": token, "token_type": "bearer" })
}

fn user_body() -> Value {
    json!({
        "id": 1,
        "email": EMAIL,
        "full_name": "Test User",
        "is_active": true,
        "is_superuser": false
    })
}

/// A controller that already holds `tok-1`.
fn restored(server: &MockServer) -> SessionController {
    let tokens = TokenStore::in_memory();
    tokens.set(TokenPair::bearer("tok-1"));
    SessionController::new(Arc::new(client(server)), tokens)
}

async fn mount_me(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .mount(server)
        .await;
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn test_login_sends_form_and_returns_pair() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/access-token"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string("username=test%40test.com&password=password123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1")))
        .expect(1)
        .mount(&server)
        .await;

    let pair = client(&server)
        .login(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap();

    assert_eq!(pair, TokenPair::bearer("tok-1"));
}

#[tokio::test]
async fn test_login_scenario_through_controller() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-1")))
        .mount(&server)
        .await;
    mount_me(&server, "tok-1").await;

    let controller = SessionController::new(Arc::new(client(&server)), TokenStore::in_memory());
    let user = controller
        .login(Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap();

    assert_eq!(user.display_label(), "Test User");
    let session = controller.session();
    assert_eq!(session.state, SessionState::Authenticated);
    assert!(session.authenticated);
    assert_eq!(session.current_user.map(|u| u.id), Some(1));
    assert_eq!(
        controller.token().map(|p| p.access_token().as_str().to_string()),
        Some("tok-1".to_string())
    );
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    for status in [400, 401] {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/login/access-token"))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_json(json!({ "detail": "Incorrect email or password" })),
            )
            .mount(&server)
            .await;

        let controller =
            SessionController::new(Arc::new(client(&server)), TokenStore::in_memory());
        let err = controller
            .login(Credentials::new(EMAIL, "wrong"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::InvalidCredentials), "status {}", status);
        assert_eq!(controller.state(), SessionState::Error);
        assert!(controller.token().is_none());
    }
}

#[tokio::test]
async fn test_login_inactive_user() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/access-token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({ "detail": "Inactive user" })))
        .mount(&server)
        .await;

    let err = client(&server)
        .login(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InactiveUser));
}

#[tokio::test]
async fn test_login_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/access-token"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let err = client(&server)
        .login(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnexpectedResponse(_)));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_login_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/access-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token_type": "bearer" })))
        .mount(&server)
        .await;

    let err = client(&server)
        .login(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::UnexpectedResponse(_)));
}

#[tokio::test]
async fn test_login_unreachable_server() {
    // Bind then release a port so nothing is listening on it.
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let config = ClientConfig::new(ApiUrl::new(format!("http://127.0.0.1:{}", port)).unwrap());

    let err = HttpAuthClient::new(&config)
        .unwrap()
        .login(&Credentials::new(EMAIL, PASSWORD))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Network(_)));
    assert!(err.is_transient());
}

// ============================================================================
// Refresh and current user
// ============================================================================

#[tokio::test]
async fn test_refresh_sends_bearer_token() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/refresh-token"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-2")))
        .expect(1)
        .mount(&server)
        .await;

    let pair = client(&server)
        .refresh(&TokenPair::bearer("tok-1"))
        .await
        .unwrap();

    assert_eq!(pair, TokenPair::bearer("tok-2"));
}

#[tokio::test]
async fn test_refresh_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/refresh-token"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "detail": "Could not validate credentials" })),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .refresh(&TokenPair::bearer("tok-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::RefreshRejected));
}

#[tokio::test]
async fn test_fetch_current_user_status_mapping() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(header("authorization", "Bearer expired"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "detail": "Could not validate credentials" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(header("authorization", "Bearer limited"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({ "detail": "The user doesn't have enough privileges" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(header("authorization", "Bearer gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "User not found" })))
        .mount(&server)
        .await;
    mount_me(&server, "tok-1").await;

    let client = client(&server);

    let user = client
        .fetch_current_user(&AccessToken::new("tok-1"))
        .await
        .unwrap();
    assert_eq!(user.email, EMAIL);
    assert_eq!(user.display_name.as_deref(), Some("Test User"));

    let err = client
        .fetch_current_user(&AccessToken::new("expired"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Unauthorized));

    let err = client
        .fetch_current_user(&AccessToken::new("limited"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Forbidden(ref d) if d.contains("privileges")));

    let err = client
        .fetch_current_user(&AccessToken::new("gone"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::UnexpectedResponse(_)));
    assert!(err.to_string().contains("404"));
}

#[tokio::test]
async fn test_current_user_without_token_makes_no_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(user_body()))
        .expect(0)
        .mount(&server)
        .await;

    let controller = SessionController::new(Arc::new(client(&server)), TokenStore::in_memory());
    let err = controller.current_user().await.unwrap_err();

    assert!(matches!(err, Error::Unauthorized));
    server.verify().await;
}

#[tokio::test]
async fn test_verify_refreshes_expired_token() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users/me"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-2")))
        .expect(1)
        .mount(&server)
        .await;
    mount_me(&server, "tok-2").await;

    let controller = restored(&server);
    let user = controller.verify().await.unwrap();

    assert_eq!(user.id, 1);
    assert_eq!(controller.state(), SessionState::Authenticated);
    assert_eq!(controller.token(), Some(TokenPair::bearer("tok-2")));
}

// ============================================================================
// Authorized requests
// ============================================================================

async fn mount_items(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/items/"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/items/"))
        .and(header("authorization", "Bearer tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [], "count": 0 })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_authorized_request_refreshes_and_retries() {
    let server = MockServer::start().await;
    mount_items(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/refresh-token"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-2")))
        .expect(1)
        .mount(&server)
        .await;

    let controller = restored(&server);
    let mut events = controller.subscribe();
    let client = AuthorizedClient::new(&config(&server), &controller).unwrap();

    let items: Value = client.get_json("/api/v1/items/").await.unwrap();

    assert_eq!(items["count"], 0);
    assert_eq!(controller.token(), Some(TokenPair::bearer("tok-2")));
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Refreshed);
}

#[tokio::test]
async fn test_refresh_rejected_expires_session() {
    let server = MockServer::start().await;
    mount_items(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/refresh-token"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })))
        .expect(1)
        .mount(&server)
        .await;

    let controller = restored(&server);
    let mut events = controller.subscribe();
    let client = AuthorizedClient::new(&config(&server), &controller).unwrap();

    let err = client.get("/api/v1/items/").await.unwrap_err();

    assert!(matches!(err, Error::SessionExpired));
    assert!(controller.token().is_none());
    assert!(!controller.is_authenticated());
    assert_eq!(controller.state(), SessionState::Anonymous);
    assert_eq!(events.try_recv().unwrap(), SessionEvent::Expired);
}

#[tokio::test]
async fn test_concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;
    mount_items(&server).await;

    Mock::given(method("POST"))
        .and(path("/api/v1/login/refresh-token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("tok-2"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let controller = restored(&server);
    let client = AuthorizedClient::new(&config(&server), &controller).unwrap();

    let results = join_all((0..5).map(|_| client.get_json::<Value>("/api/v1/items/"))).await;

    for result in results {
        assert_eq!(result.unwrap()["count"], 0);
    }
    server.verify().await;
}

#[tokio::test]
async fn test_unauthenticated_401_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "detail": "Not authenticated" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/login/refresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-2")))
        .expect(0)
        .mount(&server)
        .await;

    let controller = SessionController::new(Arc::new(client(&server)), TokenStore::in_memory());
    let client = AuthorizedClient::new(&config(&server), &controller).unwrap();

    let err = client.get("/api/v1/items/").await.unwrap_err();

    assert!(matches!(err, Error::Unauthorized));
    server.verify().await;
}

#[tokio::test]
async fn test_other_statuses_pass_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/items/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "detail": "Item not found" })))
        .mount(&server)
        .await;

    let controller = restored(&server);
    let client = AuthorizedClient::new(&config(&server), &controller).unwrap();

    let response = client.get("/api/v1/items/42").await.unwrap();
    assert_eq!(response.status().as_u16(), 404);

    let err = client.get_json::<Value>("/api/v1/items/42").await.unwrap_err();
    assert!(err.to_string().contains("Item not found"));
    assert!(controller.is_authenticated());
}

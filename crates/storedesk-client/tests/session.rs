//! Login, session check, logout and 401 handling

#![allow(clippy::unwrap_used)]

mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use storedesk_client::{ApiClient, ClientError, SessionState};
use storedesk_core::config::ApiConfig;
use storedesk_core::forms::LoginRequest;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn credentials() -> LoginRequest {
    LoginRequest {
        email: "admin@shop.test".to_string(),
        password: "hunter2".to_string(),
    }
}

#[tokio::test]
async fn test_login_marks_session_authenticated() {
    let (server, client) = mock_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_json(json!({"email": "admin@shop.test", "password": "hunter2"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "token=abc; Path=/; HttpOnly")
                .set_body_json(json!({
                    "message": "Login successful",
                    "admin": {"_id": "a1", "email": "admin@shop.test", "name": "Owner"}
                })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let profile = client.login(&credentials()).await.unwrap();

    assert_eq!(profile.id, "a1");
    assert_eq!(profile.name.as_deref(), Some("Owner"));
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_login_without_profile_uses_submitted_email() {
    let (server, client) = mock_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "ok"})))
        .mount(&server)
        .await;

    let profile = client.login(&credentials()).await.unwrap();
    assert_eq!(profile.email, "admin@shop.test");
}

#[tokio::test]
async fn test_login_failure_surfaces_backend_message() {
    let (server, client) = mock_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let err = client.login(&credentials()).await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.user_message("Login failed"), "Invalid credentials");
    assert_eq!(client.session().state(), SessionState::LoggedOut);
}

#[tokio::test]
async fn test_login_failure_without_message_falls_back() {
    let (server, client) = mock_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Bad Request"))
        .mount(&server)
        .await;

    let err = client.login(&credentials()).await.unwrap_err();
    assert_eq!(err.user_message("Login failed"), "Login failed");
}

#[tokio::test]
async fn test_blank_credentials_are_not_sent() {
    let (server, client) = mock_backend().await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client
        .login(&LoginRequest {
            email: "  ".to_string(),
            password: String::new(),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
}

#[tokio::test]
async fn test_me_accepts_bare_profile() {
    let (server, client) = mock_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"_id": "a1", "email": "admin@shop.test", "role": "admin"})),
        )
        .mount(&server)
        .await;

    let profile = client.me().await.unwrap();

    assert_eq!(profile.email, "admin@shop.test");
    assert_eq!(profile.extra.get("role"), Some(&json!("admin")));
    assert!(client.session().is_authenticated());
}

#[tokio::test]
async fn test_any_401_invalidates_the_session() {
    let (server, client) = mock_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"admin": {"email": "a@b.c"}})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/coupons"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Token expired"})))
        .mount(&server)
        .await;

    client.me().await.unwrap();
    assert!(client.session().is_authenticated());

    let err = client.list_coupons().await.unwrap_err();

    assert!(err.is_unauthorized());
    assert_eq!(err.to_string(), "Token expired");
    assert_eq!(client.session().state(), SessionState::LoggedOut);
}

#[tokio::test]
async fn test_logout_clears_session_even_when_backend_fails() {
    let (server, client) = mock_backend().await;
    Mock::given(method("GET"))
        .and(path("/api/admin/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"email": "a@b.c"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    client.me().await.unwrap();
    let result = client.logout().await;

    assert!(result.is_err());
    assert!(!client.session().is_authenticated());
}

#[tokio::test]
async fn test_transport_failure_is_reported() {
    common::init_test_logging();
    // nothing listens on port 9 of localhost
    let client = storedesk_client::ApiClient::new("http://127.0.0.1:9").unwrap();

    let err = client.me().await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(
        err.user_message("Something went wrong. Please try again."),
        "Something went wrong. Please try again."
    );
}

fn slow_session(delay: Duration) -> Mock {
    Mock::given(method("GET"))
        .and(path("/api/admin/me"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(delay)
                .set_body_json(json!({"admin": {"_id": "a1", "email": "admin@shop.test"}})),
        )
}

#[tokio::test]
async fn test_default_client_waits_for_slow_backend() {
    let (server, _) = mock_backend().await;
    slow_session(Duration::from_millis(1500)).mount(&server).await;

    let config = ApiConfig {
        base_url: server.uri(),
        ..ApiConfig::default()
    };
    let client = ApiClient::from_config(&config).unwrap();

    assert_eq!(client.me().await.unwrap().email, "admin@shop.test");
}

#[tokio::test]
async fn test_configured_request_timeout_applies() {
    let (server, _) = mock_backend().await;
    slow_session(Duration::from_millis(1500)).mount(&server).await;

    let config = ApiConfig {
        base_url: server.uri(),
        request_timeout_secs: Some(1),
        connect_timeout_secs: Some(1),
    };
    let client = ApiClient::from_config(&config).unwrap();

    let err = client.me().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)));
}

//! Session routing and the interactive shell against a mock backend

#![allow(clippy::unwrap_used)]

mod common;

use common::*;
use pretty_assertions::assert_eq;
use serde_json::json;
use storedesk_client::SessionState;
use storedesk_core::Config;
use storedesk_core::forms::LoginRequest;
use storedesk_dashboard::commands::{Commands, OrderCommands};
use storedesk_dashboard::views::ProductsView;
use storedesk_dashboard::{App, NoticeKind, Route, Shell};
use storedesk_core::listing::StatusFilter;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn unauthorized() -> ResponseTemplate {
    ResponseTemplate::new(401).set_body_json(json!({"message": "Not authorized"}))
}

async fn run(app: &mut App, script: &str) -> String {
    let mut out = Vec::new();
    app.run_shell(script.as_bytes(), &mut out).await.unwrap();
    String::from_utf8(out).unwrap()
}

#[tokio::test]
async fn test_start_without_session_routes_to_login() {
    let (server, ctx) = mock_context(true).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/me"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let mut shell = Shell::new(ctx.clone(), 120);

    assert_eq!(shell.start().await, &Route::Login);
    assert_eq!(ctx.client.session().state(), SessionState::LoggedOut);
    assert!(shell.profile().is_none());
}

#[tokio::test]
async fn test_start_with_session_opens_dashboard() {
    let (server, ctx) = mock_context(true).await;
    mount_session(&server).await;

    let mut shell = Shell::new(ctx, 120);

    assert_eq!(shell.start().await, &Route::Dashboard);
    assert_eq!(shell.profile().unwrap().email, "admin@shop.test");
    assert!(shell.nav().sidebar_open());
}

#[tokio::test]
async fn test_login_failure_keeps_login_route() {
    let (server, ctx) = mock_context(true).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/me"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .and(body_json(json!({"email": "admin@shop.test", "password": "wrong"})))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"message": "Invalid credentials"})))
        .mount(&server)
        .await;

    let mut shell = Shell::new(ctx.clone(), 80);
    shell.start().await;
    let outcome = shell
        .login(&LoginRequest {
            email: "admin@shop.test".to_string(),
            password: "wrong".to_string(),
        })
        .await;

    assert_eq!(outcome.message(), Some("Invalid credentials"));
    assert_eq!(shell.nav().route(), &Route::Login);
}

#[tokio::test]
async fn test_logout_ends_on_login_even_when_backend_fails() {
    let (server, ctx) = mock_context(true).await;
    mount_session(&server).await;
    Mock::given(method("POST"))
        .and(path("/api/admin/logout"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut shell = Shell::new(ctx.clone(), 80);
    shell.start().await;
    shell.logout().await;

    assert_eq!(shell.nav().route(), &Route::Login);
    assert_eq!(ctx.client.session().state(), SessionState::LoggedOut);
    let notice = ctx.notifications.last().unwrap();
    assert_eq!((notice.kind, notice.message.as_str()), (NoticeKind::Info, "Logged out"));
}

#[tokio::test]
async fn test_unauthorized_call_returns_shell_to_login() {
    let (server, ctx) = mock_context(true).await;
    mount_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let mut shell = Shell::new(ctx.clone(), 80);
    shell.start().await;
    shell.nav_mut().navigate(Route::ViewProducts);
    let mut products = ProductsView::new(ctx);

    assert!(!products.load().await);
    assert!(shell.sync_session());
    assert_eq!(shell.nav().route(), &Route::Login);
    assert!(!shell.sync_session());
}

#[tokio::test]
async fn test_one_shot_command_without_session_fails() {
    let (server, ctx) = mock_context(true).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/me"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;

    let mut app = App::new(Config::default(), ctx, 80);
    let mut out = Vec::new();

    let err = app.ensure_session(&mut out).await.unwrap_err();
    assert!(err.to_string().starts_with("Not logged in"));
}

#[tokio::test]
async fn test_execute_reports_failed_command() {
    let (server, ctx) = mock_context(true).await;
    mount_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/orders"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut app = App::new(Config::default(), ctx, 80);
    let mut out = Vec::new();
    app.ensure_session(&mut out).await.unwrap();

    let ok = app
        .execute(
            Commands::Orders {
                action: OrderCommands::List {
                    page: 1,
                    search: String::new(),
                    status: StatusFilter::All,
                },
            },
            &mut out,
        )
        .await
        .unwrap();

    assert!(!ok);
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("[error] Failed to fetch orders"));
    assert_eq!(app.shell().nav().route(), &Route::Orders);
}

#[tokio::test]
async fn test_shell_script_lists_and_updates_products() {
    let (server, ctx) = mock_context(true).await;
    mount_session(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            product_json("p1", "Aviator", 12),
            product_json("p2", "Wayfarer", 0)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/products/p1"))
        .and(body_json(json!({"stock": 0})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = App::new(Config::default(), ctx, 80);
    let printed = run(
        &mut app,
        "go products\nproducts stock p1 unavailable\nfrobnicate\nexit\n",
    )
    .await;

    assert!(printed.contains("Aviator"));
    assert!(printed.contains("Page 1 of 1 (2 total)"));
    assert!(printed.contains("storedesk:products> "));
    assert!(printed.contains("[ok] Stock updated successfully!"));
    assert!(printed.contains("frobnicate"));
    assert_eq!(app.shell().nav().route(), &Route::ViewProducts);
}

#[tokio::test]
async fn test_shell_guards_pages_until_login() {
    let (server, ctx) = mock_context(true).await;
    Mock::given(method("GET"))
        .and(path("/api/admin/me"))
        .respond_with(unauthorized())
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/admin/orders"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/admin/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admin": {"_id": "a1", "email": "admin@shop.test", "name": "Asha"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = App::new(Config::default(), ctx, 80);
    let printed = run(
        &mut app,
        "orders list\ngo orders\nwhoami\nlogin admin@shop.test \"s3cret pass\"\nwhoami\n",
    )
    .await;

    assert!(printed.contains("Log in first: login EMAIL PASSWORD"));
    assert!(printed.contains("Not logged in"));
    assert!(printed.contains("[ok] Welcome, Asha"));
    assert!(printed.contains("Asha <admin@shop.test>"));
    assert!(printed.contains("storedesk:dashboard> "));
}

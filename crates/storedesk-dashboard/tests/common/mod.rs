//! Shared helpers for dashboard integration tests

#![allow(dead_code, clippy::unwrap_used)]

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storedesk_client::ApiClient;
use storedesk_core::config::DashboardConfig;
use storedesk_dashboard::{AutoConfirm, Context};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mock backend plus a context whose confirmations all answer `confirm`
pub async fn mock_context(confirm: bool) -> (MockServer, Context) {
    let server = MockServer::start().await;
    let client = ApiClient::new(server.uri()).unwrap();
    let ctx = Context::new(
        client,
        DashboardConfig::default(),
        Arc::new(AutoConfirm(confirm)),
    );
    (server, ctx)
}

/// Answer the session check with a signed-in admin
pub async fn mount_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/admin/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "admin": {"_id": "a1", "email": "admin@shop.test", "name": "Asha"}
        })))
        .mount(server)
        .await;
}

/// Product document as the backend stores it
pub fn product_json(id: &str, name: &str, stock: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "price": 1499,
        "category": "Sunglasses",
        "stock": stock,
        "brand": "Ray-Ban",
        "description": "Classic frame",
        "images": [{"url": format!("https://cdn.test/{id}.jpg")}]
    })
}

/// Order document as the backend stores it
pub fn order_json(id: &str, email: &str, status: &str, total: f64) -> Value {
    json!({
        "_id": id,
        "orderId": format!("ORD-{id}"),
        "status": status,
        "shippingAddress": {"name": "Alice Rao", "email": email},
        "items": [{"name": "Aviator", "price": total, "quantity": 1}],
        "orderSummary": {"subtotal": total, "total": total},
        "paymentMethod": "cash_on_delivery",
        "createdAt": "2024-03-15T10:00:00.000Z"
    })
}

/// Shipping zone document
pub fn zone_json(id: &str, zip: &str, state: &str) -> Value {
    json!({
        "_id": id,
        "zipCode": zip,
        "charges": 50,
        "priceLessThan": 999,
        "state": state,
        "stateCode": "KA",
        "gstCode": "29"
    })
}

/// Write a small file into `dir` and return its path
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

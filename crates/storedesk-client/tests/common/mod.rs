//! Shared helpers for client integration tests

#![allow(dead_code, clippy::unwrap_used)]

use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::Once;
use storedesk_client::ApiClient;
use wiremock::{Match, MockServer, Request};

static INIT_LOGGER: Once = Once::new();

/// Initialize test logging (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter("debug")
            .with_test_writer()
            .try_init();
    });
}

/// Mock backend plus a client pointed at it
pub async fn mock_backend() -> (MockServer, ApiClient) {
    init_test_logging();
    let server = MockServer::start().await;
    let client = ApiClient::new(server.uri()).unwrap();
    (server, client)
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

/// Write a small file into `dir` and return its path
pub fn write_file(dir: &Path, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path
}

/// Matches requests whose raw body contains `needle`; multipart bodies carry
/// binary file parts, so a UTF-8 body matcher cannot see them
pub struct BodyContains(Vec<u8>);

impl Match for BodyContains {
    fn matches(&self, request: &Request) -> bool {
        request
            .body
            .windows(self.0.len().max(1))
            .any(|window| window == self.0.as_slice())
    }
}

/// Body matcher over raw bytes
pub fn body_contains(needle: impl AsRef<[u8]>) -> BodyContains {
    BodyContains(needle.as_ref().to_vec())
}

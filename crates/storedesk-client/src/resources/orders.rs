//! Order endpoints: paged listing, status changes, deletion and invoices

use crate::client::{ApiClient, read_body, read_envelope};
use crate::error::ClientResult;
use bytes::Bytes;
use reqwest::Method;
use reqwest::header::CONTENT_DISPOSITION;
use serde::Deserialize;
use storedesk_core::listing::{OrderQuery, check_query};
use storedesk_core::types::{OrderStat, PageInfo};
use storedesk_core::utils::filename_from_content_disposition;
use storedesk_core::{Order, OrderStatus, Page};

/// Filename used when the backend sends no `Content-Disposition`
pub const DEFAULT_INVOICE_FILENAME: &str = "invoice.pdf";

#[derive(Debug, Default, Deserialize)]
struct OrderListData {
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    stats: Vec<OrderStat>,
    #[serde(default)]
    pagination: PageInfo,
}

/// One page of orders plus the per-status aggregates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderListing {
    /// Orders on this page
    pub orders: Page<Order>,
    /// Count and value per status across all orders
    pub stats: Vec<OrderStat>,
}

/// Invoice PDF and the name to save it under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invoice {
    /// File name from `Content-Disposition`, sanitized
    pub filename: String,
    /// PDF bytes
    pub bytes: Bytes,
}

fn order_path(id: &str) -> String {
    format!("/api/admin/orders/{}", urlencoding::encode(id))
}

impl ApiClient {
    /// Fetch one page of orders; search and status filtering happen on the backend
    ///
    /// # Errors
    ///
    /// Returns a validation error for an out-of-range query, or the backend's failure.
    pub async fn list_orders(&self, query: &OrderQuery) -> ClientResult<OrderListing> {
        check_query(query)?;
        let response = self
            .send(
                self.request(Method::GET, "/api/admin/orders")
                    .query(&query.to_query_pairs()),
            )
            .await?;
        let data = read_envelope::<OrderListData>(response)
            .await?
            .data
            .unwrap_or_default();

        tracing::debug!(
            count = data.orders.len(),
            page = data.pagination.current_page,
            total_pages = data.pagination.total_pages,
            "orders loaded"
        );
        Ok(OrderListing {
            orders: Page::from_server(data.orders, &data.pagination),
            stats: data.stats,
        })
    }

    /// Fetch the backend's default order listing, for analytics
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports `success: false`.
    pub async fn list_all_orders(&self) -> ClientResult<Vec<Order>> {
        let response = self
            .send(self.request(Method::GET, "/api/admin/orders"))
            .await?;
        Ok(read_envelope::<OrderListData>(response)
            .await?
            .data
            .unwrap_or_default()
            .orders)
    }

    /// Move an order to a new status; returns the updated order
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the change.
    pub async fn update_order_status(&self, id: &str, status: &OrderStatus) -> ClientResult<Order> {
        let path = format!("{}/status", order_path(id));
        let response = self
            .send(
                self.request(Method::PUT, &path)
                    .json(&serde_json::json!({ "status": status })),
            )
            .await?;
        let order = read_envelope::<Order>(response).await?.into_data()?;
        tracing::info!(order_id = %id, status = %status, "order status updated");
        Ok(order)
    }

    /// Delete an order
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    pub async fn delete_order(&self, id: &str) -> ClientResult<()> {
        let response = self
            .send(self.request(Method::DELETE, &order_path(id)))
            .await?;
        read_envelope::<serde_json::Value>(response).await?;
        tracing::info!(order_id = %id, "order deleted");
        Ok(())
    }

    /// Download the invoice PDF for an order
    ///
    /// # Errors
    ///
    /// Returns an error if the backend cannot produce the invoice.
    pub async fn download_invoice(&self, id: &str) -> ClientResult<Invoice> {
        let path = format!("{}/invoice", order_path(id));
        let response = self.send(self.request(Method::GET, &path)).await?;
        let disposition = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|value| value.to_str().ok())
            .map(ToString::to_string);
        let (_, bytes) = read_body(response).await?;

        let filename =
            filename_from_content_disposition(disposition.as_deref(), DEFAULT_INVOICE_FILENAME);
        tracing::info!(order_id = %id, %filename, size = bytes.len(), "invoice downloaded");
        Ok(Invoice { filename, bytes })
    }
}

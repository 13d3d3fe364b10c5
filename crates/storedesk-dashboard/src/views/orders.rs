//! Orders with server-side paging, search and status filter

use crate::context::{Context, Outcome};
use std::path::{Path, PathBuf};
use storedesk_client::OrderListing;
use storedesk_core::listing::{OrderQuery, StatusFilter};
use storedesk_core::types::OrderStat;
use storedesk_core::{Order, OrderStatus, Page};

/// One page of orders plus per-status stats
#[derive(Debug)]
pub struct OrdersView {
    ctx: Context,
    query: OrderQuery,
    listing: OrderListing,
    selected: Option<Order>,
}

impl OrdersView {
    /// First page, every status
    #[must_use]
    pub fn new(ctx: Context) -> Self {
        let query = OrderQuery::new(ctx.settings.order_page_size);
        Self {
            ctx,
            query,
            listing: OrderListing::default(),
            selected: None,
        }
    }

    /// Query sent on the next load
    #[must_use]
    pub const fn query(&self) -> &OrderQuery {
        &self.query
    }

    /// Query to change before the next [`Self::load`]
    pub const fn query_mut(&mut self) -> &mut OrderQuery {
        &mut self.query
    }

    /// Current page of orders
    #[must_use]
    pub const fn page(&self) -> &Page<Order> {
        &self.listing.orders
    }

    /// Per-status counts and totals
    #[must_use]
    pub fn stats(&self) -> &[OrderStat] {
        &self.listing.stats
    }

    /// Order open in the detail pane
    #[must_use]
    pub const fn selected(&self) -> Option<&Order> {
        self.selected.as_ref()
    }

    /// Fetch the page the query selects; a failure keeps the current page
    pub async fn load(&mut self) -> bool {
        match self.ctx.client.list_orders(&self.query).await {
            Ok(listing) => {
                tracing::debug!(
                    page = listing.orders.page,
                    total_pages = listing.orders.total_pages,
                    count = listing.orders.items.len(),
                    "orders loaded"
                );
                self.listing = listing;
                true
            }
            Err(e) => {
                let message = format!("Failed to fetch orders: {e}");
                self.ctx.fetch_failed(&e, message);
                false
            }
        }
    }

    /// Go to `page` and fetch it
    pub async fn go_to_page(&mut self, page: u32) -> bool {
        self.query.page = page;
        self.load().await
    }

    /// Search by id, name or email from page 1
    pub async fn search(&mut self, search: impl Into<String>) -> bool {
        self.query.search = search.into();
        self.query.page = 1;
        self.load().await
    }

    /// Filter by status from page 1
    pub async fn filter_status(&mut self, status: StatusFilter) -> bool {
        self.query.status = status;
        self.query.page = 1;
        self.load().await
    }

    /// Open an order from the current page in the detail pane
    pub fn select(&mut self, id: &str) -> Option<&Order> {
        self.selected = self.listing.orders.items.iter().find(|o| o.id == id).cloned();
        self.selected.as_ref()
    }

    /// Close the detail pane
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Change an order's status, refresh the page and the detail pane
    pub async fn update_status(&mut self, id: &str, status: &OrderStatus) -> Outcome {
        match self.ctx.client.update_order_status(id, status).await {
            Ok(order) => {
                if self.selected.as_ref().is_some_and(|o| o.id == id) {
                    self.selected = Some(order);
                }
                self.load().await;
                self.ctx.applied("Order status updated successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Failed to update order status"),
        }
    }

    /// Delete after confirmation, then refresh the page
    pub async fn delete(&mut self, id: &str) -> Outcome {
        if !self.ctx.confirm("Are you sure you want to delete this order?") {
            return Outcome::Declined;
        }

        match self.ctx.client.delete_order(id).await {
            Ok(()) => {
                if self.selected.as_ref().is_some_and(|o| o.id == id) {
                    self.selected = None;
                }
                self.load().await;
                self.ctx.applied("Order deleted successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Failed to delete order"),
        }
    }

    /// Save an order's invoice PDF into `dir` under the backend-provided name
    pub async fn download_invoice(&self, id: &str, dir: &Path) -> Option<PathBuf> {
        let invoice = match self.ctx.client.download_invoice(id).await {
            Ok(invoice) => invoice,
            Err(e) => {
                let message = format!("Failed to download invoice: {e}");
                self.ctx.fetch_failed(&e, message);
                return None;
            }
        };

        let path = dir.join(&invoice.filename);
        match tokio::fs::write(&path, &invoice.bytes).await {
            Ok(()) => {
                tracing::info!(order_id = %id, path = %path.display(), "invoice saved");
                Some(path)
            }
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "could not save invoice");
                self.ctx
                    .notifications
                    .error(format!("Failed to download invoice: {e}"));
                None
            }
        }
    }
}

//! Dashboard home: totals, series and distributions

use crate::context::Context;
use chrono::{DateTime, TimeZone};
use storedesk_core::analytics::{self, DashboardStats};

/// Fetch customers, orders and products concurrently and aggregate them at `now`
///
/// Each fetch fails on its own to an empty list; the stats are computed from
/// whatever arrived.
pub async fn load_stats<Tz: TimeZone>(ctx: &Context, now: &DateTime<Tz>) -> DashboardStats {
    let client = &ctx.client;
    let (customers, orders, products) = tokio::join!(
        client.list_customers(),
        client.list_all_orders(),
        client.list_products()
    );

    let customers = customers.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "dashboard customers unavailable");
        Vec::new()
    });
    let orders = orders.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "dashboard orders unavailable");
        Vec::new()
    });
    let products = products.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "dashboard products unavailable");
        Vec::new()
    });

    tracing::debug!(
        customers = customers.len(),
        orders = orders.len(),
        products = products.len(),
        "dashboard data fetched"
    );
    analytics::compute(
        &customers,
        &orders,
        &products,
        now,
        ctx.settings.low_stock_threshold,
    )
}

//! Dashboard aggregates derived from customers, orders and products
//!
//! Everything is recomputed from the three lists on every refresh. Time-bucketed
//! series take `now` explicitly and bucket in `now`'s time zone.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, TimeZone, Timelike};
use indexmap::IndexMap;
use serde::Serialize;

use crate::selectors;
use crate::types::{Customer, Order, Product};
use crate::utils;

/// Orders listed under "recent orders"
pub const RECENT_ORDERS: usize = 5;

/// Customers listed under "top customers"
pub const TOP_CUSTOMERS: usize = 5;

/// Products in the stock chart
pub const TOP_STOCK_PRODUCTS: usize = 5;

/// Longest product name shown in the stock chart before truncation
pub const STOCK_LABEL_CHARS: usize = 15;

const DAILY_POINTS: u64 = 7;
const MONTHLY_POINTS: u32 = 6;

/// One bucket of a time series
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Bucket label, e.g. `Oct 18` or `Oct 25`
    pub label: String,
    /// Sum of order totals in the bucket
    pub revenue: f64,
    /// Orders in the bucket
    pub orders: usize,
}

/// A customer ranked by number of orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopCustomer {
    /// Matched customer record
    pub customer: Customer,
    /// Orders shipped to the customer's email
    pub order_count: usize,
}

/// One bar of the stock chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StockBar {
    /// Product name, truncated
    pub label: String,
    /// Units in stock
    pub stock: u32,
}

/// Everything the dashboard home view shows
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    /// Customers fetched
    pub total_customers: usize,
    /// Orders fetched
    pub total_orders: usize,
    /// Products fetched
    pub total_products: usize,
    /// Sum of every order total
    pub total_revenue: f64,
    /// First orders in backend order
    pub recent_orders: Vec<Order>,
    /// Products below the low-stock threshold
    pub low_stock: Vec<Product>,
    /// Customers with the most orders
    pub top_customers: Vec<TopCustomer>,
    /// Last seven days, oldest first
    pub daily: Vec<SeriesPoint>,
    /// Last six calendar months, oldest first
    pub monthly: Vec<SeriesPoint>,
    /// Products per category, first-seen order
    pub categories: Vec<(String, usize)>,
    /// Orders per status (capitalized), first-seen order
    pub statuses: Vec<(String, usize)>,
    /// Best-stocked products
    pub top_stock: Vec<StockBar>,
}

/// Greeting for a local hour of day
#[must_use]
pub const fn greeting(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning"
    } else if hour < 18 {
        "Good afternoon"
    } else {
        "Good evening"
    }
}

/// Greeting for a moment in its own time zone
#[must_use]
pub fn greeting_at<Tz: TimeZone>(now: &DateTime<Tz>) -> &'static str {
    greeting(now.hour())
}

fn local_date<Tz: TimeZone>(order: &Order, tz: &Tz) -> Option<NaiveDate> {
    order
        .placed_at()
        .map(|at| at.with_timezone(tz).date_naive())
}

/// Revenue and order count per day for the seven days ending on `now`
#[must_use]
pub fn daily_series<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> Vec<SeriesPoint> {
    let tz = now.timezone();
    let today = now.date_naive();

    (0..DAILY_POINTS)
        .rev()
        .filter_map(|back| today.checked_sub_days(Days::new(back)))
        .map(|day| {
            let (revenue, count) = orders
                .iter()
                .filter(|order| local_date(order, &tz) == Some(day))
                .fold((0.0, 0), |(sum, n), order| {
                    (sum + order.order_summary.total, n + 1)
                });
            SeriesPoint {
                label: day.format("%b %-d").to_string(),
                revenue,
                orders: count,
            }
        })
        .collect()
}

/// Revenue and order count per calendar month for the six months ending with `now`'s month
#[must_use]
pub fn monthly_series<Tz: TimeZone>(orders: &[Order], now: &DateTime<Tz>) -> Vec<SeriesPoint> {
    let tz = now.timezone();
    let today = now.date_naive();
    let Some(this_month) = today.with_day(1) else {
        return Vec::new();
    };

    (0..MONTHLY_POINTS)
        .rev()
        .filter_map(|back| this_month.checked_sub_months(Months::new(back)))
        .map(|month| {
            let (revenue, count) = orders
                .iter()
                .filter(|order| {
                    local_date(order, &tz)
                        .is_some_and(|d| d.year() == month.year() && d.month() == month.month())
                })
                .fold((0.0, 0), |(sum, n), order| {
                    (sum + order.order_summary.total, n + 1)
                });
            SeriesPoint {
                label: month.format("%b %y").to_string(),
                revenue,
                orders: count,
            }
        })
        .collect()
}

fn distribution<'a>(values: impl Iterator<Item = &'a str>) -> IndexMap<&'a str, usize> {
    values.fold(IndexMap::new(), |mut counts, value| {
        *counts.entry(value).or_insert(0) += 1;
        counts
    })
}

/// Products per category in first-seen order
#[must_use]
pub fn category_distribution(products: &[Product]) -> Vec<(String, usize)> {
    distribution(products.iter().map(|p| p.category.as_str()))
        .into_iter()
        .map(|(category, n)| (category.to_string(), n))
        .collect()
}

/// Orders per status in first-seen order, labels capitalized
#[must_use]
pub fn status_distribution(orders: &[Order]) -> Vec<(String, usize)> {
    distribution(orders.iter().map(|o| o.status.as_str()))
        .into_iter()
        .map(|(status, n)| (utils::capitalize(status), n))
        .collect()
}

/// Customers ranked by orders shipped to their email; unmatched emails are dropped
#[must_use]
pub fn top_customers(customers: &[Customer], orders: &[Order]) -> Vec<TopCustomer> {
    let counts = distribution(
        orders
            .iter()
            .map(|o| o.shipping_address.email.as_str())
            .filter(|email| !email.is_empty()),
    );

    let mut ranked: Vec<TopCustomer> = counts
        .into_iter()
        .filter_map(|(email, order_count)| {
            customers
                .iter()
                .find(|c| c.email == email)
                .map(|customer| TopCustomer {
                    customer: customer.clone(),
                    order_count,
                })
        })
        .collect();
    ranked.sort_by(|a, b| b.order_count.cmp(&a.order_count));
    ranked.truncate(TOP_CUSTOMERS);
    ranked
}

/// Products with the most stock, names truncated for chart labels
#[must_use]
pub fn top_stock(products: &[Product]) -> Vec<StockBar> {
    let mut sorted: Vec<&Product> = products.iter().collect();
    sorted.sort_by(|a, b| b.stock.cmp(&a.stock));
    sorted
        .into_iter()
        .take(TOP_STOCK_PRODUCTS)
        .map(|p| StockBar {
            label: utils::truncate_label(&p.name, STOCK_LABEL_CHARS),
            stock: p.stock,
        })
        .collect()
}

/// Compute every dashboard aggregate
#[must_use]
pub fn compute<Tz: TimeZone>(
    customers: &[Customer],
    orders: &[Order],
    products: &[Product],
    now: &DateTime<Tz>,
    low_stock_threshold: u32,
) -> DashboardStats {
    DashboardStats {
        total_customers: customers.len(),
        total_orders: orders.len(),
        total_products: products.len(),
        total_revenue: orders.iter().map(|o| o.order_summary.total).sum(),
        recent_orders: orders.iter().take(RECENT_ORDERS).cloned().collect(),
        low_stock: selectors::low_stock(products, low_stock_threshold)
            .into_iter()
            .cloned()
            .collect(),
        top_customers: top_customers(customers, orders),
        daily: daily_series(orders, now),
        monthly: monthly_series(orders, now),
        categories: category_distribution(products),
        statuses: status_distribution(orders),
        top_stock: top_stock(products),
    }
}

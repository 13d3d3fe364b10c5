//! Plain-text rendering of views for the terminal

use crate::notify::{Notice, NoticeKind};
use crate::shell::{Navigation, Route};
use std::fmt::{self, Write as _};
use storedesk_core::analytics::{DashboardStats, SeriesPoint};
use storedesk_core::ingest::{CsvUploadOutcome, ImageUploadOutcome};
use storedesk_core::selectors::{self, CouponStatus, CouponSummary};
use storedesk_core::types::OrderStat;
use storedesk_core::utils::{format_currency, initials, payment_method_label};
use storedesk_core::{
    Coupon, Customer, Order, Page, Product, ShippingZone, Staff, StateRule,
};

/// Left-aligned text table with a header rule
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Table with the given column headers
    #[must_use]
    pub fn new<I, S>(headers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            headers: headers.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row; missing cells render empty
    pub fn row<I, S>(&mut self, cells: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.push(cells.into_iter().map(Into::into).collect());
        self
    }

    /// Number of data rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether there are no data rows
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| h.chars().count()).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let len = cell.chars().count();
                match widths.get_mut(i) {
                    Some(width) => *width = (*width).max(len),
                    None => widths.push(len),
                }
            }
        }
        widths
    }
}

fn write_line(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let mut line = String::new();
    for (i, width) in widths.iter().enumerate() {
        let cell = cells.get(i).map_or("", String::as_str);
        if i > 0 {
            line.push_str("  ");
        }
        let _ = write!(line, "{cell:<width$}");
    }
    writeln!(f, "{}", line.trim_end())
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let widths = self.widths();
        write_line(f, &self.headers, &widths)?;
        let rule: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        writeln!(f, "{}", "-".repeat(rule))?;
        for row in &self.rows {
            write_line(f, row, &widths)?;
        }
        Ok(())
    }
}

fn page_footer<T>(page: &Page<T>) -> String {
    let mut footer = format!("Page {} of {}", page.page, page.total_pages);
    if let Some(total) = page.total_items {
        let _ = write!(footer, " ({total} total)");
    }
    footer
}

fn empty_or(table: &Table, empty: &str) -> String {
    if table.is_empty() {
        format!("{empty}\n")
    } else {
        table.to_string()
    }
}

/// Product page
#[must_use]
pub fn products(page: &Page<Product>) -> String {
    let mut table = Table::new(["ID", "Name", "Category", "Brand", "Price", "Stock", "Status"]);
    for p in &page.items {
        table.row([
            p.id.clone(),
            p.name.clone(),
            p.category.clone(),
            p.brand.clone(),
            format_currency(p.price),
            p.stock.to_string(),
            if p.in_stock() { "Available" } else { "Unavailable" }.to_string(),
        ]);
    }
    format!("{}{}\n", empty_or(&table, "No products found"), page_footer(page))
}

/// One product in full
#[must_use]
pub fn product_detail(product: &Product) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", product.name, product.id);
    let _ = writeln!(out, "  Category:    {}", product.category);
    let _ = writeln!(out, "  Brand:       {}", product.brand);
    let _ = writeln!(out, "  Price:       {}", format_currency(product.price));
    let _ = writeln!(out, "  Stock:       {}", product.stock);
    let _ = writeln!(out, "  Description: {}", product.description);
    if !product.frame_dimensions.is_empty() {
        let _ = writeln!(out, "  Dimensions:  {}", product.frame_dimensions);
    }
    let flags: Vec<&str> = [
        (product.new_arrival, "new arrival"),
        (product.hot_seller, "hot seller"),
        (product.men, "men"),
        (product.women, "women"),
        (product.kids, "kids"),
    ]
    .into_iter()
    .filter_map(|(on, label)| on.then_some(label))
    .collect();
    if !flags.is_empty() {
        let _ = writeln!(out, "  Tags:        {}", flags.join(", "));
    }
    for (i, image) in product.images.iter().enumerate() {
        let _ = writeln!(out, "  Image {}:     {}", i + 1, image.url);
    }
    out
}

/// Orders page with the per-status stats above it
#[must_use]
pub fn orders(page: &Page<Order>, stats: &[OrderStat]) -> String {
    let mut out = String::new();
    if !stats.is_empty() {
        let line: Vec<String> = stats
            .iter()
            .map(|s| {
                format!(
                    "{}: {} ({})",
                    selectors::status_label(&s.status),
                    s.count,
                    format_currency(s.total_value)
                )
            })
            .collect();
        let _ = writeln!(out, "{}\n", line.join(" | "));
    }

    let mut table = Table::new(["ID", "Order", "Customer", "Email", "Total", "Status", "Placed"]);
    for o in &page.items {
        table.row([
            o.id.clone(),
            o.order_id.clone(),
            o.shipping_address.name.clone(),
            o.shipping_address.email.clone(),
            format_currency(o.order_summary.total),
            selectors::status_label(&o.status),
            o.placed_at()
                .map(|at| at.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ]);
    }
    let _ = writeln!(out, "{}{}", empty_or(&table, "No orders found"), page_footer(page));
    out
}

/// One order with its items and totals
#[must_use]
pub fn order_detail(order: &Order) -> String {
    let mut out = String::new();
    let address = &order.shipping_address;
    let _ = writeln!(
        out,
        "Order {} [{}]",
        order.order_id,
        selectors::status_label(&order.status)
    );
    let _ = writeln!(out, "  {} <{}> {}", address.name, address.email, address.phone);
    let mut lines = vec![address.address_line1.clone()];
    lines.extend(address.address_line2.clone().filter(|l| !l.is_empty()));
    lines.push(format!("{}, {} {}", address.city, address.state, address.zip_code));
    for line in lines.iter().filter(|l| !l.trim().is_empty()) {
        let _ = writeln!(out, "  {line}");
    }
    let _ = writeln!(out, "  Payment: {}\n", payment_method_label(&order.payment_method));

    let mut table = Table::new(["Item", "Size", "Color", "Price", "Qty", "Total"]);
    for item in &order.items {
        table.row([
            item.name.clone(),
            item.size.clone().unwrap_or_default(),
            item.color.clone().unwrap_or_default(),
            format_currency(item.price),
            item.quantity.to_string(),
            format_currency(item.line_total()),
        ]);
    }
    out.push_str(&table.to_string());

    let summary = &order.order_summary;
    let _ = writeln!(out, "  Subtotal: {}", format_currency(summary.subtotal));
    if selectors::shows_coupon_discount(order) {
        let _ = writeln!(out, "  Coupon discount: -{}", format_currency(summary.coupon_discount));
    }
    let _ = writeln!(out, "  Tax: {}", format_currency(summary.tax));
    let _ = writeln!(out, "  Shipping: {}", format_currency(summary.shipping_charge));
    let _ = writeln!(out, "  Total: {}", format_currency(summary.total));
    out
}

/// Customer page
#[must_use]
pub fn customers(page: &Page<Customer>) -> String {
    let mut table = Table::new(["", "ID", "Name", "Email"]);
    for c in &page.items {
        table.row([initials(&c.name), c.id.clone(), c.name.clone(), c.email.clone()]);
    }
    format!("{}{}\n", empty_or(&table, "No customers found"), page_footer(page))
}

/// Coupons with their derived status and the summary counts
#[must_use]
pub fn coupons(rows: &[(&Coupon, CouponStatus)], summary: &CouponSummary) -> String {
    let mut out = format!(
        "Total: {}  Active: {}  Scheduled: {}  Expired: {}\n\n",
        summary.total, summary.active, summary.scheduled, summary.expired
    );
    let mut table = Table::new(["ID", "Code", "Name", "Type", "Amount", "Used", "Expires", "Status"]);
    for (c, status) in rows {
        table.row([
            c.id.clone(),
            c.code.clone(),
            c.name.clone(),
            c.kind.to_string(),
            c.amount.to_string(),
            format!("{}/{}", c.used_count, c.usage_limit),
            c.expiry_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string()),
            status.to_string(),
        ]);
    }
    out.push_str(&empty_or(&table, "No coupons found"));
    out
}

/// Staff page
#[must_use]
pub fn staff(page: &Page<Staff>) -> String {
    let mut table = Table::new(["ID", "Name", "Phone", "Designation", "Salary", "Joined"]);
    for s in &page.items {
        table.row([
            s.id.clone(),
            s.name.clone(),
            s.phone.clone(),
            s.designation.clone(),
            format_currency(s.monthly_salary),
            s.date_of_joining
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        ]);
    }
    format!("{}{}\n", empty_or(&table, "No staff found"), page_footer(page))
}

/// Shipping zones
#[must_use]
pub fn zones(zones: &[ShippingZone]) -> String {
    let mut table = Table::new(["ID", "Zip", "Charges", "Free above", "State", "Code", "GST"]);
    for z in zones {
        table.row([
            z.id.clone(),
            z.zip_code.clone(),
            format_currency(z.charges),
            format_currency(z.price_less_than),
            z.state.clone(),
            z.state_code.clone(),
            z.gst_code.clone(),
        ]);
    }
    empty_or(&table, "No zip codes found")
}

/// States derived from zones
#[must_use]
pub fn states(states: &[StateRule]) -> String {
    let mut table = Table::new(["State", "Code", "GST"]);
    for s in states {
        table.row([s.state.clone(), s.state_code.clone(), s.gst_code.clone()]);
    }
    empty_or(&table, "No shipping rules found")
}

fn series(title: &str, points: &[SeriesPoint]) -> String {
    let mut table = Table::new([title, "Orders", "Revenue"]);
    for p in points {
        table.row([p.label.clone(), p.orders.to_string(), format_currency(p.revenue)]);
    }
    table.to_string()
}

/// Dashboard home
#[must_use]
pub fn dashboard(stats: &DashboardStats, greeting: &str, name: Option<&str>) -> String {
    let mut out = String::new();
    match name {
        Some(name) => {
            let _ = writeln!(out, "{greeting}, {name}!\n");
        }
        None => {
            let _ = writeln!(out, "{greeting}!\n");
        }
    }
    let _ = writeln!(
        out,
        "Customers: {}  Orders: {}  Products: {}  Revenue: {}\n",
        stats.total_customers,
        stats.total_orders,
        stats.total_products,
        format_currency(stats.total_revenue)
    );

    out.push_str(&series("Day", &stats.daily));
    out.push('\n');
    out.push_str(&series("Month", &stats.monthly));
    out.push('\n');

    let mut dist = Table::new(["Category", "Products"]);
    for (category, count) in &stats.categories {
        dist.row([category.clone(), count.to_string()]);
    }
    out.push_str(&empty_or(&dist, "No categories"));
    out.push('\n');

    let mut statuses = Table::new(["Status", "Orders"]);
    for (status, count) in &stats.statuses {
        statuses.row([status.clone(), count.to_string()]);
    }
    out.push_str(&empty_or(&statuses, "No orders"));
    out.push('\n');

    let mut top = Table::new(["Top customer", "Email", "Orders"]);
    for t in &stats.top_customers {
        top.row([t.customer.name.clone(), t.customer.email.clone(), t.order_count.to_string()]);
    }
    out.push_str(&empty_or(&top, "No customer orders yet"));
    out.push('\n');

    let mut stock = Table::new(["Product", "Stock"]);
    for bar in &stats.top_stock {
        stock.row([bar.label.clone(), bar.stock.to_string()]);
    }
    out.push_str(&empty_or(&stock, "No products"));
    out.push('\n');

    if stats.low_stock.is_empty() {
        out.push_str("All products are well stocked\n");
    } else {
        let mut low = Table::new(["Low stock", "Stock"]);
        for p in &stats.low_stock {
            low.row([p.name.clone(), p.stock.to_string()]);
        }
        out.push_str(&low.to_string());
    }
    out.push('\n');

    let mut recent = Table::new(["Recent order", "Customer", "Total", "Status"]);
    for o in &stats.recent_orders {
        recent.row([
            o.order_id.clone(),
            o.shipping_address.name.clone(),
            format_currency(o.order_summary.total),
            selectors::status_label(&o.status),
        ]);
    }
    out.push_str(&empty_or(&recent, "No recent orders"));
    out
}

/// CSV upload result with the truncated row errors
#[must_use]
pub fn csv_outcome(outcome: &CsvUploadOutcome) -> String {
    let mut out = String::new();
    if outcome.success && outcome.created_count > 0 {
        let _ = writeln!(out, "Successfully created {} products", outcome.created_count);
    }
    if !outcome.message.is_empty() {
        let _ = writeln!(out, "{}", outcome.message);
    }
    let lines = outcome.error_summary().lines();
    if !lines.is_empty() {
        let _ = writeln!(out, "Errors:");
        for line in lines {
            let _ = writeln!(out, "  {line}");
        }
    }
    out
}

/// Image upload result with one row per stored or rejected image
#[must_use]
pub fn image_outcome(outcome: &ImageUploadOutcome) -> String {
    let mut out = String::new();
    if !outcome.message.is_empty() {
        let _ = writeln!(out, "{}", outcome.message);
    }
    if let Some(summary) = outcome.summary {
        let _ = writeln!(
            out,
            "Total: {}  Uploaded: {}  Failed: {}",
            summary.total, summary.successful, summary.failed
        );
    }
    let mut table = Table::new(["#", "File", "URL"]);
    for (i, image) in outcome.uploaded.iter().enumerate() {
        table.row([
            (i + 1).to_string(),
            image.original_name.clone(),
            image.url().unwrap_or("-").to_string(),
        ]);
    }
    if !table.is_empty() {
        out.push_str(&table.to_string());
    }
    for error in &outcome.errors {
        let _ = writeln!(out, "  {}", error.text());
    }
    out
}

/// Notices, one per line
#[must_use]
pub fn notices(notices: &[Notice]) -> String {
    notices
        .iter()
        .map(|n| {
            let tag = match n.kind {
                NoticeKind::Success => "[ok]",
                NoticeKind::Error => "[error]",
                NoticeKind::Info => "[info]",
            };
            format!("{tag} {}\n", n.message)
        })
        .collect()
}

/// Sidebar menu with the active page marked
#[must_use]
pub fn sidebar(nav: &Navigation) -> String {
    if !nav.sidebar_open() {
        return String::new();
    }
    let mut entries = vec![
        Route::Dashboard,
        Route::AddProduct,
        Route::ViewProducts,
        Route::Orders,
        Route::Customers,
        Route::Coupons,
        Route::Staff,
    ];
    if nav.shipping_menu_open() {
        entries.extend([
            Route::ShippingLocations,
            Route::AddShippingLocation,
            Route::ShippingStates,
        ]);
    } else {
        entries.push(Route::ShippingLocations);
    }

    let mut out = String::new();
    for route in entries {
        let marker = if &route == nav.route() { '>' } else { ' ' };
        let indent = if route.is_shipping() && nav.shipping_menu_open() && route != Route::ShippingLocations {
            "    "
        } else {
            "  "
        };
        let _ = writeln!(out, "{marker}{indent}{route}");
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use storedesk_core::listing::{ListQuery, query};
    use storedesk_core::types::{OrderItem, OrderSummary};

    #[test]
    fn test_table_aligns_columns() {
        let mut table = Table::new(["Name", "Stock"]);
        table.row(["Aviator", "12"]).row(["Round", "3"]);

        assert_eq!(
            table.to_string(),
            "Name     Stock\n--------------\nAviator  12\nRound    3\n"
        );
    }

    #[test]
    fn test_products_page_footer() {
        let products: Vec<Product> = (0..12)
            .map(|i| Product {
                id: format!("p{i}"),
                name: format!("Frame {i:02}"),
                price: 100.0,
                stock: i,
                ..Product::default()
            })
            .collect();
        let page = query(&products, &ListQuery::new(10));

        let out = super::products(&page);

        assert!(out.contains("Frame 00"));
        assert!(!out.contains("Frame 10"));
        assert!(out.ends_with("Page 1 of 2 (12 total)\n"));
        assert!(out.contains("Unavailable"));
    }

    #[test]
    fn test_order_detail_hides_zero_discount() {
        let mut order = Order {
            order_id: "ORD-1".to_string(),
            payment_method: "cash_on_delivery".to_string(),
            items: vec![OrderItem {
                name: "Aviator".to_string(),
                price: 500.0,
                quantity: 2,
                ..OrderItem::default()
            }],
            order_summary: OrderSummary {
                subtotal: 1000.0,
                total: 1000.0,
                ..OrderSummary::default()
            },
            ..Order::default()
        };

        let out = order_detail(&order);
        assert!(out.contains("Payment: cash on_delivery"));
        assert!(out.contains("₹1,000.00"));
        assert!(!out.contains("Coupon discount"));

        order.order_summary.coupon_discount = 50.0;
        assert!(order_detail(&order).contains("Coupon discount: -₹50.00"));
    }

    #[test]
    fn test_sidebar_marks_active_route() {
        let mut nav = Navigation::new(120);
        nav.navigate(Route::ShippingStates);

        let out = sidebar(&nav);

        assert!(out.contains(">    states"));
        assert!(out.contains("   orders"));
        assert!(sidebar(&Navigation::new(80)).is_empty());
    }

    #[tokio::test]
    async fn test_notices_are_tagged() {
        let notifications = crate::notify::Notifications::new(std::time::Duration::from_secs(3));
        notifications.success("Saved");
        notifications.error("Failed to delete order");

        let out = super::notices(&notifications.drain());
        assert_eq!(out, "[ok] Saved\n[error] Failed to delete order\n");
    }
}

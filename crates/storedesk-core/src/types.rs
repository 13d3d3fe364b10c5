//! Entity records owned by the storefront backend
//!
//! The backend is the source of truth for every record here; the console keeps
//! transient copies. Deserialization is lenient: missing fields fall back to
//! defaults and numeric fields accept numbers or numeric strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Backend document identifier (`_id`)
pub type EntityId = String;

/// Stock value written when an admin marks a product "available"
pub const STOCK_AVAILABLE: u32 = 10;

/// Stock value written when an admin marks a product "unavailable"
pub const STOCK_UNAVAILABLE: u32 = 0;

/// Maximum number of images attached to one product
pub const MAX_PRODUCT_IMAGES: usize = 4;

/// Product image reference as stored by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductImage {
    /// Public URL of the image
    pub url: String,

    /// Any other keys the backend keeps (storage id, dimensions, ...)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ProductImage {
    /// Image reference with only a URL
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// Catalog product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Backend identifier
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Unit price
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price: f64,
    /// Category name
    #[serde(default)]
    pub category: String,
    /// Units in stock
    #[serde(default, deserialize_with = "lenient::u32")]
    pub stock: u32,
    /// Brand name
    #[serde(default)]
    pub brand: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Frame dimensions (free text)
    #[serde(default)]
    pub frame_dimensions: String,
    /// Additional product information (free text)
    #[serde(default)]
    pub product_information: String,
    /// Listed under "new arrivals"
    #[serde(default)]
    pub new_arrival: bool,
    /// Listed under "hot sellers"
    #[serde(default)]
    pub hot_seller: bool,
    /// Listed for men
    #[serde(default)]
    pub men: bool,
    /// Listed for women
    #[serde(default)]
    pub women: bool,
    /// Listed for kids
    #[serde(default)]
    pub kids: bool,
    /// Attached images, at most four
    #[serde(default)]
    pub images: Vec<ProductImage>,
}

impl Product {
    /// Whether the product is currently sellable
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Coupon discount kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CouponType {
    /// Percentage off the order value
    #[default]
    Percentage,
    /// Fixed amount off the order value
    Flat,
}

impl fmt::Display for CouponType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Percentage => write!(f, "percentage"),
            Self::Flat => write!(f, "flat"),
        }
    }
}

impl std::str::FromStr for CouponType {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" => Ok(Self::Percentage),
            "flat" => Ok(Self::Flat),
            other => Err(crate::Error::validation(
                "type",
                format!("Unknown coupon type '{other}' (expected percentage or flat)"),
            )),
        }
    }
}

/// Discount coupon
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coupon {
    /// Backend identifier
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Code customers type at checkout
    #[serde(default)]
    pub code: String,
    /// Discount kind
    #[serde(rename = "type", default)]
    pub kind: CouponType,
    /// Discount amount (percent or currency units)
    #[serde(default, deserialize_with = "lenient::f64")]
    pub amount: f64,
    /// Minimum order value
    #[serde(default, deserialize_with = "lenient::f64")]
    pub min_value: f64,
    /// Maximum discount value
    #[serde(default, deserialize_with = "lenient::f64")]
    pub max_value: f64,
    /// Number of redemptions allowed
    #[serde(default, deserialize_with = "lenient::u32")]
    pub usage_limit: u32,
    /// Number of redemptions so far
    #[serde(default, deserialize_with = "lenient::u32")]
    pub used_count: u32,
    /// First moment the coupon is valid
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub start_date: Option<DateTime<Utc>>,
    /// Moment the coupon stops being valid
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub expiry_date: Option<DateTime<Utc>>,
    /// Admin on/off switch
    #[serde(default)]
    pub is_active: bool,
}

/// Order lifecycle status
///
/// Unknown values from the backend are kept verbatim in [`OrderStatus::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Placed, not yet confirmed
    Pending,
    /// Confirmed by the shop
    Confirmed,
    /// Being packed
    Processing,
    /// Handed to the carrier
    Shipped,
    /// Received by the customer
    Delivered,
    /// Cancelled
    Cancelled,
    /// Status this console does not know about
    Other(String),
}

impl OrderStatus {
    /// Every status an admin may set
    pub const SETTABLE: [Self; 6] = [
        Self::Pending,
        Self::Confirmed,
        Self::Processing,
        Self::Shipped,
        Self::Delivered,
        Self::Cancelled,
    ];

    /// Wire representation
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "pending" => Self::Pending,
            "confirmed" => Self::Confirmed,
            "processing" => Self::Processing,
            "shipped" => Self::Shipped,
            "delivered" => Self::Delivered,
            "cancelled" => Self::Cancelled,
            _ => Self::Other(raw),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match Self::from(s.trim().to_ascii_lowercase()) {
            Self::Other(raw) => Err(crate::Error::validation(
                "status",
                format!(
                    "Unknown order status '{raw}' (expected pending, confirmed, processing, shipped, delivered or cancelled)"
                ),
            )),
            status => Ok(status),
        }
    }
}

/// Delivery address embedded in an order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    /// Recipient name
    #[serde(default)]
    pub name: String,
    /// Recipient email; also the join key to customers
    #[serde(default)]
    pub email: String,
    /// Recipient phone
    #[serde(default)]
    pub phone: String,
    /// First address line
    #[serde(default)]
    pub address_line1: String,
    /// Optional second address line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address_line2: Option<String>,
    /// City
    #[serde(default)]
    pub city: String,
    /// State
    #[serde(default)]
    pub state: String,
    /// Postal code
    #[serde(default)]
    pub zip_code: String,
}

/// One purchased line
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Product name at purchase time
    #[serde(default)]
    pub name: String,
    /// Selected size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    /// Selected color
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Image URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Unit price
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price: f64,
    /// Units bought
    #[serde(default, deserialize_with = "lenient::u32")]
    pub quantity: u32,
}

impl OrderItem {
    /// Price times quantity
    #[must_use]
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }
}

/// Money breakdown of an order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    /// Sum of line totals
    #[serde(default, deserialize_with = "lenient::f64")]
    pub subtotal: f64,
    /// Discount from an applied coupon
    #[serde(default, deserialize_with = "lenient::f64")]
    pub coupon_discount: f64,
    /// Tax
    #[serde(default, deserialize_with = "lenient::f64")]
    pub tax: f64,
    /// Shipping charge
    #[serde(default, deserialize_with = "lenient::f64")]
    pub shipping_charge: f64,
    /// Amount charged
    #[serde(default, deserialize_with = "lenient::f64")]
    pub total: f64,
}

/// Customer order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Backend identifier
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    /// Human-facing order number
    #[serde(default)]
    pub order_id: String,
    /// Lifecycle status
    #[serde(default)]
    pub status: OrderStatus,
    /// Delivery address
    #[serde(default)]
    pub shipping_address: ShippingAddress,
    /// Purchased lines
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Money breakdown
    #[serde(default)]
    pub order_summary: OrderSummary,
    /// Payment method key, e.g. `cash_on_delivery`
    #[serde(default)]
    pub payment_method: String,
    /// Creation time
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub created_at: Option<DateTime<Utc>>,
    /// Placement time carried by older records
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::datetime"
    )]
    pub order_date: Option<DateTime<Utc>>,
}

impl Order {
    /// When the order was placed: `createdAt`, else `orderDate`
    #[must_use]
    pub fn placed_at(&self) -> Option<DateTime<Utc>> {
        self.created_at.or(self.order_date)
    }
}

/// Per-status aggregate returned with the order list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStat {
    /// Status the aggregate covers
    #[serde(rename = "_id", default)]
    pub status: OrderStatus,
    /// Number of orders
    #[serde(default, deserialize_with = "lenient::u64")]
    pub count: u64,
    /// Sum of order totals
    #[serde(default, deserialize_with = "lenient::f64")]
    pub total_value: f64,
}

/// Server-side pagination block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based current page
    #[serde(default = "one")]
    pub current_page: u32,
    /// Total number of pages
    #[serde(default = "one")]
    pub total_pages: u32,
    /// Total number of records, when reported
    #[serde(default, alias = "totalOrders", alias = "totalItems", alias = "total")]
    pub total_records: Option<u64>,
}

const fn one() -> u32 {
    1
}

impl Default for PageInfo {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_pages: 1,
            total_records: None,
        }
    }
}

/// Storefront customer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    /// Backend identifier
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    /// Full name
    #[serde(default)]
    pub name: String,
    /// Login email
    #[serde(default)]
    pub email: String,
}

/// Staff member record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Staff {
    /// Backend identifier
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    /// Full name
    #[serde(default)]
    pub name: String,
    /// Phone number
    #[serde(default)]
    pub phone: String,
    /// Gender
    #[serde(default)]
    pub gender: String,
    /// Job title
    #[serde(default)]
    pub designation: String,
    /// Salary advance taken
    #[serde(default, deserialize_with = "lenient::f64")]
    pub advance: f64,
    /// Monthly salary
    #[serde(default, deserialize_with = "lenient::f64")]
    pub monthly_salary: f64,
    /// Whether commission applies
    #[serde(default)]
    pub set_commission: bool,
    /// Commission percentage
    #[serde(default, deserialize_with = "lenient::f64")]
    pub commission_percent: f64,
    /// Bill amount above which commission applies
    #[serde(default, deserialize_with = "lenient::f64")]
    pub commission_bill_threshold: f64,
    /// Joining date
    #[serde(default, deserialize_with = "lenient::datetime")]
    pub date_of_joining: Option<DateTime<Utc>>,
    /// Postal address
    #[serde(default)]
    pub address: String,
}

/// Shipping charge rule for one postal code
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingZone {
    /// Backend identifier
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    /// Postal code
    #[serde(default)]
    pub zip_code: String,
    /// Shipping charge
    #[serde(default, deserialize_with = "lenient::f64")]
    pub charges: f64,
    /// Charge applies to orders below this value
    #[serde(default, deserialize_with = "lenient::f64")]
    pub price_less_than: f64,
    /// State name
    #[serde(default)]
    pub state: String,
    /// State code
    #[serde(default)]
    pub state_code: String,
    /// GST code
    #[serde(default)]
    pub gst_code: String,
}

/// A state derived from shipping zones, unique by (state, state code, GST code)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRule {
    /// Identifier of the first zone carrying this state
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    /// State name
    pub state: String,
    /// State code
    pub state_code: String,
    /// GST code
    pub gst_code: String,
}

/// Profile returned by the session check
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminProfile {
    /// Backend identifier
    #[serde(rename = "_id", default)]
    pub id: EntityId,
    /// Admin email
    #[serde(default)]
    pub email: String,
    /// Display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Anything else the backend reports
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Lenient deserializers for backend-owned numeric and date fields
mod lenient {
    use chrono::{DateTime, NaiveDate, Utc};
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrText {
        Number(f64),
        Text(String),
    }

    fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        Ok(match Option::<NumberOrText>::deserialize(d)? {
            Some(NumberOrText::Number(n)) if n.is_finite() => n,
            Some(NumberOrText::Text(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
            _ => 0.0,
        })
    }

    pub(super) fn f64<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        number(d)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(super) fn u32<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
        let n = number(d)?;
        Ok(if n <= 0.0 {
            0
        } else if n >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            n.trunc() as u32
        })
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(super) fn u64<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
        let n = number(d)?;
        Ok(if n <= 0.0 { 0 } else { n.trunc() as u64 })
    }

    /// Accepts null, "", RFC 3339 timestamps, or bare `YYYY-MM-DD` dates (midnight UTC)
    pub(super) fn datetime<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(d)? else {
            return Ok(None);
        };
        Ok(crate::utils::parse_timestamp(&raw).or_else(|| {
            NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_product_deserializes_backend_shape() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Aviator",
            "price": "149.5",
            "category": "Sunglasses",
            "stock": 7,
            "brand": "Ray-Ban",
            "newArrival": true,
            "images": [{"url": "https://cdn/a.jpg", "public_id": "a"}]
        }))
        .unwrap();

        assert_eq!(product.id, "p1");
        assert!((product.price - 149.5).abs() < f64::EPSILON);
        assert_eq!(product.stock, 7);
        assert!(product.new_arrival);
        assert!(!product.hot_seller);
        assert_eq!(product.images.len(), 1);
        assert_eq!(product.images[0].extra.get("public_id"), Some(&json!("a")));
        assert!(product.in_stock());
    }

    #[test]
    fn test_lenient_numbers_fall_back_to_zero() {
        let product: Product =
            serde_json::from_value(json!({"price": null, "stock": "lots"})).unwrap();
        assert!(product.price.abs() < f64::EPSILON);
        assert_eq!(product.stock, 0);
    }

    #[test]
    fn test_coupon_dates_accept_empty_and_plain_dates() {
        let coupon: Coupon = serde_json::from_value(json!({
            "_id": "c1",
            "code": "SAVE10",
            "type": "flat",
            "usageLimit": 10,
            "usedCount": 3,
            "startDate": "",
            "expiryDate": "2030-01-31",
            "isActive": true
        }))
        .unwrap();

        assert_eq!(coupon.kind, CouponType::Flat);
        assert!(coupon.start_date.is_none());
        assert_eq!(
            coupon.expiry_date,
            Some(Utc.with_ymd_and_hms(2030, 1, 31, 0, 0, 0).unwrap())
        );
        assert!(coupon.is_active);
    }

    #[test]
    fn test_order_status_round_trips_unknown_values() {
        let status: OrderStatus = serde_json::from_value(json!("on_hold")).unwrap();
        assert_eq!(status, OrderStatus::Other("on_hold".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("on_hold"));

        let status: OrderStatus = serde_json::from_value(json!("shipped")).unwrap();
        assert_eq!(status, OrderStatus::Shipped);
    }

    #[test]
    fn test_order_status_from_str_rejects_unknown() {
        assert_eq!("Delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn test_order_falls_back_to_order_date() {
        let order: Order = serde_json::from_value(json!({
            "_id": "o1",
            "orderId": "ORD-1",
            "status": "pending",
            "orderDate": "2024-03-15T10:00:00.000Z",
            "orderSummary": {"total": 1200}
        }))
        .unwrap();

        assert!(order.created_at.is_none());
        assert_eq!(
            order.placed_at(),
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap())
        );
        assert!((order.order_summary.total - 1200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_order_with_both_dates_prefers_created_at() {
        let order: Order = serde_json::from_value(json!({
            "_id": "o1",
            "status": "pending",
            "createdAt": "2024-03-16T08:00:00.000Z",
            "orderDate": "2024-03-15T10:00:00.000Z"
        }))
        .unwrap();

        assert_eq!(
            order.placed_at(),
            Some(Utc.with_ymd_and_hms(2024, 3, 16, 8, 0, 0).unwrap())
        );
        assert_eq!(
            order.order_date,
            Some(Utc.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_line_total() {
        let item = OrderItem {
            price: 250.0,
            quantity: 3,
            ..OrderItem::default()
        };
        assert!((item.line_total() - 750.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_page_info_defaults() {
        let info: PageInfo = serde_json::from_value(json!({})).unwrap();
        assert_eq!(info, PageInfo::default());

        let info: PageInfo =
            serde_json::from_value(json!({"currentPage": 2, "totalPages": 5, "totalOrders": 93}))
                .unwrap();
        assert_eq!(info.total_records, Some(93));
    }
}

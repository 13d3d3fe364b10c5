//! Derived values computed from raw records at display time

use chrono::{DateTime, Utc};
use indexmap::IndexSet;
use serde::Serialize;
use std::fmt;

use crate::types::{Coupon, Order, OrderStatus, Product, ShippingZone, StateRule};
use crate::utils;

/// Derived coupon status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CouponStatus {
    /// Start date still in the future
    Scheduled,
    /// Past expiry or usage exhausted
    Expired,
    /// Switched on and usable
    Active,
    /// Switched off
    Inactive,
}

impl fmt::Display for CouponStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Scheduled => "Scheduled",
            Self::Expired => "Expired",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
        })
    }
}

/// Start date set and later than `now`
#[must_use]
pub fn coupon_is_scheduled(coupon: &Coupon, now: DateTime<Utc>) -> bool {
    coupon.start_date.is_some_and(|start| start > now)
}

/// Expiry date passed, or usage has reached the limit regardless of dates
#[must_use]
pub fn coupon_is_expired(coupon: &Coupon, now: DateTime<Utc>) -> bool {
    coupon.expiry_date.is_some_and(|expiry| expiry < now) || coupon.used_count >= coupon.usage_limit
}

/// Status with precedence Scheduled, Expired, Active, Inactive
#[must_use]
pub fn coupon_status(coupon: &Coupon, now: DateTime<Utc>) -> CouponStatus {
    if coupon_is_scheduled(coupon, now) {
        CouponStatus::Scheduled
    } else if coupon_is_expired(coupon, now) {
        CouponStatus::Expired
    } else if coupon.is_active {
        CouponStatus::Active
    } else {
        CouponStatus::Inactive
    }
}

/// Header counts on the coupon view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CouponSummary {
    /// Every coupon
    pub total: usize,
    /// Switched on, not expired, not scheduled
    pub active: usize,
    /// Not yet started
    pub scheduled: usize,
    /// Expired or exhausted
    pub expired: usize,
}

/// Count coupons per derived status
#[must_use]
pub fn coupon_summary(coupons: &[Coupon], now: DateTime<Utc>) -> CouponSummary {
    coupons.iter().fold(
        CouponSummary {
            total: coupons.len(),
            ..CouponSummary::default()
        },
        |mut acc, coupon| {
            let scheduled = coupon_is_scheduled(coupon, now);
            let expired = coupon_is_expired(coupon, now);
            if coupon.is_active && !expired && !scheduled {
                acc.active += 1;
            }
            if scheduled {
                acc.scheduled += 1;
            }
            if expired {
                acc.expired += 1;
            }
            acc
        },
    )
}

/// Badge tone for an order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusTone {
    /// Pending (and anything unrecognised)
    Yellow,
    /// Confirmed
    Blue,
    /// Processing
    Orange,
    /// Shipped
    Purple,
    /// Delivered
    Green,
    /// Cancelled
    Red,
}

/// Tone used to render a status; unknown statuses look pending
#[must_use]
pub const fn status_tone(status: &OrderStatus) -> StatusTone {
    match status {
        OrderStatus::Confirmed => StatusTone::Blue,
        OrderStatus::Processing => StatusTone::Orange,
        OrderStatus::Shipped => StatusTone::Purple,
        OrderStatus::Delivered => StatusTone::Green,
        OrderStatus::Cancelled => StatusTone::Red,
        OrderStatus::Pending | OrderStatus::Other(_) => StatusTone::Yellow,
    }
}

/// Capitalized status label
#[must_use]
pub fn status_label(status: &OrderStatus) -> String {
    utils::capitalize(status.as_str())
}

/// Coupon discount line is shown only when something was discounted
#[must_use]
pub fn shows_coupon_discount(order: &Order) -> bool {
    order.order_summary.coupon_discount > 0.0
}

/// Products strictly below the stock threshold, in list order
#[must_use]
pub fn low_stock(products: &[Product], threshold: u32) -> Vec<&Product> {
    products.iter().filter(|p| p.stock < threshold).collect()
}

/// Distinct non-blank categories in first-seen order
#[must_use]
pub fn categories(products: &[Product]) -> Vec<String> {
    products
        .iter()
        .map(|p| p.category.trim())
        .filter(|c| !c.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// States derived from zones, unique by (state, state code, GST code), first zone wins
#[must_use]
pub fn derive_states(zones: &[ShippingZone]) -> Vec<StateRule> {
    let mut seen = IndexSet::new();
    zones
        .iter()
        .filter(|zone| {
            seen.insert((
                zone.state.as_str(),
                zone.state_code.as_str(),
                zone.gst_code.as_str(),
            ))
        })
        .map(|zone| StateRule {
            id: zone.id.clone(),
            state: zone.state.clone(),
            state_code: zone.state_code.clone(),
            gst_code: zone.gst_code.clone(),
        })
        .collect()
}

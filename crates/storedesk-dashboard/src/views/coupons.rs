//! Coupons with derived status

use crate::context::{Context, Outcome};
use chrono::{DateTime, Utc};
use storedesk_core::Coupon;
use storedesk_core::forms::CouponForm;
use storedesk_core::selectors::{self, CouponStatus, CouponSummary};

/// Every coupon, refetched after each change
#[derive(Debug)]
pub struct CouponsView {
    ctx: Context,
    coupons: Vec<Coupon>,
}

impl CouponsView {
    /// Empty view; call [`Self::load`] to fetch
    #[must_use]
    pub const fn new(ctx: Context) -> Self {
        Self {
            ctx,
            coupons: Vec::new(),
        }
    }

    /// Fetch every coupon; a failure keeps the current list
    pub async fn load(&mut self) -> bool {
        match self.ctx.client.list_coupons().await {
            Ok(coupons) => {
                self.coupons = coupons;
                true
            }
            Err(e) => {
                self.ctx.fetch_failed(&e, "Failed to fetch coupons");
                false
            }
        }
    }

    /// Every loaded coupon
    #[must_use]
    pub fn coupons(&self) -> &[Coupon] {
        &self.coupons
    }

    /// Coupons paired with their status at `now`
    #[must_use]
    pub fn with_status(&self, now: DateTime<Utc>) -> Vec<(&Coupon, CouponStatus)> {
        self.coupons
            .iter()
            .map(|c| (c, selectors::coupon_status(c, now)))
            .collect()
    }

    /// Total/active/scheduled/expired counts at `now`
    #[must_use]
    pub fn summary(&self, now: DateTime<Utc>) -> CouponSummary {
        selectors::coupon_summary(&self.coupons, now)
    }

    /// Create a coupon, then refetch
    pub async fn create(&mut self, form: &CouponForm) -> Outcome {
        let payload = match form.validate() {
            Ok(payload) => payload,
            Err(e) => return self.ctx.invalid(e.to_string()),
        };
        match self.ctx.client.create_coupon(&payload).await {
            Ok(_) => {
                self.load().await;
                self.ctx.applied("Coupon created successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Error creating coupon"),
        }
    }

    /// Update a coupon, then refetch
    pub async fn update(&mut self, id: &str, form: &CouponForm) -> Outcome {
        let payload = match form.validate() {
            Ok(payload) => payload,
            Err(e) => return self.ctx.invalid(e.to_string()),
        };
        match self.ctx.client.update_coupon(id, &payload).await {
            Ok(_) => {
                self.load().await;
                self.ctx.applied("Coupon updated successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Error updating coupon"),
        }
    }

    /// Delete after confirmation, then refetch
    pub async fn delete(&mut self, id: &str) -> Outcome {
        if !self.ctx.confirm("Are you sure you want to delete this coupon?") {
            return Outcome::Declined;
        }
        match self.ctx.client.delete_coupon(id).await {
            Ok(()) => {
                self.load().await;
                self.ctx.applied("Coupon deleted successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Error deleting coupon"),
        }
    }
}

//! Coupon endpoints (enveloped)

use crate::client::{ApiClient, read_envelope};
use crate::error::ClientResult;
use reqwest::Method;
use storedesk_core::Coupon;
use storedesk_core::forms::CouponPayload;

fn coupon_path(id: &str) -> String {
    format!("/api/admin/coupons/{}", urlencoding::encode(id))
}

impl ApiClient {
    /// Fetch every coupon
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports `success: false`.
    pub async fn list_coupons(&self) -> ClientResult<Vec<Coupon>> {
        let response = self
            .send(self.request(Method::GET, "/api/admin/coupons"))
            .await?;
        let coupons = read_envelope::<Vec<Coupon>>(response)
            .await?
            .data
            .unwrap_or_default();
        tracing::debug!(count = coupons.len(), "coupons loaded");
        Ok(coupons)
    }

    /// Create a coupon; returns the backend's confirmation message
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the coupon.
    pub async fn create_coupon(&self, payload: &CouponPayload) -> ClientResult<Option<String>> {
        let response = self
            .send(self.request(Method::POST, "/api/admin/coupons").json(payload))
            .await?;
        let envelope = read_envelope::<serde_json::Value>(response).await?;
        tracing::info!(code = %payload.code, "coupon created");
        Ok(envelope.message)
    }

    /// Update a coupon; returns the backend's confirmation message
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    pub async fn update_coupon(
        &self,
        id: &str,
        payload: &CouponPayload,
    ) -> ClientResult<Option<String>> {
        let response = self
            .send(self.request(Method::PUT, &coupon_path(id)).json(payload))
            .await?;
        let envelope = read_envelope::<serde_json::Value>(response).await?;
        tracing::info!(coupon_id = %id, "coupon updated");
        Ok(envelope.message)
    }

    /// Delete a coupon
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    pub async fn delete_coupon(&self, id: &str) -> ClientResult<()> {
        let response = self
            .send(self.request(Method::DELETE, &coupon_path(id)))
            .await?;
        read_envelope::<serde_json::Value>(response).await?;
        tracing::info!(coupon_id = %id, "coupon deleted");
        Ok(())
    }
}

//! Shipping zone endpoints

use crate::client::{ApiClient, expect_success, read_json};
use crate::error::ClientResult;
use reqwest::Method;
use storedesk_core::ShippingZone;
use storedesk_core::forms::ShippingZonePayload;

impl ApiClient {
    /// Fetch every shipping zone
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a zone list.
    pub async fn list_zones(&self) -> ClientResult<Vec<ShippingZone>> {
        let response = self.send(self.request(Method::GET, "/api/shipping")).await?;
        let zones: Vec<ShippingZone> = read_json::<Option<Vec<ShippingZone>>>(response)
            .await?
            .unwrap_or_default();
        tracing::debug!(count = zones.len(), "shipping zones loaded");
        Ok(zones)
    }

    /// Add a shipping zone
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the zone.
    pub async fn create_zone(&self, payload: &ShippingZonePayload) -> ClientResult<()> {
        let response = self
            .send(self.request(Method::POST, "/api/shipping/add").json(payload))
            .await?;
        expect_success(response).await?;
        tracing::info!(zip_code = %payload.zip_code, state = %payload.state, "shipping zone added");
        Ok(())
    }

    /// Delete one shipping zone
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    pub async fn delete_zone(&self, id: &str) -> ClientResult<()> {
        let path = format!("/api/shipping/{}", urlencoding::encode(id));
        let response = self.send(self.request(Method::DELETE, &path)).await?;
        expect_success(response).await?;
        tracing::info!(zone_id = %id, "shipping zone deleted");
        Ok(())
    }

    /// Delete every zone belonging to a state
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    pub async fn delete_state(&self, name: &str) -> ClientResult<()> {
        let path = format!("/api/shipping/state/{}", urlencoding::encode(name));
        let response = self.send(self.request(Method::DELETE, &path)).await?;
        expect_success(response).await?;
        tracing::info!(state = %name, "shipping state deleted");
        Ok(())
    }
}

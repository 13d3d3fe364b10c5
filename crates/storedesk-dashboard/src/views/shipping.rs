//! Shipping zones and the states derived from them

use crate::context::{Context, Outcome};
use storedesk_core::forms::ShippingZoneForm;
use storedesk_core::{ShippingZone, StateRule, selectors};

/// Every shipping zone
#[derive(Debug)]
pub struct ShippingView {
    ctx: Context,
    zones: Vec<ShippingZone>,
}

impl ShippingView {
    /// Empty view; call [`Self::load`] to fetch
    #[must_use]
    pub const fn new(ctx: Context) -> Self {
        Self {
            ctx,
            zones: Vec::new(),
        }
    }

    /// Fetch every zone; a failure keeps the current list
    pub async fn load(&mut self) -> bool {
        match self.ctx.client.list_zones().await {
            Ok(zones) => {
                self.zones = zones;
                true
            }
            Err(e) => {
                self.ctx.fetch_failed(&e, "Failed to fetch zip codes");
                false
            }
        }
    }

    /// Every loaded zone
    #[must_use]
    pub fn zones(&self) -> &[ShippingZone] {
        &self.zones
    }

    /// States derived from the loaded zones
    #[must_use]
    pub fn states(&self) -> Vec<StateRule> {
        selectors::derive_states(&self.zones)
    }

    /// Create a zone; every field is required
    pub async fn add_zone(&mut self, form: &ShippingZoneForm) -> Outcome {
        let payload = match form.validate() {
            Ok(payload) => payload,
            Err(e) => return self.ctx.invalid(crate::context::core_message(&e)),
        };
        match self.ctx.client.create_zone(&payload).await {
            Ok(()) => {
                self.load().await;
                self.ctx.applied("Zip Code Created Successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Failed to create zip code. Please try again."),
        }
    }

    /// Delete a zone after confirmation; removed locally on success
    pub async fn delete_zone(&mut self, id: &str) -> Outcome {
        if !self.ctx.confirm("Are you sure you want to delete this zip code?") {
            return Outcome::Declined;
        }
        match self.ctx.client.delete_zone(id).await {
            Ok(()) => {
                self.zones.retain(|z| z.id != id);
                self.ctx.applied("Zip Code Deleted Successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Failed to delete zip code. Please try again."),
        }
    }

    /// Delete every zone of a state after confirmation, then refetch
    pub async fn delete_state(&mut self, name: &str) -> Outcome {
        if !self
            .ctx
            .confirm(&format!("Are you sure you want to delete the shipping rule for {name}?"))
        {
            return Outcome::Declined;
        }
        match self.ctx.client.delete_state(name).await {
            Ok(()) => {
                self.load().await;
                self.ctx.applied("Shipping rule deleted successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Failed to delete shipping rule. Please try again."),
        }
    }
}

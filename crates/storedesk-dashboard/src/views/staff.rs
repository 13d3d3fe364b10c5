//! Staff records with server-side paging and search

use crate::context::{Context, Outcome};
use storedesk_core::forms::StaffForm;
use storedesk_core::listing::StaffQuery;
use storedesk_core::{Page, Staff};

/// One page of staff
#[derive(Debug)]
pub struct StaffView {
    ctx: Context,
    query: StaffQuery,
    page: Page<Staff>,
}

impl StaffView {
    /// First page, no search
    #[must_use]
    pub fn new(ctx: Context) -> Self {
        let limit = u32::try_from(ctx.settings.page_size).unwrap_or(u32::MAX);
        Self {
            ctx,
            query: StaffQuery::new(limit),
            page: Page::default(),
        }
    }

    /// Query sent on the next load
    #[must_use]
    pub const fn query(&self) -> &StaffQuery {
        &self.query
    }

    /// Query to change before the next [`Self::load`]
    pub const fn query_mut(&mut self) -> &mut StaffQuery {
        &mut self.query
    }

    /// Current page
    #[must_use]
    pub const fn page(&self) -> &Page<Staff> {
        &self.page
    }

    /// Fetch the page the query selects; a failure keeps the current page
    pub async fn load(&mut self) -> bool {
        match self.ctx.client.list_staff(&self.query).await {
            Ok(page) => {
                self.page = page;
                true
            }
            Err(e) => {
                let message = e.user_message("Failed to load staff");
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

    /// Search from page 1
    pub async fn search(&mut self, search: impl Into<String>) -> bool {
        self.query.search = search.into();
        self.query.page = 1;
        self.load().await
    }

    /// Create when `id` is `None`, update otherwise; refetches on success
    pub async fn save(&mut self, id: Option<&str>, form: &StaffForm) -> Outcome {
        let payload = match form.validate() {
            Ok(payload) => payload,
            Err(e) => return self.ctx.invalid(e.to_string()),
        };

        let (result, done, fallback) = match id {
            Some(id) => (
                self.ctx.client.update_staff(id, &payload).await,
                "Staff updated successfully!",
                "Failed to update staff",
            ),
            None => (
                self.ctx.client.create_staff(&payload).await,
                "Staff added successfully!",
                "Failed to add staff",
            ),
        };
        match result {
            Ok(()) => {
                self.load().await;
                self.ctx.applied(done)
            }
            Err(e) => self.ctx.failed(&e, fallback),
        }
    }

    /// Delete after confirmation, then refetch
    pub async fn delete(&mut self, id: &str) -> Outcome {
        if !self.ctx.confirm("Are you sure you want to delete this staff member?") {
            return Outcome::Declined;
        }
        match self.ctx.client.delete_staff(id).await {
            Ok(()) => {
                self.load().await;
                self.ctx.applied("Staff deleted successfully!")
            }
            Err(e) => self.ctx.failed(&e, "Failed to delete staff"),
        }
    }
}

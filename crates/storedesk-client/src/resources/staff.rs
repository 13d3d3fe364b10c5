//! Staff record endpoints (server-paginated)

use crate::client::{ApiClient, read_envelope};
use crate::error::ClientResult;
use reqwest::Method;
use storedesk_core::forms::StaffPayload;
use storedesk_core::listing::{StaffQuery, check_query};
use storedesk_core::{Page, Staff};

fn staff_path(id: &str) -> String {
    format!("/api/staff/{}", urlencoding::encode(id))
}

impl ApiClient {
    /// Fetch one page of staff records
    ///
    /// A missing pagination block means a single page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the backend reports `success: false`.
    pub async fn list_staff(&self, query: &StaffQuery) -> ClientResult<Page<Staff>> {
        check_query(query)?;
        let response = self
            .send(
                self.request(Method::GET, "/api/staff")
                    .query(&query.to_query_pairs()),
            )
            .await?;
        let envelope = read_envelope::<Vec<Staff>>(response).await?;
        let mut info = envelope.pagination.unwrap_or_default();
        // the backend only reports totalPages
        if info.current_page <= 1 {
            info.current_page = query.page;
        }

        let page = Page::from_server(envelope.data.unwrap_or_default(), &info);
        tracing::debug!(count = page.items.len(), total_pages = page.total_pages, "staff loaded");
        Ok(page)
    }

    /// Add a staff member
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the record.
    pub async fn create_staff(&self, payload: &StaffPayload) -> ClientResult<()> {
        let response = self
            .send(self.request(Method::POST, "/api/staff").json(payload))
            .await?;
        read_envelope::<serde_json::Value>(response).await?;
        tracing::info!(name = %payload.name, "staff added");
        Ok(())
    }

    /// Update a staff member
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the update.
    pub async fn update_staff(&self, id: &str, payload: &StaffPayload) -> ClientResult<()> {
        let response = self
            .send(self.request(Method::PUT, &staff_path(id)).json(payload))
            .await?;
        read_envelope::<serde_json::Value>(response).await?;
        tracing::info!(staff_id = %id, "staff updated");
        Ok(())
    }

    /// Remove a staff member
    ///
    /// # Errors
    ///
    /// Returns an error if the backend refuses.
    pub async fn delete_staff(&self, id: &str) -> ClientResult<()> {
        let response = self
            .send(self.request(Method::DELETE, &staff_path(id)))
            .await?;
        read_envelope::<serde_json::Value>(response).await?;
        tracing::info!(staff_id = %id, "staff deleted");
        Ok(())
    }
}

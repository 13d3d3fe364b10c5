//! Customer endpoints

use crate::client::{ApiClient, expect_success, read_json};
use crate::error::ClientResult;
use reqwest::Method;
use serde::Deserialize;
use storedesk_core::Customer;

#[derive(Deserialize)]
#[serde(untagged)]
enum CustomerList {
    Bare(Vec<Customer>),
    Enveloped { data: Vec<Customer> },
    Wrapped { customers: Vec<Customer> },
    Empty(Option<()>),
}

impl ApiClient {
    /// Fetch every customer
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a customer list.
    pub async fn list_customers(&self) -> ClientResult<Vec<Customer>> {
        let response = self
            .send(self.request(Method::GET, "/api/admin/customers"))
            .await?;
        let customers = match read_json::<CustomerList>(response).await? {
            CustomerList::Bare(customers)
            | CustomerList::Enveloped { data: customers }
            | CustomerList::Wrapped { customers } => customers,
            CustomerList::Empty(_) => Vec::new(),
        };
        tracing::debug!(count = customers.len(), "customers loaded");
        Ok(customers)
    }

    /// Delete a customer account
    ///
    /// # Errors
    ///
    /// Returns an error carrying the backend message or the HTTP status text.
    pub async fn delete_customer(&self, id: &str) -> ClientResult<()> {
        let path = format!("/api/admin/customers/{}", urlencoding::encode(id));
        let response = self.send(self.request(Method::DELETE, &path)).await?;
        expect_success(response).await?;
        tracing::info!(customer_id = %id, "customer deleted");
        Ok(())
    }
}

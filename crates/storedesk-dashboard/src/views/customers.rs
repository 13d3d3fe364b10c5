//! Customer list

use crate::context::{Context, Outcome};
use storedesk_core::listing::{self, CustomerSortKey};
use storedesk_core::{Customer, ListQuery, Page};

/// Customers with client-side search, sort and paging
#[derive(Debug)]
pub struct CustomersView {
    ctx: Context,
    customers: Vec<Customer>,
    /// Current search/sort/page
    pub query: ListQuery<CustomerSortKey>,
}

impl CustomersView {
    /// Empty view; call [`Self::load`] to fetch
    #[must_use]
    pub fn new(ctx: Context) -> Self {
        let query = ListQuery::new(ctx.settings.page_size);
        Self {
            ctx,
            customers: Vec::new(),
            query,
        }
    }

    /// Fetch every customer; a failure keeps the current list
    pub async fn load(&mut self) -> bool {
        match self.ctx.client.list_customers().await {
            Ok(customers) => {
                self.customers = customers;
                true
            }
            Err(e) => {
                self.ctx.fetch_failed(&e, "Failed to fetch customers");
                false
            }
        }
    }

    /// Every loaded customer
    #[must_use]
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// The page the current query selects
    #[must_use]
    pub fn page(&self) -> Page<Customer> {
        listing::query(&self.customers, &self.query)
    }

    /// Delete after confirmation; a rejected delete leaves the customer listed
    pub async fn delete(&mut self, id: &str) -> Outcome {
        let name = self
            .customers
            .iter()
            .find(|c| c.id == id)
            .map_or(id, |c| c.name.as_str());
        let prompt = format!("Are you sure you want to delete \"{name}\"? This action cannot be undone.");
        if !self.ctx.confirm(&prompt) {
            return Outcome::Declined;
        }

        match self.ctx.client.delete_customer(id).await {
            Ok(()) => {
                self.customers.retain(|c| c.id != id);
                self.ctx.applied("Customer deleted successfully!")
            }
            Err(e) => {
                let message = format!("Failed to delete customer: {}", e.message_or_status_text());
                self.ctx.failed_with(&e, message)
            }
        }
    }
}

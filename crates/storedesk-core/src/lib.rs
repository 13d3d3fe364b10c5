//! Core types and rules for the storedesk admin console
//!
//! Everything here is pure: entity records, configuration, list querying,
//! derived-status selectors, form validation, bulk-ingestion state machines and
//! dashboard analytics. Network access lives in `storedesk-client`.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod analytics;
pub mod config;
pub mod error;
pub mod forms;
pub mod ingest;
pub mod listing;
pub mod selectors;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
pub use forms::FieldErrors;
pub use listing::{ListQuery, Page, SortDirection};
pub use types::{
    AdminProfile, Coupon, CouponType, Customer, EntityId, Order, OrderStatus, Product, ShippingZone,
    Staff, StateRule,
};

/// Initialize the logging system from the logging section of the configuration
///
/// `RUST_LOG` takes precedence over the configured level.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_logging(config: &config::LoggingConfig) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.level));
    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.format.eq_ignore_ascii_case("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| Error::Other(format!("Failed to initialize logging: {e}")))
}

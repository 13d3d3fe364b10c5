//! View models, one per dashboard page
//!
//! Each view owns its page state, fetches on `load`, and turns every failed
//! call into an error notification instead of an error value.

pub mod analytics;
pub mod coupons;
pub mod customers;
pub mod ingest;
pub mod orders;
pub mod products;
pub mod shipping;
pub mod staff;

pub use coupons::CouponsView;
pub use customers::CustomersView;
pub use ingest::{CsvWorkflow, ImageWorkflow, ProgressTicker};
pub use orders::OrdersView;
pub use products::{ProductEditor, ProductsView};
pub use shipping::ShippingView;
pub use staff::StaffView;

//! Endpoint groups, one module per backend resource
//!
//! Each module adds methods to [`crate::ApiClient`].

pub mod admin;
pub mod coupons;
pub mod customers;
pub mod orders;
pub mod products;
pub mod shipping;
pub mod staff;

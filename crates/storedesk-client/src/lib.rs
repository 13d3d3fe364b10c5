//! Typed REST client for the storefront admin backend
//!
//! Every call goes through one send path that keeps the admin session cookie
//! and logs the session out on any 401. Response envelopes are unwrapped here
//! so callers see plain records or a [`ClientError`].

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod client;
pub mod error;
pub mod resources;
pub mod session;

pub use client::ApiClient;
pub use error::{ClientError, ClientResult};
pub use resources::orders::{Invoice, OrderListing};
pub use session::{SessionContext, SessionState};

//! Terminal admin dashboard for the storefront backend
//!
//! One view model per page (products, orders, customers, coupons, staff,
//! shipping, analytics) on top of the typed client, with a notification
//! queue, a confirmation seam for destructive actions, and a shell that
//! routes between pages and back to login when the session ends.

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

pub mod app;
pub mod commands;
pub mod confirm;
pub mod context;
pub mod notify;
pub mod render;
pub mod shell;
pub mod views;

pub use app::App;
pub use confirm::{AutoConfirm, Confirm, StdinConfirm};
pub use context::{Context, Outcome};
pub use notify::{Notice, NoticeKind, Notifications};
pub use shell::{Navigation, Route, Shell};

//! Tienda Admin library.
//!
//! Back-office operations against the storefront REST API:
//!
//! - [`api`] - the [`api::AdminApi`] mutation endpoints and their inputs
//! - [`services`] - [`AdminClient`], which validates input, issues one
//!   mutation and refreshes every collection after a confirmed change
//! - [`dashboard`] - order and revenue summaries over the cached collections
//!
//! There is no optimistic update here: a failed mutation leaves the cached
//! collections exactly as they were.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod dashboard;
pub mod error;
pub mod services;

pub use api::{AdminApi, CategoryInput, ProductInput};
pub use dashboard::{DashboardSummary, DateRange};
pub use error::AdminError;
pub use services::AdminClient;

//! Tienda Storefront library.
//!
//! Client-side services for the storefront REST API:
//!
//! - [`api`] - `reqwest` client for the backend and the [`api::StoreApi`] seam
//! - [`storage`] - durable key/value storage for the current identity and
//!   local credential records
//! - [`services`] - session, catalog, cart reconciliation and checkout
//!
//! Services are plain structs constructed once per session and passed by
//! reference; nothing here is a global.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

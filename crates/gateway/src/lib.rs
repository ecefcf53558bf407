//! Siteflow gateway library.
//!
//! Serves the marketing site and the operations dashboard, and proxies the
//! reporting and AI vendors behind a small JSON API. Exposed as a library so
//! the router can be exercised in tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod vendors;

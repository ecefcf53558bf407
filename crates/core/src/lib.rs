//! Siteflow Core - Shared domain library.
//!
//! This crate provides the types and pure logic used across Siteflow components:
//! - `gateway` - Marketing site, operations dashboard and vendor API gateway
//! - `cli` - Operator tooling
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no session handling. Everything here is deterministic given its
//! inputs, which keeps the role and navigation rules easy to test.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, roles, users and themes
//! - [`navigation`] - Dashboard navigation catalog and the role-gated filter
//! - [`palette`] - Command palette built on top of the visible navigation
//! - [`notifications`] - Bounded per-session notification center
//! - [`metrics`] - Vendor metric DTOs and percentage-change math
//! - [`assessment`] - AI fit-score result and its fallback

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod assessment;
pub mod metrics;
pub mod navigation;
pub mod notifications;
pub mod palette;
pub mod types;

pub use assessment::{FALLBACK_ANALYSIS, FitAssessment};
pub use navigation::{Capability, NavItem, Visibility};
pub use notifications::{Notification, NotificationCenter, Severity};
pub use types::*;

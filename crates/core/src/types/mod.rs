//! Core types for Siteflow.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod role;
pub mod theme;
pub mod user;

pub use email::{Email, EmailError};
pub use id::*;
pub use role::{Role, RoleParseError};
pub use theme::{Theme, ThemeParseError};
pub use user::User;

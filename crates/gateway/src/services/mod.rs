//! Services for the gateway.
//!
//! - `auth` - Login relay to the external auth service

pub mod auth;

pub use auth::{AuthError, AuthProvider, AuthSession, ExternalAuthService};

//! Session middleware configuration.
//!
//! Sessions are held in memory in a bounded [`SessionCache`]: they are
//! lost on restart and never shared between instances.

use tower_sessions::{Expiry, SessionManagerLayer};

use super::session_store::SessionCache;
use crate::config::GatewayConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "siteflow_session";

/// Session expiry after inactivity (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &GatewayConfig) -> SessionManagerLayer<SessionCache> {
    SessionManagerLayer::new(SessionCache::new(config.max_sessions))
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}

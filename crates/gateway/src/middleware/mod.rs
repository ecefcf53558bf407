//! HTTP middleware stack for the gateway.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request span with status and latency)
//! 3. Request ID
//! 4. Security headers
//! 5. Session layer (tower-sessions, moka-backed store)

pub mod auth;
pub mod request_id;
pub mod security_headers;
pub mod session;
pub mod session_store;

pub use auth::{AuthRejection, OptionalUser, RequireStaff, RequireUser};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
pub use session_store::SessionCache;

//! Gateway models.
//!
//! - `session` - Session keys and typed accessors

pub mod session;

pub use session::keys as session_keys;

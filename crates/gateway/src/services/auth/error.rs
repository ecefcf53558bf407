//! Authentication relay error types.

use thiserror::Error;

/// Errors that can occur while relaying a login to the auth service.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] siteflow_core::EmailError),

    /// Password was empty.
    #[error("password is required")]
    MissingPassword,

    /// The auth service rejected the credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// HTTP request to the auth service failed.
    #[error("auth service request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The auth service answered with an unexpected status.
    #[error("auth service error: {status} - {message}")]
    Upstream { status: u16, message: String },

    /// The auth service response could not be parsed.
    #[error("invalid auth service response: {0}")]
    Parse(String),
}

//! Authentication relay.
//!
//! The gateway does not verify credentials itself. It forwards them to the
//! external auth service and keeps the returned token and user record in
//! the visitor's session.

mod error;

pub use error::AuthError;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use siteflow_core::{Email, User};

/// Token and user returned by a successful login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    pub token: String,
    pub user: User,
}

/// Something that can exchange credentials for an [`AuthSession`].
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Verify credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the credentials are
    /// rejected and another variant when the provider is unavailable.
    async fn login(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError>;
}

/// Validate raw form input before it is relayed.
///
/// # Errors
///
/// Returns an error if the email is malformed or the password is empty.
pub fn validate_credentials(email: &str, password: &str) -> Result<Email, AuthError> {
    let email = Email::parse(email)?;
    if password.is_empty() {
        return Err(AuthError::MissingPassword);
    }
    Ok(email)
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// [`AuthProvider`] backed by the external auth service's `POST /auth/login`.
#[derive(Clone)]
pub struct ExternalAuthService {
    inner: Arc<ExternalAuthServiceInner>,
}

struct ExternalAuthServiceInner {
    http: reqwest::Client,
    login_url: Url,
}

impl ExternalAuthService {
    /// Create a client for the auth service at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the login URL cannot be derived from `base_url`.
    pub fn new(http: reqwest::Client, base_url: &Url) -> Result<Self, AuthError> {
        let login_url = login_url(base_url)?;
        Ok(Self {
            inner: Arc::new(ExternalAuthServiceInner { http, login_url }),
        })
    }
}

/// `{base}/auth/login`, keeping any path prefix of `base`.
fn login_url(base: &Url) -> Result<Url, AuthError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join("auth/login")
        .map_err(|e| AuthError::Parse(format!("invalid AUTH_SERVICE_URL: {e}")))
}

#[async_trait]
impl AuthProvider for ExternalAuthService {
    #[instrument(skip(self, email, password), fields(email_domain = %email.domain()))]
    async fn login(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .inner
            .http
            .post(self.inner.login_url.clone())
            .json(&LoginRequest {
                email: email.as_str(),
                password,
            })
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AuthError::Upstream {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| AuthError::Parse(e.to_string()))
    }
}

impl std::fmt::Debug for ExternalAuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExternalAuthService")
            .field("login_url", &self.inner.login_url.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use siteflow_core::Role;

    #[test]
    fn test_login_url() {
        let base = Url::parse("http://localhost:4000").unwrap();
        assert_eq!(
            login_url(&base).unwrap().as_str(),
            "http://localhost:4000/auth/login"
        );

        let prefixed = Url::parse("https://api.siteflow.dev/v1").unwrap();
        assert_eq!(
            login_url(&prefixed).unwrap().as_str(),
            "https://api.siteflow.dev/v1/auth/login"
        );
    }

    #[test]
    fn test_validate_credentials() {
        assert!(validate_credentials("kam@siteflow.dev", "hunter2").is_ok());
        assert!(matches!(
            validate_credentials("not-an-email", "hunter2"),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            validate_credentials("kam@siteflow.dev", ""),
            Err(AuthError::MissingPassword)
        ));
    }

    #[test]
    fn test_auth_session_from_service_response() {
        let body = r#"{
            "token": "eyJhbGciOiJIUzI1NiJ9.e30.sig",
            "user": {"id": 7, "name": "Kim Park", "email": "kim@siteflow.dev", "role": "kam", "avatar": null}
        }"#;
        let session: AuthSession = serde_json::from_str(body).unwrap();
        assert_eq!(session.user.role, Role::Kam);
        assert!(session.token.starts_with("eyJ"));
    }
}

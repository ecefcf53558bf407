//! Google service-account access tokens.
//!
//! Signs an RS256 JWT assertion with the service account's private key and
//! exchanges it at the OAuth token endpoint. Tokens are cached for slightly
//! less than their one hour lifetime and shared by the Analytics and Search
//! Console adapters.

use std::time::Duration;

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::ServiceAccount;

use super::{VendorError, read_json};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Read-only scopes for GA4 and Search Console.
pub const SCOPES: &str = "https://www.googleapis.com/auth/analytics.readonly \
https://www.googleapis.com/auth/webmasters.readonly";

/// Lifetime requested for the assertion. Google caps this at one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// How long an access token is reused.
const TOKEN_TTL: Duration = Duration::from_secs(55 * 60);

const CACHE_KEY: &str = "access_token";

/// JWT claims for the service-account assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    #[must_use]
    pub fn new(client_email: &str, issued_at: i64) -> Self {
        Self {
            iss: client_email.to_string(),
            scope: SCOPES.to_string(),
            aud: TOKEN_URL.to_string(),
            iat: issued_at,
            exp: issued_at + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Issues and caches OAuth access tokens for a service account.
pub struct GoogleTokenProvider {
    account: ServiceAccount,
    http: reqwest::Client,
    cache: Cache<&'static str, String>,
}

impl GoogleTokenProvider {
    #[must_use]
    pub fn new(account: ServiceAccount, http: reqwest::Client) -> Self {
        Self {
            account,
            http,
            cache: Cache::builder()
                .max_capacity(1)
                .time_to_live(TOKEN_TTL)
                .build(),
        }
    }

    /// A valid access token, from cache when possible.
    ///
    /// # Errors
    ///
    /// Returns an error if signing the assertion or the token exchange fails.
    pub async fn access_token(&self) -> Result<String, VendorError> {
        self.cache
            .try_get_with(CACHE_KEY, self.fetch_token())
            .await
            .map_err(|e| VendorError::Credentials(e.to_string()))
    }

    /// Drop the cached token, e.g. after the vendor rejected it.
    pub async fn invalidate(&self) {
        self.cache.invalidate(CACHE_KEY).await;
    }

    #[instrument(skip(self), fields(account = %self.account.client_email))]
    async fn fetch_token(&self) -> Result<String, VendorError> {
        let assertion = sign_assertion(&self.account, chrono::Utc::now().timestamp())?;

        let response = self
            .http
            .post(TOKEN_URL)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let token: TokenResponse = read_json("google-oauth", response).await?;
        tracing::debug!("Obtained Google access token");
        Ok(token.access_token)
    }
}

impl std::fmt::Debug for GoogleTokenProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTokenProvider")
            .field("account", &self.account.client_email)
            .finish_non_exhaustive()
    }
}

/// Sign the JWT assertion for the token exchange.
///
/// # Errors
///
/// Returns [`VendorError::Credentials`] if the private key is not a valid
/// RSA PEM key.
pub fn sign_assertion(account: &ServiceAccount, issued_at: i64) -> Result<String, VendorError> {
    let key = EncodingKey::from_rsa_pem(account.private_key_pem())
        .map_err(|e| VendorError::Credentials(format!("invalid GOOGLE_PRIVATE_KEY: {e}")))?;

    let claims = Claims::new(&account.client_email, issued_at);

    jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| VendorError::Credentials(format!("failed to sign assertion: {e}")))
}

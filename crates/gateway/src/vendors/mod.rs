//! Vendor adapters.
//!
//! One module per external service. Each adapter builds a single request
//! against the vendor API, awaits the response and reshapes it into the
//! flattened records from `siteflow_core::metrics`.
//!
//! Adapters sit behind the traits below so the router can be exercised with
//! stub implementations. There are no retries and no response caching; a
//! failing vendor call fails the request.
//!
//! | trait | implementation | vendor |
//! |---|---|---|
//! | [`FitAssessor`] | [`gemini::GeminiClient`] | Gemini `generateContent` |
//! | [`TrafficSource`] | [`analytics::AnalyticsClient`] | GA4 Data API |
//! | [`SearchSource`] | [`search_console::SearchConsoleClient`] | Search Console |
//! | [`PageSpeedSource`] | [`pagespeed::PageSpeedClient`] | PageSpeed Insights v5 |

pub mod analytics;
pub mod gemini;
pub mod google_auth;
pub mod pagespeed;
pub mod search_console;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use siteflow_core::FitAssessment;
use siteflow_core::metrics::{
    PageSpeedReport, PageSpeedResult, SearchReport, Strategy, TrafficReport,
};

use crate::config::GatewayConfig;

const USER_AGENT: &str = concat!("siteflow-gateway/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur when talking to a vendor API.
#[derive(Debug, Error)]
pub enum VendorError {
    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(&'static str),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Vendor returned an error response.
    #[error("{vendor} API error: {status} - {message}")]
    Api {
        vendor: &'static str,
        status: u16,
        message: String,
    },

    /// Rate limited by the vendor.
    #[error("{vendor} rate limited, retry after {retry_after} seconds")]
    RateLimited { vendor: &'static str, retry_after: u64 },

    /// Obtaining vendor credentials failed.
    #[error("credential error: {0}")]
    Credentials(String),

    /// Failed to parse a vendor response.
    #[error("parse error: {0}")]
    Parse(String),
}

/// Scores a prospect's problem statement against the Siteflow pitch.
#[async_trait]
pub trait FitAssessor: Send + Sync {
    /// Run one prompt-and-parse round trip.
    async fn assess(&self, problem: &str) -> Result<FitAssessment, VendorError>;
}

/// Google Analytics traffic snapshot.
#[async_trait]
pub trait TrafficSource: Send + Sync {
    async fn traffic_report(&self) -> Result<TrafficReport, VendorError>;
}

/// Search Console performance snapshot.
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search_report(&self) -> Result<SearchReport, VendorError>;
}

/// PageSpeed Insights runs.
#[async_trait]
pub trait PageSpeedSource: Send + Sync {
    /// A single run for one strategy.
    async fn run(&self, url: &str, strategy: Strategy) -> Result<PageSpeedResult, VendorError>;

    /// Mobile and desktop runs combined, see [`pagespeed_report`].
    async fn report(&self, url: &str) -> Result<PageSpeedReport, VendorError> {
        pagespeed_report(self, url).await
    }
}

/// Run mobile and desktop PageSpeed concurrently.
///
/// Either run failing fails the whole report.
///
/// # Errors
///
/// Returns the first error from either run.
pub async fn pagespeed_report<S: PageSpeedSource + ?Sized>(
    source: &S,
    url: &str,
) -> Result<PageSpeedReport, VendorError> {
    let (mobile, desktop) = tokio::try_join!(
        source.run(url, Strategy::Mobile),
        source.run(url, Strategy::Desktop)
    )?;

    Ok(PageSpeedReport {
        url: url.to_string(),
        mobile,
        desktop,
        fetched_at: chrono::Utc::now(),
    })
}

/// Stand-in for an integration whose configuration is missing.
///
/// Every call fails with [`VendorError::MissingConfig`] naming the variable
/// that has to be set.
#[derive(Debug, Clone, Copy)]
pub struct Unconfigured(pub &'static str);

#[async_trait]
impl FitAssessor for Unconfigured {
    async fn assess(&self, _problem: &str) -> Result<FitAssessment, VendorError> {
        Err(VendorError::MissingConfig(self.0))
    }
}

#[async_trait]
impl TrafficSource for Unconfigured {
    async fn traffic_report(&self) -> Result<TrafficReport, VendorError> {
        Err(VendorError::MissingConfig(self.0))
    }
}

#[async_trait]
impl SearchSource for Unconfigured {
    async fn search_report(&self) -> Result<SearchReport, VendorError> {
        Err(VendorError::MissingConfig(self.0))
    }
}

/// The set of adapters used by the gateway.
#[derive(Clone)]
pub struct Vendors {
    pub assessor: Arc<dyn FitAssessor>,
    pub traffic: Arc<dyn TrafficSource>,
    pub search: Arc<dyn SearchSource>,
    pub pagespeed: Arc<dyn PageSpeedSource>,
}

impl Vendors {
    /// Build the real adapters from configuration.
    ///
    /// Integrations without credentials are replaced by [`Unconfigured`].
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn from_config(config: &GatewayConfig) -> Result<Self, VendorError> {
        let http = build_http_client(config.vendor_timeout)?;
        let google = &config.google;

        let assessor: Arc<dyn FitAssessor> = match &config.gemini {
            Some(gemini) => Arc::new(gemini::GeminiClient::new(gemini, config.vendor_timeout)?),
            None => Arc::new(Unconfigured("GEMINI_API_KEY")),
        };

        let tokens = google
            .service_account
            .clone()
            .map(|account| Arc::new(google_auth::GoogleTokenProvider::new(account, http.clone())));

        let traffic: Arc<dyn TrafficSource> =
            match (&tokens, &google.analytics_property_id) {
                (Some(tokens), Some(property_id)) => Arc::new(analytics::AnalyticsClient::new(
                    http.clone(),
                    Arc::clone(tokens),
                    property_id.clone(),
                )),
                (None, _) => Arc::new(Unconfigured("GOOGLE_SERVICE_ACCOUNT_EMAIL")),
                (_, None) => Arc::new(Unconfigured("GA4_PROPERTY_ID")),
            };

        let search: Arc<dyn SearchSource> = match (&tokens, &google.search_console_site_url) {
            (Some(tokens), Some(site_url)) => Arc::new(search_console::SearchConsoleClient::new(
                http.clone(),
                Arc::clone(tokens),
                site_url.clone(),
            )),
            (None, _) => Arc::new(Unconfigured("GOOGLE_SERVICE_ACCOUNT_EMAIL")),
            (_, None) => Arc::new(Unconfigured("GSC_SITE_URL")),
        };

        let pagespeed = Arc::new(pagespeed::PageSpeedClient::new(
            http,
            google.pagespeed_api_key.clone(),
        ));

        Ok(Self {
            assessor,
            traffic,
            search,
            pagespeed,
        })
    }
}

impl std::fmt::Debug for Vendors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vendors").finish_non_exhaustive()
    }
}

/// Build the shared HTTP client used by the Google adapters.
///
/// # Errors
///
/// Returns an error if the TLS backend cannot be initialised.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, VendorError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Parse a successful JSON response or turn an error status into a
/// [`VendorError`].
pub(crate) async fn read_json<T: DeserializeOwned>(
    vendor: &'static str,
    response: reqwest::Response,
) -> Result<T, VendorError> {
    let status = response.status();

    if status.is_success() {
        let body = response.text().await?;
        return serde_json::from_str(&body)
            .map_err(|e| VendorError::Parse(format!("{vendor}: failed to parse response: {e}")));
    }

    Err(parse_error(vendor, response).await)
}

/// Map an error response to a [`VendorError`].
async fn parse_error(vendor: &'static str, response: reqwest::Response) -> VendorError {
    let status = response.status().as_u16();

    if status == 429 {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return VendorError::RateLimited {
            vendor,
            retry_after,
        };
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    VendorError::Api {
        vendor,
        status,
        message: google_error_message(&body).unwrap_or(body),
    }
}

/// Extract `error.message` from a Google API error body.
fn google_error_message(body: &str) -> Option<String> {
    #[derive(serde::Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }

    #[derive(serde::Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|parsed| parsed.error.message)
}

/// Parse a numeric string as returned by the GA4 Data API.
///
/// Empty strings count as zero.
pub(crate) fn parse_number(field: &str, raw: &str) -> Result<f64, VendorError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(0.0);
    }
    raw.parse::<f64>()
        .map_err(|_| VendorError::Parse(format!("{field}: not a number: {raw:?}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use siteflow_core::metrics::{CoreWebVitals, PageSpeedScores};

    struct FixedRuns {
        fail_on: Option<Strategy>,
    }

    #[async_trait]
    impl PageSpeedSource for FixedRuns {
        async fn run(
            &self,
            _url: &str,
            strategy: Strategy,
        ) -> Result<PageSpeedResult, VendorError> {
            if self.fail_on == Some(strategy) {
                return Err(VendorError::Api {
                    vendor: "pagespeed",
                    status: 500,
                    message: "Lighthouse returned error".to_string(),
                });
            }
            Ok(PageSpeedResult {
                strategy,
                scores: PageSpeedScores {
                    performance: 90,
                    ..PageSpeedScores::default()
                },
                vitals: CoreWebVitals::default(),
            })
        }
    }

    #[tokio::test]
    async fn test_pagespeed_report_joins_both_strategies() {
        let source = FixedRuns { fail_on: None };
        let report = source.report("https://siteflow.dev").await.unwrap();
        assert_eq!(report.mobile.strategy, Strategy::Mobile);
        assert_eq!(report.desktop.strategy, Strategy::Desktop);
        assert_eq!(report.url, "https://siteflow.dev");
    }

    #[tokio::test]
    async fn test_pagespeed_report_has_no_partial_success() {
        for strategy in [Strategy::Mobile, Strategy::Desktop] {
            let source = FixedRuns {
                fail_on: Some(strategy),
            };
            assert!(pagespeed_report(&source, "https://siteflow.dev").await.is_err());
        }
    }

    #[tokio::test]
    async fn test_unconfigured_names_the_variable() {
        let err = Unconfigured("GA4_PROPERTY_ID").traffic_report().await.unwrap_err();
        assert!(matches!(err, VendorError::MissingConfig("GA4_PROPERTY_ID")));
    }

    #[test]
    fn test_vendors_from_default_config() {
        let config = GatewayConfig::from_map(&std::collections::HashMap::new()).unwrap();
        assert!(Vendors::from_config(&config).is_ok());
    }

    #[test]
    fn test_google_error_message() {
        let body = r#"{"error": {"code": 403, "message": "User does not have sufficient permissions", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(
            google_error_message(body).as_deref(),
            Some("User does not have sufficient permissions")
        );
        assert_eq!(google_error_message("<html>"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("sessions", "1520").unwrap(), 1520.0);
        assert_eq!(parse_number("bounceRate", "0.4213").unwrap(), 0.4213);
        assert_eq!(parse_number("sessions", "").unwrap(), 0.0);
        assert!(parse_number("sessions", "n/a").is_err());
    }
}

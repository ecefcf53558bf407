//! PageSpeed Insights v5 adapter.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use siteflow_core::metrics::{CoreWebVitals, PageSpeedResult, PageSpeedScores, Strategy};

use super::{PageSpeedSource, VendorError, read_json};

const PAGESPEED_API_URL: &str = "https://www.googleapis.com/pagespeedonline/v5/runPagespeed";

const CATEGORIES: [&str; 4] = ["performance", "accessibility", "best-practices", "seo"];

/// PageSpeed Insights client. The API key is optional but raises quota.
#[derive(Clone)]
pub struct PageSpeedClient {
    inner: Arc<PageSpeedClientInner>,
}

struct PageSpeedClientInner {
    http: reqwest::Client,
    api_key: Option<SecretString>,
}

impl PageSpeedClient {
    #[must_use]
    pub fn new(http: reqwest::Client, api_key: Option<SecretString>) -> Self {
        Self {
            inner: Arc::new(PageSpeedClientInner { http, api_key }),
        }
    }

    /// Request URL for one run.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot be parsed.
    pub fn request_url(&self, url: &str, strategy: Strategy) -> Result<Url, VendorError> {
        let mut params: Vec<(&str, &str)> = vec![("url", url), ("strategy", strategy.as_str())];
        params.extend(CATEGORIES.iter().map(|c| ("category", *c)));
        if let Some(key) = &self.inner.api_key {
            params.push(("key", key.expose_secret()));
        }

        Url::parse_with_params(PAGESPEED_API_URL, &params)
            .map_err(|e| VendorError::Parse(format!("pagespeed: bad request URL: {e}")))
    }
}

#[async_trait]
impl PageSpeedSource for PageSpeedClient {
    #[instrument(skip(self), fields(strategy = strategy.as_str()))]
    async fn run(&self, url: &str, strategy: Strategy) -> Result<PageSpeedResult, VendorError> {
        let response = self
            .inner
            .http
            .get(self.request_url(url, strategy)?)
            .send()
            .await?;

        let body: PageSpeedResponse = read_json("pagespeed", response).await?;
        Ok(body.into_result(strategy))
    }
}

impl std::fmt::Debug for PageSpeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageSpeedClient")
            .field("api_key", &self.inner.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Response
// =============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedResponse {
    lighthouse_result: LighthouseResult,
}

#[derive(Debug, Deserialize)]
struct LighthouseResult {
    #[serde(default)]
    categories: HashMap<String, Category>,
    #[serde(default)]
    audits: HashMap<String, Audit>,
}

#[derive(Debug, Deserialize)]
struct Category {
    /// 0.0-1.0, null when the category could not be scored.
    #[serde(default)]
    score: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Audit {
    #[serde(default)]
    display_value: Option<String>,
}

impl PageSpeedResponse {
    #[must_use]
    pub fn into_result(self, strategy: Strategy) -> PageSpeedResult {
        let lighthouse = self.lighthouse_result;
        let score = |name: &str| scale_score(lighthouse.categories.get(name).and_then(|c| c.score));
        let vital = |name: &str| {
            lighthouse
                .audits
                .get(name)
                .and_then(|a| a.display_value.clone())
        };

        PageSpeedResult {
            strategy,
            scores: PageSpeedScores {
                performance: score("performance"),
                accessibility: score("accessibility"),
                best_practices: score("best-practices"),
                seo: score("seo"),
            },
            vitals: CoreWebVitals {
                first_contentful_paint: vital("first-contentful-paint"),
                largest_contentful_paint: vital("largest-contentful-paint"),
                cumulative_layout_shift: vital("cumulative-layout-shift"),
                total_blocking_time: vital("total-blocking-time"),
                speed_index: vital("speed-index"),
            },
        }
    }
}

/// Lighthouse 0-1 score to a 0-100 integer.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn scale_score(score: Option<f64>) -> u8 {
    score
        .filter(|s| s.is_finite())
        .map_or(0, |s| (s * 100.0).round().clamp(0.0, 100.0) as u8)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_request_url() {
        let client = PageSpeedClient::new(reqwest::Client::new(), None);
        let url = client
            .request_url("https://siteflow.dev/?ref=a&b=c", Strategy::Mobile)
            .unwrap();
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();

        assert!(pairs.contains(&("url".into(), "https://siteflow.dev/?ref=a&b=c".into())));
        assert!(pairs.contains(&("strategy".into(), "mobile".into())));
        assert_eq!(pairs.iter().filter(|(k, _)| k == "category").count(), 4);
        assert!(!pairs.iter().any(|(k, _)| k == "key"));
    }

    #[test]
    fn test_request_url_with_key() {
        let client =
            PageSpeedClient::new(reqwest::Client::new(), Some(SecretString::from("psi-key")));
        let url = client
            .request_url("https://siteflow.dev", Strategy::Desktop)
            .unwrap();
        assert!(url.query_pairs().any(|(k, v)| k == "key" && v == "psi-key"));
        assert!(format!("{client:?}").contains("[REDACTED]"));
    }

    #[test]
    fn test_into_result() {
        let body = r#"{
            "id": "https://siteflow.dev/",
            "lighthouseResult": {
                "categories": {
                    "performance": {"id": "performance", "score": 0.874},
                    "accessibility": {"id": "accessibility", "score": 1},
                    "best-practices": {"id": "best-practices", "score": 0.96},
                    "seo": {"id": "seo", "score": null}
                },
                "audits": {
                    "first-contentful-paint": {"displayValue": "1.2 s"},
                    "largest-contentful-paint": {"displayValue": "2.4 s"},
                    "cumulative-layout-shift": {"displayValue": "0.01"},
                    "total-blocking-time": {"displayValue": "150 ms"},
                    "speed-index": {}
                }
            }
        }"#;
        let response: PageSpeedResponse = serde_json::from_str(body).unwrap();
        let result = response.into_result(Strategy::Desktop);

        assert_eq!(result.strategy, Strategy::Desktop);
        assert_eq!(result.scores.performance, 87);
        assert_eq!(result.scores.accessibility, 100);
        assert_eq!(result.scores.best_practices, 96);
        assert_eq!(result.scores.seo, 0);
        assert_eq!(result.vitals.largest_contentful_paint.as_deref(), Some("2.4 s"));
        assert_eq!(result.vitals.speed_index, None);
    }

    #[test]
    fn test_missing_lighthouse_result_is_parse_error() {
        assert!(serde_json::from_str::<PageSpeedResponse>(r#"{"id": "x"}"#).is_err());
    }
}

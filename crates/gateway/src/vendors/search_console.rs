//! Search Console search analytics adapter.
//!
//! Three `searchAnalytics/query` calls per request: aggregate totals for the
//! last 28 days and the 28 before, and the top queries of the current period.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use siteflow_core::metrics::{MetricChange, SearchReport, SearchSnapshot, TopQuery, round_to};

use super::google_auth::GoogleTokenProvider;
use super::{SearchSource, VendorError, read_json};

const WEBMASTERS_API_URL: &str = "https://www.googleapis.com/webmasters/v3/sites";
const PERIOD_DAYS: u64 = 28;
const TOP_QUERIES_LIMIT: u32 = 10;

/// An inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// The current and previous comparison periods, ending yesterday.
#[must_use]
pub fn periods(today: NaiveDate) -> (Period, Period) {
    let current_end = today - Days::new(1);
    let current_start = today - Days::new(PERIOD_DAYS);
    let previous_end = current_start - Days::new(1);
    let previous_start = current_start - Days::new(PERIOD_DAYS);

    (
        Period {
            start: current_start,
            end: current_end,
        },
        Period {
            start: previous_start,
            end: previous_end,
        },
    )
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    start_date: String,
    end_date: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    dimensions: Vec<&'static str>,
    row_limit: u32,
}

impl QueryRequest {
    /// Totals for a period, no dimensions.
    #[must_use]
    pub fn totals(period: Period) -> Self {
        Self {
            start_date: period.start.to_string(),
            end_date: period.end.to_string(),
            dimensions: Vec::new(),
            row_limit: 1,
        }
    }

    /// Top queries by clicks for a period.
    #[must_use]
    pub fn top_queries(period: Period) -> Self {
        Self {
            start_date: period.start.to_string(),
            end_date: period.end.to_string(),
            dimensions: vec!["query"],
            row_limit: TOP_QUERIES_LIMIT,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct QueryResponse {
    #[serde(default)]
    rows: Vec<QueryRow>,
}

#[derive(Debug, Default, Clone, Deserialize)]
struct QueryRow {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    clicks: f64,
    #[serde(default)]
    impressions: f64,
    #[serde(default)]
    ctr: f64,
    #[serde(default)]
    position: f64,
}

/// Search Console client bound to one property.
#[derive(Clone)]
pub struct SearchConsoleClient {
    inner: Arc<SearchConsoleClientInner>,
}

struct SearchConsoleClientInner {
    http: reqwest::Client,
    tokens: Arc<GoogleTokenProvider>,
    site_url: String,
}

impl SearchConsoleClient {
    #[must_use]
    pub fn new(http: reqwest::Client, tokens: Arc<GoogleTokenProvider>, site_url: String) -> Self {
        Self {
            inner: Arc::new(SearchConsoleClientInner {
                http,
                tokens,
                site_url,
            }),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{WEBMASTERS_API_URL}/{}/searchAnalytics/query",
            urlencoding::encode(&self.inner.site_url)
        )
    }

    #[instrument(skip(self, request), fields(site = %self.inner.site_url))]
    async fn query(&self, request: &QueryRequest) -> Result<QueryResponse, VendorError> {
        let token = self.inner.tokens.access_token().await?;

        let response = self
            .inner
            .http
            .post(self.endpoint())
            .bearer_auth(token)
            .json(request)
            .send()
            .await?;

        let result = read_json("search-console", response).await;
        if let Err(VendorError::Api { status: 401, .. }) = &result {
            self.inner.tokens.invalidate().await;
        }
        result
    }
}

#[async_trait]
impl SearchSource for SearchConsoleClient {
    async fn search_report(&self) -> Result<SearchReport, VendorError> {
        let (current, previous) = periods(chrono::Utc::now().date_naive());

        let current_totals = self.query(&QueryRequest::totals(current)).await?;
        let previous_totals = self.query(&QueryRequest::totals(previous)).await?;
        let queries = self.query(&QueryRequest::top_queries(current)).await?;

        Ok(SearchReport {
            snapshot: snapshot_from_totals(&current_totals, &previous_totals),
            top_queries: top_queries_from_response(&queries),
            generated_at: chrono::Utc::now(),
        })
    }
}

impl std::fmt::Debug for SearchConsoleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchConsoleClient")
            .field("site_url", &self.inner.site_url)
            .finish_non_exhaustive()
    }
}

/// Compare two aggregate responses. A period with no rows counts as zero.
#[must_use]
pub fn snapshot_from_totals(current: &QueryResponse, previous: &QueryResponse) -> SearchSnapshot {
    let now = current.rows.first().cloned().unwrap_or_default();
    let before = previous.rows.first().cloned().unwrap_or_default();

    SearchSnapshot {
        clicks: MetricChange::between(now.clicks, before.clicks),
        impressions: MetricChange::between(now.impressions, before.impressions),
        ctr: MetricChange::between(round_to(now.ctr * 100.0, 2), round_to(before.ctr * 100.0, 2)),
        position: MetricChange::between(round_to(now.position, 1), round_to(before.position, 1)),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn top_queries_from_response(response: &QueryResponse) -> Vec<TopQuery> {
    response
        .rows
        .iter()
        .map(|row| TopQuery {
            query: row.keys.first().cloned().unwrap_or_default(),
            clicks: row.clicks.max(0.0) as u64,
            impressions: row.impressions.max(0.0) as u64,
            ctr: round_to(row.ctr * 100.0, 2),
            position: round_to(row.position, 1),
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;

    fn response(body: &str) -> QueryResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_periods_do_not_overlap() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let (current, previous) = periods(today);
        assert_eq!(current.end, NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
        assert_eq!(current.start, NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(previous.end, NaiveDate::from_ymd_opt(2026, 1, 31).unwrap());
        assert_eq!(previous.start, NaiveDate::from_ymd_opt(2026, 1, 4).unwrap());
        assert_eq!((current.end - current.start).num_days(), 27);
        assert_eq!((previous.end - previous.start).num_days(), 27);
    }

    #[test]
    fn test_request_serialization() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let (current, _) = periods(today);

        let totals = serde_json::to_value(QueryRequest::totals(current)).unwrap();
        assert_eq!(totals["startDate"], "2026-02-01");
        assert!(totals.get("dimensions").is_none());

        let top = serde_json::to_value(QueryRequest::top_queries(current)).unwrap();
        assert_eq!(top["dimensions"][0], "query");
        assert_eq!(top["rowLimit"], 10);
    }

    #[test]
    fn test_endpoint_encodes_site() {
        let http = reqwest::Client::new();
        let account = crate::config::ServiceAccount {
            client_email: "reports@siteflow.iam.gserviceaccount.com".to_string(),
            private_key: secrecy::SecretString::from("unused"),
        };
        let tokens = Arc::new(GoogleTokenProvider::new(account, http.clone()));
        let client = SearchConsoleClient::new(http, tokens, "https://siteflow.dev/".to_string());
        assert_eq!(
            client.endpoint(),
            "https://www.googleapis.com/webmasters/v3/sites/https%3A%2F%2Fsiteflow.dev%2F/searchAnalytics/query"
        );
    }

    #[test]
    fn test_snapshot_from_totals() {
        let current = response(
            r#"{"rows": [{"clicks": 120, "impressions": 4000, "ctr": 0.03, "position": 12.345}]}"#,
        );
        let previous = response(
            r#"{"rows": [{"clicks": 80, "impressions": 4000, "ctr": 0.02, "position": 14.0}]}"#,
        );
        let snapshot = snapshot_from_totals(&current, &previous);
        assert_eq!(snapshot.clicks.change, 50.0);
        assert_eq!(snapshot.impressions.change, 0.0);
        assert_eq!(snapshot.ctr.current, 3.0);
        assert_eq!(snapshot.position.current, 12.3);
    }

    #[test]
    fn test_snapshot_with_no_history() {
        let current = response(r#"{"rows": [{"clicks": 5, "impressions": 90}]}"#);
        let snapshot = snapshot_from_totals(&current, &QueryResponse::default());
        assert_eq!(snapshot.clicks.change, 100.0);
        assert_eq!(snapshot.position.change, 0.0);
    }

    #[test]
    fn test_top_queries() {
        let body = response(
            r#"{"rows": [
                {"keys": ["siteflow pricing"], "clicks": 31, "impressions": 210, "ctr": 0.1476, "position": 2.41},
                {"keys": ["custom client portal"], "clicks": 12, "impressions": 800, "ctr": 0.015, "position": 8.9}
            ]}"#,
        );
        let queries = top_queries_from_response(&body);
        assert_eq!(queries.len(), 2);
        assert_eq!(queries[0].query, "siteflow pricing");
        assert_eq!(queries[0].ctr, 14.76);
        assert_eq!(queries[0].position, 2.4);
    }
}

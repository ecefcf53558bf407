//! Google Analytics 4 Data API adapter.
//!
//! Two `runReport` calls per request: an aggregate over the last seven days
//! and the seven before, and the top pages of the last seven days.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use siteflow_core::metrics::{MetricChange, TopPage, TrafficReport, TrafficSnapshot, round_to};

use super::google_auth::GoogleTokenProvider;
use super::{TrafficSource, VendorError, parse_number, read_json};

const DATA_API_URL: &str = "https://analyticsdata.googleapis.com/v1beta/properties";
const TOP_PAGES_LIMIT: u32 = 10;

const CURRENT: &str = "current";
const PREVIOUS: &str = "previous";

/// Metrics requested for the snapshot, in response order.
const SNAPSHOT_METRICS: [&str; 5] = [
    "activeUsers",
    "sessions",
    "screenPageViews",
    "bounceRate",
    "averageSessionDuration",
];

/// GA4 client bound to one property.
#[derive(Clone)]
pub struct AnalyticsClient {
    inner: Arc<AnalyticsClientInner>,
}

struct AnalyticsClientInner {
    http: reqwest::Client,
    tokens: Arc<GoogleTokenProvider>,
    property_id: String,
}

impl AnalyticsClient {
    #[must_use]
    pub fn new(http: reqwest::Client, tokens: Arc<GoogleTokenProvider>, property_id: String) -> Self {
        Self {
            inner: Arc::new(AnalyticsClientInner {
                http,
                tokens,
                property_id,
            }),
        }
    }

    /// Execute one `runReport` request.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be obtained or the API call fails.
    #[instrument(skip(self, body), fields(property = %self.inner.property_id))]
    async fn run_report(&self, body: &Value) -> Result<RunReportResponse, VendorError> {
        let token = self.inner.tokens.access_token().await?;
        let url = format!("{DATA_API_URL}/{}:runReport", self.inner.property_id);

        let response = self
            .inner
            .http
            .post(url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let result = read_json("analytics", response).await;
        if let Err(VendorError::Api { status: 401, .. }) = &result {
            self.inner.tokens.invalidate().await;
        }
        result
    }
}

#[async_trait]
impl TrafficSource for AnalyticsClient {
    async fn traffic_report(&self) -> Result<TrafficReport, VendorError> {
        let snapshot = self.run_report(&snapshot_request()).await?;
        let pages = self.run_report(&top_pages_request()).await?;

        Ok(TrafficReport {
            snapshot: snapshot_from_report(&snapshot)?,
            top_pages: top_pages_from_report(&pages)?,
            generated_at: chrono::Utc::now(),
        })
    }
}

impl std::fmt::Debug for AnalyticsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnalyticsClient")
            .field("property_id", &self.inner.property_id)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Requests
// =============================================================================

/// Aggregate metrics for the two comparison periods.
///
/// Named date ranges make GA4 label each row with a `dateRange` dimension.
#[must_use]
pub fn snapshot_request() -> Value {
    json!({
        "dateRanges": [
            { "startDate": "7daysAgo", "endDate": "today", "name": CURRENT },
            { "startDate": "14daysAgo", "endDate": "8daysAgo", "name": PREVIOUS },
        ],
        "metrics": SNAPSHOT_METRICS.iter().map(|name| json!({ "name": name })).collect::<Vec<_>>(),
    })
}

/// Most viewed pages in the current period.
#[must_use]
pub fn top_pages_request() -> Value {
    json!({
        "dateRanges": [{ "startDate": "7daysAgo", "endDate": "today" }],
        "dimensions": [{ "name": "pagePath" }],
        "metrics": [{ "name": "screenPageViews" }, { "name": "activeUsers" }],
        "orderBys": [{ "metric": { "metricName": "screenPageViews" }, "desc": true }],
        "limit": TOP_PAGES_LIMIT,
    })
}

// =============================================================================
// Responses
// =============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReportResponse {
    #[serde(default)]
    rows: Vec<Row>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Row {
    #[serde(default)]
    dimension_values: Vec<Cell>,
    #[serde(default)]
    metric_values: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    #[serde(default)]
    value: String,
}

impl Row {
    fn dimension(&self, index: usize) -> Option<&str> {
        self.dimension_values.get(index).map(|c| c.value.as_str())
    }

    fn metric(&self, index: usize) -> Result<f64, VendorError> {
        let name = SNAPSHOT_METRICS.get(index).copied().unwrap_or("metric");
        self.metric_values
            .get(index)
            .map_or(Ok(0.0), |cell| parse_number(name, &cell.value))
    }
}

/// Build the comparison snapshot.
///
/// GA4 omits rows for periods without data; those count as zero.
///
/// # Errors
///
/// Returns an error if a metric value is not numeric.
pub fn snapshot_from_report(report: &RunReportResponse) -> Result<TrafficSnapshot, VendorError> {
    let period = |name: &str| -> Result<[f64; 5], VendorError> {
        let mut values = [0.0; 5];
        if let Some(row) = report.rows.iter().find(|r| r.dimension(0) == Some(name)) {
            for (index, value) in values.iter_mut().enumerate() {
                *value = row.metric(index)?;
            }
        }
        Ok(values)
    };

    let current = period(CURRENT)?;
    let previous = period(PREVIOUS)?;
    let change = |index: usize, scale: f64| {
        MetricChange::between(
            round_to(current[index] * scale, 1),
            round_to(previous[index] * scale, 1),
        )
    };

    Ok(TrafficSnapshot {
        active_users: change(0, 1.0),
        sessions: change(1, 1.0),
        page_views: change(2, 1.0),
        bounce_rate: change(3, 100.0),
        avg_session_duration: change(4, 1.0),
    })
}

/// Flatten the top pages report.
///
/// # Errors
///
/// Returns an error if a metric value is not numeric.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn top_pages_from_report(report: &RunReportResponse) -> Result<Vec<TopPage>, VendorError> {
    report
        .rows
        .iter()
        .map(|row| {
            let page_views = row
                .metric_values
                .first()
                .map_or(Ok(0.0), |c| parse_number("screenPageViews", &c.value))?;
            let active_users = row
                .metric_values
                .get(1)
                .map_or(Ok(0.0), |c| parse_number("activeUsers", &c.value))?;
            Ok(TopPage {
                path: row.dimension(0).unwrap_or("(not set)").to_string(),
                page_views: page_views.max(0.0) as u64,
                active_users: active_users.max(0.0) as u64,
            })
        })
        .collect()
}

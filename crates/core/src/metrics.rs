//! Vendor metric records returned by the reporting endpoints.
//!
//! These are flattened shapes built per request from Google Analytics,
//! Search Console and PageSpeed Insights payloads. They are never stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Percentage change from `previous` to `current`, rounded to one decimal.
///
/// A previous value of zero yields 100% when the current value is positive
/// and 0% otherwise.
///
/// ```
/// use siteflow_core::metrics::percent_change;
///
/// assert_eq!(percent_change(150.0, 100.0), 50.0);
/// assert_eq!(percent_change(5.0, 0.0), 100.0);
/// assert_eq!(percent_change(0.0, 0.0), 0.0);
/// ```
#[must_use]
pub fn percent_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return if current > 0.0 { 100.0 } else { 0.0 };
    }
    round_to(((current - previous) / previous) * 100.0, 1)
}

/// Round `value` to `decimals` places.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// A metric for the current period compared to the previous one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub current: f64,
    pub previous: f64,
    /// Percentage change, see [`percent_change`].
    pub change: f64,
}

impl MetricChange {
    #[must_use]
    pub fn between(current: f64, previous: f64) -> Self {
        Self {
            current,
            previous,
            change: percent_change(current, previous),
        }
    }
}

// =============================================================================
// Google Analytics
// =============================================================================

/// Site traffic over the last seven days compared to the seven before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficSnapshot {
    pub active_users: MetricChange,
    pub sessions: MetricChange,
    pub page_views: MetricChange,
    /// Bounce rate as a percentage (0-100).
    pub bounce_rate: MetricChange,
    /// Average session duration in seconds.
    pub avg_session_duration: MetricChange,
}

/// A page ranked by views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopPage {
    pub path: String,
    pub page_views: u64,
    pub active_users: u64,
}

/// Response of `GET /api/analytics/traffic`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrafficReport {
    pub snapshot: TrafficSnapshot,
    pub top_pages: Vec<TopPage>,
    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// Search Console
// =============================================================================

/// Search performance over the last 28 days compared to the 28 before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSnapshot {
    pub clicks: MetricChange,
    pub impressions: MetricChange,
    /// Click-through rate as a percentage (0-100).
    pub ctr: MetricChange,
    /// Average ranking position (lower is better).
    pub position: MetricChange,
}

/// A search query ranked by clicks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopQuery {
    pub query: String,
    pub clicks: u64,
    pub impressions: u64,
    pub ctr: f64,
    pub position: f64,
}

/// Response of `GET /api/search-console/summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub snapshot: SearchSnapshot,
    pub top_queries: Vec<TopQuery>,
    pub generated_at: DateTime<Utc>,
}

// =============================================================================
// PageSpeed Insights
// =============================================================================

/// Device profile PageSpeed Insights emulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Mobile,
    Desktop,
}

impl Strategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mobile => "mobile",
            Self::Desktop => "desktop",
        }
    }
}

/// Lighthouse category scores on a 0-100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedScores {
    pub performance: u8,
    pub accessibility: u8,
    pub best_practices: u8,
    pub seo: u8,
}

/// Lab values for the core web vitals, as Lighthouse displays them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoreWebVitals {
    pub first_contentful_paint: Option<String>,
    pub largest_contentful_paint: Option<String>,
    pub cumulative_layout_shift: Option<String>,
    pub total_blocking_time: Option<String>,
    pub speed_index: Option<String>,
}

/// Result for a single strategy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedResult {
    pub strategy: Strategy,
    pub scores: PageSpeedScores,
    pub vitals: CoreWebVitals,
}

/// Response of `GET /api/pagespeed`.
///
/// Both strategies are always present: the report is only produced when
/// the mobile and desktop runs both succeed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpeedReport {
    pub url: String,
    pub mobile: PageSpeedResult,
    pub desktop: PageSpeedResult,
    pub fetched_at: DateTime<Utc>,
}

//! AI fit-score result.

use serde::{Deserialize, Serialize};

/// Analysis returned when the AI call fails for any reason.
///
/// The caller always receives this canned answer together with a score of 0
/// instead of an error description. Operators see the real cause in the logs
/// and Sentry only.
pub const FALLBACK_ANALYSIS: &str = "Sorry, we couldn't analyse your request right now. \
Please try again in a few minutes or contact us directly and we'll take a look together.";

/// Highest possible fit score.
pub const MAX_FIT_SCORE: u8 = 100;

/// Outcome of `POST /api/assess-system-needs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FitAssessment {
    pub analysis: String,
    /// How well the prospect's problem fits the product, 0-100.
    pub fit_score: u8,
}

impl FitAssessment {
    /// Build an assessment, clamping the raw model score to 0-100.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn new(analysis: impl Into<String>, raw_score: f64) -> Self {
        let fit_score = if raw_score.is_finite() {
            raw_score.round().clamp(0.0, f64::from(MAX_FIT_SCORE)) as u8
        } else {
            0
        };
        Self {
            analysis: analysis.into(),
            fit_score,
        }
    }

    /// The canned response used when the AI call fails.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            analysis: FALLBACK_ANALYSIS.to_string(),
            fit_score: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_is_clamped() {
        assert_eq!(FitAssessment::new("", 142.0).fit_score, 100);
        assert_eq!(FitAssessment::new("", -8.0).fit_score, 0);
        assert_eq!(FitAssessment::new("", 72.6).fit_score, 73);
        assert_eq!(FitAssessment::new("", f64::NAN).fit_score, 0);
    }

    #[test]
    fn test_fallback() {
        let fallback = FitAssessment::fallback();
        assert_eq!(fallback.fit_score, 0);
        assert_eq!(fallback.analysis, FALLBACK_ANALYSIS);
    }

    #[test]
    fn test_wire_format() {
        let json = serde_json::to_value(FitAssessment::new("Good fit", 80.0)).unwrap_or_default();
        assert_eq!(json["analysis"], "Good fit");
        assert_eq!(json["fitScore"], 80);
    }
}

//! AI fit-score endpoint.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use tracing::instrument;

use siteflow_core::FitAssessment;

use crate::state::AppState;

/// Error message for a missing or malformed `userProblem`.
pub const INVALID_PROBLEM: &str = "userProblem is required and must be a string";

/// Pull `userProblem` out of a raw request body.
///
/// Returns `None` unless the body is a JSON object whose `userProblem` is a
/// non-blank string.
#[must_use]
pub fn extract_problem(body: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(body).ok()?;
    let problem = value.as_object()?.get("userProblem")?.as_str()?.trim();
    (!problem.is_empty()).then(|| problem.to_string())
}

/// `POST /api/assess-system-needs`
///
/// Any failure of the AI call is masked: the caller gets the canned
/// fallback with a score of 0 and a 500 status, while the cause goes to
/// the logs and Sentry.
#[instrument(skip(state, body), fields(problem_len = tracing::field::Empty))]
pub async fn assess_system_needs(State(state): State<AppState>, body: Bytes) -> Response {
    let Some(problem) = extract_problem(&body) else {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": INVALID_PROBLEM }))).into_response();
    };
    tracing::Span::current().record("problem_len", problem.len());

    match state.assessor().assess(&problem).await {
        Ok(assessment) => {
            tracing::info!(fit_score = assessment.fit_score, "Assessment completed");
            Json(assessment).into_response()
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(
                error = %e,
                sentry_event_id = %event_id,
                "Fit assessment failed, returning fallback"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, Json(FitAssessment::fallback())).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_problem() {
        assert_eq!(
            extract_problem(br#"{"userProblem": " We track projects in spreadsheets "}"#).as_deref(),
            Some("We track projects in spreadsheets")
        );
    }

    #[test]
    fn test_extract_problem_rejects_bad_input() {
        for body in [
            &b""[..],
            b"not json",
            b"[]",
            b"{}",
            br#"{"userProblem": 42}"#,
            br#"{"userProblem": null}"#,
            br#"{"userProblem": ["a"]}"#,
            br#"{"userProblem": "   "}"#,
            br#"{"problem": "wrong key"}"#,
        ] {
            assert_eq!(extract_problem(body), None, "{}", String::from_utf8_lossy(body));
        }
    }
}

//! Fit-assessment prompt and parsing of the model's answer.

use serde::Deserialize;

use siteflow_core::FitAssessment;

use crate::vendors::VendorError;

/// System instruction sent with every assessment.
pub const SYSTEM_PROMPT: &str = r#"You are a solutions consultant for Siteflow.

Siteflow designs and builds custom web platforms for growing businesses:
marketing sites, client portals, internal dashboards, booking and ticketing
flows, and integrations with the tools a company already uses (CRMs,
analytics, payment providers, spreadsheets). Projects are delivered by a small
senior team with a fixed scope, a shared project board and ongoing support.

Siteflow is a poor fit for: native mobile apps, hardware or embedded work,
games, one-off data entry, and staffing requests.

A prospect will describe a problem in their own words. Respond with JSON only,
in this exact shape:

{"analysis": "<2-4 sentences addressed to the prospect explaining how Siteflow would approach the problem, or why it is not a good fit>", "fitScore": <integer 0-100>}

Score 80-100 when a custom web platform is clearly the answer, 40-79 when it
would help with part of the problem, and 0-39 when the request is outside what
Siteflow builds. Never include markdown or text outside the JSON object."#;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAssessment {
    analysis: String,
    #[serde(alias = "fit_score", alias = "score")]
    fit_score: f64,
}

/// Parse the model's text into a [`FitAssessment`].
///
/// Tolerates markdown code fences and prose around the JSON object.
///
/// # Errors
///
/// Returns [`VendorError::Parse`] when no well-formed object is found or the
/// analysis is empty.
pub fn parse_assessment(text: &str) -> Result<FitAssessment, VendorError> {
    let json = extract_object(text)
        .ok_or_else(|| VendorError::Parse("gemini: no JSON object in response".to_string()))?;

    let raw: RawAssessment = serde_json::from_str(json)
        .map_err(|e| VendorError::Parse(format!("gemini: malformed assessment: {e}")))?;

    let analysis = raw.analysis.trim();
    if analysis.is_empty() {
        return Err(VendorError::Parse("gemini: empty analysis".to_string()));
    }

    Ok(FitAssessment::new(analysis, raw.fit_score))
}

/// Slice from the first `{` to the last `}`.
fn extract_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let result =
            parse_assessment(r#"{"analysis": "A client portal fits well.", "fitScore": 86}"#)
                .unwrap();
        assert_eq!(result.analysis, "A client portal fits well.");
        assert_eq!(result.fit_score, 86);
    }

    #[test]
    fn test_parse_fenced_json() {
        let text = "```json\n{\"analysis\": \"Partly.\", \"fitScore\": 55.4}\n```";
        let result = parse_assessment(text).unwrap();
        assert_eq!(result.fit_score, 55);
    }

    #[test]
    fn test_score_out_of_range_is_clamped() {
        let result = parse_assessment(r#"{"analysis": "Yes.", "fitScore": 140}"#).unwrap();
        assert_eq!(result.fit_score, 100);
    }

    #[test]
    fn test_snake_case_score_accepted() {
        let result = parse_assessment(r#"{"analysis": "Yes.", "fit_score": 70}"#).unwrap();
        assert_eq!(result.fit_score, 70);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(parse_assessment("I cannot help with that.").is_err());
        assert!(parse_assessment(r#"{"analysis": "no score"}"#).is_err());
        assert!(parse_assessment(r#"{"analysis": "  ", "fitScore": 10}"#).is_err());
    }
}

//! Gemini API client for the fit assessment.
//!
//! One `generateContent` call per assessment with JSON output requested.
//! The model's text is parsed into a [`FitAssessment`](siteflow_core::FitAssessment).

mod prompt;
mod types;

pub use prompt::{SYSTEM_PROMPT, parse_assessment};
pub use types::{GenerateRequest, GenerateResponse};

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use tracing::instrument;

use siteflow_core::FitAssessment;

use crate::config::GeminiConfig;

use super::{FitAssessor, VendorError, read_json};
use types::{Content, GenerationConfig};

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const MAX_OUTPUT_TOKENS: u32 = 1024;
const TEMPERATURE: f32 = 0.2;

/// Gemini API client.
#[derive(Clone)]
pub struct GeminiClient {
    inner: Arc<GeminiClientInner>,
}

struct GeminiClientInner {
    client: reqwest::Client,
    model: String,
}

impl GeminiClient {
    /// Create a new Gemini client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key contains invalid header characters or
    /// the HTTP client cannot be built.
    pub fn new(config: &GeminiConfig, timeout: Duration) -> Result<Self, VendorError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut key = HeaderValue::from_str(config.api_key.expose_secret())
            .map_err(|_| VendorError::Credentials("GEMINI_API_KEY is not a valid header value".into()))?;
        key.set_sensitive(true);
        headers.insert("x-goog-api-key", key);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(GeminiClientInner {
                client,
                model: config.model.clone(),
            }),
        })
    }

    fn endpoint(&self) -> String {
        format!("{GEMINI_API_URL}/{}:generateContent", self.inner.model)
    }

    /// Send the prompt and return the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or Gemini answers with an error.
    #[instrument(skip(self, problem), fields(model = %self.inner.model))]
    pub async fn generate(&self, problem: &str) -> Result<GenerateResponse, VendorError> {
        let request = GenerateRequest {
            system_instruction: Content::system(SYSTEM_PROMPT),
            contents: vec![Content::user(problem)],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let response = self
            .inner
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await?;

        read_json("gemini", response).await
    }
}

#[async_trait]
impl FitAssessor for GeminiClient {
    async fn assess(&self, problem: &str) -> Result<FitAssessment, VendorError> {
        let response = self.generate(problem).await?;

        if let Some(reason) = response.block_reason() {
            return Err(VendorError::Parse(format!("gemini: prompt blocked ({reason})")));
        }

        let text = response
            .text()
            .ok_or_else(|| VendorError::Parse("gemini: response has no text".to_string()))?;

        parse_assessment(&text)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_endpoint_includes_model() {
        let config = GeminiConfig {
            api_key: SecretString::from("test-key"),
            model: "gemini-1.5-flash".to_string(),
        };
        let client = GeminiClient::new(&config, Duration::from_secs(5)).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_rejects_unprintable_key() {
        let config = GeminiConfig {
            api_key: SecretString::from("bad\nkey"),
            model: "gemini-1.5-flash".to_string(),
        };
        assert!(matches!(
            GeminiClient::new(&config, Duration::from_secs(5)),
            Err(VendorError::Credentials(_))
        ));
    }
}

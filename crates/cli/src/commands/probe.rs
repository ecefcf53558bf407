//! One-off vendor calls from the terminal.

use siteflow_gateway::config::{ConfigError, GatewayConfig};
use siteflow_gateway::routes::reports::validate_target;
use siteflow_gateway::vendors::{VendorError, Vendors};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Vendor(#[from] VendorError),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("failed to format output: {0}")]
    Output(#[from] serde_json::Error),
}

fn vendors() -> Result<Vendors, ProbeError> {
    let config = GatewayConfig::from_env()?;
    Ok(Vendors::from_config(&config)?)
}

/// Run PageSpeed for `url` on mobile and desktop.
///
/// # Errors
///
/// Returns an error if the URL is rejected the same way the HTTP route
/// rejects it, or if either run fails.
pub async fn pagespeed(url: &str) -> Result<(), ProbeError> {
    let url = validate_target(Some(url)).map_err(|e| ProbeError::InvalidUrl(e.public_message()))?;

    let report = vendors()?.pagespeed.report(url.as_str()).await?;
    for result in [&report.mobile, &report.desktop] {
        let scores = result.scores;
        tracing::info!(
            "{:<8} performance {:>3}  accessibility {:>3}  best practices {:>3}  seo {:>3}",
            result.strategy.as_str(),
            scores.performance,
            scores.accessibility,
            scores.best_practices,
            scores.seo
        );
    }
    tracing::info!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Score `problem` with the configured AI assessor.
///
/// Unlike the HTTP endpoint, failures are reported as errors rather than
/// replaced by the fallback answer.
///
/// # Errors
///
/// Returns an error if the assessor is not configured or the call fails.
pub async fn assess(problem: &str) -> Result<(), ProbeError> {
    let problem = problem.trim();
    if problem.is_empty() {
        return Err(ProbeError::InvalidInput("problem must not be empty"));
    }

    let assessment = vendors()?.assessor.assess(problem).await?;
    tracing::info!("Fit score: {}/100", assessment.fit_score);
    tracing::info!("{}", assessment.analysis);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pagespeed_rejects_urls_the_route_rejects() {
        for url in ["", "siteflow.dev", "https://", "ftp://siteflow.dev", "javascript:alert(1)"] {
            let result = pagespeed(url).await;
            assert!(matches!(result, Err(ProbeError::InvalidUrl(_))), "{url:?}");
        }
    }

    #[tokio::test]
    async fn test_assess_rejects_blank_problem() {
        assert!(matches!(assess("   ").await, Err(ProbeError::InvalidInput(_))));
    }
}

//! Configuration check.
//!
//! Loads the gateway configuration exactly as the server does and reports
//! what is enabled. Secrets are never printed.

use siteflow_gateway::config::{ConfigError, GatewayConfig};

/// Load the configuration and log a summary.
///
/// # Errors
///
/// Returns an error if a variable is missing or malformed.
pub fn check() -> Result<(), ConfigError> {
    let config = GatewayConfig::from_env()?;

    tracing::info!("Listening address: {}", config.socket_addr());
    tracing::info!("Base URL: {}", config.base_url);
    tracing::info!("Auth service: {}", config.auth_service_url);
    tracing::info!("Vendor timeout: {:?}", config.vendor_timeout);
    tracing::info!("Session capacity: {}", config.max_sessions);
    tracing::info!("Sentry: {}", if config.sentry_dsn.is_some() { "enabled" } else { "disabled" });

    let enabled = config.enabled_integrations();
    for integration in ["gemini", "analytics", "search_console", "pagespeed"] {
        let status = if enabled.contains(&integration) { "enabled" } else { "not configured" };
        tracing::info!("  {integration}: {status}");
    }

    for warning in config.secret_warnings() {
        tracing::warn!("{warning}");
    }

    Ok(())
}

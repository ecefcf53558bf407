//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::GatewayConfig;
use crate::services::{AuthError, AuthProvider, ExternalAuthService};
use crate::vendors::{
    FitAssessor, PageSpeedSource, SearchSource, TrafficSource, VendorError, Vendors,
};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("vendor setup failed: {0}")]
    Vendor(#[from] VendorError),
    #[error("auth service setup failed: {0}")]
    Auth(#[from] AuthError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. Holds the configuration and the adapters
/// behind their traits so tests can swap in stubs.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: GatewayConfig,
    vendors: Vendors,
    auth: Arc<dyn AuthProvider>,
}

impl AppState {
    /// Create the application state with the real adapters.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built or the auth service
    /// URL is unusable.
    pub fn new(config: GatewayConfig) -> Result<Self, StateError> {
        let vendors = Vendors::from_config(&config)?;
        let http = crate::vendors::build_http_client(config.vendor_timeout)?;
        let auth = Arc::new(ExternalAuthService::new(http, &config.auth_service_url)?);
        Ok(Self::with_providers(config, vendors, auth))
    }

    /// Create the application state from explicit adapters.
    #[must_use]
    pub fn with_providers(
        config: GatewayConfig,
        vendors: Vendors,
        auth: Arc<dyn AuthProvider>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                vendors,
                auth,
            }),
        }
    }

    /// Get a reference to the gateway configuration.
    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn assessor(&self) -> &dyn FitAssessor {
        self.inner.vendors.assessor.as_ref()
    }

    #[must_use]
    pub fn traffic(&self) -> &dyn TrafficSource {
        self.inner.vendors.traffic.as_ref()
    }

    #[must_use]
    pub fn search(&self) -> &dyn SearchSource {
        self.inner.vendors.search.as_ref()
    }

    #[must_use]
    pub fn pagespeed(&self) -> &dyn PageSpeedSource {
        self.inner.vendors.pagespeed.as_ref()
    }

    /// Get a reference to the auth provider.
    #[must_use]
    pub fn auth(&self) -> &dyn AuthProvider {
        self.inner.auth.as_ref()
    }
}

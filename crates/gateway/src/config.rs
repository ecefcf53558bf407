//! Gateway configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional. Vendor integrations whose credentials are
//! missing stay disabled and their endpoints answer with a generic 500.
//!
//! ## Server
//! - `HOST` - Bind address (default: 127.0.0.1)
//! - `PORT` - Listen port (default: 3001)
//! - `BASE_URL` - Public URL of the gateway (default: `http://localhost:{PORT}`)
//! - `AUTH_SERVICE_URL` - External auth service (default: `http://localhost:4000`)
//! - `VENDOR_TIMEOUT_SECS` - Timeout for outbound vendor calls (default: 30)
//! - `LOG_FORMAT` - `json` for structured logs, anything else for text
//!
//! ## AI fit scoring
//! - `GEMINI_API_KEY` - Google Generative Language API key
//! - `GEMINI_MODEL` - Model ID (default: gemini-1.5-flash)
//!
//! ## Google reporting
//! - `GOOGLE_SERVICE_ACCOUNT_EMAIL` - Service account client email
//! - `GOOGLE_PRIVATE_KEY` - Service account PEM private key (`\n` escapes allowed)
//! - `GA4_PROPERTY_ID` - Google Analytics 4 property ID
//! - `GSC_SITE_URL` - Search Console property (e.g. `sc-domain:siteflow.dev`)
//! - `PAGESPEED_API_KEY` - PageSpeed Insights API key (raises quota)
//!
//! ## Error tracking
//! - `SENTRY_DSN`, `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_AUTH_SERVICE_URL: &str = "http://localhost:4000";
const DEFAULT_VENDOR_TIMEOUT_SECS: u64 = 30;
const DEFAULT_MAX_SESSIONS: u64 = 100_000;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the gateway
    pub base_url: String,
    /// Base URL of the external auth service
    pub auth_service_url: Url,
    /// Timeout applied to every outbound vendor request
    pub vendor_timeout: Duration,
    /// Upper bound on in-memory session records
    pub max_sessions: u64,
    /// Gemini configuration (AI fit scoring)
    pub gemini: Option<GeminiConfig>,
    /// Google reporting configuration
    pub google: GoogleConfig,
    /// Emit JSON logs instead of text
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Gemini API configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GeminiConfig {
    /// Generative Language API key
    pub api_key: SecretString,
    /// Model ID (e.g., gemini-1.5-flash)
    pub model: String,
}

impl std::fmt::Debug for GeminiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiConfig")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

/// Google service account credentials.
///
/// Implements `Debug` manually to redact the private key.
#[derive(Clone)]
pub struct ServiceAccount {
    /// Service account client email (JWT issuer)
    pub client_email: String,
    /// PEM-encoded RSA private key
    pub private_key: SecretString,
}

impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

/// Google reporting configuration.
///
/// Every part is optional: each adapter checks for the values it needs when
/// it is called.
#[derive(Clone, Default)]
pub struct GoogleConfig {
    /// Service account used for Analytics and Search Console
    pub service_account: Option<ServiceAccount>,
    /// GA4 property ID
    pub analytics_property_id: Option<String>,
    /// Search Console site URL
    pub search_console_site_url: Option<String>,
    /// PageSpeed Insights API key
    pub pagespeed_api_key: Option<SecretString>,
}

impl std::fmt::Debug for GoogleConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleConfig")
            .field("service_account", &self.service_account)
            .field("analytics_property_id", &self.analytics_property_id)
            .field("search_console_site_url", &self.search_console_site_url)
            .field(
                "pagespeed_api_key",
                &self.pagespeed_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from a key/value map.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);

        let host = env
            .or_default("HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("HOST".to_string(), e.to_string()))?;
        let port = env
            .or_default("PORT", "3001")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORT".to_string(), e.to_string()))?;
        let base_url = env
            .optional("BASE_URL")
            .unwrap_or_else(|| format!("http://localhost:{port}"));
        let auth_service_url = Url::parse(&env.or_default("AUTH_SERVICE_URL", DEFAULT_AUTH_SERVICE_URL))
            .map_err(|e| ConfigError::InvalidEnvVar("AUTH_SERVICE_URL".to_string(), e.to_string()))?;
        let vendor_timeout = env
            .optional("VENDOR_TIMEOUT_SECS")
            .map(|s| {
                s.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("VENDOR_TIMEOUT_SECS".to_string(), e.to_string())
                })
            })
            .transpose()?
            .map_or(Duration::from_secs(DEFAULT_VENDOR_TIMEOUT_SECS), Duration::from_secs);

        let max_sessions = env
            .optional("SESSION_MAX_ENTRIES")
            .map(|s| {
                s.parse::<u64>().map_err(|e| {
                    ConfigError::InvalidEnvVar("SESSION_MAX_ENTRIES".to_string(), e.to_string())
                })
            })
            .transpose()?
            .unwrap_or(DEFAULT_MAX_SESSIONS);

        let gemini = GeminiConfig::from_env(&env);
        let google = GoogleConfig::from_env(&env)?;

        let log_json = env
            .optional("LOG_FORMAT")
            .is_some_and(|format| format.eq_ignore_ascii_case("json"));
        let sentry_dsn = env.optional("SENTRY_DSN");
        let sentry_environment = env.optional("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = env
            .optional("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = env
            .optional("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            base_url,
            auth_service_url,
            vendor_timeout,
            max_sessions,
            gemini,
            google,
            log_json,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }

    /// Weak or placeholder-looking API keys.
    ///
    /// These do not stop startup; the binary logs them once tracing is up.
    #[must_use]
    pub fn secret_warnings(&self) -> Vec<ConfigError> {
        let gemini = self
            .gemini
            .as_ref()
            .map(|gemini| ("GEMINI_API_KEY", &gemini.api_key));
        let pagespeed = self
            .google
            .pagespeed_api_key
            .as_ref()
            .map(|key| ("PAGESPEED_API_KEY", key));

        gemini
            .into_iter()
            .chain(pagespeed)
            .filter_map(|(name, key)| validate_secret_strength(key.expose_secret(), name).err())
            .collect()
    }

    /// Names of the integrations that are configured, for startup logging.
    #[must_use]
    pub fn enabled_integrations(&self) -> Vec<&'static str> {
        let mut enabled = Vec::new();
        if self.gemini.is_some() {
            enabled.push("gemini");
        }
        if self.google.service_account.is_some() && self.google.analytics_property_id.is_some() {
            enabled.push("analytics");
        }
        if self.google.service_account.is_some() && self.google.search_console_site_url.is_some()
        {
            enabled.push("search_console");
        }
        // PageSpeed works without a key, only with a lower quota
        enabled.push("pagespeed");
        enabled
    }
}

impl GeminiConfig {
    /// Returns `None` if `GEMINI_API_KEY` is not set (fit scoring falls back).
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Option<Self> {
        env.optional("GEMINI_API_KEY").map(|key| Self {
            api_key: SecretString::from(key),
            model: env.or_default("GEMINI_MODEL", DEFAULT_GEMINI_MODEL),
        })
    }
}

impl GoogleConfig {
    fn from_env<F: Fn(&str) -> Option<String>>(env: &Env<F>) -> Result<Self, ConfigError> {
        let email = env.optional("GOOGLE_SERVICE_ACCOUNT_EMAIL");
        let key = env.optional("GOOGLE_PRIVATE_KEY");

        let service_account = match (email, key) {
            (Some(client_email), Some(raw_key)) => {
                let private_key = normalize_private_key(&raw_key);
                if !private_key.contains("PRIVATE KEY-----") {
                    return Err(ConfigError::InvalidEnvVar(
                        "GOOGLE_PRIVATE_KEY".to_string(),
                        "expected a PEM encoded private key".to_string(),
                    ));
                }
                Some(ServiceAccount {
                    client_email,
                    private_key: SecretString::from(private_key),
                })
            }
            (None, None) => None,
            _ => {
                return Err(ConfigError::InvalidEnvVar(
                    "GOOGLE_*".to_string(),
                    "Both GOOGLE_SERVICE_ACCOUNT_EMAIL and GOOGLE_PRIVATE_KEY must be set together"
                        .to_string(),
                ));
            }
        };

        let pagespeed_api_key = env.optional("PAGESPEED_API_KEY").map(SecretString::from);

        Ok(Self {
            service_account,
            analytics_property_id: env.optional("GA4_PROPERTY_ID"),
            search_console_site_url: env.optional("GSC_SITE_URL"),
            pagespeed_api_key,
        })
    }
}

impl ServiceAccount {
    /// PEM bytes for signing.
    #[must_use]
    pub fn private_key_pem(&self) -> &[u8] {
        self.private_key.expose_secret().as_bytes()
    }
}

// =============================================================================
// Helpers
// =============================================================================

/// Variable lookup that treats empty values as unset.
struct Env<F>(F);

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn or_default(&self, key: &str, default: &str) -> String {
        self.optional(key).unwrap_or_else(|| default.to_string())
    }
}

/// Private keys pasted into env files usually carry literal `\n` sequences.
fn normalize_private_key(raw: &str) -> String {
    raw.trim_matches('"').replace("\\n", "\n")
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)]
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

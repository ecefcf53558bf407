//! Integration tests for the Siteflow gateway.
//!
//! The full router is driven in-process with `tower::ServiceExt::oneshot`.
//! Vendor adapters and the auth service are replaced by the stubs below, so
//! no network access or credentials are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p siteflow-integration-tests
//! ```

#![allow(clippy::missing_panics_doc, clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use siteflow_core::metrics::{
    CoreWebVitals, MetricChange, PageSpeedResult, PageSpeedScores, SearchReport, SearchSnapshot,
    Strategy, TopPage, TopQuery, TrafficReport, TrafficSnapshot,
};
use siteflow_core::{Email, FitAssessment, Role, User, UserId};
use siteflow_gateway::config::GatewayConfig;
use siteflow_gateway::routes;
use siteflow_gateway::services::{AuthError, AuthProvider, AuthSession};
use siteflow_gateway::state::AppState;
use siteflow_gateway::vendors::{
    FitAssessor, PageSpeedSource, SearchSource, TrafficSource, VendorError, Vendors,
};

/// Password accepted by [`StubAuth`] for every account.
pub const PASSWORD: &str = "correct horse battery staple";

// =============================================================================
// Stub adapters
// =============================================================================

/// Fit assessor returning a fixed answer, or failing when `answer` is `None`.
pub struct StubAssessor {
    pub answer: Option<FitAssessment>,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl FitAssessor for StubAssessor {
    async fn assess(&self, _problem: &str) -> Result<FitAssessment, VendorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.answer.clone().ok_or(VendorError::Api {
            vendor: "gemini",
            status: 503,
            message: "model overloaded".to_string(),
        })
    }
}

/// Traffic source with canned numbers.
pub struct StubTraffic;

#[async_trait]
impl TrafficSource for StubTraffic {
    async fn traffic_report(&self) -> Result<TrafficReport, VendorError> {
        Ok(TrafficReport {
            snapshot: TrafficSnapshot {
                active_users: MetricChange::between(150.0, 100.0),
                sessions: MetricChange::between(210.0, 200.0),
                page_views: MetricChange::between(640.0, 0.0),
                bounce_rate: MetricChange::between(42.1, 50.0),
                avg_session_duration: MetricChange::between(93.3, 80.0),
            },
            top_pages: vec![TopPage {
                path: "/".to_string(),
                page_views: 420,
                active_users: 300,
            }],
            generated_at: chrono::Utc::now(),
        })
    }
}

/// Search source with canned numbers.
pub struct StubSearch;

#[async_trait]
impl SearchSource for StubSearch {
    async fn search_report(&self) -> Result<SearchReport, VendorError> {
        Ok(SearchReport {
            snapshot: SearchSnapshot {
                clicks: MetricChange::between(120.0, 80.0),
                impressions: MetricChange::between(4000.0, 4000.0),
                ctr: MetricChange::between(3.0, 2.0),
                position: MetricChange::between(12.3, 14.0),
            },
            top_queries: vec![TopQuery {
                query: "siteflow pricing".to_string(),
                clicks: 31,
                impressions: 210,
                ctr: 14.76,
                position: 2.4,
            }],
            generated_at: chrono::Utc::now(),
        })
    }
}

/// PageSpeed source that can be told to fail one strategy.
pub struct StubPageSpeed {
    pub fail_on: Option<Strategy>,
}

#[async_trait]
impl PageSpeedSource for StubPageSpeed {
    async fn run(&self, _url: &str, strategy: Strategy) -> Result<PageSpeedResult, VendorError> {
        if self.fail_on == Some(strategy) {
            return Err(VendorError::Api {
                vendor: "pagespeed",
                status: 500,
                message: "Lighthouse returned error: NO_FCP".to_string(),
            });
        }
        let performance = match strategy {
            Strategy::Mobile => 71,
            Strategy::Desktop => 94,
        };
        Ok(PageSpeedResult {
            strategy,
            scores: PageSpeedScores {
                performance,
                accessibility: 100,
                best_practices: 96,
                seo: 92,
            },
            vitals: CoreWebVitals {
                largest_contentful_paint: Some("2.4 s".to_string()),
                ..CoreWebVitals::default()
            },
        })
    }
}

/// Auth provider with one account per role.
pub struct StubAuth {
    users: HashMap<String, User>,
}

impl StubAuth {
    #[must_use]
    pub fn new() -> Self {
        let accounts = [
            (1, "Alex Admin", "admin@siteflow.dev", Role::Admin),
            (2, "Kim Park", "kam@siteflow.dev", Role::Kam),
            (3, "Priya Lane", "pl@siteflow.dev", Role::Pl),
            (4, "Dev Ortiz", "dev@siteflow.dev", Role::Developer),
            (5, "Casey Jones", "casey@client.com", Role::Customer),
            (6, "Ghost", "ghost@siteflow.dev", Role::Unknown),
        ];
        let users = accounts
            .into_iter()
            .map(|(id, name, email, role)| {
                let user = User {
                    id: UserId::new(id),
                    name: name.to_string(),
                    email: Email::parse(email).unwrap(),
                    role,
                    avatar: None,
                };
                (email.to_string(), user)
            })
            .collect();
        Self { users }
    }
}

impl Default for StubAuth {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for StubAuth {
    async fn login(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError> {
        if email.domain() == "down.example" {
            return Err(AuthError::Upstream {
                status: 503,
                message: "maintenance".to_string(),
            });
        }
        match self.users.get(email.as_str()) {
            Some(user) if password == PASSWORD => Ok(AuthSession {
                token: format!("token-{}", user.id),
                user: user.clone(),
            }),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}

// =============================================================================
// Test context
// =============================================================================

/// Knobs for building a [`TestContext`].
#[derive(Default)]
pub struct TestOptions {
    /// `None` makes the assessor fail.
    pub assessment: Option<FitAssessment>,
    pub pagespeed_fail_on: Option<Strategy>,
}

/// The gateway router wired to stub adapters.
pub struct TestContext {
    pub app: Router,
    pub assess_calls: Arc<AtomicUsize>,
}

impl TestContext {
    /// Context whose assessor answers with a fit score of 82.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(TestOptions {
            assessment: Some(FitAssessment::new(
                "A client portal with integrated ticketing fits well.",
                82.0,
            )),
            ..TestOptions::default()
        })
    }

    #[must_use]
    pub fn with_options(options: TestOptions) -> Self {
        let config = GatewayConfig::from_map(&HashMap::new()).unwrap();
        let assess_calls = Arc::new(AtomicUsize::new(0));

        let vendors = Vendors {
            assessor: Arc::new(StubAssessor {
                answer: options.assessment,
                calls: Arc::clone(&assess_calls),
            }),
            traffic: Arc::new(StubTraffic),
            search: Arc::new(StubSearch),
            pagespeed: Arc::new(StubPageSpeed {
                fail_on: options.pagespeed_fail_on,
            }),
        };

        let state = AppState::with_providers(config, vendors, Arc::new(StubAuth::new()));

        Self {
            app: routes::app(state),
            assess_calls,
        }
    }

    /// Send a request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// `GET path`, optionally with a session cookie.
    pub async fn get(&self, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::get(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// `method path` with a JSON body.
    pub async fn json(
        &self,
        method: &str,
        path: &str,
        body: &Value,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap())
            .await
    }

    /// `method path` without a body.
    pub async fn empty(&self, method: &str, path: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    /// Submit the login form.
    pub async fn post_login(&self, email: &str, password: &str) -> Response<Body> {
        let form = format!(
            "email={}&password={}",
            email.replace('@', "%40"),
            password.replace(' ', "+")
        );
        let request = Request::post("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(form))
            .unwrap();
        self.send(request).await
    }

    /// Log in and return the session cookie (`name=value`).
    pub async fn login(&self, email: &str) -> String {
        let response = self.post_login(email, PASSWORD).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "login failed for {email}");
        session_cookie(&response).expect("login did not set a session cookie")
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The `name=value` part of the session `Set-Cookie` header.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("siteflow_session="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

/// Read a response body as JSON.
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Read a response body as text.
pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Where a redirect points.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

//! HTTP route handlers for the gateway.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                               - Landing page
//! GET  /health                         - Health check
//!
//! # Auth
//! GET  /login                          - Login page
//! POST /login                          - Relay credentials to the auth service
//! POST /logout                         - Clear the session
//!
//! # Dashboard (requires login)
//! GET  /dashboard                      - Overview
//! GET  /dashboard/{page}               - Page from the navigation catalog
//!
//! # API
//! POST /api/assess-system-needs        - AI fit score (public)
//! GET  /api/analytics/traffic          - GA4 traffic (staff)
//! GET  /api/search-console/summary     - Search Console summary (staff)
//! GET  /api/pagespeed?url=             - PageSpeed mobile + desktop (staff)
//! GET  /api/navigation                 - Visible navigation entries
//! GET  /api/command-palette?q=         - Palette search
//! GET  /api/notifications              - Notification list
//! POST /api/notifications/read-all     - Mark all read
//! POST /api/notifications/{id}/read    - Mark one read
//! DELETE /api/notifications/{id}       - Dismiss
//! POST /api/preferences/sidebar        - Sidebar collapsed flag
//! POST /api/preferences/theme          - Set theme
//! POST /api/preferences/theme/toggle   - Toggle theme
//! ```

pub mod assess;
pub mod auth;
pub mod dashboard;
pub mod home;
pub mod notifications;
pub mod palette;
pub mod preferences;
pub mod reports;

use axum::{
    Router, middleware as axum_middleware,
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::middleware::{create_session_layer, request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Directory served under `/static`.
const STATIC_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/static");

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/assess-system-needs", post(assess::assess_system_needs))
        .route("/analytics/traffic", get(reports::traffic))
        .route("/search-console/summary", get(reports::search_summary))
        .route("/pagespeed", get(reports::pagespeed))
        .route("/navigation", get(palette::navigation))
        .route("/command-palette", get(palette::command_palette))
        .route("/notifications", get(notifications::list))
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", post(notifications::mark_read))
        .route("/notifications/{id}", axum::routing::delete(notifications::dismiss))
        .route("/preferences/sidebar", post(preferences::set_sidebar))
        .route("/preferences/theme", post(preferences::set_theme))
        .route("/preferences/theme/toggle", post(preferences::toggle_theme))
}

/// Create the dashboard routes router.
pub fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        .route("/{page}", get(dashboard::page))
}

/// Create all routes for the gateway.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(home::health))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        .nest("/dashboard", dashboard_routes())
        .nest("/api", api_routes())
}

/// The complete application with sessions and the inner middleware.
///
/// Tracing and Sentry layers are added by the binary.
pub fn app(state: AppState) -> Router {
    let session_layer = create_session_layer(state.config());

    Router::new()
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(session_layer)
        .layer(axum_middleware::from_fn(security_headers_middleware))
        .layer(axum_middleware::from_fn(request_id_middleware))
        .with_state(state)
}

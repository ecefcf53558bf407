//! Authentication extractors.
//!
//! The logged-in user is read from the session on every request. HTML
//! routes redirect anonymous visitors to the login page, `/api/` routes
//! answer 401.

use axum::{
    extract::{FromRequestParts, OriginalUri},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use siteflow_core::User;

use crate::error::AppError;
use crate::models::session;

/// Extractor that requires a logged-in user.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.name)
/// }
/// ```
pub struct RequireUser(pub User);

/// Extractor that requires a logged-in staff member.
///
/// Customers and users with an unrecognised role get 403.
pub struct RequireStaff(pub User);

/// Extractor that optionally gets the current user.
pub struct OptionalUser(pub Option<User>);

/// Rejection for the auth extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
    /// Logged in but not allowed.
    Forbidden,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => {
                AppError::Unauthorized("Authentication required".to_string()).into_response()
            }
            Self::Forbidden => {
                AppError::Forbidden("You do not have access to this resource".to_string())
                    .into_response()
            }
        }
    }
}

async fn session_user(parts: &Parts) -> Option<User> {
    let session = parts.extensions.get::<Session>()?;
    session::current_user(session).await.ok().flatten()
}

/// Nested routers see the path with their prefix stripped, so the API
/// check has to look at the URI the client sent.
fn anonymous_rejection(parts: &Parts) -> AuthRejection {
    let path = parts
        .extensions
        .get::<OriginalUri>()
        .map_or_else(|| parts.uri.path(), |original| original.0.path());

    if path.starts_with("/api/") {
        AuthRejection::Unauthorized
    } else {
        AuthRejection::RedirectToLogin
    }
}

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match session_user(parts).await {
            Some(user) => Ok(Self(user)),
            None => Err(anonymous_rejection(parts)),
        }
    }
}

impl<S> FromRequestParts<S> for RequireStaff
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = session_user(parts)
            .await
            .ok_or_else(|| anonymous_rejection(parts))?;

        if !user.role.is_staff() {
            tracing::warn!(user_id = %user.id, role = user.role.as_str(), "Staff route denied");
            return Err(AuthRejection::Forbidden);
        }

        Ok(Self(user))
    }
}

impl<S> FromRequestParts<S> for OptionalUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self(session_user(parts).await))
    }
}

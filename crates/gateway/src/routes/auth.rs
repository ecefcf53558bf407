//! Login and logout.
//!
//! Credentials are relayed to the auth service. On success the returned
//! token and user are stored in the session and a welcome notification is
//! queued.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use siteflow_core::Severity;

use crate::error::{Result, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::session;
use crate::services::AuthError;
use crate::services::auth::validate_credentials;
use crate::state::AppState;

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
}

impl LoginTemplate {
    fn with_error(email: &str, error: &str) -> Self {
        Self {
            error: Some(error.to_string()),
            email: email.to_string(),
        }
    }
}

/// `GET /login`
pub async fn login_page(OptionalUser(user): OptionalUser) -> Response {
    if user.is_some() {
        return Redirect::to("/dashboard").into_response();
    }
    LoginTemplate {
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let email = match validate_credentials(&form.email, &form.password) {
        Ok(email) => email,
        Err(e) => {
            let message = match e {
                AuthError::MissingPassword => "Please enter your password.",
                _ => "Please enter a valid email address.",
            };
            return Ok((
                StatusCode::BAD_REQUEST,
                LoginTemplate::with_error(&form.email, message),
            )
                .into_response());
        }
    };

    let auth = match state.auth().login(&email, &form.password).await {
        Ok(auth) => auth,
        Err(AuthError::InvalidCredentials) => {
            tracing::info!(email_domain = email.domain(), "Login rejected");
            return Ok((
                StatusCode::UNAUTHORIZED,
                LoginTemplate::with_error(email.as_str(), "Invalid email or password."),
            )
                .into_response());
        }
        Err(e) => {
            let event_id = sentry::capture_error(&e);
            tracing::error!(error = %e, sentry_event_id = %event_id, "Auth service unavailable");
            return Ok((
                StatusCode::BAD_GATEWAY,
                LoginTemplate::with_error(
                    email.as_str(),
                    "Sign-in is temporarily unavailable. Please try again shortly.",
                ),
            )
                .into_response());
        }
    };

    session::store_login(&session, &auth).await?;

    let mut center = session::notifications(&session).await?;
    center.notify(
        format!("Welcome back, {}", auth.user.name),
        "You are signed in to the Siteflow dashboard.",
        Severity::Success,
    );
    session::save_notifications(&session, &center).await?;

    set_sentry_user(&auth.user.id, Some(auth.user.email.as_str()));
    tracing::info!(user_id = %auth.user.id, role = auth.user.role.as_str(), "User logged in");

    Ok(Redirect::to("/dashboard").into_response())
}

/// `POST /logout`
pub async fn logout(session: Session) -> Result<Redirect> {
    session::clear(&session).await?;
    clear_sentry_user();
    Ok(Redirect::to("/login"))
}

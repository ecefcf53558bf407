//! Sidebar and theme preferences.
//!
//! Preferences are kept per session and do not require a login, so the
//! theme toggle also works on the marketing pages.

use axum::Json;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use siteflow_core::Theme;

use crate::error::{AppError, Result};
use crate::models::session;

#[derive(Debug, Deserialize, Serialize)]
pub struct SidebarPreference {
    pub collapsed: bool,
}

#[derive(Debug, Deserialize)]
pub struct ThemeRequest {
    pub theme: String,
}

#[derive(Debug, Serialize)]
pub struct ThemePreference {
    pub theme: Theme,
}

/// `POST /api/preferences/sidebar`
pub async fn set_sidebar(
    session: Session,
    Json(preference): Json<SidebarPreference>,
) -> Result<Json<SidebarPreference>> {
    session::set_sidebar_collapsed(&session, preference.collapsed).await?;
    Ok(Json(preference))
}

/// `POST /api/preferences/theme`
pub async fn set_theme(
    session: Session,
    Json(request): Json<ThemeRequest>,
) -> Result<Json<ThemePreference>> {
    let theme: Theme = request
        .theme
        .parse()
        .map_err(|e: siteflow_core::ThemeParseError| AppError::BadRequest(e.to_string()))?;
    session::set_theme(&session, theme).await?;
    Ok(Json(ThemePreference { theme }))
}

/// `POST /api/preferences/theme/toggle`
pub async fn toggle_theme(session: Session) -> Result<Json<ThemePreference>> {
    let theme = session::theme(&session).await?.toggled();
    session::set_theme(&session, theme).await?;
    Ok(Json(ThemePreference { theme }))
}

//! Notification center API.

use axum::{
    Json,
    extract::Path,
    http::StatusCode,
};
use serde::Serialize;
use tower_sessions::Session;
use uuid::Uuid;

use siteflow_core::{Notification, NotificationId};

use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::session;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationList {
    pub unread_count: usize,
    pub items: Vec<Notification>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadAllResult {
    pub updated: usize,
    pub unread_count: usize,
}

fn not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("Notification {id}"))
}

/// `GET /api/notifications`
pub async fn list(RequireUser(_): RequireUser, session: Session) -> Result<Json<NotificationList>> {
    let center = session::notifications(&session).await?;
    Ok(Json(NotificationList {
        unread_count: center.unread_count(),
        items: center.list().to_vec(),
    }))
}

/// `POST /api/notifications/{id}/read`
pub async fn mark_read(
    RequireUser(_): RequireUser,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut center = session::notifications(&session).await?;
    if !center.mark_read(NotificationId::from(id)) {
        return Err(not_found(id));
    }
    session::save_notifications(&session, &center).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/notifications/read-all`
pub async fn mark_all_read(
    RequireUser(_): RequireUser,
    session: Session,
) -> Result<Json<ReadAllResult>> {
    let mut center = session::notifications(&session).await?;
    let updated = center.mark_all_read();
    if updated > 0 {
        session::save_notifications(&session, &center).await?;
    }
    Ok(Json(ReadAllResult {
        updated,
        unread_count: center.unread_count(),
    }))
}

/// `DELETE /api/notifications/{id}`
pub async fn dismiss(
    RequireUser(_): RequireUser,
    session: Session,
    Path(id): Path<Uuid>,
) -> Result<StatusCode> {
    let mut center = session::notifications(&session).await?;
    if !center.dismiss(NotificationId::from(id)) {
        return Err(not_found(id));
    }
    session::save_notifications(&session, &center).await?;
    Ok(StatusCode::NO_CONTENT)
}

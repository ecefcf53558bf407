//! Per-visitor session state.
//!
//! Everything the dashboard remembers about a visitor lives under the keys
//! below. Reads never write, so loading the same key twice without an
//! intervening write returns the same value.

use tower_sessions::Session;

use siteflow_core::{NotificationCenter, Theme, User};

use crate::services::AuthSession;

type SessionResult<T> = Result<T, tower_sessions::session::Error>;

/// Session keys.
pub mod keys {
    /// Bearer token issued by the auth service.
    pub const AUTH_TOKEN: &str = "auth_token";

    /// The logged-in [`User`](siteflow_core::User).
    pub const CURRENT_USER: &str = "current_user";

    /// Whether the dashboard sidebar is collapsed.
    pub const SIDEBAR_COLLAPSED: &str = "sidebar_collapsed";

    /// Selected colour theme.
    pub const THEME: &str = "theme";

    /// The visitor's notification center.
    pub const NOTIFICATIONS: &str = "notifications";
}

/// Store a successful login.
///
/// The session ID is cycled first so a pre-login session cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn store_login(session: &Session, auth: &AuthSession) -> SessionResult<()> {
    session.cycle_id().await?;
    session.insert(keys::AUTH_TOKEN, &auth.token).await?;
    session.insert(keys::CURRENT_USER, &auth.user).await
}

/// The logged-in user, if any.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn current_user(session: &Session) -> SessionResult<Option<User>> {
    session.get(keys::CURRENT_USER).await
}

/// The auth service token, if any.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn auth_token(session: &Session) -> SessionResult<Option<String>> {
    session.get(keys::AUTH_TOKEN).await
}

/// Forget everything about the visitor.
///
/// # Errors
///
/// Returns an error if the session cannot be flushed.
pub async fn clear(session: &Session) -> SessionResult<()> {
    session.flush().await
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn sidebar_collapsed(session: &Session) -> SessionResult<bool> {
    Ok(session
        .get::<bool>(keys::SIDEBAR_COLLAPSED)
        .await?
        .unwrap_or(false))
}

/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_sidebar_collapsed(session: &Session, collapsed: bool) -> SessionResult<()> {
    session.insert(keys::SIDEBAR_COLLAPSED, collapsed).await
}

/// # Errors
///
/// Returns an error if the session store fails.
pub async fn theme(session: &Session) -> SessionResult<Theme> {
    Ok(session.get::<Theme>(keys::THEME).await?.unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_theme(session: &Session, theme: Theme) -> SessionResult<()> {
    session.insert(keys::THEME, theme).await
}

/// The visitor's notifications, empty when none were stored yet.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn notifications(session: &Session) -> SessionResult<NotificationCenter> {
    Ok(session
        .get::<NotificationCenter>(keys::NOTIFICATIONS)
        .await?
        .unwrap_or_default())
}

/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn save_notifications(
    session: &Session,
    center: &NotificationCenter,
) -> SessionResult<()> {
    session.insert(keys::NOTIFICATIONS, center).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use siteflow_core::{Email, Notification, Role, Severity, UserId};
    use crate::middleware::SessionCache;

    use super::*;

    fn session() -> Session {
        Session::new(None, Arc::new(SessionCache::default()), None)
    }

    fn login() -> AuthSession {
        AuthSession {
            token: "token-123".to_string(),
            user: User {
                id: UserId::new(3),
                name: "Priya Lane".to_string(),
                email: Email::parse("priya@siteflow.dev").unwrap(),
                role: Role::Pl,
                avatar: None,
            },
        }
    }

    #[tokio::test]
    async fn test_login_round_trip_is_idempotent() {
        let session = session();
        store_login(&session, &login()).await.unwrap();

        let first = current_user(&session).await.unwrap().unwrap();
        let second = current_user(&session).await.unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(first.role, Role::Pl);
        assert_eq!(auth_token(&session).await.unwrap().as_deref(), Some("token-123"));
    }

    #[tokio::test]
    async fn test_clear_removes_everything() {
        let session = session();
        store_login(&session, &login()).await.unwrap();
        set_sidebar_collapsed(&session, true).await.unwrap();

        clear(&session).await.unwrap();
        assert!(current_user(&session).await.unwrap().is_none());
        assert!(!sidebar_collapsed(&session).await.unwrap());
    }

    #[tokio::test]
    async fn test_preference_defaults() {
        let session = session();
        assert!(!sidebar_collapsed(&session).await.unwrap());
        assert_eq!(theme(&session).await.unwrap(), Theme::System);
        assert!(notifications(&session).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notifications_persist() {
        let session = session();
        let mut center = notifications(&session).await.unwrap();
        center.push(Notification::new("Deploy", "Staging is live", Severity::Success));
        save_notifications(&session, &center).await.unwrap();

        let loaded = notifications(&session).await.unwrap();
        assert_eq!(loaded.unread_count(), 1);
    }
}

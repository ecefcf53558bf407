//! Dashboard shell.
//!
//! Every dashboard page shares the same shell: the user block, the sidebar
//! filtered for the user's role, the notification bell and the theme and
//! sidebar preferences. Reporting pages load their data from the JSON API.

use askama::Template;
use chrono::{DateTime, TimeDelta, Utc};
use askama_web::WebTemplate;
use axum::extract::Path;
use tower_sessions::Session;
use tracing::instrument;

use siteflow_core::{NavItem, Notification, Severity, User, navigation};

use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireUser;
use crate::models::session;

/// Number of notifications shown in the bell dropdown.
const RECENT_NOTIFICATIONS: usize = 5;

/// A sidebar link.
#[derive(Debug, Clone)]
pub struct NavLink {
    pub id: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub target: &'static str,
    pub active: bool,
}

/// What the content area of a page shows.
#[derive(Debug, Clone)]
pub struct PageView {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// JSON endpoint the page loads its data from.
    pub endpoint: Option<&'static str>,
}

impl PageView {
    fn for_item(item: &NavItem) -> Self {
        let (description, endpoint) = match item.id {
            "dashboard" => ("Your projects, tickets and notifications at a glance.", None),
            "projects" => ("Milestones and deliverables for your active projects.", None),
            "tickets" => ("Open support requests and their status.", None),
            "analytics" => (
                "Site traffic for the last 7 days compared to the week before.",
                Some("/api/analytics/traffic"),
            ),
            "search" => (
                "Search performance for the last 28 days compared to the period before.",
                Some("/api/search-console/summary"),
            ),
            "performance" => (
                "Lighthouse scores and core web vitals on mobile and desktop.",
                Some("/api/pagespeed"),
            ),
            "companies" => ("Client companies and their account managers.", None),
            "users" => ("Dashboard accounts and their roles.", None),
            "billing" => ("Invoices and payment history.", None),
            "settings" => ("Profile and display preferences.", None),
            _ => ("", None),
        };

        Self {
            id: item.id,
            title: item.label,
            description,
            endpoint,
        }
    }
}

/// A notification as shown in the bell dropdown.
#[derive(Debug, Clone)]
pub struct NotificationView {
    pub id: String,
    pub title: String,
    pub message: String,
    pub severity: &'static str,
    pub read: bool,
    pub age: String,
}

impl NotificationView {
    fn new(notification: &Notification, now: DateTime<Utc>) -> Self {
        Self {
            id: notification.id.to_string(),
            title: notification.title.clone(),
            message: notification.message.clone(),
            severity: severity_class(notification.severity),
            read: notification.read,
            age: format_age(now.signed_duration_since(notification.created_at)),
        }
    }
}

const fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Info => "info",
        Severity::Success => "success",
        Severity::Warning => "warning",
        Severity::Error => "error",
    }
}

/// Short relative age such as "5m ago".
fn format_age(age: TimeDelta) -> String {
    let minutes = age.num_minutes();
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if age.num_hours() < 24 {
        format!("{}h ago", age.num_hours())
    } else {
        format!("{}d ago", age.num_days())
    }
}

/// Dashboard page template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: User,
    pub initials: String,
    pub nav: Vec<NavLink>,
    pub page: PageView,
    pub unread_count: usize,
    pub notifications: Vec<NotificationView>,
    pub sidebar_collapsed: bool,
    pub theme: &'static str,
}

/// Sidebar links for `user`, with `current` highlighted.
#[must_use]
pub fn nav_links(user: &User, current: &str) -> Vec<NavLink> {
    navigation::navigation_for(user.role)
        .into_iter()
        .map(|item| NavLink {
            id: item.id,
            label: item.label,
            icon: item.icon,
            target: item.target,
            active: item.id == current,
        })
        .collect()
}

/// `GET /dashboard`
pub async fn index(RequireUser(user): RequireUser, session: Session) -> Result<DashboardTemplate> {
    render(user, &session, "dashboard").await
}

/// `GET /dashboard/{page}`
pub async fn page(
    RequireUser(user): RequireUser,
    session: Session,
    Path(page): Path<String>,
) -> Result<DashboardTemplate> {
    render(user, &session, &page).await
}

#[instrument(skip(user, session), fields(user_id = %user.id, role = user.role.as_str()))]
async fn render(user: User, session: &Session, page_id: &str) -> Result<DashboardTemplate> {
    let item = navigation::find(page_id)
        .ok_or_else(|| AppError::NotFound(format!("Page {page_id}")))?;

    if !navigation::is_visible(user.role, item.id) {
        tracing::warn!(page = item.id, "Dashboard page denied for role");
        return Err(AppError::Forbidden(
            "You do not have access to this page".to_string(),
        ));
    }

    let center = session::notifications(session).await?;
    let now = Utc::now();

    Ok(DashboardTemplate {
        initials: user.initials(),
        nav: nav_links(&user, item.id),
        page: PageView::for_item(item),
        unread_count: center.unread_count(),
        notifications: center
            .list()
            .iter()
            .take(RECENT_NOTIFICATIONS)
            .map(|n| NotificationView::new(n, now))
            .collect(),
        sidebar_collapsed: session::sidebar_collapsed(session).await?,
        theme: session::theme(session).await?.as_str(),
        user,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use siteflow_core::{Email, Role, UserId};

    fn user(role: Role) -> User {
        User {
            id: UserId::new(1),
            name: "Casey Jones".to_string(),
            email: Email::parse("casey@client.com").unwrap(),
            role,
            avatar: None,
        }
    }

    #[test]
    fn test_nav_links_highlight_current() {
        let links = nav_links(&user(Role::Customer), "billing");
        let active: Vec<_> = links.iter().filter(|l| l.active).map(|l| l.id).collect();
        assert_eq!(active, ["billing"]);
        assert!(!links.iter().any(|l| l.id == "analytics"));
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(TimeDelta::seconds(20)), "just now");
        assert_eq!(format_age(TimeDelta::minutes(5)), "5m ago");
        assert_eq!(format_age(TimeDelta::hours(3)), "3h ago");
        assert_eq!(format_age(TimeDelta::days(2)), "2d ago");
    }

    #[test]
    fn test_reporting_pages_have_endpoints() {
        for id in ["analytics", "search", "performance"] {
            let view = PageView::for_item(navigation::find(id).unwrap());
            assert!(view.endpoint.is_some(), "{id}");
        }
        let view = PageView::for_item(navigation::find("projects").unwrap());
        assert!(view.endpoint.is_none());
    }
}

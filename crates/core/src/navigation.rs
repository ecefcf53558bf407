//! Dashboard navigation catalog and the role-gated filter.
//!
//! The sidebar is built from a fixed [`CATALOG`]. Whether an entry is shown
//! is decided by a separate rule table keyed by entry id, so an entry that
//! has no rule is never shown.
//!
//! ```
//! use siteflow_core::{Role, navigation};
//!
//! let ids: Vec<_> = navigation::navigation_for(Role::Customer)
//!     .iter()
//!     .map(|item| item.id)
//!     .collect();
//! assert!(!ids.contains(&"analytics"));
//! assert!(ids.contains(&"billing"));
//! ```

use serde::{Deserialize, Serialize};

use crate::Role;

/// A permission granted to roles by [`Role::capabilities`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    ViewDashboard,
    /// Internal reporting and delivery tools.
    ViewStaffTools,
    /// Create and edit customer companies.
    ManageCompanies,
    /// Invite users and change roles.
    ManageUsers,
    ViewBilling,
}

/// Visibility rule for a navigation entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Every known role.
    Everyone,
    /// Only roles granted the capability.
    Requires(Capability),
}

impl Visibility {
    /// Whether the rule admits `role`.
    #[must_use]
    pub fn admits(self, role: Role) -> bool {
        match self {
            Self::Everyone => role.is_known(),
            Self::Requires(capability) => role.has(capability),
        }
    }
}

/// One entry of the dashboard sidebar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NavItem {
    pub id: &'static str,
    pub label: &'static str,
    /// Icon name from the dashboard icon sprite.
    pub icon: &'static str,
    /// Page the entry links to.
    pub target: &'static str,
}

impl NavItem {
    const fn new(
        id: &'static str,
        label: &'static str,
        icon: &'static str,
        target: &'static str,
    ) -> Self {
        Self {
            id,
            label,
            icon,
            target,
        }
    }
}

/// Every sidebar entry in display order.
pub const CATALOG: &[NavItem] = &[
    NavItem::new("dashboard", "Dashboard", "home", "/dashboard"),
    NavItem::new("projects", "Projects", "folder", "/dashboard/projects"),
    NavItem::new("tickets", "Tickets", "life-buoy", "/dashboard/tickets"),
    NavItem::new("analytics", "Analytics", "bar-chart", "/dashboard/analytics"),
    NavItem::new("search", "Search Console", "search", "/dashboard/search"),
    NavItem::new("performance", "Performance", "gauge", "/dashboard/performance"),
    NavItem::new("companies", "Companies", "building", "/dashboard/companies"),
    NavItem::new("users", "Users", "users", "/dashboard/users"),
    NavItem::new("billing", "Billing", "credit-card", "/dashboard/billing"),
    NavItem::new("settings", "Settings", "settings", "/dashboard/settings"),
];

const RULES: &[(&str, Visibility)] = &[
    ("dashboard", Visibility::Everyone),
    ("projects", Visibility::Everyone),
    ("tickets", Visibility::Everyone),
    ("analytics", Visibility::Requires(Capability::ViewStaffTools)),
    ("search", Visibility::Requires(Capability::ViewStaffTools)),
    ("performance", Visibility::Requires(Capability::ViewStaffTools)),
    ("companies", Visibility::Requires(Capability::ManageCompanies)),
    ("users", Visibility::Requires(Capability::ManageUsers)),
    ("billing", Visibility::Requires(Capability::ViewBilling)),
    ("settings", Visibility::Everyone),
];

/// Visibility rule for an entry id, if one exists.
#[must_use]
pub fn visibility_rule(id: &str) -> Option<Visibility> {
    RULES
        .iter()
        .find(|(rule_id, _)| *rule_id == id)
        .map(|(_, visibility)| *visibility)
}

/// Whether the entry `id` is visible to `role`. Unknown ids are not.
#[must_use]
pub fn is_visible(role: Role, id: &str) -> bool {
    visibility_rule(id).is_some_and(|rule| rule.admits(role))
}

/// Filter `catalog` down to the entries `role` may see, keeping order.
#[must_use]
pub fn visible_items(role: Role, catalog: &[NavItem]) -> Vec<&NavItem> {
    catalog
        .iter()
        .filter(|item| is_visible(role, item.id))
        .collect()
}

/// Visible entries of the built-in [`CATALOG`] for `role`.
#[must_use]
pub fn navigation_for(role: Role) -> Vec<&'static NavItem> {
    visible_items(role, CATALOG)
}

/// Look up a catalog entry by id.
#[must_use]
pub fn find(id: &str) -> Option<&'static NavItem> {
    CATALOG.iter().find(|item| item.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(role: Role) -> Vec<&'static str> {
        navigation_for(role).iter().map(|item| item.id).collect()
    }

    #[test]
    fn test_every_catalog_entry_has_a_rule() {
        for item in CATALOG {
            assert!(visibility_rule(item.id).is_some(), "{} has no rule", item.id);
        }
    }

    #[test]
    fn test_admin_sees_everything() {
        assert_eq!(ids(Role::Admin).len(), CATALOG.len());
    }

    #[test]
    fn test_customer_never_sees_staff_entries() {
        let customer = ids(Role::Customer);
        assert_eq!(
            customer,
            vec!["dashboard", "projects", "tickets", "billing", "settings"]
        );
    }

    #[test]
    fn test_company_management_roles() {
        assert!(ids(Role::Admin).contains(&"companies"));
        assert!(ids(Role::Kam).contains(&"companies"));
        assert!(!ids(Role::Pl).contains(&"companies"));
        assert!(!ids(Role::Developer).contains(&"companies"));
        assert!(!ids(Role::Customer).contains(&"companies"));
    }

    #[test]
    fn test_developer_navigation() {
        assert_eq!(
            ids(Role::Developer),
            vec![
                "dashboard",
                "projects",
                "tickets",
                "analytics",
                "search",
                "performance",
                "settings"
            ]
        );
    }

    #[test]
    fn test_unknown_role_sees_nothing() {
        assert!(ids(Role::Unknown).is_empty());
    }

    #[test]
    fn test_unknown_ids_fail_closed() {
        let catalog = [
            NavItem::new("dashboard", "Dashboard", "home", "/dashboard"),
            NavItem::new("secret-lab", "Lab", "flask", "/dashboard/lab"),
        ];
        let visible = visible_items(Role::Admin, &catalog);
        assert_eq!(visible.len(), 1);
        assert!(!is_visible(Role::Admin, "secret-lab"));
    }

    #[test]
    fn test_filter_is_deterministic() {
        for role in Role::KNOWN {
            assert_eq!(navigation_for(role), navigation_for(role));
        }
    }
}

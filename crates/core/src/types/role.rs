//! User roles and the role → capability table.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::navigation::Capability;

/// Error returned when a role string is not part of the closed role set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid role: {0} (expected admin, kam, pl, developer or customer)")]
pub struct RoleParseError(pub String);

/// Role of a dashboard user.
///
/// The set is closed. Any other value coming back from the auth service
/// deserializes to [`Role::Unknown`], which is granted nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Agency administrator. Full access.
    Admin,
    /// Key account manager. Owns customer companies.
    Kam,
    /// Project lead.
    Pl,
    /// Developer working on customer projects.
    Developer,
    /// Customer logging in to follow their own projects.
    Customer,
    /// Any role string we do not recognise.
    #[serde(other)]
    Unknown,
}

impl Role {
    /// All recognised roles, in display order.
    pub const KNOWN: [Self; 5] = [
        Self::Admin,
        Self::Kam,
        Self::Pl,
        Self::Developer,
        Self::Customer,
    ];

    /// Capabilities granted to this role.
    #[must_use]
    pub const fn capabilities(self) -> &'static [Capability] {
        use Capability::{ManageCompanies, ManageUsers, ViewBilling, ViewDashboard, ViewStaffTools};

        match self {
            Self::Admin => &[
                ViewDashboard,
                ViewStaffTools,
                ManageCompanies,
                ManageUsers,
                ViewBilling,
            ],
            Self::Kam => &[ViewDashboard, ViewStaffTools, ManageCompanies, ViewBilling],
            Self::Pl | Self::Developer => &[ViewDashboard, ViewStaffTools],
            Self::Customer => &[ViewDashboard, ViewBilling],
            Self::Unknown => &[],
        }
    }

    /// Whether the role is granted `capability`.
    #[must_use]
    pub fn has(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Staff are every known role except customers.
    #[must_use]
    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Admin | Self::Kam | Self::Pl | Self::Developer)
    }

    /// Whether the role belongs to the closed role set.
    #[must_use]
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Wire name of the role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Kam => "kam",
            Self::Pl => "pl",
            Self::Developer => "developer",
            Self::Customer => "customer",
            Self::Unknown => "unknown",
        }
    }

    /// Human readable label shown in the dashboard top bar.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Administrator",
            Self::Kam => "Key Account Manager",
            Self::Pl => "Project Lead",
            Self::Developer => "Developer",
            Self::Customer => "Customer",
            Self::Unknown => "Guest",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "kam" => Ok(Self::Kam),
            "pl" => Ok(Self::Pl),
            "developer" => Ok(Self::Developer),
            "customer" => Ok(Self::Customer),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

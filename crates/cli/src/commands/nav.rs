//! Navigation preview for a role.

use thiserror::Error;

use siteflow_core::{Role, navigation};

#[derive(Debug, Error)]
pub enum NavError {
    #[error("{0}. Valid roles: admin, kam, pl, developer, customer")]
    InvalidRole(#[from] siteflow_core::RoleParseError),
}

/// Log the sidebar entries `role` would see, in order.
///
/// # Errors
///
/// Returns an error if the role is not recognised.
pub fn show(role: &str) -> Result<(), NavError> {
    let role: Role = role.parse()?;
    let items = navigation::navigation_for(role);

    tracing::info!("{} sees {} entries:", role.label(), items.len());
    for item in items {
        tracing::info!("  {:<12} {}", item.id, item.target);
    }

    Ok(())
}

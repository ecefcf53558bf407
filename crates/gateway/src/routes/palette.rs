//! Command palette and navigation API.

use axum::{Json, extract::Query};
use serde::{Deserialize, Serialize};

use siteflow_core::palette::{self, Command};
use siteflow_core::{NavItem, navigation};

use crate::middleware::RequireUser;

#[derive(Debug, Deserialize)]
pub struct PaletteQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct PaletteResults {
    pub query: String,
    pub results: Vec<Command>,
}

/// `GET /api/command-palette?q=`
pub async fn command_palette(
    RequireUser(user): RequireUser,
    Query(query): Query<PaletteQuery>,
) -> Json<PaletteResults> {
    let commands = palette::commands_for(user.role);
    let results = palette::search(&commands, &query.q)
        .into_iter()
        .cloned()
        .collect();

    Json(PaletteResults {
        query: query.q,
        results,
    })
}

/// `GET /api/navigation`
pub async fn navigation(RequireUser(user): RequireUser) -> Json<Vec<&'static NavItem>> {
    Json(navigation::navigation_for(user.role))
}

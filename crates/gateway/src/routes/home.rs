//! Marketing landing page.

use askama::Template;
use askama_web::WebTemplate;
use tower_sessions::Session;

use crate::error::Result;
use crate::filters;
use crate::middleware::OptionalUser;
use crate::models::session;

/// A promotional banner on the landing page.
#[derive(Debug, Clone)]
pub struct Banner {
    pub eyebrow: &'static str,
    pub title: &'static str,
    pub body: &'static str,
    pub cta_label: &'static str,
    pub cta_url: &'static str,
}

/// Banners in display order.
pub const BANNERS: &[Banner] = &[
    Banner {
        eyebrow: "Client portals",
        title: "One place for your customers",
        body: "Projects, tickets, invoices and reports behind a single login, \
               shaped around how your team already works.",
        cta_label: "Check your fit",
        cta_url: "#assess",
    },
    Banner {
        eyebrow: "Operations dashboards",
        title: "See the numbers that matter",
        body: "Traffic, search and performance data from the tools you use, \
               side by side and compared week over week.",
        cta_label: "Sign in",
        cta_url: "/login",
    },
    Banner {
        eyebrow: "Integrations",
        title: "Stop copying data between tools",
        body: "We connect your CRM, analytics and billing so updates flow \
               without spreadsheets in the middle.",
        cta_label: "Describe your setup",
        cta_url: "#assess",
    },
];

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub banners: &'static [Banner],
    pub signed_in: bool,
    pub theme: &'static str,
}

/// `GET /`
pub async fn home(OptionalUser(user): OptionalUser, session: Session) -> Result<HomeTemplate> {
    Ok(HomeTemplate {
        banners: BANNERS,
        signed_in: user.is_some(),
        theme: session::theme(&session).await?.as_str(),
    })
}

/// `GET /health`
///
/// Liveness check. Vendors are not contacted.
pub async fn health() -> &'static str {
    "ok"
}

//! Login relay and the role-gated dashboard.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;

use siteflow_integration_tests::{
    PASSWORD, TestContext, body_json, body_text, location, session_cookie,
};

#[tokio::test]
async fn test_anonymous_dashboard_redirects_to_login() {
    let ctx = TestContext::new();

    for path in ["/dashboard", "/dashboard/projects"] {
        let response = ctx.get(path, None).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER, "{path}");
        assert_eq!(location(&response), Some("/login"));
    }
}

#[tokio::test]
async fn test_anonymous_api_gets_401_not_redirect() {
    let ctx = TestContext::new();

    for path in ["/api/navigation", "/api/command-palette?q=dash", "/api/notifications"] {
        let response = ctx.get(path, None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");
        assert_eq!(location(&response), None, "{path}");
        assert_eq!(body_json(response).await["error"], "Authentication required");
    }
}

#[tokio::test]
async fn test_login_then_dashboard() {
    let ctx = TestContext::new();
    let cookie = ctx.login("kam@siteflow.dev").await;

    let response = ctx.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Kim Park"));
    assert!(html.contains("icon-building"));
    assert!(!html.contains("icon-users"));
}

#[tokio::test]
async fn test_login_page_redirects_when_signed_in() {
    let ctx = TestContext::new();
    let cookie = ctx.login("pl@siteflow.dev").await;

    let response = ctx.get("/login", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/dashboard"));
}

#[tokio::test]
async fn test_login_errors() {
    let ctx = TestContext::new();

    let response = ctx.post_login("not-an-email", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx.post_login("admin@siteflow.dev", "").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = ctx.post_login("admin@siteflow.dev", "wrong").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());

    let response = ctx.post_login("someone@down.example", PASSWORD).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_unknown_page_is_404() {
    let ctx = TestContext::new();
    let cookie = ctx.login("admin@siteflow.dev").await;

    let response = ctx.get("/dashboard/payroll", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_hidden_page_is_403() {
    let ctx = TestContext::new();
    let cookie = ctx.login("casey@client.com").await;

    for page in ["analytics", "search", "performance", "companies", "users"] {
        let response = ctx.get(&format!("/dashboard/{page}"), Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{page}");
    }

    let response = ctx.get("/dashboard/billing", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_role_sees_nothing() {
    let ctx = TestContext::new();
    let cookie = ctx.login("ghost@siteflow.dev").await;

    let response = ctx.get("/dashboard", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx.get("/api/navigation", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_navigation_per_role() {
    let ctx = TestContext::new();

    let cases = [
        ("admin@siteflow.dev", 10),
        ("kam@siteflow.dev", 9),
        ("dev@siteflow.dev", 7),
        ("casey@client.com", 5),
    ];

    for (email, expected) in cases {
        let cookie = ctx.login(email).await;
        let first = body_json(ctx.get("/api/navigation", Some(&cookie)).await).await;
        let second = body_json(ctx.get("/api/navigation", Some(&cookie)).await).await;

        assert_eq!(first.as_array().unwrap().len(), expected, "{email}");
        assert_eq!(first, second, "navigation must be stable for {email}");
        assert_eq!(first[0]["id"], "dashboard");
    }
}

#[tokio::test]
async fn test_logout_clears_session() {
    let ctx = TestContext::new();
    let cookie = ctx.login("admin@siteflow.dev").await;

    let response = ctx.empty("POST", "/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), Some("/login"));

    let response = ctx.get("/api/navigation", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

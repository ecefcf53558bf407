//! Notifications, command palette, preferences and the public pages.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;

use siteflow_integration_tests::{TestContext, body_json, body_text, session_cookie};

#[tokio::test]
async fn test_health() {
    let ctx = TestContext::new();
    let response = ctx.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "ok");
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let ctx = TestContext::new();

    let request = Request::get("/health")
        .header("x-request-id", "probe-123")
        .body(Body::empty())
        .unwrap();
    let response = ctx.send(request).await;
    assert_eq!(response.headers()["x-request-id"], "probe-123");

    let response = ctx.get("/health", None).await;
    assert!(response.headers().contains_key("x-request-id"));
}

#[tokio::test]
async fn test_landing_page() {
    let ctx = TestContext::new();
    let response = ctx.get("/", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("One place for your customers"));
    assert!(html.contains("/login"));
}

#[tokio::test]
async fn test_welcome_notification_after_login() {
    let ctx = TestContext::new();
    let cookie = ctx.login("admin@siteflow.dev").await;

    let body = body_json(ctx.get("/api/notifications", Some(&cookie)).await).await;
    assert_eq!(body["unreadCount"], 1);
    assert_eq!(body["items"][0]["title"], "Welcome back, Alex Admin");
    assert_eq!(body["items"][0]["read"], false);
}

#[tokio::test]
async fn test_mark_read_and_dismiss() {
    let ctx = TestContext::new();
    let cookie = ctx.login("pl@siteflow.dev").await;

    let body = body_json(ctx.get("/api/notifications", Some(&cookie)).await).await;
    let id = body["items"][0]["id"].as_str().unwrap().to_string();

    let response = ctx
        .empty("POST", &format!("/api/notifications/{id}/read"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = body_json(ctx.get("/api/notifications", Some(&cookie)).await).await;
    assert_eq!(body["unreadCount"], 0);
    assert_eq!(body["items"][0]["read"], true);

    let response = ctx
        .empty("DELETE", &format!("/api/notifications/{id}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = ctx
        .empty("DELETE", &format!("/api/notifications/{id}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(ctx.get("/api/notifications", Some(&cookie)).await).await;
    assert_eq!(body["items"], json!([]));
}

#[tokio::test]
async fn test_mark_all_read() {
    let ctx = TestContext::new();
    let cookie = ctx.login("dev@siteflow.dev").await;

    let response = ctx
        .empty("POST", "/api/notifications/read-all", Some(&cookie))
        .await;
    assert_eq!(
        body_json(response).await,
        json!({ "updated": 1, "unreadCount": 0 })
    );

    let response = ctx
        .empty("POST", "/api/notifications/read-all", Some(&cookie))
        .await;
    assert_eq!(
        body_json(response).await,
        json!({ "updated": 0, "unreadCount": 0 })
    );
}

#[tokio::test]
async fn test_notifications_require_login() {
    let ctx = TestContext::new();
    let response = ctx.get("/api/notifications", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_palette_respects_role() {
    let ctx = TestContext::new();

    let cookie = ctx.login("casey@client.com").await;
    let body = body_json(
        ctx.get("/api/command-palette?q=analytics", Some(&cookie))
            .await,
    )
    .await;
    assert_eq!(body["query"], "analytics");
    assert_eq!(body["results"], json!([]));

    let cookie = ctx.login("admin@siteflow.dev").await;
    let body = body_json(
        ctx.get("/api/command-palette?q=analytics", Some(&cookie))
            .await,
    )
    .await;
    assert_eq!(body["results"][0]["id"], "nav.analytics");
    assert_eq!(body["results"][0]["action"]["target"], "/dashboard/analytics");
}

#[tokio::test]
async fn test_palette_keyword_match() {
    let ctx = TestContext::new();
    let cookie = ctx.login("kam@siteflow.dev").await;

    let body = body_json(ctx.get("/api/command-palette?q=dark", Some(&cookie)).await).await;
    assert_eq!(body["results"][0]["id"], "action.toggle-theme");
}

#[tokio::test]
async fn test_theme_preference_without_login() {
    let ctx = TestContext::new();

    let response = ctx
        .json("POST", "/api/preferences/theme", &json!({ "theme": "dark" }), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response).unwrap();
    assert_eq!(body_json(response).await, json!({ "theme": "dark" }));

    let response = ctx
        .empty("POST", "/api/preferences/theme/toggle", Some(&cookie))
        .await;
    assert_eq!(body_json(response).await, json!({ "theme": "light" }));

    let response = ctx
        .json("POST", "/api/preferences/theme", &json!({ "theme": "sepia" }), None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sidebar_preference() {
    let ctx = TestContext::new();
    let cookie = ctx.login("admin@siteflow.dev").await;

    let response = ctx
        .json(
            "POST",
            "/api/preferences/sidebar",
            &json!({ "collapsed": true }),
            Some(&cookie),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({ "collapsed": true }));

    let html = body_text(ctx.get("/dashboard", Some(&cookie)).await).await;
    assert!(html.contains("sidebar-collapsed"));
}

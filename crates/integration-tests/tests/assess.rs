//! `POST /api/assess-system-needs`

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use axum::http::StatusCode;
use serde_json::json;

use siteflow_core::FALLBACK_ANALYSIS;
use siteflow_integration_tests::{TestContext, TestOptions, body_json};

#[tokio::test]
async fn test_returns_assessment() {
    let ctx = TestContext::new();

    let response = ctx
        .json(
            "POST",
            "/api/assess-system-needs",
            &json!({ "userProblem": "Our customers email us for project status updates." }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["fitScore"], 82);
    assert!(body["analysis"].as_str().unwrap().contains("client portal"));
    assert_eq!(ctx.assess_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_rejects_bad_problem_without_calling_model() {
    let ctx = TestContext::new();

    for body in [
        json!({}),
        json!({ "userProblem": 17 }),
        json!({ "userProblem": null }),
        json!({ "userProblem": "   " }),
        json!(["userProblem"]),
    ] {
        let response = ctx
            .json("POST", "/api/assess-system-needs", &body, None)
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
        let error = body_json(response).await;
        assert_eq!(
            error["error"],
            "userProblem is required and must be a string"
        );
    }

    assert_eq!(ctx.assess_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_model_failure_returns_fallback() {
    let ctx = TestContext::with_options(TestOptions::default());

    let response = ctx
        .json(
            "POST",
            "/api/assess-system-needs",
            &json!({ "userProblem": "We need an intranet." }),
            None,
        )
        .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body, json!({ "analysis": FALLBACK_ANALYSIS, "fitScore": 0 }));
}

#[tokio::test]
async fn test_does_not_require_login() {
    let ctx = TestContext::new();
    let response = ctx
        .json(
            "POST",
            "/api/assess-system-needs",
            &json!({ "userProblem": "Invoices live in three tools." }),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

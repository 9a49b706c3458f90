//! Request validation through the full router: invalid input must come
//! back as one aggregated 400 envelope and never reach the store.

mod common;

use anyhow::Result;
use serde_json::json;

#[tokio::test]
async fn missing_required_field_is_400_and_skips_the_handler() -> Result<()> {
    let app = common::TestApp::spawn();

    let response = app
        .post_json("/api/auth/signup", json!({ "password": "password123" }))
        .await;
    assert_eq!(response.status(), 400);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "email: Required");

    // The handler's first act is a store create; zero operations means
    // validation short-circuited before it ran.
    assert_eq!(app.monitor.total_operations(), 0);
    Ok(())
}

#[tokio::test]
async fn every_violation_is_reported_in_one_message() -> Result<()> {
    let app = common::TestApp::spawn();

    let response = app
        .post_json(
            "/api/auth/signup",
            json!({ "email": "not-an-email", "password": "short" }),
        )
        .await;
    assert_eq!(response.status(), 400);

    let body = common::body_json(response).await;
    assert_eq!(
        body["error"]["message"],
        "email: Invalid email format, password: Password must be between 8 and 100 characters"
    );
    Ok(())
}

#[tokio::test]
async fn unparseable_body_gets_the_generic_format_message() -> Result<()> {
    let app = common::TestApp::spawn();

    let response = app
        .request(
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/auth/signup")
                .header("content-type", "application/json")
                .body(axum::body::Body::from("{definitely not json"))?,
        )
        .await;
    assert_eq!(response.status(), 400);

    let body = common::body_json(response).await;
    assert_eq!(body["error"]["type"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "Invalid JSON format");
    assert_eq!(app.monitor.total_operations(), 0);
    Ok(())
}

#[tokio::test]
async fn empty_body_is_invalid_json_not_a_panic() -> Result<()> {
    let app = common::TestApp::spawn();

    let response = app
        .request(
            axum::http::Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(axum::body::Body::empty())?,
        )
        .await;
    assert_eq!(response.status(), 400);

    let body = common::body_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid JSON format");
    Ok(())
}

#[tokio::test]
async fn query_strings_are_coerced_to_numbers() -> Result<()> {
    let app = common::TestApp::spawn();
    app.signup("a@example.com", "password123").await;
    let token = app.login_token("a@example.com", "password123").await;

    let response = app.get_auth("/api/user?page=1&limit=5", &token).await;
    assert_eq!(response.status(), 200);

    let body = common::body_json(response).await;
    assert_eq!(body["meta"]["pagination"]["page"], 1);
    assert_eq!(body["meta"]["pagination"]["limit"], 5);
    Ok(())
}

#[tokio::test]
async fn out_of_range_query_values_are_rejected_together() -> Result<()> {
    let app = common::TestApp::spawn();
    app.signup("a@example.com", "password123").await;
    let token = app.login_token("a@example.com", "password123").await;

    let response = app.get_auth("/api/user?page=0&limit=500", &token).await;
    assert_eq!(response.status(), 400);

    let body = common::body_json(response).await;
    assert_eq!(body["error"]["type"], "VALIDATION_ERROR");
    let message = body["error"]["message"].as_str().unwrap_or_default();
    assert!(message.contains("page: Page number must be at least 1"), "got: {message}");
    assert!(message.contains("limit: Limit must be between 1 and 100"), "got: {message}");
    Ok(())
}

#[tokio::test]
async fn non_numeric_query_is_the_generic_query_message() -> Result<()> {
    let app = common::TestApp::spawn();
    app.signup("a@example.com", "password123").await;
    let token = app.login_token("a@example.com", "password123").await;

    let response = app.get_auth("/api/user?page=abc", &token).await;
    assert_eq!(response.status(), 400);

    let body = common::body_json(response).await;
    assert_eq!(body["error"]["message"], "Invalid query parameters");
    Ok(())
}

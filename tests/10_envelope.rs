mod common;

use anyhow::Result;
use chrono::DateTime;

#[tokio::test]
async fn service_index_uses_the_envelope() -> Result<()> {
    let app = common::TestApp::spawn();

    let response = app.get("/").await;
    assert_eq!(response.status(), 200);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["name"], "Keel API");
    assert_eq!(body["data"]["environment"], "development");
    assert!(body["data"]["endpoints"].is_object());
    assert!(body.get("error").is_none(), "success envelope carries no error");

    let stamp = body["meta"]["timestamp"].as_str().expect("meta.timestamp");
    assert!(DateTime::parse_from_rfc3339(stamp).is_ok());
    Ok(())
}

#[tokio::test]
async fn health_reports_store_and_query_stats() -> Result<()> {
    let app = common::TestApp::spawn();

    let response = app.get("/api/health").await;
    assert_eq!(response.status(), 200);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "System is healthy");
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"]["healthy"], true);
    assert!(body["data"]["database"]["responseTimeMs"].is_u64());
    assert_eq!(body["data"]["queries"]["totalOperations"], 0);
    assert!(body["data"]["queries"]["topOperations"].as_array().is_some());
    Ok(())
}

#[tokio::test]
async fn health_counts_operations_after_traffic() -> Result<()> {
    let app = common::TestApp::spawn();
    app.signup("counted@example.com", "password123").await;

    let response = app.get("/api/health").await;
    let body = common::body_json(response).await;

    // signup runs one store create; the health probe itself is not counted
    assert_eq!(body["data"]["queries"]["totalOperations"], 1);
    let top = body["data"]["queries"]["topOperations"]
        .as_array()
        .expect("topOperations")
        .clone();
    assert_eq!(top[0]["operation"], "create_user");
    assert_eq!(top[0]["count"], 1);
    Ok(())
}

#[tokio::test]
async fn failed_health_check_is_503_with_report() -> Result<()> {
    let app = common::TestApp::with_failing_store();

    let response = app.get("/api/health").await;
    assert_eq!(response.status(), 503, "health failures are 503, not 500");

    let body = common::body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["type"], "SERVICE_ERROR");
    assert_eq!(body["error"]["message"], "System health check failed");
    assert_eq!(body["error"]["details"]["status"], "unhealthy");
    assert_eq!(body["error"]["details"]["database"]["healthy"], false);
    assert_eq!(
        body["error"]["details"]["database"]["error"],
        "connection pool closed"
    );
    Ok(())
}

#[tokio::test]
async fn store_failures_are_500_internal() -> Result<()> {
    let app = common::TestApp::with_failing_store();

    let response = app
        .post_json(
            "/api/auth/signup",
            serde_json::json!({ "email": "a@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(response.status(), 500);

    let body = common::body_json(response).await;
    assert_eq!(body["error"]["type"], "INTERNAL_ERROR");
    assert_eq!(
        body["error"]["message"],
        "An error occurred while processing your request"
    );
    Ok(())
}

#[tokio::test]
async fn docs_render_as_markdown_by_default() -> Result<()> {
    let app = common::TestApp::spawn();

    let response = app.get("/api/docs").await;
    assert_eq!(response.status(), 200);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/markdown"));

    let markdown = common::body_text(response).await;
    assert!(markdown.starts_with("# Keel API"));
    assert!(markdown.contains("### POST /api/auth/signup"));
    assert!(markdown.contains("**Rate Limit:**"));
    Ok(())
}

#[tokio::test]
async fn docs_render_as_json_on_request() -> Result<()> {
    let app = common::TestApp::spawn();

    let response = app.get("/api/docs?format=json").await;
    assert_eq!(response.status(), 200);

    let body = common::body_json(response).await;
    assert_eq!(body["success"], true);
    let endpoints = body["data"]["endpoints"].as_array().expect("endpoints");
    assert!(!endpoints.is_empty());

    // Registry renders sorted by path, then method
    let paths: Vec<&str> = endpoints
        .iter()
        .map(|e| e["path"].as_str().unwrap_or_default())
        .collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);
    Ok(())
}

#[tokio::test]
async fn docs_reject_unknown_format() -> Result<()> {
    let app = common::TestApp::spawn();

    let response = app.get("/api/docs?format=xml").await;
    assert_eq!(response.status(), 400);

    let body = common::body_json(response).await;
    assert_eq!(body["error"]["type"], "VALIDATION_ERROR");
    Ok(())
}

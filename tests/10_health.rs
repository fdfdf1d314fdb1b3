mod common;

use anyhow::Result;
use axum::body::Body;
use axum::http::{Request, StatusCode};

#[tokio::test]
async fn health_is_ok_without_any_provider() -> Result<()> {
    let (status, body) = common::send(common::state(), common::get("/health")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert!(body["timestamp"].is_string(), "missing timestamp: {}", body);
    Ok(())
}

#[tokio::test]
async fn sb_health_reports_url_but_not_key() -> Result<()> {
    let mut config = common::config();
    config.supabase.anon_key = Some("secret-anon-key".to_string());

    let (status, body) = common::send(common::state_with(config), common::get("/sb/health")).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["url"], "https://demo.supabase.co");
    assert!(!body.to_string().contains("secret-anon-key"));
    Ok(())
}

#[tokio::test]
async fn cors_allows_configured_origin_with_credentials() -> Result<()> {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/get-name")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "GET")
        .body(Body::empty())?;

    let response = common::send_raw(common::state(), request).await?;
    let headers = response.headers();

    assert_eq!(headers["access-control-allow-origin"], "http://localhost:3000");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    Ok(())
}

#[tokio::test]
async fn cors_ignores_unknown_origin() -> Result<()> {
    let request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("origin", "https://evil.example.com")
        .body(Body::empty())?;

    let response = common::send_raw(common::state(), request).await?;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("access-control-allow-origin").is_none());
    Ok(())
}

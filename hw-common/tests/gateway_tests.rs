//! Query gateway tests against an in-process stand-in for the DoltHub API
//!
//! The fake endpoint answers `GET /api?q=<sql>` according to the SQL text:
//! - `SELECT ok` -> two rows
//! - `SELECT empty` -> envelope without `rows`
//! - `SELECT broken` -> invalid JSON
//! - `SELECT fail` -> HTTP 500

use axum::{extract::Query, http::StatusCode, routing::get, Router};
use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hw_common::{DoltHubGateway, GatewayError, QueryGateway};

#[derive(Deserialize)]
struct Params {
    q: String,
}

/// Start the fake endpoint; returns its API base and a request counter
async fn start_fake_dolthub() -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().route(
        "/api",
        get(move |Query(params): Query<Params>| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                match params.q.as_str() {
                    "SELECT ok" => (
                        StatusCode::OK,
                        r#"{"query_execution_status":"Success","rows":[{"version":"v1","total":"3"},{"version":"v2","total":null}]}"#.to_string(),
                    ),
                    "SELECT empty" => (StatusCode::OK, r#"{"query_execution_status":"Success"}"#.to_string()),
                    "SELECT broken" => (StatusCode::OK, "<html>not json</html>".to_string()),
                    _ => (StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
                }
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}/api"), hits)
}

// =============================================================================
// Row parsing
// =============================================================================

#[tokio::test]
async fn test_rows_are_parsed() {
    let (base, _) = start_fake_dolthub().await;
    let gateway = DoltHubGateway::new(base).unwrap();

    let rows = gateway.query("SELECT ok").await;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get("version").as_deref(), Some("v1"));
    assert_eq!(rows[0].get_i64("total"), Some(3));
    assert_eq!(rows[1].get("total"), None);
}

#[tokio::test]
async fn test_missing_rows_is_empty() {
    let (base, _) = start_fake_dolthub().await;
    let gateway = DoltHubGateway::new(base).unwrap();
    assert!(gateway.try_query("SELECT empty").await.unwrap().is_empty());
}

// =============================================================================
// Failures resolve to empty through `query`, errors through `try_query`
// =============================================================================

#[tokio::test]
async fn test_server_error_is_empty_result() {
    let (base, _) = start_fake_dolthub().await;
    let gateway = DoltHubGateway::new(base).unwrap();

    assert!(gateway.query("SELECT fail").await.is_empty());
    match gateway.try_query("SELECT fail").await {
        Err(GatewayError::Status(500, body)) => assert_eq!(body, "boom"),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_is_empty_result() {
    let (base, _) = start_fake_dolthub().await;
    let gateway = DoltHubGateway::new(base).unwrap();

    assert!(gateway.query("SELECT broken").await.is_empty());
    assert!(matches!(
        gateway.try_query("SELECT broken").await,
        Err(GatewayError::Parse(_))
    ));
}

#[tokio::test]
async fn test_unreachable_endpoint_is_empty_result() {
    // Port 9 (discard) on localhost is closed in test environments
    let gateway = DoltHubGateway::new("http://127.0.0.1:9/api").unwrap();
    assert!(gateway.query("SELECT ok").await.is_empty());
    assert!(matches!(
        gateway.try_query("SELECT ok").await,
        Err(GatewayError::Network(_))
    ));
}

// =============================================================================
// Response cache
// =============================================================================

#[tokio::test]
async fn test_identical_sql_is_served_from_cache() {
    let (base, hits) = start_fake_dolthub().await;
    let gateway = DoltHubGateway::new(base).unwrap();

    gateway.query("SELECT ok").await;
    gateway.query("SELECT ok").await;
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    gateway.query("SELECT empty").await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failures_are_not_cached() {
    let (base, hits) = start_fake_dolthub().await;
    let gateway = DoltHubGateway::new(base).unwrap();

    gateway.query("SELECT fail").await;
    gateway.query("SELECT fail").await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_zero_ttl_disables_cache() {
    let (base, hits) = start_fake_dolthub().await;
    let gateway = DoltHubGateway::new(base).unwrap().with_cache_ttl(Duration::ZERO);

    gateway.query("SELECT ok").await;
    gateway.query("SELECT ok").await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_expired_entries_are_refetched() {
    let (base, hits) = start_fake_dolthub().await;
    let gateway = DoltHubGateway::new(base)
        .unwrap()
        .with_cache_ttl(Duration::from_millis(50));

    gateway.query("SELECT ok").await;
    tokio::time::sleep(Duration::from_millis(80)).await;
    gateway.query("SELECT ok").await;
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_sql_is_url_encoded() {
    let (base, _) = start_fake_dolthub().await;
    let gateway = DoltHubGateway::new(base.clone()).unwrap();

    let url = gateway.query_url("SELECT ok");
    // The fake decodes `q`; a mis-encoded query would not match
    assert_eq!(url, format!("{base}?q=SELECT%20ok"));
    assert_eq!(gateway.query("SELECT ok").await.len(), 2);
}

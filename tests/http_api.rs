//! HTTP API Tests
//!
//! Requests go through the full router built by `HttpServer`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use billvault::archive_index::CollectionArchiveIndex;
use billvault::cold_storage::MemoryColdStore;
use billvault::http_server::{HttpServer, HttpServerConfig};
use billvault::primary::CollectionPrimaryStore;
use billvault::tiering::{TieringConfig, TieringEngine};
use serde_json::{json, Value};
use tower::ServiceExt;

fn router() -> Router {
    let engine = TieringEngine::new(
        Arc::new(CollectionPrimaryStore::in_memory()),
        Arc::new(MemoryColdStore::new()),
        Arc::new(CollectionArchiveIndex::in_memory()),
        TieringConfig::new(90, 10),
    )
    .unwrap();
    HttpServer::new(HttpServerConfig::default(), Arc::new(engine)).router()
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_create_archive_read_restore_over_http() {
    let router = router();

    let (status, body) = call(
        &router,
        Method::POST,
        "/billing",
        Some(json!({
            "id": "inv-1",
            "customer_id": "cust-1",
            "amount": 120.0,
            "created_at": "2020-01-01T00:00:00Z",
            "due_date": "2020-02-01T00:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], "inv-1");

    let (status, body) = call(&router, Method::POST, "/archive/sync", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["archived_count"], 1);

    let (status, body) = call(&router, Method::GET, "/billing/inv-1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "archive_index");
    assert_eq!(body["data"]["amount"], 120.0);

    let (status, body) = call(&router, Method::GET, "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["archived_count"], 1);
    assert_eq!(body["primary_count"], 0);

    let (status, _) = call(&router, Method::POST, "/restore/inv-1", None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&router, Method::GET, "/billing/inv-1", None).await;
    assert_eq!(body["source"], "primary");
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn test_unknown_record_is_404_with_code() {
    let router = router();
    let (status, body) = call(&router, Method::GET, "/billing/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BILLVAULT_NOT_FOUND");
}

#[tokio::test]
async fn test_update_of_archived_record_conflicts() {
    let router = router();
    call(
        &router,
        Method::POST,
        "/billing",
        Some(json!({
            "id": "inv-1",
            "customer_id": "cust-1",
            "amount": 5.0,
            "created_at": "2020-01-01T00:00:00Z",
            "due_date": "2020-02-01T00:00:00Z"
        })),
    )
    .await;
    call(&router, Method::POST, "/archive/sync", None).await;

    let (status, body) = call(
        &router,
        Method::PUT,
        "/billing/inv-1",
        Some(json!({ "status": "paid" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "BILLVAULT_CONFLICT");
}

#[tokio::test]
async fn test_health_endpoint() {
    let router = router();
    let (status, _) = call(&router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
}

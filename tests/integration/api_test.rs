//! Integration tests for the HTTP API.

use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::{CountingProducer, TestApp};

#[tokio::test]
async fn test_get_path_value() {
    let app = TestApp::new();

    let response = app.get("/server/load").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("application/json"));
    assert_eq!(response.body, json!({"value": 42}));
}

#[tokio::test]
async fn test_url_maps_case_insensitively() {
    let app = TestApp::new();

    for url in ["/Server/Load", "/server.load", "/SERVER/LOAD/"] {
        let response = app.get(url).await;
        assert_eq!(response.status, StatusCode::OK, "url {url}");
        assert_eq!(response.body["value"], 42);
    }
}

#[tokio::test]
async fn test_repeated_queries_hit_cache() {
    let counter = Arc::new(CountingProducer::default());
    let app = TestApp::with_extra(|registry| {
        registry
            .register("switch.interfaces", counter.clone(), "Counting")
            .unwrap();
    });

    let first = app.get("/switch/interfaces").await;
    let second = app.get("/switch/interfaces").await;

    assert_eq!(first.body, json!({"n": 1}));
    assert_eq!(second.body, first.body);
    assert_eq!(counter.calls(), 1);
    assert_eq!(app.services.refresher.stats().hits, 1);
}

#[tokio::test]
async fn test_unknown_path_is_404() {
    let app = TestApp::new();

    let response = app.get("/no/such/path").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["error"], "NOT_FOUND");
    assert!(response.body["message"].as_str().unwrap().contains("no.such.path"));
    assert!(app.services.cache.get("no.such.path").await.unwrap().is_none());
}

#[tokio::test]
async fn test_failing_producer_is_502() {
    let failing = Arc::new(CountingProducer {
        fail: true,
        ..CountingProducer::default()
    });
    let app = TestApp::with_extra(|registry| {
        registry.register("mon.alerts", failing.clone(), "").unwrap();
    });

    let response = app.get("/mon/alerts").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert_eq!(response.body["error"], "PRODUCER_ERROR");

    // Other paths keep working.
    assert_eq!(app.get("/server/load").await.status, StatusCode::OK);
}

#[tokio::test]
async fn test_list_paths_in_registration_order() {
    let app = TestApp::new();

    let response = app.get("/api/paths").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(
        response.body["data"],
        json!([
            {"name": "server.load", "description": "Static load", "kind": "static"},
            {"name": "some.example.path", "description": "Clock", "kind": "clock"}
        ])
    );
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new();

    let response = app.get("/api/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_detailed_health() {
    let app = TestApp::new();
    app.get("/server/load").await;

    let response = app.get("/api/health/detailed").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["cache"], "connected");
    assert_eq!(data["cache_provider"], "memory");
    assert_eq!(data["paths"], 2);
    assert_eq!(data["ws_connections"], 0);
    assert_eq!(data["refresh"]["invocations"], 1);
}

#[tokio::test]
async fn test_ws_requires_upgrade() {
    let app = TestApp::new();

    let response = app.get("/ws").await;

    assert!(
        response.status.is_client_error(),
        "Expected a 4xx without upgrade headers, got {}",
        response.status
    );
}

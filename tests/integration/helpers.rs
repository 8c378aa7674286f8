//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use livepath_api::{AppState, build_router};
use livepath_cache::memory::MemoryCacheProvider;
use livepath_core::config::AppConfig;
use livepath_core::error::AppError;
use livepath_core::result::AppResult;
use livepath_core::traits::producer::Producer;
use livepath_realtime::RealtimeEngine;
use livepath_service::catalog::build_registry;
use livepath_service::{PathRegistry, RefreshSettings, ServiceContext};
use livepath_source::UpstreamClients;

/// Paths available in every test app.
pub const TEST_PATHS: &str = r#"
[[paths]]
name = "server.load"
description = "Static load"
source = { kind = "static", value = { value = 42 } }

[[paths]]
name = "some.example.path"
description = "Clock"
source = { kind = "clock" }
"#;

/// Producer counting its invocations; fails when `fail` is set.
#[derive(Debug, Default)]
pub struct CountingProducer {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl CountingProducer {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Producer for CountingProducer {
    fn kind(&self) -> &'static str {
        "counting"
    }

    async fn produce(&self) -> AppResult<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(AppError::external_service("upstream unreachable"));
        }
        Ok(serde_json::json!({ "n": n }))
    }
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Registry, cache, and refresher
    pub services: ServiceContext,
    /// Realtime engine
    pub realtime: RealtimeEngine,
}

impl TestApp {
    /// App with the standard test paths.
    pub fn new() -> Self {
        Self::with_extra(|_| {})
    }

    /// App with the standard test paths plus whatever `extra` registers.
    pub fn with_extra(extra: impl FnOnce(&mut PathRegistry)) -> Self {
        let config = AppConfig::from_toml(TEST_PATHS).expect("valid test config");
        let mut registry =
            build_registry(&config.paths, &UpstreamClients::default()).expect("registry");
        extra(&mut registry);

        let cache = Arc::new(MemoryCacheProvider::new(&config.cache.memory));
        let services = ServiceContext::new(
            registry,
            cache,
            RefreshSettings::from_config(&config.cache, &config.broadcast),
        );
        let realtime =
            RealtimeEngine::new(config.realtime.clone(), Arc::clone(&services.registry));

        let state = AppState::new(Arc::new(config), services.clone(), realtime.clone());

        Self {
            router: build_router(state),
            services,
            realtime,
        }
    }

    /// Make a GET request to the test app
    pub async fn get(&self, path: &str) -> TestResponse {
        let req = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            content_type,
            body,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Parsed JSON body
    pub body: Value,
}

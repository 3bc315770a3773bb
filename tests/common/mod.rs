#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use slidegraph::insight::InsightGenerator;
use slidegraph::pipeline::types::Theme;
use slidegraph::pipeline::SlideGenerator;
use slidegraph::server::{router, AppState, RateLimiter, Stats};
use slidegraph::store::InMemoryChartStore;

/// App state with no LLM client (insights always use the deterministic
/// fallback) and no rate limit.
pub fn test_state() -> AppState {
    test_state_with_rate_limit(0)
}

pub fn test_state_with_rate_limit(limit: u32) -> AppState {
    AppState {
        generator: Arc::new(SlideGenerator::new(
            InsightGenerator::new(None, Duration::from_secs(1)),
            Theme::Professional,
            String::new(),
        )),
        store: Arc::new(InMemoryChartStore::new()),
        stats: Arc::new(Stats::default()),
        rate_limiter: Arc::new(RateLimiter::new(limit)),
        request_timeout: Duration::from_secs(30),
    }
}

pub fn test_app() -> Router {
    router(test_state())
}

pub async fn post_json(app: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

pub fn data_points(pairs: &[(&str, f64)]) -> Value {
    Value::Array(
        pairs
            .iter()
            .map(|(label, value)| json!({ "label": label, "value": value }))
            .collect(),
    )
}

/// Minimal valid request body for the single-slide endpoint.
pub fn slide_body(slide_id: &str, narrative: &str, pairs: &[(&str, f64)]) -> Value {
    json!({
        "presentation_id": "pres-1",
        "slide_id": slide_id,
        "slide_number": 1,
        "narrative": narrative,
        "data": data_points(pairs),
    })
}

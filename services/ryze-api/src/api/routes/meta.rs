//! 健康检查、就绪探针与指标

use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use futures::future::join_all;
use ryze_common::HealthReport;
use serde::Serialize;
use serde_json::{Value, json};

use crate::api::state::AppState;

const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/metrics", get(metrics))
        .route("/api-test", get(api_test))
}

#[derive(Debug, Serialize)]
pub struct HealthOut {
    pub status: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthOut> {
    Json(HealthOut {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn ready(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let checks = join_all(state.health_checks.iter().map(|c| c.check(PROBE_TIMEOUT))).await;
    let report = HealthReport::from_checks(checks);
    let status = if report.ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

async fn api_test() -> Json<Value> {
    Json(json!({ "status": "ok", "message": "API endpoint working" }))
}

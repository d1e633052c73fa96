//! Common routes: health, readiness, version.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Paths served by [`common_routes`]; model endpoints may not claim them.
pub const COMMON_PATHS: [&str; 4] = ["/health", "/ready", "/version", "/info"];

#[derive(Serialize)]
struct HealthBody {
    status: &'static str,
}

async fn health() -> Json<HealthBody> {
    Json(HealthBody { status: "ok" })
}

async fn ready(State(ready): State<Arc<AtomicBool>>) -> Result<Json<HealthBody>, (StatusCode, Json<HealthBody>)> {
    if !ready.load(Ordering::Acquire) {
        return Err((StatusCode::SERVICE_UNAVAILABLE, Json(HealthBody { status: "stopping" })));
    }
    Ok(Json(HealthBody { status: "ok" }))
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// GET /health, GET /ready, GET /version, GET /info. `/ready` answers 503 once the flag is cleared.
pub fn common_routes(ready_flag: Arc<AtomicBool>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready))
        .route("/version", get(version))
        .route("/info", get(version))
        .with_state(ready_flag)
}

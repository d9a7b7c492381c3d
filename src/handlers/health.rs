use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde_json::{json, Value};

use crate::AppState;

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "boga-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Readiness probe: the service is ready once Postgres answers.
pub async fn readyz(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let started = Instant::now();
    let ping = sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(&state.db)
        .await;
    let latency_ms = started.elapsed().as_millis() as u64;

    match ping {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "status": "ready",
                "checks": { "database": { "status": "ok", "latency_ms": latency_ms } },
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, latency_ms, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "not_ready",
                    "checks": { "database": { "status": "failed" } },
                })),
            )
        }
    }
}

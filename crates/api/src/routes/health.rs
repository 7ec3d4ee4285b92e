//! Health check endpoint.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Which store backend serves this instance: `postgres` or `in-memory`.
    pub storage: &'static str,
}

/// GET /health: liveness plus the active storage backend.
pub async fn check(State(storage): State<&'static str>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        storage,
    })
}

//! GET /health - liveness probe

use axum::routing::get;
use axum::{Json, Router};

use crate::models::{ApiResponse, HealthStatus};

/// Build the health router.
pub fn router() -> Router {
    Router::new().route("/health", get(health))
}

async fn health() -> Json<ApiResponse<HealthStatus>> {
    Json(ApiResponse::ok(HealthStatus { status: "ok" }))
}

//! Health Check API Handler
//!
//! Liveness endpoint. Reports the server's local clock, which is the
//! frame every stored timestamp is interpreted in.

use axum::{Json, http::StatusCode, response::IntoResponse};
use loglens_core::domain::time::{local_now, local_offset_description};

/// GET /health
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "OK",
            "localTime": local_now(),
            "utcOffset": local_offset_description(),
        })),
    )
}

//! Health endpoint.

use axum::{http::StatusCode, response::Response};

use super::json_response;

/// GET /health - liveness probe
pub async fn health_handler() -> Response {
    json_response(
        StatusCode::OK,
        &serde_json::json!({
            "status": "ok",
            "service": "features-api",
        }),
    )
}

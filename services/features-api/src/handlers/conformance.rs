//! Conformance declaration handler.

use axum::{extract::Extension, http::StatusCode, response::Response};
use std::sync::Arc;

use features_protocol::ConformanceClasses;

use crate::state::AppState;

use super::json_response;

/// GET {context}/conformance - declared conformance classes
pub async fn conformance_handler(Extension(_state): Extension<Arc<AppState>>) -> Response {
    json_response(StatusCode::OK, &ConformanceClasses::current())
}

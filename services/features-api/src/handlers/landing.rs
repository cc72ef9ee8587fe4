//! Landing page handler.

use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;

use features_protocol::LandingPage;

use crate::state::AppState;

use super::json_response;

/// GET {context} - API landing page
pub async fn landing_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let landing = LandingPage::new(
        &state.config.title,
        &state.config.description,
        &state.base_url(&headers),
    );
    json_response(StatusCode::OK, &landing)
}

//! Features API service library.
//!
//! Exposes the router so integration tests can drive the full HTTP stack
//! without binding a socket.

pub mod config;
pub mod handlers;
pub mod sink;
pub mod state;

use axum::{routing::get, Extension, Router};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router for the given state.
pub fn app(state: Arc<AppState>) -> Router {
    let ctx = state.config.context_path.clone();
    let landing_path = if ctx.is_empty() { "/".to_string() } else { ctx.clone() };

    let mut router = Router::new()
        // Landing page
        .route(&landing_path, get(handlers::landing::landing_handler))
        // Conformance
        .route(
            &format!("{}/conformance", ctx),
            get(handlers::conformance::conformance_handler),
        )
        // Collections
        .route(
            &format!("{}/collections", ctx),
            get(handlers::collections::list_collections_handler),
        )
        .route(
            &format!("{}/collections/:collection_id", ctx),
            get(handlers::collections::get_collection_handler),
        )
        // Features
        .route(
            &format!("{}/collections/:collection_id/items", ctx),
            get(handlers::items::items_handler),
        )
        .route(
            &format!("{}/collections/:collection_id/items/:feature_id", ctx),
            get(handlers::items::get_feature_handler),
        )
        // Health
        .route("/health", get(handlers::health::health_handler));

    if !ctx.is_empty() {
        // Landing page with trailing slash
        router = router.route(&format!("{}/", ctx), get(handlers::landing::landing_handler));
    }

    router
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
}

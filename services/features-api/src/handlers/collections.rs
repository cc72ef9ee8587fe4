//! Collection metadata handlers.

use axum::{
    extract::{Extension, Path},
    http::{HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;

use features_protocol::{media_types, CollectionInfo, CollectionList, ExceptionResponse, Link};

use crate::state::AppState;

use super::{error_response, json_response};

/// Clone the backend-declared metadata and add the protocol links the API
/// itself owns.
fn with_protocol_links(info: &CollectionInfo, base_url: &str) -> CollectionInfo {
    let mut info = info.clone();
    info.links.push(
        Link::new(format!("{}/collections/{}", base_url, info.id), "self")
            .with_type(media_types::JSON)
            .with_title("Collection metadata"),
    );
    info.links.push(
        Link::new(
            format!("{}/collections/{}/items", base_url, info.id),
            "items",
        )
        .with_type(media_types::GEO_JSON)
        .with_title("Features in this collection"),
    );
    info
}

/// GET {context}/collections - list all collections
pub async fn list_collections_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
) -> Response {
    let base_url = state.base_url(&headers);

    let list = CollectionList {
        links: vec![Link::new(format!("{}/collections", base_url), "self")
            .with_type(media_types::JSON)
            .with_title("Metadata about the feature collections")],
        collections: state
            .server
            .collections()
            .iter()
            .map(|c| with_protocol_links(c.info(), &base_url))
            .collect(),
    };

    json_response(StatusCode::OK, &list)
}

/// GET {context}/collections/:collection_id - single collection metadata
pub async fn get_collection_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(collection_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    let Some(collection) = state.server.collection(&collection_id) else {
        return error_response(ExceptionResponse::not_found(format!(
            "Collection not found: {}",
            collection_id
        )));
    };

    let info = with_protocol_links(collection.info(), &state.base_url(&headers));
    json_response(StatusCode::OK, &info)
}

//! Feature query handlers: the streamed items endpoint and single-feature
//! lookup.

use axum::{
    body::Body,
    extract::{Extension, Path, Query},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tokio::sync::mpsc;

use features_protocol::{
    media_types, CancellationToken, ExceptionResponse, FeatureCollectionStream, Link,
    RequestParameters, StreamOutcome,
};

use crate::config::ServiceConfig;
use crate::sink::{BodyStream, ChannelSink, SinkEvent};
use crate::state::AppState;

use super::error_response;

/// Size of the chunk channel between producer and response body; keeps a
/// slow client from pulling the whole backend cursor into memory.
const CHUNK_CHANNEL_CAPACITY: usize = 16;

fn parse_limit(params: &RequestParameters, config: &ServiceConfig) -> Result<usize, Response> {
    match params.get_ci("limit") {
        None => Ok(config.default_limit),
        Some(raw) => match raw.parse::<usize>() {
            Ok(limit) if limit >= 1 && limit <= config.max_limit => Ok(limit),
            _ => Err(error_response(ExceptionResponse::bad_request(format!(
                "Invalid limit '{}': expected an integer between 1 and {}",
                raw, config.max_limit
            )))),
        },
    }
}

/// GET {context}/collections/:collection_id/items - query features
///
/// The response is streamed: the producer task pulls from the backend
/// cursor and writes through a channel that the response body drains.
pub async fn items_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path(collection_id): Path<String>,
    Query(raw_params): Query<Vec<(String, String)>>,
    headers: HeaderMap,
) -> Response {
    let Some(collection) = state.server.collection(&collection_id) else {
        return error_response(ExceptionResponse::not_found(format!(
            "Collection not found: {}",
            collection_id
        )));
    };
    let info = collection.info().clone();

    let params = RequestParameters::from_pairs(raw_params);
    let limit = match parse_limit(&params, &state.config) {
        Ok(limit) => limit,
        Err(response) => return response,
    };
    let next_token = params.get_ci("nexttoken").map(str::to_string);

    let query = match state
        .server
        .parse_query(&info, &params, limit, next_token)
        .await
    {
        Ok(query) => query,
        Err(e) => return error_response(e.to_exception()),
    };

    let mut cursor = match state.server.execute_query(&query).await {
        Ok(cursor) => cursor,
        Err(e) => return error_response(e.to_exception()),
    };

    let items_url = format!(
        "{}/collections/{}/items",
        state.base_url(&headers),
        collection_id
    );

    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(CHUNK_CHANNEL_CAPACITY);
    let sink = ChannelSink::new(tx, cancel.clone());

    let producer_cancel = cancel.clone();
    tokio::spawn(async move {
        let producer = FeatureCollectionStream::new(sink, items_url);
        match producer.run(&query, &mut cursor, &producer_cancel).await {
            StreamOutcome::Completed { number_returned } => {
                tracing::debug!(
                    collection = %query.collection_id,
                    number_returned,
                    "feature query completed"
                );
            }
            StreamOutcome::Failed { number_returned } => {
                tracing::warn!(
                    collection = %query.collection_id,
                    number_returned,
                    "feature query failed mid-stream"
                );
            }
            StreamOutcome::Cancelled { number_returned } => {
                tracing::debug!(
                    collection = %query.collection_id,
                    number_returned,
                    "client disconnected, query abandoned"
                );
            }
        }
    });

    // The producer always writes the head before any chunk
    let Some(SinkEvent::Head {
        status,
        content_type,
    }) = rx.recv().await
    else {
        return error_response(ExceptionResponse::internal_error(
            "stream produced no output",
        ));
    };

    Response::builder()
        .status(StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR))
        .header(header::CONTENT_TYPE, content_type)
        .body(Body::from_stream(BodyStream::new(rx, cancel)))
        .unwrap_or_default()
}

/// GET {context}/collections/:collection_id/items/:feature_id - single
/// feature lookup
pub async fn get_feature_handler(
    Extension(state): Extension<Arc<AppState>>,
    Path((collection_id, feature_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    let Some(collection) = state.server.collection(&collection_id) else {
        return error_response(ExceptionResponse::not_found(format!(
            "Collection not found: {}",
            collection_id
        )));
    };

    let feature = match collection.feature_by_id(&feature_id).await {
        Ok(Some(feature)) => feature,
        Ok(None) => {
            return error_response(ExceptionResponse::not_found(format!(
                "Feature not found: {}",
                feature_id
            )));
        }
        Err(e) => {
            return error_response(ExceptionResponse::internal_error(e.to_string()));
        }
    };

    let base_url = state.base_url(&headers);
    let links = vec![
        Link::new(
            format!(
                "{}/collections/{}/items/{}",
                base_url, collection_id, feature_id
            ),
            "self",
        )
        .with_type(media_types::GEO_JSON),
        Link::new(format!("{}/collections/{}", base_url, collection_id), "collection")
            .with_type(media_types::JSON),
    ];

    // The links member rides along in the GeoJSON document
    let mut document = match serde_json::to_value(&feature) {
        Ok(value) => value,
        Err(e) => {
            return error_response(ExceptionResponse::internal_error(format!(
                "feature serialization failed: {}",
                e
            )));
        }
    };
    if let Some(object) = document.as_object_mut() {
        object.insert(
            "links".to_string(),
            serde_json::to_value(&links).unwrap_or_default(),
        );
    }

    let json = document.to_string();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media_types::GEO_JSON)
        .body(Body::from(json))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_limit_default_and_bounds() {
        let config = ServiceConfig::default();

        let none = RequestParameters::new();
        assert_eq!(parse_limit(&none, &config).unwrap(), config.default_limit);

        let explicit = RequestParameters::from_pairs(vec![("limit", "25")]);
        assert_eq!(parse_limit(&explicit, &config).unwrap(), 25);

        for bad in ["0", "-3", "ten", "1000000"] {
            let params = RequestParameters::from_pairs(vec![("limit", bad)]);
            assert!(parse_limit(&params, &config).is_err(), "limit {}", bad);
        }
    }
}

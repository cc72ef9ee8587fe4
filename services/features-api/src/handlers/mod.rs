//! HTTP request handlers.

pub mod collections;
pub mod conformance;
pub mod health;
pub mod items;
pub mod landing;

use axum::{
    body::Body,
    http::{header, StatusCode},
    response::Response,
};
use serde::Serialize;

use features_protocol::{media_types, ExceptionResponse};

/// Build a JSON response with the given status.
pub(crate) fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, media_types::JSON)
        .body(Body::from(json))
        .unwrap_or_default()
}

/// Build an exception-document response; the status comes from the
/// exception itself.
pub(crate) fn error_response(exception: ExceptionResponse) -> Response {
    let status = exception
        .status
        .and_then(|s| StatusCode::from_u16(s).ok())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, &exception)
}

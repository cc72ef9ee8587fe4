//! Top-level error taxonomy for the query engine.

use thiserror::Error;

use crate::cursor::BackendError;
use crate::filters::FilterParseError;
use crate::responses::ExceptionResponse;

/// Errors that can occur while resolving and executing a feature query.
#[derive(Debug, Error)]
pub enum FeaturesError {
    /// Collection not found.
    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    /// Feature not found.
    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    /// Invalid query parameter (limit out of range etc.).
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Request parameters could not be turned into filters.
    #[error(transparent)]
    FilterParse(#[from] FilterParseError),

    /// The backend failed before or while producing items.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl FeaturesError {
    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            FeaturesError::CollectionNotFound(_) => 404,
            FeaturesError::FeatureNotFound(_) => 404,
            FeaturesError::InvalidParameter(_) => 400,
            FeaturesError::FilterParse(_) => 400,
            FeaturesError::Backend(_) => 500,
        }
    }

    /// Convert to an ExceptionResponse.
    pub fn to_exception(&self) -> ExceptionResponse {
        match self {
            FeaturesError::CollectionNotFound(msg) => ExceptionResponse::not_found(msg),
            FeaturesError::FeatureNotFound(msg) => ExceptionResponse::not_found(msg),
            FeaturesError::InvalidParameter(msg) => ExceptionResponse::bad_request(msg),
            FeaturesError::FilterParse(e) => ExceptionResponse::bad_request(e.to_string()),
            FeaturesError::Backend(e) => ExceptionResponse::internal_error(e.to_string()),
        }
    }
}

//! API metadata response types.
//!
//! This module contains types for the landing page, conformance
//! declaration and exception documents.

use serde::{Deserialize, Serialize};

use crate::conformance;
use crate::types::Link;

/// Landing page response for the API root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LandingPage {
    /// Title of the API.
    pub title: String,

    /// Description of the API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Links to related resources.
    pub links: Vec<Link>,
}

impl LandingPage {
    /// Create a new landing page with standard links.
    pub fn new(title: impl Into<String>, description: impl Into<String>, base_url: &str) -> Self {
        let links = vec![
            Link::new(base_url, "self")
                .with_type("application/json")
                .with_title("This document"),
            Link::new(format!("{}/conformance", base_url), "conformance")
                .with_type("application/json")
                .with_title("Conformance classes implemented by this server"),
            Link::new(format!("{}/collections", base_url), "data")
                .with_type("application/json")
                .with_title("Metadata about the feature collections"),
        ];

        Self {
            title: title.into(),
            description: Some(description.into()),
            links,
        }
    }
}

/// Conformance declaration response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConformanceClasses {
    /// List of conformance class URIs.
    #[serde(rename = "conformsTo")]
    pub conforms_to: Vec<String>,
}

impl ConformanceClasses {
    /// Create conformance classes for the current implementation.
    pub fn current() -> Self {
        Self {
            conforms_to: vec![
                conformance::CORE.to_string(),
                conformance::GEOJSON.to_string(),
            ],
        }
    }

    /// Check if a conformance class is declared.
    pub fn contains(&self, class: &str) -> bool {
        self.conforms_to.iter().any(|c| c == class)
    }
}

/// Exception response for errors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExceptionResponse {
    /// Exception type identifier.
    #[serde(rename = "type")]
    pub type_: String,

    /// Human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// HTTP status code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Detailed error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ExceptionResponse {
    /// Create a new exception response.
    pub fn new(type_: impl Into<String>, status: u16, detail: impl Into<String>) -> Self {
        Self {
            type_: type_.into(),
            title: None,
            status: Some(status),
            detail: Some(detail.into()),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Create a 404 Not Found exception.
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(
            "http://www.opengis.net/def/exceptions/ogcapi-features-1/1.0/not-found",
            404,
            detail,
        )
        .with_title("Not Found")
    }

    /// Create a 400 Bad Request exception.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(
            "http://www.opengis.net/def/exceptions/ogcapi-features-1/1.0/invalid-parameter-value",
            400,
            detail,
        )
        .with_title("Bad Request")
    }

    /// Create a 500 Internal Server Error exception.
    pub fn internal_error(detail: impl Into<String>) -> Self {
        Self::new(
            "http://www.opengis.net/def/exceptions/ogcapi-features-1/1.0/server-error",
            500,
            detail,
        )
        .with_title("Internal Server Error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landing_page() {
        let landing = LandingPage::new(
            "Feature API",
            "An OGC API Features service",
            "http://localhost:3000/features",
        );

        assert_eq!(landing.title, "Feature API");
        assert!(landing.links.iter().any(|l| l.rel == "self"));
        assert!(landing.links.iter().any(|l| l.rel == "conformance"));
        assert!(landing.links.iter().any(|l| l.rel == "data"));
    }

    #[test]
    fn test_conformance_current() {
        let conf = ConformanceClasses::current();
        assert!(conf.contains(conformance::CORE));
        assert!(conf.contains(conformance::GEOJSON));

        let json = serde_json::to_string(&conf).unwrap();
        assert!(json.contains("\"conformsTo\""));
        assert!(json.contains("conf/core"));
    }

    #[test]
    fn test_exception_not_found() {
        let exc = ExceptionResponse::not_found("Collection not found: missing");

        assert_eq!(exc.status, Some(404));
        assert_eq!(exc.title, Some("Not Found".to_string()));
        assert!(exc.detail.unwrap().contains("missing"));
    }

    #[test]
    fn test_exception_serialization() {
        let exc = ExceptionResponse::bad_request("Illegal bounding box");
        let json = serde_json::to_string(&exc).unwrap();

        assert!(json.contains("\"status\":400"));
        assert!(json.contains("\"title\":\"Bad Request\""));
        assert!(json.contains("invalid-parameter-value"));
    }
}

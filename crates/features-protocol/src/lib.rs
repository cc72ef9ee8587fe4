//! OGC API - Features query engine.
//!
//! This crate implements the machinery between pluggable, partially-capable
//! feature backends and an HTTP client:
//!
//! - a filter chain that turns request parameters into predicates with a
//!   canonical query-string serialization ([`filters`])
//! - the query/cursor contracts backends implement ([`query`], [`cursor`],
//!   [`server`])
//! - a lazy filtered cursor that transparently applies whatever filtering a
//!   backend declined to do ([`cursor::FilteredFeatureCursor`])
//! - a streaming feature-collection producer that writes paginated GeoJSON
//!   output incrementally ([`stream`])
//!
//! # Example
//!
//! ```rust
//! use features_protocol::{CollectionInfo, Property, PropertyType};
//!
//! let info = CollectionInfo::new("observations")
//!     .with_title("Weather observations")
//!     .with_property(Property::new("station", PropertyType::String));
//! ```

pub mod collections;
pub mod cursor;
pub mod errors;
pub mod filters;
pub mod query;
pub mod responses;
pub mod server;
pub mod stream;
pub mod types;

// Re-export commonly used types
pub use collections::{CollectionInfo, CollectionList, Property, PropertyType, QueryParameter};
pub use cursor::{BackendError, FeatureCursor, FilteredFeatureCursor};
pub use errors::FeaturesError;
pub use filters::{
    Filter, FilterChain, FilterParseError, FilterProvider, FilterRef, is_reserved_parameter,
};
pub use query::{Item, Query, RequestParameters};
pub use responses::{ConformanceClasses, ExceptionResponse, LandingPage};
pub use server::{AuthorizerProvider, Backend, Collection, Server};
pub use stream::{CancellationToken, FeatureCollectionStream, ResponseSink, StreamOutcome};
pub use types::{Extent, Link, SpatialExtent, TemporalExtent};

/// OGC API - Features conformance class URIs
pub mod conformance {
    /// Core conformance class
    pub const CORE: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/core";
    /// OpenAPI 3.0 conformance class
    pub const OAS30: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/oas30";
    /// GeoJSON conformance class
    pub const GEOJSON: &str = "http://www.opengis.net/spec/ogcapi-features-1/1.0/conf/geojson";
}

/// Media types used in responses
pub mod media_types {
    /// GeoJSON media type
    pub const GEO_JSON: &str = "application/geo+json";
    /// JSON media type
    pub const JSON: &str = "application/json";
}

//! Shared geospatial primitives for the features workspace.
//!
//! This crate holds the types that both the protocol engine and backend
//! implementations need: bounding boxes, GeoJSON geometry and features,
//! and RFC 3339 / ISO 8601 time parsing.

pub mod bbox;
pub mod feature;
pub mod time;

pub use bbox::{BboxParseError, BoundingBox};
pub use feature::{Feature, FeatureId, Geometry};
pub use time::{parse_rfc3339, recognize_datetime, IsoDuration, TimeInterval, TimeParseError};

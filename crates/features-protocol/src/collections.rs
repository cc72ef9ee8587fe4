//! Collection metadata types.
//!
//! A collection's metadata is declared by the backend that owns it; the
//! query engine only reads it, both to answer the `/collections` endpoints
//! and to decide which request parameters map to property filters.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{Extent, Link};

/// The declared type of a feature property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyType {
    String,
    Number,
    Boolean,
    Date,
    Object,
    Array,
}

/// A feature property declared by a collection.
///
/// Property names are matched case-insensitively against request
/// parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Property {
    /// The property name as it appears on features.
    pub name: String,

    /// The declared value type.
    #[serde(rename = "type")]
    pub type_: PropertyType,

    /// A human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Example values for documentation purposes.
    #[serde(rename = "exampleValues", skip_serializing_if = "Option::is_none")]
    pub example_values: Option<Vec<Value>>,
}

impl Property {
    /// Create a new property declaration.
    pub fn new(name: impl Into<String>, type_: PropertyType) -> Self {
        Self {
            name: name.into(),
            type_,
            description: None,
            example_values: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set example values.
    pub fn with_example_values(mut self, values: Vec<Value>) -> Self {
        self.example_values = Some(values);
        self
    }
}

/// A backend-specific query parameter with no corresponding feature
/// property (a search knob the backend interprets itself).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryParameter {
    /// The parameter name.
    pub name: String,

    /// A human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl QueryParameter {
    /// Create a new additional query parameter declaration.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Metadata for a feature collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionInfo {
    /// Collection identifier, unique across all registered backends.
    pub id: String,

    /// A human-readable title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// A human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Non-protocol links for the collection (producer websites etc.);
    /// the API adds the protocol links itself.
    #[serde(default)]
    pub links: Vec<Link>,

    /// The spatial and temporal extent of the collection.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extent: Option<Extent>,

    /// Coordinate reference system of the collection's geometries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crs: Option<String>,

    /// Feature properties available for filtering.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub properties: Vec<Property>,

    /// Backend-specific query parameters with no feature property.
    #[serde(
        rename = "additionalQueryParameters",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub additional_query_parameters: Vec<QueryParameter>,

    /// Restricts the time filter to these property names; when absent,
    /// every date-time valued property participates.
    #[serde(rename = "timePropertyNames", skip_serializing_if = "Option::is_none")]
    pub time_property_names: Option<Vec<String>>,
}

impl CollectionInfo {
    /// Create a new collection with the given identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            description: None,
            links: Vec::new(),
            extent: None,
            crs: None,
            properties: Vec::new(),
            additional_query_parameters: Vec::new(),
            time_property_names: None,
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Add a non-protocol link.
    pub fn with_link(mut self, link: Link) -> Self {
        self.links.push(link);
        self
    }

    /// Set the extent.
    pub fn with_extent(mut self, extent: Extent) -> Self {
        self.extent = Some(extent);
        self
    }

    /// Set the CRS.
    pub fn with_crs(mut self, crs: impl Into<String>) -> Self {
        self.crs = Some(crs.into());
        self
    }

    /// Declare a filterable property.
    pub fn with_property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Declare a backend-specific query parameter.
    pub fn with_additional_query_parameter(mut self, parameter: QueryParameter) -> Self {
        self.additional_query_parameters.push(parameter);
        self
    }

    /// Restrict the time filter to the given property names.
    pub fn with_time_property_names(mut self, names: Vec<String>) -> Self {
        self.time_property_names = Some(names);
        self
    }

    /// Check whether a lower-cased parameter name matches a declared
    /// property.
    pub fn has_property(&self, lowercase_name: &str) -> bool {
        self.properties
            .iter()
            .any(|p| p.name.to_lowercase() == lowercase_name)
    }

    /// Check whether a lower-cased parameter name matches a declared
    /// additional query parameter.
    pub fn has_additional_query_parameter(&self, lowercase_name: &str) -> bool {
        self.additional_query_parameters
            .iter()
            .any(|p| p.name.to_lowercase() == lowercase_name)
    }
}

/// Response document for the collections listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionList {
    /// Links for the listing itself.
    pub links: Vec<Link>,

    /// All registered collections.
    pub collections: Vec<CollectionInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_builder() {
        let info = CollectionInfo::new("observations")
            .with_title("Weather observations")
            .with_property(Property::new("station", PropertyType::String))
            .with_property(Property::new("temperature", PropertyType::Number))
            .with_additional_query_parameter(QueryParameter::new("search"));

        assert_eq!(info.id, "observations");
        assert_eq!(info.properties.len(), 2);
        assert!(info.has_property("station"));
        assert!(info.has_additional_query_parameter("search"));
        assert!(!info.has_property("search"));
    }

    #[test]
    fn test_property_matching_uses_lowercase_names() {
        let info = CollectionInfo::new("c")
            .with_property(Property::new("observedTime", PropertyType::Date));

        assert!(info.has_property("observedtime"));
        assert!(!info.has_property("observedTime"));
    }

    #[test]
    fn test_collection_serialization() {
        let info = CollectionInfo::new("observations")
            .with_title("Observations")
            .with_property(Property::new("station", PropertyType::String))
            .with_time_property_names(vec!["observedTime".to_string()]);

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"id\":\"observations\""));
        assert!(json.contains("\"type\":\"string\""));
        assert!(json.contains("\"timePropertyNames\":[\"observedTime\"]"));
        assert!(!json.contains("additionalQueryParameters"));
    }
}

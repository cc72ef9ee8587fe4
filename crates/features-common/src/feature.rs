//! GeoJSON feature and geometry types.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::bbox::BoundingBox;

/// A feature identifier, either a string or an integer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureId {
    String(String),
    Integer(i64),
}

impl From<&str> for FeatureId {
    fn from(value: &str) -> Self {
        FeatureId::String(value.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(value: String) -> Self {
        FeatureId::String(value)
    }
}

impl From<i64> for FeatureId {
    fn from(value: i64) -> Self {
        FeatureId::Integer(value)
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeatureId::String(s) => write!(f, "{}", s),
            FeatureId::Integer(i) => write!(f, "{}", i),
        }
    }
}

/// A GeoJSON feature as produced by a backend.
///
/// Properties keep their backend-supplied order. Backends own the feature;
/// the query engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    /// Type identifier (always "Feature").
    #[serde(rename = "type", default = "feature_type")]
    pub type_: String,

    /// Optional feature identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<FeatureId>,

    /// The geometry of this feature.
    pub geometry: Geometry,

    /// Feature properties in backend order.
    #[serde(default)]
    pub properties: Map<String, Value>,
}

fn feature_type() -> String {
    "Feature".to_string()
}

impl Feature {
    /// Create a new feature with the given geometry and no properties.
    pub fn new(geometry: Geometry) -> Self {
        Self {
            type_: feature_type(),
            id: None,
            geometry,
            properties: Map::new(),
        }
    }

    /// Set the feature ID.
    pub fn with_id(mut self, id: impl Into<FeatureId>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Add a property.
    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    /// Look up a property by case-insensitive name.
    pub fn property_ci(&self, name: &str) -> Option<&Value> {
        self.properties
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v)
    }
}

/// GeoJSON geometry.
///
/// Positions are kept as raw coordinate arrays so that 3-D positions pass
/// through untouched; only the first two ordinates are interpreted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Vec<f64> },
    MultiPoint { coordinates: Vec<Vec<f64>> },
    LineString { coordinates: Vec<Vec<f64>> },
    MultiLineString { coordinates: Vec<Vec<Vec<f64>>> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Vec<f64>>>> },
}

impl Geometry {
    /// Create a 2-D point geometry.
    pub fn point(lon: f64, lat: f64) -> Self {
        Geometry::Point {
            coordinates: vec![lon, lat],
        }
    }

    /// Create a polygon geometry from a single exterior ring.
    pub fn polygon(ring: Vec<Vec<f64>>) -> Self {
        Geometry::Polygon {
            coordinates: vec![ring],
        }
    }

    /// The 2-D bounds of this geometry, or `None` for an empty geometry.
    pub fn bounds(&self) -> Option<BoundingBox> {
        let mut acc: Option<BoundingBox> = None;
        self.for_each_position(&mut |pos| {
            if pos.len() >= 2 {
                match acc.as_mut() {
                    Some(bbox) => bbox.extend(pos[0], pos[1]),
                    None => acc = Some(BoundingBox::from_point(pos[0], pos[1])),
                }
            }
        });
        acc
    }

    fn for_each_position(&self, f: &mut impl FnMut(&[f64])) {
        match self {
            Geometry::Point { coordinates } => f(coordinates),
            Geometry::MultiPoint { coordinates } | Geometry::LineString { coordinates } => {
                for pos in coordinates {
                    f(pos);
                }
            }
            Geometry::MultiLineString { coordinates } | Geometry::Polygon { coordinates } => {
                for line in coordinates {
                    for pos in line {
                        f(pos);
                    }
                }
            }
            Geometry::MultiPolygon { coordinates } => {
                for polygon in coordinates {
                    for ring in polygon {
                        for pos in ring {
                            f(pos);
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_bounds() {
        let bounds = Geometry::point(-97.5, 35.2).bounds().unwrap();
        assert_eq!(bounds.min_x, -97.5);
        assert_eq!(bounds.max_x, -97.5);
        assert_eq!(bounds.min_y, 35.2);
        assert_eq!(bounds.max_y, 35.2);
    }

    #[test]
    fn test_polygon_bounds() {
        let geometry = Geometry::polygon(vec![
            vec![0.0, 0.0],
            vec![4.0, 0.0],
            vec![4.0, 3.0],
            vec![0.0, 3.0],
            vec![0.0, 0.0],
        ]);
        let bounds = geometry.bounds().unwrap();
        assert_eq!(bounds.min_x, 0.0);
        assert_eq!(bounds.min_y, 0.0);
        assert_eq!(bounds.max_x, 4.0);
        assert_eq!(bounds.max_y, 3.0);
    }

    #[test]
    fn test_empty_geometry_has_no_bounds() {
        let geometry = Geometry::MultiPoint {
            coordinates: vec![],
        };
        assert!(geometry.bounds().is_none());
    }

    #[test]
    fn test_feature_serialization() {
        let feature = Feature::new(Geometry::point(25.0, 60.2))
            .with_id("obs-1")
            .with_property("station", "Kumpula")
            .with_property("temperature", 21.5);

        let json = serde_json::to_string(&feature).unwrap();
        assert!(json.contains("\"type\":\"Feature\""));
        assert!(json.contains("\"type\":\"Point\""));
        assert!(json.contains("\"id\":\"obs-1\""));
        assert!(json.contains("\"station\":\"Kumpula\""));

        let parsed: Feature = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, feature);
    }

    #[test]
    fn test_properties_preserve_order() {
        let feature = Feature::new(Geometry::point(0.0, 0.0))
            .with_property("zulu", 1)
            .with_property("alpha", 2)
            .with_property("mike", 3);

        let keys: Vec<&String> = feature.properties.keys().collect();
        assert_eq!(keys, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn test_property_ci() {
        let feature = Feature::new(Geometry::point(0.0, 0.0)).with_property("obsTime", "x");
        assert!(feature.property_ci("obstime").is_some());
        assert!(feature.property_ci("OBSTIME").is_some());
        assert!(feature.property_ci("other").is_none());
    }

    #[test]
    fn test_integer_feature_id() {
        let feature = Feature::new(Geometry::point(0.0, 0.0)).with_id(42);
        let json = serde_json::to_string(&feature).unwrap();
        assert!(json.contains("\"id\":42"));
    }
}

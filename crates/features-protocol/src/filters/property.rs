//! Property equality filter.

use features_common::Feature;
use serde_json::Value;

use crate::collections::CollectionInfo;
use crate::query::RequestParameters;

use super::{is_reserved_parameter, Filter, FilterParseError, FilterProvider, FilterRef};

/// Equality constraints on declared feature properties.
///
/// Constraint names are stored lower-cased; feature properties are matched
/// case-insensitively and compared with a type-coercing equality, since
/// request parameters are always strings.
#[derive(Debug, Clone)]
pub struct PropertyFilter {
    constraints: Vec<(String, String)>,
}

impl PropertyFilter {
    /// Create a filter from (lower-cased name, expected value) pairs.
    pub fn new(constraints: Vec<(String, String)>) -> Self {
        Self { constraints }
    }

    pub fn constraints(&self) -> &[(String, String)] {
        &self.constraints
    }
}

/// Compare a JSON property value against a request-parameter string.
pub fn loosely_equal(value: &Value, expected: &str) -> bool {
    match value {
        Value::String(s) => s == expected,
        Value::Number(n) => match (n.as_f64(), expected.trim().parse::<f64>()) {
            (Some(actual), Ok(parsed)) => actual == parsed,
            _ => false,
        },
        Value::Bool(b) => match expected.trim() {
            "true" | "1" => *b,
            "false" | "0" => !*b,
            _ => false,
        },
        _ => false,
    }
}

impl Filter for PropertyFilter {
    fn kind(&self) -> &'static str {
        "property"
    }

    fn query_parameters(&self) -> Vec<(String, String)> {
        self.constraints.clone()
    }

    fn accept(&self, feature: &Feature) -> bool {
        if feature.properties.is_empty() && !self.constraints.is_empty() {
            return false;
        }

        for (name, expected) in &self.constraints {
            if let Some(value) = feature.property_ci(name) {
                if !loosely_equal(value, expected) {
                    return false;
                }
            }
        }
        true
    }
}

/// Turns request parameters matching declared property names into a
/// [`PropertyFilter`].
pub struct PropertyFilterProvider;

impl FilterProvider for PropertyFilterProvider {
    fn parse_filter(
        &self,
        params: &RequestParameters,
        collection: &CollectionInfo,
    ) -> Result<Option<FilterRef>, FilterParseError> {
        let mut constraints = Vec::new();
        for (name, value) in params.iter() {
            let lowercase = name.to_lowercase();
            if !is_reserved_parameter(&lowercase) && collection.has_property(&lowercase) {
                constraints.push((lowercase, value.to_string()));
            }
        }

        if constraints.is_empty() {
            Ok(None)
        } else {
            Ok(Some(std::sync::Arc::new(PropertyFilter::new(constraints))))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::{Property, PropertyType};
    use features_common::Geometry;

    fn collection() -> CollectionInfo {
        CollectionInfo::new("observations")
            .with_property(Property::new("station", PropertyType::String))
            .with_property(Property::new("temperature", PropertyType::Number))
            .with_property(Property::new("active", PropertyType::Boolean))
    }

    fn station_feature() -> Feature {
        Feature::new(Geometry::point(25.0, 60.2))
            .with_property("Station", "Kumpula")
            .with_property("temperature", 21.5)
            .with_property("active", true)
    }

    #[test]
    fn test_matching_is_case_insensitive_on_both_sides() {
        let params = RequestParameters::from_pairs(vec![("STATION", "Kumpula")]);
        let filter = PropertyFilterProvider
            .parse_filter(&params, &collection())
            .unwrap()
            .unwrap();

        // Declared "station", requested "STATION", feature has "Station"
        assert!(filter.accept(&station_feature()));
    }

    #[test]
    fn test_unequal_value_rejects() {
        let filter = PropertyFilter::new(vec![("station".to_string(), "Harmaja".to_string())]);
        assert!(!filter.accept(&station_feature()));
    }

    #[test]
    fn test_loose_equality_coerces_numbers_and_booleans() {
        let feature = station_feature();

        let numeric = PropertyFilter::new(vec![("temperature".to_string(), "21.5".to_string())]);
        assert!(numeric.accept(&feature));

        let boolean = PropertyFilter::new(vec![("active".to_string(), "true".to_string())]);
        assert!(boolean.accept(&feature));

        let wrong = PropertyFilter::new(vec![("temperature".to_string(), "7".to_string())]);
        assert!(!wrong.accept(&feature));
    }

    #[test]
    fn test_feature_without_properties_is_rejected_when_constrained() {
        let bare = Feature::new(Geometry::point(0.0, 0.0));
        let filter = PropertyFilter::new(vec![("station".to_string(), "Kumpula".to_string())]);
        assert!(!filter.accept(&bare));

        let unconstrained = PropertyFilter::new(vec![]);
        assert!(unconstrained.accept(&bare));
    }

    #[test]
    fn test_provider_skips_reserved_and_undeclared_names() {
        let params = RequestParameters::from_pairs(vec![
            ("limit", "5"),
            ("bbox", "1,1,2,2"),
            ("station", "Kumpula"),
            ("color", "red"),
        ]);
        let filter = PropertyFilterProvider
            .parse_filter(&params, &collection())
            .unwrap()
            .unwrap();

        assert_eq!(
            filter.query_parameters(),
            vec![("station".to_string(), "Kumpula".to_string())]
        );
    }

    #[test]
    fn test_provider_returns_none_without_matching_parameters() {
        let params = RequestParameters::from_pairs(vec![("limit", "5")]);
        assert!(PropertyFilterProvider
            .parse_filter(&params, &collection())
            .unwrap()
            .is_none());
    }
}

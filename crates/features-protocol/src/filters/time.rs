//! Time filter.

use features_common::{recognize_datetime, Feature, TimeInterval, TimeParseError};
use serde_json::Value;

use crate::collections::CollectionInfo;
use crate::query::RequestParameters;

use super::{Filter, FilterParseError, FilterProvider, FilterRef};

/// Accepts features whose temporal properties all fall inside an interval.
///
/// Every property value that is a recognizable date-time participates,
/// optionally narrowed to the collection's declared time property names.
/// A feature with several temporal properties is rejected as soon as any
/// of them lies outside the interval.
#[derive(Debug, Clone)]
pub struct TimeFilter {
    raw: String,
    interval: TimeInterval,
    property_names: Option<Vec<String>>,
    accept_features_with_no_time_field: bool,
}

impl TimeFilter {
    /// Parse a `datetime` parameter: an RFC 3339 instant, a `start/end`
    /// interval or a `start/duration` interval.
    pub fn parse(
        param: &str,
        time_property_names: Option<&[String]>,
        accept_features_with_no_time_field: bool,
    ) -> Result<Self, TimeParseError> {
        Ok(Self {
            raw: param.to_string(),
            interval: TimeInterval::parse(param)?,
            property_names: time_property_names
                .map(|names| names.iter().map(|n| n.to_lowercase()).collect()),
            accept_features_with_no_time_field,
        })
    }

    /// The parsed interval.
    pub fn interval(&self) -> &TimeInterval {
        &self.interval
    }

    fn property_qualifies(&self, name: &str) -> bool {
        match &self.property_names {
            Some(names) => names.iter().any(|n| n == &name.to_lowercase()),
            None => true,
        }
    }
}

impl Filter for TimeFilter {
    fn kind(&self) -> &'static str {
        "datetime"
    }

    fn query_parameters(&self) -> Vec<(String, String)> {
        vec![("datetime".to_string(), self.raw.clone())]
    }

    fn accept(&self, feature: &Feature) -> bool {
        let mut qualifying = 0usize;

        for (name, value) in &feature.properties {
            if !self.property_qualifies(name) {
                continue;
            }
            let Value::String(s) = value else { continue };
            let Some(instant) = recognize_datetime(s) else {
                continue;
            };

            qualifying += 1;
            if !self.interval.contains(&instant) {
                return false;
            }
        }

        if qualifying == 0 {
            return self.accept_features_with_no_time_field;
        }
        true
    }
}

/// Produces a [`TimeFilter`] from the `datetime` parameter.
pub struct TimeFilterProvider {
    accept_features_with_no_time_field: bool,
}

impl TimeFilterProvider {
    /// Configure whether features without any temporal property pass.
    pub fn new(accept_features_with_no_time_field: bool) -> Self {
        Self {
            accept_features_with_no_time_field,
        }
    }
}

impl Default for TimeFilterProvider {
    fn default() -> Self {
        Self::new(false)
    }
}

impl FilterProvider for TimeFilterProvider {
    fn parse_filter(
        &self,
        params: &RequestParameters,
        collection: &CollectionInfo,
    ) -> Result<Option<FilterRef>, FilterParseError> {
        match params.get_ci("datetime") {
            Some(param) => {
                let filter = TimeFilter::parse(
                    param,
                    collection.time_property_names.as_deref(),
                    self.accept_features_with_no_time_field,
                )?;
                Ok(Some(std::sync::Arc::new(filter)))
            }
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use features_common::Geometry;

    fn observation(time: &str) -> Feature {
        Feature::new(Geometry::point(25.0, 60.2)).with_property("observedTime", time)
    }

    #[test]
    fn test_interval_bounds_are_inclusive() {
        let filter =
            TimeFilter::parse("2018-03-12T00:00:00Z/2018-03-13T00:00:00Z", None, false).unwrap();

        assert!(filter.accept(&observation("2018-03-12T00:00:00Z")));
        assert!(filter.accept(&observation("2018-03-13T00:00:00Z")));
        assert!(!filter.accept(&observation("2018-03-11T23:59:59Z")));
        assert!(!filter.accept(&observation("2018-03-13T00:00:01Z")));
    }

    #[test]
    fn test_any_temporal_property_outside_rejects() {
        let filter =
            TimeFilter::parse("2018-03-12T00:00:00Z/2018-03-13T00:00:00Z", None, false).unwrap();
        let feature = observation("2018-03-12T12:00:00Z")
            .with_property("resultTime", "2018-03-20T00:00:00Z");

        assert!(!filter.accept(&feature));
    }

    #[test]
    fn test_allow_list_restricts_qualifying_properties() {
        let names = vec!["observedTime".to_string()];
        let filter = TimeFilter::parse(
            "2018-03-12T00:00:00Z/2018-03-13T00:00:00Z",
            Some(&names),
            false,
        )
        .unwrap();
        // resultTime is outside the interval but not in the allow-list
        let feature = observation("2018-03-12T12:00:00Z")
            .with_property("resultTime", "2018-03-20T00:00:00Z");

        assert!(filter.accept(&feature));
    }

    #[test]
    fn test_feature_without_time_field_uses_configured_default() {
        let feature = Feature::new(Geometry::point(0.0, 0.0)).with_property("station", "Kumpula");

        let reject = TimeFilter::parse("2018-03-12T00:00:00Z", None, false).unwrap();
        assert!(!reject.accept(&feature));

        let accept = TimeFilter::parse("2018-03-12T00:00:00Z", None, true).unwrap();
        assert!(accept.accept(&feature));
    }

    #[test]
    fn test_non_temporal_strings_do_not_qualify() {
        let filter = TimeFilter::parse("2018-03-12T00:00:00Z", None, false).unwrap();
        let feature = Feature::new(Geometry::point(0.0, 0.0)).with_property("station", "Kumpula");

        // "Kumpula" is not a date-time, so the feature has no time field
        assert!(!filter.accept(&feature));
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        assert!(TimeFilter::parse("last tuesday", None, false).is_err());
        assert!(TimeFilter::parse("2018-03-12T00:00:00Z/P", None, false).is_err());
    }

    #[test]
    fn test_canonical_serialization_is_the_raw_parameter() {
        let filter = TimeFilter::parse("2018-02-12T00:00:00Z/P6DT12H", None, false).unwrap();
        assert_eq!(
            filter.query_parameters(),
            vec![(
                "datetime".to_string(),
                "2018-02-12T00:00:00Z/P6DT12H".to_string()
            )]
        );
    }

    #[test]
    fn test_provider_reads_collection_time_property_names() {
        let collection = CollectionInfo::new("observations")
            .with_time_property_names(vec!["observedTime".to_string()]);
        let params =
            RequestParameters::from_pairs(vec![("datetime", "2018-03-12T00:00:00Z")]);

        let filter = TimeFilterProvider::default()
            .parse_filter(&params, &collection)
            .unwrap()
            .unwrap();
        assert_eq!(filter.kind(), "datetime");
    }
}

//! In-memory backend with deterministic fixture data.
//!
//! The mock backend serves two purposes: it backs the integration tests,
//! and the API service mounts it when no real backend is configured. Its
//! collections consume only their declared additional query parameters;
//! every other filter comes back as `remaining_filter`, which exercises
//! the engine's lazy filtering and pagination paths end to end.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;

use features_common::{Feature, FeatureId, Geometry};
use features_protocol::{
    AuthorizerProvider, Backend, BackendError, Collection, CollectionInfo, FeatureCursor,
    FeaturesError, Filter, FilterRef, Item, Link, Property, PropertyType, Query, QueryParameter,
    RequestParameters,
};

/// An in-memory collection backed by a fixed feature list.
///
/// Pagination uses the feature's position as an opaque offset token: item
/// `i` carries token `i + 1` unless it is the last feature. Apart from the
/// `search` parameter, filters are deliberately not enforced here.
pub struct MockCollection {
    info: CollectionInfo,
    features: Vec<Feature>,
}

impl MockCollection {
    pub fn new(info: CollectionInfo, features: Vec<Feature>) -> Self {
        Self { info, features }
    }
}

#[async_trait]
impl Collection for MockCollection {
    fn info(&self) -> &CollectionInfo {
        &self.info
    }

    async fn execute_query(&self, query: &Query) -> Result<Box<dyn FeatureCursor>, BackendError> {
        let start = match &query.next_token {
            Some(token) => token.parse::<usize>().map_err(|_| {
                BackendError::DataAccess(format!("invalid continuation token: {}", token))
            })?,
            None => 0,
        };

        // The backend must consume the additional-parameter filters it
        // declared; everything else is left for the engine to apply.
        let mut remaining = Vec::new();
        let mut search = None;
        for filter in &query.filters {
            if filter.kind() == "additional-parameters" {
                for (name, value) in filter.query_parameters() {
                    if name == "search" {
                        search = Some(value.to_lowercase());
                    }
                }
            } else {
                remaining.push(filter.clone());
            }
        }

        let selected: Vec<&Feature> = self
            .features
            .iter()
            .filter(|feature| match &search {
                Some(needle) => feature
                    .property_ci("station")
                    .and_then(|v| v.as_str())
                    .map(|s| s.to_lowercase().contains(needle))
                    .unwrap_or(false),
                None => true,
            })
            .collect();

        let total = selected.len();
        let items: VecDeque<Item> = selected
            .into_iter()
            .enumerate()
            .skip(start)
            .map(|(index, feature)| {
                let item = Item::new(feature.clone());
                if index + 1 < total {
                    item.with_next_token((index + 1).to_string())
                } else {
                    item
                }
            })
            .collect();

        Ok(Box::new(MockCursor { items, remaining }))
    }

    async fn feature_by_id(&self, id: &str) -> Result<Option<Feature>, BackendError> {
        Ok(self
            .features
            .iter()
            .find(|f| match &f.id {
                Some(FeatureId::String(s)) => s == id,
                Some(FeatureId::Integer(i)) => i.to_string() == id,
                None => false,
            })
            .cloned())
    }
}

struct MockCursor {
    items: VecDeque<Item>,
    remaining: Vec<FilterRef>,
}

#[async_trait]
impl FeatureCursor for MockCursor {
    fn remaining_filter(&self) -> &[FilterRef] {
        &self.remaining
    }

    fn has_next(&self) -> bool {
        !self.items.is_empty()
    }

    async fn next(&mut self) -> Result<Item, BackendError> {
        self.items
            .pop_front()
            .ok_or_else(|| BackendError::Internal("cursor exhausted".to_string()))
    }
}

/// The fixture observation features.
pub fn observation_features() -> Vec<Feature> {
    vec![
        Feature::new(Geometry::point(24.9613, 60.2029))
            .with_id("obs-1")
            .with_property("station", "Kumpula")
            .with_property("region", "south")
            .with_property("temperature", 21.5)
            .with_property("observedTime", "2018-03-12T06:00:00Z"),
        Feature::new(Geometry::point(24.9754, 60.1045))
            .with_id("obs-2")
            .with_property("station", "Harmaja")
            .with_property("region", "south")
            .with_property("temperature", 18.2)
            .with_property("observedTime", "2018-03-12T09:00:00Z"),
        Feature::new(Geometry::point(25.7333, 66.5000))
            .with_id("obs-3")
            .with_property("station", "Rovaniemi")
            .with_property("region", "north")
            .with_property("temperature", -3.5)
            .with_property("observedTime", "2018-03-12T12:00:00Z"),
        Feature::new(Geometry::point(24.9442, 60.1717))
            .with_id("obs-4")
            .with_property("station", "Kaisaniemi")
            .with_property("region", "south")
            .with_property("temperature", 20.0)
            .with_property("observedTime", "2018-03-12T15:00:00Z"),
        Feature::new(Geometry::point(27.0285, 69.9077))
            .with_id("obs-5")
            .with_property("station", "Utsjoki")
            .with_property("region", "north")
            .with_property("temperature", -8.1)
            .with_property("observedTime", "2018-03-12T18:00:00Z"),
    ]
}

/// Metadata for the observations fixture collection.
fn observations_info() -> CollectionInfo {
    CollectionInfo::new("observations")
        .with_title("Weather observations")
        .with_description("Surface weather observations from a handful of stations")
        .with_link(
            Link::new("https://www.example.com", "producer")
                .with_type("text/html")
                .with_title("Producer website"),
        )
        .with_property(Property::new("station", PropertyType::String))
        .with_property(Property::new("region", PropertyType::String))
        .with_property(Property::new("temperature", PropertyType::Number))
        .with_property(Property::new("observedTime", PropertyType::Date))
        .with_additional_query_parameter(
            QueryParameter::new("search").with_description("Free-text station search"),
        )
        .with_time_property_names(vec!["observedTime".to_string()])
}

/// Build the mock backend with its fixture collections.
pub fn create() -> Backend {
    Backend::new("MockBackend")
        .with_collection(Arc::new(MockCollection::new(
            observations_info(),
            observation_features(),
        )))
        .with_collection(Arc::new(MockCollection::new(
            CollectionInfo::new("empty")
                .with_title("An empty collection")
                .with_property(Property::new("station", PropertyType::String)),
            vec![],
        )))
}

/// An authorizer that only lets features of one region through.
///
/// Its filter serializes to nothing so pagination links never leak the
/// access constraint.
#[derive(Debug)]
pub struct RegionAuthorizer {
    region: String,
}

impl Filter for RegionAuthorizer {
    fn kind(&self) -> &'static str {
        "mock-authorizer"
    }

    fn query_parameters(&self) -> Vec<(String, String)> {
        Vec::new()
    }

    fn accept(&self, feature: &Feature) -> bool {
        feature.property_ci("region") == Some(&serde_json::Value::String(self.region.clone()))
    }
}

/// Produces a [`RegionAuthorizer`] for every request.
pub struct MockAuthorizerProvider {
    pub region: String,
}

#[async_trait]
impl AuthorizerProvider for MockAuthorizerProvider {
    async fn create_filter(
        &self,
        _params: &RequestParameters,
        _collection: &CollectionInfo,
    ) -> Result<Option<FilterRef>, FeaturesError> {
        Ok(Some(Arc::new(RegionAuthorizer {
            region: self.region.clone(),
        })))
    }
}

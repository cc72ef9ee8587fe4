//! Filter predicates and the provider chain that builds them.
//!
//! A [`Filter`] is a named predicate over a single feature together with
//! its canonical query-parameter serialization; the serialization must
//! reconstruct an equivalent filter, since it is what pagination links are
//! rebuilt from. A [`FilterProvider`] inspects the request parameters and
//! the target collection's declared schema and optionally produces one
//! filter of its kind. The [`FilterChain`] runs the providers in a fixed
//! order and validates that no request parameter goes unclaimed.

mod additional;
mod bbox;
mod property;
mod time;

pub use additional::{AdditionalParameterFilter, AdditionalParameterFilterProvider};
pub use bbox::{BboxFilter, BboxFilterProvider};
pub use property::{PropertyFilter, PropertyFilterProvider};
pub use time::{TimeFilter, TimeFilterProvider};

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use features_common::{BboxParseError, Feature, TimeParseError};

use crate::collections::CollectionInfo;
use crate::query::RequestParameters;

/// A predicate over a single feature.
///
/// Filters are pure and stateless once constructed: `accept` must depend
/// only on the feature and the filter's own parsed parameters.
pub trait Filter: fmt::Debug + Send + Sync {
    /// Tag naming the filter kind.
    fn kind(&self) -> &'static str;

    /// The canonical query parameters that reconstruct an equivalent
    /// filter. Used to build "self" and "next" pagination links.
    fn query_parameters(&self) -> Vec<(String, String)>;

    /// Whether the feature passes this filter.
    fn accept(&self, feature: &Feature) -> bool;
}

/// Shared handle to a filter.
///
/// Queries hand the same filter objects to the backend and get a subset of
/// them back as `remaining_filter`, so filters are reference counted.
pub type FilterRef = Arc<dyn Filter>;

/// Errors raised while turning request parameters into filters.
///
/// These surface as client errors; the query is never dispatched.
#[derive(Debug, thiserror::Error)]
pub enum FilterParseError {
    #[error("Illegal bounding box: {0}")]
    Bbox(#[from] BboxParseError),

    #[error("Illegal datetime value: {0}")]
    DateTime(#[from] TimeParseError),

    #[error("Unknown query parameter: {0}")]
    UnknownParameter(String),
}

/// Produces a filter of one kind from request parameters.
///
/// A provider recognizes only the parameters relevant to its kind and must
/// fail on malformed values for those parameters even when the rest of the
/// request is valid.
pub trait FilterProvider: Send + Sync {
    fn parse_filter(
        &self,
        params: &RequestParameters,
        collection: &CollectionInfo,
    ) -> Result<Option<FilterRef>, FilterParseError>;
}

/// Query-parameter names claimed by the engine itself; no property or
/// additional-parameter filter may claim them.
pub const RESERVED_PARAMETER_NAMES: &[&str] = &[
    "limit",
    "nexttoken",
    "next",
    "bbox",
    "bbox-crs",
    "time",
    "datetime",
];

/// Check whether a lower-cased parameter name is reserved.
pub fn is_reserved_parameter(lowercase_name: &str) -> bool {
    RESERVED_PARAMETER_NAMES.contains(&lowercase_name)
}

/// An ordered list of filter providers.
///
/// The chain is constructed explicitly and injected into the dispatcher so
/// tests can run custom chains.
pub struct FilterChain {
    providers: Vec<Box<dyn FilterProvider>>,
}

impl FilterChain {
    /// Build a chain from an explicit provider list.
    pub fn new(providers: Vec<Box<dyn FilterProvider>>) -> Self {
        Self { providers }
    }

    /// The built-in chain: bbox, time, property, additional-parameter.
    pub fn standard() -> Self {
        Self::new(vec![
            Box::new(BboxFilterProvider),
            Box::new(TimeFilterProvider::default()),
            Box::new(PropertyFilterProvider),
            Box::new(AdditionalParameterFilterProvider),
        ])
    }

    /// Run every provider in order and collect the produced filters.
    ///
    /// After the chain has run, every request parameter must either be a
    /// reserved name or appear in the canonical serialization of some
    /// produced filter; anything else is an unknown parameter and fails
    /// the request.
    pub fn parse(
        &self,
        params: &RequestParameters,
        collection: &CollectionInfo,
    ) -> Result<Vec<FilterRef>, FilterParseError> {
        let mut filters = Vec::new();
        for provider in &self.providers {
            if let Some(filter) = provider.parse_filter(params, collection)? {
                filters.push(filter);
            }
        }

        let claimed: HashSet<String> = filters
            .iter()
            .flat_map(|f| f.query_parameters())
            .map(|(name, _)| name.to_lowercase())
            .collect();

        for (name, _) in params.iter() {
            let lowercase = name.to_lowercase();
            if !is_reserved_parameter(&lowercase) && !claimed.contains(&lowercase) {
                return Err(FilterParseError::UnknownParameter(name.to_string()));
            }
        }

        Ok(filters)
    }
}

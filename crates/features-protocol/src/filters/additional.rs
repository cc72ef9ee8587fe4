//! Additional-parameter filter.

use features_common::Feature;

use crate::collections::CollectionInfo;
use crate::query::RequestParameters;

use super::{is_reserved_parameter, Filter, FilterParseError, FilterProvider, FilterRef};

/// Packages backend-specific query parameters into the filter list.
///
/// These parameters have no corresponding feature property, so the engine
/// cannot evaluate them; the owning backend must consume the filter during
/// `execute_query`. Evaluating it here is an invariant violation.
#[derive(Debug, Clone)]
pub struct AdditionalParameterFilter {
    parameters: Vec<(String, String)>,
}

impl AdditionalParameterFilter {
    /// Create a filter from (lower-cased name, value) pairs.
    pub fn new(parameters: Vec<(String, String)>) -> Self {
        Self { parameters }
    }

    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }
}

impl Filter for AdditionalParameterFilter {
    fn kind(&self) -> &'static str {
        "additional-parameters"
    }

    fn query_parameters(&self) -> Vec<(String, String)> {
        self.parameters.clone()
    }

    fn accept(&self, _feature: &Feature) -> bool {
        panic!("additional parameter filters must be processed in the backend implementation");
    }
}

/// Turns request parameters matching collection-declared additional query
/// parameters into an [`AdditionalParameterFilter`].
pub struct AdditionalParameterFilterProvider;

impl FilterProvider for AdditionalParameterFilterProvider {
    fn parse_filter(
        &self,
        params: &RequestParameters,
        collection: &CollectionInfo,
    ) -> Result<Option<FilterRef>, FilterParseError> {
        let mut parameters = Vec::new();
        for (name, value) in params.iter() {
            let lowercase = name.to_lowercase();
            if !is_reserved_parameter(&lowercase)
                && collection.has_additional_query_parameter(&lowercase)
            {
                parameters.push((lowercase, value.to_string()));
            }
        }

        if parameters.is_empty() {
            Ok(None)
        } else {
            Ok(Some(std::sync::Arc::new(AdditionalParameterFilter::new(
                parameters,
            ))))
        }
    }
}

//! Query and request-parameter types.

use features_common::Feature;

use crate::filters::FilterRef;

/// The normalized request parameters handed in by the HTTP layer.
///
/// Names keep the case they were received with; matching lower-cases on
/// demand. Order is preserved so that canonical serializations are stable.
#[derive(Debug, Clone, Default)]
pub struct RequestParameters {
    entries: Vec<(String, String)>,
}

impl RequestParameters {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from name/value pairs, preserving order.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// The first value whose name matches case-insensitively.
    pub fn get_ci(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Iterate over all name/value pairs in request order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// A query against one collection.
///
/// Created per request and discarded when the response completes.
#[derive(Debug, Clone)]
pub struct Query {
    /// Identifier of the target collection.
    pub collection_id: String,

    /// Maximum number of features returned in one page.
    pub limit: usize,

    /// Continuation token from a previous page, opaque to the engine and
    /// passed to the backend verbatim.
    pub next_token: Option<String>,

    /// Parsed filters, in provider-chain order.
    pub filters: Vec<FilterRef>,
}

impl Query {
    /// Create a query with no token and no filters.
    pub fn new(collection_id: impl Into<String>, limit: usize) -> Self {
        Self {
            collection_id: collection_id.into(),
            limit,
            next_token: None,
            filters: Vec::new(),
        }
    }

    /// Set the continuation token.
    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    /// Append a filter.
    pub fn with_filter(mut self, filter: FilterRef) -> Self {
        self.filters.push(filter);
        self
    }
}

/// One cursor result: a feature plus the token that resumes the query
/// right after it.
#[derive(Debug, Clone)]
pub struct Item {
    pub feature: Feature,

    /// When present on the last consumed item, the continuation cursor for
    /// the following page.
    pub next_token: Option<String>,
}

impl Item {
    /// Create an item with no continuation token.
    pub fn new(feature: Feature) -> Self {
        Self {
            feature,
            next_token: None,
        }
    }

    /// Set the continuation token.
    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_parameters_case_insensitive_lookup() {
        let params = RequestParameters::from_pairs(vec![
            ("BBOX", "1,2,3,4"),
            ("nextToken", "abc"),
        ]);

        assert_eq!(params.get_ci("bbox"), Some("1,2,3,4"));
        assert_eq!(params.get_ci("nexttoken"), Some("abc"));
        assert_eq!(params.get_ci("limit"), None);
    }

    #[test]
    fn test_request_parameters_preserve_order() {
        let params = RequestParameters::from_pairs(vec![("b", "1"), ("a", "2")]);
        let names: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn test_query_builder() {
        let query = Query::new("observations", 10).with_next_token("5");
        assert_eq!(query.collection_id, "observations");
        assert_eq!(query.limit, 10);
        assert_eq!(query.next_token.as_deref(), Some("5"));
        assert!(query.filters.is_empty());
    }
}

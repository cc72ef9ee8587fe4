//! Backend contracts and the query dispatcher.

use async_trait::async_trait;
use std::sync::Arc;

use features_common::Feature;

use crate::collections::CollectionInfo;
use crate::cursor::{BackendError, FeatureCursor, FilteredFeatureCursor};
use crate::errors::FeaturesError;
use crate::filters::{FilterChain, FilterRef};
use crate::query::{Query, RequestParameters};

/// A queryable set of features, owned and supplied by a backend.
///
/// This is the entire contract a backend implementation has to fulfil.
#[async_trait]
pub trait Collection: Send + Sync {
    /// The collection's declared metadata. Read-only for the engine.
    fn info(&self) -> &CollectionInfo;

    /// Run a query and return a cursor over the results.
    ///
    /// The cursor reports whichever of `query.filters` the backend did not
    /// enforce itself; the engine applies those afterwards.
    async fn execute_query(&self, query: &Query) -> Result<Box<dyn FeatureCursor>, BackendError>;

    /// Look up a single feature by its identifier.
    async fn feature_by_id(&self, id: &str) -> Result<Option<Feature>, BackendError>;
}

/// A pluggable module exposing one or more collections.
pub struct Backend {
    pub name: String,
    pub collections: Vec<Arc<dyn Collection>>,
}

impl Backend {
    /// Create a backend with no collections.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            collections: Vec::new(),
        }
    }

    /// Register a collection.
    pub fn with_collection(mut self, collection: Arc<dyn Collection>) -> Self {
        self.collections.push(collection);
        self
    }
}

/// Produces an extra per-request filter, e.g. an access-control predicate.
///
/// When configured, the produced filter is appended to the query's filter
/// list before dispatch and participates in `remaining_filter` semantics
/// exactly like any other filter.
#[async_trait]
pub trait AuthorizerProvider: Send + Sync {
    async fn create_filter(
        &self,
        params: &RequestParameters,
        collection: &CollectionInfo,
    ) -> Result<Option<FilterRef>, FeaturesError>;
}

/// Holds the registered backends and routes queries to them.
pub struct Server {
    backends: Vec<Backend>,
    filter_chain: FilterChain,
    authorizer: Option<Arc<dyn AuthorizerProvider>>,
}

impl Server {
    /// Create a server with the standard filter chain.
    pub fn new(backends: Vec<Backend>) -> Self {
        Self {
            backends,
            filter_chain: FilterChain::standard(),
            authorizer: None,
        }
    }

    /// Replace the filter chain (dependency injection for tests and
    /// customized deployments).
    pub fn with_filter_chain(mut self, filter_chain: FilterChain) -> Self {
        self.filter_chain = filter_chain;
        self
    }

    /// Attach an authorizer provider.
    pub fn with_authorizer(mut self, authorizer: Arc<dyn AuthorizerProvider>) -> Self {
        self.authorizer = Some(authorizer);
        self
    }

    /// The registered backends, in registration order.
    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    /// All collections, in backend-registration then collection-registration
    /// order.
    pub fn collections(&self) -> Vec<&Arc<dyn Collection>> {
        self.backends
            .iter()
            .flat_map(|b| b.collections.iter())
            .collect()
    }

    /// Look up a collection by identifier.
    ///
    /// Identifiers are assumed unique across backends. If two backends
    /// register the same id the first match in registration order wins;
    /// relying on that is undefined behavior.
    pub fn collection(&self, id: &str) -> Option<&Arc<dyn Collection>> {
        self.backends
            .iter()
            .flat_map(|b| b.collections.iter())
            .find(|c| c.info().id == id)
    }

    /// Turn request parameters into a [`Query`] for one collection.
    ///
    /// Runs the filter chain, validates that no parameter goes unclaimed
    /// and appends the authorizer filter, when one is configured, last.
    pub async fn parse_query(
        &self,
        collection: &CollectionInfo,
        params: &RequestParameters,
        limit: usize,
        next_token: Option<String>,
    ) -> Result<Query, FeaturesError> {
        let mut filters = self.filter_chain.parse(params, collection)?;

        if let Some(authorizer) = &self.authorizer {
            if let Some(filter) = authorizer.create_filter(params, collection).await? {
                filters.push(filter);
            }
        }

        Ok(Query {
            collection_id: collection.id.clone(),
            limit,
            next_token,
            filters,
        })
    }

    /// Execute a query against the collection it names and return a
    /// filter-complete cursor.
    pub async fn execute_query(
        &self,
        query: &Query,
    ) -> Result<FilteredFeatureCursor, FeaturesError> {
        let collection = self
            .collection(&query.collection_id)
            .ok_or_else(|| FeaturesError::CollectionNotFound(query.collection_id.clone()))?;

        let cursor = collection.execute_query(query).await?;
        Ok(FilteredFeatureCursor::new(cursor).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::{Filter, PropertyFilter};
    use crate::query::Item;
    use features_common::Geometry;
    use std::collections::VecDeque;

    struct ListCursor {
        items: VecDeque<Item>,
        remaining: Vec<FilterRef>,
    }

    #[async_trait]
    impl FeatureCursor for ListCursor {
        fn remaining_filter(&self) -> &[FilterRef] {
            &self.remaining
        }

        fn has_next(&self) -> bool {
            !self.items.is_empty()
        }

        async fn next(&mut self) -> Result<Item, BackendError> {
            Ok(self.items.pop_front().expect("cursor exhausted"))
        }
    }

    struct ListCollection {
        info: CollectionInfo,
        features: Vec<Feature>,
    }

    impl ListCollection {
        fn new(id: &str, features: Vec<Feature>) -> Arc<dyn Collection> {
            Arc::new(Self {
                info: CollectionInfo::new(id),
                features,
            })
        }
    }

    #[async_trait]
    impl Collection for ListCollection {
        fn info(&self) -> &CollectionInfo {
            &self.info
        }

        async fn execute_query(
            &self,
            query: &Query,
        ) -> Result<Box<dyn FeatureCursor>, BackendError> {
            Ok(Box::new(ListCursor {
                items: self.features.iter().cloned().map(Item::new).collect(),
                remaining: query.filters.clone(),
            }))
        }

        async fn feature_by_id(&self, id: &str) -> Result<Option<Feature>, BackendError> {
            Ok(self
                .features
                .iter()
                .find(|f| f.id.as_ref().map(|i| i.to_string()).as_deref() == Some(id))
                .cloned())
        }
    }

    fn two_backend_server() -> Server {
        let a = Backend::new("alpha")
            .with_collection(ListCollection::new("first", vec![]))
            .with_collection(ListCollection::new("shared", vec![]));
        let b = Backend::new("beta")
            .with_collection(ListCollection::new("shared", vec![]))
            .with_collection(ListCollection::new("last", vec![]));
        Server::new(vec![a, b])
    }

    #[test]
    fn test_collections_concatenate_in_registration_order() {
        let server = two_backend_server();
        let ids: Vec<String> = server
            .collections()
            .iter()
            .map(|c| c.info().id.clone())
            .collect();
        assert_eq!(ids, vec!["first", "shared", "shared", "last"]);
    }

    #[test]
    fn test_collection_lookup_first_match_wins() {
        let server = two_backend_server();
        assert!(server.collection("shared").is_some());
        assert!(server.collection("missing").is_none());

        // Both backends register "shared"; the first backend's copy wins.
        let all = server.collections();
        let shared = server.collection("shared").unwrap();
        assert!(Arc::ptr_eq(shared, all[1]));
    }

    #[tokio::test]
    async fn test_execute_query_unknown_collection() {
        let server = two_backend_server();
        let query = Query::new("missing", 10);

        assert!(matches!(
            server.execute_query(&query).await,
            Err(FeaturesError::CollectionNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_execute_query_returns_filter_complete_cursor() {
        let features = vec![
            Feature::new(Geometry::point(0.0, 0.0)).with_property("station", "Kumpula"),
            Feature::new(Geometry::point(0.0, 0.0)).with_property("station", "Harmaja"),
        ];
        let backend =
            Backend::new("mock").with_collection(ListCollection::new("observations", features));
        let server = Server::new(vec![backend]);

        let filter: FilterRef = Arc::new(PropertyFilter::new(vec![(
            "station".to_string(),
            "Kumpula".to_string(),
        )]));
        let query = Query::new("observations", 10).with_filter(filter);

        let mut cursor = server.execute_query(&query).await.unwrap();
        assert!(cursor.remaining_filter().is_empty());

        let item = cursor.next().await.unwrap();
        assert_eq!(
            item.feature.property_ci("station"),
            Some(&serde_json::json!("Kumpula"))
        );
        assert!(!cursor.has_next());
    }

    #[tokio::test]
    async fn test_authorizer_filter_is_appended_last() {
        struct StationAuthorizer;

        #[async_trait]
        impl AuthorizerProvider for StationAuthorizer {
            async fn create_filter(
                &self,
                _params: &RequestParameters,
                _collection: &CollectionInfo,
            ) -> Result<Option<FilterRef>, FeaturesError> {
                Ok(Some(Arc::new(PropertyFilter::new(vec![(
                    "station".to_string(),
                    "Kumpula".to_string(),
                )]))))
            }
        }

        let server = Server::new(vec![]).with_authorizer(Arc::new(StationAuthorizer));
        let collection = CollectionInfo::new("observations");
        let params = RequestParameters::new();

        let query = server
            .parse_query(&collection, &params, 10, None)
            .await
            .unwrap();
        assert_eq!(query.filters.len(), 1);
        assert_eq!(query.filters[0].kind(), "property");
    }
}

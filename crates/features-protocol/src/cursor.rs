//! Cursor contracts and the lazy filtered cursor.

use async_trait::async_trait;

use crate::filters::{Filter, FilterRef};
use crate::query::Item;

/// Errors a backend can signal while producing items.
///
/// The engine never retries; retry semantics, if any, belong to the
/// backend itself.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The backend could not reach or read its data source.
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Any other backend-internal failure.
    #[error("Internal backend error: {0}")]
    Internal(String),
}

/// A single-pass, single-consumer enumerator of query results.
///
/// `next` must not be called when `has_next` is false; `has_next` must be
/// answerable without side effects, so backends keep whatever lookahead
/// they need themselves. `remaining_filter` is fixed at construction time.
#[async_trait]
pub trait FeatureCursor: Send {
    /// The subset of the query's filters this cursor did *not* enforce.
    /// The engine applies these itself before anything reaches the client.
    fn remaining_filter(&self) -> &[FilterRef];

    /// CRS of the produced geometries, if the backend declares one.
    fn crs(&self) -> Option<&str> {
        None
    }

    /// Whether another item is available. Idempotent.
    fn has_next(&self) -> bool;

    /// Produce the next item. A backend may perform blocking I/O here.
    async fn next(&mut self) -> Result<Item, BackendError>;
}

/// The one-slot lookahead of [`FilteredFeatureCursor`].
#[derive(Debug)]
enum Lookahead {
    /// The next item that passes every remaining filter.
    Ready(Item),
    /// The source failed; surfaced on the following `next` call so that
    /// `has_next` stays side-effect free.
    Failed(BackendError),
    /// The source ran out without producing another passing item.
    Exhausted,
}

/// Wraps a backend cursor and applies its `remaining_filter` lazily.
///
/// The wrapper holds exactly one buffered item: the lookahead is computed
/// at construction and recomputed right after each `next` call, discarding
/// source items that fail any remaining filter along the way. The result
/// is filter-complete (its own `remaining_filter` is always empty) and
/// nothing is materialized beyond that single slot.
pub struct FilteredFeatureCursor {
    inner: Box<dyn FeatureCursor>,
    pending: Lookahead,
}

impl FilteredFeatureCursor {
    /// Wrap a backend cursor, computing the initial lookahead.
    pub async fn new(inner: Box<dyn FeatureCursor>) -> Self {
        let mut cursor = Self {
            inner,
            pending: Lookahead::Exhausted,
        };
        cursor.advance().await;
        cursor
    }

    /// Pull from the source until an item passes every remaining filter,
    /// the source is exhausted, or it fails.
    async fn advance(&mut self) {
        self.pending = loop {
            if !self.inner.has_next() {
                break Lookahead::Exhausted;
            }
            match self.inner.next().await {
                Err(e) => break Lookahead::Failed(e),
                Ok(item) => {
                    let accepted = self
                        .inner
                        .remaining_filter()
                        .iter()
                        .all(|f| f.accept(&item.feature));
                    if accepted {
                        break Lookahead::Ready(item);
                    }
                }
            }
        };
    }
}

#[async_trait]
impl FeatureCursor for FilteredFeatureCursor {
    fn remaining_filter(&self) -> &[FilterRef] {
        &[]
    }

    fn crs(&self) -> Option<&str> {
        self.inner.crs()
    }

    fn has_next(&self) -> bool {
        !matches!(self.pending, Lookahead::Exhausted)
    }

    async fn next(&mut self) -> Result<Item, BackendError> {
        match std::mem::replace(&mut self.pending, Lookahead::Exhausted) {
            Lookahead::Ready(item) => {
                self.advance().await;
                Ok(item)
            }
            Lookahead::Failed(e) => Err(e),
            Lookahead::Exhausted => {
                panic!("next() called on an exhausted cursor")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::PropertyFilter;
    use features_common::{Feature, Geometry};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Test cursor yielding a scripted sequence of results.
    struct StubCursor {
        results: VecDeque<Result<Item, BackendError>>,
        remaining: Vec<FilterRef>,
        crs: Option<String>,
        pulls: Arc<AtomicUsize>,
    }

    impl StubCursor {
        fn new(results: Vec<Result<Item, BackendError>>, remaining: Vec<FilterRef>) -> Self {
            Self {
                results: results.into(),
                remaining,
                crs: None,
                pulls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl FeatureCursor for StubCursor {
        fn remaining_filter(&self) -> &[FilterRef] {
            &self.remaining
        }

        fn crs(&self) -> Option<&str> {
            self.crs.as_deref()
        }

        fn has_next(&self) -> bool {
            !self.results.is_empty()
        }

        async fn next(&mut self) -> Result<Item, BackendError> {
            self.pulls.fetch_add(1, Ordering::SeqCst);
            self.results.pop_front().expect("cursor exhausted")
        }
    }

    fn station_item(station: &str) -> Item {
        Item::new(
            Feature::new(Geometry::point(25.0, 60.2)).with_property("station", station),
        )
    }

    fn station_filter(station: &str) -> FilterRef {
        Arc::new(PropertyFilter::new(vec![(
            "station".to_string(),
            station.to_string(),
        )]))
    }

    #[tokio::test]
    async fn test_rejected_items_are_skipped_and_order_preserved() {
        let inner = StubCursor::new(
            vec![
                Ok(station_item("Kumpula")),
                Ok(station_item("Harmaja")),
                Ok(station_item("Kumpula")),
            ],
            vec![station_filter("Kumpula")],
        );
        let mut cursor = FilteredFeatureCursor::new(Box::new(inner)).await;

        assert!(cursor.has_next());
        let first = cursor.next().await.unwrap();
        assert_eq!(
            first.feature.property_ci("station"),
            Some(&serde_json::json!("Kumpula"))
        );

        assert!(cursor.has_next());
        cursor.next().await.unwrap();
        assert!(!cursor.has_next());
    }

    #[tokio::test]
    async fn test_has_next_is_idempotent_and_does_not_advance() {
        let inner = StubCursor::new(
            vec![Ok(station_item("Kumpula")), Ok(station_item("Kumpula"))],
            vec![],
        );
        let pulls = inner.pulls.clone();
        let cursor = FilteredFeatureCursor::new(Box::new(inner)).await;

        let after_construction = pulls.load(Ordering::SeqCst);
        for _ in 0..5 {
            assert!(cursor.has_next());
        }
        assert_eq!(pulls.load(Ordering::SeqCst), after_construction);
    }

    #[tokio::test]
    async fn test_exhausted_source_is_exhausted_at_construction() {
        let inner = StubCursor::new(vec![], vec![]);
        let cursor = FilteredFeatureCursor::new(Box::new(inner)).await;
        assert!(!cursor.has_next());
    }

    #[tokio::test]
    async fn test_all_items_rejected_means_exhausted() {
        let inner = StubCursor::new(
            vec![Ok(station_item("Harmaja")), Ok(station_item("Harmaja"))],
            vec![station_filter("Kumpula")],
        );
        let cursor = FilteredFeatureCursor::new(Box::new(inner)).await;
        assert!(!cursor.has_next());
    }

    #[tokio::test]
    async fn test_source_error_surfaces_on_next() {
        let inner = StubCursor::new(
            vec![
                Ok(station_item("Kumpula")),
                Err(BackendError::DataAccess("connection reset".to_string())),
            ],
            vec![],
        );
        let mut cursor = FilteredFeatureCursor::new(Box::new(inner)).await;

        cursor.next().await.unwrap();
        assert!(cursor.has_next());
        assert!(cursor.next().await.is_err());
        assert!(!cursor.has_next());
    }

    #[tokio::test]
    async fn test_remaining_filter_is_always_empty() {
        let inner = StubCursor::new(
            vec![Ok(station_item("Kumpula"))],
            vec![station_filter("Kumpula")],
        );
        let cursor = FilteredFeatureCursor::new(Box::new(inner)).await;
        assert!(cursor.remaining_filter().is_empty());
    }

    #[tokio::test]
    async fn test_crs_passes_through() {
        let mut inner = StubCursor::new(vec![], vec![]);
        inner.crs = Some("http://www.opengis.net/def/crs/EPSG/0/3067".to_string());
        let cursor = FilteredFeatureCursor::new(Box::new(inner)).await;
        assert_eq!(
            cursor.crs(),
            Some("http://www.opengis.net/def/crs/EPSG/0/3067")
        );
    }
}

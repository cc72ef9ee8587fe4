//! Streaming feature-collection output.
//!
//! [`FeatureCollectionStream`] consumes a filter-complete cursor and writes
//! a GeoJSON FeatureCollection to an abstract sink incrementally, never
//! holding more than one feature in memory. The envelope opens lazily on
//! the first accepted item so a zero-result page still produces a complete
//! document, and the close emits pagination links rebuilt from the query's
//! canonical filter serialization.

use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::cursor::{BackendError, FeatureCursor, FilteredFeatureCursor};
use crate::filters::Filter;
use crate::media_types;
use crate::query::Query;
use crate::responses::ExceptionResponse;
use crate::types::Link;

/// Where the produced document goes.
///
/// The same shape serves a raw HTTP response or a buffering adapter; the
/// producer does not know which. Writes are best-effort: a sink whose
/// consumer is gone should drop chunks silently and let cancellation stop
/// the producer.
#[async_trait]
pub trait ResponseSink: Send {
    async fn write_head(&mut self, status: u16, content_type: &str);
    async fn write(&mut self, chunk: &str);
    async fn end(&mut self);
}

/// Cooperative cancellation signal threaded through the pull loop.
///
/// The transport adapter cancels it when the client disconnects so the
/// engine stops draining a backend cursor nobody will read.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Producer state. No transition re-enters `NotStarted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamState {
    NotStarted,
    Streaming,
    ClosedSuccess,
    ClosedError,
}

/// How a streaming run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Cursor exhausted or page limit reached; document closed normally.
    Completed { number_returned: usize },
    /// The source failed; the document was closed as an error.
    Failed { number_returned: usize },
    /// The consumer went away; output was abandoned mid-document.
    Cancelled { number_returned: usize },
}

/// Streams one page of query results into a sink.
pub struct FeatureCollectionStream<S: ResponseSink> {
    sink: S,
    self_url: String,
    state: StreamState,
    number_returned: usize,
    last_token: Option<String>,
    crs: Option<String>,
}

impl<S: ResponseSink> FeatureCollectionStream<S> {
    /// Create a producer writing to `sink`.
    ///
    /// `self_url` is the absolute URL of the items endpoint without any
    /// query string; pagination links are built from it.
    pub fn new(sink: S, self_url: impl Into<String>) -> Self {
        Self {
            sink,
            self_url: self_url.into(),
            state: StreamState::NotStarted,
            number_returned: 0,
            last_token: None,
            crs: None,
        }
    }

    /// Pull items from the cursor until the page is full, the cursor is
    /// exhausted, the source fails or the consumer disconnects, writing
    /// the document as it goes.
    pub async fn run(
        mut self,
        query: &Query,
        cursor: &mut FilteredFeatureCursor,
        cancel: &CancellationToken,
    ) -> StreamOutcome {
        self.crs = cursor.crs().map(str::to_string);

        while self.number_returned < query.limit && cursor.has_next() {
            if cancel.is_cancelled() {
                return self.abandon().await;
            }

            let item = match cursor.next().await {
                Ok(item) => item,
                Err(e) => return self.close_error(e).await,
            };

            let serialized = match serde_json::to_string(&item.feature) {
                Ok(s) => s,
                Err(e) => {
                    return self
                        .close_error(BackendError::Internal(format!(
                            "feature serialization failed: {}",
                            e
                        )))
                        .await;
                }
            };

            if self.state == StreamState::NotStarted {
                self.open_envelope().await;
            } else {
                self.sink.write(",").await;
            }
            self.sink.write(&serialized).await;
            self.number_returned += 1;
            self.last_token = item.next_token;
        }

        if cancel.is_cancelled() {
            return self.abandon().await;
        }
        self.close_success(query).await
    }

    /// Write the response head and the opening envelope.
    async fn open_envelope(&mut self) {
        self.sink.write_head(200, media_types::GEO_JSON).await;
        self.sink.write("{\"type\":\"FeatureCollection\",").await;
        if let Some(crs) = self.crs.as_deref() {
            let crs_block = serde_json::json!({
                "type": "name",
                "properties": { "name": crs }
            });
            self.sink
                .write(&format!("\"crs\":{},", crs_block))
                .await;
        }
        self.sink.write("\"features\":[").await;
        self.state = StreamState::Streaming;
    }

    /// Close the document on the success path, emitting pagination links.
    async fn close_success(mut self, query: &Query) -> StreamOutcome {
        if self.state == StreamState::NotStarted {
            // Zero results; the envelope still has to be produced.
            self.open_envelope().await;
        }

        let mut links = vec![Link::new(
            format!("{}?{}", self.self_url, query_string(query, None)),
            "self",
        )
        .with_type(media_types::GEO_JSON)];

        if let Some(token) = &self.last_token {
            links.push(
                Link::new(
                    format!("{}?{}", self.self_url, query_string(query, Some(token))),
                    "next",
                )
                .with_type(media_types::GEO_JSON),
            );
        }

        let links_json =
            serde_json::to_string(&links).unwrap_or_else(|_| "[]".to_string());

        self.sink
            .write(&format!(
                "],\"timeStamp\":\"{}\",\"links\":{},\"numberReturned\":{}}}",
                timestamp(),
                links_json,
                self.number_returned
            ))
            .await;
        self.sink.end().await;
        self.state = StreamState::ClosedSuccess;

        StreamOutcome::Completed {
            number_returned: self.number_returned,
        }
    }

    /// Close the document after a source failure.
    ///
    /// If nothing was flushed yet the whole response becomes an exception
    /// document. Once the success envelope is on the wire it cannot be
    /// retracted; the document is completed with an in-band error marker.
    async fn close_error(mut self, error: BackendError) -> StreamOutcome {
        match self.state {
            StreamState::NotStarted => {
                self.sink.write_head(500, media_types::JSON).await;
                let exception = ExceptionResponse::internal_error(error.to_string());
                let body = serde_json::to_string(&exception)
                    .unwrap_or_else(|_| "{}".to_string());
                self.sink.write(&body).await;
            }
            _ => {
                let message = serde_json::to_string(&error.to_string())
                    .unwrap_or_else(|_| "\"error\"".to_string());
                self.sink
                    .write(&format!(
                        "],\"timeStamp\":\"{}\",\"error\":{},\"numberReturned\":{}}}",
                        timestamp(),
                        message,
                        self.number_returned
                    ))
                    .await;
            }
        }
        self.sink.end().await;
        self.state = StreamState::ClosedError;

        StreamOutcome::Failed {
            number_returned: self.number_returned,
        }
    }

    /// Stop writing because the consumer disconnected.
    async fn abandon(mut self) -> StreamOutcome {
        self.sink.end().await;
        self.state = StreamState::ClosedError;
        StreamOutcome::Cancelled {
            number_returned: self.number_returned,
        }
    }
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// The canonical query string for a query: every filter's serialization,
/// then `limit`, then the continuation token.
///
/// With `next_token` set, it replaces the query's own token; this is what
/// distinguishes a "next" link from "self".
pub fn query_string(query: &Query, next_token: Option<&str>) -> String {
    let mut parts = Vec::new();

    for filter in &query.filters {
        for (name, value) in filter.query_parameters() {
            parts.push(format!(
                "{}={}",
                percent_encode(&name),
                percent_encode(&value)
            ));
        }
    }

    parts.push(format!("limit={}", query.limit));

    let token = next_token.or(query.next_token.as_deref());
    if let Some(token) = token {
        parts.push(format!("nextToken={}", percent_encode(token)));
    }

    parts.join("&")
}

/// Percent-encode everything outside the RFC 3986 unreserved set.
fn percent_encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}

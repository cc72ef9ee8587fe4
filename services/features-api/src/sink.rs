//! Channel-backed response sink.
//!
//! The streaming producer writes through a bounded channel that the
//! response body drains, so a slow client applies backpressure to the
//! backend cursor instead of buffering the whole document. Dropping the
//! body (client disconnect) cancels the producer's pull loop.

use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;

use features_protocol::{CancellationToken, ResponseSink};

/// One event emitted by the producer.
#[derive(Debug)]
pub enum SinkEvent {
    Head { status: u16, content_type: String },
    Chunk(String),
    End,
}

/// A [`ResponseSink`] that forwards events into a channel.
pub struct ChannelSink {
    tx: mpsc::Sender<SinkEvent>,
    cancel: CancellationToken,
}

impl ChannelSink {
    pub fn new(tx: mpsc::Sender<SinkEvent>, cancel: CancellationToken) -> Self {
        Self { tx, cancel }
    }

    async fn send(&self, event: SinkEvent) {
        // A closed receiver means the consumer is gone
        if self.tx.send(event).await.is_err() {
            self.cancel.cancel();
        }
    }
}

#[async_trait]
impl ResponseSink for ChannelSink {
    async fn write_head(&mut self, status: u16, content_type: &str) {
        self.send(SinkEvent::Head {
            status,
            content_type: content_type.to_string(),
        })
        .await;
    }

    async fn write(&mut self, chunk: &str) {
        self.send(SinkEvent::Chunk(chunk.to_string())).await;
    }

    async fn end(&mut self) {
        self.send(SinkEvent::End).await;
    }
}

/// Adapts the channel's chunk events into a response body stream.
pub struct BodyStream {
    rx: mpsc::Receiver<SinkEvent>,
    cancel: CancellationToken,
}

impl BodyStream {
    pub fn new(rx: mpsc::Receiver<SinkEvent>, cancel: CancellationToken) -> Self {
        Self { rx, cancel }
    }
}

impl Stream for BodyStream {
    type Item = Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        loop {
            return match this.rx.poll_recv(cx) {
                Poll::Ready(Some(SinkEvent::Chunk(chunk))) => {
                    Poll::Ready(Some(Ok(Bytes::from(chunk))))
                }
                // The head was consumed by the handler; ignore stragglers
                Poll::Ready(Some(SinkEvent::Head { .. })) => continue,
                Poll::Ready(Some(SinkEvent::End)) | Poll::Ready(None) => Poll::Ready(None),
                Poll::Pending => Poll::Pending,
            };
        }
    }
}

impl Drop for BodyStream {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

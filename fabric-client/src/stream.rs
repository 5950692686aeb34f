//! Streaming chat consumer
//!
//! [`Client::chat`] turns a one-shot request into a live, ordered sequence of
//! [`StreamMessage`] values. The initiating POST is synchronous: request
//! serialization failures, transport failures, and non-success statuses are
//! returned as errors and no stream is created. Once the connection is
//! established, a worker task owns the response body, decodes SSE frames from
//! it, and hands each decoded message to the caller through a single-slot
//! channel, so the producer can never run more than one message ahead of a
//! slow consumer.
//!
//! Everything that goes wrong after the stream is established is reported
//! in-band as a terminal [`StreamMessage::Error`]; the sequence then ends.
//! Dropping the [`ChatStream`] handle cancels the session: the worker
//! observes the closed channel at both of its suspension points (waiting for
//! the next frame, waiting for the consumer) and exits, releasing the
//! connection. A message already decoded but not yet delivered is dropped on
//! cancellation in favor of prompt shutdown.

use crate::client::Client;
use crate::error::{Error, Result};
use crate::protocol::types::{ChatRequest, StreamMessage};
use bytes::Bytes;
use eventsource_stream::Eventsource;
use futures::{Stream, StreamExt};
use reqwest::Method;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

impl Client {
    /// Start a chat and return the live message sequence.
    ///
    /// Messages arrive in the exact order the server sent them. The sequence
    /// ends after a [`StreamMessage::Complete`], after a terminal
    /// [`StreamMessage::Error`], or when the server closes the stream. Drop
    /// the returned [`ChatStream`] to cancel the session early.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatStream> {
        let body = serde_json::to_vec(request).map_err(|source| Error::Encode {
            what: "chat request",
            source,
        })?;

        // No total-request timeout here: the SSE body stays open for the
        // whole generation.
        let response = self
            .execute_with_timeout(Method::POST, &["chat"], Some(body), None)
            .await?;

        debug!(url = %response.url(), "chat stream established");

        Ok(spawn_consumer(response.bytes_stream()))
    }
}

/// The live sequence of messages from one chat invocation.
///
/// Implements [`futures::Stream`]; iterating it to the end observes the
/// natural end of the session. Dropping it cancels the session and releases
/// the underlying connection.
#[derive(Debug)]
pub struct ChatStream {
    rx: mpsc::Receiver<StreamMessage>,
}

impl ChatStream {
    /// Receive the next message, or `None` once the session has ended.
    pub async fn next_message(&mut self) -> Option<StreamMessage> {
        self.rx.recv().await
    }
}

impl Stream for ChatStream {
    type Item = StreamMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<StreamMessage>> {
        self.rx.poll_recv(cx)
    }
}

/// Spawn the worker that consumes `bytes` and feed its messages into the
/// returned handle.
///
/// Generic over the byte stream so tests can drive the loop with scripted
/// input; production passes the reqwest response body.
fn spawn_consumer<S, E>(bytes: S) -> ChatStream
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(consume(bytes, tx));
    ChatStream { rx }
}

/// The session's event loop.
///
/// Owns the response body for the lifetime of the session; the connection is
/// released exactly once, when this future completes (on any exit path,
/// including panic unwind) and its locals are dropped.
async fn consume<S, E>(bytes: S, tx: mpsc::Sender<StreamMessage>)
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Display + Send + 'static,
{
    let mut events = Box::pin(bytes.eventsource());

    loop {
        let event = tokio::select! {
            // Handle dropped while we wait for the next frame.
            _ = tx.closed() => break,
            next = events.next() => match next {
                // Server closed the stream without a completion marker.
                None => break,
                Some(Err(e)) => {
                    warn!("chat stream read failed: {e}");
                    let _ = tx
                        .send(StreamMessage::plain_error(format!(
                            "failed to read SSE response: {e}"
                        )))
                        .await;
                    break;
                }
                Some(Ok(event)) => event,
            },
        };

        trace!(bytes = event.data.len(), "received SSE frame");

        let message = match serde_json::from_str::<StreamMessage>(&event.data) {
            Ok(message) => message,
            Err(e) => {
                // A malformed payload is unrecoverable for the session.
                warn!("chat stream payload was not valid JSON: {e}");
                let _ = tx
                    .send(StreamMessage::plain_error(format!(
                        "failed to parse SSE response: {e}"
                    )))
                    .await;
                break;
            }
        };

        let complete = message.is_complete();

        // A failed send means the handle was dropped; the undelivered
        // message is discarded and the session ends.
        if tx.send(message).await.is_err() {
            break;
        }

        if complete {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use std::io;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;

    /// Byte-stream wrapper that records when it is dropped, standing in for
    /// the HTTP connection so tests can observe its release.
    struct CloseRecorder<S> {
        inner: S,
        closes: Arc<AtomicUsize>,
    }

    impl<S> CloseRecorder<S> {
        fn new(inner: S) -> (Self, Arc<AtomicUsize>) {
            let closes = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    inner,
                    closes: Arc::clone(&closes),
                },
                closes,
            )
        }
    }

    impl<S> Drop for CloseRecorder<S> {
        fn drop(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl<S: Stream + Unpin> Stream for CloseRecorder<S> {
        type Item = S::Item;

        fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<S::Item>> {
            Pin::new(&mut self.get_mut().inner).poll_next(cx)
        }
    }

    fn frame(json: &str) -> std::result::Result<Bytes, io::Error> {
        Ok(Bytes::from(format!("data: {json}\n\n")))
    }

    fn read_error() -> std::result::Result<Bytes, io::Error> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"))
    }

    fn content(text: &str) -> StreamMessage {
        StreamMessage::Content {
            format: "markdown".to_string(),
            content: text.to_string(),
        }
    }

    async fn wait_for_close(closes: &Arc<AtomicUsize>) {
        timeout(Duration::from_secs(1), async {
            while closes.load(Ordering::SeqCst) == 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("worker did not release the connection in time");
    }

    #[tokio::test]
    async fn delivers_content_then_complete_in_order() {
        let (bytes, closes) = CloseRecorder::new(stream::iter(vec![
            frame(r#"{"type":"content","format":"markdown","content":"first"}"#),
            frame(r#"{"type":"content","format":"markdown","content":"second"}"#),
            frame(r#"{"type":"complete","format":"","content":""}"#),
        ]));

        let delivered: Vec<_> = spawn_consumer(bytes).collect().await;

        assert_eq!(
            delivered,
            vec![
                content("first"),
                content("second"),
                StreamMessage::Complete {
                    format: String::new(),
                    content: String::new(),
                },
            ]
        );
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn complete_stops_reading_further_frames() {
        let (bytes, closes) = CloseRecorder::new(stream::iter(vec![
            frame(r#"{"type":"complete","format":"","content":""}"#),
            frame(r#"{"type":"content","format":"markdown","content":"ignored"}"#),
        ]));

        let delivered: Vec<_> = spawn_consumer(bytes).collect().await;

        assert_eq!(delivered.len(), 1);
        assert!(delivered[0].is_complete());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn read_error_yields_terminal_error_message() {
        let (bytes, closes) = CloseRecorder::new(stream::iter(vec![
            frame(r#"{"type":"content","format":"markdown","content":"partial"}"#),
            read_error(),
        ]));

        let delivered: Vec<_> = spawn_consumer(bytes).collect().await;

        assert_eq!(delivered.len(), 2);
        assert_eq!(delivered[0], content("partial"));
        match &delivered[1] {
            StreamMessage::Error { format, content } => {
                assert_eq!(format, "plain");
                assert!(content.contains("failed to read SSE response"));
            }
            other => panic!("expected error message, got {other:?}"),
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_payload_yields_single_terminal_error() {
        let (bytes, closes) = CloseRecorder::new(stream::iter(vec![
            frame("this is not json"),
            frame(r#"{"type":"content","format":"markdown","content":"ignored"}"#),
        ]));

        let delivered: Vec<_> = spawn_consumer(bytes).collect().await;

        assert_eq!(delivered.len(), 1);
        match &delivered[0] {
            StreamMessage::Error { format, content } => {
                assert_eq!(format, "plain");
                assert!(content.contains("failed to parse SSE response"));
            }
            other => panic!("expected error message, got {other:?}"),
        }
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn server_sent_error_message_does_not_end_the_session() {
        let (bytes, closes) = CloseRecorder::new(stream::iter(vec![
            frame(r#"{"type":"error","format":"plain","content":"vendor hiccup"}"#),
            frame(r#"{"type":"content","format":"markdown","content":"recovered"}"#),
            frame(r#"{"type":"complete","format":"","content":""}"#),
        ]));

        let delivered: Vec<_> = spawn_consumer(bytes).collect().await;

        assert_eq!(delivered.len(), 3);
        assert_eq!(
            delivered[0],
            StreamMessage::Error {
                format: "plain".to_string(),
                content: "vendor hiccup".to_string(),
            }
        );
        assert!(delivered[2].is_complete());
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn end_of_stream_without_complete_ends_silently() {
        let (bytes, closes) = CloseRecorder::new(stream::iter(vec![frame(
            r#"{"type":"content","format":"markdown","content":"only"}"#,
        )]));

        let delivered: Vec<_> = spawn_consumer(bytes).collect().await;

        assert_eq!(delivered, vec![content("only")]);
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn dropping_the_handle_cancels_a_blocked_read() {
        let (bytes, closes) = CloseRecorder::new(
            stream::iter(vec![frame(
                r#"{"type":"content","format":"markdown","content":"first"}"#,
            )])
            .chain(stream::pending()),
        );

        let mut chat = spawn_consumer(bytes);
        assert_eq!(chat.next_message().await, Some(content("first")));
        assert_eq!(closes.load(Ordering::SeqCst), 0);

        drop(chat);
        wait_for_close(&closes).await;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn producer_blocks_on_a_full_slot_until_cancelled() {
        let (bytes, closes) = CloseRecorder::new(stream::iter(vec![
            frame(r#"{"type":"content","format":"markdown","content":"one"}"#),
            frame(r#"{"type":"content","format":"markdown","content":"two"}"#),
            frame(r#"{"type":"content","format":"markdown","content":"three"}"#),
        ]));

        let chat = spawn_consumer(bytes);

        // Give the worker plenty of chances to run; with one undelivered
        // message in the slot it must suspend rather than finish the stream.
        for _ in 0..32 {
            tokio::task::yield_now().await;
        }
        assert_eq!(closes.load(Ordering::SeqCst), 0);

        drop(chat);
        wait_for_close(&closes).await;
        assert_eq!(closes.load(Ordering::SeqCst), 1);
    }
}

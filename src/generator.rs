use std::pin::Pin;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::error::StreamError;
use crate::events::StreamEvent;
use crate::models::ChatRequest;

pub const DEFAULT_CHANNEL_CAPACITY: usize = 100;

/// Ordered events as produced by a response generator.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, StreamError>> + Send>>;

// ============================================================================
// GENERATOR
// ============================================================================

/// Produces the events of one response. The stream may still be producing
/// while the encoder consumes it.
pub trait ResponseGenerator: Send + Sync {
    fn generate(&self, request: &ChatRequest) -> EventStream;
}

// ============================================================================
// EVENT CHANNEL
// ============================================================================

/// Producer half of an event channel.
///
/// Every send reports whether the consumer is still there, so producers stop
/// once the client has gone away.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::Sender<Result<StreamEvent, StreamError>>,
}

impl EventSink {
    pub async fn send(&self, event: StreamEvent) -> bool {
        self.forward(Ok(event)).await
    }

    /// Pass an item through as is. `Err(StreamError::Generator(..))` reports a
    /// generator failure to the encoder.
    pub async fn forward(&self, item: Result<StreamEvent, StreamError>) -> bool {
        self.tx.send(item).await.is_ok()
    }
}

pub fn event_channel(capacity: usize) -> (EventSink, EventStream) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSink { tx }, Box::pin(ReceiverStream::new(rx)))
}

// ============================================================================
// SCRIPTED GENERATOR
// ============================================================================

/// Replays the raw `parts` of a request from a background task.
#[derive(Debug, Clone)]
pub struct ScriptedGenerator {
    capacity: usize,
}

impl ScriptedGenerator {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }
}

impl Default for ScriptedGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }
}

impl ResponseGenerator for ScriptedGenerator {
    fn generate(&self, request: &ChatRequest) -> EventStream {
        let (sink, stream) = event_channel(self.capacity);
        let parts = request.parts.clone();

        tokio::spawn(async move {
            let total = parts.len();
            for (index, value) in parts.into_iter().enumerate() {
                let delivered = match StreamEvent::try_from(value) {
                    Ok(event) => sink.send(event).await,
                    Err(e) => {
                        // Nothing after a malformed item is replayed.
                        sink.forward(Err(e)).await;
                        return;
                    }
                };
                if !delivered {
                    log::debug!("Consumer gone after {}/{} parts, stopping", index, total);
                    return;
                }
            }
        });

        stream
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_channel_delivers_in_order() {
        let (sink, stream) = event_channel(4);

        tokio::spawn(async move {
            assert!(sink.send(StreamEvent::text("a")).await);
            assert!(sink.send(StreamEvent::part("sources", json!({}))).await);
            assert!(sink.forward(Err(StreamError::generator("rate limited"))).await);
        });

        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].as_ref().unwrap(), &StreamEvent::text("a"));
        assert!(matches!(items[1], Ok(StreamEvent::Part(_))));
        assert!(matches!(items[2], Err(StreamError::Generator(_))));
    }

    #[tokio::test]
    async fn test_send_reports_closed_consumer() {
        let (sink, stream) = event_channel(1);
        drop(stream);

        assert!(!sink.send(StreamEvent::text("lost")).await);
    }

    #[tokio::test]
    async fn test_scripted_generator_replays_parts() {
        let request = ChatRequest {
            messages: vec![],
            parts: vec![json!("hello"), json!({"type": "weather", "data": {"t": 1}, "id": "w"})],
        };

        let items: Vec<_> = ScriptedGenerator::default().generate(&request).collect().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_ref().unwrap(), &StreamEvent::text("hello"));
        match &items[1] {
            Ok(StreamEvent::Part(part)) => assert_eq!(part.id.as_deref(), Some("w")),
            other => panic!("Expected Part event, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_scripted_generator_stops_at_malformed_part() {
        let request = ChatRequest {
            messages: vec![],
            parts: vec![json!("a"), json!(false), json!("b")],
        };

        let items: Vec<_> = ScriptedGenerator::new(1).generate(&request).collect().await;
        assert_eq!(items.len(), 2);
        assert!(matches!(items[1], Err(StreamError::MalformedEvent(_))));
    }
}

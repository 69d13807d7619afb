use futures::{Stream, StreamExt};
use serde::Serialize;
use serde_json::Value;

use super::{Frame, FrameKind, FrameStream, Pacing, StreamEncoder, StreamId};
use crate::error::StreamError;
use crate::events::{StreamEvent, StructuredPart};

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_FRAME: &str = "data: [DONE]\n\n";
pub const CONTENT_TYPE: &str = "text/event-stream";

/// Structured parts must carry this prefix or the client drops the stream.
pub const DATA_PART_PREFIX: &str = "data-";
pub const ERROR_PART_TYPE: &str = "error";

// ============================================================================
// WIRE CHUNKS
// ============================================================================

#[derive(Debug, Serialize)]
struct TextChunk<'a> {
    id: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    delta: Option<String>,
}

#[derive(Debug, Serialize)]
struct DataChunk<'a> {
    #[serde(rename = "type")]
    kind: String,
    data: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<&'a str>,
}

fn sse_frame<T: Serialize>(kind: FrameKind, chunk: &T) -> Result<Frame, StreamError> {
    let json = serde_json::to_string(chunk)?;
    Ok(Frame::new(kind, format!("{}{}\n\n", DATA_PREFIX, json)))
}

// ============================================================================
// ENCODER
// ============================================================================

/// Chunked SSE encoder.
///
/// Each text event becomes `text-start`, one `text-delta` per space
/// separated token, then `text-end`, all sharing a freshly minted id. Tokens
/// keep any embedded newlines. Each structured part becomes a single
/// `data-<type>` frame.
#[derive(Debug, Clone, Default)]
pub struct SseEncoder {
    pacing: Pacing,
    query: String,
    done_marker: bool,
}

impl SseEncoder {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            ..Default::default()
        }
    }

    /// Leading text streamed before any event, usually the echoed user query.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Terminate completed streams with `data: [DONE]`.
    pub fn with_done_marker(mut self, enabled: bool) -> Self {
        self.done_marker = enabled;
        self
    }

    pub fn text_frames(content: &str) -> Result<Vec<Frame>, StreamError> {
        Self::text_frames_with_id(&StreamId::mint(), content)
    }

    pub fn text_frames_with_id(id: &StreamId, content: &str) -> Result<Vec<Frame>, StreamError> {
        let id = id.as_str();
        let mut frames = Vec::with_capacity(2);

        frames.push(sse_frame(
            FrameKind::TextStart,
            &TextChunk {
                id,
                kind: FrameKind::TextStart.as_ref(),
                delta: None,
            },
        )?);

        for token in content.split(' ').filter(|t| !t.trim().is_empty()) {
            frames.push(sse_frame(
                FrameKind::TextDelta,
                &TextChunk {
                    id,
                    kind: FrameKind::TextDelta.as_ref(),
                    delta: Some(format!("{} ", token)),
                },
            )?);
        }

        frames.push(sse_frame(
            FrameKind::TextEnd,
            &TextChunk {
                id,
                kind: FrameKind::TextEnd.as_ref(),
                delta: None,
            },
        )?);

        Ok(frames)
    }

    pub fn data_frame(part: &StructuredPart) -> Result<Frame, StreamError> {
        sse_frame(
            FrameKind::Data,
            &DataChunk {
                kind: format!("{}{}", DATA_PART_PREFIX, part.part_type),
                data: &part.data,
                id: part.id.as_deref(),
            },
        )
    }

    pub fn error_frame(message: &str) -> Result<Frame, StreamError> {
        sse_frame(
            FrameKind::Error,
            &DataChunk {
                kind: format!("{}{}", DATA_PART_PREFIX, ERROR_PART_TYPE),
                data: &serde_json::json!({ "message": message }),
                id: None,
            },
        )
    }

    pub fn done_frame() -> Frame {
        Frame::new(FrameKind::Done, DONE_FRAME.to_string())
    }

    fn write_text(
        pacing: Pacing,
        content: String,
    ) -> impl Stream<Item = Result<Frame, StreamError>> + Send {
        async_stream::try_stream! {
            for frame in Self::text_frames(&content)? {
                let is_delta = frame.kind() == FrameKind::TextDelta;
                yield frame;
                if is_delta {
                    pacing.after_token().await;
                }
            }
        }
    }
}

impl StreamEncoder for SseEncoder {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    fn encode<S>(self, events: S) -> FrameStream
    where
        S: Stream<Item = Result<StreamEvent, StreamError>> + Send + 'static,
    {
        let SseEncoder {
            pacing,
            query,
            done_marker,
        } = self;

        Box::pin(async_stream::try_stream! {
            futures::pin_mut!(events);

            if !query.is_empty() {
                for await frame in Self::write_text(pacing, query) {
                    yield frame?;
                }
            }

            let mut count = 0usize;
            while let Some(item) = events.next().await {
                count += 1;
                match item {
                    Ok(StreamEvent::Text(content)) => {
                        for await frame in Self::write_text(pacing, content) {
                            yield frame?;
                        }
                    }
                    Ok(StreamEvent::Part(part)) => {
                        yield Self::data_frame(&part)?;
                        pacing.after_part().await;
                    }
                    Ok(StreamEvent::Error(message)) => {
                        yield Self::error_frame(&message)?;
                        break;
                    }
                    Err(StreamError::Generator(message)) => {
                        log::warn!("Generator failed mid-stream: {}", message);
                        yield Self::error_frame(&message)?;
                        break;
                    }
                    Err(e) => Err(e)?,
                }
            }

            if done_marker {
                yield Self::done_frame();
            }
            log::debug!("SSE stream finished after {} events", count);
        })
    }
}

// ============================================================================
// TESTS
// ============================================================================

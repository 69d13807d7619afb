use futures::{Stream, StreamExt};

use super::json::to_legacy_string;
use super::{Frame, FrameKind, FrameStream, Pacing, StreamEncoder};
use crate::error::StreamError;
use crate::events::{StreamEvent, StructuredPart};

pub const TEXT_PREFIX: &str = "0:";
pub const DATA_PREFIX: &str = "8:";
pub const ERROR_PREFIX: &str = "3:";

pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Prefixed data-stream encoder: one `<prefix>:<json>\n` line per event.
///
/// The first event is preceded by an empty text line so the client sees the
/// stream open before any real content is ready.
#[derive(Debug, Clone, Default)]
pub struct LegacyEncoder {
    pacing: Pacing,
}

impl LegacyEncoder {
    pub fn new(pacing: Pacing) -> Self {
        Self { pacing }
    }

    pub fn text_frame(token: &str) -> Result<Frame, StreamError> {
        let wire = format!("{}{}\n", TEXT_PREFIX, to_legacy_string(token)?);
        Ok(Frame::new(FrameKind::Text, wire))
    }

    /// The payload is wrapped in a one-element array, the shape clients expect.
    pub fn data_frame(part: &StructuredPart) -> Result<Frame, StreamError> {
        let wire = format!("{}[{}]\n", DATA_PREFIX, to_legacy_string(part)?);
        Ok(Frame::new(FrameKind::Data, wire))
    }

    pub fn error_frame(message: &str) -> Result<Frame, StreamError> {
        let wire = format!("{}{}\n", ERROR_PREFIX, to_legacy_string(message)?);
        Ok(Frame::new(FrameKind::Error, wire))
    }

    fn event_frame(event: &StreamEvent) -> Result<Frame, StreamError> {
        match event {
            StreamEvent::Text(content) => Self::text_frame(content),
            StreamEvent::Part(part) => Self::data_frame(part),
            StreamEvent::Error(message) => Self::error_frame(message),
        }
    }
}

impl StreamEncoder for LegacyEncoder {
    fn content_type(&self) -> &'static str {
        CONTENT_TYPE
    }

    fn encode<S>(self, events: S) -> FrameStream
    where
        S: Stream<Item = Result<StreamEvent, StreamError>> + Send + 'static,
    {
        let pacing = self.pacing;

        Box::pin(async_stream::try_stream! {
            futures::pin_mut!(events);
            let mut count = 0usize;

            while let Some(item) = events.next().await {
                if count == 0 {
                    yield Self::text_frame("")?;
                }
                count += 1;
                pacing.before_legacy_event().await;

                match item {
                    Ok(event) => {
                        yield Self::event_frame(&event)?;
                        if event.is_terminal() {
                            break;
                        }
                    }
                    Err(StreamError::Generator(message)) => {
                        log::warn!("Generator failed mid-stream: {}", message);
                        yield Self::error_frame(&message)?;
                        break;
                    }
                    Err(e) => Err(e)?,
                }
            }

            log::debug!("Legacy stream finished after {} events", count);
        })
    }
}

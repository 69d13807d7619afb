pub mod json;
pub mod legacy;
pub mod pacing;
pub mod sse;

use std::pin::Pin;

use bytes::Bytes;
use futures::Stream;
use strum_macros::{AsRefStr, Display, EnumString};

use crate::error::StreamError;
use crate::events::StreamEvent;

pub use legacy::LegacyEncoder;
pub use pacing::{Pacing, StreamId};
pub use sse::SseEncoder;

/// Lazily produced frames of one response. Ends after the first `Err`.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<Frame, StreamError>> + Send>>;

// ============================================================================
// FRAME
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, AsRefStr, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum FrameKind {
    TextStart,
    TextDelta,
    TextEnd,
    /// Legacy `0:` line.
    Text,
    Data,
    Error,
    Done,
}

/// One self-contained unit of wire output, delimiter included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    kind: FrameKind,
    wire: String,
}

impl Frame {
    pub(crate) fn new(kind: FrameKind, wire: String) -> Self {
        Self { kind, wire }
    }

    pub fn kind(&self) -> FrameKind {
        self.kind
    }

    pub fn as_str(&self) -> &str {
        &self.wire
    }

    pub fn into_bytes(self) -> Bytes {
        Bytes::from(self.wire)
    }
}

// ============================================================================
// ENCODER
// ============================================================================

/// Serializes an ordered event sequence into wire frames.
///
/// All frames of one event are yielded before the next event is pulled from
/// `events`, and pacing delays only occur between frames.
pub trait StreamEncoder {
    /// Value for the response `Content-Type` header.
    fn content_type(&self) -> &'static str;

    fn encode<S>(self, events: S) -> FrameStream
    where
        S: Stream<Item = Result<StreamEvent, StreamError>> + Send + 'static;
}

// ============================================================================
// PROTOCOL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, AsRefStr, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Protocol {
    /// Chunked SSE generation: `data: <json>\n\n` frames.
    #[default]
    Sse,
    /// Prefixed data-stream generation: `<prefix>:<json>\n` lines.
    Legacy,
}

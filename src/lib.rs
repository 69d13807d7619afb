pub mod encoder;
pub mod error;
pub mod events;
pub mod generator;
pub mod handlers;
pub mod init;
pub mod models;

pub use crate::encoder::{Frame, FrameKind, FrameStream, LegacyEncoder, Pacing, Protocol, SseEncoder, StreamEncoder, StreamId};
pub use crate::error::{AppError, StreamError};
pub use crate::events::{StreamEvent, StructuredPart};
pub use crate::generator::{EventSink, EventStream, ResponseGenerator, ScriptedGenerator, event_channel};
pub use crate::init::{AppState, Config};
pub use crate::models::ChatRequest;

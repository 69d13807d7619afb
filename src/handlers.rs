use std::sync::Arc;

use axum::Json;
use axum::body::Body;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{HeaderValue, header};
use axum::response::Response;
use futures::{Stream, StreamExt};
use serde_json::{Value, json};

use crate::encoder::{LegacyEncoder, Protocol, SseEncoder, StreamEncoder};
use crate::error::{AppError, Result, StreamError};
use crate::events::StreamEvent;
use crate::init::AppState;
use crate::models::ChatRequest;

// ============================================================================
// CHAT STREAM HANDLERS
// ============================================================================

/// POST /api/chat
///
/// Streams the response with the configured default protocol.
pub async fn chat_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response> {
    let protocol = state.stream.protocol;
    stream_response(&state, payload, protocol)
}

/// POST /api/chat/sse
///
/// Returns: `text/event-stream` of `data: <json>` frames
pub async fn chat_sse_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response> {
    stream_response(&state, payload, Protocol::Sse)
}

/// POST /api/chat/legacy
///
/// Returns: newline-delimited `<prefix>:<json>` lines
pub async fn chat_legacy_handler(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Response> {
    stream_response(&state, payload, Protocol::Legacy)
}

pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn stream_response(
    state: &AppState,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
    protocol: Protocol,
) -> Result<Response> {
    let Json(request) = payload.map_err(|e| AppError::bad_request(e.body_text()))?;
    let query = request.query();
    let events = state.generator.generate(&request);
    let pacing = state.stream.pacing;

    log::debug!(
        "Streaming {} response: {} parts, query {:?}",
        protocol,
        request.parts.len(),
        query
    );

    let response = match protocol {
        Protocol::Sse => {
            let encoder = SseEncoder::new(pacing)
                .with_query(query)
                .with_done_marker(state.stream.done_marker);
            encoded_response(encoder, events)
        }
        Protocol::Legacy => {
            // The legacy generation carries the query as an ordinary first event.
            let leading = (!query.is_empty()).then(|| Ok::<_, StreamError>(StreamEvent::Text(query)));
            let events = futures::stream::iter(leading).chain(events);
            encoded_response(LegacyEncoder::new(pacing), events)
        }
    };

    Ok(response)
}

fn encoded_response<E, S>(encoder: E, events: S) -> Response
where
    E: StreamEncoder,
    S: Stream<Item = std::result::Result<StreamEvent, StreamError>> + Send + 'static,
{
    let content_type = encoder.content_type();
    let is_sse = content_type == crate::encoder::sse::CONTENT_TYPE;

    // An Err aborts the body; the client sees a truncated stream, never a torn frame.
    let body = encoder.encode(events).map(|frame| match frame {
        Ok(frame) => Ok(frame.into_bytes()),
        Err(e) => {
            log::error!("Aborting response stream: {}", e);
            Err(e)
        }
    });

    let mut response = Response::new(Body::from_stream(body));
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
    headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
    if is_sse {
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    }
    response
}

// ============================================================================
// TESTS
// ============================================================================

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_TOKEN_DELAY: Duration = Duration::from_millis(30);
pub const DEFAULT_PART_DELAY: Duration = Duration::from_millis(1000);
pub const DEFAULT_LEGACY_EVENT_DELAY: Duration = Duration::from_millis(100);

// ============================================================================
// Pacing
// ============================================================================

/// Delay magnitudes used to emulate a live generation process.
///
/// Delays only ever happen between whole frames, so they never tear the
/// frames of one event apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// After each SSE text-delta frame.
    pub token_delay: Duration,
    /// After each SSE structured-part frame.
    pub part_delay: Duration,
    /// Before each legacy frame except the stream-start frame.
    pub legacy_event_delay: Duration,
}

impl Pacing {
    pub fn none() -> Self {
        Self {
            token_delay: Duration::ZERO,
            part_delay: Duration::ZERO,
            legacy_event_delay: Duration::ZERO,
        }
    }

    pub async fn after_token(&self) {
        pause(self.token_delay).await;
    }

    pub async fn after_part(&self) {
        pause(self.part_delay).await;
    }

    pub async fn before_legacy_event(&self) {
        pause(self.legacy_event_delay).await;
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            token_delay: DEFAULT_TOKEN_DELAY,
            part_delay: DEFAULT_PART_DELAY,
            legacy_event_delay: DEFAULT_LEGACY_EVENT_DELAY,
        }
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

// ============================================================================
// Stream Identifier
// ============================================================================

/// Groups the start, delta and end frames of one text event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamId(String);

impl StreamId {
    pub fn mint() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for StreamId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[test]
    fn test_minted_ids_are_unique_uuids() {
        let a = StreamId::mint();
        let b = StreamId::mint();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn test_default_pacing() {
        let pacing = Pacing::default();
        assert!(pacing.part_delay > pacing.token_delay);
        assert_eq!(pacing.legacy_event_delay, Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_advances_clock() {
        let pacing = Pacing::default();
        let start = Instant::now();
        pacing.after_token().await;
        pacing.after_part().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1030));
        assert!(elapsed < Duration::from_millis(1040));
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_pacing_does_not_sleep() {
        let pacing = Pacing::none();
        let start = Instant::now();
        pacing.after_token().await;
        pacing.before_legacy_event().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}

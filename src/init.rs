use std::error::Error;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::encoder::{Pacing, Protocol};
use crate::generator::{DEFAULT_CHANNEL_CAPACITY, ResponseGenerator, ScriptedGenerator};

// ============================================================================
// Configuration
// ============================================================================

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Encoder used by `/api/chat`.
    pub protocol: Protocol,
    pub pacing: Pacing,
    pub done_marker: bool,
    pub channel_capacity: usize,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            protocol: Protocol::default(),
            pacing: Pacing::default(),
            done_marker: false,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn Error>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, Box<dyn Error>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = StreamConfig::default();
        let millis = |key: &str, default: Duration| -> Result<Duration, Box<dyn Error>> {
            let ms = parse_or(&lookup, key, default.as_millis() as u64)?;
            Ok(Duration::from_millis(ms))
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "PORT", 8000)?,
            stream: StreamConfig {
                protocol: parse_or(&lookup, "STREAM_PROTOCOL", defaults.protocol)?,
                pacing: Pacing {
                    token_delay: millis("STREAM_TOKEN_DELAY_MS", defaults.pacing.token_delay)?,
                    part_delay: millis("STREAM_PART_DELAY_MS", defaults.pacing.part_delay)?,
                    legacy_event_delay: millis(
                        "LEGACY_EVENT_DELAY_MS",
                        defaults.pacing.legacy_event_delay,
                    )?,
                },
                done_marker: parse_or(&lookup, "SSE_DONE_MARKER", defaults.done_marker)?,
                channel_capacity: parse_or(
                    &lookup,
                    "EVENT_CHANNEL_CAPACITY",
                    defaults.channel_capacity,
                )?,
            },
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, Box<dyn Error>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| format!("invalid {}={:?}: {}", key, raw, e).into()),
        None => Ok(default),
    }
}

// ============================================================================
// Application State
// ============================================================================

#[derive(Clone)]
pub struct AppState {
    pub stream: StreamConfig,
    pub generator: Arc<dyn ResponseGenerator>,
}

impl AppState {
    pub fn new(stream: StreamConfig, generator: Arc<dyn ResponseGenerator>) -> Self {
        Self { stream, generator }
    }
}

pub fn app_init() -> Result<(Config, Arc<AppState>), Box<dyn Error>> {
    let config = Config::from_env()?;
    log::info!("✅ Configuration loaded");

    let generator = Arc::new(ScriptedGenerator::new(config.stream.channel_capacity));
    let state = Arc::new(AppState::new(config.stream.clone(), generator));
    Ok((config, state))
}

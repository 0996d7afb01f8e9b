//! Audio & Voice Announcements Module
//!
//! Speech synthesis contract, narration text building and the announcer
//! that keeps at most one utterance audible at a time.

pub mod announcer;
pub mod narration;
pub mod tts;

use thiserror::Error;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::task::JoinHandle;
use uuid::Uuid;

// Re-export main types
pub use announcer::VoiceAnnouncer;
pub use narration::{compose_announcement, format_compact_distance, format_distance};
pub use tts::{SimulatedTtsEngine, SpeechOutcome, TtsEngine, Utterance, VoiceSettings};

/// Errors that can occur during audio operations
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("Speech engine not available")]
    EngineNotAvailable,

    #[error("Voice not available for locale: {0}")]
    VoiceNotAvailable(String),
}

/// Audio configuration
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Master enable for spoken announcements
    pub enabled: bool,
    /// Voice volume (0-100)
    pub volume: u8,
    /// Speech rate multiplier (0.5 - 2.0)
    pub speech_rate: f32,
    /// Preferred voice name (engine-dependent)
    pub preferred_voice: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            volume: 100,
            speech_rate: 1.0,
            preferred_voice: None,
        }
    }
}

/// Speech engine events for monitoring
#[derive(Debug, Clone, PartialEq)]
pub enum AudioEvent {
    /// Speech started
    SpeechStarted { id: Uuid, text: String },
    /// Speech ran to completion
    SpeechCompleted { id: Uuid },
    /// Speech was interrupted
    SpeechCancelled { id: Uuid },
    /// `speak` was refused
    Error { message: String },
}

/// Log speech engine events until the engine goes away.
///
/// Events dropped because the logger fell behind are counted, not fatal.
pub fn spawn_event_logger(mut events: broadcast::Receiver<AudioEvent>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => log_event(&event),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!("Speech logger skipped {} events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    })
}

fn log_event(event: &AudioEvent) {
    match event {
        AudioEvent::SpeechStarted { id, .. } => tracing::debug!("Speech {} started", id),
        AudioEvent::SpeechCompleted { id } => tracing::debug!("Speech {} finished", id),
        AudioEvent::SpeechCancelled { id } => tracing::debug!("Speech {} cancelled", id),
        AudioEvent::Error { message } => tracing::warn!("Speech error: {}", message),
    }
}

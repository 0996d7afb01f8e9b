//! Text-to-Speech Engine
//!
//! `TtsEngine` mirrors platform synthesizers: `speak` queues playback and
//! returns immediately, completion is reported through the returned
//! `Utterance` and the event channel, and `cancel` interrupts at once.

use super::{AudioConfig, AudioError, AudioEvent};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, watch};
use uuid::Uuid;

/// How an utterance ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechOutcome {
    /// Spoken to the end
    Completed,
    /// Interrupted by `cancel` or a newer utterance
    Cancelled,
}

/// Voice parameters for one utterance.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    /// Locale identifier, e.g. "fr-FR"
    pub locale: String,
    /// Speech rate multiplier (0.5 - 2.0)
    pub rate: f32,
    /// Pitch multiplier
    pub pitch: f32,
    /// Volume (0.0 - 1.0)
    pub volume: f32,
    /// Preferred voice name
    pub voice: Option<String>,
}

impl VoiceSettings {
    /// Default voice for a locale.
    pub fn for_locale(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        }
    }

    /// Voice derived from the audio configuration.
    pub fn from_config(config: &AudioConfig, locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            rate: config.speech_rate.clamp(0.5, 2.0),
            pitch: 1.0,
            volume: f32::from(config.volume.min(100)) / 100.0,
            voice: config.preferred_voice.clone(),
        }
    }
}

/// Handle to a queued utterance.
#[derive(Debug)]
pub struct Utterance {
    id: Uuid,
    outcome: oneshot::Receiver<SpeechOutcome>,
}

impl Utterance {
    /// Pair an utterance id with the channel its engine reports on.
    pub fn new(id: Uuid, outcome: oneshot::Receiver<SpeechOutcome>) -> Self {
        Self { id, outcome }
    }

    /// Utterance identifier, matching the ids in `AudioEvent`s.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Wait for the utterance to end.
    ///
    /// An engine that goes away without reporting counts as a cancellation.
    pub async fn finished(self) -> SpeechOutcome {
        self.outcome.await.unwrap_or(SpeechOutcome::Cancelled)
    }
}

/// Trait for speech synthesis engines
pub trait TtsEngine: Send + Sync {
    /// Start speaking `text`; returns once playback is queued.
    fn speak(&self, text: &str, voice: &VoiceSettings) -> Result<Utterance, AudioError>;

    /// Interrupt whatever is being spoken, immediately.
    fn cancel(&self);

    /// Check if currently speaking
    fn is_speaking(&self) -> bool;

    /// Subscribe to speech events
    fn subscribe_events(&self) -> broadcast::Receiver<AudioEvent>;
}

/// Speech engine that simulates playback time without producing sound.
///
/// Duration scales with text length and speech rate. Playback runs as a
/// Tokio task; outside a runtime `speak` fails with `EngineNotAvailable`.
pub struct SimulatedTtsEngine {
    locales: Vec<String>,
    ms_per_char: u64,
    max_duration: Duration,
    current: Arc<Mutex<Option<Uuid>>>,
    cancel_tx: watch::Sender<u64>,
    event_tx: broadcast::Sender<AudioEvent>,
}

impl Default for SimulatedTtsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTtsEngine {
    /// Create an engine with French and English voices.
    pub fn new() -> Self {
        let (cancel_tx, _) = watch::channel(0);
        let (event_tx, _) = broadcast::channel(100);

        Self {
            locales: vec!["fr-FR".to_string(), "en-US".to_string()],
            ms_per_char: 50,
            max_duration: Duration::from_secs(20),
            current: Arc::new(Mutex::new(None)),
            cancel_tx,
            event_tx,
        }
    }

    /// Change the simulated speaking pace.
    pub fn with_pace(mut self, ms_per_char: u64, max_duration: Duration) -> Self {
        self.ms_per_char = ms_per_char;
        self.max_duration = max_duration;
        self
    }

    /// Simulated playback time for a text.
    pub fn duration_for(&self, text: &str, rate: f32) -> Duration {
        let chars = text.chars().count() as f64;
        let rate = f64::from(rate.clamp(0.5, 2.0));
        let ms = (chars * self.ms_per_char as f64 / rate) as u64;
        Duration::from_millis(ms).min(self.max_duration)
    }

    fn supports_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l.eq_ignore_ascii_case(locale))
    }

    fn start_playback(&self, text: &str, voice: &VoiceSettings) -> Result<Utterance, AudioError> {
        if !self.supports_locale(&voice.locale) {
            return Err(AudioError::VoiceNotAvailable(voice.locale.clone()));
        }
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| AudioError::EngineNotAvailable)?;

        let id = Uuid::new_v4();
        let duration = self.duration_for(text, voice.rate);
        // Subscribing marks the current generation as seen, so only a later
        // cancel interrupts this utterance.
        let mut cancel_rx = self.cancel_tx.subscribe();
        let (outcome_tx, outcome_rx) = oneshot::channel();

        *self.current.lock() = Some(id);
        tracing::debug!("TTS speaking ({}): {}", voice.locale, text);
        let _ = self.event_tx.send(AudioEvent::SpeechStarted {
            id,
            text: text.to_string(),
        });

        let current = Arc::clone(&self.current);
        let event_tx = self.event_tx.clone();
        runtime.spawn(async move {
            let outcome = tokio::select! {
                _ = tokio::time::sleep(duration) => SpeechOutcome::Completed,
                _ = cancel_rx.changed() => SpeechOutcome::Cancelled,
            };

            {
                let mut current = current.lock();
                if *current == Some(id) {
                    *current = None;
                }
            }

            let event = match outcome {
                SpeechOutcome::Completed => AudioEvent::SpeechCompleted { id },
                SpeechOutcome::Cancelled => AudioEvent::SpeechCancelled { id },
            };
            let _ = event_tx.send(event);
            let _ = outcome_tx.send(outcome);
        });

        Ok(Utterance::new(id, outcome_rx))
    }
}

impl TtsEngine for SimulatedTtsEngine {
    fn speak(&self, text: &str, voice: &VoiceSettings) -> Result<Utterance, AudioError> {
        self.start_playback(text, voice).inspect_err(|e| {
            tracing::warn!("TTS refused utterance: {}", e);
            let _ = self.event_tx.send(AudioEvent::Error {
                message: e.to_string(),
            });
        })
    }

    fn cancel(&self) {
        self.cancel_tx.send_modify(|generation| *generation += 1);
    }

    fn is_speaking(&self) -> bool {
        self.current.lock().is_some()
    }

    fn subscribe_events(&self) -> broadcast::Receiver<AudioEvent> {
        self.event_tx.subscribe()
    }
}

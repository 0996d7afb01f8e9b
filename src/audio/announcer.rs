//! Voice announcer for ranked POI lists.
//!
//! Every announcement cancels whatever is being spoken before starting, so
//! at most one utterance is audible and the newest always wins.

use super::narration::compose_announcement;
use super::tts::{SpeechOutcome, TtsEngine, VoiceSettings};
use super::AudioConfig;
use crate::geo::Position;
use crate::i18n::Phrasebook;
use crate::poi::RankedPoi;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Turns ranked POIs into speech.
pub struct VoiceAnnouncer {
    engine: Arc<dyn TtsEngine>,
    phrases: Phrasebook,
    voice: VoiceSettings,
    enabled: bool,
    last_text: watch::Sender<Option<String>>,
}

impl VoiceAnnouncer {
    /// Create an announcer speaking in the phrasebook's language.
    pub fn new(engine: Arc<dyn TtsEngine>, phrases: Phrasebook, config: &AudioConfig) -> Self {
        let voice = VoiceSettings::from_config(config, phrases.language().locale());
        let (last_text, _) = watch::channel(None);

        Self {
            engine,
            phrases,
            voice,
            enabled: config.enabled,
            last_text,
        }
    }

    /// Speak the ranked list, interrupting any announcement in progress.
    ///
    /// Returns the utterance id when speech started. Speech failures are
    /// logged and otherwise ignored.
    pub fn announce(&self, pois: &[RankedPoi], from: Position) -> Option<Uuid> {
        let text = compose_announcement(pois, &self.phrases);
        info!("Voice announcement from {} ({} POIs): {}", from, pois.len(), text);
        self.last_text.send_replace(Some(text.clone()));

        if !self.enabled {
            debug!("Spoken announcements disabled, skipping speech");
            return None;
        }

        self.engine.cancel();

        let utterance = match self.engine.speak(&text, &self.voice) {
            Ok(utterance) => utterance,
            Err(e) => {
                warn!("Speech failed: {}", e);
                return None;
            }
        };

        let id = utterance.id();
        tokio::spawn(async move {
            match utterance.finished().await {
                SpeechOutcome::Completed => debug!("Announcement {} finished", id),
                SpeechOutcome::Cancelled => debug!("Announcement {} cancelled", id),
            }
        });

        Some(id)
    }

    /// Interrupt any announcement in progress.
    pub fn cancel(&self) {
        if self.engine.is_speaking() {
            debug!("Stopping current announcement");
        }
        self.engine.cancel();
    }

    /// Whether the engine is currently speaking.
    pub fn is_speaking(&self) -> bool {
        self.engine.is_speaking()
    }

    /// Text of the most recent announcement.
    pub fn last_announcement(&self) -> Option<String> {
        self.last_text.borrow().clone()
    }

    /// Observe announcement text changes.
    pub fn subscribe_text(&self) -> watch::Receiver<Option<String>> {
        self.last_text.subscribe()
    }

    /// Voice used for announcements.
    pub fn voice(&self) -> &VoiceSettings {
        &self.voice
    }
}

//! End-to-end discovery and announcement tests.

use super::support::{chez_paul, place, scheduler, RecordingTts, ScriptedProvider, ORIGIN};
use poivoice::audio::{AudioConfig, AudioEvent, SimulatedTtsEngine, TtsEngine, VoiceAnnouncer};
use poivoice::discovery::DiscoveryEngine;
use poivoice::i18n::{Language, Phrasebook};
use poivoice::poi::{PoiCandidate, PoiCategory, RankedPoi};
use poivoice::AnnouncementScheduler;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test(start_paused = true)]
async fn test_empty_area_announces_nothing_nearby_once() {
    let provider = Arc::new(ScriptedProvider::empty());
    let engine = Arc::new(RecordingTts::new());
    let scheduler = scheduler(provider, Arc::clone(&engine));

    scheduler.start(ORIGIN);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(
        engine.spoken(),
        vec!["Aucun point d'intérêt trouvé à proximité".to_string()]
    );
}

#[tokio::test(start_paused = true)]
async fn test_announcement_lists_pois_closest_first() {
    let pharmacy = PoiCandidate::new(
        "Pharmacie Rivoli",
        PoiCategory::Pharmacy,
        poivoice::Position::new(48.8575, 2.3540),
    );
    let provider = Arc::new(ScriptedProvider::new(vec![
        place(pharmacy, &[]),
        place(chez_paul(), &["café"]),
    ]));
    let engine = Arc::new(RecordingTts::new());
    let scheduler = scheduler(provider, Arc::clone(&engine));

    scheduler.start(ORIGIN);
    tokio::time::sleep(Duration::from_secs(1)).await;

    let spoken = engine.spoken();
    assert_eq!(spoken.len(), 1);
    let text = &spoken[0];
    assert!(text.starts_with("Points d'intérêt à proximité:"));
    let paul = text.find("Restaurant Chez Paul à 23 mètres").unwrap();
    let pharmacy = text.find("Pharmacie Pharmacie Rivoli à").unwrap();
    assert!(paul < pharmacy);
    assert_eq!(text.matches("Chez Paul").count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_newer_announcement_interrupts_older() {
    let engine = Arc::new(SimulatedTtsEngine::new());
    let mut events = engine.subscribe_events();
    let announcer = VoiceAnnouncer::new(
        engine.clone(),
        Phrasebook::new(Language::French),
        &AudioConfig::default(),
    );
    let pois = vec![RankedPoi::from_origin(chez_paul(), &ORIGIN)];

    let first = announcer.announce(&pois, ORIGIN).unwrap();
    let second = announcer.announce(&[], ORIGIN).unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;

    let mut cancelled = Vec::new();
    let mut completed = Vec::new();
    while let Ok(event) = events.try_recv() {
        match event {
            AudioEvent::SpeechCancelled { id } => cancelled.push(id),
            AudioEvent::SpeechCompleted { id } => completed.push(id),
            _ => {}
        }
    }

    assert_eq!(cancelled, vec![first]);
    assert_eq!(completed, vec![second]);
    assert_eq!(
        announcer.last_announcement().as_deref(),
        Some("Aucun point d'intérêt trouvé à proximité")
    );
}

#[tokio::test(start_paused = true)]
async fn test_english_session_with_simulated_engine() {
    let provider = Arc::new(ScriptedProvider::new(vec![place(chez_paul(), &[])]));
    let engine = Arc::new(SimulatedTtsEngine::new());
    let announcer = Arc::new(VoiceAnnouncer::new(
        engine.clone(),
        Phrasebook::new(Language::English),
        &AudioConfig::default(),
    ));
    let mut text = announcer.subscribe_text();
    let scheduler = AnnouncementScheduler::with_default_interval(
        DiscoveryEngine::with_defaults(provider),
        Arc::clone(&announcer),
    );

    scheduler.start(ORIGIN);
    text.changed().await.unwrap();

    let spoken = text.borrow().clone().unwrap();
    assert!(spoken.contains("Restaurant Chez Paul at 23 meters"));
    assert_eq!(announcer.voice().locale, "en-US");
    assert!(engine.is_speaking());

    scheduler.stop();
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(!engine.is_speaking());
}

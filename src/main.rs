//! PoiVoice - Nearby Point-of-Interest Announcements
//!
//! Demo entry point: replays a location source, announces nearby POIs from a
//! place catalog and tracks the distance to the closest one.

use anyhow::Context;
use poivoice::audio::{spawn_event_logger, SimulatedTtsEngine, TtsEngine, VoiceAnnouncer};
use poivoice::discovery::DiscoveryEngine;
use poivoice::i18n::Phrasebook;
use poivoice::location::{LocationFeed, StaticLocationFeed, TrackReplayFeed};
use poivoice::poi::FixtureSearchProvider;
use poivoice::storage::config::load_config;
use poivoice::tracking::{LoggingLiveActivity, ProximityTracker};
use poivoice::{AnnouncementScheduler, PoiSession};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const BUNDLED_PLACES: &str = include_str!("../data/paris_places.json");

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting PoiVoice v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config().context("Could not load configuration")?;

    let provider = match &config.demo.places_path {
        Some(path) => FixtureSearchProvider::from_json_file(path)?,
        None => FixtureSearchProvider::from_json_str(BUNDLED_PLACES)?,
    };
    tracing::info!("Place catalog has {} entries", provider.len());

    let feed: Box<dyn LocationFeed> = match &config.demo.track_path {
        Some(path) => Box::new(TrackReplayFeed::from_gpx_file(
            path,
            Duration::from_millis(config.demo.replay_interval_ms),
        )?),
        None => Box::new(StaticLocationFeed::new(config.demo.start_position())),
    };

    let mut phrases = Phrasebook::for_locale(&config.announcements.locale);
    if let Some(path) = &config.announcements.phrases_path {
        phrases = phrases
            .with_overrides(path)
            .with_context(|| format!("Could not load phrases from {}", path.display()))?;
    }
    let language = phrases.language();

    let engine = Arc::new(SimulatedTtsEngine::new());
    spawn_event_logger(engine.subscribe_events());

    let discovery = DiscoveryEngine::new(
        Arc::new(provider),
        config.discovery.to_discovery_config(),
    );
    let announcer = Arc::new(VoiceAnnouncer::new(engine, phrases, &config.audio));
    let scheduler = AnnouncementScheduler::new(
        discovery.clone(),
        announcer,
        config.announcements.interval(),
    );
    let tracker = ProximityTracker::new(
        Arc::new(LoggingLiveActivity::new()),
        language,
        config.tracking.min_movement_meters,
    );
    let session = PoiSession::new(scheduler, tracker);

    let initial = feed
        .current_position()
        .unwrap_or_else(|| config.demo.start_position());
    session.handle_position(initial).await;
    session.toggle_announcements();

    if config.demo.pin_nearest {
        match discovery.discover_nearby(initial).await.first() {
            Some(nearest) => {
                if let Err(e) = session.select_poi(&nearest.candidate).await {
                    tracing::warn!("Could not pin nearest POI: {}", e);
                }
            }
            None => tracing::info!("No POI to pin near {}", initial),
        }
    }

    let run_for = Duration::from_secs(config.demo.run_secs);
    let session_ref = &session;
    let feed_ref = feed.as_ref();
    let _ = tokio::time::timeout(run_for, async move {
        session_ref.run(feed_ref).await;
        // Keep announcing from the last position once the feed is exhausted.
        std::future::pending::<()>().await;
    })
    .await;

    session.shutdown().await;
    Ok(())
}

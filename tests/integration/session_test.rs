//! Integration tests for the session fan-out of location updates.

use super::support::{chez_paul, place, scheduler, RecordingTts, ScriptedProvider, ORIGIN};
use poivoice::announcements::SchedulerState;
use poivoice::geo::Position;
use poivoice::location::{StaticLocationFeed, TrackReplayFeed};
use poivoice::tracking::{LoggingLiveActivity, ProximityTracker};
use poivoice::PoiSession;
use std::sync::Arc;
use std::time::Duration;

type TestSession = PoiSession<ScriptedProvider, LoggingLiveActivity>;

fn session(engine: Arc<RecordingTts>, channel: Arc<LoggingLiveActivity>) -> TestSession {
    let provider = Arc::new(ScriptedProvider::new(vec![place(chez_paul(), &[])]));
    PoiSession::new(
        scheduler(provider, engine),
        ProximityTracker::with_defaults(channel),
    )
}

#[tokio::test(start_paused = true)]
async fn test_toggle_needs_a_position() {
    let engine = Arc::new(RecordingTts::new());
    let session = session(Arc::clone(&engine), Arc::new(LoggingLiveActivity::new()));

    assert_eq!(session.toggle_announcements(), SchedulerState::Idle);

    session.handle_position(ORIGIN).await;
    assert_eq!(session.toggle_announcements(), SchedulerState::Running);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(engine.spoken().len(), 1);

    assert_eq!(session.toggle_announcements(), SchedulerState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_position_updates_reach_scheduler_and_tracker() {
    let engine = Arc::new(RecordingTts::new());
    let channel = Arc::new(LoggingLiveActivity::new());
    let session = session(Arc::clone(&engine), Arc::clone(&channel));

    session.handle_position(ORIGIN).await;
    session.toggle_announcements();
    session.select_poi(&chez_paul()).await.unwrap();
    assert_eq!(channel.active_count(), 1);

    let moved = Position::new(48.8567, 2.3522);
    session.handle_position(moved).await;

    assert_eq!(session.current_position(), Some(moved));
    assert_eq!(session.scheduler().session().last_location, Some(moved));
    let (pushed, tracked) = session
        .with_tracker(|tracker| (tracker.updates_pushed(), tracker.last_tracked_position()))
        .await;
    assert_eq!(pushed, 2);
    assert_eq!(tracked, Some(moved));

    // Location updates never trigger an announcement by themselves.
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(engine.spoken().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_invalid_positions_are_ignored() {
    let session = session(Arc::new(RecordingTts::new()), Arc::new(LoggingLiveActivity::new()));

    session.handle_position(ORIGIN).await;
    session.handle_position(Position::new(f64::NAN, 2.0)).await;
    session.handle_position(Position::new(95.0, 2.0)).await;

    assert_eq!(session.current_position(), Some(ORIGIN));
}

#[tokio::test(start_paused = true)]
async fn test_run_consumes_replayed_track() {
    let channel = Arc::new(LoggingLiveActivity::new());
    let session = session(Arc::new(RecordingTts::new()), Arc::clone(&channel));
    let track = vec![
        ORIGIN,
        Position::new(48.8567, 2.3522),
        Position::new(48.8568, 2.3522),
    ];
    let feed = TrackReplayFeed::new(track, Duration::from_secs(1)).unwrap();

    session.select_poi(&chez_paul()).await.unwrap();
    session.run(&feed).await;

    assert_eq!(session.current_position(), Some(Position::new(48.8568, 2.3522)));
    let pushed = session.with_tracker(|tracker| tracker.updates_pushed()).await;
    assert_eq!(pushed, 3);
}

#[tokio::test(start_paused = true)]
async fn test_shutdown_stops_everything() {
    let engine = Arc::new(RecordingTts::new());
    let channel = Arc::new(LoggingLiveActivity::new());
    let session = session(Arc::clone(&engine), Arc::clone(&channel));

    session.run(&StaticLocationFeed::new(ORIGIN)).await;
    session.toggle_announcements();
    tokio::time::sleep(Duration::from_secs(1)).await;
    session.select_poi(&chez_paul()).await.unwrap();

    session.shutdown().await;

    assert!(!session.scheduler().is_running());
    assert_eq!(channel.active_count(), 0);
    assert!(!session.clear_selection().await);

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(engine.spoken().len(), 1);
}

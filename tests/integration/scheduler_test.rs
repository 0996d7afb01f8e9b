//! Integration tests for the announcement scheduler timing.

use super::support::{chez_paul, place, scheduler, RecordingTts, ScriptedProvider, ORIGIN};
use parking_lot::Mutex;
use poivoice::announcements::{SchedulerEvent, SchedulerState};
use poivoice::audio::{AudioError, AudioEvent, SpeechOutcome, TtsEngine, Utterance, VoiceSettings};
use poivoice::geo::Position;
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EngineCall {
    Cancel,
    Speak,
}

/// Engine whose first `cancel` blocks until released, logging every call.
struct GatedTts {
    calls: Mutex<Vec<EngineCall>>,
    entered: Mutex<Option<mpsc::Sender<()>>>,
    release: Mutex<Option<mpsc::Receiver<()>>>,
    event_tx: broadcast::Sender<AudioEvent>,
}

impl GatedTts {
    fn new(entered: mpsc::Sender<()>, release: mpsc::Receiver<()>) -> Self {
        let (event_tx, _) = broadcast::channel(16);
        Self {
            calls: Mutex::new(Vec::new()),
            entered: Mutex::new(Some(entered)),
            release: Mutex::new(Some(release)),
            event_tx,
        }
    }

    fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().clone()
    }
}

impl TtsEngine for GatedTts {
    fn speak(&self, _text: &str, _voice: &VoiceSettings) -> Result<Utterance, AudioError> {
        self.calls.lock().push(EngineCall::Speak);
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(SpeechOutcome::Completed);
        Ok(Utterance::new(Uuid::new_v4(), rx))
    }

    fn cancel(&self) {
        let entered = self.entered.lock().take();
        let release = self.release.lock().take();
        if let (Some(entered), Some(release)) = (entered, release) {
            let _ = entered.send(());
            let _ = release.recv();
        }
        self.calls.lock().push(EngineCall::Cancel);
    }

    fn is_speaking(&self) -> bool {
        false
    }

    fn subscribe_events(&self) -> broadcast::Receiver<AudioEvent> {
        self.event_tx.subscribe()
    }
}

fn drain(events: &mut broadcast::Receiver<SchedulerEvent>) -> Vec<SchedulerEvent> {
    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    seen
}

fn completed_cycles(events: &[SchedulerEvent]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, SchedulerEvent::CycleCompleted { .. }))
        .count()
}

#[tokio::test(start_paused = true)]
async fn test_cycles_at_start_and_every_interval() {
    let provider = Arc::new(ScriptedProvider::new(vec![place(chez_paul(), &[])]));
    let engine = Arc::new(RecordingTts::new());
    let scheduler = scheduler(provider, Arc::clone(&engine));
    let mut events = scheduler.subscribe_events();

    assert!(scheduler.start(ORIGIN));
    tokio::time::sleep(Duration::from_secs(61)).await;

    let seen = drain(&mut events);
    assert_eq!(completed_cycles(&seen), 3);
    assert_eq!(engine.spoken().len(), 3);
    assert!(engine.spoken()[0].contains("Restaurant Chez Paul à 23 mètres"));
}

#[tokio::test(start_paused = true)]
async fn test_second_start_is_ignored() {
    let provider = Arc::new(ScriptedProvider::new(vec![place(chez_paul(), &[])]));
    let engine = Arc::new(RecordingTts::new());
    let scheduler = scheduler(Arc::clone(&provider), Arc::clone(&engine));
    let mut events = scheduler.subscribe_events();

    assert!(scheduler.start(ORIGIN));
    assert!(!scheduler.start(Position::new(48.8600, 2.3500)));
    tokio::time::sleep(Duration::from_secs(31)).await;

    let seen = drain(&mut events);
    let starts = seen
        .iter()
        .filter(|event| matches!(event, SchedulerEvent::Started { .. }))
        .count();
    assert_eq!(starts, 1);
    assert_eq!(completed_cycles(&seen), 2);
    // Ten terms per cycle.
    assert_eq!(provider.calls(), 20);
    assert_eq!(scheduler.session().last_location, Some(ORIGIN));
}

#[tokio::test(start_paused = true)]
async fn test_stop_halts_ticks() {
    let provider = Arc::new(ScriptedProvider::new(vec![place(chez_paul(), &[])]));
    let engine = Arc::new(RecordingTts::new());
    let scheduler = scheduler(provider, Arc::clone(&engine));

    scheduler.start(ORIGIN);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert!(scheduler.stop());
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(engine.spoken().len(), 1);
    assert!(engine.cancels() >= 2);
}

#[tokio::test(start_paused = true)]
async fn test_stop_during_discovery_discards_cycle() {
    let provider = Arc::new(
        ScriptedProvider::new(vec![place(chez_paul(), &[])]).with_latency(Duration::from_secs(5)),
    );
    let engine = Arc::new(RecordingTts::new());
    let scheduler = scheduler(provider, Arc::clone(&engine));
    let mut events = scheduler.subscribe_events();

    scheduler.start(ORIGIN);
    tokio::time::sleep(Duration::from_secs(1)).await;
    scheduler.stop();
    tokio::time::sleep(Duration::from_secs(10)).await;

    let seen = drain(&mut events);
    assert!(seen.contains(&SchedulerEvent::CycleDiscarded));
    assert_eq!(completed_cycles(&seen), 0);
    assert!(engine.spoken().is_empty());
    assert!(scheduler.session().last_announcement_at.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_restart_discards_cycle_from_previous_run() {
    let provider = Arc::new(
        ScriptedProvider::new(vec![place(chez_paul(), &[])]).with_latency(Duration::from_secs(5)),
    );
    let engine = Arc::new(RecordingTts::new());
    let scheduler = scheduler(provider, Arc::clone(&engine));
    let mut events = scheduler.subscribe_events();

    scheduler.start(ORIGIN);
    tokio::time::sleep(Duration::from_secs(1)).await;
    scheduler.stop();
    scheduler.start(ORIGIN);
    tokio::time::sleep(Duration::from_secs(10)).await;

    let seen = drain(&mut events);
    assert_eq!(
        seen.iter()
            .filter(|event| **event == SchedulerEvent::CycleDiscarded)
            .count(),
        1
    );
    assert_eq!(completed_cycles(&seen), 1);
    assert_eq!(engine.spoken().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_ticks_follow_latest_location() {
    let provider = Arc::new(ScriptedProvider::new(vec![place(chez_paul(), &[])]));
    let engine = Arc::new(RecordingTts::new());
    let scheduler = scheduler(provider, Arc::clone(&engine));
    let mut events = scheduler.subscribe_events();

    scheduler.start(ORIGIN);
    tokio::time::sleep(Duration::from_secs(1)).await;

    // Far enough that Chez Paul is out of range.
    let away = Position::new(48.8700, 2.3522);
    scheduler.update_location(away);
    tokio::time::sleep(Duration::from_secs(30)).await;

    let seen = drain(&mut events);
    assert!(seen.contains(&SchedulerEvent::CycleCompleted {
        location: away,
        count: 0
    }));
    assert_eq!(
        engine.spoken().last().map(String::as_str),
        Some("Aucun point d'intérêt trouvé à proximité")
    );
}

#[tokio::test(start_paused = true)]
async fn test_dropping_scheduler_stops_it() {
    let provider = Arc::new(ScriptedProvider::new(vec![place(chez_paul(), &[])]));
    let engine = Arc::new(RecordingTts::new());
    let scheduler = scheduler(provider, Arc::clone(&engine));

    scheduler.start(ORIGIN);
    tokio::time::sleep(Duration::from_secs(1)).await;
    drop(scheduler);

    tokio::time::sleep(Duration::from_secs(90)).await;
    assert_eq!(engine.spoken().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_stop_during_announcement_leaves_nothing_playing() {
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel();
    let engine = Arc::new(GatedTts::new(entered_tx, release_rx));
    let scheduler = Arc::new(scheduler(
        Arc::new(ScriptedProvider::empty()),
        Arc::clone(&engine),
    ));

    scheduler.start(ORIGIN);
    // The cycle is now inside `announce`, past the enabled check.
    tokio::task::spawn_blocking(move || entered_rx.recv())
        .await
        .unwrap()
        .unwrap();

    let stopper = {
        let scheduler = Arc::clone(&scheduler);
        std::thread::spawn(move || scheduler.stop())
    };
    std::thread::sleep(Duration::from_millis(50));
    release_tx.send(()).unwrap();
    assert!(stopper.join().unwrap());

    // Whatever started speaking was interrupted by the stop.
    assert_eq!(
        engine.calls(),
        vec![EngineCall::Cancel, EngineCall::Speak, EngineCall::Cancel]
    );
    assert!(!scheduler.is_running());
}

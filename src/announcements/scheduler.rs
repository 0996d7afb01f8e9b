//! Announcement scheduler.
//!
//! `start` runs one discovery + announce cycle immediately and then one per
//! interval, always from the most recently stored location. Cycles are
//! independent: a new one never waits for the previous announcement, the
//! announcer's cancel-then-speak rule makes the latest win.

use super::{AnnouncementSession, SchedulerEvent, SchedulerState, DEFAULT_INTERVAL};
use crate::audio::VoiceAnnouncer;
use crate::discovery::DiscoveryEngine;
use crate::geo::Position;
use crate::poi::PoiSearchProvider;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, instrument};

/// Owned repeating timer task, aborted when dropped.
struct TickerHandle(JoinHandle<()>);

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.0.abort();
    }
}

struct SchedulerInner<P> {
    discovery: DiscoveryEngine<P>,
    announcer: Arc<VoiceAnnouncer>,
    interval: Duration,
    session: Mutex<AnnouncementSession>,
    /// Bumped on every start; cycles from an older epoch are discarded.
    epoch: AtomicU64,
    ticker: Mutex<Option<TickerHandle>>,
    event_tx: broadcast::Sender<SchedulerEvent>,
}

impl<P: PoiSearchProvider + 'static> SchedulerInner<P> {
    /// Location for the next tick, or `None` once the session is over.
    fn tick_location(&self, epoch: u64) -> Option<Position> {
        let session = self.session.lock();
        if session.enabled && self.epoch.load(Ordering::SeqCst) == epoch {
            session.last_location
        } else {
            None
        }
    }

    fn spawn_cycle(self: &Arc<Self>, location: Position, epoch: u64) {
        let inner = Arc::clone(self);
        tokio::spawn(async move {
            inner.run_cycle(location, epoch).await;
        });
    }

    #[instrument(skip(self))]
    async fn run_cycle(&self, location: Position, epoch: u64) {
        let pois = self.discovery.discover_nearby(location).await;

        // Checked and announced under the session lock; `stop` takes the same lock.
        let announced = {
            let mut session = self.session.lock();
            if session.enabled && self.epoch.load(Ordering::SeqCst) == epoch {
                self.announcer.announce(&pois, location);
                session.last_announcement_at = Some(Utc::now());
                true
            } else {
                false
            }
        };

        if !announced {
            debug!("Session ended during discovery, discarding {} POIs", pois.len());
            let _ = self.event_tx.send(SchedulerEvent::CycleDiscarded);
            return;
        }

        let _ = self.event_tx.send(SchedulerEvent::CycleCompleted {
            location,
            count: pois.len(),
        });
    }
}

/// Drives periodic discovery and announcement.
///
/// Dropping the scheduler stops it.
pub struct AnnouncementScheduler<P: PoiSearchProvider + 'static> {
    inner: Arc<SchedulerInner<P>>,
}

impl<P: PoiSearchProvider + 'static> AnnouncementScheduler<P> {
    /// Create an idle scheduler with the given tick period.
    pub fn new(
        discovery: DiscoveryEngine<P>,
        announcer: Arc<VoiceAnnouncer>,
        interval: Duration,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(64);

        Self {
            inner: Arc::new(SchedulerInner {
                discovery,
                announcer,
                interval,
                session: Mutex::new(AnnouncementSession::default()),
                epoch: AtomicU64::new(0),
                ticker: Mutex::new(None),
                event_tx,
            }),
        }
    }

    /// Create an idle scheduler with the default 30 second period.
    pub fn with_default_interval(
        discovery: DiscoveryEngine<P>,
        announcer: Arc<VoiceAnnouncer>,
    ) -> Self {
        Self::new(discovery, announcer, DEFAULT_INTERVAL)
    }

    /// Start announcing from `location`.
    ///
    /// Returns `false` without doing anything when already running.
    pub fn start(&self, location: Position) -> bool {
        let epoch = {
            let mut session = self.inner.session.lock();
            if session.enabled {
                debug!("Announcements already running");
                return false;
            }
            session.enabled = true;
            session.last_location = Some(location);
            self.inner.epoch.fetch_add(1, Ordering::SeqCst) + 1
        };

        info!("Starting periodic announcements at {}", location);
        let _ = self.inner.event_tx.send(SchedulerEvent::Started { location });

        self.inner.spawn_cycle(location, epoch);

        let weak: Weak<SchedulerInner<P>> = Arc::downgrade(&self.inner);
        let period = self.inner.interval;
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else { break };
                let Some(location) = inner.tick_location(epoch) else {
                    break;
                };
                debug!("Announcement tick at {}", location);
                inner.spawn_cycle(location, epoch);
            }
        });

        *self.inner.ticker.lock() = Some(TickerHandle(task));
        true
    }

    /// Replace the location used by the next tick, without announcing.
    pub fn update_location(&self, location: Position) {
        self.inner.session.lock().last_location = Some(location);
    }

    /// Stop announcing and interrupt any speech in progress.
    ///
    /// Returns `false` when already stopped.
    pub fn stop(&self) -> bool {
        {
            let mut session = self.inner.session.lock();
            if !session.enabled {
                return false;
            }
            session.enabled = false;
        }

        info!("Stopping periodic announcements");
        drop(self.inner.ticker.lock().take());
        self.inner.announcer.cancel();
        let _ = self.inner.event_tx.send(SchedulerEvent::Stopped);
        true
    }

    /// Stop when running; otherwise start from `location` if one is known.
    pub fn toggle(&self, location: Option<Position>) -> SchedulerState {
        if self.is_running() {
            self.stop();
        } else if let Some(location) = location {
            self.start(location);
        } else {
            info!("Cannot start announcements: no location available");
        }
        self.state()
    }

    /// Whether announcements are on.
    pub fn is_running(&self) -> bool {
        self.inner.session.lock().enabled
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SchedulerState {
        self.inner.session.lock().state()
    }

    /// Snapshot of the session.
    pub fn session(&self) -> AnnouncementSession {
        self.inner.session.lock().clone()
    }

    /// Tick period.
    pub fn interval(&self) -> Duration {
        self.inner.interval
    }

    /// Subscribe to scheduler events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SchedulerEvent> {
        self.inner.event_tx.subscribe()
    }
}

impl<P: PoiSearchProvider + 'static> Drop for AnnouncementScheduler<P> {
    fn drop(&mut self) {
        self.stop();
    }
}

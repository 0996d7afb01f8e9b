//! App-session wiring.
//!
//! `PoiSession` owns one scheduler and one proximity tracker and fans each
//! location update out to both. The scheduler only records the location; the
//! tracker may publish a new distance.

use crate::announcements::{AnnouncementScheduler, SchedulerState};
use crate::geo::Position;
use crate::location::LocationFeed;
use crate::poi::{PoiCandidate, PoiSearchProvider};
use crate::tracking::{LiveActivityChannel, LiveActivityError, ProximityTracker};
use futures::StreamExt;
use parking_lot::Mutex;
use tokio::sync::Mutex as AsyncMutex;
use tracing::{debug, info};

/// Single-user session tying announcements and live tracking together.
pub struct PoiSession<P: PoiSearchProvider + 'static, L: LiveActivityChannel> {
    scheduler: AnnouncementScheduler<P>,
    tracker: AsyncMutex<ProximityTracker<L>>,
    position: Mutex<Option<Position>>,
}

impl<P: PoiSearchProvider + 'static, L: LiveActivityChannel> PoiSession<P, L> {
    /// Create a session from its two components.
    pub fn new(scheduler: AnnouncementScheduler<P>, tracker: ProximityTracker<L>) -> Self {
        Self {
            scheduler,
            tracker: AsyncMutex::new(tracker),
            position: Mutex::new(None),
        }
    }

    /// Handle one location update.
    pub async fn handle_position(&self, position: Position) {
        if !position.is_valid() {
            debug!("Ignoring invalid position {}", position);
            return;
        }

        *self.position.lock() = Some(position);
        self.scheduler.update_location(position);
        self.tracker.lock().await.on_position(position).await;
    }

    /// Consume a feed's updates until the stream ends.
    pub async fn run(&self, feed: &dyn LocationFeed) {
        if let Some(position) = feed.current_position() {
            self.handle_position(position).await;
        }

        let mut updates = feed.subscribe();
        while let Some(position) = updates.next().await {
            self.handle_position(position).await;
        }
        info!("Location updates ended");
    }

    /// Switch announcements on or off from the last known position.
    pub fn toggle_announcements(&self) -> SchedulerState {
        let position = self.current_position();
        self.scheduler.toggle(position)
    }

    /// Pin a POI for live distance tracking, replacing any previous pin.
    pub async fn select_poi(&self, poi: &PoiCandidate) -> Result<(), LiveActivityError> {
        let position = self.current_position();
        self.tracker.lock().await.select(poi, position).await
    }

    /// Drop the pinned POI. Returns whether one was pinned.
    pub async fn clear_selection(&self) -> bool {
        self.tracker.lock().await.clear().await
    }

    /// Stop announcements and end live tracking.
    pub async fn shutdown(&self) {
        self.scheduler.stop();
        self.clear_selection().await;
        info!("Session closed");
    }

    /// Last known position.
    pub fn current_position(&self) -> Option<Position> {
        *self.position.lock()
    }

    /// The announcement scheduler.
    pub fn scheduler(&self) -> &AnnouncementScheduler<P> {
        &self.scheduler
    }

    /// Run a closure against the tracker.
    pub async fn with_tracker<R>(&self, f: impl FnOnce(&ProximityTracker<L>) -> R) -> R {
        f(&*self.tracker.lock().await)
    }
}

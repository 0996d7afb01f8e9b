//! Periodic nearby-POI announcements.

pub mod scheduler;

use crate::geo::Position;
use chrono::{DateTime, Utc};
use std::time::Duration;

pub use scheduler::AnnouncementScheduler;

/// Default period between announcement cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Scheduler lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not announcing
    Idle,
    /// Announcing on every tick
    Running,
}

/// Per-app-session announcement state. Never persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnouncementSession {
    /// Whether periodic announcements are on
    pub enabled: bool,
    /// Position the next cycle will announce from
    pub last_location: Option<Position>,
    /// When the last announcement was handed to the announcer
    pub last_announcement_at: Option<DateTime<Utc>>,
}

impl AnnouncementSession {
    /// Lifecycle state implied by the session.
    pub fn state(&self) -> SchedulerState {
        if self.enabled {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }
}

/// Event emitted by the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    /// Announcements were switched on
    Started { location: Position },
    /// Announcements were switched off
    Stopped,
    /// A cycle announced `count` POIs
    CycleCompleted { location: Position, count: usize },
    /// A cycle finished after its session ended and was dropped
    CycleDiscarded,
}

//! Live Activity channel contract.

use super::{ActivityAttributes, ActivityContentState, LiveActivityError};
use crate::audio::format_compact_distance;
use parking_lot::Mutex;
use std::collections::HashMap;
use uuid::Uuid;

/// External display of the distance to one pinned POI.
pub trait LiveActivityChannel: Send + Sync {
    /// Whether the platform currently allows Live Activities.
    fn activities_enabled(&self) -> bool;

    /// Start a new activity.
    fn start(
        &self,
        attributes: &ActivityAttributes,
        state: &ActivityContentState,
    ) -> impl std::future::Future<Output = Result<Uuid, LiveActivityError>> + Send;

    /// Push new content to a running activity.
    fn update(
        &self,
        id: Uuid,
        state: &ActivityContentState,
    ) -> impl std::future::Future<Output = Result<(), LiveActivityError>> + Send;

    /// End an activity immediately.
    fn end(&self, id: Uuid) -> impl std::future::Future<Output = Result<(), LiveActivityError>> + Send;
}

/// Channel that renders activities to the log.
#[derive(Default)]
pub struct LoggingLiveActivity {
    activities: Mutex<HashMap<Uuid, (ActivityAttributes, ActivityContentState)>>,
}

impl LoggingLiveActivity {
    /// Create an empty channel.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of running activities.
    pub fn active_count(&self) -> usize {
        self.activities.lock().len()
    }

    /// Latest content of an activity.
    pub fn state(&self, id: Uuid) -> Option<ActivityContentState> {
        self.activities.lock().get(&id).map(|(_, state)| *state)
    }
}

impl LiveActivityChannel for LoggingLiveActivity {
    fn activities_enabled(&self) -> bool {
        true
    }

    async fn start(
        &self,
        attributes: &ActivityAttributes,
        state: &ActivityContentState,
    ) -> Result<Uuid, LiveActivityError> {
        let id = Uuid::new_v4();
        tracing::info!(
            "Live Activity started for {} ({}) at {}",
            attributes.poi_name,
            attributes.poi_category,
            format_compact_distance(state.distance_meters)
        );
        self.activities
            .lock()
            .insert(id, (attributes.clone(), *state));
        Ok(id)
    }

    async fn update(&self, id: Uuid, state: &ActivityContentState) -> Result<(), LiveActivityError> {
        let mut activities = self.activities.lock();
        let (attributes, current) = activities
            .get_mut(&id)
            .ok_or(LiveActivityError::NoActivity(id))?;
        *current = *state;
        tracing::info!(
            "Live Activity distance to {} updated: {}",
            attributes.poi_name,
            format_compact_distance(state.distance_meters)
        );
        Ok(())
    }

    async fn end(&self, id: Uuid) -> Result<(), LiveActivityError> {
        let (attributes, _) = self
            .activities
            .lock()
            .remove(&id)
            .ok_or(LiveActivityError::NoActivity(id))?;
        tracing::info!("Live Activity for {} stopped", attributes.poi_name);
        Ok(())
    }
}

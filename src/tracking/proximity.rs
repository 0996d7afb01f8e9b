//! Proximity tracker for the pinned POI.

use super::{
    ActivityContentState, LiveActivityChannel, LiveActivityError, PinnedPoi,
    DEFAULT_MIN_MOVEMENT_METERS,
};
use crate::geo::Position;
use crate::i18n::Language;
use crate::poi::PoiCandidate;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

#[derive(Debug)]
struct Pin {
    poi: PinnedPoi,
    activity: Option<Uuid>,
    last_tracked: Option<Position>,
    updates_pushed: u64,
}

/// Tracks distance to at most one pinned POI.
///
/// Positions closer than the movement threshold to the last published one
/// are dropped.
pub struct ProximityTracker<L> {
    channel: Arc<L>,
    language: Language,
    min_movement_meters: f64,
    pin: Option<Pin>,
}

impl<L: LiveActivityChannel> ProximityTracker<L> {
    /// Create a tracker publishing to `channel`.
    pub fn new(channel: Arc<L>, language: Language, min_movement_meters: f64) -> Self {
        Self {
            channel,
            language,
            min_movement_meters,
            pin: None,
        }
    }

    /// Create a tracker with the default 10 m threshold.
    pub fn with_defaults(channel: Arc<L>) -> Self {
        Self::new(channel, Language::default(), DEFAULT_MIN_MOVEMENT_METERS)
    }

    /// Pin a POI, ending any previous pin and its activity first.
    ///
    /// With a known user position the activity starts immediately;
    /// otherwise it starts on the first position received.
    pub async fn select(
        &mut self,
        poi: &PoiCandidate,
        user_position: Option<Position>,
    ) -> Result<(), LiveActivityError> {
        self.clear().await;

        if !self.channel.activities_enabled() {
            warn!("Live Activities are not enabled");
            return Err(LiveActivityError::NotEnabled);
        }

        let pinned = PinnedPoi::from(poi);
        info!("Tracking {}", poi.display_name(self.language));
        self.pin = Some(Pin {
            poi: pinned,
            activity: None,
            last_tracked: None,
            updates_pushed: 0,
        });

        if let Some(position) = user_position {
            self.on_position(position).await;
        }
        Ok(())
    }

    /// Feed a new user position.
    ///
    /// Returns the content pushed to the channel, if any.
    pub async fn on_position(&mut self, position: Position) -> Option<ActivityContentState> {
        let language = self.language;
        let min_movement = self.min_movement_meters;
        let channel = Arc::clone(&self.channel);
        let pin = self.pin.as_mut()?;

        if let Some(last) = pin.last_tracked {
            let movement = last.distance_to(&position);
            if movement < min_movement {
                debug!("Moved {:.1}m since last update, skipping", movement);
                return None;
            }
        }

        let state = ActivityContentState::between(&position, &pin.poi);
        let pushed = match pin.activity {
            Some(id) => channel.update(id, &state).await,
            None => match channel.start(&pin.poi.attributes(language), &state).await {
                Ok(id) => {
                    pin.activity = Some(id);
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };

        match pushed {
            Ok(()) => {
                pin.last_tracked = Some(position);
                pin.updates_pushed += 1;
                debug!("Distance to pinned POI: {}m", state.distance_meters as i64);
                Some(state)
            }
            Err(e) => {
                warn!("Live Activity update failed: {}", e);
                None
            }
        }
    }

    /// Drop the pin and end its activity. Returns whether a pin existed.
    pub async fn clear(&mut self) -> bool {
        let Some(pin) = self.pin.take() else {
            return false;
        };

        if let Some(id) = pin.activity {
            if let Err(e) = self.channel.end(id).await {
                warn!("Failed to end Live Activity: {}", e);
            }
        }
        info!("Stopped tracking pinned POI");
        true
    }

    /// The pinned POI, if any.
    pub fn pinned(&self) -> Option<&PinnedPoi> {
        self.pin.as_ref().map(|pin| &pin.poi)
    }

    /// Last position whose distance was published.
    pub fn last_tracked_position(&self) -> Option<Position> {
        self.pin.as_ref().and_then(|pin| pin.last_tracked)
    }

    /// Activity id of the current pin.
    pub fn activity_id(&self) -> Option<Uuid> {
        self.pin.as_ref().and_then(|pin| pin.activity)
    }

    /// Number of contents published for the current pin.
    pub fn updates_pushed(&self) -> u64 {
        self.pin.as_ref().map_or(0, |pin| pin.updates_pushed)
    }
}

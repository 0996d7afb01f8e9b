//! Live distance tracking for a single pinned POI.
//!
//! The tracker publishes distance updates to a Live Activity channel, but
//! only after the user has moved far enough since the last published
//! position.

pub mod channel;
pub mod proximity;

use crate::geo::Position;
use crate::i18n::Language;
use crate::poi::{PoiCandidate, PoiCategory};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use channel::{LiveActivityChannel, LoggingLiveActivity};
pub use proximity::ProximityTracker;

/// Default movement needed before a new distance is published, in meters.
pub const DEFAULT_MIN_MOVEMENT_METERS: f64 = 10.0;

/// Errors reported by Live Activity channels.
#[derive(Debug, Error)]
pub enum LiveActivityError {
    #[error("Live Activities are not enabled")]
    NotEnabled,

    #[error("Live Activity request failed: {0}")]
    RequestFailed(String),

    #[error("No active Live Activity with id {0}")]
    NoActivity(uuid::Uuid),
}

/// Immutable snapshot of the selected POI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PinnedPoi {
    pub name: Option<String>,
    pub category: PoiCategory,
    pub coordinate: Position,
    pub phone: Option<String>,
}

impl PinnedPoi {
    /// Distance from `position` to the pinned POI.
    pub fn distance_from(&self, position: &Position) -> f64 {
        position.distance_to(&self.coordinate)
    }

    /// Static Live Activity attributes for this POI.
    pub fn attributes(&self, language: Language) -> ActivityAttributes {
        let name = match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => crate::poi::unknown_place_label(language).to_string(),
        };

        ActivityAttributes {
            poi_name: name,
            poi_category: self.category.label(language).to_string(),
            poi_latitude: self.coordinate.latitude,
            poi_longitude: self.coordinate.longitude,
            phone_number: self.phone.clone(),
        }
    }
}

impl From<&PoiCandidate> for PinnedPoi {
    fn from(candidate: &PoiCandidate) -> Self {
        Self {
            name: candidate.name.clone(),
            category: candidate.category,
            coordinate: candidate.coordinate,
            phone: candidate.phone.clone(),
        }
    }
}

/// Fixed Live Activity properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAttributes {
    pub poi_name: String,
    pub poi_category: String,
    pub poi_latitude: f64,
    pub poi_longitude: f64,
    pub phone_number: Option<String>,
}

/// Dynamic Live Activity content.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivityContentState {
    /// Distance to the POI in meters
    pub distance_meters: f64,
    pub user_latitude: f64,
    pub user_longitude: f64,
}

impl ActivityContentState {
    /// Content for a user at `user` tracking `poi`.
    pub fn between(user: &Position, poi: &PinnedPoi) -> Self {
        Self {
            distance_meters: poi.distance_from(user),
            user_latitude: user.latitude,
            user_longitude: user.longitude,
        }
    }
}

//! User position sources.
//!
//! A `LocationFeed` exposes the last known position and a restartable stream
//! of updates. Streams may end or pause at any time (authorization revoked,
//! replay finished); consumers treat that as a gap, not an error.

pub mod track;

use crate::geo::Position;
use futures::stream::{self, BoxStream, StreamExt};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

pub use track::parse_gpx_track;

/// Errors while preparing a location source.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Track contains no positions")]
    EmptyTrack,
}

/// Source of user positions.
pub trait LocationFeed: Send + Sync {
    /// Last known position, if any.
    fn current_position(&self) -> Option<Position>;

    /// Stream of position updates, starting fresh on each call.
    fn subscribe(&self) -> BoxStream<'static, Position>;
}

/// Feed that never moves.
#[derive(Debug, Clone, Copy)]
pub struct StaticLocationFeed {
    position: Position,
}

impl StaticLocationFeed {
    pub fn new(position: Position) -> Self {
        Self { position }
    }
}

impl LocationFeed for StaticLocationFeed {
    fn current_position(&self) -> Option<Position> {
        Some(self.position)
    }

    fn subscribe(&self) -> BoxStream<'static, Position> {
        stream::once(futures::future::ready(self.position)).boxed()
    }
}

/// Feed replaying a recorded track, one point per interval.
pub struct TrackReplayFeed {
    points: Arc<Vec<Position>>,
    interval: Duration,
    repeat: bool,
    current: Arc<Mutex<Option<Position>>>,
}

impl TrackReplayFeed {
    /// Replay `points` with `interval` between them.
    pub fn new(points: Vec<Position>, interval: Duration) -> Result<Self, LocationError> {
        if points.is_empty() {
            return Err(LocationError::EmptyTrack);
        }

        Ok(Self {
            points: Arc::new(points),
            interval,
            repeat: false,
            current: Arc::new(Mutex::new(None)),
        })
    }

    /// Load a GPX file.
    pub fn from_gpx_file(path: &Path, interval: Duration) -> Result<Self, LocationError> {
        let content = std::fs::read(path).map_err(|e| LocationError::IoError(e.to_string()))?;
        let points = parse_gpx_track(&content)?;
        tracing::info!("Loaded {} track points from {}", points.len(), path.display());
        Self::new(points, interval)
    }

    /// Restart from the first point after the last one.
    pub fn repeating(mut self) -> Self {
        self.repeat = true;
        self
    }

    /// Number of points in the track.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the track is empty (never true for a constructed feed).
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl LocationFeed for TrackReplayFeed {
    fn current_position(&self) -> Option<Position> {
        *self.current.lock()
    }

    fn subscribe(&self) -> BoxStream<'static, Position> {
        let points = Arc::clone(&self.points);
        let current = Arc::clone(&self.current);
        let interval = self.interval;
        let repeat = self.repeat;

        stream::unfold((0usize, true), move |(index, first)| {
            let points = Arc::clone(&points);
            let current = Arc::clone(&current);
            async move {
                let index = if index >= points.len() && repeat { 0 } else { index };
                let position = *points.get(index)?;
                if !first {
                    tokio::time::sleep(interval).await;
                }
                *current.lock() = Some(position);
                Some((position, (index + 1, false)))
            }
        })
        .boxed()
    }
}

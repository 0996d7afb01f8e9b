//! GPX track parsing for location replay.

use super::LocationError;
use crate::geo::Position;

/// Parse GPX content into positions.
///
/// Track points are preferred, then route points, then waypoints.
pub fn parse_gpx_track(content: &[u8]) -> Result<Vec<Position>, LocationError> {
    let gpx_data: gpx::Gpx = gpx::read(content)
        .map_err(|e| LocationError::ParseError(format!("GPX parse error: {}", e)))?;

    let mut points: Vec<Position> = gpx_data
        .tracks
        .iter()
        .flat_map(|track| track.segments.iter())
        .flat_map(|segment| segment.points.iter())
        .map(waypoint_position)
        .collect();

    if points.is_empty() {
        points = gpx_data
            .routes
            .iter()
            .flat_map(|route| route.points.iter())
            .map(waypoint_position)
            .collect();
    }

    if points.is_empty() {
        points = gpx_data.waypoints.iter().map(waypoint_position).collect();
    }

    points.retain(Position::is_valid);
    if points.is_empty() {
        return Err(LocationError::EmptyTrack);
    }

    Ok(points)
}

fn waypoint_position(point: &gpx::Waypoint) -> Position {
    let p = point.point();
    Position::new(p.y(), p.x())
}

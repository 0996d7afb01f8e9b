//! Geographic primitives shared by every stage of the pipeline.
//!
//! Positions are WGS84 degrees. Distances are great-circle meters on a
//! spherical Earth.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances, in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Latitude in degrees (-90..=90)
    pub latitude: f64,
    /// Longitude in degrees (-180..=180)
    pub longitude: f64,
}

impl Position {
    /// Create a new position.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to another position, in meters.
    pub fn distance_to(&self, other: &Position) -> f64 {
        haversine_distance(
            self.latitude,
            self.longitude,
            other.latitude,
            other.longitude,
        )
    }

    /// Whether both coordinates are finite and within WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)
    }
}

/// Square search area centered on a position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchRegion {
    /// Center of the region
    pub center: Position,
    /// Side length of the region in meters
    pub span_meters: f64,
}

impl SearchRegion {
    /// Region of side `2 * radius_meters` around `center`.
    pub fn around(center: Position, radius_meters: f64) -> Self {
        Self {
            center,
            span_meters: radius_meters * 2.0,
        }
    }

    /// Whether a position falls inside the square region.
    pub fn contains(&self, position: &Position) -> bool {
        let half = self.span_meters / 2.0;
        let north_south = haversine_distance(
            self.center.latitude,
            self.center.longitude,
            position.latitude,
            self.center.longitude,
        );
        let east_west = haversine_distance(
            position.latitude,
            self.center.longitude,
            position.latitude,
            position.longitude,
        );
        north_south <= half && east_west <= half
    }
}

/// Calculate great-circle distance between two GPS points (Haversine formula).
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

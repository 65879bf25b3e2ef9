//! Geographic positions and geodesic calculations on the WGS84 ellipsoid
//!
//! Distances are in meters, angles in degrees. Bearings are measured clockwise
//! from true north and normalized to `[0, 360)`.

use geo::algorithm::line_measures::metric_spaces::Geodesic;
use geo::{Bearing, Destination, Distance, Point};

/// Meters per nautical mile
pub const METERS_PER_NAUTICAL_MILE: f64 = 1852.0;

/// Convert a speed in knots to meters per second
pub fn knots_to_meters_per_second(knots: f64) -> f64 {
    knots * METERS_PER_NAUTICAL_MILE / 3600.0
}

/// Normalize an angle to `[0, 360)`
pub fn normalize_degrees(degrees: f64) -> f64 {
    let normalized = degrees.rem_euclid(360.0);
    // rem_euclid may round up to exactly 360 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}

/// Normalize an angle to `[-180, 180)`
pub fn normalize_signed_degrees(degrees: f64) -> f64 {
    let normalized = normalize_degrees(degrees);
    if normalized >= 180.0 {
        normalized - 360.0
    } else {
        normalized
    }
}

/// A position on the earth
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeographicPosition {
    /// Degrees, positive north
    pub latitude: f64,
    /// Degrees, positive east
    pub longitude: f64,
    /// Meters above the ellipsoid
    pub altitude: f64,
}

impl GeographicPosition {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        GeographicPosition {
            latitude,
            longitude,
            altitude,
        }
    }

    /// Position without altitude
    pub fn from_lat_lon(latitude: f64, longitude: f64) -> Self {
        GeographicPosition::new(latitude, longitude, 0.0)
    }

    /// Whether latitude and longitude are finite and within their valid ranges.
    ///
    /// The AIS "not available" values 91 and 181 are therefore invalid.
    pub fn contains_valid_position(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    fn point(&self) -> Point<f64> {
        Point::new(self.longitude, self.latitude)
    }

    /// Geodesic distance in meters and initial bearing to another position
    pub fn distance_and_bearing_to(&self, other: &GeographicPosition) -> (f64, f64) {
        dist_and_dir(self, other)
    }
}

impl From<GeographicPosition> for Point<f64> {
    fn from(position: GeographicPosition) -> Self {
        position.point()
    }
}

impl std::fmt::Display for GeographicPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

/// Distance in meters and initial bearing in degrees from `start` to `end`
pub fn dist_and_dir(start: &GeographicPosition, end: &GeographicPosition) -> (f64, f64) {
    let (a, b) = (start.point(), end.point());
    let distance = Geodesic::distance(a, b);
    if distance == 0.0 {
        return (0.0, 0.0);
    }
    (distance, normalize_degrees(Geodesic::bearing(a, b)))
}

/// The position reached after traveling `distance` meters from `start` along
/// the initial `bearing`. A negative distance travels backwards.
pub fn calc_coords(start: &GeographicPosition, bearing: f64, distance: f64) -> GeographicPosition {
    if distance == 0.0 {
        return *start;
    }
    let end = Geodesic::destination(start.point(), bearing, distance);
    GeographicPosition::new(end.y(), end.x(), start.altitude)
}

//! Distance calculations on a spherical Earth.

use crate::models::types::GeoPoint;

/// Mean Earth radius used by the haversine formula, in meters
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Approximate meters per degree of latitude, used for bounding boxes
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Great-circle distance between two points in meters (haversine formula).
///
/// Symmetric, zero for identical points, and never negative.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let phi1 = a.lat().to_radians();
    let phi2 = b.lat().to_radians();
    let delta_phi = (b.lat() - a.lat()).to_radians();
    let delta_lambda = (b.lng() - a.lng()).to_radians();

    let h = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);

    // Rounding can push h a hair outside [0, 1] for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Convert meters to degrees of latitude (for bounding box queries)
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Convert meters to an angle subtended at the Earth's center, in radians
pub fn meters_to_central_angle(meters: f64) -> f64 {
    meters / EARTH_RADIUS_M
}

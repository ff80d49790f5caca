//! Coarse rectangular pre-filter for radius queries.
//!
//! The box is built from the flat-Earth "111 km per degree" approximation,
//! widened by a safety factor, and then checked against the exact extent of
//! the spherical cap so that it never misses a point inside the radius.
//! Points inside the box but outside the radius are expected; the exact
//! haversine pass removes them.

use std::f64::consts::FRAC_PI_2;

use geo::{coord, Rect};

use crate::models::types::GeoPoint;
use crate::spatial::queries::{meters_to_central_angle, meters_to_degrees_approx};

/// Default widening applied to the approximate degree deltas
pub const DEFAULT_SAFETY_FACTOR: f64 = 1.2;

// Below this cos(lat) the center is treated as sitting on a pole.
const POLE_COS_EPSILON: f64 = 1e-12;

/// A closed longitude interval in degrees, always within [-180, 180].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LngRange {
    pub min: f64,
    pub max: f64,
}

impl LngRange {
    pub const ALL: LngRange = LngRange { min: -180.0, max: 180.0 };

    pub fn contains(&self, lng: f64) -> bool {
        self.min <= lng && lng <= self.max
    }
}

/// Latitude/longitude rectangle around a search center.
///
/// Longitudes are kept as a center plus half-width so that boxes crossing the
/// antimeridian can be split into two plain ranges on demand.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    min_lat: f64,
    max_lat: f64,
    center_lng: f64,
    /// `None` means every longitude is a candidate
    lng_delta: Option<f64>,
}

impl BoundingBox {
    /// Box guaranteed to contain every point within `radius_m` of `center`.
    ///
    /// `radius_m` must be finite and non-negative, and `safety_factor` at
    /// least 1; callers validate both.
    pub fn around(center: GeoPoint, radius_m: f64, safety_factor: f64) -> Self {
        debug_assert!(radius_m.is_finite() && radius_m >= 0.0);
        debug_assert!(safety_factor >= 1.0);

        let lat_delta = meters_to_degrees_approx(radius_m) * safety_factor;
        let min_lat = (center.lat() - lat_delta).max(-90.0);
        let max_lat = (center.lat() + lat_delta).min(90.0);

        Self {
            min_lat,
            max_lat,
            center_lng: center.lng(),
            lng_delta: lng_delta(center, radius_m, lat_delta),
        }
    }

    /// Box covering the whole globe.
    pub fn everything() -> Self {
        Self {
            min_lat: -90.0,
            max_lat: 90.0,
            center_lng: 0.0,
            lng_delta: None,
        }
    }

    pub fn min_lat(&self) -> f64 {
        self.min_lat
    }

    pub fn max_lat(&self) -> f64 {
        self.max_lat
    }

    pub fn spans_all_longitudes(&self) -> bool {
        self.lng_delta.is_none()
    }

    /// Longitude intervals covered by the box.
    ///
    /// One interval normally, two when the box crosses the antimeridian.
    pub fn lng_ranges(&self) -> Vec<LngRange> {
        let Some(delta) = self.lng_delta else {
            return vec![LngRange::ALL];
        };

        let min = self.center_lng - delta;
        let max = self.center_lng + delta;

        if min < -180.0 {
            vec![
                LngRange { min: min + 360.0, max: 180.0 },
                LngRange { min: -180.0, max },
            ]
        } else if max > 180.0 {
            vec![
                LngRange { min, max: 180.0 },
                LngRange { min: -180.0, max: max - 360.0 },
            ]
        } else {
            vec![LngRange { min, max }]
        }
    }

    /// The box as `geo` rectangles (x = longitude, y = latitude).
    pub fn rects(&self) -> Vec<Rect> {
        self.lng_ranges()
            .into_iter()
            .map(|r| {
                Rect::new(
                    coord! { x: r.min, y: self.min_lat },
                    coord! { x: r.max, y: self.max_lat },
                )
            })
            .collect()
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        let lat = point.lat();
        if lat < self.min_lat || lat > self.max_lat {
            return false;
        }

        self.lng_ranges().iter().any(|r| r.contains(point.lng()))
    }
}

/// Half-width of the longitude range, `None` when all longitudes qualify.
fn lng_delta(center: GeoPoint, radius_m: f64, lat_delta: f64) -> Option<f64> {
    let cos_lat = center.lat().to_radians().cos();
    if cos_lat < POLE_COS_EPSILON {
        return None;
    }

    let angle = meters_to_central_angle(radius_m);
    let sin_angle = angle.sin();

    // The cap reaches over a pole: any longitude can be within range
    if angle >= FRAC_PI_2 || sin_angle >= cos_lat {
        return None;
    }

    let approx = lat_delta / cos_lat;
    let exact = (sin_angle / cos_lat).asin().to_degrees();
    let delta = approx.max(exact);

    (delta < 180.0).then_some(delta)
}

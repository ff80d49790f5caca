//! Core data types for proximity and provenance checks.

use std::fmt;
use std::sync::Arc;

use crate::identifiers::TreeIdentifier;
use crate::models::traits::PlantedTree;

// ============================================================================
// Coordinates
// ============================================================================

/// A latitude/longitude pair in degrees.
///
/// Always finite and in range; the only way to build one is through
/// [`GeoPoint::new`], which rejects anything else. Immutable once built.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawGeoPoint"))]
pub struct GeoPoint {
    lat: f64,
    lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
        let lng_ok = lng.is_finite() && (-180.0..=180.0).contains(&lng);

        if !(lat_ok && lng_ok) {
            return Err(GeoError::InvalidCoordinate { lat, lng });
        }

        Ok(Self { lat, lng })
    }

    pub fn lat(&self) -> f64 {
        self.lat
    }

    pub fn lng(&self) -> f64 {
        self.lng
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lng >= 0.0 { 'E' } else { 'W' };
        write!(f, "{:.6}° {}, {:.6}° {}", self.lat.abs(), ns, self.lng.abs(), ew)
    }
}

impl From<GeoPoint> for geo::Point {
    fn from(p: GeoPoint) -> Self {
        geo::Point::new(p.lng, p.lat)
    }
}

impl TryFrom<geo::Point> for GeoPoint {
    type Error = GeoError;

    fn try_from(p: geo::Point) -> Result<Self> {
        GeoPoint::new(p.y(), p.x())
    }
}

#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawGeoPoint {
    lat: f64,
    lng: f64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawGeoPoint> for GeoPoint {
    type Error = GeoError;

    fn try_from(raw: RawGeoPoint) -> Result<Self> {
        GeoPoint::new(raw.lat, raw.lng)
    }
}

// ============================================================================
// Query results
// ============================================================================

/// A tree returned by a proximity query, paired with its distance from the
/// query center. Lives only as long as the query result.
#[derive(Clone)]
pub struct ProximityCandidate {
    pub tree: Arc<dyn PlantedTree>,
    pub distance_m: f64,
}

impl ProximityCandidate {
    pub fn id(&self) -> &TreeIdentifier {
        self.tree.id()
    }

    pub fn point(&self) -> GeoPoint {
        self.tree.location()
    }
}

impl fmt::Debug for ProximityCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProximityCandidate")
            .field("id", self.id())
            .field("point", &self.point())
            .field("distance_m", &self.distance_m)
            .finish()
    }
}

/// Why a validation check refused an action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Rejection {
    /// Another tree is already planted within the duplicate radius.
    DuplicatePlanting,
    /// The photo was taken too far from the tree it documents.
    PhotoTooFar,
}

/// Result of a validation check. Never stored; the caller decides what to do
/// with a rejection (refuse the request, delete the saved upload, ...).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ValidationOutcome {
    pub allowed: bool,
    pub distance_m: Option<f64>,
    pub reference_id: Option<TreeIdentifier>,
    pub reason: String,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    rejection: Option<Rejection>,
}

impl ValidationOutcome {
    pub fn allow(reason: impl Into<String>) -> Self {
        Self {
            allowed: true,
            distance_m: None,
            reference_id: None,
            reason: reason.into(),
            rejection: None,
        }
    }

    pub fn reject(
        rejection: Rejection,
        distance_m: f64,
        reference_id: Option<TreeIdentifier>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            allowed: false,
            distance_m: Some(distance_m),
            reference_id,
            reason: reason.into(),
            rejection: Some(rejection),
        }
    }

    pub fn with_distance(mut self, distance_m: f64) -> Self {
        self.distance_m = Some(distance_m);
        self
    }

    pub fn with_reference(mut self, id: TreeIdentifier) -> Self {
        self.reference_id = Some(id);
        self
    }

    /// The kind of rejection, `None` when the action is allowed.
    pub fn rejection(&self) -> Option<Rejection> {
        self.rejection
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Invalid coordinate: lat={lat}, lng={lng}")]
    InvalidCoordinate { lat: f64, lng: f64 },

    #[error("Invalid search radius: {0}m")]
    InvalidRadius(f64),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Candidate provider failed: {0}")]
    Provider(String),
}

pub type Result<T> = std::result::Result<T, GeoError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_ranges() {
        assert!(GeoPoint::new(90.0, 180.0).is_ok());
        assert!(GeoPoint::new(-90.0, -180.0).is_ok());

        assert!(matches!(
            GeoPoint::new(90.5, 0.0),
            Err(GeoError::InvalidCoordinate { .. })
        ));
        assert!(GeoPoint::new(0.0, -180.01).is_err());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_err());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_geo_point_axis_order() {
        let p = GeoPoint::new(19.076, 72.8777).unwrap();
        let g: geo::Point = p.into();

        // geo uses x = longitude, y = latitude
        assert_eq!(g.x(), 72.8777);
        assert_eq!(g.y(), 19.076);
        assert_eq!(GeoPoint::try_from(g).unwrap(), p);
    }

    #[test]
    fn test_geo_point_display() {
        let p = GeoPoint::new(-33.8688, 151.2093).unwrap();
        assert_eq!(p.to_string(), "33.868800° S, 151.209300° E");
    }

    #[test]
    fn test_outcome_builders() {
        let ok = ValidationOutcome::allow("no location data");
        assert!(ok.allowed);
        assert_eq!(ok.rejection(), None);

        let ok = ok.with_distance(12.5).with_reference(TreeIdentifier::new("t1"));
        assert_eq!(ok.distance_m, Some(12.5));
        assert_eq!(ok.reference_id, Some(TreeIdentifier::new("t1")));

        let rejected = ValidationOutcome::reject(
            Rejection::DuplicatePlanting,
            3.0,
            Some(TreeIdentifier::new("t2")),
            "too close",
        );
        assert!(!rejected.allowed);
        assert_eq!(rejected.rejection(), Some(Rejection::DuplicatePlanting));
        assert_eq!(rejected.distance_m, Some(3.0));
    }
}

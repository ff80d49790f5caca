//! Spatial math and two-phase radius queries.

pub mod bbox;
pub mod index;
pub mod queries;
pub mod search;

pub use bbox::{BoundingBox, LngRange, DEFAULT_SAFETY_FACTOR};
pub use queries::{haversine_distance, EARTH_RADIUS_M};
pub use search::{refine, ProximitySearch};

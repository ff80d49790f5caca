//! # treekin-geo
//!
//! Location checks for tree plantings and growth photos.
//!
//! ## Features
//!
//! - **Great-circle distance**: haversine on a spherical Earth
//! - **Photo GPS**: position extraction from EXIF metadata, tolerant of
//!   missing or corrupt data
//! - **Two-phase radius queries**: bounding-box range query against a
//!   pluggable store, then exact distance filtering
//! - **Validation rules**: duplicate-planting and photo-provenance checks
//!
//! ## Example
//!
//! ```
//! use treekin_geo::prelude::*;
//!
//! let banyan = TreeImpl {
//!     id: TreeIdentifier::new("banyan"),
//!     name: "Banyan by the lake".into(),
//!     location: GeoPoint::new(19.0760, 72.8777).unwrap(),
//! };
//!
//! let provider = StaticTreeProvider::from_data(vec![banyan]);
//! let policy = ValidationPolicy::default();
//!
//! // Planting on the same spot is refused
//! let here = GeoPoint::new(19.0760, 72.8777).unwrap();
//! let outcome = policy.check_duplicate_planting(here, &provider).unwrap();
//! assert!(!outcome.allowed);
//! assert_eq!(outcome.reference_id, Some(TreeIdentifier::new("banyan")));
//!
//! // A couple of hundred meters away is fine
//! let elsewhere = GeoPoint::new(19.0770, 72.8800).unwrap();
//! assert!(policy.check_duplicate_planting(elsewhere, &provider).unwrap().allowed);
//! ```

pub mod config;
pub mod identifiers;
pub mod metadata;
pub mod models;
pub mod provider;
pub mod spatial;
pub mod storage;
pub mod validation;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub mod prelude {
    pub use crate::config::ValidationConfig;
    pub use crate::identifiers::*;
    pub use crate::metadata::{extract_gps, extract_gps_from_path};
    pub use crate::models::{traits::*, types::*};
    pub use crate::provider::{StaticTreeProvider, TreeImpl};
    pub use crate::spatial::{haversine_distance, BoundingBox, LngRange, ProximitySearch};
    pub use crate::storage::traits::*;
    pub use crate::validation::ValidationPolicy;
}

pub use prelude::*;

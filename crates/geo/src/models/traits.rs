//! Core traits for located entities and the stores that hold them.
//!
//! These traits define the seam between the verification core and storage.
//! Implementations can be in-memory, database-backed, or remote.

use std::sync::Arc;

use crate::identifiers::TreeIdentifier;
use crate::models::types::*;
use crate::spatial::bbox::BoundingBox;

// ============================================================================
// Entity Traits
// ============================================================================

/// A tree planted at a known location.
pub trait PlantedTree: Send + Sync {
    fn id(&self) -> &TreeIdentifier;

    fn location(&self) -> GeoPoint;

    /// Display name (e.g., "Banyan by the lake")
    fn name(&self) -> &str {
        ""
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// Range-query access to the persisted tree collection.
///
/// The query is a plain rectangle on two independent columns, so a SQL store
/// can answer it with `lat BETWEEN .. AND lng BETWEEN ..` (one clause per
/// entry of [`BoundingBox::lng_ranges`]). Returning extra trees outside the
/// box is allowed; they are filtered by exact distance afterwards.
pub trait CandidateProvider: Send + Sync {
    fn candidates_within(&self, bounds: &BoundingBox) -> Result<Vec<Arc<dyn PlantedTree>>>;
}

impl<P: CandidateProvider + ?Sized> CandidateProvider for &P {
    fn candidates_within(&self, bounds: &BoundingBox) -> Result<Vec<Arc<dyn PlantedTree>>> {
        (**self).candidates_within(bounds)
    }
}

impl<P: CandidateProvider + ?Sized> CandidateProvider for Arc<P> {
    fn candidates_within(&self, bounds: &BoundingBox) -> Result<Vec<Arc<dyn PlantedTree>>> {
        (**self).candidates_within(bounds)
    }
}

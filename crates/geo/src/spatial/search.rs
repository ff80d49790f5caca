//! Two-phase radius queries.
//!
//! ## Two-Stage Filtering
//!
//! 1. **Bounding box**: one range query against the candidate provider using a
//!    rectangle that is guaranteed to contain the whole search disk
//! 2. **Haversine filter**: exact great-circle distance on the returned
//!    candidates, dropping everything outside the radius
//!
//! The two stages are separate so the refinement can run on any batch of
//! candidates, however they were fetched.

use std::sync::Arc;

use tracing::{debug, trace};

use crate::models::traits::{CandidateProvider, PlantedTree};
use crate::models::types::*;
use crate::spatial::bbox::{BoundingBox, DEFAULT_SAFETY_FACTOR};
use crate::spatial::queries::haversine_distance;
use crate::storage::traits::AsyncCandidateProvider;

/// Radius query policy. Holds only the bounding-box safety factor.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProximitySearch {
    safety_factor: f64,
}

impl ProximitySearch {
    pub fn new(safety_factor: f64) -> Result<Self> {
        if !safety_factor.is_finite() || safety_factor < 1.0 {
            return Err(GeoError::InvalidConfig(format!(
                "bounding box safety factor must be >= 1, got {}",
                safety_factor
            )));
        }

        Ok(Self { safety_factor })
    }

    pub fn safety_factor(&self) -> f64 {
        self.safety_factor
    }

    /// Phase 1 rectangle for a query. Fails on a negative or non-finite radius.
    pub fn bounds(&self, center: GeoPoint, radius_m: f64) -> Result<BoundingBox> {
        if !radius_m.is_finite() || radius_m < 0.0 {
            return Err(GeoError::InvalidRadius(radius_m));
        }

        Ok(BoundingBox::around(center, radius_m, self.safety_factor))
    }

    /// Trees within `radius_m` of `center`, nearest first.
    pub fn find_nearby<P>(
        &self,
        center: GeoPoint,
        radius_m: f64,
        provider: &P,
    ) -> Result<Vec<ProximityCandidate>>
    where
        P: CandidateProvider + ?Sized,
    {
        let bounds = self.bounds(center, radius_m)?;
        let candidates = CandidateProvider::candidates_within(provider, &bounds)?;

        debug!(
            %center,
            radius_m,
            candidates = candidates.len(),
            "bounding box pre-filter done"
        );

        Ok(refine(center, radius_m, candidates))
    }

    /// [`find_nearby`](Self::find_nearby) against a store that must be awaited.
    pub async fn find_nearby_async<P>(
        &self,
        center: GeoPoint,
        radius_m: f64,
        provider: &P,
    ) -> Result<Vec<ProximityCandidate>>
    where
        P: AsyncCandidateProvider + ?Sized,
    {
        let bounds = self.bounds(center, radius_m)?;
        let candidates = AsyncCandidateProvider::candidates_within(provider, &bounds).await?;

        debug!(
            %center,
            radius_m,
            candidates = candidates.len(),
            "bounding box pre-filter done"
        );

        Ok(refine(center, radius_m, candidates))
    }
}

impl Default for ProximitySearch {
    fn default() -> Self {
        Self {
            safety_factor: DEFAULT_SAFETY_FACTOR,
        }
    }
}

/// Exact pass: measure every candidate, keep those within `radius_m`, sort
/// ascending by distance. Ties keep the provider's order.
pub fn refine<I>(center: GeoPoint, radius_m: f64, candidates: I) -> Vec<ProximityCandidate>
where
    I: IntoIterator<Item = Arc<dyn PlantedTree>>,
{
    let mut nearby: Vec<ProximityCandidate> = candidates
        .into_iter()
        .filter_map(|tree| {
            let distance_m = haversine_distance(center, tree.location());
            if distance_m <= radius_m {
                Some(ProximityCandidate { tree, distance_m })
            } else {
                trace!(id = %tree.id(), distance_m, "outside radius");
                None
            }
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    nearby
}

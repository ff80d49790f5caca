//! Asynchronous storage traits.
//!
//! Database-backed callers implement these when the candidate read has to be
//! awaited rather than blocked on.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::models::traits::PlantedTree;
use crate::models::types::Result;
use crate::spatial::bbox::BoundingBox;

/// Range-query access to the persisted tree collection, awaited.
///
/// Same contract as [`CandidateProvider`](crate::models::traits::CandidateProvider).
pub trait AsyncCandidateProvider: Send + Sync {
    fn candidates_within<'a>(
        &'a self,
        bounds: &'a BoundingBox,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Arc<dyn PlantedTree>>>> + Send + 'a>>;
}

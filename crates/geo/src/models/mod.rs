//! Data models, types, and traits.

pub mod traits;
pub mod types;

// Re-exports for convenience
pub use traits::{CandidateProvider, PlantedTree};
pub use types::{GeoError, GeoPoint, ProximityCandidate, Rejection, Result, ValidationOutcome};

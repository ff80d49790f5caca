//! Business rules built on the spatial core.
//!
//! - **Duplicate planting**: a new tree may not be registered within
//!   `duplicate_radius_m` of an existing one.
//! - **Photo provenance**: a growth photo must be taken within
//!   `photo_max_distance_m` of the tree it documents.
//!
//! Checks only compute a [`ValidationOutcome`]. Refusing the request, rolling
//! back a write or deleting a stored upload is up to the caller.
//!
//! The duplicate check and the caller's subsequent insert are not atomic:
//! two concurrent requests can both pass the check.

use tracing::debug;

use crate::config::ValidationConfig;
use crate::metadata::extract_gps;
use crate::models::traits::{CandidateProvider, PlantedTree};
use crate::models::types::*;
use crate::spatial::queries::haversine_distance;
use crate::spatial::search::ProximitySearch;
use crate::storage::traits::AsyncCandidateProvider;

#[derive(Clone, Debug)]
pub struct ValidationPolicy {
    config: ValidationConfig,
    search: ProximitySearch,
}

impl ValidationPolicy {
    pub fn new(config: ValidationConfig) -> Result<Self> {
        config.validate()?;
        let search = ProximitySearch::new(config.bbox_safety_factor)?;

        Ok(Self { config, search })
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    pub fn search(&self) -> &ProximitySearch {
        &self.search
    }

    /// Reject `new_point` when an existing tree is within the duplicate radius.
    ///
    /// The nearest conflicting tree is reported.
    pub fn check_duplicate_planting<P>(
        &self,
        new_point: GeoPoint,
        provider: &P,
    ) -> Result<ValidationOutcome>
    where
        P: CandidateProvider + ?Sized,
    {
        let nearby = self
            .search
            .find_nearby(new_point, self.config.duplicate_radius_m, provider)?;

        Ok(self.duplicate_outcome(new_point, nearby))
    }

    pub async fn check_duplicate_planting_async<P>(
        &self,
        new_point: GeoPoint,
        provider: &P,
    ) -> Result<ValidationOutcome>
    where
        P: AsyncCandidateProvider + ?Sized,
    {
        let nearby = self
            .search
            .find_nearby_async(new_point, self.config.duplicate_radius_m, provider)
            .await?;

        Ok(self.duplicate_outcome(new_point, nearby))
    }

    fn duplicate_outcome(
        &self,
        new_point: GeoPoint,
        nearby: Vec<ProximityCandidate>,
    ) -> ValidationOutcome {
        let Some(nearest) = nearby.into_iter().next() else {
            return ValidationOutcome::allow(format!(
                "No tree planted within {}m",
                self.config.duplicate_radius_m
            ));
        };

        debug!(
            %new_point,
            conflicting = %nearest.id(),
            distance_m = nearest.distance_m,
            "duplicate planting rejected"
        );

        let reason = format!(
            "A tree already exists {:.1}m from this location (tree {}); trees must be at least {}m apart",
            nearest.distance_m,
            nearest.id(),
            self.config.duplicate_radius_m
        );

        ValidationOutcome::reject(
            Rejection::DuplicatePlanting,
            nearest.distance_m,
            Some(nearest.id().clone()),
            reason,
        )
    }

    /// Check that a photo was taken close to its tree.
    ///
    /// Missing location data on either side is never a reason to reject.
    pub fn check_photo_provenance(
        &self,
        photo_point: Option<GeoPoint>,
        tree_point: Option<GeoPoint>,
    ) -> ValidationOutcome {
        let (Some(photo), Some(tree)) = (photo_point, tree_point) else {
            return ValidationOutcome::allow("No location data to compare");
        };

        let distance_m = haversine_distance(photo, tree);
        let limit = self.config.photo_max_distance_m;

        if distance_m <= limit {
            return ValidationOutcome::allow(format!(
                "Photo taken {:.1}m from the tree",
                distance_m
            ))
            .with_distance(distance_m);
        }

        debug!(%photo, %tree, distance_m, "photo too far from tree");

        ValidationOutcome::reject(
            Rejection::PhotoTooFar,
            distance_m,
            None,
            format!(
                "Photo was taken {:.1}m from the tree; it must be within {}m",
                distance_m, limit
            ),
        )
    }

    /// [`check_photo_provenance`](Self::check_photo_provenance) against a
    /// known tree, reporting that tree as the reference.
    pub fn check_photo_for_tree(
        &self,
        photo_point: Option<GeoPoint>,
        tree: &dyn PlantedTree,
    ) -> ValidationOutcome {
        let outcome = self.check_photo_provenance(photo_point, Some(tree.location()));

        // Only outcomes that actually compared against the tree name it
        if outcome.distance_m.is_some() {
            outcome.with_reference(tree.id().clone())
        } else {
            outcome
        }
    }

    /// Where a photo was taken.
    ///
    /// A coordinate supplied by the client (device location at capture time)
    /// wins. The photo's own metadata is only read when there is none, and
    /// only if the photo is within `max_photo_bytes`.
    pub fn resolve_photo_point(
        &self,
        explicit: Option<GeoPoint>,
        photo: Option<&[u8]>,
    ) -> Option<GeoPoint> {
        if explicit.is_some() {
            return explicit;
        }

        let photo = photo?;
        if photo.len() as u64 > self.config.max_photo_bytes {
            debug!(
                size = photo.len(),
                max_bytes = self.config.max_photo_bytes,
                "photo too large for GPS extraction"
            );
            return None;
        }

        extract_gps(photo)
    }
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            config: ValidationConfig::default(),
            search: ProximitySearch::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::TreeIdentifier;
    use crate::provider::{StaticTreeProvider, TreeImpl};
    use crate::spatial::queries::EARTH_RADIUS_M;
    use crate::test_support::*;

    fn pt(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    /// Latitude offset in degrees for a northward move of `meters`
    fn north(meters: f64) -> f64 {
        (meters / EARTH_RADIUS_M).to_degrees()
    }

    fn tree(id: &str, lat: f64, lng: f64) -> TreeImpl {
        TreeImpl {
            id: TreeIdentifier::new(id),
            name: id.into(),
            location: pt(lat, lng),
        }
    }

    #[test]
    fn test_duplicate_rejected_with_nearest_id() {
        let provider = StaticTreeProvider::from_data(vec![
            tree("first", 19.0760, 72.8777),
            tree("second", 19.0760 + north(2.0), 72.8777),
        ]);

        let proposed = pt(19.0760 - north(1.0), 72.8777);
        let outcome = ValidationPolicy::default()
            .check_duplicate_planting(proposed, &provider)
            .unwrap();

        assert!(!outcome.allowed);
        assert_eq!(outcome.rejection(), Some(Rejection::DuplicatePlanting));
        assert_eq!(outcome.reference_id, Some(TreeIdentifier::new("first")));

        let distance = outcome.distance_m.unwrap();
        assert!((distance - 1.0).abs() < 0.01);
        assert!(outcome.reason.contains("1.0m"));
        assert!(outcome.reason.contains("first"));
    }

    #[test]
    fn test_same_coordinates_rejected() {
        let provider = StaticTreeProvider::from_data(vec![tree("t1", 19.0760, 72.8777)]);

        let outcome = ValidationPolicy::default()
            .check_duplicate_planting(pt(19.0760, 72.8777), &provider)
            .unwrap();

        assert!(!outcome.allowed);
        assert_eq!(outcome.distance_m, Some(0.0));
    }

    #[test]
    fn test_distinct_location_allowed() {
        let provider = StaticTreeProvider::from_data(vec![tree("t1", 19.0760, 72.8777)]);

        let outcome = ValidationPolicy::default()
            .check_duplicate_planting(pt(19.0770, 72.8800), &provider)
            .unwrap();

        assert!(outcome.allowed);
        assert_eq!(outcome.reference_id, None);
        assert_eq!(outcome.distance_m, None);
    }

    #[test]
    fn test_duplicate_radius_from_config() {
        let provider = StaticTreeProvider::from_data(vec![tree("t1", 19.0760, 72.8777)]);
        let policy = ValidationPolicy::new(ValidationConfig {
            duplicate_radius_m: 20.0,
            ..Default::default()
        })
        .unwrap();

        let outcome = policy
            .check_duplicate_planting(pt(19.0760 + north(10.0), 72.8777), &provider)
            .unwrap();
        assert!(!outcome.allowed);
    }

    #[test]
    fn test_duplicate_radius_is_inclusive() {
        let existing = pt(19.0760, 72.8777);
        let proposed = pt(19.0760 + north(5.0), 72.8777);
        let provider = StaticTreeProvider::from_data(vec![tree("t1", 19.0760, 72.8777)]);

        // A tree exactly on the limit is a duplicate
        let policy = ValidationPolicy::new(ValidationConfig {
            duplicate_radius_m: haversine_distance(proposed, existing),
            ..Default::default()
        })
        .unwrap();
        let outcome = policy.check_duplicate_planting(proposed, &provider).unwrap();
        assert!(!outcome.allowed);
        assert_eq!(outcome.reference_id, Some(TreeIdentifier::new("t1")));

        let policy = ValidationPolicy::default();
        let inside = pt(19.0760 + north(4.999), 72.8777);
        let outside = pt(19.0760 + north(5.01), 72.8777);
        assert!(!policy.check_duplicate_planting(inside, &provider).unwrap().allowed);
        assert!(policy.check_duplicate_planting(outside, &provider).unwrap().allowed);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ValidationPolicy::new(ValidationConfig {
            bbox_safety_factor: 0.5,
            ..Default::default()
        });
        assert!(matches!(result, Err(GeoError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_duplicate_check_async() {
        let provider = StaticTreeProvider::from_data(vec![tree("t1", 19.0760, 72.8777)]);

        let outcome = ValidationPolicy::default()
            .check_duplicate_planting_async(pt(19.0760 + north(3.0), 72.8777), &provider)
            .await
            .unwrap();

        assert!(!outcome.allowed);
        assert_eq!(outcome.reference_id, Some(TreeIdentifier::new("t1")));
    }

    #[test]
    fn test_photo_without_location_allowed() {
        let policy = ValidationPolicy::default();
        let tree_point = pt(19.0760, 72.8777);

        assert!(policy.check_photo_provenance(None, Some(tree_point)).allowed);
        assert!(policy.check_photo_provenance(Some(tree_point), None).allowed);
        assert!(policy.check_photo_provenance(None, None).allowed);
    }

    #[test]
    fn test_photo_near_tree_allowed() {
        let policy = ValidationPolicy::default();
        let tree_point = pt(19.0760, 72.8777);
        let photo_point = pt(19.0760 + north(30.0), 72.8777);

        let outcome = policy.check_photo_provenance(Some(photo_point), Some(tree_point));
        assert!(outcome.allowed);
        assert!((outcome.distance_m.unwrap() - 30.0).abs() < 0.01);
    }

    #[test]
    fn test_photo_far_from_tree_rejected() {
        let policy = ValidationPolicy::default();
        let tree_point = pt(19.0760, 72.8777);
        let photo_point = pt(19.0760 + north(80.0), 72.8777);

        let outcome = policy.check_photo_provenance(Some(photo_point), Some(tree_point));
        assert!(!outcome.allowed);
        assert_eq!(outcome.rejection(), Some(Rejection::PhotoTooFar));
        assert!(outcome.reason.contains("80.0m"), "{}", outcome.reason);
    }

    #[test]
    fn test_photo_distance_limit_is_inclusive() {
        let tree_point = pt(19.0760, 72.8777);
        let photo_point = pt(19.0760 + north(50.0), 72.8777);
        let distance = haversine_distance(photo_point, tree_point);

        let policy = ValidationPolicy::new(ValidationConfig {
            photo_max_distance_m: distance,
            ..Default::default()
        })
        .unwrap();
        let outcome = policy.check_photo_provenance(Some(photo_point), Some(tree_point));
        assert!(outcome.allowed);
        assert_eq!(outcome.distance_m, Some(distance));

        let policy = ValidationPolicy::default();
        let at_limit = pt(19.0760 + north(49.999), 72.8777);
        let past_limit = pt(19.0760 + north(50.01), 72.8777);
        assert!(policy.check_photo_provenance(Some(at_limit), Some(tree_point)).allowed);

        let outcome = policy.check_photo_provenance(Some(past_limit), Some(tree_point));
        assert!(!outcome.allowed);
        assert_eq!(outcome.rejection(), Some(Rejection::PhotoTooFar));
    }

    #[test]
    fn test_photo_for_tree_reports_tree() {
        let policy = ValidationPolicy::default();
        let banyan = tree("banyan", 19.0760, 72.8777);

        let far = policy.check_photo_for_tree(Some(pt(19.0760 + north(500.0), 72.8777)), &banyan);
        assert!(!far.allowed);
        assert_eq!(far.reference_id, Some(TreeIdentifier::new("banyan")));

        let near = policy.check_photo_for_tree(Some(pt(19.0760, 72.8777)), &banyan);
        assert!(near.allowed);
        assert_eq!(near.reference_id, Some(TreeIdentifier::new("banyan")));

        let unknown = policy.check_photo_for_tree(None, &banyan);
        assert!(unknown.allowed);
        assert_eq!(unknown.reference_id, None);
    }

    fn photo_at_mumbai() -> Vec<u8> {
        jpeg(tiff(vec![], Some(mumbai_gps("N", "E"))))
    }

    #[test]
    fn test_explicit_location_wins_over_metadata() {
        let policy = ValidationPolicy::default();
        let device = pt(-33.8688, 151.2093);
        let photo = photo_at_mumbai();

        assert_eq!(policy.resolve_photo_point(Some(device), Some(photo.as_slice())), Some(device));
    }

    #[test]
    fn test_metadata_used_without_explicit_location() {
        let policy = ValidationPolicy::default();
        let photo = photo_at_mumbai();

        let point = policy.resolve_photo_point(None, Some(photo.as_slice())).unwrap();
        assert!((point.lat() - 19.076).abs() < 1e-6);
        assert!((point.lng() - 72.8777).abs() < 1e-6);

        assert_eq!(policy.resolve_photo_point(None, None), None);
        assert_eq!(policy.resolve_photo_point(None, Some(&b"garbage"[..])), None);
    }

    #[test]
    fn test_oversized_photo_not_parsed() {
        let policy = ValidationPolicy::new(ValidationConfig {
            max_photo_bytes: 16,
            ..Default::default()
        })
        .unwrap();

        assert_eq!(policy.resolve_photo_point(None, Some(photo_at_mumbai().as_slice())), None);
    }
}

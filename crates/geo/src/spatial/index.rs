//! R-tree nodes for the in-memory candidate provider.
//!
//! Nodes live in plain degree space (x = longitude, y = latitude). The tree is
//! only ever asked rectangle queries, which are exact in that space; distance
//! in meters is left to the haversine refinement pass.

use std::sync::Arc;

use geo::Rect;
use rstar::{RTreeObject, AABB};

use crate::models::traits::PlantedTree;

#[derive(Clone)]
pub struct TreeNode {
    pub tree: Arc<dyn PlantedTree>,
    point: [f64; 2],
}

impl TreeNode {
    pub fn new(tree: Arc<dyn PlantedTree>) -> Self {
        let location = tree.location();
        Self {
            tree,
            point: [location.lng(), location.lat()],
        }
    }
}

impl RTreeObject for TreeNode {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

/// Envelope covering a `geo` rectangle.
pub fn rect_envelope(rect: &Rect) -> AABB<[f64; 2]> {
    AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y])
}

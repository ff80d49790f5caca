//! In-memory candidate provider.
//!
//! Holds a snapshot of trees with an R-tree over their coordinates so range
//! queries don't scan every tree. Used by the command-line tool and tests; a
//! production deployment answers the same range query from its database.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use rstar::RTree;

use crate::identifiers::TreeIdentifier;
use crate::models::{traits::*, types::*};
use crate::spatial::bbox::BoundingBox;
use crate::spatial::index::{rect_envelope, TreeNode};
use crate::storage::traits::AsyncCandidateProvider;

// ============================================================================
// Concrete Implementation of PlantedTree
// ============================================================================

#[derive(Clone, Debug)]
pub struct TreeImpl {
    pub id: TreeIdentifier,
    pub name: Arc<str>,
    pub location: GeoPoint,
}

impl PlantedTree for TreeImpl {
    fn id(&self) -> &TreeIdentifier {
        &self.id
    }

    fn location(&self) -> GeoPoint {
        self.location
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Static Provider
// ============================================================================

/// In-memory tree collection with a spatial index
///
/// This type is cheap to clone since all data is stored in `Arc`s.
#[derive(Clone)]
pub struct StaticTreeProvider {
    trees: Vec<Arc<TreeImpl>>,
    tree_map: HashMap<TreeIdentifier, Arc<TreeImpl>>,
    tree_index: Arc<RTree<TreeNode>>,
}

impl StaticTreeProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self {
            trees: Vec::new(),
            tree_map: HashMap::new(),
            tree_index: Arc::new(RTree::new()),
        }
    }

    /// Build provider from a snapshot of trees
    pub fn from_data(trees: Vec<TreeImpl>) -> Self {
        let trees: Vec<Arc<TreeImpl>> = trees.into_iter().map(Arc::new).collect();

        let tree_map: HashMap<_, _> = trees
            .iter()
            .map(|t| (t.id.clone(), t.clone()))
            .collect();

        let tree_index = RTree::bulk_load(
            trees
                .iter()
                .map(|t| TreeNode::new(t.clone() as Arc<dyn PlantedTree>))
                .collect(),
        );

        Self {
            trees,
            tree_map,
            tree_index: Arc::new(tree_index),
        }
    }

    pub fn get_tree(&self, id: &TreeIdentifier) -> Option<Arc<dyn PlantedTree>> {
        self.tree_map.get(id).map(|t| t.clone() as Arc<dyn PlantedTree>)
    }

    pub fn all_trees(&self) -> Vec<Arc<dyn PlantedTree>> {
        self.trees
            .iter()
            .map(|t| t.clone() as Arc<dyn PlantedTree>)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }
}

impl Default for StaticTreeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CandidateProvider for StaticTreeProvider {
    fn candidates_within(&self, bounds: &BoundingBox) -> Result<Vec<Arc<dyn PlantedTree>>> {
        // Split boxes are disjoint, so no tree is reported twice
        Ok(bounds
            .rects()
            .iter()
            .flat_map(|rect| self.tree_index.locate_in_envelope(&rect_envelope(rect)))
            .map(|node| node.tree.clone())
            .collect())
    }
}

impl AsyncCandidateProvider for StaticTreeProvider {
    fn candidates_within<'a>(
        &'a self,
        bounds: &'a BoundingBox,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<Arc<dyn PlantedTree>>>> + Send + 'a>> {
        let result = CandidateProvider::candidates_within(self, bounds);
        Box::pin(async move { result })
    }
}

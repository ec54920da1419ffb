//! Loose octree over axis-aligned bounds.
//!
//! Every node covers a cube of `base_length` but accepts any entry that fits
//! inside its loose cube (`base_length * looseness`). An entry lives in the
//! deepest node whose loose bounds enclose it, so small moving effectors
//! rarely change nodes. The root grows toward entries that do not fit.

use std::collections::HashMap;

use glam::DVec3;

use updraft_core::config::OctreeConfig;
use updraft_core::constants::{OCTREE_MAX_GROW_ATTEMPTS, OCTREE_NODE_CAPACITY};
use updraft_core::error::{ConfigError, ConfigResult};
use updraft_core::types::Aabb;

use crate::index::{ensure_finite_bounds, IndexHandle, SpatialIndex};

#[derive(Debug, Clone, Copy)]
struct Tuning {
    looseness: f64,
    min_node_size: f64,
}

#[derive(Debug, Clone)]
struct Node<H> {
    center: DVec3,
    base_length: f64,
    loose_bounds: Aabb,
    entries: Vec<(H, Aabb)>,
    children: Option<Box<[Node<H>; 8]>>,
}

impl<H: IndexHandle> Node<H> {
    fn new(center: DVec3, base_length: f64, tuning: Tuning) -> Self {
        Self {
            center,
            base_length,
            loose_bounds: Aabb::from_center_half_extents(
                center,
                DVec3::splat(base_length * tuning.looseness * 0.5),
            ),
            entries: Vec::new(),
            children: None,
        }
    }

    /// Octant index: bit 0 = +X half, bit 1 = +Y half, bit 2 = +Z half.
    fn octant_of(&self, point: DVec3) -> usize {
        usize::from(point.x >= self.center.x)
            | usize::from(point.y >= self.center.y) << 1
            | usize::from(point.z >= self.center.z) << 2
    }

    fn child_center(&self, octant: usize) -> DVec3 {
        let q = self.base_length * 0.25;
        let sign = |bit: usize| if octant & bit != 0 { q } else { -q };
        self.center + DVec3::new(sign(1), sign(2), sign(4))
    }

    fn make_children(&self, tuning: Tuning) -> Box<[Node<H>; 8]> {
        let half = self.base_length * 0.5;
        Box::new(std::array::from_fn(|octant| {
            Node::new(self.child_center(octant), half, tuning)
        }))
    }

    fn insert(&mut self, handle: H, bounds: Aabb, tuning: Tuning) -> bool {
        if !self.loose_bounds.encloses(&bounds) {
            return false;
        }

        if self.children.is_none() {
            let too_small = self.base_length * 0.5 < tuning.min_node_size;
            if self.entries.len() < OCTREE_NODE_CAPACITY || too_small {
                self.entries.push((handle, bounds));
                return true;
            }
            self.split(tuning);
        }

        let octant = self.octant_of(bounds.center());
        if let Some(children) = self.children.as_mut() {
            if children[octant].insert(handle, bounds, tuning) {
                return true;
            }
        }
        self.entries.push((handle, bounds));
        true
    }

    /// Create children and push down every entry that fits in one.
    fn split(&mut self, tuning: Tuning) {
        let mut children = self.make_children(tuning);
        let entries = std::mem::take(&mut self.entries);
        for (handle, bounds) in entries {
            let octant = self.octant_of(bounds.center());
            if !children[octant].insert(handle, bounds, tuning) {
                self.entries.push((handle, bounds));
            }
        }
        self.children = Some(children);
    }

    fn remove(&mut self, handle: H, bounds: &Aabb) -> bool {
        if !self.loose_bounds.encloses(bounds) {
            return false;
        }

        let mut removed = false;
        if let Some(i) = self.entries.iter().position(|(h, _)| *h == handle) {
            self.entries.swap_remove(i);
            removed = true;
        } else if let Some(children) = self.children.as_mut() {
            removed = children.iter_mut().any(|child| child.remove(handle, bounds));
        }

        if removed && self.should_merge() {
            self.merge();
        }
        removed
    }

    /// Children are all leaves and everything fits back in this node.
    fn should_merge(&self) -> bool {
        let Some(children) = self.children.as_ref() else {
            return false;
        };
        if children.iter().any(|c| c.children.is_some()) {
            return false;
        }
        let total = self.entries.len() + children.iter().map(|c| c.entries.len()).sum::<usize>();
        total <= OCTREE_NODE_CAPACITY
    }

    fn merge(&mut self) {
        if let Some(children) = self.children.take() {
            let children = *children;
            for child in children {
                self.entries.extend(child.entries);
            }
        }
    }

    fn query(&self, bounds: &Aabb, out: &mut Vec<H>) {
        if !self.loose_bounds.intersects(bounds) {
            return;
        }
        out.extend(
            self.entries
                .iter()
                .filter(|(_, b)| b.intersects(bounds))
                .map(|(h, _)| *h),
        );
        if let Some(children) = self.children.as_ref() {
            for child in children.iter() {
                child.query(bounds, out);
            }
        }
    }

    fn is_empty_subtree(&self) -> bool {
        self.entries.is_empty()
            && self
                .children
                .as_ref()
                .map_or(true, |c| c.iter().all(Node::is_empty_subtree))
    }

    fn node_count(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(Node::node_count).sum())
    }

    fn depth(&self) -> usize {
        1 + self
            .children
            .as_ref()
            .map_or(0, |c| c.iter().map(Node::depth).max().unwrap_or(0))
    }
}

/// Loose octree keyed by handle.
#[derive(Debug, Clone)]
pub struct LooseOctree<H> {
    root: Node<H>,
    bounds_by_handle: HashMap<H, Aabb>,
    tuning: Tuning,
    config: OctreeConfig,
}

impl<H: IndexHandle> LooseOctree<H> {
    pub fn new(config: &OctreeConfig) -> ConfigResult<Self> {
        config.validate()?;
        let tuning = Tuning {
            looseness: config.looseness,
            min_node_size: config.min_node_size,
        };
        Ok(Self {
            root: Node::new(config.center, config.initial_size, tuning),
            bounds_by_handle: HashMap::new(),
            tuning,
            config: *config,
        })
    }

    /// Stored bounds for `handle`.
    pub fn bounds_of(&self, handle: H) -> Option<Aabb> {
        self.bounds_by_handle.get(&handle).copied()
    }

    /// Edge length of the root's base cube.
    pub fn root_size(&self) -> f64 {
        self.root.base_length
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    pub fn depth(&self) -> usize {
        self.root.depth()
    }

    /// Double the root toward `target`, keeping the old root as one octant.
    fn grow(&mut self, target: DVec3) {
        let old_length = self.root.base_length;
        let direction = DVec3::select(
            target.cmpge(self.root.center),
            DVec3::ONE,
            DVec3::NEG_ONE,
        );
        let new_center = self.root.center + direction * (old_length * 0.5);
        let new_root = Node::new(new_center, old_length * 2.0, self.tuning);
        let old_root = std::mem::replace(&mut self.root, new_root);

        log::debug!(
            "wind index root grew to {} m centered at {}",
            self.root.base_length,
            self.root.center
        );

        if old_root.is_empty_subtree() {
            return;
        }
        let old_octant = self.root.octant_of(old_root.center);
        let mut children = self.root.make_children(self.tuning);
        children[old_octant] = old_root;
        self.root.children = Some(children);
    }
}

impl<H: IndexHandle> SpatialIndex<H> for LooseOctree<H> {
    fn insert(&mut self, handle: H, bounds: Aabb) -> ConfigResult<()> {
        ensure_finite_bounds(&bounds)?;
        let previous = self.bounds_by_handle.get(&handle).copied();
        self.remove(handle);

        for _ in 0..OCTREE_MAX_GROW_ATTEMPTS {
            if self.root.insert(handle, bounds, self.tuning) {
                self.bounds_by_handle.insert(handle, bounds);
                return Ok(());
            }
            self.grow(bounds.center());
        }

        // Growing never shrinks the root, so the old bounds still fit.
        if let Some(old) = previous {
            if self.root.insert(handle, old, self.tuning) {
                self.bounds_by_handle.insert(handle, old);
            }
        }
        Err(ConfigError::OutOfRange {
            name: "index bounds extent",
            value: bounds.size().max_element(),
            min: 0.0,
            max: self.root.base_length,
        })
    }

    fn remove(&mut self, handle: H) -> bool {
        match self.bounds_by_handle.remove(&handle) {
            Some(bounds) => self.root.remove(handle, &bounds),
            None => false,
        }
    }

    fn query(&self, bounds: &Aabb, out: &mut Vec<H>) {
        self.root.query(bounds, out);
    }

    fn len(&self) -> usize {
        self.bounds_by_handle.len()
    }

    fn clear(&mut self) {
        self.root = Node::new(self.config.center, self.config.initial_size, self.tuning);
        self.bounds_by_handle.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn octree() -> LooseOctree<u32> {
        LooseOctree::new(&OctreeConfig {
            initial_size: 64.0,
            min_node_size: 1.0,
            ..OctreeConfig::default()
        })
        .unwrap()
    }

    fn query(tree: &LooseOctree<u32>, bounds: Aabb) -> Vec<u32> {
        let mut out = Vec::new();
        tree.query(&bounds, &mut out);
        out.sort_unstable();
        out
    }

    #[test]
    fn splits_past_capacity() {
        let mut tree = octree();
        for i in 0..(OCTREE_NODE_CAPACITY as u32 + 4) {
            let x = -20.0 + i as f64 * 3.0;
            tree.insert(i, Aabb::from_sphere(DVec3::new(x, 5.0, 5.0), 0.5))
                .unwrap();
        }
        assert!(tree.node_count() > 1, "root should have split");
        assert_eq!(tree.len(), OCTREE_NODE_CAPACITY + 4);
    }

    #[test]
    fn grows_toward_far_entries() {
        let mut tree = octree();
        tree.insert(1, Aabb::from_sphere(DVec3::ZERO, 1.0)).unwrap();
        tree.insert(2, Aabb::from_sphere(DVec3::splat(500.0), 10.0))
            .unwrap();
        assert!(tree.root_size() > 64.0);
        assert_eq!(query(&tree, Aabb::from_point(DVec3::ZERO)), vec![1]);
        assert_eq!(query(&tree, Aabb::from_point(DVec3::splat(505.0))), vec![2]);
    }

    #[test]
    fn grows_in_negative_direction() {
        let mut tree = octree();
        tree.insert(1, Aabb::from_sphere(DVec3::new(1.0, 1.0, 1.0), 0.5))
            .unwrap();
        tree.insert(2, Aabb::from_sphere(DVec3::splat(-900.0), 5.0))
            .unwrap();
        assert_eq!(query(&tree, Aabb::from_point(DVec3::splat(-900.0))), vec![2]);
        assert_eq!(query(&tree, Aabb::from_point(DVec3::ONE)), vec![1]);
    }

    #[test]
    fn remove_then_merge() {
        let mut tree = octree();
        let count = OCTREE_NODE_CAPACITY as u32 * 3;
        for i in 0..count {
            let p = DVec3::new((i % 7) as f64 * 4.0 - 12.0, (i / 7) as f64 * 4.0 - 8.0, 3.0);
            tree.insert(i, Aabb::from_sphere(p, 0.25)).unwrap();
        }
        let split_nodes = tree.node_count();
        assert!(split_nodes > 1);

        for i in 0..count {
            assert!(tree.remove(i), "entry {i} should be removable");
        }
        assert!(tree.is_empty());
        assert_eq!(tree.node_count(), 1, "empty tree should merge back to the root");
        assert!(!tree.remove(0));
    }

    #[test]
    fn reinsert_moves_entry() {
        let mut tree = octree();
        tree.insert(1, Aabb::from_sphere(DVec3::new(10.0, 0.0, 0.0), 1.0))
            .unwrap();
        tree.insert(1, Aabb::from_sphere(DVec3::new(-10.0, 0.0, 0.0), 1.0))
            .unwrap();
        assert_eq!(tree.len(), 1);
        assert!(query(&tree, Aabb::from_point(DVec3::new(10.0, 0.0, 0.0))).is_empty());
        assert_eq!(
            query(&tree, Aabb::from_point(DVec3::new(-10.0, 0.0, 0.0))),
            vec![1]
        );
    }

    #[test]
    fn failed_move_keeps_old_entry() {
        let mut tree = octree();
        let home = Aabb::from_sphere(DVec3::new(3.0, 0.0, 0.0), 1.0);
        tree.insert(1, home).unwrap();
        assert!(tree
            .insert(1, Aabb::from_sphere(DVec3::new(1.0e12, 0.0, 0.0), 1.0))
            .is_err());
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.bounds_of(1), Some(home));
        assert_eq!(query(&tree, Aabb::from_point(DVec3::new(3.0, 0.0, 0.0))), vec![1]);
    }

    #[test]
    fn clear_resets_root() {
        let mut tree = octree();
        tree.insert(1, Aabb::from_sphere(DVec3::splat(1_000.0), 1.0))
            .unwrap();
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.root_size(), 64.0);
    }
}

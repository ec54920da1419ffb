//! Spatial index contract and the brute-force implementation.
//!
//! A query must return every stored handle whose bounds intersect the query
//! bounds. Extra handles are allowed; callers filter with exact tests.

use std::fmt::Debug;
use std::hash::Hash;

use updraft_core::error::{ConfigError, ConfigResult};
use updraft_core::types::Aabb;

/// Handles stored in a spatial index.
pub trait IndexHandle: Copy + Eq + Hash + Debug {}

impl<T: Copy + Eq + Hash + Debug> IndexHandle for T {}

/// Insert/remove/range-query over axis-aligned bounds.
///
/// Queries take `&self` and write into a caller-owned buffer, so any number
/// of read-only queries may run between two mutations.
pub trait SpatialIndex<H: IndexHandle> {
    /// Store `handle` with `bounds`, replacing any previous bounds for it.
    fn insert(&mut self, handle: H, bounds: Aabb) -> ConfigResult<()>;

    /// Drop `handle`. Returns false if it was not stored.
    fn remove(&mut self, handle: H) -> bool;

    /// Append every handle whose bounds intersect `bounds` to `out`.
    fn query(&self, bounds: &Aabb, out: &mut Vec<H>);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

pub(crate) fn ensure_finite_bounds(bounds: &Aabb) -> ConfigResult<()> {
    if bounds.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite {
            name: "index bounds",
            value: f64::NAN,
        })
    }
}

/// Linear scan over every entry. Fine for a handful of effectors.
#[derive(Debug, Clone, Default)]
pub struct LinearIndex<H> {
    entries: Vec<(H, Aabb)>,
}

impl<H: IndexHandle> LinearIndex<H> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<H: IndexHandle> SpatialIndex<H> for LinearIndex<H> {
    fn insert(&mut self, handle: H, bounds: Aabb) -> ConfigResult<()> {
        ensure_finite_bounds(&bounds)?;
        match self.entries.iter_mut().find(|(h, _)| *h == handle) {
            Some(entry) => entry.1 = bounds,
            None => self.entries.push((handle, bounds)),
        }
        Ok(())
    }

    fn remove(&mut self, handle: H) -> bool {
        match self.entries.iter().position(|(h, _)| *h == handle) {
            Some(i) => {
                self.entries.remove(i);
                true
            }
            None => false,
        }
    }

    fn query(&self, bounds: &Aabb, out: &mut Vec<H>) {
        out.extend(
            self.entries
                .iter()
                .filter(|(_, b)| b.intersects(bounds))
                .map(|(h, _)| *h),
        );
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec3;

    #[test]
    fn insert_replaces_existing_handle() {
        let mut index = LinearIndex::new();
        index.insert(1u32, Aabb::from_sphere(DVec3::ZERO, 1.0)).unwrap();
        index
            .insert(1u32, Aabb::from_sphere(DVec3::splat(100.0), 1.0))
            .unwrap();
        assert_eq!(index.len(), 1);

        let mut out = Vec::new();
        index.query(&Aabb::from_point(DVec3::ZERO), &mut out);
        assert!(out.is_empty());
        index.query(&Aabb::from_point(DVec3::splat(100.0)), &mut out);
        assert_eq!(out, vec![1]);
    }

    #[test]
    fn remove_reports_presence() {
        let mut index = LinearIndex::new();
        index.insert(7u32, Aabb::from_point(DVec3::ZERO)).unwrap();
        assert!(index.remove(7));
        assert!(!index.remove(7));
        assert!(index.is_empty());
    }

    #[test]
    fn rejects_non_finite_bounds() {
        let mut index = LinearIndex::new();
        let bad = Aabb::from_point(DVec3::new(f64::NAN, 0.0, 0.0));
        assert!(index.insert(1u32, bad).is_err());
        assert!(index.is_empty());
    }
}

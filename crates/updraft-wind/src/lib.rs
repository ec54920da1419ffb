//! Wind field for the updraft aerodynamics engine.
//!
//! Composes uniform base wind, localized effectors (found through a spatial
//! index), world-border push-back and procedural turbulence into a single
//! velocity sample.

pub mod border;
pub mod effector;
pub mod field;
pub mod index;
pub mod octree;
pub mod turbulence;

pub use updraft_core as core;

pub use border::BorderField;
pub use effector::{EffectorConfig, WindEffector};
pub use field::{EffectorId, EffectorIndex, WindField};
pub use index::{IndexHandle, LinearIndex, SpatialIndex};
pub use octree::LooseOctree;
pub use turbulence::NoiseField;

//! ECS systems that operate on the aerodynamics world each step.
//!
//! Systems are plain functions over `&mut World` (or `&World` for read-only
//! passes). They hold no state; everything lives in components.

pub mod aerodynamics;
pub mod applicators;
pub mod controls;
pub mod effectors;
pub mod snapshot;

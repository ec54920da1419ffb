//! Aerodynamic surfaces and the engine that drives them.
//!
//! Owns the hecs ECS world of surfaces, controls, applicators and effector
//! mounts, steps them at a fixed rate against a [`PhysicsHost`], and produces
//! `AeroSnapshot`s for tooling.

pub mod airfoil;
pub mod applicator;
pub mod bluff;
pub mod canopy;
pub mod components;
pub mod control;
pub mod cylinder;
pub mod engine;
pub mod hooks;
pub mod host;
pub mod scenario;
pub mod surface;
pub mod systems;
pub mod wing;

pub use updraft_core as core;
pub use updraft_wind as wind;

pub use airfoil::{AirfoilConfig, SingleSectionAirfoil};
pub use applicator::ForceApplicator;
pub use bluff::{BluffBody, BluffBodyConfig};
pub use canopy::{CanopyConfig, CanopyProfile, ParachuteCanopy};
pub use control::{ControlConfig, ControlSurface};
pub use cylinder::{CylinderConfig, CylindricalBody};
pub use engine::AeroEngine;
pub use hooks::{HookFn, HookId};
pub use host::{BodyHandle, KinematicHost, PhysicsHost, RigidBody};
pub use scenario::{Scenario, ScenarioWorld};
pub use surface::{AerodynamicSurface, AxisResponse, SurfaceModel};
pub use wing::{MultiSectionWing, WingConfig};

//! Simulation snapshot: the visible aerodynamic state after each tick.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::enums::SurfaceKind;
use crate::types::SimTime;

/// Complete per-tick state handed to tooling, HUDs and tests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AeroSnapshot {
    pub time: SimTime,
    /// Whether a wind field was attached for this tick.
    pub wind_attached: bool,
    /// Number of effectors currently registered in the wind index.
    pub active_effectors: usize,
    pub surfaces: Vec<SurfaceView>,
}

/// Telemetry for a single aerodynamic surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceView {
    /// Stable entity id (`hecs::Entity::to_bits`).
    pub id: u64,
    pub kind: SurfaceKind,
    pub area: f64,
    /// World-space center of pressure.
    pub center: DVec3,
    /// Degrees.
    pub angle_of_attack: f64,
    pub air_speed: f64,
    pub relative_velocity: DVec3,
    pub wind: DVec3,
    pub lift: DVec3,
    pub drag: DVec3,
    pub moment: DVec3,
    pub efficiency: f64,
}

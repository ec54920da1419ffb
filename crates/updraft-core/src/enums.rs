//! Enumeration types used throughout the simulation.

use glam::DVec3;
use serde::{Deserialize, Serialize};

/// Body axis an aerodynamic response is measured about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseAxis {
    /// About local +X. Angle of attack measured from +Z in the Y-Z plane.
    #[default]
    Pitch,
    /// About local +Z. Angle measured from +Y in the X-Y plane.
    Roll,
    /// About local +Y. Sideslip measured from +Z in the X-Z plane.
    Yaw,
}

impl ResponseAxis {
    /// The axis itself in body-local coordinates.
    pub fn local_axis(self) -> DVec3 {
        match self {
            Self::Pitch => DVec3::X,
            Self::Roll => DVec3::Z,
            Self::Yaw => DVec3::Y,
        }
    }

    /// Zero-angle reference direction in body-local coordinates.
    pub fn local_reference(self) -> DVec3 {
        match self {
            Self::Pitch | Self::Yaw => DVec3::Z,
            Self::Roll => DVec3::Y,
        }
    }
}

/// What a coefficient curve produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForceType {
    #[default]
    Lift,
    Drag,
    Moment,
}

/// Surface variant tag, used in snapshots and fault reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceKind {
    MultiSectionWing,
    SingleSectionAirfoil,
    BluffBody,
    CylindricalBody,
    ParachuteCanopy,
}

impl SurfaceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultiSectionWing => "MultiSectionWing",
            Self::SingleSectionAirfoil => "SingleSectionAirfoil",
            Self::BluffBody => "BluffBody",
            Self::CylindricalBody => "CylindricalBody",
            Self::ParachuteCanopy => "ParachuteCanopy",
        }
    }
}

impl std::fmt::Display for SurfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle points at which surface hooks fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FramePhase {
    PreVisual,
    PostVisual,
    PrePhysics,
    PostPhysics,
}

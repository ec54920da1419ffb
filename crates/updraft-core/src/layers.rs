//! Collision layer masks for host raycasts.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

bitflags! {
    /// Set of collision layers a raycast may hit.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct LayerMask: u32 {
        const DEFAULT = 1 << 0;
        const TERRAIN = 1 << 1;
        const WATER = 1 << 2;
        const OBSTACLE = 1 << 3;
        /// Colliders belonging to the body doing the query.
        const SELF = 1 << 8;
        const UI = 1 << 9;
        const PLAYER = 1 << 10;
    }
}

impl LayerMask {
    /// Everything except the querying body, UI and player layers.
    pub fn ground_effect() -> Self {
        Self::all().difference(Self::SELF | Self::UI | Self::PLAYER)
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ground_effect()
    }
}

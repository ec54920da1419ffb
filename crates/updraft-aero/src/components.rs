//! Small ECS components that tie wind effectors to entities.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use updraft_core::error::{ConfigError, ConfigResult};
use updraft_wind::{EffectorId, WindEffector};

use crate::host::BodyHandle;

/// The entity owns one effector. The effector follows the entity from one
/// attached wind field to the next.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindSource {
    /// Id in the attached field; `None` while detached.
    pub id: Option<EffectorId>,
    /// Effector state as of the last detach.
    pub effector: WindEffector,
    pub enabled: bool,
}

/// Keeps an effector glued to a host body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectorMount {
    pub body: BodyHandle,
    /// Body-local position of the effector.
    pub local_position: DVec3,
    /// Body-local blowing direction.
    pub local_forward: DVec3,
}

impl EffectorMount {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.local_position.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "effector mount position",
                value: f64::NAN,
            });
        }
        match self.local_forward.try_normalize() {
            Some(_) => Ok(()),
            None => Err(ConfigError::NonFinite {
                name: "effector mount forward axis",
                value: self.local_forward.length(),
            }),
        }
    }
}

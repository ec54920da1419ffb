//! Orientation-independent drag body.

use serde::{Deserialize, Serialize};

use updraft_core::error::{ensure_finite, ensure_positive, ConfigResult};

use crate::surface::{dynamic_pressure, AppliedLoad, StepContext, SurfaceState};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BluffBodyConfig {
    pub reference_area: f64,
    pub drag_coefficient: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BluffBody {
    reference_area: f64,
    drag_coefficient: f64,
}

impl BluffBody {
    pub fn new(config: &BluffBodyConfig) -> ConfigResult<Self> {
        ensure_positive("bluff body reference area", config.reference_area)?;
        ensure_finite("bluff body drag coefficient", config.drag_coefficient)?;
        Ok(Self {
            reference_area: config.reference_area,
            drag_coefficient: config.drag_coefficient,
        })
    }

    pub fn reference_area(&self) -> f64 {
        self.reference_area
    }

    pub fn drag_coefficient(&self) -> f64 {
        self.drag_coefficient
    }

    pub(crate) fn compute(
        &mut self,
        ctx: &StepContext<'_>,
        state: &mut SurfaceState,
        loads: &mut Vec<AppliedLoad>,
    ) {
        let position = ctx.pose.position;
        let wind = ctx.wind.sample_velocity(position);
        let relative = ctx.point_velocity(position) - wind;
        let air_speed = relative.length();
        let magnitude = dynamic_pressure(ctx.wind.sample_air_density(position), air_speed)
            * self.reference_area
            * self.drag_coefficient
            * state.efficiency();
        let drag = -relative.normalize_or_zero() * magnitude;

        state.wind = wind;
        state.relative_velocity = relative;
        state.air_speed = air_speed;
        state.angle_of_attack = 0.0;
        state.drag = drag;
        loads.push(AppliedLoad {
            force: drag,
            torque: glam::DVec3::ZERO,
            position,
        });
    }
}

//! Roll-invariant slender body.
//!
//! Coefficients depend only on the unsigned angle between the motion through
//! the air and the body's long axis. Lift lies in the plane of the two,
//! perpendicular to the motion.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use updraft_core::curve::CoefficientCurve;
use updraft_core::error::{ensure_positive, ConfigError, ConfigResult};
use updraft_core::math::angle_between_deg;

use crate::surface::{dynamic_pressure, AppliedLoad, StepContext, SurfaceState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CylinderConfig {
    pub area: f64,
    /// Long axis in surface-local space.
    #[serde(default = "forward")]
    pub axis: DVec3,
    pub lift_curve: CoefficientCurve,
    pub drag_curve: CoefficientCurve,
}

fn forward() -> DVec3 {
    DVec3::Z
}

#[derive(Debug, Clone)]
pub struct CylindricalBody {
    area: f64,
    axis: DVec3,
    lift_curve: CoefficientCurve,
    drag_curve: CoefficientCurve,
}

impl CylindricalBody {
    pub fn new(config: &CylinderConfig) -> ConfigResult<Self> {
        ensure_positive("cylinder area", config.area)?;
        let axis = config.axis.try_normalize().ok_or(ConfigError::NonFinite {
            name: "cylinder axis",
            value: config.axis.length(),
        })?;
        config.lift_curve.validate()?;
        config.drag_curve.validate()?;
        Ok(Self {
            area: config.area,
            axis,
            lift_curve: config.lift_curve.clone(),
            drag_curve: config.drag_curve.clone(),
        })
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn axis(&self) -> DVec3 {
        self.axis
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
        let pressure = dynamic_pressure(ctx.wind.sample_air_density(position), air_speed) * self.area;

        let axis = ctx.pose.transform_vector(self.axis);
        let direction = relative.normalize_or_zero();
        let angle = angle_between_deg(relative, axis);
        let efficiency = state.efficiency();

        let lift_direction = direction.cross(axis).cross(direction).normalize_or_zero();
        let lift = lift_direction
            * (self.lift_curve.evaluate(angle) * pressure * efficiency * efficiency);
        let drag = -direction * (self.drag_curve.evaluate(angle) * pressure * efficiency);

        state.wind = wind;
        state.relative_velocity = relative;
        state.air_speed = air_speed;
        state.angle_of_attack = angle;
        state.lift = lift;
        state.drag = drag;
        loads.push(AppliedLoad {
            force: lift + drag,
            torque: DVec3::ZERO,
            position,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_axis() {
        let config = CylinderConfig {
            area: 1.0,
            axis: DVec3::ZERO,
            lift_curve: CoefficientCurve::constant(0.0).unwrap(),
            drag_curve: CoefficientCurve::constant(1.0).unwrap(),
        };
        assert!(CylindricalBody::new(&config).is_err());
    }

    #[test]
    fn axis_is_normalized() {
        let config = CylinderConfig {
            area: 1.0,
            axis: DVec3::new(0.0, 0.0, 4.0),
            lift_curve: CoefficientCurve::constant(0.0).unwrap(),
            drag_curve: CoefficientCurve::constant(1.0).unwrap(),
        };
        assert_eq!(CylindricalBody::new(&config).unwrap().axis(), DVec3::Z);
    }
}

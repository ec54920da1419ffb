//! Single evaluation point airfoil with pitch responses only.

use serde::{Deserialize, Serialize};

use updraft_core::enums::{ResponseAxis, SurfaceKind};
use updraft_core::error::{ensure_positive, ConfigError, ConfigResult, NumericFault};
use updraft_core::math::signed_angle_deg;

use crate::surface::{
    dynamic_pressure, evaluate_responses, validate_responses, AppliedLoad, AxisResponse,
    StepContext, SurfaceState,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AirfoilConfig {
    pub area: f64,
    pub responses: Vec<AxisResponse>,
}

impl AirfoilConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_positive("airfoil area", self.area)?;
        if self.responses.is_empty() {
            return Err(ConfigError::Empty("airfoil responses"));
        }
        if self.responses.iter().any(|r| r.axis != ResponseAxis::Pitch) {
            return Err(ConfigError::UnsupportedResponse {
                kind: SurfaceKind::SingleSectionAirfoil,
                supported: "pitch",
            });
        }
        validate_responses(&self.responses)
    }
}

#[derive(Debug, Clone)]
pub struct SingleSectionAirfoil {
    area: f64,
    responses: Vec<AxisResponse>,
}

impl SingleSectionAirfoil {
    pub fn new(config: &AirfoilConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            area: config.area,
            responses: config.responses.clone(),
        })
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn responses(&self) -> &[AxisResponse] {
        &self.responses
    }

    /// A NaN angle of attack means the velocity is corrupt; that is fatal.
    pub(crate) fn compute(
        &mut self,
        ctx: &StepContext<'_>,
        state: &mut SurfaceState,
        loads: &mut Vec<AppliedLoad>,
    ) -> Result<(), NumericFault> {
        let position = ctx.pose.position;
        let wind = ctx.wind.sample_velocity(position);
        let relative = ctx.point_velocity(position) - wind;
        let air_speed = relative.length();
        let pressure = dynamic_pressure(ctx.wind.sample_air_density(position), air_speed) * self.area;

        // Pitch angle of attack, whether or not any response is enabled.
        let angle_of_attack = signed_angle_deg(
            ctx.pose.transform_vector(ResponseAxis::Pitch.local_reference()),
            relative,
            ctx.pose.transform_vector(ResponseAxis::Pitch.local_axis()),
        );
        if angle_of_attack.is_nan() {
            log::error!("airfoil angle of attack is NaN (relative velocity {relative})");
            return Err(NumericFault::AngleOfAttack {
                kind: SurfaceKind::SingleSectionAirfoil,
                value: angle_of_attack,
            });
        }
        let forces = evaluate_responses(
            &self.responses,
            &ctx.pose,
            relative,
            pressure,
            0.0,
            state.efficiency(),
        );

        state.wind = wind;
        state.relative_velocity = relative;
        state.air_speed = air_speed;
        state.angle_of_attack = angle_of_attack;
        state.lift = forces.lift;
        state.drag = forces.drag;
        state.moment = forces.moment;
        loads.push(AppliedLoad {
            force: forces.lift + forces.drag,
            torque: forces.moment,
            position,
        });
        Ok(())
    }
}

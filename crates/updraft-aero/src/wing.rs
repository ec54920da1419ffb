//! Strip-theory wing.
//!
//! The span runs along local X, centered on the surface origin. Chord tapers
//! linearly from `root_chord` at the center to `tip_chord` at both tips. The
//! span is cut into equal strips, each evaluated on its own and applied at
//! its own world position.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use updraft_core::constants::{GROUND_EFFECT_DEFAULT_HEIGHT, MAX_WING_SECTIONS};
use updraft_core::error::{ensure_finite, ensure_positive, ConfigError, ConfigResult};
use updraft_core::layers::LayerMask;
use updraft_core::math::{inverse_lerp, lerp};

use crate::surface::{
    dynamic_pressure, evaluate_responses, validate_responses, AppliedLoad, AxisResponse,
    StepContext, SurfaceState,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WingConfig {
    pub span: f64,
    pub root_chord: f64,
    pub tip_chord: f64,
    pub sections: usize,
    pub responses: Vec<AxisResponse>,
    /// Ground effect fades in below this height. Zero disables it.
    #[serde(default = "default_ground_effect_height")]
    pub ground_effect_height: f64,
    #[serde(default)]
    pub ground_mask: LayerMask,
}

fn default_ground_effect_height() -> f64 {
    GROUND_EFFECT_DEFAULT_HEIGHT
}

impl WingConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_positive("wing span", self.span)?;
        ensure_positive("wing root chord", self.root_chord)?;
        ensure_finite("wing tip chord", self.tip_chord)?;
        if self.tip_chord < 0.0 {
            return Err(ConfigError::NonPositive {
                name: "wing tip chord",
                value: self.tip_chord,
            });
        }
        if self.sections == 0 || self.sections > MAX_WING_SECTIONS {
            return Err(ConfigError::SectionCount {
                count: self.sections,
                max: MAX_WING_SECTIONS,
            });
        }
        if self.responses.is_empty() {
            return Err(ConfigError::Empty("wing responses"));
        }
        validate_responses(&self.responses)?;
        ensure_finite("ground effect height", self.ground_effect_height)
    }
}

/// Per-strip state, allocated once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionState {
    pub local_position: DVec3,
    pub surface_area: f64,
    pub last_world_position: Option<DVec3>,
    pub relative_velocity: DVec3,
    pub air_speed: f64,
    pub angle_of_attack: f64,
    pub lift: DVec3,
    pub drag: DVec3,
    pub moment: DVec3,
    /// Degrees added to the angle of attack before curve lookup.
    pub deflection_offset: f64,
}

#[derive(Debug, Clone)]
pub struct MultiSectionWing {
    responses: Vec<AxisResponse>,
    sections: Vec<SectionState>,
    ground_effect_height: f64,
    ground_mask: LayerMask,
    ground_effect: f64,
    /// Scratch buffers reused across steps.
    positions: Vec<DVec3>,
    winds: Vec<DVec3>,
}

impl MultiSectionWing {
    pub fn new(config: &WingConfig) -> ConfigResult<Self> {
        config.validate()?;

        let n = config.sections;
        let width = config.span / n as f64;
        let half = config.span * 0.5;
        let chord = |x: f64| lerp(config.root_chord, config.tip_chord, x.abs() / half);
        let trapezoid = |a: f64, b: f64| (b - a) * (chord(a) + chord(b)) * 0.5;

        let sections = (0..n)
            .map(|i| {
                let x0 = -half + i as f64 * width;
                let x1 = x0 + width;
                // A strip straddling the root is two trapezoids.
                let surface_area = if x0 < 0.0 && x1 > 0.0 {
                    trapezoid(x0, 0.0) + trapezoid(0.0, x1)
                } else {
                    trapezoid(x0, x1)
                };
                SectionState {
                    local_position: DVec3::new((x0 + x1) * 0.5, 0.0, 0.0),
                    surface_area,
                    last_world_position: None,
                    relative_velocity: DVec3::ZERO,
                    air_speed: 0.0,
                    angle_of_attack: 0.0,
                    lift: DVec3::ZERO,
                    drag: DVec3::ZERO,
                    moment: DVec3::ZERO,
                    deflection_offset: 0.0,
                }
            })
            .collect();

        Ok(Self {
            responses: config.responses.clone(),
            sections,
            ground_effect_height: config.ground_effect_height,
            ground_mask: config.ground_mask,
            ground_effect: 1.0,
            positions: Vec::with_capacity(n),
            winds: Vec::with_capacity(n),
        })
    }

    pub fn sections(&self) -> &[SectionState] {
        &self.sections
    }

    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    pub fn responses(&self) -> &[AxisResponse] {
        &self.responses
    }

    pub fn responses_mut(&mut self) -> &mut [AxisResponse] {
        &mut self.responses
    }

    pub fn area(&self) -> f64 {
        self.sections.iter().map(|s| s.surface_area).sum()
    }

    /// Area-weighted center of the strips, surface-local.
    pub fn centroid(&self) -> DVec3 {
        let area = self.area();
        if area <= 0.0 {
            return DVec3::ZERO;
        }
        self.sections
            .iter()
            .map(|s| s.local_position * s.surface_area)
            .sum::<DVec3>()
            / area
    }

    /// Ground-effect multiplier from the last step.
    pub fn ground_effect(&self) -> f64 {
        self.ground_effect
    }

    pub(crate) fn reset_deflections(&mut self) {
        for section in &mut self.sections {
            section.deflection_offset = 0.0;
        }
    }

    pub(crate) fn add_deflection(&mut self, first: usize, last: usize, degrees: f64) {
        for section in self.sections.iter_mut().take(last + 1).skip(first) {
            section.deflection_offset += degrees;
        }
    }

    pub(crate) fn clear(&mut self) {
        for section in &mut self.sections {
            section.last_world_position = None;
            section.relative_velocity = DVec3::ZERO;
            section.air_speed = 0.0;
            section.angle_of_attack = 0.0;
            section.lift = DVec3::ZERO;
            section.drag = DVec3::ZERO;
            section.moment = DVec3::ZERO;
        }
        self.ground_effect = 1.0;
    }

    fn ground_effect_multiplier(&self, ctx: &StepContext<'_>) -> f64 {
        if self.ground_effect_height <= 0.0 {
            return 1.0;
        }
        let origin = ctx.host.body_pose(ctx.body).map_or(ctx.pose.position, |p| p.position);
        match ctx
            .host
            .raycast_downward(origin, self.ground_effect_height, self.ground_mask)
        {
            Some(distance) if distance <= self.ground_effect_height => {
                let t = inverse_lerp(self.ground_effect_height, 0.0, distance).max(0.0);
                1.0 + t * t
            }
            _ => 1.0,
        }
    }

    pub(crate) fn compute(
        &mut self,
        ctx: &StepContext<'_>,
        state: &mut SurfaceState,
        loads: &mut Vec<AppliedLoad>,
    ) {
        self.ground_effect = self.ground_effect_multiplier(ctx);

        self.positions.clear();
        self.positions.extend(
            self.sections
                .iter()
                .map(|s| ctx.pose.transform_point(s.local_position)),
        );
        ctx.wind.sample_velocities(&self.positions, &mut self.winds, None);

        let efficiency = state.efficiency();
        let mut relative_sum = DVec3::ZERO;
        let mut wind_sum = DVec3::ZERO;
        let mut weighted_aoa = 0.0;
        let mut area_sum = 0.0;

        for ((section, &position), &wind) in self
            .sections
            .iter_mut()
            .zip(&self.positions)
            .zip(&self.winds)
        {
            let body_velocity = match section.last_world_position {
                Some(last) => (position - last) / ctx.dt,
                None => ctx.point_velocity(position),
            };
            section.last_world_position = Some(position);

            let relative = body_velocity - wind;
            let air_speed = relative.length();
            let density = ctx.wind.sample_air_density(position);
            let pressure =
                dynamic_pressure(density, air_speed) * self.ground_effect * section.surface_area;

            let forces = evaluate_responses(
                &self.responses,
                &ctx.pose,
                relative,
                pressure,
                section.deflection_offset,
                efficiency,
            );

            section.relative_velocity = relative;
            section.air_speed = air_speed;
            section.angle_of_attack = forces.angle_of_attack;
            section.lift = forces.lift;
            section.drag = forces.drag;
            section.moment = forces.moment;

            state.lift += forces.lift;
            state.drag += forces.drag;
            state.moment += forces.moment;
            loads.push(AppliedLoad {
                force: forces.lift + forces.drag,
                torque: forces.moment,
                position,
            });

            relative_sum += relative * section.surface_area;
            wind_sum += wind * section.surface_area;
            weighted_aoa += forces.angle_of_attack * section.surface_area;
            area_sum += section.surface_area;
        }

        if area_sum > 0.0 {
            state.relative_velocity = relative_sum / area_sum;
            state.wind = wind_sum / area_sum;
            state.angle_of_attack = weighted_aoa / area_sum;
        }
        state.air_speed = state.relative_velocity.length();
    }
}

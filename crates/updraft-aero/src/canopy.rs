//! Ram-air canopy blended across deflection profiles.
//!
//! Profile 0 is the neutral shape. Every other profile (brakes, left or
//! right steering) carries a weight in [0, 1]; if those weights sum past 1
//! they are scaled down together, and profile 0 takes whatever is left.
//! Each profile's share of the force is applied at its own point, so
//! asymmetric input yaws the canopy.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use updraft_core::curve::CoefficientCurve;
use updraft_core::enums::ResponseAxis;
use updraft_core::error::{ensure_positive, ensure_range, ConfigError, ConfigResult};
use updraft_core::math::{clamp01, signed_angle_deg};

use crate::surface::{dynamic_pressure, AppliedLoad, StepContext, SurfaceState};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanopyProfile {
    pub name: String,
    pub lift: CoefficientCurve,
    pub drag: CoefficientCurve,
    pub moment: CoefficientCurve,
    /// Surface-local point this profile's share acts at.
    #[serde(default)]
    pub application_point: DVec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanopyConfig {
    pub area: f64,
    pub aspect_ratio: f64,
    pub profiles: Vec<CanopyProfile>,
    #[serde(default = "fully_open")]
    pub slider_factor: f64,
    #[serde(default = "fully_open")]
    pub optical_pressure_factor: f64,
}

fn fully_open() -> f64 {
    1.0
}

impl CanopyConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_positive("canopy area", self.area)?;
        ensure_range("canopy aspect ratio", self.aspect_ratio, 1.0, 100.0)?;
        if self.profiles.is_empty() {
            return Err(ConfigError::Empty("canopy profiles"));
        }
        for profile in &self.profiles {
            profile.lift.validate()?;
            profile.drag.validate()?;
            profile.moment.validate()?;
            if !profile.application_point.is_finite() {
                return Err(ConfigError::NonFinite {
                    name: "canopy application point",
                    value: f64::NAN,
                });
            }
        }
        ensure_range("canopy slider factor", self.slider_factor, 0.0, 1.0)?;
        ensure_range(
            "canopy optical pressure factor",
            self.optical_pressure_factor,
            0.0,
            1.0,
        )
    }
}

#[derive(Debug, Clone)]
pub struct ParachuteCanopy {
    area: f64,
    aspect_ratio: f64,
    profiles: Vec<CanopyProfile>,
    /// Requested weights; index 0 is unused.
    weights: Vec<f64>,
    slider_factor: f64,
    optical_pressure_factor: f64,
}

impl ParachuteCanopy {
    pub fn new(config: &CanopyConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            area: config.area,
            aspect_ratio: config.aspect_ratio,
            profiles: config.profiles.clone(),
            weights: vec![0.0; config.profiles.len()],
            slider_factor: config.slider_factor,
            optical_pressure_factor: config.optical_pressure_factor,
        })
    }

    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn profiles(&self) -> &[CanopyProfile] {
        &self.profiles
    }

    pub fn profile_index(&self, name: &str) -> Option<usize> {
        self.profiles.iter().position(|p| p.name == name)
    }

    /// Set the requested weight of a non-neutral profile, clamped to [0, 1].
    pub fn set_profile_weight(&mut self, index: usize, weight: f64) -> ConfigResult<()> {
        if index == 0 || index >= self.profiles.len() {
            return Err(ConfigError::OutOfRange {
                name: "canopy profile index",
                value: index as f64,
                min: 1.0,
                max: self.profiles.len().saturating_sub(1) as f64,
            });
        }
        self.weights[index] = control_input(weight);
        Ok(())
    }

    pub fn slider_factor(&self) -> f64 {
        self.slider_factor
    }

    pub fn set_slider_factor(&mut self, factor: f64) {
        self.slider_factor = control_input(factor);
    }

    pub fn optical_pressure_factor(&self) -> f64 {
        self.optical_pressure_factor
    }

    pub fn set_optical_pressure_factor(&mut self, factor: f64) {
        self.optical_pressure_factor = control_input(factor);
    }

    /// Weights actually used, summing to exactly 1.
    pub fn effective_weights(&self) -> Vec<f64> {
        let others: f64 = self.weights.iter().skip(1).sum();
        let scale = if others > 1.0 { 1.0 / others } else { 1.0 };
        let mut weights: Vec<f64> = self.weights.iter().map(|w| w * scale).collect();
        weights[0] = 1.0 - others.min(1.0);
        weights
    }

    /// `1 - AR^-0.5`.
    pub fn aspect_ratio_factor(&self) -> f64 {
        1.0 - self.aspect_ratio.powf(-0.5)
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

        let axis = ctx.pose.transform_vector(ResponseAxis::Pitch.local_axis());
        let reference = ctx.pose.transform_vector(ResponseAxis::Pitch.local_reference());
        let aoa = signed_angle_deg(reference, relative, axis);
        let direction = relative.normalize_or_zero();
        let lift_direction = direction.cross(axis).normalize_or_zero();

        let efficiency = state.efficiency();
        let slider = self.slider_factor;
        let optical = self.optical_pressure_factor;
        let lift_scale = slider.powi(3)
            * optical.powi(2)
            * self.aspect_ratio_factor()
            * efficiency
            * efficiency;
        let drag_scale = slider * optical * efficiency;

        for (profile, weight) in self.profiles.iter().zip(self.effective_weights()) {
            if weight <= 0.0 {
                continue;
            }
            let share = pressure * weight;
            let lift = lift_direction * (profile.lift.evaluate(aoa) * share * lift_scale);
            let drag = -direction * (profile.drag.evaluate(aoa) * share * drag_scale);
            let moment = axis * (profile.moment.evaluate(aoa) * share * efficiency);

            state.lift += lift;
            state.drag += drag;
            state.moment += moment;
            loads.push(AppliedLoad {
                force: lift + drag,
                torque: moment,
                position: ctx.pose.transform_point(profile.application_point),
            });
        }

        state.wind = wind;
        state.relative_velocity = relative;
        state.air_speed = air_speed;
        state.angle_of_attack = aoa;
    }
}

/// Clamp a control input to [0, 1]; NaN reads as 0.
fn control_input(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        clamp01(value)
    }
}

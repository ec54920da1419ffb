//! Scenario definitions: a JSON description of bodies, surfaces, effectors
//! and controls, built into an engine plus a [`KinematicHost`].

use glam::DVec3;
use hecs::Entity;
use serde::{Deserialize, Serialize};

use updraft_core::config::{EngineConfig, WindConfig};
use updraft_core::error::{ConfigError, SimError};
use updraft_core::types::Pose;
use updraft_wind::{EffectorConfig, WindField};

use crate::airfoil::AirfoilConfig;
use crate::bluff::BluffBodyConfig;
use crate::canopy::CanopyConfig;
use crate::components::EffectorMount;
use crate::control::ControlConfig;
use crate::cylinder::CylinderConfig;
use crate::engine::AeroEngine;
use crate::host::{BodyHandle, KinematicHost, RigidBody};
use crate::wing::WingConfig;

/// Standard gravity (m/s²), pointing down.
const GRAVITY: DVec3 = DVec3::new(0.0, -9.81, 0.0);

fn default_gravity() -> DVec3 {
    GRAVITY
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodySpec {
    pub name: String,
    #[serde(default)]
    pub pose: Pose,
    #[serde(default)]
    pub velocity: DVec3,
    pub mass: f64,
    pub inertia: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SurfaceShape {
    Wing(WingConfig),
    Airfoil(AirfoilConfig),
    BluffBody(BluffBodyConfig),
    Cylinder(CylinderConfig),
    Canopy(CanopyConfig),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceSpec {
    pub name: String,
    /// Index into `bodies`.
    pub body: usize,
    #[serde(default)]
    pub mount: Pose,
    pub shape: SurfaceShape,
    #[serde(default = "full_efficiency")]
    pub efficiency: f64,
    /// Optional split of the loads across bodies: `(body index, weight)`.
    #[serde(default)]
    pub applicator: Vec<(usize, f64)>,
}

fn full_efficiency() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountSpec {
    pub body: usize,
    #[serde(default)]
    pub local_position: DVec3,
    pub local_forward: DVec3,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectorSpec {
    #[serde(flatten)]
    pub effector: EffectorConfig,
    #[serde(default)]
    pub mount: Option<MountSpec>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlSpec {
    /// Index into `surfaces`; must name a wing.
    pub surface: usize,
    #[serde(flatten)]
    pub config: ControlConfig,
    #[serde(default)]
    pub input: f64,
}

/// A complete offline scene.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub wind: WindConfig,
    #[serde(default = "default_gravity")]
    pub gravity: DVec3,
    #[serde(default)]
    pub ground_height: Option<f64>,
    pub bodies: Vec<BodySpec>,
    #[serde(default)]
    pub surfaces: Vec<SurfaceSpec>,
    #[serde(default)]
    pub effectors: Vec<EffectorSpec>,
    #[serde(default)]
    pub controls: Vec<ControlSpec>,
    /// Points whose wind is reported alongside the snapshot.
    #[serde(default)]
    pub probes: Vec<DVec3>,
}

/// A built scenario, ready to step.
pub struct ScenarioWorld {
    pub engine: AeroEngine,
    pub host: KinematicHost,
    /// `(name, entity)` for every surface, in scenario order.
    pub surfaces: Vec<(String, Entity)>,
    /// `(name, handle)` for every body, in scenario order.
    pub bodies: Vec<(String, BodyHandle)>,
}

impl ScenarioWorld {
    /// One engine tick followed by one host integration step.
    pub fn step(&mut self) -> Result<updraft_core::state::AeroSnapshot, SimError> {
        let snapshot = self.engine.tick(&mut self.host)?;
        self.host.step(self.engine.config().fixed_dt);
        Ok(snapshot)
    }
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(ConfigError::parse)
    }

    pub fn build(&self) -> Result<ScenarioWorld, SimError> {
        let wind = WindField::new(&self.wind)?;
        let mut engine = AeroEngine::with_wind(self.engine, wind)?;
        let mut host = KinematicHost::new(self.gravity, self.ground_height);

        let bodies: Vec<(String, BodyHandle)> = self
            .bodies
            .iter()
            .map(|spec| {
                let body = RigidBody::new(spec.pose, spec.mass, spec.inertia)
                    .with_velocity(spec.velocity);
                (spec.name.clone(), host.add_body(body))
            })
            .collect();
        let body_at = |index: usize| {
            bodies
                .get(index)
                .map(|(_, handle)| *handle)
                .ok_or(SimError::NoSuchEntity)
        };

        let mut surfaces = Vec::with_capacity(self.surfaces.len());
        for spec in &self.surfaces {
            let body = body_at(spec.body)?;
            let entity = match &spec.shape {
                SurfaceShape::Wing(c) => engine.spawn_wing(body, spec.mount, c)?,
                SurfaceShape::Airfoil(c) => engine.spawn_airfoil(body, spec.mount, c)?,
                SurfaceShape::BluffBody(c) => engine.spawn_bluff_body(body, spec.mount, c)?,
                SurfaceShape::Cylinder(c) => engine.spawn_cylinder(body, spec.mount, c)?,
                SurfaceShape::Canopy(c) => engine.spawn_canopy(body, spec.mount, c)?,
            };
            engine.set_efficiency(entity, spec.efficiency)?;
            if !spec.applicator.is_empty() {
                let targets = spec
                    .applicator
                    .iter()
                    .map(|&(index, weight)| body_at(index).map(|body| (body, weight)))
                    .collect::<Result<Vec<_>, SimError>>()?;
                engine.spawn_applicator(entity, &targets)?;
            }
            surfaces.push((spec.name.clone(), entity));
        }

        for spec in &self.effectors {
            let mount = spec
                .mount
                .as_ref()
                .map(|m| {
                    body_at(m.body).map(|body| EffectorMount {
                        body,
                        local_position: m.local_position,
                        local_forward: m.local_forward,
                    })
                })
                .transpose()?;
            engine.spawn_effector(&spec.effector, mount)?;
        }

        for spec in &self.controls {
            let (_, wing) = surfaces.get(spec.surface).ok_or(SimError::NoSuchEntity)?;
            let control = engine.spawn_control(*wing, &spec.config)?;
            engine.set_control_input(control, spec.input)?;
        }

        log::debug!(
            "scenario built: {} bodies, {} surfaces, {} effectors",
            bodies.len(),
            surfaces.len(),
            self.effectors.len()
        );

        Ok(ScenarioWorld {
            engine,
            host,
            surfaces,
            bodies,
        })
    }
}

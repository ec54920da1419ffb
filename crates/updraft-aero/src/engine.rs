//! Aerodynamics engine: the fixed-step driver.
//!
//! `AeroEngine` owns the hecs ECS world, the optional wind field and the
//! hook registry. The host calls [`AeroEngine::tick`] once per physics step;
//! the engine reads body state from the host, computes surface loads and
//! pushes them back. Completely headless and deterministic.

use glam::DVec3;
use hecs::{Entity, World};

use updraft_core::config::EngineConfig;
use updraft_core::enums::{FramePhase, SurfaceKind};
use updraft_core::error::{ConfigError, NumericFault, SimError};
use updraft_core::state::AeroSnapshot;
use updraft_core::types::{Pose, SimTime};
use updraft_wind::{EffectorConfig, WindField};

use crate::airfoil::{AirfoilConfig, SingleSectionAirfoil};
use crate::applicator::ForceApplicator;
use crate::bluff::{BluffBody, BluffBodyConfig};
use crate::canopy::{CanopyConfig, ParachuteCanopy};
use crate::components::{EffectorMount, WindSource};
use crate::control::{ControlConfig, ControlSurface};
use crate::cylinder::{CylinderConfig, CylindricalBody};
use crate::hooks::{HookFn, HookId, HookRegistry};
use crate::host::{BodyHandle, PhysicsHost};
use crate::surface::{AerodynamicSurface, SurfaceModel};
use crate::systems;
use crate::wing::{MultiSectionWing, WingConfig};

/// The aerodynamics engine. Owns the ECS world and all per-surface state.
pub struct AeroEngine {
    world: World,
    wind: Option<WindField>,
    config: EngineConfig,
    time: SimTime,
    hooks: HookRegistry,
    /// Set by the first numeric fault; every later step is refused.
    fault: Option<NumericFault>,
    reported_missing_wind: bool,
}

impl AeroEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            world: World::new(),
            wind: None,
            config,
            time: SimTime::default(),
            hooks: HookRegistry::default(),
            fault: None,
            reported_missing_wind: false,
        })
    }

    pub fn with_wind(config: EngineConfig, wind: WindField) -> Result<Self, ConfigError> {
        let mut engine = Self::new(config)?;
        engine.wind = Some(wind);
        Ok(engine)
    }

    // ---- Accessors ----

    pub fn config(&self) -> EngineConfig {
        self.config
    }

    pub fn time(&self) -> SimTime {
        self.time
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn wind(&self) -> Option<&WindField> {
        self.wind.as_ref()
    }

    pub fn wind_mut(&mut self) -> Option<&mut WindField> {
        self.wind.as_mut()
    }

    /// Attach a wind field, returning the previous one.
    ///
    /// Every effector entity moves to the new field under a fresh id and
    /// keeps its enabled state. The returned field no longer holds them.
    /// On error the engine is unchanged.
    pub fn attach_wind(&mut self, mut wind: WindField) -> Result<Option<WindField>, SimError> {
        let mut registered = Vec::new();
        for (entity, source) in self.world.query::<&WindSource>().iter() {
            let current = source
                .id
                .and_then(|id| self.wind.as_ref()?.effector(id).copied())
                .unwrap_or(source.effector);
            let id = wind.register_effector(current)?;
            if !source.enabled {
                wind.set_effector_enabled(id, false)?;
            }
            registered.push((entity, id));
        }

        let previous = self.detach_wind();
        for (entity, id) in registered {
            if let Ok(mut source) = self.world.get::<&mut WindSource>(entity) {
                source.id = Some(id);
            }
        }
        self.wind = Some(wind);
        self.reported_missing_wind = false;
        Ok(previous)
    }

    /// Take the wind field out. Effector entities deregister from it and
    /// remember their last state.
    pub fn detach_wind(&mut self) -> Option<WindField> {
        let mut wind = self.wind.take()?;
        for (_entity, source) in self.world.query_mut::<&mut WindSource>() {
            if let Some(effector) = source.id.take().and_then(|id| wind.deregister_effector(id)) {
                source.effector = effector;
            }
        }
        Some(wind)
    }

    pub fn is_halted(&self) -> bool {
        self.fault.is_some()
    }

    pub fn fault(&self) -> Option<&NumericFault> {
        self.fault.as_ref()
    }

    // ---- Spawning ----

    pub fn spawn_surface(&mut self, body: BodyHandle, mount: Pose, model: SurfaceModel) -> Entity {
        self.world
            .spawn((AerodynamicSurface::new(body, mount, model),))
    }

    pub fn spawn_wing(
        &mut self,
        body: BodyHandle,
        mount: Pose,
        config: &WingConfig,
    ) -> Result<Entity, SimError> {
        let model = SurfaceModel::MultiSectionWing(MultiSectionWing::new(config)?);
        Ok(self.spawn_surface(body, mount, model))
    }

    pub fn spawn_airfoil(
        &mut self,
        body: BodyHandle,
        mount: Pose,
        config: &AirfoilConfig,
    ) -> Result<Entity, SimError> {
        let model = SurfaceModel::SingleSectionAirfoil(SingleSectionAirfoil::new(config)?);
        Ok(self.spawn_surface(body, mount, model))
    }

    pub fn spawn_bluff_body(
        &mut self,
        body: BodyHandle,
        mount: Pose,
        config: &BluffBodyConfig,
    ) -> Result<Entity, SimError> {
        let model = SurfaceModel::BluffBody(BluffBody::new(config)?);
        Ok(self.spawn_surface(body, mount, model))
    }

    pub fn spawn_cylinder(
        &mut self,
        body: BodyHandle,
        mount: Pose,
        config: &CylinderConfig,
    ) -> Result<Entity, SimError> {
        let model = SurfaceModel::CylindricalBody(CylindricalBody::new(config)?);
        Ok(self.spawn_surface(body, mount, model))
    }

    pub fn spawn_canopy(
        &mut self,
        body: BodyHandle,
        mount: Pose,
        config: &CanopyConfig,
    ) -> Result<Entity, SimError> {
        let model = SurfaceModel::ParachuteCanopy(ParachuteCanopy::new(config)?);
        Ok(self.spawn_surface(body, mount, model))
    }

    /// Attach a control surface to a wing entity.
    pub fn spawn_control(&mut self, wing: Entity, config: &ControlConfig) -> Result<Entity, SimError> {
        let section_count = {
            let surface = self
                .world
                .get::<&AerodynamicSurface>(wing)
                .map_err(|_| SimError::NoSuchEntity)?;
            match surface.model() {
                SurfaceModel::MultiSectionWing(w) => w.section_count(),
                other => {
                    return Err(ConfigError::WrongTarget {
                        expected: SurfaceKind::MultiSectionWing,
                        actual: other.kind(),
                    }
                    .into())
                }
            }
        };
        let control = ControlSurface::new(wing, config, section_count)?;
        Ok(self.world.spawn((control,)))
    }

    pub fn set_control_input(&mut self, control: Entity, input: f64) -> Result<(), SimError> {
        let mut control = self
            .world
            .get::<&mut ControlSurface>(control)
            .map_err(|_| SimError::NoSuchEntity)?;
        control.set_input(input);
        Ok(())
    }

    /// Route `surface`'s loads through `targets` instead of its own body.
    /// A surface takes at most one applicator.
    pub fn spawn_applicator(
        &mut self,
        surface: Entity,
        targets: &[(BodyHandle, f64)],
    ) -> Result<Entity, SimError> {
        let applicator = ForceApplicator::new(surface, targets)?;
        {
            let mut target = self
                .world
                .get::<&mut AerodynamicSurface>(surface)
                .map_err(|_| SimError::NoSuchEntity)?;
            if !target.applies_forces {
                return Err(ConfigError::AlreadyRouted.into());
            }
            target.applies_forces = false;
        }
        Ok(self.world.spawn((applicator,)))
    }

    /// Create an effector entity and register it with the wind field.
    pub fn spawn_effector(
        &mut self,
        config: &EffectorConfig,
        mount: Option<EffectorMount>,
    ) -> Result<Entity, SimError> {
        if let Some(mount) = &mount {
            mount.validate()?;
        }
        let effector = config.build()?;
        let wind = self.wind.as_mut().ok_or(SimError::NoWindField)?;
        let source = WindSource {
            id: Some(wind.register_effector(effector)?),
            effector,
            enabled: true,
        };
        Ok(match mount {
            Some(mount) => self.world.spawn((source, mount)),
            None => self.world.spawn((source,)),
        })
    }

    /// Enabling indexes the effector; disabling removes it from the index.
    pub fn set_effector_enabled(&mut self, entity: Entity, enabled: bool) -> Result<(), SimError> {
        let mut source = self
            .world
            .get::<&mut WindSource>(entity)
            .map_err(|_| SimError::NoSuchEntity)?;
        let wind = self.wind.as_mut().ok_or(SimError::NoWindField)?;
        if let Some(id) = source.id {
            wind.set_effector_enabled(id, enabled)?;
        }
        source.enabled = enabled;
        Ok(())
    }

    /// Remove an entity and undo whatever it registered.
    pub fn despawn(&mut self, entity: Entity) -> Result<(), SimError> {
        let effector = self.world.get::<&WindSource>(entity).ok().and_then(|s| s.id);
        if let (Some(id), Some(wind)) = (effector, self.wind.as_mut()) {
            wind.deregister_effector(id);
        }
        let released = self
            .world
            .get::<&ForceApplicator>(entity)
            .map(|a| a.surface)
            .ok();

        self.world
            .despawn(entity)
            .map_err(|_| SimError::NoSuchEntity)?;

        if let Some(surface) = released {
            if let Ok(mut s) = self.world.get::<&mut AerodynamicSurface>(surface) {
                s.applies_forces = true;
            }
        }
        Ok(())
    }

    // ---- Surface access ----

    pub fn surface(&self, entity: Entity) -> Option<hecs::Ref<'_, AerodynamicSurface>> {
        self.world.get::<&AerodynamicSurface>(entity).ok()
    }

    pub fn with_surface_mut<R>(
        &mut self,
        entity: Entity,
        f: impl FnOnce(&mut AerodynamicSurface) -> R,
    ) -> Result<R, SimError> {
        let mut surface = self
            .world
            .get::<&mut AerodynamicSurface>(entity)
            .map_err(|_| SimError::NoSuchEntity)?;
        Ok(f(&mut surface))
    }

    pub fn set_efficiency(&mut self, entity: Entity, efficiency: f64) -> Result<(), SimError> {
        self.with_surface_mut(entity, |s| s.set_efficiency(efficiency))
    }

    /// Set a canopy's deflection-profile weight.
    pub fn set_canopy_weight(
        &mut self,
        entity: Entity,
        profile: usize,
        weight: f64,
    ) -> Result<(), SimError> {
        self.with_surface_mut(entity, |s| {
            let kind = s.kind();
            match s.model_mut() {
                SurfaceModel::ParachuteCanopy(canopy) => canopy.set_profile_weight(profile, weight),
                _ => Err(ConfigError::WrongTarget {
                    expected: SurfaceKind::ParachuteCanopy,
                    actual: kind,
                }),
            }
        })??;
        Ok(())
    }

    /// The host moved the surface's body discontinuously.
    pub fn teleported(&mut self, entity: Entity) -> Result<(), SimError> {
        self.with_surface_mut(entity, AerodynamicSurface::clear)
    }

    // ---- Hooks ----

    pub fn add_hook(&mut self, phase: FramePhase, hook: HookFn) -> HookId {
        self.hooks.register(phase, hook)
    }

    pub fn remove_hook(&mut self, id: HookId) -> bool {
        self.hooks.unregister(id)
    }

    // ---- Stepping ----

    /// Advance one fixed step and return the resulting snapshot.
    pub fn tick(&mut self, host: &mut dyn PhysicsHost) -> Result<AeroSnapshot, SimError> {
        self.step(host, self.config.fixed_dt)
    }

    /// Advance by `dt` seconds.
    pub fn step(&mut self, host: &mut dyn PhysicsHost, dt: f64) -> Result<AeroSnapshot, SimError> {
        if let Some(fault) = &self.fault {
            return Err(SimError::Halted(fault.clone()));
        }
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidTimestep(dt));
        }

        // 1. Wind clock + mounted effectors
        match self.wind.as_mut() {
            Some(wind) => {
                wind.set_time(self.time.elapsed_secs);
                systems::effectors::run(&self.world, wind, &*host)?;
            }
            None if !self.reported_missing_wind => {
                log::debug!("no wind field attached; surfaces skip force evaluation");
                self.reported_missing_wind = true;
            }
            None => {}
        }
        // 2. Control deflections
        systems::controls::run(&mut self.world);
        // 3. Surface forces
        if let Err(fault) = systems::aerodynamics::run(
            &mut self.world,
            self.wind.as_ref(),
            host,
            &mut self.hooks,
            dt,
        ) {
            self.fault = Some(fault.clone());
            return Err(SimError::Numeric(fault));
        }
        // 4. Split loads across bodies
        systems::applicators::run(&self.world, host);

        self.time.advance(dt);
        Ok(self.snapshot())
    }

    /// Per-render-frame pass: hooks fire and world centers refresh.
    pub fn visual_frame(&mut self, host: &dyn PhysicsHost) {
        systems::aerodynamics::visual_frame(&mut self.world, host, &mut self.hooks);
    }

    pub fn snapshot(&self) -> AeroSnapshot {
        systems::snapshot::build_snapshot(&self.world, &self.time, self.wind.as_ref())
    }

    /// Wind at `position` from the attached field, zero when detached.
    pub fn sample_wind(&self, position: DVec3) -> DVec3 {
        self.wind
            .as_ref()
            .map_or(DVec3::ZERO, |w| w.sample_velocity(position))
    }
}

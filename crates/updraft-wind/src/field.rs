//! The composed wind field.
//!
//! `velocity = base + Σ effectors + border correction + turbulence`
//!
//! Effectors are stored by id; only enabled effectors are present in the
//! spatial index. Sampling never mutates the field, so any number of
//! surfaces can read it between two registrations.

use std::collections::BTreeMap;
use std::fmt;

use glam::DVec3;

use updraft_core::config::{AirDensityModel, BorderConfig, TurbulenceConfig, WindConfig};
use updraft_core::error::{ConfigError, ConfigResult};
use updraft_core::types::Aabb;

use crate::border::BorderField;
use crate::effector::WindEffector;
use crate::index::SpatialIndex;
use crate::octree::LooseOctree;
use crate::turbulence::NoiseField;

/// Handle returned by [`WindField::register_effector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EffectorId(pub u32);

impl fmt::Display for EffectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "effector#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct EffectorSlot {
    effector: WindEffector,
    enabled: bool,
}

pub type EffectorIndex = Box<dyn SpatialIndex<EffectorId> + Send + Sync>;

pub struct WindField {
    base_wind: DVec3,
    air_density: AirDensityModel,
    border: Option<BorderField>,
    turbulence: NoiseField,
    effectors: BTreeMap<EffectorId, EffectorSlot>,
    index: EffectorIndex,
    next_id: u32,
    time: f64,
}

impl fmt::Debug for WindField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WindField")
            .field("base_wind", &self.base_wind)
            .field("air_density", &self.air_density)
            .field("border", &self.border)
            .field("turbulence_octaves", &self.turbulence.octave_count())
            .field("effectors", &self.effectors.len())
            .field("indexed", &self.index.len())
            .field("time", &self.time)
            .finish()
    }
}

impl WindField {
    /// Build a field backed by a loose octree.
    pub fn new(config: &WindConfig) -> ConfigResult<Self> {
        let index: EffectorIndex = Box::new(LooseOctree::<EffectorId>::new(&config.octree)?);
        Self::with_index(config, index)
    }

    /// Build a field backed by any index. The index must be empty.
    pub fn with_index(config: &WindConfig, mut index: EffectorIndex) -> ConfigResult<Self> {
        config.validate()?;
        index.clear();
        Ok(Self {
            base_wind: config.base_wind,
            air_density: config.air_density,
            border: config.border.as_ref().map(BorderField::new).transpose()?,
            turbulence: NoiseField::new(&config.turbulence)?,
            effectors: BTreeMap::new(),
            index,
            next_id: 0,
            time: 0.0,
        })
    }

    // ---- Global settings ----

    /// Simulation time driving turbulence (seconds).
    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    pub fn advance(&mut self, dt: f64) {
        self.time += dt;
    }

    pub fn base_wind(&self) -> DVec3 {
        self.base_wind
    }

    pub fn set_base_wind(&mut self, wind: DVec3) -> ConfigResult<()> {
        if !wind.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "base wind",
                value: f64::NAN,
            });
        }
        self.base_wind = wind;
        Ok(())
    }

    pub fn air_density_model(&self) -> AirDensityModel {
        self.air_density
    }

    pub fn set_air_density(&mut self, model: AirDensityModel) -> ConfigResult<()> {
        model.validate()?;
        self.air_density = model;
        Ok(())
    }

    pub fn border(&self) -> Option<&BorderField> {
        self.border.as_ref()
    }

    /// Replace the border band. Derived bounds are recomputed here.
    pub fn set_border(&mut self, config: Option<&BorderConfig>) -> ConfigResult<()> {
        self.border = config.map(BorderField::new).transpose()?;
        Ok(())
    }

    pub fn turbulence(&self) -> &NoiseField {
        &self.turbulence
    }

    pub fn set_turbulence(&mut self, config: &TurbulenceConfig) -> ConfigResult<()> {
        self.turbulence = NoiseField::new(config)?;
        Ok(())
    }

    // ---- Effector registry ----

    /// Add an enabled effector and index it.
    pub fn register_effector(&mut self, effector: WindEffector) -> ConfigResult<EffectorId> {
        let id = EffectorId(self.next_id);
        self.index.insert(id, effector.bounds())?;
        self.next_id += 1;
        self.effectors.insert(
            id,
            EffectorSlot {
                effector,
                enabled: true,
            },
        );
        log::debug!("registered {id} at {}", effector.position());
        Ok(id)
    }

    /// Remove an effector for good. Returns it if it existed.
    pub fn deregister_effector(&mut self, id: EffectorId) -> Option<WindEffector> {
        let slot = self.effectors.remove(&id)?;
        self.index.remove(id);
        log::debug!("deregistered {id}");
        Some(slot.effector)
    }

    /// Enable or disable an effector. Disabled effectors leave the index.
    pub fn set_effector_enabled(&mut self, id: EffectorId, enabled: bool) -> ConfigResult<()> {
        let slot = self
            .effectors
            .get_mut(&id)
            .ok_or(ConfigError::UnknownEffector(id.0))?;
        if slot.enabled == enabled {
            return Ok(());
        }
        if enabled {
            self.index.insert(id, slot.effector.bounds())?;
        } else {
            self.index.remove(id);
        }
        slot.enabled = enabled;
        log::debug!("{id} {}", if enabled { "enabled" } else { "disabled" });
        Ok(())
    }

    /// Move an effector and refresh its index entry.
    pub fn update_effector(
        &mut self,
        id: EffectorId,
        position: DVec3,
        forward: DVec3,
    ) -> ConfigResult<()> {
        let slot = self
            .effectors
            .get_mut(&id)
            .ok_or(ConfigError::UnknownEffector(id.0))?;
        let mut moved = slot.effector;
        moved.set_transform(position, forward)?;
        if slot.enabled {
            self.index.insert(id, moved.bounds())?;
        }
        slot.effector = moved;
        Ok(())
    }

    pub fn effector(&self, id: EffectorId) -> Option<&WindEffector> {
        self.effectors.get(&id).map(|slot| &slot.effector)
    }

    pub fn is_effector_enabled(&self, id: EffectorId) -> bool {
        self.effectors.get(&id).is_some_and(|slot| slot.enabled)
    }

    /// Registered effectors, enabled or not.
    pub fn effector_count(&self) -> usize {
        self.effectors.len()
    }

    /// Effectors currently in the spatial index.
    pub fn active_effector_count(&self) -> usize {
        self.index.len()
    }

    // ---- Sampling ----

    /// Wind velocity at `position`.
    pub fn sample_velocity(&self, position: DVec3) -> DVec3 {
        let mut candidates = Vec::new();
        self.collect_candidates(&Aabb::from_point(position), &mut candidates);
        self.compose(position, &candidates)
    }

    /// Sample many points with one index query.
    ///
    /// `bounds_hint` should enclose every point; points it misses fall back to
    /// their own query. Without a hint the enclosing box of `positions` is
    /// used. `out` is cleared and refilled in order.
    pub fn sample_velocities(
        &self,
        positions: &[DVec3],
        out: &mut Vec<DVec3>,
        bounds_hint: Option<Aabb>,
    ) {
        out.clear();
        let Some(bounds) = bounds_hint.or_else(|| Aabb::enclosing(positions)) else {
            return;
        };

        let mut candidates = Vec::new();
        self.collect_candidates(&bounds, &mut candidates);

        let mut fallback = Vec::new();
        out.extend(positions.iter().map(|&p| {
            if bounds.contains_point(p) {
                self.compose(p, &candidates)
            } else {
                fallback.clear();
                self.collect_candidates(&Aabb::from_point(p), &mut fallback);
                self.compose(p, &fallback)
            }
        }));
    }

    /// Air density (kg/m³) at `position`.
    pub fn sample_air_density(&self, position: DVec3) -> f64 {
        self.air_density.density_at(position.y)
    }

    /// Sum of every effector reaching `position`.
    pub fn effector_velocity(&self, position: DVec3) -> DVec3 {
        let mut candidates = Vec::new();
        self.collect_candidates(&Aabb::from_point(position), &mut candidates);
        self.sum_effectors(position, &candidates)
    }

    pub fn border_velocity(&self, position: DVec3) -> DVec3 {
        self.border
            .as_ref()
            .map_or(DVec3::ZERO, |border| border.correction(position))
    }

    pub fn turbulence_velocity(&self, position: DVec3) -> DVec3 {
        self.turbulence.sample(position, self.time)
    }

    /// Index candidates, sorted so the summation order is independent of the
    /// index implementation.
    fn collect_candidates(&self, bounds: &Aabb, out: &mut Vec<EffectorId>) {
        self.index.query(bounds, out);
        out.sort_unstable();
        out.dedup();
    }

    fn sum_effectors(&self, position: DVec3, candidates: &[EffectorId]) -> DVec3 {
        candidates
            .iter()
            .filter_map(|id| self.effectors.get(id))
            .filter(|slot| slot.effector.reaches(position))
            .map(|slot| slot.effector.velocity_at(position))
            .sum()
    }

    fn compose(&self, position: DVec3, candidates: &[EffectorId]) -> DVec3 {
        self.base_wind
            + self.sum_effectors(position, candidates)
            + self.border_velocity(position)
            + self.turbulence_velocity(position)
    }
}

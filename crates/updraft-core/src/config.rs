//! Configuration for the wind field and the simulation driver.
//!
//! All config types deserialize from JSON and carry defaults from
//! [`crate::constants`]. Call `validate()` (the consuming constructors do)
//! before use.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{ensure_finite, ensure_positive, ensure_range, ConfigError, ConfigResult};
use crate::types::Aabb;

/// How air density varies in space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AirDensityModel {
    /// Same density everywhere (kg/m³).
    Constant { density: f64 },
    /// `sea_level * exp(-(y - reference_altitude) / scale_height)`, never
    /// exceeding `sea_level` below the reference altitude.
    Exponential {
        sea_level: f64,
        scale_height: f64,
        reference_altitude: f64,
    },
}

impl Default for AirDensityModel {
    fn default() -> Self {
        Self::Constant {
            density: DEFAULT_AIR_DENSITY,
        }
    }
}

impl AirDensityModel {
    /// Exponential falloff from the default sea-level density at y = 0.
    pub fn standard_exponential() -> Self {
        Self::Exponential {
            sea_level: DEFAULT_AIR_DENSITY,
            scale_height: ATMOSPHERE_SCALE_HEIGHT,
            reference_altitude: 0.0,
        }
    }

    pub fn density_at(&self, altitude: f64) -> f64 {
        match *self {
            Self::Constant { density } => density,
            Self::Exponential {
                sea_level,
                scale_height,
                reference_altitude,
            } => {
                let h = (altitude - reference_altitude).max(0.0);
                sea_level * (-h / scale_height).exp()
            }
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        match *self {
            Self::Constant { density } => ensure_positive("air density", density),
            Self::Exponential {
                sea_level,
                scale_height,
                reference_altitude,
            } => {
                ensure_positive("sea level density", sea_level)?;
                ensure_positive("scale height", scale_height)?;
                ensure_finite("reference altitude", reference_altitude)
            }
        }
    }
}

/// One octave of turbulence noise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseOctave {
    /// Spatial frequency (1/m).
    pub scale: f64,
    /// Temporal rate (1/s).
    pub frequency: f64,
    /// Peak velocity contribution (m/s).
    pub amplitude: f64,
}

impl NoiseOctave {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_finite("octave scale", self.scale)?;
        ensure_finite("octave frequency", self.frequency)?;
        ensure_finite("octave amplitude", self.amplitude)
    }
}

/// Multi-octave turbulence settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TurbulenceConfig {
    /// Same seed reproduces the same turbulence.
    pub seed: u64,
    pub octaves: Vec<NoiseOctave>,
    /// Altitude at which the amplitude falloff starts (half strength below).
    pub min_altitude: f64,
    /// Altitude at which turbulence reaches full strength.
    pub max_altitude: f64,
    /// Extra factor on the vertical component.
    pub vertical_scale: f64,
}

impl Default for TurbulenceConfig {
    fn default() -> Self {
        Self {
            seed: TURBULENCE_DEFAULT_SEED,
            octaves: vec![
                NoiseOctave {
                    scale: 0.01,
                    frequency: 0.1,
                    amplitude: 1.5,
                },
                NoiseOctave {
                    scale: 0.05,
                    frequency: 0.4,
                    amplitude: 0.5,
                },
            ],
            min_altitude: TURBULENCE_MIN_ALTITUDE,
            max_altitude: TURBULENCE_MAX_ALTITUDE,
            vertical_scale: TURBULENCE_VERTICAL_SCALE,
        }
    }
}

impl TurbulenceConfig {
    /// No octaves: turbulence contributes nothing.
    pub fn calm() -> Self {
        Self {
            octaves: Vec::new(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        for octave in &self.octaves {
            octave.validate()?;
        }
        ensure_finite("turbulence min altitude", self.min_altitude)?;
        ensure_finite("turbulence max altitude", self.max_altitude)?;
        ensure_finite("turbulence vertical scale", self.vertical_scale)
    }
}

/// Push-back wind near the horizontal edges of the world.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BorderConfig {
    /// World extent. Only the X and Z faces produce correction.
    pub world_bounds: Aabb,
    /// Thickness of the correction band inside the world bounds.
    pub size: f64,
    pub wind_speed: f64,
    /// Falloff exponent on the normalized penetration depth.
    pub wind_pow: f64,
}

impl BorderConfig {
    pub fn new(world_bounds: Aabb) -> Self {
        Self {
            world_bounds,
            size: BORDER_DEFAULT_SIZE,
            wind_speed: BORDER_DEFAULT_WIND_SPEED,
            wind_pow: BORDER_DEFAULT_WIND_POW,
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.world_bounds.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "border world bounds",
                value: f64::NAN,
            });
        }
        ensure_positive("border size", self.size)?;
        ensure_finite("border wind speed", self.wind_speed)?;
        ensure_positive("border wind pow", self.wind_pow)?;
        let extent = self.world_bounds.size();
        let min_extent = extent.x.min(extent.z);
        ensure_range("border size", self.size, 0.0, min_extent * 0.5)
    }
}

/// Loose octree tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OctreeConfig {
    pub center: DVec3,
    pub initial_size: f64,
    pub min_node_size: f64,
    pub looseness: f64,
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self {
            center: DVec3::ZERO,
            initial_size: OCTREE_INITIAL_SIZE,
            min_node_size: OCTREE_MIN_NODE_SIZE,
            looseness: OCTREE_LOOSENESS,
        }
    }
}

impl OctreeConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if !self.center.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "octree center",
                value: f64::NAN,
            });
        }
        ensure_positive("octree initial size", self.initial_size)?;
        ensure_positive("octree min node size", self.min_node_size)?;
        ensure_range("octree looseness", self.looseness, 1.0, 2.0)
    }
}

/// Everything the wind field needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindConfig {
    /// Uniform wind everywhere (m/s).
    pub base_wind: DVec3,
    pub air_density: AirDensityModel,
    pub turbulence: TurbulenceConfig,
    /// None disables border correction.
    pub border: Option<BorderConfig>,
    pub octree: OctreeConfig,
}

impl Default for WindConfig {
    fn default() -> Self {
        Self {
            base_wind: DVec3::ZERO,
            air_density: AirDensityModel::default(),
            turbulence: TurbulenceConfig::default(),
            border: None,
            octree: OctreeConfig::default(),
        }
    }
}

impl WindConfig {
    /// Still air: no base wind, no turbulence, no border.
    pub fn calm() -> Self {
        Self {
            turbulence: TurbulenceConfig::calm(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json).map_err(ConfigError::parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.base_wind.is_finite() {
            return Err(ConfigError::NonFinite {
                name: "base wind",
                value: f64::NAN,
            });
        }
        self.air_density.validate()?;
        self.turbulence.validate()?;
        if let Some(border) = &self.border {
            border.validate()?;
        }
        self.octree.validate()
    }
}

/// Fixed-step driver settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Physics timestep (seconds).
    pub fixed_dt: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { fixed_dt: FIXED_DT }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        ensure_positive("fixed dt", self.fixed_dt)
    }
}

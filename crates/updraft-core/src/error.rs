//! Error types.
//!
//! Configuration problems are rejected when a component is built. Numeric
//! faults are raised during a step and are fatal for the simulation.

use thiserror::Error;

use crate::enums::SurfaceKind;

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Invalid configuration, detected before simulation starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("effector inner radius {inner} exceeds outer radius {outer}")]
    InvertedRadii { inner: f64, outer: f64 },

    #[error("parameter `{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },

    #[error("parameter `{name}` must be positive, got {value}")]
    NonPositive { name: &'static str, value: f64 },

    #[error("parameter `{name}` must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("coefficient curve has no keys")]
    EmptyCurve,

    #[error("coefficient curve keys must be strictly increasing in angle (key {index})")]
    UnsortedCurve { index: usize },

    #[error("at most {max} axis responses allowed, got {count}")]
    TooManyResponses { count: usize, max: usize },

    #[error("{kind} only supports {supported} responses")]
    UnsupportedResponse {
        kind: SurfaceKind,
        supported: &'static str,
    },

    #[error("section count must be within 1..={max}, got {count}")]
    SectionCount { count: usize, max: usize },

    #[error("section range {first}..={last} is outside 0..{count}")]
    SectionRange {
        first: usize,
        last: usize,
        count: usize,
    },

    #[error("no effector registered under id {0}")]
    UnknownEffector(u32),

    #[error("{0} requires at least one entry")]
    Empty(&'static str),

    #[error("control surface target must be a {expected}, got {actual}")]
    WrongTarget {
        expected: SurfaceKind,
        actual: SurfaceKind,
    },

    #[error("surface already has a force applicator")]
    AlreadyRouted,

    #[error("failed to parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn parse(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// Check helper used by every config validator.
pub fn ensure_finite(name: &'static str, value: f64) -> ConfigResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonFinite { name, value })
    }
}

pub fn ensure_positive(name: &'static str, value: f64) -> ConfigResult<()> {
    ensure_finite(name, value)?;
    if value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { name, value })
    }
}

pub fn ensure_range(name: &'static str, value: f64, min: f64, max: f64) -> ConfigResult<()> {
    ensure_finite(name, value)?;
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            name,
            value,
            min,
            max,
        })
    }
}

/// Unrecoverable non-finite value produced during a physics step.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NumericFault {
    #[error("{kind}: angle of attack is {value}")]
    AngleOfAttack { kind: SurfaceKind, value: f64 },

    #[error("{kind}: integrated force is non-finite ({x}, {y}, {z})")]
    Force {
        kind: SurfaceKind,
        x: f64,
        y: f64,
        z: f64,
    },

    #[error("{kind}: integrated torque is non-finite ({x}, {y}, {z})")]
    Torque {
        kind: SurfaceKind,
        x: f64,
        y: f64,
        z: f64,
    },

    #[error("{kind}: relative air velocity is non-finite ({x}, {y}, {z})")]
    Velocity {
        kind: SurfaceKind,
        x: f64,
        y: f64,
        z: f64,
    },
}

/// Errors surfaced by the simulation driver.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("numeric fault, simulation halted: {0}")]
    Numeric(#[from] NumericFault),

    #[error("simulation is halted after a numeric fault: {0}")]
    Halted(NumericFault),

    #[error("no wind field is attached")]
    NoWindField,

    #[error("no such entity")]
    NoSuchEntity,

    #[error("timestep must be positive and finite, got {0}")]
    InvalidTimestep(f64),
}

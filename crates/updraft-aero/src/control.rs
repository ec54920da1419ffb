//! Control surfaces deflect a range of wing sections from a normalized input.

use hecs::Entity;
use serde::{Deserialize, Serialize};

use updraft_core::error::{ensure_finite, ConfigError, ConfigResult};
use updraft_core::math::lerp;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlConfig {
    pub first_section: usize,
    pub last_section: usize,
    /// Deflection at input -1 (degrees).
    pub min_angle: f64,
    /// Deflection at input +1 (degrees).
    pub max_angle: f64,
}

/// ECS component targeting a wing entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlSurface {
    pub wing: Entity,
    pub first_section: usize,
    pub last_section: usize,
    pub min_angle: f64,
    pub max_angle: f64,
    input: f64,
}

impl ControlSurface {
    /// `section_count` is the target wing's strip count.
    pub fn new(wing: Entity, config: &ControlConfig, section_count: usize) -> ConfigResult<Self> {
        ensure_finite("control min angle", config.min_angle)?;
        ensure_finite("control max angle", config.max_angle)?;
        if config.first_section > config.last_section || config.last_section >= section_count {
            return Err(ConfigError::SectionRange {
                first: config.first_section,
                last: config.last_section,
                count: section_count,
            });
        }
        Ok(Self {
            wing,
            first_section: config.first_section,
            last_section: config.last_section,
            min_angle: config.min_angle,
            max_angle: config.max_angle,
            input: 0.0,
        })
    }

    pub fn input(&self) -> f64 {
        self.input
    }

    /// Clamped to [-1, 1]. NaN is treated as neutral.
    pub fn set_input(&mut self, input: f64) {
        self.input = if input.is_nan() {
            0.0
        } else {
            input.clamp(-1.0, 1.0)
        };
    }

    /// Current deflection in degrees.
    pub fn deflection(&self) -> f64 {
        lerp(self.min_angle, self.max_angle, (self.input + 1.0) * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn control() -> ControlSurface {
        let mut world = hecs::World::new();
        let wing = world.spawn(());
        ControlSurface::new(
            wing,
            &ControlConfig {
                first_section: 0,
                last_section: 2,
                min_angle: -20.0,
                max_angle: 10.0,
            },
            4,
        )
        .unwrap()
    }

    #[test]
    fn deflection_interpolates_input() {
        let mut c = control();
        assert_abs_diff_eq!(c.deflection(), -5.0);
        c.set_input(1.0);
        assert_abs_diff_eq!(c.deflection(), 10.0);
        c.set_input(-7.0);
        assert_eq!(c.input(), -1.0);
        assert_abs_diff_eq!(c.deflection(), -20.0);
    }

    #[test]
    fn rejects_ranges_past_the_wing() {
        let mut world = hecs::World::new();
        let wing = world.spawn(());
        let config = ControlConfig {
            first_section: 2,
            last_section: 4,
            min_angle: 0.0,
            max_angle: 1.0,
        };
        assert_eq!(
            ControlSurface::new(wing, &config, 4).unwrap_err(),
            ConfigError::SectionRange {
                first: 2,
                last: 4,
                count: 4
            }
        );
    }
}

//! Push-back wind near the horizontal edges of the world.
//!
//! Inside `inner_bounds` (world bounds shrunk by the band size) the
//! correction is zero. Past an inner face it grows as
//! `(depth / size) ^ wind_pow * wind_speed`, pointing back into the world,
//! with an extra upward cushion.

use glam::DVec3;

use updraft_core::config::BorderConfig;
use updraft_core::constants::BORDER_VERTICAL_CUSHION;
use updraft_core::error::ConfigResult;
use updraft_core::types::Aabb;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BorderField {
    size: f64,
    size_inverse: f64,
    wind_speed: f64,
    wind_pow: f64,
    inner_bounds: Aabb,
}

impl BorderField {
    pub fn new(config: &BorderConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            size: config.size,
            size_inverse: 1.0 / config.size,
            wind_speed: config.wind_speed,
            wind_pow: config.wind_pow,
            inner_bounds: config.world_bounds.expanded(-config.size),
        })
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn inner_bounds(&self) -> Aabb {
        self.inner_bounds
    }

    /// Correction velocity at `position`.
    pub fn correction(&self, position: DVec3) -> DVec3 {
        let min = self.inner_bounds.min;
        let max = self.inner_bounds.max;
        let mut velocity = DVec3::ZERO;

        let faces = [
            (position.x < min.x, min.x - position.x, DVec3::X),
            (position.x > max.x, position.x - max.x, DVec3::NEG_X),
            (position.z < min.z, min.z - position.z, DVec3::Z),
            (position.z > max.z, position.z - max.z, DVec3::NEG_Z),
        ];
        for (crossed, depth, inward) in faces {
            if !crossed {
                continue;
            }
            let magnitude = (depth * self.size_inverse).powf(self.wind_pow) * self.wind_speed;
            velocity += inward * magnitude;
            // Non-physical cushioning: lift anything pushed off a wall.
            velocity.y += magnitude.abs() * BORDER_VERTICAL_CUSHION;
        }
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn field() -> BorderField {
        BorderField::new(&BorderConfig {
            world_bounds: Aabb::from_center_half_extents(DVec3::ZERO, DVec3::splat(1_000.0)),
            size: 100.0,
            wind_speed: 10.0,
            wind_pow: 2.0,
        })
        .unwrap()
    }

    #[test]
    fn inner_bounds_shrunk_by_size() {
        let inner = field().inner_bounds();
        assert_eq!(inner.min.x, -900.0);
        assert_eq!(inner.max.z, 900.0);
    }

    #[test]
    fn zero_inside_inner_bounds() {
        let border = field();
        assert_eq!(border.correction(DVec3::new(899.0, 0.0, -899.0)), DVec3::ZERO);
        assert_eq!(border.correction(DVec3::ZERO), DVec3::ZERO);
    }

    #[test]
    fn opposes_each_face() {
        let border = field();
        let east = border.correction(DVec3::new(950.0, 0.0, 0.0));
        assert_abs_diff_eq!(east.x, -2.5);
        assert_abs_diff_eq!(east.y, 1.25);
        assert_eq!(east.z, 0.0);

        let west = border.correction(DVec3::new(-950.0, 0.0, 0.0));
        assert!(west.x > 0.0);
        let north = border.correction(DVec3::new(0.0, 0.0, 950.0));
        assert!(north.z < 0.0);
        let south = border.correction(DVec3::new(0.0, 0.0, -950.0));
        assert!(south.z > 0.0);
    }

    #[test]
    fn corner_triggers_two_faces() {
        let border = field();
        let v = border.correction(DVec3::new(1_000.0, 0.0, 1_000.0));
        assert_abs_diff_eq!(v.x, -10.0);
        assert_abs_diff_eq!(v.z, -10.0);
        assert_abs_diff_eq!(v.y, 10.0);
    }

    #[test]
    fn vertical_bounds_are_ignored() {
        let border = field();
        assert_eq!(border.correction(DVec3::new(0.0, 5_000.0, 0.0)), DVec3::ZERO);
    }
}

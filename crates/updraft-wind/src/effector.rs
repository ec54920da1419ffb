//! Localized wind sources.
//!
//! An effector pushes air along its forward axis and swirls it around that
//! axis. Strength falls off radially (distance from the axis, relative to
//! the outer radius) and vertically (distance along the axis, fading from
//! the inner radius to the outer radius).

use glam::DVec3;
use serde::{Deserialize, Serialize};

use updraft_core::constants::EFFECTOR_RADIAL_FALLOFF_EXP;
use updraft_core::error::{ensure_finite, ensure_positive, ConfigError, ConfigResult};
use updraft_core::math::clamp01;
use updraft_core::types::Aabb;

/// Serializable effector parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EffectorConfig {
    pub position: DVec3,
    pub forward: DVec3,
    /// Linear wind along the forward axis (m/s).
    pub wind_speed: f64,
    /// Swirl speed around the forward axis (m/s).
    #[serde(default)]
    pub rotational_wind_speed: f64,
    #[serde(default)]
    pub inner_radius: f64,
    pub outer_radius: f64,
}

impl EffectorConfig {
    pub fn build(&self) -> ConfigResult<WindEffector> {
        WindEffector::new(
            self.position,
            self.forward,
            self.wind_speed,
            self.rotational_wind_speed,
            self.inner_radius,
            self.outer_radius,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindEffector {
    position: DVec3,
    forward: DVec3,
    wind_speed: f64,
    rotational_wind_speed: f64,
    inner_radius: f64,
    outer_radius: f64,
}

impl WindEffector {
    /// Build an effector. `forward` is normalized; radii must satisfy
    /// `0 <= inner <= outer` with `outer > 0`.
    pub fn new(
        position: DVec3,
        forward: DVec3,
        wind_speed: f64,
        rotational_wind_speed: f64,
        inner_radius: f64,
        outer_radius: f64,
    ) -> ConfigResult<Self> {
        let forward = checked_axis(position, forward)?;
        ensure_finite("effector wind speed", wind_speed)?;
        ensure_finite("effector rotational wind speed", rotational_wind_speed)?;
        ensure_finite("effector inner radius", inner_radius)?;
        ensure_positive("effector outer radius", outer_radius)?;
        if inner_radius < 0.0 {
            return Err(ConfigError::OutOfRange {
                name: "effector inner radius",
                value: inner_radius,
                min: 0.0,
                max: outer_radius,
            });
        }
        if inner_radius > outer_radius {
            return Err(ConfigError::InvertedRadii {
                inner: inner_radius,
                outer: outer_radius,
            });
        }

        Ok(Self {
            position,
            forward,
            wind_speed,
            rotational_wind_speed,
            inner_radius,
            outer_radius,
        })
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn forward(&self) -> DVec3 {
        self.forward
    }

    pub fn wind_speed(&self) -> f64 {
        self.wind_speed
    }

    pub fn rotational_wind_speed(&self) -> f64 {
        self.rotational_wind_speed
    }

    pub fn inner_radius(&self) -> f64 {
        self.inner_radius
    }

    pub fn outer_radius(&self) -> f64 {
        self.outer_radius
    }

    /// Move the effector. Callers owning an index must re-insert its bounds.
    pub fn set_transform(&mut self, position: DVec3, forward: DVec3) -> ConfigResult<()> {
        self.forward = checked_axis(position, forward)?;
        self.position = position;
        Ok(())
    }

    /// Index bounds: the box around the outer sphere.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_sphere(self.position, self.outer_radius)
    }

    /// Exact reach test against the outer sphere.
    pub fn reaches(&self, point: DVec3) -> bool {
        self.position.distance_squared(point) <= self.outer_radius * self.outer_radius
    }

    /// 1 within the inner radius along the axis, 0 past the outer radius,
    /// linear in between.
    pub fn vertical_proximity(&self, vertical: f64) -> f64 {
        let vertical = vertical.abs();
        if vertical <= self.inner_radius {
            return 1.0;
        }
        let band = self.outer_radius - self.inner_radius;
        if band <= 0.0 {
            return 0.0;
        }
        1.0 - clamp01((vertical - self.inner_radius) / band)
    }

    /// Velocity contributed at `point`. Zero outside the outer sphere.
    pub fn velocity_at(&self, point: DVec3) -> DVec3 {
        if !self.reaches(point) {
            return DVec3::ZERO;
        }

        let offset = point - self.position;
        let vertical = offset.dot(self.forward);
        let radial = offset - self.forward * vertical;

        let radial_proximity = (1.0 - clamp01(radial.length() / self.outer_radius))
            .powf(EFFECTOR_RADIAL_FALLOFF_EXP);
        let swirl = self.forward.cross(radial).normalize_or_zero();

        let velocity = swirl * (radial_proximity * self.rotational_wind_speed)
            + self.forward * (radial_proximity * self.wind_speed);
        velocity * self.vertical_proximity(vertical)
    }
}

fn checked_axis(position: DVec3, forward: DVec3) -> ConfigResult<DVec3> {
    if !position.is_finite() {
        return Err(ConfigError::NonFinite {
            name: "effector position",
            value: f64::NAN,
        });
    }
    forward.try_normalize().ok_or(ConfigError::NonFinite {
        name: "effector forward axis",
        value: forward.length(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn fan() -> WindEffector {
        WindEffector::new(DVec3::ZERO, DVec3::Z, 5.0, 0.0, 0.0, 10.0).unwrap()
    }

    #[test]
    fn rejects_inverted_radii() {
        let err = WindEffector::new(DVec3::ZERO, DVec3::Z, 1.0, 0.0, 12.0, 10.0).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvertedRadii {
                inner: 12.0,
                outer: 10.0
            }
        );
    }

    #[test]
    fn rejects_zero_forward_axis() {
        assert!(WindEffector::new(DVec3::ZERO, DVec3::ZERO, 1.0, 0.0, 0.0, 10.0).is_err());
    }

    #[test]
    fn normalizes_forward_axis() {
        let e = WindEffector::new(DVec3::ZERO, DVec3::new(0.0, 3.0, 0.0), 1.0, 0.0, 0.0, 1.0)
            .unwrap();
        assert_eq!(e.forward(), DVec3::Y);
    }

    #[test]
    fn halfway_along_axis() {
        let v = fan().velocity_at(DVec3::new(0.0, 0.0, 5.0));
        assert_abs_diff_eq!(v.z, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(v.x, 0.0);
        assert_abs_diff_eq!(v.y, 0.0);
    }

    #[test]
    fn radial_falloff_is_monotonic() {
        let e = WindEffector::new(DVec3::ZERO, DVec3::Z, 5.0, 0.0, 2.0, 10.0).unwrap();
        let mut last = f64::INFINITY;
        for step in 0..10 {
            let speed = e.velocity_at(DVec3::new(step as f64, 0.0, 1.0)).length();
            assert!(speed <= last, "speed rose at r={step}: {speed} > {last}");
            last = speed;
        }
        assert_eq!(e.velocity_at(DVec3::new(10.0, 0.0, 0.0)), DVec3::ZERO);
    }

    #[test]
    fn zero_outside_outer_sphere() {
        assert_eq!(fan().velocity_at(DVec3::new(8.0, 0.0, 8.0)), DVec3::ZERO);
        assert!(!fan().reaches(DVec3::new(8.0, 0.0, 8.0)));
    }

    #[test]
    fn swirl_is_tangential() {
        let e = WindEffector::new(DVec3::ZERO, DVec3::Y, 0.0, 4.0, 5.0, 10.0).unwrap();
        let p = DVec3::new(3.0, 0.0, 0.0);
        let v = e.velocity_at(p);
        assert!(v.length() > 0.0);
        assert_abs_diff_eq!(v.dot(p), 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.dot(DVec3::Y), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn vertical_band() {
        let e = WindEffector::new(DVec3::ZERO, DVec3::Z, 1.0, 0.0, 4.0, 8.0).unwrap();
        assert_eq!(e.vertical_proximity(-3.0), 1.0);
        assert_abs_diff_eq!(e.vertical_proximity(6.0), 0.5);
        assert_eq!(e.vertical_proximity(9.0), 0.0);
    }

    #[test]
    fn config_from_json() {
        let json = r#"{ "position": [1.0, 2.0, 3.0], "forward": [0.0, 1.0, 0.0],
                        "wind_speed": 3.0, "outer_radius": 20.0 }"#;
        let config: EffectorConfig = serde_json::from_str(json).unwrap();
        let e = config.build().unwrap();
        assert_eq!(e.inner_radius(), 0.0);
        assert_eq!(e.bounds().max, DVec3::new(21.0, 22.0, 23.0));
    }
}

//! Tabulated coefficient curves: angle of attack (degrees) to a dimensionless
//! lift, drag or moment coefficient.

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, ConfigError, ConfigResult};

/// One keyframe of a coefficient curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    /// Angle of attack (degrees).
    pub angle: f64,
    pub value: f64,
}

/// Piecewise-linear curve over sorted keys, held flat beyond the end keys.
///
/// Construct through [`CoefficientCurve::new`] (or deserialize and call
/// [`CoefficientCurve::validate`]); an evaluated curve always has at least one key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CoefficientCurve {
    keys: Vec<CurveKey>,
}

impl CoefficientCurve {
    pub fn new(keys: Vec<CurveKey>) -> ConfigResult<Self> {
        let curve = Self { keys };
        curve.validate()?;
        Ok(curve)
    }

    /// Build from `(angle, value)` pairs.
    pub fn from_points(points: &[(f64, f64)]) -> ConfigResult<Self> {
        Self::new(
            points
                .iter()
                .map(|&(angle, value)| CurveKey { angle, value })
                .collect(),
        )
    }

    /// Same coefficient at every angle.
    pub fn constant(value: f64) -> ConfigResult<Self> {
        Self::from_points(&[(0.0, value)])
    }

    /// Flat-plate lift, `2 sin(a) cos(a)` scaled to `peak`, sampled every 5°.
    pub fn flat_plate_lift(peak: f64) -> Self {
        Self::sampled(|a| peak * (2.0 * a).sin())
    }

    /// Flat-plate drag, `cd0 + 2 sin²(a)`, sampled every 5°.
    pub fn flat_plate_drag(cd0: f64) -> Self {
        Self::sampled(|a| cd0 + 2.0 * a.sin() * a.sin())
    }

    fn sampled(f: impl Fn(f64) -> f64) -> Self {
        let keys = (-36..=36)
            .map(|i| {
                let angle = i as f64 * 5.0;
                CurveKey {
                    angle,
                    value: f(angle.to_radians()),
                }
            })
            .collect();
        Self { keys }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    /// Reject empty, non-finite or unsorted keys.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.keys.is_empty() {
            return Err(ConfigError::EmptyCurve);
        }
        for (index, key) in self.keys.iter().enumerate() {
            ensure_finite("curve key angle", key.angle)?;
            ensure_finite("curve key value", key.value)?;
            if index > 0 && key.angle <= self.keys[index - 1].angle {
                return Err(ConfigError::UnsortedCurve { index });
            }
        }
        Ok(())
    }

    /// Evaluate at `angle` degrees. NaN in, NaN out.
    pub fn evaluate(&self, angle: f64) -> f64 {
        if angle.is_nan() {
            return f64::NAN;
        }
        let Some(first) = self.keys.first() else {
            return 0.0;
        };
        if angle <= first.angle {
            return first.value;
        }
        // partition_point finds the first key strictly above `angle`.
        let upper = self.keys.partition_point(|k| k.angle <= angle);
        if upper >= self.keys.len() {
            return self.keys[self.keys.len() - 1].value;
        }
        let a = self.keys[upper - 1];
        let b = self.keys[upper];
        let t = (angle - a.angle) / (b.angle - a.angle);
        a.value + (b.value - a.value) * t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn interpolates_between_keys() {
        let curve = CoefficientCurve::from_points(&[(-10.0, -1.0), (0.0, 0.0), (10.0, 1.0)]).unwrap();
        assert_abs_diff_eq!(curve.evaluate(5.0), 0.5);
        assert_abs_diff_eq!(curve.evaluate(-2.5), -0.25);
        assert_abs_diff_eq!(curve.evaluate(10.0), 1.0);
    }

    #[test]
    fn clamps_beyond_end_keys() {
        let curve = CoefficientCurve::from_points(&[(0.0, 0.2), (20.0, 1.2)]).unwrap();
        assert_abs_diff_eq!(curve.evaluate(-90.0), 0.2);
        assert_abs_diff_eq!(curve.evaluate(90.0), 1.2);
    }

    #[test]
    fn constant_curve() {
        let curve = CoefficientCurve::constant(0.47).unwrap();
        assert_abs_diff_eq!(curve.evaluate(-170.0), 0.47);
        assert_abs_diff_eq!(curve.evaluate(33.0), 0.47);
    }

    #[test]
    fn rejects_bad_keys() {
        assert_eq!(CoefficientCurve::from_points(&[]), Err(ConfigError::EmptyCurve));
        assert_eq!(
            CoefficientCurve::from_points(&[(0.0, 1.0), (0.0, 2.0)]),
            Err(ConfigError::UnsortedCurve { index: 1 })
        );
        assert!(matches!(
            CoefficientCurve::from_points(&[(f64::NAN, 1.0)]),
            Err(ConfigError::NonFinite { .. })
        ));
    }

    #[test]
    fn nan_angle_propagates() {
        let curve = CoefficientCurve::constant(1.0).unwrap();
        assert!(curve.evaluate(f64::NAN).is_nan());
    }

    #[test]
    fn flat_plate_presets_are_valid() {
        let lift = CoefficientCurve::flat_plate_lift(1.0);
        let drag = CoefficientCurve::flat_plate_drag(0.02);
        lift.validate().unwrap();
        drag.validate().unwrap();
        assert_abs_diff_eq!(lift.evaluate(45.0), 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(lift.evaluate(0.0), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(drag.evaluate(90.0), 2.02, epsilon = 1e-9);
    }
}

//! Multi-octave procedural turbulence.
//!
//! Each octave samples 2D Perlin noise per world axis, using the axis
//! coordinate scaled by the octave's spatial frequency as one input and time
//! scaled by its temporal rate as the other. Octave seeds and axis offsets are
//! drawn from a ChaCha stream, so one `u64` seed fixes the whole field.

use glam::DVec3;
use ::noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use updraft_core::config::{NoiseOctave, TurbulenceConfig};
use updraft_core::error::ConfigResult;
use updraft_core::math::{clamp01, inverse_lerp};

/// Range of the per-axis decorrelation offsets added to noise inputs.
const AXIS_OFFSET_RANGE: f64 = 1_000.0;

#[derive(Debug, Clone)]
struct SeededOctave {
    octave: NoiseOctave,
    perlin: Perlin,
    /// Added to the x/y/z inputs so the three components are uncorrelated.
    offsets: DVec3,
}

/// Deterministic turbulence velocity field.
#[derive(Debug, Clone)]
pub struct NoiseField {
    seed: u64,
    octaves: Vec<SeededOctave>,
    min_altitude: f64,
    max_altitude: f64,
    vertical_scale: f64,
}

impl NoiseField {
    pub fn new(config: &TurbulenceConfig) -> ConfigResult<Self> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let octaves = config
            .octaves
            .iter()
            .map(|octave| SeededOctave {
                octave: *octave,
                perlin: Perlin::new(rng.gen()),
                offsets: DVec3::new(
                    rng.gen_range(0.0..AXIS_OFFSET_RANGE),
                    rng.gen_range(0.0..AXIS_OFFSET_RANGE),
                    rng.gen_range(0.0..AXIS_OFFSET_RANGE),
                ),
            })
            .collect();

        Ok(Self {
            seed: config.seed,
            octaves,
            min_altitude: config.min_altitude,
            max_altitude: config.max_altitude,
            vertical_scale: config.vertical_scale,
        })
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn octave_count(&self) -> usize {
        self.octaves.len()
    }

    /// True when the field always samples to zero.
    pub fn is_calm(&self) -> bool {
        self.octaves.iter().all(|o| o.octave.amplitude == 0.0)
    }

    /// Amplitude multiplier at `altitude`: 0.5 at or below the band, 1.0 at or above.
    pub fn altitude_falloff(&self, altitude: f64) -> f64 {
        0.5 + 0.5 * clamp01(inverse_lerp(self.min_altitude, self.max_altitude, altitude))
    }

    /// Turbulent velocity at `position` and `time` (seconds).
    pub fn sample(&self, position: DVec3, time: f64) -> DVec3 {
        if self.octaves.is_empty() {
            return DVec3::ZERO;
        }

        let falloff = self.altitude_falloff(position.y);
        let mut velocity = DVec3::ZERO;
        for seeded in &self.octaves {
            let octave = &seeded.octave;
            let amplitude = octave.amplitude * falloff;
            if amplitude == 0.0 {
                continue;
            }
            let t = time * octave.frequency;
            let s = position * octave.scale + seeded.offsets;
            let n = DVec3::new(
                seeded.perlin.get([s.x, t]),
                seeded.perlin.get([s.y, t]),
                seeded.perlin.get([s.z, t]),
            );
            velocity += DVec3::new(n.x, n.y * self.vertical_scale, n.z) * amplitude;
        }
        velocity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn config(seed: u64) -> TurbulenceConfig {
        TurbulenceConfig {
            seed,
            ..TurbulenceConfig::default()
        }
    }

    #[test]
    fn same_seed_is_bit_identical() {
        let a = NoiseField::new(&config(99)).unwrap();
        let b = NoiseField::new(&config(99)).unwrap();
        for i in 0..50 {
            let p = DVec3::new(i as f64 * 13.7, 40.0 + i as f64, -i as f64 * 3.1);
            let t = i as f64 * 0.37;
            assert_eq!(a.sample(p, t), b.sample(p, t));
        }
    }

    #[test]
    fn different_seeds_differ() {
        let a = NoiseField::new(&config(1)).unwrap();
        let b = NoiseField::new(&config(2)).unwrap();
        let differs = (0..20).any(|i| {
            let p = DVec3::new(i as f64 * 7.3, 100.0, i as f64 * 2.9);
            a.sample(p, 1.3) != b.sample(p, 1.3)
        });
        assert!(differs, "different seeds should give different turbulence");
    }

    #[test]
    fn calm_field_is_zero() {
        let field = NoiseField::new(&TurbulenceConfig::calm()).unwrap();
        assert!(field.is_calm());
        assert_eq!(field.sample(DVec3::new(5.0, 5.0, 5.0), 3.0), DVec3::ZERO);
    }

    #[test]
    fn altitude_falloff_band() {
        let field = NoiseField::new(&TurbulenceConfig {
            min_altitude: 100.0,
            max_altitude: 300.0,
            ..TurbulenceConfig::default()
        })
        .unwrap();
        assert_abs_diff_eq!(field.altitude_falloff(0.0), 0.5);
        assert_abs_diff_eq!(field.altitude_falloff(200.0), 0.75);
        assert_abs_diff_eq!(field.altitude_falloff(1_000.0), 1.0);
    }

    #[test]
    fn amplitude_scales_linearly() {
        let octave = |amplitude| NoiseOctave {
            scale: 0.1,
            frequency: 1.0,
            amplitude,
        };
        let single = NoiseField::new(&TurbulenceConfig {
            octaves: vec![octave(1.0)],
            ..TurbulenceConfig::default()
        })
        .unwrap();
        let double = NoiseField::new(&TurbulenceConfig {
            octaves: vec![octave(2.0)],
            ..TurbulenceConfig::default()
        })
        .unwrap();
        for i in 0..20 {
            let p = DVec3::splat(i as f64 * 1.7);
            let t = i as f64 * 0.1;
            assert_eq!(single.sample(p, t) * 2.0, double.sample(p, t));
        }
    }
}

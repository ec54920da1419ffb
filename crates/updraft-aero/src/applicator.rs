//! Force applicators split a surface's loads across several bodies.

use hecs::Entity;

use updraft_core::error::{ensure_finite, ConfigError, ConfigResult};

use crate::host::BodyHandle;

/// ECS component. While present, the target surface stops applying its own
/// loads; each target body receives `weight * load` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct ForceApplicator {
    pub surface: Entity,
    targets: Vec<(BodyHandle, f64)>,
}

impl ForceApplicator {
    /// Weights are normalized to sum to 1.
    pub fn new(surface: Entity, targets: &[(BodyHandle, f64)]) -> ConfigResult<Self> {
        if targets.is_empty() {
            return Err(ConfigError::Empty("force applicator targets"));
        }
        let mut total = 0.0;
        for &(_, weight) in targets {
            ensure_finite("applicator weight", weight)?;
            if weight < 0.0 {
                return Err(ConfigError::NonPositive {
                    name: "applicator weight",
                    value: weight,
                });
            }
            total += weight;
        }
        if total <= 0.0 {
            return Err(ConfigError::NonPositive {
                name: "applicator weight sum",
                value: total,
            });
        }
        Ok(Self {
            surface,
            targets: targets.iter().map(|&(b, w)| (b, w / total)).collect(),
        })
    }

    pub fn targets(&self) -> &[(BodyHandle, f64)] {
        &self.targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn weights_are_normalized() {
        let mut world = hecs::World::new();
        let surface = world.spawn(());
        let applicator =
            ForceApplicator::new(surface, &[(BodyHandle(0), 3.0), (BodyHandle(1), 1.0)]).unwrap();
        assert_abs_diff_eq!(applicator.targets()[0].1, 0.75);
        assert_abs_diff_eq!(applicator.targets()[1].1, 0.25);
    }

    #[test]
    fn rejects_bad_weights() {
        let mut world = hecs::World::new();
        let surface = world.spawn(());
        assert!(ForceApplicator::new(surface, &[]).is_err());
        assert!(ForceApplicator::new(surface, &[(BodyHandle(0), 0.0)]).is_err());
        assert!(ForceApplicator::new(surface, &[(BodyHandle(0), -1.0), (BodyHandle(1), 2.0)]).is_err());
    }
}

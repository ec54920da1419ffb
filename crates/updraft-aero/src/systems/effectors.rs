//! Effector system: moves mounted effectors with their bodies.

use hecs::World;

use updraft_core::error::ConfigResult;
use updraft_wind::WindField;

use crate::components::{EffectorMount, WindSource};
use crate::host::PhysicsHost;

/// Refresh every mounted effector from its body pose.
pub fn run(world: &World, wind: &mut WindField, host: &dyn PhysicsHost) -> ConfigResult<()> {
    for (_entity, (source, mount)) in world.query::<(&WindSource, &EffectorMount)>().iter() {
        let (Some(id), Some(pose)) = (source.id, host.body_pose(mount.body)) else {
            continue;
        };
        wind.update_effector(
            id,
            pose.transform_point(mount.local_position),
            pose.transform_vector(mount.local_forward),
        )?;
    }
    Ok(())
}

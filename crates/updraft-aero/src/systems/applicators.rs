//! Applicator system: distributes surface loads across target bodies.

use hecs::World;

use crate::applicator::ForceApplicator;
use crate::host::PhysicsHost;
use crate::surface::AerodynamicSurface;

pub fn run(world: &World, host: &mut dyn PhysicsHost) {
    for (_entity, applicator) in world.query::<&ForceApplicator>().iter() {
        let Ok(surface) = world.get::<&AerodynamicSurface>(applicator.surface) else {
            continue;
        };
        for load in surface.loads() {
            for &(body, weight) in applicator.targets() {
                host.apply_force_at_position(body, load.force * weight, load.position);
                host.apply_torque_at_position(body, load.torque * weight, load.position);
            }
        }
    }
}

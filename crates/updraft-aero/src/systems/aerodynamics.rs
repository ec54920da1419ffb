//! Aerodynamics system: samples the wind and computes every surface's loads.
//!
//! All surfaces are computed before any load reaches the host, so a numeric
//! fault leaves the physics world untouched for this step.

use hecs::World;

use updraft_core::enums::FramePhase;
use updraft_core::error::NumericFault;
use updraft_wind::WindField;

use crate::hooks::HookRegistry;
use crate::host::PhysicsHost;
use crate::surface::AerodynamicSurface;

/// Compute and apply surface loads. Without a wind field every surface is
/// skipped for this step.
pub fn run(
    world: &mut World,
    wind: Option<&WindField>,
    host: &mut dyn PhysicsHost,
    hooks: &mut HookRegistry,
    dt: f64,
) -> Result<(), NumericFault> {
    for (entity, surface) in world.query_mut::<&mut AerodynamicSurface>() {
        hooks.fire(FramePhase::PrePhysics, entity, surface);
        match wind {
            Some(wind) => {
                if let Err(fault) = surface.step(wind, &*host, dt) {
                    log::error!("numeric fault on {entity:?}: {fault}");
                    return Err(fault);
                }
            }
            None => surface.skip(),
        }
        hooks.fire(FramePhase::PostPhysics, entity, surface);
    }

    for (_entity, surface) in world.query::<&AerodynamicSurface>().iter() {
        if !surface.applies_forces() {
            continue;
        }
        let body = surface.body();
        for load in surface.loads() {
            host.apply_force_at_position(body, load.force, load.position);
            host.apply_torque_at_position(body, load.torque, load.position);
        }
    }
    Ok(())
}

/// Visual-frame pass: hooks plus a world-center refresh, no forces.
pub fn visual_frame(world: &mut World, host: &dyn PhysicsHost, hooks: &mut HookRegistry) {
    for (entity, surface) in world.query_mut::<&mut AerodynamicSurface>() {
        hooks.fire(FramePhase::PreVisual, entity, surface);
        surface.refresh_center(host);
        hooks.fire(FramePhase::PostVisual, entity, surface);
    }
}

//! Snapshot system: queries the ECS world and builds an AeroSnapshot.
//!
//! Read-only: never modifies the world.

use hecs::World;

use updraft_core::state::{AeroSnapshot, SurfaceView};
use updraft_core::types::SimTime;
use updraft_wind::WindField;

use crate::surface::AerodynamicSurface;

/// Build a complete AeroSnapshot from the current world state.
pub fn build_snapshot(world: &World, time: &SimTime, wind: Option<&WindField>) -> AeroSnapshot {
    AeroSnapshot {
        time: *time,
        wind_attached: wind.is_some(),
        active_effectors: wind.map_or(0, WindField::active_effector_count),
        surfaces: build_surfaces(world),
    }
}

/// Build SurfaceView list, ordered by entity id.
fn build_surfaces(world: &World) -> Vec<SurfaceView> {
    let mut surfaces: Vec<SurfaceView> = world
        .query::<&AerodynamicSurface>()
        .iter()
        .map(|(entity, surface)| {
            let state = surface.state();
            SurfaceView {
                id: entity.to_bits().get(),
                kind: surface.kind(),
                area: state.area,
                center: state.center_world,
                angle_of_attack: state.angle_of_attack,
                air_speed: state.air_speed,
                relative_velocity: state.relative_velocity,
                wind: state.wind,
                lift: state.lift,
                drag: state.drag,
                moment: state.moment,
                efficiency: state.efficiency(),
            }
        })
        .collect();

    surfaces.sort_by_key(|s| s.id);
    surfaces
}

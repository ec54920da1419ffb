//! Control system: writes control-surface deflections into wing sections.

use hecs::World;

use crate::control::ControlSurface;
use crate::surface::{AerodynamicSurface, SurfaceModel};

/// Zero every wing's offsets, then add each control's current deflection.
pub fn run(world: &mut World) {
    for (_entity, surface) in world.query_mut::<&mut AerodynamicSurface>() {
        if let SurfaceModel::MultiSectionWing(wing) = surface.model_mut() {
            wing.reset_deflections();
        }
    }

    let controls: Vec<ControlSurface> = world
        .query::<&ControlSurface>()
        .iter()
        .map(|(_, control)| *control)
        .collect();

    for control in controls {
        let Ok(mut surface) = world.get::<&mut AerodynamicSurface>(control.wing) else {
            continue;
        };
        if let SurfaceModel::MultiSectionWing(wing) = surface.model_mut() {
            wing.add_deflection(
                control.first_section,
                control.last_section,
                control.deflection(),
            );
        }
    }
}

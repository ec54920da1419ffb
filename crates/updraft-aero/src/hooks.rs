//! Observer list for per-frame surface hooks.

use hecs::Entity;

use updraft_core::enums::FramePhase;

use crate::surface::AerodynamicSurface;

pub type HookFn = Box<dyn FnMut(FramePhase, Entity, &mut AerodynamicSurface) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HookId(u32);

#[derive(Default)]
pub struct HookRegistry {
    hooks: Vec<(HookId, FramePhase, HookFn)>,
    next_id: u32,
}

impl std::fmt::Debug for HookRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRegistry")
            .field("hooks", &self.hooks.len())
            .finish()
    }
}

impl HookRegistry {
    pub fn register(&mut self, phase: FramePhase, hook: HookFn) -> HookId {
        let id = HookId(self.next_id);
        self.next_id += 1;
        self.hooks.push((id, phase, hook));
        id
    }

    pub fn unregister(&mut self, id: HookId) -> bool {
        let before = self.hooks.len();
        self.hooks.retain(|(h, _, _)| *h != id);
        self.hooks.len() != before
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Call every hook registered for `phase`, in registration order.
    pub fn fire(&mut self, phase: FramePhase, entity: Entity, surface: &mut AerodynamicSurface) {
        for (_, hook_phase, hook) in &mut self.hooks {
            if *hook_phase == phase {
                hook(phase, entity, surface);
            }
        }
    }
}

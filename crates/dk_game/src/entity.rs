use dk_core::input::InputState;
use dk_core::tween::Tweens;

use crate::physics::PhysicsWorld;

/// Everything an entity may read or drive during one fixed step.
/// `keyboard` is `None` when no keyboard device is available.
pub struct TickContext<'a> {
    pub keyboard: Option<&'a InputState>,
    pub physics: &'a mut PhysicsWorld,
    pub tweens: &'a mut Tweens,
}

/// Per-tick behavior of a world entity.
pub trait Updatable {
    fn update(&mut self, ctx: &mut TickContext<'_>);
}

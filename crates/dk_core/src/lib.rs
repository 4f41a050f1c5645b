//! Engine-agnostic runtime primitives shared by the editor and gameplay:
//! keyboard state, fixed-step timing, tweens and deferred one-shot timers.

pub mod input;
pub mod time;
pub mod timer;
pub mod tween;

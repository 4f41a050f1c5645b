//! Player motion and the double-jump / spin state machine.
//!
//! Per tick, in order: horizontal movement, landing detection (which resets
//! the jump counter and cancels any spin), then jump input. Jump input is
//! edge-detected with `jump_key_was_released`, so holding the key (or OS key
//! repeat) never fires a second jump. The second jump starts a spin that keeps
//! looping, one full turn at a time, until the player lands.

use dk_core::input::{InputState, JUMP_KEYS, MOVE_LEFT_KEYS, MOVE_RIGHT_KEYS};
use dk_core::tween::{Tween, TweenId, Tweens};
use glam::Vec2;

use crate::collision::Aabb;
use crate::config::PlayerConfig;
use crate::entity::{TickContext, Updatable};
use crate::physics::{Body, BodyHandle, PhysicsWorld};

const SPIN_ON_JUMP: u32 = 2;
const FROZEN_ALPHA: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpPhase {
    Grounded,
    Airborne,
    Spinning,
}

#[derive(Debug, Clone, Copy, Default)]
struct Controls {
    left: bool,
    right: bool,
    jump: bool,
}

pub struct Player {
    body: BodyHandle,
    config: PlayerConfig,
    facing: Facing,
    grounded: bool,
    jump_count: u32,
    jump_key_was_released: bool,
    is_spinning: bool,
    spin_tween: Option<TweenId>,
    angle: f32,
    alpha: f32,
    reported_missing_keyboard: bool,
}

impl Player {
    pub fn spawn(physics: &mut PhysicsWorld, x: f32, y: f32, config: &PlayerConfig) -> Self {
        let mut body = Body::new(Aabb::new(x, y, config.body_width, config.body_height));
        body.collide_world_bounds = true;
        body.drag = Vec2::new(config.drag(), 0.0);
        body.max_velocity = Vec2::new(config.move_speed, config.max_fall_speed);
        let body = physics.add_body(body);

        Self {
            body,
            config: config.clone(),
            facing: Facing::Right,
            grounded: false,
            jump_count: 0,
            jump_key_was_released: true,
            is_spinning: false,
            spin_tween: None,
            angle: 0.0,
            alpha: 1.0,
            reported_missing_keyboard: false,
        }
    }

    pub fn body_handle(&self) -> BodyHandle {
        self.body
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn jump_count(&self) -> u32 {
        self.jump_count
    }

    pub fn is_spinning(&self) -> bool {
        self.is_spinning
    }

    /// Display rotation in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn phase(&self) -> JumpPhase {
        if self.grounded {
            JumpPhase::Grounded
        } else if self.is_spinning {
            JumpPhase::Spinning
        } else {
            JumpPhase::Airborne
        }
    }

    pub fn is_on_ground(&self, physics: &PhysicsWorld) -> bool {
        physics.body(self.body).on_floor()
    }

    /// Stops the player in place: no velocity, no gravity, dimmed.
    pub fn freeze(&mut self, physics: &mut PhysicsWorld) {
        let body = physics.body_mut(self.body);
        body.velocity = Vec2::ZERO;
        body.allow_gravity = false;
        self.alpha = FROZEN_ALPHA;
    }

    /// Handles tweens that finished this tick and copies the live spin angle.
    /// A finished rotation starts over while the player is still airborne.
    pub fn advance_spin(
        &mut self,
        completed: &[TweenId],
        physics: &PhysicsWorld,
        tweens: &mut Tweens,
    ) {
        if let Some(id) = self.spin_tween {
            if completed.contains(&id) {
                self.spin_tween = None;
                if self.is_spinning && !self.is_on_ground(physics) {
                    self.angle = 0.0;
                    self.begin_rotation(tweens);
                }
            }
        }
        if let Some(angle) = self.spin_tween.and_then(|id| tweens.value(id)) {
            self.angle = angle;
        }
    }

    fn read_controls(&mut self, keyboard: Option<&InputState>) -> Controls {
        let Some(keyboard) = keyboard else {
            if !self.reported_missing_keyboard {
                log::error!("Keyboard input not available");
                self.reported_missing_keyboard = true;
            }
            return Controls::default();
        };
        Controls {
            left: keyboard.any_held(MOVE_LEFT_KEYS),
            right: keyboard.any_held(MOVE_RIGHT_KEYS),
            jump: keyboard.any_held(JUMP_KEYS),
        }
    }

    fn handle_movement(&mut self, controls: Controls, physics: &mut PhysicsWorld) {
        let body = physics.body_mut(self.body);
        if controls.left {
            body.velocity.x = -self.config.move_speed;
            self.facing = Facing::Left;
        } else if controls.right {
            body.velocity.x = self.config.move_speed;
            self.facing = Facing::Right;
        } else {
            body.velocity.x = 0.0;
        }
    }

    fn handle_jump(&mut self, controls: Controls, physics: &mut PhysicsWorld, tweens: &mut Tweens) {
        self.grounded = self.is_on_ground(physics);
        if self.grounded {
            self.jump_count = 0;
            self.stop_spin(tweens);
        }

        if controls.jump && self.jump_key_was_released {
            // The press is consumed even when no jump is left, so holding the
            // key through a landing does not fire a jump on touchdown.
            self.jump_key_was_released = false;
            if self.jump_count < self.config.max_jumps {
                physics.body_mut(self.body).velocity.y = self.config.jump_velocity;
                self.jump_count += 1;
                if self.jump_count == SPIN_ON_JUMP {
                    self.start_spin(tweens);
                }
            }
        }

        if !controls.jump {
            self.jump_key_was_released = true;
        }
    }

    fn start_spin(&mut self, tweens: &mut Tweens) {
        if self.is_spinning {
            return;
        }
        self.is_spinning = true;
        self.begin_rotation(tweens);
    }

    fn begin_rotation(&mut self, tweens: &mut Tweens) {
        let turn = match self.facing {
            Facing::Left => -360.0,
            Facing::Right => 360.0,
        };
        let duration_us = self.config.spin_duration_ms * 1000;
        self.spin_tween = Some(tweens.start(Tween::linear(0.0, turn, duration_us)));
    }

    fn stop_spin(&mut self, tweens: &mut Tweens) {
        if !self.is_spinning {
            return;
        }
        self.is_spinning = false;
        if let Some(id) = self.spin_tween.take() {
            tweens.stop(id);
        }
        self.angle = 0.0;
    }
}

impl Updatable for Player {
    fn update(&mut self, ctx: &mut TickContext<'_>) {
        let controls = self.read_controls(ctx.keyboard);
        self.handle_movement(controls, ctx.physics);
        self.handle_jump(controls, ctx.physics, ctx.tweens);
    }
}

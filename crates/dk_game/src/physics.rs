//! Arcade-style dynamic bodies stepped against the collision grid.
//!
//! Entities never own their body; they hold a `BodyHandle` and go through the
//! `PhysicsWorld` to read contacts or set velocity. Contact flags follow the
//! usual arcade split: `touching` reports tiles the body pressed against this
//! step, `blocked` reports the world bounds.

use glam::Vec2;

use crate::collision::{Aabb, CollisionGrid};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sides {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(usize);

#[derive(Debug, Clone)]
pub struct Body {
    pub aabb: Aabb,
    pub velocity: Vec2,
    pub allow_gravity: bool,
    /// Deceleration toward zero in px/s^2, per axis.
    pub drag: Vec2,
    /// Velocity ceiling per axis (applied symmetrically).
    pub max_velocity: Vec2,
    pub collide_world_bounds: bool,
    pub blocked: Sides,
    pub touching: Sides,
}

impl Body {
    pub fn new(aabb: Aabb) -> Self {
        Self {
            aabb,
            velocity: Vec2::ZERO,
            allow_gravity: true,
            drag: Vec2::ZERO,
            max_velocity: Vec2::splat(10_000.0),
            collide_world_bounds: false,
            blocked: Sides::default(),
            touching: Sides::default(),
        }
    }

    /// Resting on a tile or on the bottom of the world after the last step.
    pub fn on_floor(&self) -> bool {
        self.blocked.down || self.touching.down
    }

    #[cfg(test)]
    pub fn set_position(&mut self, center_x: f32, center_y: f32) {
        self.aabb.center_x = center_x;
        self.aabb.center_y = center_y;
    }
}

pub struct PhysicsWorld {
    pub gravity: f32,
    pub bounds: Aabb,
    grid: CollisionGrid,
    bodies: Vec<Body>,
}

impl PhysicsWorld {
    /// World bounds default to the pixel extent of the grid.
    pub fn new(grid: CollisionGrid, gravity: f32) -> Self {
        let width = (grid.width * grid.cell_size) as f32;
        let height = (grid.height * grid.cell_size) as f32;
        Self {
            gravity,
            bounds: Aabb::new(width / 2.0, height / 2.0, width, height),
            grid,
            bodies: Vec::new(),
        }
    }

    pub fn grid(&self) -> &CollisionGrid {
        &self.grid
    }

    pub fn add_body(&mut self, body: Body) -> BodyHandle {
        self.bodies.push(body);
        BodyHandle(self.bodies.len() - 1)
    }

    // Handles are only minted by `add_body` and bodies are never removed, so
    // indexing cannot go out of range.
    pub fn body(&self, handle: BodyHandle) -> &Body {
        &self.bodies[handle.0]
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> &mut Body {
        &mut self.bodies[handle.0]
    }

    pub fn step(&mut self, dt: f32) {
        for body in &mut self.bodies {
            step_body(body, &self.grid, &self.bounds, self.gravity, dt);
        }
    }
}

fn step_body(body: &mut Body, grid: &CollisionGrid, bounds: &Aabb, gravity: f32, dt: f32) {
    let mut velocity = body.velocity;
    if body.allow_gravity {
        velocity.y += gravity * dt;
    }
    if body.drag.x > 0.0 {
        velocity.x = move_towards(velocity.x, 0.0, body.drag.x * dt);
    }
    if body.drag.y > 0.0 {
        velocity.y = move_towards(velocity.y, 0.0, body.drag.y * dt);
    }
    let max = body.max_velocity.abs();
    velocity.x = velocity.x.clamp(-max.x, max.x);
    velocity.y = velocity.y.clamp(-max.y, max.y);

    let result = grid.move_and_collide_detailed(body.aabb, velocity.x * dt, velocity.y * dt);
    body.aabb = result.aabb;
    body.touching = Sides {
        left: result.blocked_left,
        right: result.blocked_right,
        up: result.blocked_up,
        down: result.blocked_down,
    };
    if (result.blocked_left && velocity.x < 0.0) || (result.blocked_right && velocity.x > 0.0) {
        velocity.x = 0.0;
    }
    if result.collided_y {
        velocity.y = 0.0;
    }

    body.blocked = Sides::default();
    if body.collide_world_bounds {
        let aabb = &mut body.aabb;
        if aabb.left() < bounds.left() {
            aabb.center_x = bounds.left() + aabb.half_w;
            body.blocked.left = true;
            velocity.x = velocity.x.max(0.0);
        } else if aabb.right() > bounds.right() {
            aabb.center_x = bounds.right() - aabb.half_w;
            body.blocked.right = true;
            velocity.x = velocity.x.min(0.0);
        }
        if aabb.top() < bounds.top() {
            aabb.center_y = bounds.top() + aabb.half_h;
            body.blocked.up = true;
            velocity.y = velocity.y.max(0.0);
        } else if aabb.bottom() >= bounds.bottom() {
            aabb.center_y = bounds.bottom() - aabb.half_h;
            body.blocked.down = true;
            velocity.y = velocity.y.min(0.0);
        }
    }

    body.velocity = velocity;
}

fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else if target > current {
        current + max_delta
    } else {
        current - max_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn floor_world() -> PhysicsWorld {
        let mut grid = CollisionGrid::new(16, 10, 10);
        for col in 0..10 {
            grid.insert_solid(col, 9);
        }
        PhysicsWorld::new(grid, 800.0)
    }

    #[test]
    fn gravity_settles_body_on_floor() {
        let mut world = floor_world();
        let handle = world.add_body(Body::new(Aabb::new(40.0, 40.0, 12.0, 14.0)));
        for _ in 0..120 {
            world.step(DT);
        }
        let body = world.body(handle);
        assert!(body.on_floor());
        assert!(body.touching.down);
        assert!(!body.blocked.down);
        assert!((body.aabb.bottom() - 144.0).abs() < 0.001);
        assert_eq!(body.velocity.y, 0.0);
    }

    #[test]
    fn drag_and_ceiling_limit_horizontal_speed() {
        let mut world = floor_world();
        let mut body = Body::new(Aabb::new(40.0, 137.0, 12.0, 14.0));
        body.drag = Vec2::new(640.0, 0.0);
        body.max_velocity = Vec2::new(160.0, 600.0);
        body.velocity.x = 500.0;
        let handle = world.add_body(body);

        world.step(DT);
        let vx = world.body(handle).velocity.x;
        assert!((vx - 160.0).abs() < 0.001, "clamped to ceiling, got {vx}");

        for _ in 0..30 {
            world.step(DT);
        }
        assert_eq!(world.body(handle).velocity.x, 0.0, "drag brings body to rest");
    }

    #[test]
    fn disabled_gravity_keeps_body_still() {
        let mut world = floor_world();
        let mut body = Body::new(Aabb::new(40.0, 40.0, 12.0, 14.0));
        body.allow_gravity = false;
        let handle = world.add_body(body);
        for _ in 0..30 {
            world.step(DT);
        }
        let body = world.body(handle);
        assert_eq!(body.aabb.center_y, 40.0);
        assert!(!body.on_floor());
    }

    #[test]
    fn world_bounds_block_and_report_floor() {
        let grid = CollisionGrid::new(16, 10, 10);
        let mut world = PhysicsWorld::new(grid, 800.0);
        let mut body = Body::new(Aabb::new(4.0, 150.0, 12.0, 14.0));
        body.collide_world_bounds = true;
        body.velocity.x = -100.0;
        let handle = world.add_body(body);
        for _ in 0..60 {
            world.step(DT);
        }
        let body = world.body(handle);
        assert!(body.blocked.down);
        assert!(body.on_floor());
        assert!((body.aabb.left() - 0.0).abs() < 0.001);
        assert!((body.aabb.bottom() - 160.0).abs() < 0.001);
    }

    #[test]
    fn move_towards_never_overshoots() {
        assert_eq!(move_towards(5.0, 0.0, 10.0), 0.0);
        assert_eq!(move_towards(-5.0, 0.0, 2.0), -3.0);
        assert_eq!(move_towards(1.0, 4.0, 2.0), 3.0);
    }
}

//! Keyboard state tracking with both edge-triggered and level-triggered queries.
//!
//! - **Level-triggered (held):** `is_held(key)` returns true every tick the key
//!   is physically down. Movement and the player's jump edge detector read this.
//!
//! - **Edge-triggered (just_pressed / just_released):** true only until the
//!   main loop calls `end_frame()`, which it does only after at least one fixed
//!   step consumed them. Editor shortcuts and scene hotkeys read these.
//!
//! Pointer input is not tracked here: the editor consumes pointer events
//! directly from the window event handler, in arrival order.

use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Enter,
    Escape,
    E,
    W,
    A,
    S,
    D,
    F3,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
}

/// Keys bound to the player's movement and jump actions.
pub const MOVE_LEFT_KEYS: &[Key] = &[Key::Left, Key::A];
pub const MOVE_RIGHT_KEYS: &[Key] = &[Key::Right, Key::D];
pub const JUMP_KEYS: &[Key] = &[Key::Space, Key::Up, Key::W];

#[derive(Debug, Default)]
pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key_down(&mut self, key: Key) {
        // OS key repeat re-sends presses for a held key; only the first counts.
        if self.held.insert(key) {
            self.just_pressed.insert(key);
        }
    }

    pub fn key_up(&mut self, key: Key) {
        if self.held.remove(&key) {
            self.just_released.insert(key);
        }
    }

    /// Drops every held key, e.g. when the window loses focus and release
    /// events will never arrive.
    pub fn release_all(&mut self) {
        for key in self.held.drain() {
            self.just_released.insert(key);
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn any_held(&self, keys: &[Key]) -> bool {
        keys.iter().any(|key| self.held.contains(key))
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_down_sets_held_and_just_pressed() {
        let mut input = InputState::new();
        input.key_down(Key::Space);
        assert!(input.is_held(Key::Space));
        assert!(input.is_just_pressed(Key::Space));
    }

    #[test]
    fn key_up_clears_held_sets_just_released() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.key_up(Key::Left);
        assert!(!input.is_held(Key::Left));
        assert!(input.is_just_released(Key::Left));
    }

    #[test]
    fn repeated_key_down_after_end_frame_is_not_a_new_press() {
        let mut input = InputState::new();
        input.key_down(Key::Up);
        input.end_frame();
        input.key_down(Key::Up);
        assert!(input.is_held(Key::Up));
        assert!(!input.is_just_pressed(Key::Up));
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        input.key_up(Key::E);
        assert!(!input.is_just_released(Key::E));
        assert!(!input.is_held(Key::E));
    }

    #[test]
    fn end_frame_keeps_held_keys() {
        let mut input = InputState::new();
        input.key_down(Key::D);
        input.key_down(Key::Space);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::D));
        assert!(!input.is_just_pressed(Key::Space));
        assert!(input.is_held(Key::D));
        assert!(input.is_held(Key::Space));
    }

    #[test]
    fn any_held_matches_bound_keys() {
        let mut input = InputState::new();
        assert!(!input.any_held(JUMP_KEYS));
        input.key_down(Key::W);
        assert!(input.any_held(JUMP_KEYS));
        assert!(!input.any_held(MOVE_LEFT_KEYS));
    }

    #[test]
    fn release_all_reports_every_held_key_released() {
        let mut input = InputState::new();
        input.key_down(Key::A);
        input.key_down(Key::Space);
        input.release_all();
        assert!(!input.is_held(Key::A));
        assert!(!input.is_held(Key::Space));
        assert!(input.is_just_released(Key::A));
        assert!(input.is_just_released(Key::Space));
    }
}

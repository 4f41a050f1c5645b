//! Linear value tweens advanced in integer microseconds.
//!
//! A tween only interpolates a number; whoever started it reads the value back
//! and applies it (e.g. to a sprite angle). Completion is reported from
//! `tick` instead of through callbacks, so the owner decides what happens next
//! with full access to its own state.

use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(u64);

#[derive(Debug, Clone)]
pub struct Tween {
    pub from: f32,
    pub to: f32,
    pub duration_us: u64,
    pub elapsed_us: u64,
}

impl Tween {
    pub fn linear(from: f32, to: f32, duration_us: u64) -> Self {
        Self {
            from,
            to,
            duration_us,
            elapsed_us: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_us >= self.duration_us
    }

    pub fn value(&self) -> f32 {
        if self.is_finished() {
            return self.to;
        }
        let t = self.elapsed_us as f64 / self.duration_us as f64;
        self.from + (self.to - self.from) * t as f32
    }
}

#[derive(Debug, Default)]
pub struct Tweens {
    next_id: u64,
    active: HashMap<TweenId, Tween>,
}

impl Tweens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self, tween: Tween) -> TweenId {
        let id = TweenId(self.next_id);
        self.next_id += 1;
        self.active.insert(id, tween);
        id
    }

    /// Removes a tween without completing it. Returns false if it was not live.
    pub fn stop(&mut self, id: TweenId) -> bool {
        self.active.remove(&id).is_some()
    }

    pub fn value(&self, id: TweenId) -> Option<f32> {
        self.active.get(&id).map(Tween::value)
    }

    pub fn is_active(&self, id: TweenId) -> bool {
        self.active.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Advances every live tween. Finished tweens are removed and their ids
    /// returned in start order.
    pub fn tick(&mut self, dt_us: u64) -> Vec<TweenId> {
        let mut completed = Vec::new();
        for (id, tween) in self.active.iter_mut() {
            tween.elapsed_us = tween.elapsed_us.saturating_add(dt_us);
            if tween.is_finished() {
                completed.push(*id);
            }
        }
        completed.sort();
        for id in &completed {
            self.active.remove(id);
        }
        completed
    }
}

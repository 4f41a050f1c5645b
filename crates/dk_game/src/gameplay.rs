//! One playthrough of a level: physics world, player, triggers and the
//! timed death/win flow.
//!
//! Each fixed tick runs: player update, physics step, trigger overlaps, tween
//! advance (spin completion), then timers. Death and win share one latch, so
//! whichever happens first is the only outcome the session ever reports.

use dk_core::input::{InputState, Key};
use dk_core::timer::Timers;
use dk_core::tween::Tweens;
use dk_level::{cell_center, CellType, LevelData};

use crate::collision::{Aabb, CollisionGrid};
use crate::config::{GameConfig, TimingConfig};
use crate::entity::{TickContext, Updatable};
use crate::physics::PhysicsWorld;
use crate::player::Player;

pub const WIN_MESSAGE: &str = "Level Complete!";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerKind {
    Spike,
    Spring,
    Goal,
}

impl TriggerKind {
    fn from_cell(cell_type: CellType) -> Option<Self> {
        match cell_type {
            CellType::Spike => Some(TriggerKind::Spike),
            CellType::Spring => Some(TriggerKind::Spring),
            CellType::Goal => Some(TriggerKind::Goal),
            CellType::Platform | CellType::PlayerStart => None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Trigger {
    pub kind: TriggerKind,
    pub col: u32,
    pub row: u32,
    pub rect: Aabb,
}

/// What the session asks the scene layer to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneRequest {
    Restart(LevelData),
    Editor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Playing,
    Dead,
    Won,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FlowEvent {
    Restart,
    ReturnToEditor,
}

pub struct GameSession {
    level: LevelData,
    from_editor: bool,
    tile_size: u32,
    spring_velocity: f32,
    timing: TimingConfig,
    physics: PhysicsWorld,
    tweens: Tweens,
    timers: Timers<FlowEvent>,
    player: Player,
    triggers: Vec<Trigger>,
    outcome: Outcome,
    message: Option<String>,
}

impl GameSession {
    pub fn new(level: LevelData, from_editor: bool, config: &GameConfig) -> Self {
        let tile_size = config.grid.tile_size;
        let grid = CollisionGrid::from_level(&level, tile_size);
        let mut physics = PhysicsWorld::new(grid, config.physics.gravity);

        let triggers: Vec<Trigger> = level
            .cells
            .iter()
            .filter(|cell| level.contains(cell.col, cell.row))
            .filter_map(|cell| {
                TriggerKind::from_cell(cell.cell_type).map(|kind| Trigger {
                    kind,
                    col: cell.col,
                    row: cell.row,
                    rect: Aabb::from_cell(cell.col, cell.row, tile_size),
                })
            })
            .collect();

        let (spawn_col, spawn_row) = match level.player_start() {
            Some(start) if level.contains(start.col, start.row) => (start.col, start.row),
            _ => {
                let fallback = (
                    2u32.min(level.grid_cols.saturating_sub(1)),
                    level.grid_rows.saturating_sub(2),
                );
                log::warn!(
                    "Level '{}' has no usable player start, spawning at {},{}",
                    level.name,
                    fallback.0,
                    fallback.1
                );
                fallback
            }
        };
        let (spawn_x, spawn_y) = cell_center(spawn_col, spawn_row, tile_size);
        let player = Player::spawn(&mut physics, spawn_x, spawn_y, &config.player);

        log::info!(
            "Game session for '{}': {} solids, {} triggers, spawn {},{}",
            level.name,
            physics.grid().solid_count(),
            triggers.len(),
            spawn_col,
            spawn_row
        );

        Self {
            level,
            from_editor,
            tile_size,
            spring_velocity: config.triggers.spring_velocity,
            timing: config.timing.clone(),
            physics,
            tweens: Tweens::new(),
            timers: Timers::new(),
            player,
            triggers,
            outcome: Outcome::Playing,
            message: None,
        }
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn from_editor(&self) -> bool {
        self.from_editor
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn physics(&self) -> &PhysicsWorld {
        &self.physics
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn player_aabb(&self) -> Aabb {
        self.physics.body(self.player.body_handle()).aabb
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn pending_transitions(&self) -> usize {
        self.timers.pending_count()
    }

    /// Advances the session by one fixed step.
    pub fn tick(&mut self, keyboard: Option<&InputState>, dt_us: u64) -> Option<SceneRequest> {
        if self.from_editor && keyboard.is_some_and(|k| k.is_just_pressed(Key::E)) {
            log::info!("Returning to editor");
            return Some(SceneRequest::Editor);
        }

        if self.outcome == Outcome::Playing {
            let mut ctx = TickContext {
                keyboard,
                physics: &mut self.physics,
                tweens: &mut self.tweens,
            };
            self.player.update(&mut ctx);
        }

        self.physics.step(dt_us as f32 / 1_000_000.0);

        if self.outcome == Outcome::Playing {
            self.check_triggers();
        }

        let completed = self.tweens.tick(dt_us);
        self.player
            .advance_spin(&completed, &self.physics, &mut self.tweens);

        self.timers
            .tick(dt_us)
            .into_iter()
            .next()
            .map(|event| match event {
                FlowEvent::Restart => {
                    log::info!("Restarting level '{}'", self.level.name);
                    SceneRequest::Restart(self.level.clone())
                }
                FlowEvent::ReturnToEditor => {
                    log::info!("Level complete, returning to editor");
                    SceneRequest::Editor
                }
            })
    }

    fn check_triggers(&mut self) {
        let handle = self.player.body_handle();
        for i in 0..self.triggers.len() {
            let trigger = self.triggers[i];
            if !self.physics.body(handle).aabb.overlaps(&trigger.rect) {
                continue;
            }
            match trigger.kind {
                TriggerKind::Spike => {
                    log::debug!("Spike hit at {},{}", trigger.col, trigger.row);
                    self.die();
                    return;
                }
                TriggerKind::Spring => {
                    let body = self.physics.body_mut(handle);
                    if body.velocity.y > 0.0 {
                        log::debug!("Spring at {},{}", trigger.col, trigger.row);
                        body.velocity.y = self.spring_velocity;
                    }
                }
                TriggerKind::Goal => {
                    log::debug!("Goal reached at {},{}", trigger.col, trigger.row);
                    self.win();
                    return;
                }
            }
        }
    }

    fn die(&mut self) {
        if self.outcome != Outcome::Playing {
            return;
        }
        self.outcome = Outcome::Dead;
        self.player.freeze(&mut self.physics);
        self.timers
            .schedule(self.timing.death_restart_delay_ms * 1000, FlowEvent::Restart);
    }

    fn win(&mut self) {
        if self.outcome != Outcome::Playing {
            return;
        }
        self.outcome = Outcome::Won;
        self.player.freeze(&mut self.physics);
        self.message = Some(WIN_MESSAGE.to_string());
        self.timers.schedule(
            self.timing.win_return_delay_ms * 1000,
            FlowEvent::ReturnToEditor,
        );
    }
}

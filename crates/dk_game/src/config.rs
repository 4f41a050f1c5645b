//! Tunables for display, grid, physics, player and level flow.
//!
//! Every value has a built-in default; `assets/config/game.json` may override
//! any subset of them. A missing file is normal, a broken one is reported and
//! ignored so the game still starts.

use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const CONFIG_PATH: &str = "assets/config/game.json";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub display: DisplayConfig,
    pub grid: GridConfig,
    pub physics: PhysicsConfig,
    pub player: PlayerConfig,
    pub triggers: TriggerConfig,
    pub timing: TimingConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub scale: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 270,
            scale: 2,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    pub tile_size: u32,
    pub cols: u32,
    pub rows: u32,
    pub toolbar_height: u32,
}

impl GridConfig {
    pub fn pixel_width(&self) -> f32 {
        (self.cols * self.tile_size) as f32
    }

    pub fn pixel_height(&self) -> f32 {
        (self.rows * self.tile_size) as f32
    }
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            tile_size: 16,
            cols: dk_level::DEFAULT_GRID_COLS,
            rows: dk_level::DEFAULT_GRID_ROWS,
            toolbar_height: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration in px/s^2 (screen space, y grows downward).
    pub gravity: f32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self { gravity: 800.0 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    pub move_speed: f32,
    /// Negative: up is -y.
    pub jump_velocity: f32,
    pub max_fall_speed: f32,
    pub max_jumps: u32,
    pub spin_duration_ms: u64,
    pub body_width: f32,
    pub body_height: f32,
    pub display_size: f32,
}

impl PlayerConfig {
    pub fn drag(&self) -> f32 {
        self.move_speed * 4.0
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            move_speed: 160.0,
            jump_velocity: -350.0,
            max_fall_speed: 600.0,
            max_jumps: 2,
            spin_duration_ms: 400,
            body_width: 12.0,
            body_height: 14.0,
            display_size: 16.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    pub spring_velocity: f32,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            spring_velocity: -550.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub death_restart_delay_ms: u64,
    pub win_return_delay_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            death_restart_delay_ms: 1000,
            win_return_delay_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: "saves".to_string(),
        }
    }
}

pub fn load_config_from_path(path: &Path) -> Result<GameConfig, String> {
    let raw =
        fs::read_to_string(path).map_err(|e| format!("Failed to read {}: {e}", path.display()))?;
    let config: GameConfig = serde_json::from_str(&raw)
        .map_err(|e| format!("Failed to parse config JSON {}: {e}", path.display()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Loads the config file if present, otherwise falls back to defaults.
pub fn load_config_or_default(path: &Path) -> GameConfig {
    if !path.exists() {
        log::info!("No config at '{}', using defaults", path.display());
        return GameConfig::default();
    }
    match load_config_from_path(path) {
        Ok(config) => {
            log::info!("Loaded config '{}'", path.display());
            config
        }
        Err(err) => {
            log::error!("{err}. Using default config.");
            GameConfig::default()
        }
    }
}

fn validate_config(config: &GameConfig) -> Result<(), String> {
    let grid = &config.grid;
    if grid.tile_size == 0 {
        return Err("Config validation failed: grid.tile_size must be > 0".to_string());
    }
    if grid.cols == 0 || grid.rows == 0 {
        return Err("Config validation failed: grid.cols and grid.rows must be > 0".to_string());
    }
    if config.display.width == 0 || config.display.height == 0 {
        return Err("Config validation failed: display size must be > 0".to_string());
    }
    let player = &config.player;
    if player.move_speed <= 0.0 || player.max_fall_speed <= 0.0 {
        return Err(
            "Config validation failed: player.move_speed and player.max_fall_speed must be > 0"
                .to_string(),
        );
    }
    if player.jump_velocity >= 0.0 {
        return Err(
            "Config validation failed: player.jump_velocity must be negative (upward)".to_string(),
        );
    }
    if player.body_width <= 0.0
        || player.body_height <= 0.0
        || player.body_width > grid.tile_size as f32
        || player.body_height > grid.tile_size as f32
    {
        return Err(format!(
            "Config validation failed: player body must fit inside one {}px tile",
            grid.tile_size
        ));
    }
    if player.spin_duration_ms == 0 {
        return Err("Config validation failed: player.spin_duration_ms must be > 0".to_string());
    }
    Ok(())
}

use serde::{Deserialize, Serialize};

pub const LEVEL_FORMAT_VERSION: u32 = 1;
pub const DEFAULT_LEVEL_NAME: &str = "My Level";

/// Tile semantics. The serialized names are part of the save format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellType {
    /// Solid, blocks movement.
    Platform,
    /// Kills the player on overlap.
    Spike,
    /// Launches a falling player upward.
    Spring,
    /// Spawn marker, at most one per level.
    PlayerStart,
    /// Win trigger, at most one per level.
    Goal,
}

impl CellType {
    pub const ALL: &'static [CellType] = &[
        CellType::Platform,
        CellType::Spike,
        CellType::Spring,
        CellType::PlayerStart,
        CellType::Goal,
    ];

    /// Types that may occur at most once in a level.
    pub fn is_unique(self) -> bool {
        matches!(self, Self::PlayerStart | Self::Goal)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Platform => "Plat",
            Self::Spike => "Spike",
            Self::Spring => "Sprng",
            Self::PlayerStart => "Start",
            Self::Goal => "Goal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LevelCell {
    pub col: u32,
    pub row: u32,
    #[serde(rename = "type")]
    pub cell_type: CellType,
}

impl LevelCell {
    pub fn new(col: u32, row: u32, cell_type: CellType) -> Self {
        Self {
            col,
            row,
            cell_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelData {
    pub name: String,
    pub grid_cols: u32,
    pub grid_rows: u32,
    pub cells: Vec<LevelCell>,
    pub version: u32,
}

impl LevelData {
    pub fn empty(grid_cols: u32, grid_rows: u32) -> Self {
        Self {
            name: DEFAULT_LEVEL_NAME.to_string(),
            grid_cols,
            grid_rows,
            cells: Vec::new(),
            version: LEVEL_FORMAT_VERSION,
        }
    }

    pub fn contains(&self, col: u32, row: u32) -> bool {
        col < self.grid_cols && row < self.grid_rows
    }

    pub fn count_of(&self, cell_type: CellType) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.cell_type == cell_type)
            .count()
    }

    pub fn player_start(&self) -> Option<&LevelCell> {
        self.cells
            .iter()
            .find(|cell| cell.cell_type == CellType::PlayerStart)
    }

    /// Structural checks a loaded level must pass before anything uses it.
    /// Cell-level invariants are repaired by consumers, not rejected here.
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_cols == 0 || self.grid_rows == 0 {
            return Err(format!(
                "Level validation failed: grid must be non-empty, got {}x{}",
                self.grid_cols, self.grid_rows
            ));
        }
        Ok(())
    }
}

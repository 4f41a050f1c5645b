//! Level data model, grid utilities and level persistence.

pub mod grid;
pub mod storage;
pub mod types;

pub use grid::{
    build_cell_map, cell_center, cell_key, create_default_level, create_default_level_sized,
    flatten_cell_map, pixel_to_cell, CellKey, CellMap, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS,
};
pub use storage::{FileSlots, JsonLevelStore, LevelStore, MemorySlots, SlotBackend, LEVEL_SLOT};
pub use types::{CellType, LevelCell, LevelData, DEFAULT_LEVEL_NAME, LEVEL_FORMAT_VERSION};

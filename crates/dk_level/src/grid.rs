//! Grid coordinates, the sparse position-indexed cell map and the default
//! level generator.

use std::collections::HashMap;
use std::fmt;

use crate::types::{CellType, LevelCell, LevelData, DEFAULT_LEVEL_NAME, LEVEL_FORMAT_VERSION};

pub const DEFAULT_GRID_COLS: u32 = 30;
pub const DEFAULT_GRID_ROWS: u32 = 15;

/// Position key of a grid cell. Distinct `(col, row)` pairs never collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellKey {
    pub row: u32,
    pub col: u32,
}

impl fmt::Display for CellKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.col, self.row)
    }
}

/// Sparse cell storage: absence of a key means empty terrain.
pub type CellMap = HashMap<CellKey, LevelCell>;

pub fn cell_key(col: u32, row: u32) -> CellKey {
    CellKey { row, col }
}

/// Folds cells into a position-indexed map. Later cells overwrite earlier
/// ones at the same position.
pub fn build_cell_map<'a, I>(cells: I) -> CellMap
where
    I: IntoIterator<Item = &'a LevelCell>,
{
    let mut map = CellMap::new();
    for cell in cells {
        map.insert(cell_key(cell.col, cell.row), *cell);
    }
    map
}

/// Inverse of [`build_cell_map`]. Cells come out in row-major order so that
/// saving the same map twice produces the same text.
pub fn flatten_cell_map(map: &CellMap) -> Vec<LevelCell> {
    let mut keyed: Vec<(&CellKey, &LevelCell)> = map.iter().collect();
    keyed.sort_by_key(|(key, _)| **key);
    keyed.into_iter().map(|(_, cell)| *cell).collect()
}

/// Converts a pixel position to a grid coordinate by floor division.
/// Returns `None` for a non-positive tile size. The result may lie outside
/// any particular grid; callers bounds-check against their level.
pub fn pixel_to_cell(px: f32, py: f32, tile_size: u32) -> Option<(i64, i64)> {
    if tile_size == 0 || !px.is_finite() || !py.is_finite() {
        return None;
    }
    let tile = tile_size as f32;
    Some(((px / tile).floor() as i64, (py / tile).floor() as i64))
}

/// Pixel center of a cell, where gameplay places the cell's entity.
pub fn cell_center(col: u32, row: u32, tile_size: u32) -> (f32, f32) {
    let tile = tile_size as f32;
    (
        col as f32 * tile + tile / 2.0,
        row as f32 * tile + tile / 2.0,
    )
}

pub fn create_default_level() -> LevelData {
    create_default_level_sized(DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS)
}

/// Floor across the bottom row, a start two columns in from the left and a
/// goal three columns in from the right, both standing on the floor.
///
/// Grids smaller than 4x2 cannot hold that layout; the markers are clamped
/// into the grid and the later goal wins if they collide.
pub fn create_default_level_sized(grid_cols: u32, grid_rows: u32) -> LevelData {
    let grid_cols = grid_cols.max(1);
    let grid_rows = grid_rows.max(1);
    let floor_row = grid_rows - 1;
    let marker_row = floor_row.saturating_sub(1);

    let mut cells: Vec<LevelCell> = (0..grid_cols)
        .map(|col| LevelCell::new(col, floor_row, CellType::Platform))
        .collect();
    cells.push(LevelCell::new(
        2.min(grid_cols - 1),
        marker_row,
        CellType::PlayerStart,
    ));
    cells.push(LevelCell::new(
        grid_cols.saturating_sub(3),
        marker_row,
        CellType::Goal,
    ));

    LevelData {
        name: DEFAULT_LEVEL_NAME.to_string(),
        grid_cols,
        grid_rows,
        cells: flatten_cell_map(&build_cell_map(&cells)),
        version: LEVEL_FORMAT_VERSION,
    }
}

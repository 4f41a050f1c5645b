//! Collision underlay: the level's `Platform` cells as a solid tile grid.
//!
//! Coordinates are screen space, matching the editor: the origin is the
//! top-left corner of cell (0, 0) and y grows downward.
//!
//! The core algorithm is **axis-separable move-and-slide**: resolve X movement
//! first against the grid, then resolve Y using the already-corrected X position.
//! This prevents diagonal tunneling and produces the "slide along walls" behavior
//! players expect from platformers. Per-step motion must stay under one tile,
//! which the velocity ceiling guarantees for the configured speeds.

use std::collections::HashSet;

use dk_level::{cell_key, CellKey, CellType, LevelData};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn new(center_x: f32, center_y: f32, width: f32, height: f32) -> Self {
        Self {
            center_x,
            center_y,
            half_w: width / 2.0,
            half_h: height / 2.0,
        }
    }

    /// The full tile occupied by a grid cell.
    pub fn from_cell(col: u32, row: u32, tile_size: u32) -> Self {
        let (center_x, center_y) = dk_level::cell_center(col, row, tile_size);
        let tile = tile_size as f32;
        Self::new(center_x, center_y, tile, tile)
    }

    pub fn left(&self) -> f32 {
        self.center_x - self.half_w
    }

    pub fn right(&self) -> f32 {
        self.center_x + self.half_w
    }

    pub fn top(&self) -> f32 {
        self.center_y - self.half_h
    }

    pub fn bottom(&self) -> f32 {
        self.center_y + self.half_h
    }

    /// Half-open containment: the left and top edges are inside.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left() && x < self.right() && y >= self.top() && y < self.bottom()
    }

    /// Strict overlap: boxes that only share an edge do not overlap.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.left() < other.right()
            && other.left() < self.right()
            && self.top() < other.bottom()
            && other.top() < self.bottom()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionMoveResult {
    pub aabb: Aabb,
    pub collided_x: bool,
    pub collided_y: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub blocked_down: bool,
    pub blocked_up: bool,
}

#[derive(Debug, Clone)]
pub struct CollisionGrid {
    pub cell_size: i32,
    pub width: i32,
    pub height: i32,
    solids: HashSet<CellKey>,
}

impl CollisionGrid {
    pub fn new(cell_size: u32, width: u32, height: u32) -> Self {
        Self {
            cell_size: cell_size.max(1) as i32,
            width: width as i32,
            height: height as i32,
            solids: HashSet::new(),
        }
    }

    /// Builds the grid from every in-bounds `Platform` cell of a level.
    pub fn from_level(level: &LevelData, tile_size: u32) -> Self {
        let mut grid = Self::new(tile_size, level.grid_cols, level.grid_rows);
        for cell in &level.cells {
            if cell.cell_type == CellType::Platform && level.contains(cell.col, cell.row) {
                grid.solids.insert(cell_key(cell.col, cell.row));
            }
        }
        grid
    }

    pub fn insert_solid(&mut self, col: u32, row: u32) {
        self.solids.insert(cell_key(col, row));
    }

    pub fn solid_count(&self) -> usize {
        self.solids.len()
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return false;
        }
        self.solids.contains(&cell_key(x as u32, y as u32))
    }

    #[cfg(test)]
    pub fn move_and_collide(&self, aabb: Aabb, dx: f32, dy: f32) -> Aabb {
        self.move_and_collide_detailed(aabb, dx, dy).aabb
    }

    pub fn move_and_collide_detailed(&self, aabb: Aabb, dx: f32, dy: f32) -> CollisionMoveResult {
        const EPS: f32 = 0.0001;

        let resolved_x = self.resolve_axis_x(aabb, dx);
        let x_expected = aabb.center_x + dx;
        let collided_x = (resolved_x - x_expected).abs() > EPS;

        let mut moved = aabb;
        moved.center_x = resolved_x;
        let resolved_y = self.resolve_axis_y(moved, dy);
        let y_expected = aabb.center_y + dy;
        let collided_y = (resolved_y - y_expected).abs() > EPS;
        moved.center_y = resolved_y;

        CollisionMoveResult {
            aabb: moved,
            collided_x,
            collided_y,
            blocked_left: collided_x && dx < 0.0,
            blocked_right: collided_x && dx > 0.0,
            blocked_down: collided_y && dy > 0.0,
            blocked_up: collided_y && dy < 0.0,
        }
    }

    fn resolve_axis_x(&self, aabb: Aabb, dx: f32) -> f32 {
        if dx == 0.0 {
            return aabb.center_x;
        }

        const EPS: f32 = 0.001;
        let mut candidate_x = aabb.center_x + dx;
        let y0 = self.world_to_cell(aabb.top() + EPS);
        let y1 = self.world_to_cell(aabb.bottom() - EPS);

        if dx > 0.0 {
            let x_cell = self.world_to_cell(candidate_x + aabb.half_w - EPS);
            for y in y0..=y1 {
                if self.is_solid(x_cell, y) {
                    candidate_x = candidate_x.min(self.cell_min_edge(x_cell) - aabb.half_w);
                }
            }
            // Never push opposite to the motion.
            candidate_x = candidate_x.max(aabb.center_x);
        } else {
            let x_cell = self.world_to_cell(candidate_x - aabb.half_w + EPS);
            for y in y0..=y1 {
                if self.is_solid(x_cell, y) {
                    candidate_x = candidate_x.max(self.cell_max_edge(x_cell) + aabb.half_w);
                }
            }
            candidate_x = candidate_x.min(aabb.center_x);
        }

        candidate_x
    }

    fn resolve_axis_y(&self, aabb: Aabb, dy: f32) -> f32 {
        if dy == 0.0 {
            return aabb.center_y;
        }

        const EPS: f32 = 0.001;
        let mut candidate_y = aabb.center_y + dy;
        let x0 = self.world_to_cell(aabb.left() + EPS);
        let x1 = self.world_to_cell(aabb.right() - EPS);

        if dy > 0.0 {
            // Falling: the bottom edge meets the top of a tile.
            let y_cell = self.world_to_cell(candidate_y + aabb.half_h - EPS);
            for x in x0..=x1 {
                if self.is_solid(x, y_cell) {
                    candidate_y = candidate_y.min(self.cell_min_edge(y_cell) - aabb.half_h);
                }
            }
            candidate_y = candidate_y.max(aabb.center_y);
        } else {
            let y_cell = self.world_to_cell(candidate_y - aabb.half_h + EPS);
            for x in x0..=x1 {
                if self.is_solid(x, y_cell) {
                    candidate_y = candidate_y.max(self.cell_max_edge(y_cell) + aabb.half_h);
                }
            }
            candidate_y = candidate_y.min(aabb.center_y);
        }

        candidate_y
    }

    fn world_to_cell(&self, world: f32) -> i32 {
        (world / self.cell_size as f32).floor() as i32
    }

    /// Left edge of column `i`, or top edge of row `i`.
    fn cell_min_edge(&self, i: i32) -> f32 {
        (i * self.cell_size) as f32
    }

    /// Right edge of column `i`, or bottom edge of row `i`.
    fn cell_max_edge(&self, i: i32) -> f32 {
        ((i + 1) * self.cell_size) as f32
    }
}

//! Level editor: tool selection, paint/erase gestures over the grid, the
//! toolbar strip and the hand-off to gameplay.
//!
//! Cells live in a position-indexed `CellMap` while editing. Every in-bounds
//! edit flattens the map back into the level and autosaves it through the
//! injected `LevelStore`, so the stored level always matches the screen.

use dk_core::input::{InputState, Key};
use dk_level::{
    build_cell_map, cell_key, create_default_level_sized, flatten_cell_map, pixel_to_cell,
    CellKey, CellMap, CellType, LevelCell, LevelData, LevelStore,
};

use crate::collision::Aabb;
use crate::config::GridConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Paint(CellType),
    Eraser,
}

pub struct ToolDef {
    pub tool: Tool,
    pub label: &'static str,
    pub color: u32,
}

/// Toolbar order. Shortcut keys 1..6 follow the same order.
pub const TOOLS: [ToolDef; 6] = [
    ToolDef {
        tool: Tool::Paint(CellType::Platform),
        label: "Plat",
        color: 0x8b4513,
    },
    ToolDef {
        tool: Tool::Paint(CellType::Spike),
        label: "Spike",
        color: 0xff0000,
    },
    ToolDef {
        tool: Tool::Paint(CellType::Spring),
        label: "Sprng",
        color: 0x00cc44,
    },
    ToolDef {
        tool: Tool::Paint(CellType::PlayerStart),
        label: "Start",
        color: 0xffdd00,
    },
    ToolDef {
        tool: Tool::Paint(CellType::Goal),
        label: "Goal",
        color: 0xff8800,
    },
    ToolDef {
        tool: Tool::Eraser,
        label: "Erase",
        color: 0x888888,
    },
];

const TOOL_KEYS: [Key; 6] = [
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
];

const SWATCH_SIZE: f32 = 20.0;
const SWATCH_GAP: f32 = 6.0;
const SWATCH_START_X: f32 = 10.0;
const PLAY_INSET_X: f32 = 40.0;
const PLAY_SIZE: (f32, f32) = (36.0, 20.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarAction {
    Select(Tool),
    Play,
}

/// The strip below the grid: one swatch per tool and the Play button.
#[derive(Debug, Clone, Copy)]
pub struct Toolbar {
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Toolbar {
    pub fn new(grid: &GridConfig) -> Self {
        Self {
            top: grid.pixel_height(),
            width: grid.pixel_width(),
            height: grid.toolbar_height as f32,
        }
    }

    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }

    pub fn swatch_rect(&self, index: usize) -> Aabb {
        let center_x =
            SWATCH_START_X + index as f32 * (SWATCH_SIZE + SWATCH_GAP) + SWATCH_SIZE / 2.0;
        Aabb::new(center_x, self.center_y(), SWATCH_SIZE, SWATCH_SIZE)
    }

    pub fn play_rect(&self) -> Aabb {
        Aabb::new(
            self.width - PLAY_INSET_X,
            self.center_y(),
            PLAY_SIZE.0,
            PLAY_SIZE.1,
        )
    }

    pub fn hit(&self, x: f32, y: f32) -> Option<ToolbarAction> {
        if let Some(def) = TOOLS
            .iter()
            .enumerate()
            .find(|(i, _)| self.swatch_rect(*i).contains_point(x, y))
            .map(|(_, def)| def)
        {
            return Some(ToolbarAction::Select(def.tool));
        }
        if self.play_rect().contains_point(x, y) {
            return Some(ToolbarAction::Play);
        }
        None
    }
}

/// Hand-off from the editor to a new game session.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayRequest {
    pub level: LevelData,
    pub from_editor: bool,
}

pub struct EditorController {
    store: Box<dyn LevelStore>,
    grid: GridConfig,
    toolbar: Toolbar,
    level: LevelData,
    cells: CellMap,
    tool: Tool,
    painting: bool,
    hover: Option<(u32, u32)>,
    has_spawn: bool,
}

impl EditorController {
    /// Opens the stored level, or the default one when nothing usable is
    /// stored. The level is fitted to the configured grid.
    pub fn open(store: Box<dyn LevelStore>, grid: &GridConfig) -> Self {
        let mut level = match store.load() {
            Some(level) => {
                log::info!(
                    "Editing saved level '{}' ({} cells)",
                    level.name,
                    level.cells.len()
                );
                level
            }
            None => {
                log::info!("No saved level, starting from the default layout");
                create_default_level_sized(grid.cols, grid.rows)
            }
        };

        if level.grid_cols != grid.cols || level.grid_rows != grid.rows {
            log::warn!(
                "Saved level is {}x{}, editor grid is {}x{}",
                level.grid_cols,
                level.grid_rows,
                grid.cols,
                grid.rows
            );
            level.grid_cols = grid.cols;
            level.grid_rows = grid.rows;
        }

        let mut cells = build_cell_map(&level.cells);
        let before = cells.len();
        cells.retain(|_, cell| level.contains(cell.col, cell.row));
        if cells.len() < before {
            log::warn!(
                "Dropped {} cells outside the {}x{} grid",
                before - cells.len(),
                grid.cols,
                grid.rows
            );
        }
        keep_last_unique(&mut cells, &level.cells);
        level.cells = flatten_cell_map(&cells);

        let has_spawn = spawn_present(&cells);
        Self {
            store,
            grid: grid.clone(),
            toolbar: Toolbar::new(grid),
            level,
            cells,
            tool: Tool::Paint(CellType::Platform),
            painting: false,
            hover: None,
            has_spawn,
        }
    }

    pub fn select_tool(&mut self, tool: Tool) {
        if self.tool != tool {
            log::debug!("Selected tool {tool:?}");
        }
        self.tool = tool;
    }

    pub fn selected_tool(&self) -> Tool {
        self.tool
    }

    pub fn cells(&self) -> &CellMap {
        &self.cells
    }

    pub fn cell_at(&self, col: u32, row: u32) -> Option<&LevelCell> {
        self.cells.get(&cell_key(col, row))
    }

    pub fn level(&self) -> &LevelData {
        &self.level
    }

    pub fn grid(&self) -> &GridConfig {
        &self.grid
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn hover(&self) -> Option<(u32, u32)> {
        self.hover
    }

    pub fn is_painting(&self) -> bool {
        self.painting
    }

    pub fn can_play(&self) -> bool {
        self.has_spawn
    }

    /// Applies the current tool at a pixel position. Returns `false` and does
    /// nothing when the position is outside the grid.
    pub fn paint_at(&mut self, px: f32, py: f32) -> bool {
        let Some((col, row)) = self.cell_in_grid(px, py) else {
            return false;
        };
        let key = cell_key(col, row);

        match self.tool {
            Tool::Eraser => {
                self.cells.remove(&key);
            }
            Tool::Paint(cell_type) => {
                if cell_type.is_unique() {
                    let existing: Vec<CellKey> = self
                        .cells
                        .iter()
                        .filter(|(_, cell)| cell.cell_type == cell_type)
                        .map(|(key, _)| *key)
                        .collect();
                    for stale in existing {
                        self.cells.remove(&stale);
                    }
                }
                self.cells.insert(key, LevelCell::new(col, row, cell_type));
            }
        }

        self.has_spawn = spawn_present(&self.cells);
        self.autosave();
        true
    }

    /// Press inside the grid starts a paint stroke. Presses on the toolbar
    /// pick a tool or start the level.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Option<PlayRequest> {
        if y >= self.toolbar.top {
            return match self.toolbar.hit(x, y)? {
                ToolbarAction::Select(tool) => {
                    self.select_tool(tool);
                    None
                }
                ToolbarAction::Play => self.play(),
            };
        }
        self.painting = true;
        self.paint_at(x, y);
        None
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) {
        self.hover = self.cell_in_grid(x, y);
        if self.painting && y < self.toolbar.top {
            self.paint_at(x, y);
        }
    }

    pub fn pointer_up(&mut self) {
        self.painting = false;
    }

    pub fn pointer_left(&mut self) {
        self.hover = None;
        self.painting = false;
    }

    /// Number keys pick tools in toolbar order, Enter plays.
    pub fn handle_shortcuts(&mut self, input: &InputState) -> Option<PlayRequest> {
        if let Some(index) = TOOL_KEYS.iter().position(|&key| input.is_just_pressed(key)) {
            self.select_tool(TOOLS[index].tool);
        }
        if input.is_just_pressed(Key::Enter) {
            return self.play();
        }
        None
    }

    /// Saves and hands the level to gameplay. Refused without a player start.
    pub fn play(&mut self) -> Option<PlayRequest> {
        if !self.has_spawn {
            log::info!("Place a player start before playing");
            return None;
        }
        self.sync_level();
        self.store.save(&self.level);
        log::info!(
            "Saved '{}' with {} cells, starting play",
            self.level.name,
            self.level.cells.len()
        );
        Some(PlayRequest {
            level: self.level.clone(),
            from_editor: true,
        })
    }

    pub fn into_store(self) -> Box<dyn LevelStore> {
        self.store
    }

    fn cell_in_grid(&self, px: f32, py: f32) -> Option<(u32, u32)> {
        let (col, row) = pixel_to_cell(px, py, self.grid.tile_size)?;
        if col < 0 || row < 0 || col >= self.grid.cols as i64 || row >= self.grid.rows as i64 {
            return None;
        }
        Some((col as u32, row as u32))
    }

    fn sync_level(&mut self) {
        self.level.cells = flatten_cell_map(&self.cells);
    }

    fn autosave(&mut self) {
        self.sync_level();
        self.store.save(&self.level);
        log::debug!("Autosaved {} cells", self.level.cells.len());
    }
}

fn spawn_present(cells: &CellMap) -> bool {
    cells
        .values()
        .any(|cell| cell.cell_type == CellType::PlayerStart)
}

/// Stored data may list a unique type more than once; the last listed cell
/// that survived de-duplication is kept.
fn keep_last_unique(cells: &mut CellMap, listed: &[LevelCell]) {
    for &cell_type in CellType::ALL.iter().filter(|t| t.is_unique()) {
        let keep = listed
            .iter()
            .rev()
            .map(|cell| cell_key(cell.col, cell.row))
            .find(|key| cells.get(key).is_some_and(|cell| cell.cell_type == cell_type));
        let Some(keep) = keep else {
            continue;
        };
        let before = cells.len();
        cells.retain(|key, cell| cell.cell_type != cell_type || *key == keep);
        if cells.len() < before {
            log::warn!(
                "Level had {} extra {:?} cells, kept the one at {keep}",
                before - cells.len(),
                cell_type
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dk_level::{JsonLevelStore, MemorySlots};

    fn memory_store() -> Box<dyn LevelStore> {
        Box::new(JsonLevelStore::new(MemorySlots::new()))
    }

    fn store_with(level: &LevelData) -> Box<dyn LevelStore> {
        let mut store = memory_store();
        store.save(level);
        store
    }

    fn fresh_editor() -> EditorController {
        EditorController::open(memory_store(), &GridConfig::default())
    }

    fn empty_editor() -> EditorController {
        EditorController::open(store_with(&LevelData::empty(30, 15)), &GridConfig::default())
    }

    fn px(col: u32, row: u32) -> (f32, f32) {
        dk_level::cell_center(col, row, 16)
    }

    fn count(editor: &EditorController, cell_type: CellType) -> usize {
        editor
            .cells()
            .values()
            .filter(|cell| cell.cell_type == cell_type)
            .count()
    }

    #[test]
    fn opens_default_level_when_storage_is_empty() {
        let editor = fresh_editor();
        assert_eq!(editor.cells().len(), 32);
        assert!(editor.can_play());
        assert_eq!(
            editor.cell_at(2, 13).map(|c| c.cell_type),
            Some(CellType::PlayerStart)
        );
        assert_eq!(editor.selected_tool(), Tool::Paint(CellType::Platform));
    }

    #[test]
    fn opens_stored_level_and_drops_out_of_grid_cells() {
        let mut level = LevelData::empty(30, 15);
        level.cells = vec![
            LevelCell::new(1, 1, CellType::Spike),
            LevelCell::new(40, 1, CellType::Platform),
            LevelCell::new(1, 1, CellType::Spring),
        ];
        let editor = EditorController::open(store_with(&level), &GridConfig::default());
        assert_eq!(editor.cells().len(), 1);
        assert_eq!(
            editor.cell_at(1, 1).map(|c| c.cell_type),
            Some(CellType::Spring)
        );
        assert!(!editor.can_play());
    }

    #[test]
    fn stored_duplicate_starts_keep_the_last_listed() {
        let mut level = LevelData::empty(30, 15);
        level.cells = vec![
            LevelCell::new(1, 1, CellType::PlayerStart),
            LevelCell::new(5, 5, CellType::PlayerStart),
        ];
        let editor = EditorController::open(store_with(&level), &GridConfig::default());
        assert_eq!(count(&editor, CellType::PlayerStart), 1);
        assert!(editor.cell_at(5, 5).is_some());
    }

    #[test]
    fn unique_types_stay_single_across_paints() {
        let mut editor = empty_editor();
        for tool in [CellType::PlayerStart, CellType::Goal] {
            editor.select_tool(Tool::Paint(tool));
            for (col, row) in [(1, 1), (4, 7), (20, 3), (4, 7)] {
                let (x, y) = px(col, row);
                assert!(editor.paint_at(x, y));
                assert_eq!(count(&editor, tool), 1);
            }
            assert_eq!(editor.cell_at(4, 7).map(|c| c.cell_type), Some(tool));
        }
        // Goal painted over the start replaced it.
        assert_eq!(count(&editor, CellType::PlayerStart), 0);
        assert!(!editor.can_play());
    }

    #[test]
    fn repeated_paint_is_idempotent() {
        let mut editor = empty_editor();
        editor.select_tool(Tool::Paint(CellType::Spike));
        let (x, y) = px(3, 3);
        editor.paint_at(x, y);
        let once = editor.cells().clone();
        editor.paint_at(x + 3.0, y - 3.0);
        assert_eq!(editor.cells(), &once);
        assert_eq!(editor.cells().len(), 1);
    }

    #[test]
    fn eraser_removes_exactly_one_cell() {
        let mut editor = fresh_editor();
        let before = editor.cells().len();
        editor.select_tool(Tool::Eraser);

        let (x, y) = px(5, 14);
        assert!(editor.paint_at(x, y));
        assert_eq!(editor.cells().len(), before - 1);
        assert!(editor.cell_at(5, 14).is_none());

        let (x, y) = px(5, 5);
        assert!(editor.paint_at(x, y));
        assert_eq!(editor.cells().len(), before - 1);
    }

    #[test]
    fn out_of_bounds_paint_is_a_no_op() {
        let mut editor = empty_editor();
        assert!(!editor.paint_at(-1.0, 10.0));
        assert!(!editor.paint_at(10.0, 240.0));
        assert!(!editor.paint_at(480.0, 10.0));
        assert!(!editor.paint_at(f32::NAN, 10.0));
        assert!(editor.cells().is_empty());
        assert!(editor.into_store().load().is_some_and(|l| l.cells.is_empty()));
    }

    #[test]
    fn every_edit_autosaves_the_whole_level() {
        let mut editor = empty_editor();
        let (x, y) = px(7, 2);
        editor.paint_at(x, y);
        editor.select_tool(Tool::Paint(CellType::PlayerStart));
        let (x, y) = px(8, 2);
        editor.paint_at(x, y);

        let stored = editor.into_store().load().expect("autosaved level");
        assert_eq!(
            stored.cells,
            vec![
                LevelCell::new(7, 2, CellType::Platform),
                LevelCell::new(8, 2, CellType::PlayerStart),
            ]
        );
    }

    #[test]
    fn drag_paints_until_released_and_ignores_toolbar() {
        let mut editor = empty_editor();
        let (x, y) = px(1, 4);
        assert!(editor.pointer_down(x, y).is_none());
        assert!(editor.is_painting());
        for col in 2..6 {
            let (x, y) = px(col, 4);
            editor.pointer_move(x, y);
        }
        assert_eq!(editor.hover(), Some((5, 4)));
        // Dragging over the toolbar neither paints nor hovers.
        editor.pointer_move(100.0, 250.0);
        assert_eq!(editor.hover(), None);
        editor.pointer_up();
        let (x, y) = px(9, 4);
        editor.pointer_move(x, y);

        assert_eq!(editor.cells().len(), 5);
        assert!(editor.cell_at(9, 4).is_none());
        assert_eq!(editor.hover(), Some((9, 4)));
    }

    #[test]
    fn toolbar_hit_resolves_swatches_and_play() {
        let toolbar = Toolbar::new(&GridConfig::default());
        assert_eq!(
            toolbar.hit(20.0, 255.0),
            Some(ToolbarAction::Select(Tool::Paint(CellType::Platform)))
        );
        assert_eq!(
            toolbar.hit(10.0 + 5.0 * 26.0 + 10.0, 255.0),
            Some(ToolbarAction::Select(Tool::Eraser))
        );
        assert_eq!(toolbar.hit(440.0, 255.0), Some(ToolbarAction::Play));
        // The gap between swatches is dead space.
        assert_eq!(toolbar.hit(32.0, 255.0), None);
    }

    #[test]
    fn toolbar_press_selects_tool_without_painting() {
        let mut editor = empty_editor();
        let spring = toolbar_center(&editor, 2);
        assert!(editor.pointer_down(spring.0, spring.1).is_none());
        assert_eq!(editor.selected_tool(), Tool::Paint(CellType::Spring));
        assert!(!editor.is_painting());
        assert!(editor.cells().is_empty());
    }

    fn toolbar_center(editor: &EditorController, index: usize) -> (f32, f32) {
        let rect = editor.toolbar().swatch_rect(index);
        (rect.center_x, rect.center_y)
    }

    #[test]
    fn number_keys_select_tools() {
        let mut editor = empty_editor();
        let mut input = InputState::new();
        input.key_down(Key::Num6);
        assert!(editor.handle_shortcuts(&input).is_none());
        assert_eq!(editor.selected_tool(), Tool::Eraser);
        input.end_frame();
        input.key_down(Key::Num4);
        editor.handle_shortcuts(&input);
        assert_eq!(editor.selected_tool(), Tool::Paint(CellType::PlayerStart));
    }

    #[test]
    fn play_requires_a_player_start() {
        let mut editor = empty_editor();
        assert!(!editor.can_play());
        assert!(editor.play().is_none());
        let play = editor.toolbar().play_rect();
        assert!(editor.pointer_down(play.center_x, play.center_y).is_none());
    }

    #[test]
    fn play_saves_and_hands_over_the_level() {
        let mut editor = empty_editor();
        for col in 0..30 {
            let (x, y) = px(col, 14);
            editor.paint_at(x, y);
        }
        editor.select_tool(Tool::Paint(CellType::PlayerStart));
        let (x, y) = px(2, 10);
        editor.paint_at(x, y);
        editor.select_tool(Tool::Paint(CellType::Goal));
        let (x, y) = px(25, 10);
        editor.paint_at(x, y);
        assert!(editor.can_play());

        let mut input = InputState::new();
        input.key_down(Key::Enter);
        let request = editor.handle_shortcuts(&input).expect("play allowed");
        assert!(request.from_editor);
        assert_eq!(request.level.cells.len(), 32);
        assert_eq!(
            request.level.player_start(),
            Some(&LevelCell::new(2, 10, CellType::PlayerStart))
        );

        let stored = editor.into_store().load().expect("saved on play");
        assert_eq!(stored, request.level);
    }
}

//! Drawing for both scenes. Everything is flat shapes and text painted into
//! egui's background layer, in game pixels scaled by a letterboxed viewport.

use dk_core::time::TimeState;
use dk_level::{CellType, LevelCell};
use egui::{Align2, Color32, FontId, Painter, Pos2, Rect, Shape, Stroke};

use crate::config::GameConfig;
use crate::editor::{EditorController, Tool, TOOLS};
use crate::gameplay::GameSession;
use crate::player::{Facing, JumpPhase};
use crate::scenes::ActiveScene;

const GRID_LINE: Color32 = Color32::from_rgba_premultiplied(20, 20, 31, 77);
const TOOLBAR_BG: u32 = 0x222233;
const LABEL: u32 = 0xaaaaaa;
const HINT: u32 = 0x88ff88;
const PLAY_BG: u32 = 0x226622;
const PLAYER: u32 = 0x4fa3ff;
const DISABLED_ALPHA: f32 = 0.4;

/// Maps game pixels onto screen points, keeping the aspect ratio and
/// centering the game area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub zoom: f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl Viewport {
    pub fn fit(screen_w: f32, screen_h: f32, game_w: f32, game_h: f32) -> Self {
        let zoom = (screen_w / game_w).min(screen_h / game_h).max(0.01);
        Self {
            zoom,
            offset_x: (screen_w - game_w * zoom) / 2.0,
            offset_y: (screen_h - game_h * zoom) / 2.0,
        }
    }

    pub fn to_screen(&self, x: f32, y: f32) -> Pos2 {
        Pos2::new(self.offset_x + x * self.zoom, self.offset_y + y * self.zoom)
    }

    pub fn to_game(&self, screen_x: f32, screen_y: f32) -> (f32, f32) {
        (
            (screen_x - self.offset_x) / self.zoom,
            (screen_y - self.offset_y) / self.zoom,
        )
    }

    pub fn rect(&self, x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect::from_min_max(self.to_screen(x, y), self.to_screen(x + w, y + h))
    }

    fn font(&self, px: f32) -> FontId {
        FontId::proportional(px * self.zoom)
    }
}

pub fn rgb(hex: u32) -> Color32 {
    Color32::from_rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

fn tool_color(tool: Tool) -> Color32 {
    TOOLS
        .iter()
        .find(|def| def.tool == tool)
        .map(|def| rgb(def.color))
        .unwrap_or(Color32::WHITE)
}

pub fn draw_scene(ctx: &egui::Context, scene: &ActiveScene, config: &GameConfig) {
    let screen = ctx.screen_rect();
    let viewport = Viewport::fit(
        screen.width(),
        screen.height(),
        config.display.width as f32,
        config.display.height as f32,
    );
    let painter = ctx.layer_painter(egui::LayerId::background());
    match scene {
        ActiveScene::Editor(editor) => draw_editor(&painter, &viewport, editor, config),
        ActiveScene::Game { session, .. } => draw_game(&painter, &viewport, session, config),
    }
}

fn draw_editor(painter: &Painter, vp: &Viewport, editor: &EditorController, config: &GameConfig) {
    let grid = editor.grid();
    let tile = grid.tile_size as f32;
    let (grid_w, grid_h) = (grid.pixel_width(), grid.pixel_height());
    let line = Stroke::new(1.0, GRID_LINE);

    for col in 0..=grid.cols {
        let x = col as f32 * tile;
        painter.line_segment([vp.to_screen(x, 0.0), vp.to_screen(x, grid_h)], line);
    }
    for row in 0..=grid.rows {
        let y = row as f32 * tile;
        painter.line_segment([vp.to_screen(0.0, y), vp.to_screen(grid_w, y)], line);
    }

    for cell in editor.cells().values() {
        draw_cell(painter, vp, cell, tile);
    }

    if let Some((col, row)) = editor.hover() {
        let rect = vp.rect(col as f32 * tile, row as f32 * tile, tile, tile);
        outline(
            painter,
            rect,
            Stroke::new(2.0, Color32::WHITE.gamma_multiply(0.5)),
        );
    }

    draw_toolbar(painter, vp, editor, config);

    painter.text(
        vp.to_screen(config.display.width as f32 / 2.0, 8.0),
        Align2::CENTER_TOP,
        "Click to place blocks!",
        vp.font(10.0),
        rgb(HINT),
    );
}

fn draw_toolbar(painter: &Painter, vp: &Viewport, editor: &EditorController, config: &GameConfig) {
    let toolbar = editor.toolbar();
    painter.rect_filled(
        vp.rect(
            0.0,
            toolbar.top,
            config.display.width as f32,
            toolbar.height,
        ),
        0.0,
        rgb(TOOLBAR_BG),
    );

    for (i, def) in TOOLS.iter().enumerate() {
        let swatch = toolbar.swatch_rect(i);
        let rect = vp.rect(
            swatch.left(),
            swatch.top(),
            swatch.half_w * 2.0,
            swatch.half_h * 2.0,
        );
        if def.tool == editor.selected_tool() {
            outline(
                painter,
                rect.expand(2.0 * vp.zoom),
                Stroke::new(2.0, Color32::WHITE),
            );
        }
        painter.rect_filled(rect, 0.0, rgb(def.color));
        painter.text(
            vp.to_screen(swatch.center_x, swatch.bottom() + 2.0),
            Align2::CENTER_TOP,
            def.label,
            vp.font(6.0),
            rgb(LABEL),
        );
    }

    let play = toolbar.play_rect();
    let alpha = if editor.can_play() {
        1.0
    } else {
        DISABLED_ALPHA
    };
    painter.rect_filled(
        vp.rect(play.left(), play.top(), play.half_w * 2.0, play.half_h * 2.0),
        0.0,
        rgb(PLAY_BG).gamma_multiply(alpha),
    );
    painter.text(
        vp.to_screen(play.center_x, play.center_y),
        Align2::CENTER_CENTER,
        "Play",
        vp.font(12.0),
        Color32::WHITE.gamma_multiply(alpha),
    );
}

fn draw_cell(painter: &Painter, vp: &Viewport, cell: &LevelCell, tile: f32) {
    let x = cell.col as f32 * tile;
    let y = cell.row as f32 * tile;
    let color = tool_color(Tool::Paint(cell.cell_type));
    match cell.cell_type {
        CellType::Platform | CellType::Spring => {
            painter.rect_filled(vp.rect(x, y, tile, tile), 0.0, color);
        }
        CellType::Spike => {
            painter.add(Shape::convex_polygon(
                vec![
                    vp.to_screen(x, y + tile),
                    vp.to_screen(x + tile, y + tile),
                    vp.to_screen(x + tile / 2.0, y),
                ],
                color,
                Stroke::NONE,
            ));
        }
        CellType::PlayerStart => {
            painter.circle_filled(
                vp.to_screen(x + tile / 2.0, y + tile / 2.0),
                tile / 3.0 * vp.zoom,
                color,
            );
        }
        CellType::Goal => {
            painter.rect_filled(vp.rect(x + 2.0, y + 2.0, tile - 4.0, tile - 4.0), 0.0, color);
        }
    }
}

fn draw_game(painter: &Painter, vp: &Viewport, session: &GameSession, config: &GameConfig) {
    let tile = session.tile_size() as f32;
    let level = session.level();
    for cell in &level.cells {
        if cell.cell_type != CellType::PlayerStart && level.contains(cell.col, cell.row) {
            draw_cell(painter, vp, cell, tile);
        }
    }

    draw_player(painter, vp, session, config.player.display_size);

    let width = config.display.width as f32;
    painter.text(
        vp.to_screen(10.0, 10.0),
        Align2::LEFT_TOP,
        &level.name,
        vp.font(12.0),
        Color32::WHITE,
    );
    if session.from_editor() {
        painter.text(
            vp.to_screen(width - 10.0, 10.0),
            Align2::RIGHT_TOP,
            "E: edit",
            vp.font(10.0),
            rgb(HINT),
        );
    }
    painter.text(
        vp.to_screen(width / 2.0, config.display.height as f32 - 8.0),
        Align2::CENTER_CENTER,
        "Arrow keys to move, Space/Up to jump",
        vp.font(9.0),
        rgb(LABEL),
    );

    if let Some(message) = session.message() {
        painter.text(
            vp.to_screen(width / 2.0, config.grid.pixel_height() / 2.0),
            Align2::CENTER_CENTER,
            message,
            vp.font(24.0),
            Color32::WHITE,
        );
    }
}

fn draw_player(painter: &Painter, vp: &Viewport, session: &GameSession, size: f32) {
    let player = session.player();
    let center = session.player_aabb();
    let (sin, cos) = player.angle().to_radians().sin_cos();
    let rotate = |dx: f32, dy: f32| {
        vp.to_screen(
            center.center_x + dx * cos - dy * sin,
            center.center_y + dx * sin + dy * cos,
        )
    };

    let half = size / 2.0;
    let color = rgb(PLAYER).gamma_multiply(player.alpha());
    painter.add(Shape::convex_polygon(
        vec![
            rotate(-half, -half),
            rotate(half, -half),
            rotate(half, half),
            rotate(-half, half),
        ],
        color,
        Stroke::NONE,
    ));

    let eye_x = match player.facing() {
        Facing::Left => -half / 2.0,
        Facing::Right => half / 2.0,
    };
    painter.circle_filled(
        rotate(eye_x, -half / 3.0),
        1.5 * vp.zoom,
        Color32::WHITE.gamma_multiply(player.alpha()),
    );
}

fn outline(painter: &Painter, rect: Rect, stroke: Stroke) {
    let corners = [
        rect.left_top(),
        rect.right_top(),
        rect.right_bottom(),
        rect.left_bottom(),
    ];
    for (from, to) in corners.iter().zip(corners.iter().cycle().skip(1)) {
        painter.line_segment([*from, *to], stroke);
    }
}

/// F3 panel.
pub fn draw_debug_window(ctx: &egui::Context, time: &TimeState, scene: Option<&ActiveScene>) {
    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .show(ctx, |ui| {
            ui.label(format!("FPS: {:.1}", time.smoothed_fps));
            ui.label(format!("Steps this frame: {}", time.steps_this_frame));
            ui.label(format!("Total steps: {}", time.fixed_step_count));
            ui.label(format!("Frame: {}", time.frame_count));
            ui.separator();
            match scene {
                Some(ActiveScene::Editor(editor)) => {
                    ui.label("Scene: editor");
                    ui.label(format!("Level: {}", editor.level().name));
                    ui.label(format!("Cells: {}", editor.cells().len()));
                    ui.label(format!("Tool: {:?}", editor.selected_tool()));
                    match editor.hover() {
                        Some((col, row)) => {
                            let under = editor
                                .cell_at(col, row)
                                .map_or("empty", |cell| cell.cell_type.label());
                            ui.label(format!("Hover: {col},{row} ({under})"))
                        }
                        None => ui.label("Hover: -"),
                    };
                    ui.label(format!("Painting: {}", editor.is_painting()));
                    ui.label(format!("Can play: {}", editor.can_play()));
                }
                Some(ActiveScene::Game { session, .. }) => {
                    let body = session.physics().body(session.player().body_handle());
                    let player = session.player();
                    ui.label("Scene: game");
                    ui.label(format!(
                        "Pos: {:.1}, {:.1}",
                        body.aabb.center_x, body.aabb.center_y
                    ));
                    ui.label(format!("Vel: {:.1}, {:.1}", body.velocity.x, body.velocity.y));
                    let phase = match player.phase() {
                        JumpPhase::Grounded => "grounded",
                        JumpPhase::Airborne => "airborne",
                        JumpPhase::Spinning => "spinning",
                    };
                    ui.label(format!("Jumps: {} ({phase})", player.jump_count()));
                    if player.is_spinning() {
                        ui.label(format!("Angle: {:.0}", player.angle()));
                    }
                    ui.label(format!("Triggers: {}", session.triggers().len()));
                    ui.label(format!("Outcome: {:?}", session.outcome()));
                    if session.pending_transitions() > 0 {
                        ui.label("Transition pending");
                    }
                }
                None => {
                    ui.label("Scene: -");
                }
            }
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_letterboxes_wide_windows() {
        let vp = Viewport::fit(1200.0, 540.0, 480.0, 270.0);
        assert_eq!(vp.zoom, 2.0);
        assert_eq!(vp.offset_x, 120.0);
        assert_eq!(vp.offset_y, 0.0);
        assert_eq!(vp.to_screen(10.0, 20.0), Pos2::new(140.0, 40.0));
        assert_eq!(vp.to_game(140.0, 40.0), (10.0, 20.0));
    }

    #[test]
    fn viewport_survives_zero_sized_screen() {
        let vp = Viewport::fit(0.0, 0.0, 480.0, 270.0);
        assert!(vp.zoom > 0.0);
        assert!(vp.to_game(0.0, 0.0).0.is_finite());
    }

    #[test]
    fn hex_colors_unpack_channels() {
        assert_eq!(rgb(0x8b4513), Color32::from_rgb(0x8b, 0x45, 0x13));
        assert_eq!(tool_color(Tool::Eraser), rgb(0x888888));
    }
}

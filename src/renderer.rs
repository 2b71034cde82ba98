use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::widgets::Block;

use crate::config::{
    BORDER_WALLED, BORDER_WRAP, GLYPH_FOOD, GLYPH_POWER_UP, GLYPH_SNAKE_BODY, GLYPH_SNAKE_HEAD,
    GLYPH_SNAKE_TAIL, GridSize, Theme,
};
use crate::game::{GameSnapshot, GameStatus};
use crate::geometry::BoundaryMode;
use crate::snake::Position;
use crate::ui::hud::render_hud;
use crate::ui::menu::{render_game_over_menu, render_pause_menu, render_start_menu};

/// Renders the full game frame from an immutable snapshot.
pub fn render(frame: &mut Frame<'_>, snapshot: &GameSnapshot, theme: &Theme) {
    let area = frame.area();
    let play_area = render_hud(frame, area, snapshot, theme);

    let border = match snapshot.boundary_mode {
        BoundaryMode::Walled => BORDER_WALLED,
        BoundaryMode::Wrap => BORDER_WRAP,
    };
    let block = Block::bordered()
        .border_set(border)
        .border_style(Style::new().fg(theme.border_fg).bg(theme.border_bg));

    let inner = block.inner(play_area);
    frame.render_widget(block, play_area);

    if let Some(food) = snapshot.food {
        render_cell(
            frame,
            inner,
            snapshot.bounds,
            food,
            GLYPH_FOOD,
            Style::new().fg(theme.food),
        );
    }
    if let Some(power_up) = snapshot.power_up {
        render_cell(
            frame,
            inner,
            snapshot.bounds,
            power_up,
            GLYPH_POWER_UP,
            Style::new().fg(theme.power_up).add_modifier(Modifier::BOLD),
        );
    }
    render_snake(frame, inner, snapshot, theme);

    match snapshot.status {
        GameStatus::Ready => render_start_menu(frame, play_area, snapshot, theme),
        GameStatus::Paused => render_pause_menu(frame, play_area),
        GameStatus::GameOver => render_game_over_menu(frame, play_area, snapshot),
        GameStatus::Running => {}
    }
}

fn render_snake(frame: &mut Frame<'_>, inner: Rect, snapshot: &GameSnapshot, theme: &Theme) {
    let last = snapshot.snake.len().saturating_sub(1);

    for (index, segment) in snapshot.snake.iter().enumerate() {
        let (glyph, style) = match index {
            0 => (
                GLYPH_SNAKE_HEAD,
                Style::new()
                    .fg(theme.snake_head)
                    .add_modifier(Modifier::BOLD),
            ),
            i if i == last => (GLYPH_SNAKE_TAIL, Style::new().fg(theme.snake_tail)),
            _ => (GLYPH_SNAKE_BODY, Style::new().fg(theme.snake_body)),
        };
        render_cell(frame, inner, snapshot.bounds, *segment, glyph, style);
    }
}

fn render_cell(
    frame: &mut Frame<'_>,
    inner: Rect,
    bounds: GridSize,
    position: Position,
    glyph: &str,
    style: Style,
) {
    let Some((x, y)) = logical_to_terminal(inner, bounds, position) else {
        return;
    };

    frame.buffer_mut().set_string(x, y, glyph, style);
}

/// Each logical cell is two terminal columns wide so the board looks square.
fn logical_to_terminal(inner: Rect, bounds: GridSize, position: Position) -> Option<(u16, u16)> {
    if !position.is_within_bounds(bounds) {
        return None;
    }

    let x_offset = u16::try_from(position.x).ok()?.checked_mul(2)?;
    let y_offset = u16::try_from(position.y).ok()?;

    let x = inner.x.saturating_add(x_offset);
    let y = inner.y.saturating_add(y_offset);
    if x >= inner.right() || y >= inner.bottom() {
        return None;
    }

    Some((x, y))
}

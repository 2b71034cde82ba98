use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::config::{GLYPH_POWER_UP, Theme};
use crate::game::GameSnapshot;

const SEPARATOR: &str = " │ ";

/// Renders the two-line HUD and returns the remaining play area above it.
#[must_use]
pub fn render_hud(
    frame: &mut Frame<'_>,
    area: Rect,
    snapshot: &GameSnapshot,
    theme: &Theme,
) -> Rect {
    let [play_area, score_area, status_area] = Layout::vertical([
        Constraint::Min(0),
        Constraint::Length(1),
        Constraint::Length(1),
    ])
    .areas(area);

    let top_line = top_info_line(snapshot, usize::from(score_area.width), theme);
    frame.render_widget(
        Paragraph::new(top_line)
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::DarkGray)),
        score_area,
    );

    frame.render_widget(
        Paragraph::new(bottom_info_line(snapshot, theme))
            .alignment(Alignment::Right)
            .style(Style::default().fg(Color::DarkGray)),
        status_area,
    );

    play_area
}

fn top_info_line(snapshot: &GameSnapshot, available_width: usize, theme: &Theme) -> Line<'static> {
    let speed = format!("{:.2}x", snapshot.speed_multiplier);
    let best = snapshot.best_score();
    let full_width = top_info_width(snapshot.length, &speed, snapshot.score, best, false);
    let compact = full_width > available_width;

    let (length_label, speed_label, score_label, best_label) = if compact {
        ("L", "V", "S", "H")
    } else {
        ("Length", "Speed", "Score", "Hi")
    };

    let best_color = if snapshot.score > snapshot.high_score {
        theme.hud_score
    } else {
        theme.hud_muted
    };
    let value_style = Style::default().fg(Color::White);
    let score_style = Style::default().fg(theme.hud_score);

    Line::from(vec![
        Span::raw(format!("{length_label}: ")),
        Span::styled(snapshot.length.to_string(), value_style),
        Span::raw(SEPARATOR),
        Span::raw(format!("{speed_label}: ")),
        Span::styled(speed, value_style),
        Span::raw(SEPARATOR),
        Span::raw(format!("{score_label}: ")),
        Span::styled(snapshot.score.to_string(), score_style),
        Span::raw(SEPARATOR),
        Span::raw(format!("{best_label}: ")),
        Span::styled(best.to_string(), Style::default().fg(best_color)),
    ])
}

fn top_info_width(length: usize, speed: &str, score: u32, best: u32, compact: bool) -> usize {
    let labels = if compact {
        4
    } else {
        "Length".len() + "Speed".len() + "Score".len() + "Hi".len()
    };
    let values = format!("{length}{speed}{score}{best}").len();

    // Four ": " pairs and three separators.
    labels + values + 4 * 2 + 3 * SEPARATOR.chars().count()
}

fn bottom_info_line(snapshot: &GameSnapshot, theme: &Theme) -> Line<'static> {
    let bounds = snapshot.bounds;
    let mut spans = vec![
        Span::raw(format!("{}x{}", bounds.width, bounds.height)),
        Span::raw(SEPARATOR),
        Span::raw(format!("mode: {}", snapshot.boundary_mode.label())),
    ];

    if let Some(remaining) = snapshot.power_up_remaining {
        let glyph_style = Style::default().fg(theme.power_up);
        spans.push(Span::raw(SEPARATOR));
        spans.push(Span::styled(GLYPH_POWER_UP, glyph_style));
        spans.push(Span::raw(format!(" {:.1}s", remaining.as_secs_f32())));
    }

    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::top_info_width;

    #[test]
    fn compact_labels_are_narrower() {
        let full = top_info_width(12, "1.44x", 420, 900, false);
        let compact = top_info_width(12, "1.44x", 420, 900, true);

        assert!(compact < full);
        assert_eq!(full - compact, "LengthSpeedScoreHi".len() - 4);
    }
}

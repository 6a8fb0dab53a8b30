use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph, Wrap},
};

use crate::ui::{components::card::Card, theme::Theme};

fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(height),
            Constraint::Min(0),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(width),
            Constraint::Min(0),
        ])
        .split(vertical[1]);

    horizontal[1]
}

/// A startup error the user has to acknowledge before the program exits.
pub fn render(frame: &mut Frame<'_>, area: Rect, message: &str) {
    let theme = Theme::default();

    let chars = message.chars().count();
    let width = u16::try_from(chars)
        .unwrap_or(u16::MAX)
        .saturating_add(6)
        .clamp(30, area.width.clamp(30, 72));
    let text_width = usize::from(width.saturating_sub(4).max(1));
    let text_rows = u16::try_from(chars.div_ceil(text_width)).unwrap_or(u16::MAX);
    let card_area = centered_box(width, text_rows.saturating_add(4), area);

    frame.render_widget(Clear, card_area);

    let lines = vec![
        Line::from(Span::styled(message, Style::default().fg(theme.error))),
        Line::from(""),
        Line::from(Span::styled(
            "press any key to exit",
            Style::default().fg(theme.dim),
        )),
    ];
    Card::new("error", &theme).render_with(
        frame,
        card_area,
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true }),
    );
}

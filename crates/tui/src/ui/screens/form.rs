use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Clear, List, ListItem, Paragraph},
};

use engine::{DATE_FORMAT, Field};

use crate::{
    app::AppState,
    ui::{
        components::{card::Card, hints, status},
        theme::Theme,
    },
};

const LABEL_WIDTH: u16 = 18;

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState) {
    let theme = Theme::default();

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                           // Title bar
            Constraint::Length(Field::ALL.len() as u16 + 2), // Fields
            Constraint::Min(4),                              // Preview
            Constraint::Length(1),                           // Status
            Constraint::Length(1),                           // Hints
        ])
        .split(area);

    render_title(frame, layout[0], state, &theme);
    let rows = render_fields(frame, layout[1], state, &theme);
    render_preview(frame, layout[2], state, &theme);
    status::render(frame, layout[3], state, &theme);
    render_hints(frame, layout[4], state, &theme);

    if let Some(index) = Field::ALL.iter().position(|f| *f == state.focus)
        && let Some(row) = rows.get(index)
    {
        render_completion(frame, *row, area, state, &theme);
    }
}

fn render_title(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let mut spans = vec![
        Span::styled(
            "Record purchase",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  →  ", Style::default().fg(theme.border)),
        Span::styled(state.journal_path.as_str(), Style::default().fg(theme.dim)),
    ];
    if state.dry_run {
        spans.push(Span::styled("  DRY RUN", Style::default().fg(theme.error)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Draws one row per field and returns the rows' areas.
fn render_fields(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) -> Vec<Rect> {
    let card = Card::new("purchase", theme).focused(true);
    let inner = card.inner(area);
    frame.render_widget(card.block(), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(Field::ALL.map(|_| Constraint::Length(1)))
        .split(inner);

    for (field, row) in Field::ALL.iter().zip(rows.iter()) {
        let focused = *field == state.focus;
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(LABEL_WIDTH), Constraint::Min(0)])
            .split(*row);

        let label_style = if focused {
            Style::default().fg(theme.accent)
        } else {
            Style::default().fg(theme.dim)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(field.label(), label_style)),
            columns[0],
        );
        frame.render_widget(
            Paragraph::new(field_line(*field, focused, state, theme)),
            columns[1],
        );
    }

    rows.to_vec()
}

fn field_line(field: Field, focused: bool, state: &AppState, theme: &Theme) -> Line<'static> {
    let form = &state.form;
    let cursor = if focused { "│" } else { "" };
    let value_style = if focused {
        Style::default().fg(theme.text)
    } else {
        Style::default().fg(theme.dim)
    };

    match field {
        Field::Clearing => {
            let mark = if form.clearing() { "[x]" } else { "[ ]" };
            Line::from(Span::styled(mark, value_style))
        }
        Field::Date | Field::ClearingDate => {
            if field == Field::ClearingDate && !form.clearing() {
                return Line::from(Span::styled("-", Style::default().fg(theme.border)));
            }
            let date = if field == Field::Date {
                form.date()
            } else {
                form.clearing_date()
            };
            let shown = match (&state.date_input, focused) {
                (Some(input), true) => input.clone(),
                _ => date.format(DATE_FORMAT).to_string(),
            };
            Line::from(Span::styled(format!("{shown}{cursor}"), value_style))
        }
        Field::Amount => {
            let text = form.text(field).unwrap_or_default();
            let mut spans = vec![Span::styled(format!("{text}{cursor}"), value_style)];
            if let Some(commodity) = form.default_commodity() {
                spans.push(Span::styled(
                    format!("  ({commodity})"),
                    Style::default().fg(theme.border),
                ));
            }
            Line::from(spans)
        }
        Field::Description | Field::Expense | Field::Asset => {
            let text = form.text(field).unwrap_or_default();
            Line::from(Span::styled(format!("{text}{cursor}"), value_style))
        }
    }
}

fn render_preview(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let lines: Vec<Line<'_>> = state
        .form
        .preview()
        .lines()
        .map(|line| Line::from(Span::styled(line.to_string(), Style::default().fg(theme.text))))
        .collect();
    Card::new("preview", theme).render_with(frame, area, Paragraph::new(lines));
}

fn render_hints(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let completing = !state.completion.candidates.is_empty();
    let mut spans = hints::hints_to_spans(&hints::field_hints(state.focus, completing), theme);
    if !spans.is_empty() {
        spans.push(hints::hint_separator(theme));
    }
    spans.extend(hints::hints_to_spans(&hints::global_hints(), theme));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Candidate accounts drawn just under the focused row.
fn render_completion(
    frame: &mut Frame<'_>,
    row: Rect,
    screen: Rect,
    state: &AppState,
    theme: &Theme,
) {
    let candidates = &state.completion.candidates;
    if candidates.is_empty() {
        return;
    }

    let x = row.x + LABEL_WIDTH;
    let width = candidates
        .iter()
        .map(|c| c.chars().count() as u16 + 4)
        .max()
        .unwrap_or(0)
        .min(screen.width.saturating_sub(x));
    let height = (candidates.len() as u16 + 2).min(screen.height.saturating_sub(row.y + 1));
    if width == 0 || height < 3 {
        return;
    }
    let popup = Rect {
        x,
        y: row.y + 1,
        width,
        height,
    };

    let items: Vec<ListItem<'_>> = candidates
        .iter()
        .enumerate()
        .map(|(i, candidate)| {
            let style = if state.completion.selected == Some(i) {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(theme.text)
            };
            ListItem::new(Span::styled(candidate.as_str(), style))
        })
        .collect();

    frame.render_widget(Clear, popup);
    frame.render_widget(
        List::new(items).block(Card::new("accounts", theme).block()),
        popup,
    );
}

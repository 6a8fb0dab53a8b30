use ratatui::{style::Style, text::Span};

use engine::Field;

use crate::ui::theme::Theme;

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::raw(format!(" {}", hint.action)));
    }

    spans
}

pub fn hint_separator(theme: &Theme) -> Span<'static> {
    Span::styled("  │  ", Style::default().fg(theme.border))
}

/// Hints for the focused field, shown before the global ones.
pub fn field_hints(field: Field, completing: bool) -> Vec<KeyHint> {
    match field {
        Field::Expense | Field::Asset if completing => vec![
            KeyHint::new("↑↓", "choose"),
            KeyHint::new("→", "complete"),
        ],
        Field::Date | Field::ClearingDate => vec![
            KeyHint::new("↑↓", "day"),
            KeyHint::new("PgUp/PgDn", "month"),
        ],
        Field::Clearing => vec![KeyHint::new("Space", "toggle")],
        _ => Vec::new(),
    }
}

pub fn global_hints() -> Vec<KeyHint> {
    vec![
        KeyHint::new("Tab", "next"),
        KeyHint::new("Enter", "save"),
        KeyHint::new("Esc", "quit"),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn completion_hints_only_while_completing() {
        assert!(field_hints(Field::Expense, false).is_empty());
        assert_eq!(field_hints(Field::Expense, true)[1].action, "complete");
        assert_eq!(field_hints(Field::Date, false)[0].action, "day");
    }
}

use ratatui::{
    Frame,
    layout::Rect,
    style::Style,
    text::Span,
    widgets::Paragraph,
};

use engine::SAVED_MESSAGE;

use crate::{
    app::{AppState, NoticeLevel},
    ui::theme::Theme,
};

/// One line under the form: an app notice wins over the form's own status.
pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let (message, style) = if let Some(notice) = &state.notice {
        let color = match notice.level {
            NoticeLevel::Info => theme.dim,
            NoticeLevel::Error => theme.error,
        };
        (notice.message.as_str(), Style::default().fg(color))
    } else if let Some(status) = state.form.status() {
        let color = if status == SAVED_MESSAGE {
            theme.positive
        } else {
            theme.error
        };
        (status, Style::default().fg(color))
    } else {
        return;
    };

    frame.render_widget(Paragraph::new(Span::styled(message, style)), area);
}

use std::{sync::Arc, time::Duration};

use chrono::{Days, Local, Months, NaiveDate};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use engine::{Field, Journal, JournalSnapshot, PurchaseForm, PurchaseSink, SubmitError};
use tokio::sync::oneshot::{self, error::TryRecvError};

use crate::{
    error::Result,
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

const COMPLETION_LIMIT: usize = 6;
const DATE_INPUT_FORMATS: [&str; 2] = ["%Y-%m-%d", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message that is not a validation result, e.g. a failed write.
#[derive(Debug, Clone)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct CompletionState {
    pub candidates: Vec<String>,
    pub selected: Option<usize>,
}

impl CompletionState {
    fn clear(&mut self) {
        self.candidates.clear();
        self.selected = None;
    }

    fn select_next(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % self.candidates.len(),
            None => 0,
        });
    }

    fn select_prev(&mut self) {
        if self.candidates.is_empty() {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => self.candidates.len() - 1,
            Some(i) => i - 1,
        });
    }

    fn chosen(&self) -> Option<&str> {
        self.candidates
            .get(self.selected.unwrap_or(0))
            .map(String::as_str)
    }
}

#[derive(Debug)]
pub struct AppState {
    pub form: PurchaseForm,
    pub focus: Field,
    pub completion: CompletionState,
    /// Text typed into the focused date field that has not become a date yet.
    pub date_input: Option<String>,
    pub notice: Option<Notice>,
    pub journal_path: String,
    pub dry_run: bool,
}

pub struct App {
    pub state: AppState,
    journal: Arc<Journal>,
    sink: Box<dyn PurchaseSink + Send>,
    loader: Option<oneshot::Receiver<JournalSnapshot>>,
    initial_description: Option<String>,
    should_quit: bool,
}

impl App {
    pub fn new(
        journal: Journal,
        form: PurchaseForm,
        sink: Box<dyn PurchaseSink + Send>,
        dry_run: bool,
        initial_description: Option<String>,
    ) -> Self {
        let state = AppState {
            form,
            focus: Field::Description,
            completion: CompletionState::default(),
            date_input: None,
            notice: Some(Notice {
                level: NoticeLevel::Info,
                message: "Loading accounts...".to_string(),
            }),
            journal_path: journal.path().display().to_string(),
            dry_run,
        };

        Self {
            state,
            journal: Arc::new(journal),
            sink,
            loader: None,
            initial_description,
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        terminal.draw(|frame| ui::render(frame, &self.state))?;
        self.start_loader();

        while !self.should_quit {
            self.poll_loader();
            terminal.draw(|frame| ui::render(frame, &self.state))?;

            if event::poll(tick_rate)? {
                match event::read()? {
                    Event::Key(key) if key.kind == KeyEventKind::Press => self.handle_key(key),
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Reads accounts and commodities off the UI thread, once, after the
    /// form is first on screen.
    fn start_loader(&mut self) {
        if self.loader.is_some() || self.state.form.is_loaded() {
            return;
        }
        let (tx, rx) = oneshot::channel();
        let journal = Arc::clone(&self.journal);
        tokio::task::spawn_blocking(move || {
            let snapshot = journal.snapshot();
            tracing::debug!(accounts = snapshot.accounts.len(), "journal scanned");
            let _ = tx.send(snapshot);
        });
        self.loader = Some(rx);
    }

    fn poll_loader(&mut self) {
        let Some(rx) = self.loader.as_mut() else {
            return;
        };
        match rx.try_recv() {
            Ok(snapshot) => {
                self.loader = None;
                self.finish_loading(snapshot);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Closed) => {
                self.loader = None;
                tracing::error!("account loader stopped without a result");
                self.state.notice = Some(Notice {
                    level: NoticeLevel::Error,
                    message: "Could not read accounts from the journal".to_string(),
                });
            }
        }
    }

    fn finish_loading(&mut self, snapshot: JournalSnapshot) {
        let focus = self
            .state
            .form
            .apply_snapshot(snapshot, self.initial_description.as_deref());
        if focus != Field::Description {
            self.set_focus(focus);
        }
        self.state.notice = None;
    }

    fn handle_key(&mut self, key: KeyEvent) {
        match map_key(key) {
            AppAction::Quit => self.close(),
            AppAction::NextField => self.move_focus(1),
            AppAction::PrevField => self.move_focus(-1),
            AppAction::Submit => self.submit(),
            AppAction::Backspace => self.backspace(),
            AppAction::Up => self.up_down(-1),
            AppAction::Down => self.up_down(1),
            AppAction::PageUp => self.shift_month(-1),
            AppAction::PageDown => self.shift_month(1),
            AppAction::Accept => self.accept_completion(),
            AppAction::Input(ch) => self.input(ch),
            AppAction::None => {}
        }
    }

    fn set_focus(&mut self, field: Field) {
        self.state.focus = field;
        self.state.date_input = None;
        self.state.completion.clear();
    }

    fn move_focus(&mut self, step: isize) {
        let fields = Field::ALL;
        let current = fields
            .iter()
            .position(|f| *f == self.state.focus)
            .unwrap_or(0);
        let next = (current as isize + step).rem_euclid(fields.len() as isize) as usize;
        self.set_focus(fields[next]);
    }

    fn input(&mut self, ch: char) {
        let focus = self.state.focus;
        if focus == Field::Clearing {
            if ch == ' ' {
                let clearing = !self.state.form.clearing();
                self.state.form.set_clearing(clearing);
            }
            return;
        }
        if is_date_field(focus) {
            if ch.is_ascii_digit() || ch == '-' || ch == '/' {
                self.state.date_input.get_or_insert_with(String::new).push(ch);
                self.commit_date_input();
            }
            return;
        }
        self.edit_text(|text| text.push(ch));
    }

    fn backspace(&mut self) {
        let focus = self.state.focus;
        if is_date_field(focus) {
            let current = self.field_date(focus);
            let input = self
                .state
                .date_input
                .get_or_insert_with(|| current.format(DATE_INPUT_FORMATS[0]).to_string());
            input.pop();
            self.commit_date_input();
            return;
        }
        self.edit_text(|text| {
            text.pop();
        });
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) {
        let focus = self.state.focus;
        let Some(current) = self.state.form.text(focus) else {
            return;
        };
        let mut text = current.to_string();
        edit(&mut text);
        self.state.form.set_text(focus, text);
        self.state.notice = self.state.notice.take().filter(|n| n.level == NoticeLevel::Info);
        self.refresh_completion();
    }

    fn refresh_completion(&mut self) {
        let focus = self.state.focus;
        self.state.completion.clear();
        if !focus.is_account() {
            return;
        }
        let query = self.state.form.text(focus).unwrap_or_default();
        self.state.completion.candidates = engine::complete(
            self.state.form.accounts(),
            query,
            COMPLETION_LIMIT,
        )
        .into_iter()
        .map(String::from)
        .collect();
    }

    fn accept_completion(&mut self) {
        let focus = self.state.focus;
        if !focus.is_account() {
            return;
        }
        if let Some(account) = self.state.completion.chosen().map(String::from) {
            self.state.form.set_text(focus, account);
            self.state.completion.clear();
        }
    }

    fn up_down(&mut self, step: i64) {
        let focus = self.state.focus;
        if focus.is_account() && !self.state.completion.candidates.is_empty() {
            if step > 0 {
                self.state.completion.select_next();
            } else {
                self.state.completion.select_prev();
            }
            return;
        }
        if is_date_field(focus) {
            let date = self.field_date(focus);
            let shifted = if step > 0 {
                date.checked_add_days(Days::new(1))
            } else {
                date.checked_sub_days(Days::new(1))
            };
            if let Some(shifted) = shifted {
                self.set_field_date(focus, shifted);
            }
            return;
        }
        self.move_focus(if step > 0 { 1 } else { -1 });
    }

    fn shift_month(&mut self, step: i32) {
        let focus = self.state.focus;
        if !is_date_field(focus) {
            return;
        }
        let date = self.field_date(focus);
        let shifted = if step > 0 {
            date.checked_add_months(Months::new(1))
        } else {
            date.checked_sub_months(Months::new(1))
        };
        if let Some(shifted) = shifted {
            self.set_field_date(focus, shifted);
        }
    }

    fn field_date(&self, field: Field) -> NaiveDate {
        if field == Field::ClearingDate {
            self.state.form.clearing_date()
        } else {
            self.state.form.date()
        }
    }

    fn set_field_date(&mut self, field: Field, date: NaiveDate) {
        self.state.date_input = None;
        if field == Field::ClearingDate {
            self.state.form.set_clearing_date(date);
        } else {
            self.state.form.set_date(date);
        }
    }

    fn commit_date_input(&mut self) {
        let focus = self.state.focus;
        let Some(input) = self.state.date_input.as_deref() else {
            return;
        };
        let parsed = DATE_INPUT_FORMATS
            .iter()
            .find_map(|format| NaiveDate::parse_from_str(input, format).ok());
        if let Some(date) = parsed {
            if focus == Field::ClearingDate {
                self.state.form.set_clearing_date(date);
            } else {
                self.state.form.set_date(date);
            }
        }
    }

    fn submit(&mut self) {
        match self.state.form.submit(self.sink.as_mut()) {
            Ok(()) => {
                self.state.notice = None;
                self.set_focus(Field::Description);
            }
            Err(SubmitError::Invalid(err)) => {
                tracing::debug!(field = ?err.field, "purchase rejected: {err}");
                self.set_focus(err.field);
            }
            Err(SubmitError::Engine(err)) => {
                tracing::error!("failed to save purchase: {err}");
                self.state.notice = Some(Notice {
                    level: NoticeLevel::Error,
                    message: format!("Purchase not saved: {err}"),
                });
            }
        }
    }

    fn close(&mut self) {
        let today = Local::now().date_naive();
        if let Err(err) = self.state.form.close(self.sink.as_mut(), today) {
            tracing::error!("failed to save preferences: {err}");
        }
        self.should_quit = true;
    }
}

fn is_date_field(field: Field) -> bool {
    matches!(field, Field::Date | Field::ClearingDate)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use crossterm::event::{KeyCode, KeyModifiers};
    use engine::{DryRunSink, Preferences};

    use super::*;

    fn app_with(journal_text: &str) -> (tempfile::TempDir, App) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("main.ledger");
        fs::write(&path, journal_text).unwrap();
        let journal = Journal::from_file(&path, None).unwrap();
        let snapshot = journal.snapshot();
        let today = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let form = PurchaseForm::new(Preferences::default(), today);
        let mut app = App::new(journal, form, Box::new(DryRunSink), true, None);
        app.finish_loading(snapshot);
        (dir, app)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn type_text(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    const JOURNAL: &str = "2024/01/01 seed\n    Expenses:Groceries  1.00 USD\n    Assets:Cash\n";

    #[test]
    fn typing_and_tabbing_fill_the_form() {
        let (_dir, mut app) = app_with(JOURNAL);
        type_text(&mut app, "milk");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "3.50");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "groc");
        assert_eq!(app.state.completion.candidates, vec!["Expenses:Groceries"]);
        press(&mut app, KeyCode::Right);
        assert_eq!(
            app.state.form.text(Field::Expense),
            Some("Expenses:Groceries")
        );
        assert_eq!(
            app.state.form.amount().unwrap().unwrap().to_string(),
            "3.50 USD"
        );
    }

    #[test]
    fn failed_submit_focuses_the_offending_field() {
        let (_dir, mut app) = app_with(JOURNAL);
        type_text(&mut app, "milk");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.focus, Field::Amount);
        assert_eq!(app.state.form.status(), Some("Enter a valid amount"));
    }

    #[test]
    fn successful_submit_returns_to_description() {
        let (_dir, mut app) = app_with(JOURNAL);
        type_text(&mut app, "milk");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "2");
        press(&mut app, KeyCode::Tab);
        type_text(&mut app, "Expenses:Groceries");
        app.set_focus(Field::Asset);
        type_text(&mut app, "Assets:Cash");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.state.focus, Field::Description);
        assert_eq!(app.state.form.text(Field::Description), Some(""));
        assert_eq!(app.state.form.text(Field::Asset), Some("Assets:Cash"));
    }

    #[test]
    fn date_fields_step_and_accept_typed_dates() {
        let (_dir, mut app) = app_with(JOURNAL);
        app.set_focus(Field::Date);
        press(&mut app, KeyCode::Down);
        assert_eq!(
            app.state.form.date(),
            NaiveDate::from_ymd_opt(2024, 1, 6).unwrap()
        );
        type_text(&mut app, "2023/12/24");
        assert_eq!(
            app.state.form.date(),
            NaiveDate::from_ymd_opt(2023, 12, 24).unwrap()
        );
        assert_eq!(app.state.form.clearing_date(), app.state.form.date());
        press(&mut app, KeyCode::PageDown);
        assert_eq!(
            app.state.form.date(),
            NaiveDate::from_ymd_opt(2024, 1, 24).unwrap()
        );
    }

    #[test]
    fn space_toggles_clearing() {
        let (_dir, mut app) = app_with(JOURNAL);
        app.set_focus(Field::Clearing);
        let before = app.state.form.clearing();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.state.form.clearing(), !before);
    }

    #[test]
    fn escape_closes() {
        let (_dir, mut app) = app_with(JOURNAL);
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }
}

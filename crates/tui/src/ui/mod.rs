pub mod components;
pub mod keymap;
pub mod screens;

mod terminal;
mod theme;

use crossterm::event::{self, Event, KeyEventKind};
use ratatui::Frame;

use crate::{app::AppState, error::Result};

pub use terminal::{AppTerminal as Terminal, restore_terminal, setup_terminal};

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let area = frame.area();
    screens::form::render(frame, area, state);
}

/// Shows `message` until a key is pressed.
pub fn show_fatal(message: &str) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let shown = wait_for_key(&mut terminal, message);
    restore_terminal(&mut terminal)?;
    shown
}

fn wait_for_key(terminal: &mut Terminal, message: &str) -> Result<()> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            screens::fatal::render(frame, area, message);
        })?;
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            return Ok(());
        }
    }
}

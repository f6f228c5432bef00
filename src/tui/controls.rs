//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;
use crate::engine::Granularity;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit = true,
        KeyCode::Char('d') => app.set_granularity(Granularity::Day),
        KeyCode::Char('m') => app.set_granularity(Granularity::Month),
        KeyCode::Char('y') => app.set_granularity(Granularity::Year),
        KeyCode::Right | KeyCode::Char('l') => app.next_period(),
        KeyCode::Left | KeyCode::Char('h') => app.prev_period(),
        KeyCode::Char('1') => app.switch_preset("preview"),
        KeyCode::Char('2') => app.switch_preset("overview"),
        KeyCode::Char('3') => app.switch_preset("calendar_exact"),
        _ => {}
    }
}

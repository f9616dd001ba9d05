// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages sent to the
// app loop, or into local ViewState mutations (scrolling, prompts).

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use standings_app::protocol::UserCommand;
use standings_core::sort::SortField;

use super::ViewState;

/// Rows moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to the
/// app loop. Returns `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Windows reports both Press and Release.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL) && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    if view_state.path_input_mode {
        return handle_path_input(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char(c @ '1'..='4') => {
            let index = c as usize - '1' as usize;
            Some(UserCommand::SortBy(SortField::ALL[index]))
        }

        KeyCode::Up | KeyCode::Char('k') => {
            view_state.scroll_up(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            view_state.scroll_down(1);
            None
        }
        KeyCode::PageUp => {
            view_state.scroll_up(PAGE_SIZE);
            None
        }
        KeyCode::PageDown => {
            view_state.scroll_down(PAGE_SIZE);
            None
        }

        KeyCode::Char('o') => {
            view_state.path_input_mode = true;
            view_state.path_input.clear();
            None
        }

        KeyCode::Esc => {
            view_state.error = None;
            None
        }

        KeyCode::Char('q') => {
            view_state.confirm_quit = true;
            None
        }

        _ => None,
    }
}

/// `y`/`q` confirm, `n`/Esc cancel, everything else is blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Characters edit the path, Enter submits a non-empty path, Esc cancels.
fn handle_path_input(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.path_input_mode = false;
            view_state.path_input.clear();
            None
        }
        KeyCode::Enter => {
            let path = view_state.path_input.trim().to_string();
            if path.is_empty() {
                return None;
            }
            view_state.path_input_mode = false;
            view_state.path_input.clear();
            Some(UserCommand::LoadFile(PathBuf::from(path)))
        }
        KeyCode::Backspace => {
            view_state.path_input.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.path_input.push(c);
            None
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

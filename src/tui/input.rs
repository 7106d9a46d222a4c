// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// loop, or into local ViewState mutations (cursor movement, column
// switching, screen navigation).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::{CatalogColumn, Screen, ViewState};
use crate::protocol::UserCommand;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should be forwarded to
/// the app loop (selections, race start, gas pedal, quit). Returns `None`
/// when the key press was handled locally by mutating `ViewState`.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // Only process key press events. On Windows, crossterm emits both
    // Press and Release events for each physical keypress; ignoring
    // non-Press events prevents double-processing.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    // Ctrl+C always quits immediately regardless of screen (escape hatch)
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    // Service-failure modal: any key dismisses it and forces navigation
    // back to the home screen. No other input gets through.
    if view_state.modal.is_some() {
        view_state.go_home();
        return None;
    }

    match view_state.screen {
        Screen::Home => handle_home_key(key_event, view_state),
        Screen::Race => handle_race_key(key_event, view_state),
    }
}

fn handle_home_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('q') => Some(UserCommand::Quit),

        // Column switching
        KeyCode::Tab | KeyCode::Left | KeyCode::Right | KeyCode::Char('h')
        | KeyCode::Char('l') => {
            view_state.active_column = match view_state.active_column {
                CatalogColumn::Tracks => CatalogColumn::Racers,
                CatalogColumn::Racers => CatalogColumn::Tracks,
            };
            None
        }

        // Cursor movement within the active column
        KeyCode::Up | KeyCode::Char('k') => {
            let cursor = active_cursor_mut(view_state);
            *cursor = cursor.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let max = active_len(view_state).saturating_sub(1);
            let cursor = active_cursor_mut(view_state);
            *cursor = (*cursor + 1).min(max);
            None
        }

        // Select the entry under the cursor
        KeyCode::Enter => match view_state.active_column {
            CatalogColumn::Tracks => view_state
                .tracks
                .get(view_state.track_cursor)
                .map(|track| UserCommand::SelectTrack(track.id)),
            CatalogColumn::Racers => view_state
                .racers
                .get(view_state.racer_cursor)
                .map(|racer| UserCommand::SelectRacer(racer.id)),
        },

        KeyCode::Char('s') => Some(UserCommand::CreateRace),
        KeyCode::Char('r') => Some(UserCommand::ReloadCatalog),

        _ => None,
    }
}

fn handle_race_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('q') => Some(UserCommand::Quit),

        // Gas pedal
        KeyCode::Char(' ') | KeyCode::Char('g') => Some(UserCommand::Accelerate),

        // Back to the home screen: after results ('n' for a new race),
        // after a fault, or just abandoning the watch.
        KeyCode::Esc | KeyCode::Char('n') => {
            view_state.go_home();
            None
        }

        _ => None,
    }
}

fn active_cursor_mut(view_state: &mut ViewState) -> &mut usize {
    match view_state.active_column {
        CatalogColumn::Tracks => &mut view_state.track_cursor,
        CatalogColumn::Racers => &mut view_state.racer_cursor,
    }
}

fn active_len(view_state: &ViewState) -> usize {
    match view_state.active_column {
        CatalogColumn::Tracks => view_state.tracks.len(),
        CatalogColumn::Racers => view_state.racers.len(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Track catalog widget: selectable list of tracks.
//
// The cursor row is highlighted when the tracks column is active; the
// session's selected track keeps a marker regardless of where the cursor
// is.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Frame;

use crate::tui::{CatalogColumn, ViewState};

/// Render the track list into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let active = state.active_column == CatalogColumn::Tracks;

    let items: Vec<ListItem> = if state.tracks.is_empty() {
        vec![ListItem::new("Loading tracks...")]
    } else {
        state
            .tracks
            .iter()
            .enumerate()
            .map(|(i, track)| {
                let selected = state.session.track_id() == Some(track.id);
                let marker = if selected { "*" } else { " " };
                let mut style = Style::default();
                if selected {
                    style = style.fg(Color::Green);
                }
                if active && i == state.track_cursor {
                    style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
                }
                ListItem::new(Line::from(format!("{marker} {}", track.name))).style(style)
            })
            .collect()
    };

    let border_style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title("Tracks"),
    );

    frame.render_widget(list, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

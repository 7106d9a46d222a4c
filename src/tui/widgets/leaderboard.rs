// In-progress leaderboard widget.
//
// The ordering function is pure: same positions in, same ordered rows out,
// no network and no store mutation. Ties on `segment` keep their input
// order (stable sort).

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Frame;

use crate::protocol::Position;
use crate::tui::ViewState;

/// Order positions by race progress: furthest-along racer first.
pub fn order_by_progress(positions: &[Position]) -> Vec<&Position> {
    let mut ordered: Vec<&Position> = positions.iter().collect();
    ordered.sort_by(|a, b| b.segment.cmp(&a.segment));
    ordered
}

/// One display row: rank, driver name, and a ` (you)` suffix on the
/// session racer's row.
pub fn row_label(rank: usize, position: &Position, session_racer: Option<u64>) -> String {
    let you = if session_racer == Some(position.id) {
        " (you)"
    } else {
        ""
    };
    format!("{rank} - {}{you}", position.driver_name)
}

/// Render the live leaderboard into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let session_racer = state.session.racer_id();
    let ordered = order_by_progress(&state.positions);

    let items: Vec<ListItem> = ordered
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let label = row_label(i + 1, position, session_racer);
            let style = if session_racer == Some(position.id) {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(label)).style(style)
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Leaderboard"),
    );
    frame.render_widget(list, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

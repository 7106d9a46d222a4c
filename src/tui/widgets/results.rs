// Final results widget.
//
// Reuses the leaderboard row layout, ordered by finishing position instead
// of progress. Pure ordering, same contract as `order_by_progress`.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, List, ListItem};
use ratatui::Frame;

use crate::protocol::Position;
use crate::tui::ViewState;

use super::leaderboard::row_label;

/// Order positions by finishing position, ascending. Positions the service
/// has not assigned a finishing slot sort last.
pub fn order_by_finish(positions: &[Position]) -> Vec<&Position> {
    let mut ordered: Vec<&Position> = positions.iter().collect();
    ordered.sort_by_key(|p| p.final_position.unwrap_or(u32::MAX));
    ordered
}

/// Render the race results into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let session_racer = state.session.racer_id();
    let positions = state.final_positions.as_deref().unwrap_or(&[]);
    let ordered = order_by_finish(positions);

    let mut items: Vec<ListItem> = ordered
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

    items.push(ListItem::new(Line::from("")));
    items.push(
        ListItem::new(Line::from("Press n to start a new race")).style(
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::DIM),
        ),
    );

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Race Results"),
    );
    frame.render_widget(list, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Status bar widget: current selection summary plus any transient notice.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::tui::ViewState;

/// Build the selection summary shown on the left of the bar.
pub fn selection_summary(state: &ViewState) -> String {
    let track = state
        .session
        .track_id()
        .and_then(|id| state.tracks.iter().find(|t| t.id == id))
        .map(|t| t.name.as_str())
        .unwrap_or("-");
    let racer = state
        .session
        .racer_id()
        .and_then(|id| state.racers.iter().find(|r| r.id == id))
        .map(|r| r.driver_name.as_str())
        .unwrap_or("-");
    format!(" Track: {track} | Racer: {racer}")
}

/// Render the status bar into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = vec![Span::styled(
        selection_summary(state),
        Style::default().fg(Color::White),
    )];

    if let Some(notice) = &state.notice {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            notice.clone(),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph =
        Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

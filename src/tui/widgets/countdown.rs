// Countdown widget: the big number shown before the race starts.

use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

/// Render the countdown display into the given area.
pub fn render(frame: &mut Frame, area: Rect, value: u8) {
    let lines = vec![
        Line::from(""),
        Line::from("Race Starts In..."),
        Line::from(""),
        Line::styled(
            value.to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
    ];

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Leaderboard"));
    frame.render_widget(paragraph, area);
}

// Race info widget: track title, car roster, and gas-pedal directions.
//
// Shown on the right of the race screen for the whole race lifetime,
// countdown through results.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

/// Render the race info panel into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let track_name = state.race_track_name.as_deref().unwrap_or("-");

    let mut lines = vec![
        Line::styled(
            format!("Race: {track_name}"),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
    ];

    for racer in &state.race_cars {
        let you = if state.session.racer_id() == Some(racer.id) {
            " (you)"
        } else {
            ""
        };
        lines.push(Line::from(format!("  {}{you}", racer.driver_name)));
    }

    lines.push(Line::from(""));
    lines.push(Line::styled(
        "Directions",
        Style::default().add_modifier(Modifier::BOLD),
    ));
    lines.push(Line::from(
        "Press SPACE as fast as you can to make your racer go faster!",
    ));

    let paragraph = Paragraph::new(lines)
        .wrap(ratatui::widgets::Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title("Race"),
        );
    frame.render_widget(paragraph, area);
}

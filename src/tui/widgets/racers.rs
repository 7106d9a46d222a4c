// Racer catalog widget: table of racers with their stats.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table};
use ratatui::Frame;

use crate::tui::{CatalogColumn, ViewState};

/// Render the racer table into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let active = state.active_column == CatalogColumn::Racers;

    let border_style = if active {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title("Racers");

    if state.racers.is_empty() {
        frame.render_widget(Paragraph::new("Loading racers...").block(block), area);
        return;
    }

    let header = Row::new(vec![
        Cell::from(" "),
        Cell::from("Driver"),
        Cell::from("Speed"),
        Cell::from("Accel"),
        Cell::from("Handling"),
    ])
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = state
        .racers
        .iter()
        .enumerate()
        .map(|(i, racer)| {
            let selected = state.session.racer_id() == Some(racer.id);
            let marker = if selected { "*" } else { " " };
            let mut style = Style::default();
            if selected {
                style = style.fg(Color::Green);
            }
            if active && i == state.racer_cursor {
                style = style.bg(Color::DarkGray).add_modifier(Modifier::BOLD);
            }
            Row::new(vec![
                Cell::from(marker),
                Cell::from(racer.driver_name.clone()),
                Cell::from(racer.top_speed.to_string()),
                Cell::from(racer.acceleration.to_string()),
                Cell::from(racer.handling.to_string()),
            ])
            .style(style)
        })
        .collect();

    let widths = [
        Constraint::Length(1),
        Constraint::Min(14),
        Constraint::Length(6),
        Constraint::Length(6),
        Constraint::Length(9),
    ];

    let table = Table::new(rows, widths).header(header).block(block);
    frame.render_widget(table, area);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

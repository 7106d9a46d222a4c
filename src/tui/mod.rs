// TUI: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors the parts of the application
// state it draws. The app event loop pushes `UiUpdate` messages over an
// mpsc channel; the TUI applies them to `ViewState` and re-renders on a
// fixed tick.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{Position, Racer, Track, UiUpdate, UserCommand};
use crate::session::Session;

use layout::{home_layout, race_layout};

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// Which screen is on display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    /// Catalog lists: pick a track and a racer, start a race.
    Home,
    /// Countdown, live leaderboard, results, or the fault view.
    Race,
}

/// Which home-screen catalog column has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogColumn {
    Tracks,
    Racers,
}

/// TUI-local state that mirrors the application state for rendering.
///
/// Updated incrementally via `UiUpdate` messages from the app loop. The
/// `render_frame` function reads this struct to draw the current screen.
pub struct ViewState {
    pub screen: Screen,
    /// Track catalog, as last loaded.
    pub tracks: Vec<Track>,
    /// Racer catalog, as last loaded.
    pub racers: Vec<Racer>,
    /// Mirror of the app's session snapshot.
    pub session: Session,
    pub active_column: CatalogColumn,
    pub track_cursor: usize,
    pub racer_cursor: usize,
    /// Track name of the race being run.
    pub race_track_name: Option<String>,
    /// Roster of the race being run.
    pub race_cars: Vec<Racer>,
    /// Countdown display value while counting down.
    pub countdown: Option<u8>,
    /// Latest in-progress leaderboard positions.
    pub positions: Vec<Position>,
    /// Final positions once the race has finished.
    pub final_positions: Option<Vec<Position>>,
    /// Fatal race fault message; replaces leaderboard/results when set.
    pub fault: Option<String>,
    /// Transient notice shown in the status bar.
    pub notice: Option<String>,
    /// Service-failure modal; dismissing it navigates home.
    pub modal: Option<String>,
}

impl Default for ViewState {
    fn default() -> Self {
        ViewState {
            screen: Screen::Home,
            tracks: Vec::new(),
            racers: Vec::new(),
            session: Session::default(),
            active_column: CatalogColumn::Tracks,
            track_cursor: 0,
            racer_cursor: 0,
            race_track_name: None,
            race_cars: Vec::new(),
            countdown: None,
            positions: Vec::new(),
            final_positions: None,
            fault: None,
            notice: None,
            modal: None,
        }
    }
}

impl ViewState {
    /// Navigate back to the home screen, clearing all race-view state.
    /// Selections survive: the session lives for the process, not the
    /// screen.
    pub fn go_home(&mut self) {
        self.screen = Screen::Home;
        self.race_track_name = None;
        self.race_cars.clear();
        self.countdown = None;
        self.positions.clear();
        self.final_positions = None;
        self.fault = None;
        self.modal = None;
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Catalog { tracks, racers } => {
            state.tracks = tracks;
            state.racers = racers;
            state.track_cursor = state.track_cursor.min(state.tracks.len().saturating_sub(1));
            state.racer_cursor = state.racer_cursor.min(state.racers.len().saturating_sub(1));
        }
        UiUpdate::SessionChanged(session) => {
            state.session = session;
        }
        UiUpdate::RaceCreated { track_name, cars } => {
            state.screen = Screen::Race;
            state.race_track_name = Some(track_name);
            state.race_cars = cars;
            // The race-start view shows the countdown's initial value
            // before the first tick fires.
            state.countdown = Some(crate::race::countdown::COUNTDOWN_START);
            state.positions.clear();
            state.final_positions = None;
            state.fault = None;
            state.notice = None;
        }
        UiUpdate::CountdownTick(value) => {
            state.countdown = Some(value);
        }
        UiUpdate::Leaderboard(positions) => {
            state.countdown = None;
            state.positions = positions;
        }
        UiUpdate::RaceFinished(positions) => {
            state.countdown = None;
            state.final_positions = Some(positions);
        }
        UiUpdate::Notice(message) => {
            state.notice = Some(message);
        }
        UiUpdate::ServiceAbort(message) => {
            state.modal = Some(message);
        }
        UiUpdate::RaceFault(message) => {
            state.countdown = None;
            state.fault = Some(message);
        }
    }
}

// ---------------------------------------------------------------------------
// Frame rendering
// ---------------------------------------------------------------------------

/// Render the complete frame for the current screen.
fn render_frame(frame: &mut Frame, state: &ViewState) {
    match state.screen {
        Screen::Home => render_home(frame, state),
        Screen::Race => render_race(frame, state),
    }
}

fn render_home(frame: &mut Frame, state: &ViewState) {
    let layout = home_layout(frame.area());
    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::tracks::render(frame, layout.tracks, state);
    widgets::racers::render(frame, layout.racers, state);
    render_help_bar(
        frame,
        layout.help_bar,
        " q:Quit | Tab:Switch list | Enter:Select | s:Start race | r:Reload",
    );
}

fn render_race(frame: &mut Frame, state: &ViewState) {
    let layout = race_layout(frame.area());
    widgets::status_bar::render(frame, layout.status_bar, state);

    if let Some(message) = &state.fault {
        widgets::fault::render(frame, layout.leaderboard, message);
    } else if state.final_positions.is_some() {
        widgets::results::render(frame, layout.leaderboard, state);
    } else if let Some(value) = state.countdown {
        widgets::countdown::render(frame, layout.leaderboard, value);
    } else {
        widgets::leaderboard::render(frame, layout.leaderboard, state);
    }

    widgets::race_info::render(frame, layout.race_area, state);
    render_help_bar(
        frame,
        layout.help_bar,
        " q:Quit | SPACE:Gas pedal | n:New race | Esc:Home",
    );

    // Modal overlay goes on top of everything.
    if let Some(message) = &state.modal {
        widgets::modal::render(frame, frame.area(), message);
    }
}

fn render_help_bar(frame: &mut Frame, area: ratatui::layout::Rect, text: &str) {
    use ratatui::style::{Color, Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text.to_string(),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, area);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// This is the main entry point for the terminal UI. It:
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on clean exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    render_tick: Duration,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    // Restore the terminal even if rendering panics. Chain the original
    // hook after ours.
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    let mut event_stream = EventStream::new();

    let mut render_interval = tokio::time::interval(render_tick);
    render_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(update) => apply_ui_update(&mut view_state, update),
                    None => break, // channel closed: app is shutting down
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break;
                            }
                        }
                    }
                    Some(Ok(_)) => {
                        // Mouse and resize events need no handling; the
                        // next render tick redraws at the new size.
                    }
                    Some(Err(_)) | None => break,
                }
            }

            _ = render_interval.tick() => {
                terminal.draw(|frame| render_frame(frame, &view_state))?;
            }
        }
    }

    ratatui::restore();
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

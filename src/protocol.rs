// Shared message and wire types.
//
// Wire structs mirror the race service's JSON payloads (see api.rs for the
// endpoints). Internal enums carry messages between the TUI, the app event
// loop, and the race orchestration tasks.

use serde::Deserialize;

use crate::api::RaceHandle;
use crate::session::Session;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A race track from `GET /api/tracks`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Track {
    pub id: u64,
    pub name: String,
}

/// A selectable racer from `GET /api/cars`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Racer {
    pub id: u64,
    pub driver_name: String,
    pub top_speed: u32,
    pub acceleration: u32,
    pub handling: u32,
}

/// The create-race response.
///
/// The create endpoint is the one place the service answers with PascalCase
/// field names; every other payload is snake_case.
#[derive(Debug, Clone, Deserialize)]
pub struct CreatedRace {
    #[serde(rename = "ID")]
    pub id: u64,
    #[serde(rename = "Track")]
    pub track: Track,
    #[serde(rename = "Cars")]
    pub cars: Vec<Racer>,
}

/// Race lifecycle status as reported by `GET /api/races/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum RaceStatus {
    #[serde(rename = "unstarted")]
    Unstarted,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "finished")]
    Finished,
}

/// One racer's progress within a polled race snapshot.
///
/// `final_position` is populated by the service only once the race has
/// finished.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Position {
    pub id: u64,
    pub driver_name: String,
    pub segment: u64,
    #[serde(default)]
    pub final_position: Option<u32>,
}

/// Status poll response. Only `status` and `positions` are consumed; the
/// service echoes other race fields that the client ignores.
#[derive(Debug, Clone, Deserialize)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    #[serde(default)]
    pub positions: Vec<Position>,
}

// ---------------------------------------------------------------------------
// User commands (TUI -> app)
// ---------------------------------------------------------------------------

/// Commands sent from the TUI input handler to the app event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// The user selected a track on the home screen.
    SelectTrack(u64),
    /// The user selected a racer on the home screen.
    SelectRacer(u64),
    /// Create and run a race with the current session selection.
    CreateRace,
    /// Gas pedal: fire an accelerate call for the active race.
    Accelerate,
    /// Re-fetch the track and racer catalogs.
    ReloadCatalog,
    /// Shut down.
    Quit,
}

// ---------------------------------------------------------------------------
// Race events (orchestration tasks -> app)
// ---------------------------------------------------------------------------

/// An event reported by a race orchestration task.
///
/// The `generation` counter is threaded through every event so the app loop
/// can discard stragglers from a superseded orchestration.
#[derive(Debug, Clone)]
pub struct RaceEvent {
    pub generation: u64,
    pub kind: RaceEventKind,
}

#[derive(Debug, Clone)]
pub enum RaceEventKind {
    /// Race created; carries the roster for the race-start view and the
    /// handle subsequent endpoints are addressed with.
    Created {
        handle: RaceHandle,
        track: Track,
        cars: Vec<Racer>,
    },
    /// The create call itself failed; the orchestration is over.
    CreateFailed { message: String },
    /// Countdown display transition (3 -> 2 -> 1; never 0).
    CountdownTick(u8),
    /// The start call succeeded; polling begins.
    Started,
    /// The start call failed; modal + back to the home screen, no retry.
    StartFailed { message: String },
    /// In-progress leaderboard positions from one poll tick.
    Progress { positions: Vec<Position> },
    /// Terminal status reached; final positions for the results view.
    Finished { positions: Vec<Position> },
    /// The session's racer vanished from the reported positions. Fatal to
    /// the orchestration; the app cancels both timer handles.
    Fault { message: String },
}

// ---------------------------------------------------------------------------
// UI updates (app -> TUI)
// ---------------------------------------------------------------------------

/// Incremental view-state updates pushed from the app loop to the TUI.
#[derive(Debug, Clone)]
pub enum UiUpdate {
    /// Track and racer catalogs (re)loaded.
    Catalog {
        tracks: Vec<Track>,
        racers: Vec<Racer>,
    },
    /// The session snapshot changed (selection or race creation).
    SessionChanged(Session),
    /// Race created: switch to the race screen and show the starting view.
    RaceCreated {
        track_name: String,
        cars: Vec<Racer>,
    },
    /// Countdown display value.
    CountdownTick(u8),
    /// In-progress leaderboard positions.
    Leaderboard(Vec<Position>),
    /// Final positions; render the results view.
    RaceFinished(Vec<Position>),
    /// Transient notice (validation failures, create errors).
    Notice(String),
    /// Service failure that aborts the race: modal, then home screen.
    ServiceAbort(String),
    /// Fatal race fault: error view replaces leaderboard/results.
    RaceFault(String),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Session store: the three identifiers for the current run of the client.
//
// The session is a small `Copy` snapshot replaced as a whole on every
// mutation, so readers never observe a partially written state. The app
// event loop is the sole owner; the TUI only sees copies pushed through
// `UiUpdate::SessionChanged`.

use crate::api::RaceHandle;

/// The in-memory session: selected track, selected racer, active race.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Session {
    track_id: Option<u64>,
    racer_id: Option<u64>,
    race: Option<RaceHandle>,
}

impl Session {
    /// Returns a new snapshot with the track selection replaced.
    pub fn with_track(self, track_id: u64) -> Self {
        Session {
            track_id: Some(track_id),
            ..self
        }
    }

    /// Returns a new snapshot with the racer selection replaced.
    pub fn with_racer(self, racer_id: u64) -> Self {
        Session {
            racer_id: Some(racer_id),
            ..self
        }
    }

    /// Returns a new snapshot with the active race handle set.
    ///
    /// Once set, the handle is only ever replaced by the next race's
    /// creation; it is never mutated for the lifetime of an orchestration.
    pub fn with_race(self, race: RaceHandle) -> Self {
        Session {
            race: Some(race),
            ..self
        }
    }

    pub fn track_id(&self) -> Option<u64> {
        self.track_id
    }

    pub fn racer_id(&self) -> Option<u64> {
        self.racer_id
    }

    pub fn race(&self) -> Option<RaceHandle> {
        self.race
    }

    /// Both selections present: `(racer_id, track_id)` ready for create.
    /// `None` means the create-race precondition fails validation.
    pub fn ready_to_race(&self) -> Option<(u64, u64)> {
        match (self.racer_id, self.track_id) {
            (Some(racer), Some(track)) => Some((racer, track)),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

// Pre-race countdown timer.
//
// A single-shot 3-to-0 countdown gating race start. The state machine is
// pure and synchronous; `run` drives it from a repeating one-second tick
// and reports display transitions over the race event channel. `Done` is
// terminal: the runner returns and no further transitions are possible.

use std::time::Duration;

use tokio::sync::mpsc;
use tracing::debug;

use crate::protocol::{RaceEvent, RaceEventKind};

/// Countdown start value: the race-start view shows this before the first
/// tick.
pub const COUNTDOWN_START: u8 = 3;

/// One countdown transition per second.
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Countdown phases: `Idle -> Counting(3) -> Counting(2) -> Counting(1) ->
/// Done`, one transition per elapsed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Countdown {
    Idle,
    Counting(u8),
    Done,
}

impl Countdown {
    /// Enter the counting phase at `COUNTDOWN_START`.
    pub fn start() -> Self {
        Countdown::Counting(COUNTDOWN_START)
    }

    /// Advance one tick.
    ///
    /// Returns the next phase plus the display value for this transition.
    /// The display updates on every transition except the final one
    /// (`Counting(1) -> Done`), so the user sees 3, 2, 1 and never 0.
    /// Ticking `Idle` or `Done` is a no-op.
    pub fn tick(self) -> (Self, Option<u8>) {
        match self {
            Countdown::Counting(1) => (Countdown::Done, None),
            Countdown::Counting(n) => (Countdown::Counting(n - 1), Some(n - 1)),
            Countdown::Idle => (Countdown::Idle, None),
            Countdown::Done => (Countdown::Done, None),
        }
    }

    pub fn is_done(self) -> bool {
        self == Countdown::Done
    }
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Run the countdown to completion, reporting each display transition as a
/// `CountdownTick` event.
///
/// Returns once the machine reaches `Done`. Cancellation happens from the
/// outside: the orchestrator registers this task's abort handle as the
/// named countdown handle and aborts it when the orchestration is torn
/// down.
pub async fn run(events: mpsc::Sender<RaceEvent>, generation: u64) {
    let mut interval = tokio::time::interval(COUNTDOWN_TICK);
    // The first tick completes immediately; consume it so the first real
    // transition happens after one full second.
    interval.tick().await;

    let mut state = Countdown::start();
    while !state.is_done() {
        interval.tick().await;
        let (next, display) = state.tick();
        if let Some(value) = display {
            let sent = events
                .send(RaceEvent {
                    generation,
                    kind: RaceEventKind::CountdownTick(value),
                })
                .await;
            if sent.is_err() {
                // App loop is gone; nothing left to count down for.
                return;
            }
        }
        state = next;
    }
    debug!("countdown complete");
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

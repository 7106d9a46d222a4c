// Race lifecycle orchestration: create -> countdown -> start -> poll ->
// results, with every failure path accounted for.
//
// The orchestrator runs as one spawned driver task per race. The two
// repeating timers it starts (countdown, poll) are registered under
// explicitly named slots in `RaceTimers`, owned by the app state and
// passed into every teardown path; cancellation never relies on handles
// captured in nested scopes, and each slot cancels at most once.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info, warn};

use crate::api::{RaceHandle, RaceService};
use crate::protocol::{RaceEvent, RaceEventKind};
use crate::race::{countdown, monitor};

// ---------------------------------------------------------------------------
// Timer handle bookkeeping
// ---------------------------------------------------------------------------

/// The orchestration's two named repeating-timer handles.
///
/// Both slots are populated only on the error-teardown path's watch: during
/// normal operation the countdown slot is cleared before the poll slot is
/// filled. `Option::take` makes each handle cancellable exactly once.
#[derive(Debug, Default)]
pub struct RaceTimers {
    countdown: Option<AbortHandle>,
    poll: Option<AbortHandle>,
}

impl RaceTimers {
    /// Register the countdown task, aborting any leftover predecessor.
    pub fn set_countdown(&mut self, handle: AbortHandle) {
        if let Some(old) = self.countdown.replace(handle) {
            old.abort();
        }
    }

    /// Register the poll task, aborting any leftover predecessor.
    pub fn set_poll(&mut self, handle: AbortHandle) {
        if let Some(old) = self.poll.replace(handle) {
            old.abort();
        }
    }

    pub fn cancel_countdown(&mut self) {
        if let Some(handle) = self.countdown.take() {
            handle.abort();
        }
    }

    pub fn cancel_poll(&mut self) {
        if let Some(handle) = self.poll.take() {
            handle.abort();
        }
    }

    /// Cancel both timers. Called when an orchestration is superseded or
    /// torn down by a fault.
    pub fn cancel_all(&mut self) {
        self.cancel_countdown();
        self.cancel_poll();
    }

    /// Neither timer is registered. Holds after any teardown.
    pub fn is_inert(&self) -> bool {
        self.countdown.is_none() && self.poll.is_none()
    }
}

/// Timer handles shared between the app state (which tears down) and the
/// driver task (which registers).
pub type SharedRaceTimers = Arc<Mutex<RaceTimers>>;

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

/// One race's driver: owns the service handle, the shared timer slots, the
/// event channel back to the app loop, and the generation tag that fences
/// this orchestration off from superseded ones.
pub struct Orchestrator {
    pub service: Arc<dyn RaceService>,
    pub timers: SharedRaceTimers,
    pub events: mpsc::Sender<RaceEvent>,
    pub generation: u64,
}

impl Orchestrator {
    async fn emit(&self, kind: RaceEventKind) {
        let _ = self
            .events
            .send(RaceEvent {
                generation: self.generation,
                kind,
            })
            .await;
    }

    /// Run one race to completion.
    ///
    /// Preconditions (validated by the app loop before spawning): both
    /// selections are present. The sequence is strictly ordered: the
    /// countdown reaches its terminal state before `start_race` is
    /// invoked, and `start_race`'s outcome is observed before polling
    /// begins.
    pub async fn run_race(self, racer_id: u64, track_id: u64) {
        // Create. A failure here ends the orchestration; there is no race
        // to fall back to.
        let created = match self.service.create_race(racer_id, track_id).await {
            Ok(created) => created,
            Err(e) => {
                error!("create race failed: {e}");
                self.emit(RaceEventKind::CreateFailed {
                    message: e.to_string(),
                })
                .await;
                return;
            }
        };

        let race = RaceHandle::from_created(&created);
        info!(created_id = created.id, %race, "race created");
        self.emit(RaceEventKind::Created {
            handle: race,
            track: created.track,
            cars: created.cars,
        })
        .await;

        // Countdown, registered under its named slot before the first tick
        // can fire.
        let countdown_task = tokio::spawn(countdown::run(self.events.clone(), self.generation));
        self.timers
            .lock()
            .unwrap()
            .set_countdown(countdown_task.abort_handle());

        match countdown_task.await {
            Ok(()) => self.timers.lock().unwrap().cancel_countdown(),
            Err(e) if e.is_cancelled() => {
                debug!("countdown aborted, orchestration superseded");
                return;
            }
            Err(e) => {
                error!("countdown task failed: {e}");
                self.timers.lock().unwrap().cancel_countdown();
                return;
            }
        }

        // Start. A reported failure aborts the orchestration: the user is
        // notified and sent back to the home screen, and the client never
        // retries on its own.
        if let Err(e) = self.service.start_race(race).await {
            warn!(%race, "start race failed: {e}");
            self.emit(RaceEventKind::StartFailed {
                message: e.to_string(),
            })
            .await;
            return;
        }
        self.emit(RaceEventKind::Started).await;

        // Poll until the race resolves, likewise under a named slot.
        let poll_task = tokio::spawn(monitor::run(
            Arc::clone(&self.service),
            race,
            racer_id,
            self.events.clone(),
            self.generation,
        ));
        self.timers
            .lock()
            .unwrap()
            .set_poll(poll_task.abort_handle());

        match poll_task.await {
            Ok(Ok(positions)) => {
                self.timers.lock().unwrap().cancel_poll();
                info!(%race, "race finished");
                self.emit(RaceEventKind::Finished { positions }).await;
            }
            Ok(Err(fault)) => {
                warn!(%race, "race polling faulted: {fault}");
                // The app loop performs the full teardown (both named
                // handles) when it receives the fault.
                self.emit(RaceEventKind::Fault {
                    message: fault.to_string(),
                })
                .await;
            }
            Err(e) if e.is_cancelled() => {
                debug!("poll aborted, orchestration superseded");
            }
            Err(e) => {
                error!("poll task failed: {e}");
                self.timers.lock().unwrap().cancel_poll();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    async fn parked_abort_handle() -> AbortHandle {
        let task = tokio::spawn(std::future::pending::<()>());
        task.abort_handle()
    }

    #[tokio::test]
    async fn timers_start_inert() {
        let timers = RaceTimers::default();
        assert!(timers.is_inert());
    }

    #[tokio::test]
    async fn cancel_all_leaves_both_slots_empty() {
        let mut timers = RaceTimers::default();
        timers.set_countdown(parked_abort_handle().await);
        timers.set_poll(parked_abort_handle().await);
        assert!(!timers.is_inert());

        timers.cancel_all();
        assert!(timers.is_inert());

        // Cancelling again is a no-op, not a double-abort.
        timers.cancel_all();
        assert!(timers.is_inert());
    }

    #[tokio::test]
    async fn replacing_a_slot_aborts_the_predecessor() {
        let mut timers = RaceTimers::default();
        let first = tokio::spawn(std::future::pending::<()>());
        let first_abort = first.abort_handle();
        timers.set_countdown(first_abort);
        timers.set_countdown(parked_abort_handle().await);

        let err = first.await.unwrap_err();
        assert!(err.is_cancelled());
    }
}

// Race status polling loop.
//
// Repeatedly queries the race at a fixed 500 ms cadence, reporting
// in-progress positions as leaderboard updates and resolving with the
// final positions once the race leaves `in-progress`. That status change
// is the loop's only exit: there is deliberately no tick cap or timeout,
// so a service stuck in-progress polls forever.
//
// Transport errors on a tick are logged and the tick is skipped; the loop
// carries on with the next one rather than failing the race.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{RaceHandle, RaceService};
use crate::protocol::{Position, RaceEvent, RaceEventKind, RaceStatus};

/// Status poll cadence.
pub const POLL_INTERVAL: Duration = Duration::from_millis(500);

// ---------------------------------------------------------------------------
// Fault type
// ---------------------------------------------------------------------------

/// Fatal inconsistency detected while polling: the orchestration cannot
/// continue and both race timers must be torn down by the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RaceFault {
    /// The session's racer is absent from the reported positions.
    #[error("racer {racer_id} is missing from the reported positions")]
    RacerMissing { racer_id: u64 },
}

// ---------------------------------------------------------------------------
// Polling loop
// ---------------------------------------------------------------------------

/// Poll `race` every `POLL_INTERVAL` until it leaves `in-progress`.
///
/// In-progress positions are reported as `Progress` events; the final
/// positions are the return value (the orchestrator emits the results
/// event). The session's racer must appear in every reported position set,
/// in-progress and final alike; otherwise the loop resolves with
/// `RaceFault::RacerMissing` and issues no further queries.
pub async fn run(
    service: Arc<dyn RaceService>,
    race: RaceHandle,
    racer_id: u64,
    events: mpsc::Sender<RaceEvent>,
    generation: u64,
) -> Result<Vec<Position>, RaceFault> {
    let mut interval = tokio::time::interval(POLL_INTERVAL);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    // Consume the immediate first tick: the first query lands one full
    // interval after the race starts.
    interval.tick().await;

    loop {
        interval.tick().await;

        let snapshot = match service.get_race(race).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!("race status poll failed, skipping tick: {e}");
                continue;
            }
        };

        if !snapshot.positions.iter().any(|p| p.id == racer_id) {
            return Err(RaceFault::RacerMissing { racer_id });
        }

        match snapshot.status {
            RaceStatus::InProgress => {
                let sent = events
                    .send(RaceEvent {
                        generation,
                        kind: RaceEventKind::Progress {
                            positions: snapshot.positions,
                        },
                    })
                    .await;
                if sent.is_err() {
                    // App loop is gone; stop polling.
                    return Ok(Vec::new());
                }
            }
            status => {
                // `finished`, or any other terminal value the service
                // reports.
                debug!(?status, "race left in-progress, polling stops");
                return Ok(snapshot.positions);
            }
        }
    }
}

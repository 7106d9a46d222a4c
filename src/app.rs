// Application state and orchestration glue.
//
// The central event loop coordinates user commands from the TUI and race
// events from the orchestration tasks, maintains the session snapshot, and
// pushes UI updates to the TUI render loop. At most one race orchestration
// is live at a time: starting a new race aborts the previous driver task,
// cancels both named timer handles, and bumps a generation counter so
// stale events from the superseded run are discarded.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::api::RaceService;
use crate::config::Config;
use crate::protocol::{RaceEvent, RaceEventKind, Racer, Track, UiUpdate, UserCommand};
use crate::race::orchestrator::{Orchestrator, RaceTimers, SharedRaceTimers};
use crate::session::Session;

/// Validation notice shown when the user starts a race without both
/// selections.
pub const SELECTION_NOTICE: &str = "Select both a racer and a track before starting a race.";

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// The complete application state.
pub struct AppState {
    pub config: Config,
    /// Current session snapshot; replaced whole on every mutation.
    pub session: Session,
    pub tracks: Vec<Track>,
    pub racers: Vec<Racer>,
    /// Race service boundary. Wrapped in Arc for sharing with spawned
    /// orchestration and accelerate tasks.
    pub service: Arc<dyn RaceService>,
    /// The two named repeating-timer handles of the live orchestration.
    pub timers: SharedRaceTimers,
    /// Driver task of the live orchestration, if any.
    pub race_task: Option<tokio::task::JoinHandle<()>>,
    /// Monotonically increasing counter identifying the live orchestration.
    /// Events tagged with an older generation are discarded in
    /// `handle_race_event`.
    pub race_generation: u64,
    /// Sender for race events; orchestration tasks use clones of this to
    /// report back to the event loop.
    pub race_tx: mpsc::Sender<RaceEvent>,
}

impl AppState {
    pub fn new(
        config: Config,
        service: Arc<dyn RaceService>,
        race_tx: mpsc::Sender<RaceEvent>,
    ) -> Self {
        AppState {
            config,
            session: Session::default(),
            tracks: Vec::new(),
            racers: Vec::new(),
            service,
            timers: Arc::new(Mutex::new(RaceTimers::default())),
            race_task: None,
            race_generation: 0,
            race_tx,
        }
    }

    /// Fetch the track and racer catalogs concurrently and push them to the
    /// TUI. A failed fetch logs a warning and leaves that catalog empty;
    /// the client keeps running with degraded data.
    pub async fn load_catalogs(&mut self, ui_tx: &mpsc::Sender<UiUpdate>) {
        let (tracks, racers) =
            tokio::join!(self.service.list_tracks(), self.service.list_racers());

        self.tracks = match tracks {
            Ok(tracks) => tracks,
            Err(e) => {
                warn!("failed to load tracks: {e}");
                Vec::new()
            }
        };
        self.racers = match racers {
            Ok(racers) => racers,
            Err(e) => {
                warn!("failed to load racers: {e}");
                Vec::new()
            }
        };

        info!(
            tracks = self.tracks.len(),
            racers = self.racers.len(),
            "catalogs loaded"
        );
        let _ = ui_tx
            .send(UiUpdate::Catalog {
                tracks: self.tracks.clone(),
                racers: self.racers.clone(),
            })
            .await;
    }

    /// Abort the live orchestration, if any: driver task plus both named
    /// timer handles.
    pub fn cancel_race(&mut self) {
        if let Some(task) = self.race_task.take() {
            task.abort();
            info!("aborted previous race orchestration");
        }
        self.timers.lock().unwrap().cancel_all();
    }

    /// Handle one user command from the TUI.
    pub async fn handle_command(&mut self, cmd: UserCommand, ui_tx: &mpsc::Sender<UiUpdate>) {
        match cmd {
            UserCommand::SelectTrack(track_id) => {
                self.session = self.session.with_track(track_id);
                let _ = ui_tx.send(UiUpdate::SessionChanged(self.session)).await;
            }
            UserCommand::SelectRacer(racer_id) => {
                self.session = self.session.with_racer(racer_id);
                let _ = ui_tx.send(UiUpdate::SessionChanged(self.session)).await;
            }
            UserCommand::CreateRace => {
                let Some((racer_id, track_id)) = self.session.ready_to_race() else {
                    debug!("create race blocked: incomplete selection");
                    let _ = ui_tx.send(UiUpdate::Notice(SELECTION_NOTICE.to_string())).await;
                    return;
                };

                // A new race supersedes any prior orchestration activity.
                self.cancel_race();
                self.race_generation += 1;

                let orchestrator = Orchestrator {
                    service: Arc::clone(&self.service),
                    timers: Arc::clone(&self.timers),
                    events: self.race_tx.clone(),
                    generation: self.race_generation,
                };
                info!(racer_id, track_id, generation = self.race_generation, "starting race");
                self.race_task = Some(tokio::spawn(orchestrator.run_race(racer_id, track_id)));
            }
            UserCommand::Accelerate => {
                // Fire-and-forget: no response is awaited and failures stay
                // in the log, never in the user's face mid-race.
                let Some(race) = self.session.race() else {
                    debug!("gas pedal pressed with no active race");
                    return;
                };
                let service = Arc::clone(&self.service);
                tokio::spawn(async move {
                    if let Err(e) = service.accelerate(race).await {
                        warn!(%race, "accelerate failed: {e}");
                    }
                });
            }
            UserCommand::ReloadCatalog => {
                self.load_catalogs(ui_tx).await;
            }
            UserCommand::Quit => {
                // Handled by the run loop; nothing to do here.
            }
        }
    }

    /// Handle one event from an orchestration task.
    pub async fn handle_race_event(&mut self, event: RaceEvent, ui_tx: &mpsc::Sender<UiUpdate>) {
        if event.generation != self.race_generation {
            debug!(
                event_generation = event.generation,
                live_generation = self.race_generation,
                "discarding event from superseded orchestration"
            );
            return;
        }

        match event.kind {
            RaceEventKind::Created { handle, track, cars } => {
                self.session = self.session.with_race(handle);
                let _ = ui_tx.send(UiUpdate::SessionChanged(self.session)).await;
                let _ = ui_tx
                    .send(UiUpdate::RaceCreated {
                        track_name: track.name,
                        cars,
                    })
                    .await;
            }
            RaceEventKind::CreateFailed { message } => {
                let _ = ui_tx
                    .send(UiUpdate::Notice(format!("Could not create race: {message}")))
                    .await;
            }
            RaceEventKind::CountdownTick(value) => {
                let _ = ui_tx.send(UiUpdate::CountdownTick(value)).await;
            }
            RaceEventKind::Started => {
                debug!("race started, polling underway");
            }
            RaceEventKind::StartFailed { message } => {
                self.timers.lock().unwrap().cancel_all();
                let _ = ui_tx.send(UiUpdate::ServiceAbort(message)).await;
            }
            RaceEventKind::Progress { positions } => {
                let _ = ui_tx.send(UiUpdate::Leaderboard(positions)).await;
            }
            RaceEventKind::Finished { positions } => {
                self.timers.lock().unwrap().cancel_all();
                let _ = ui_tx.send(UiUpdate::RaceFinished(positions)).await;
            }
            RaceEventKind::Fault { message } => {
                // Fatal to the in-flight orchestration: stop both the poll
                // timer and any still-registered countdown through the
                // named handle pair, then replace the race view with the
                // error view.
                self.timers.lock().unwrap().cancel_all();
                let _ = ui_tx.send(UiUpdate::RaceFault(message)).await;
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Main event loop
// ---------------------------------------------------------------------------

/// Run the main application event loop.
///
/// Loads the catalogs, then listens on two channels with `tokio::select!`:
/// user commands from the TUI and race events from orchestration tasks.
/// Pushes UI updates through `ui_tx` for the TUI render loop.
pub async fn run(
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    mut race_rx: mpsc::Receiver<RaceEvent>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("application event loop started");

    state.load_catalogs(&ui_tx).await;

    loop {
        tokio::select! {
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("quit command received, shutting down");
                        break;
                    }
                    Some(cmd) => {
                        state.handle_command(cmd, &ui_tx).await;
                    }
                    None => {
                        info!("command channel closed, shutting down");
                        break;
                    }
                }
            }

            event = race_rx.recv() => {
                match event {
                    Some(event) => {
                        state.handle_race_event(event, &ui_tx).await;
                    }
                    None => {
                        // All senders dropped; only possible during
                        // shutdown since AppState holds one.
                        info!("race event channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    // Cleanup
    state.cancel_race();
    info!("application event loop exiting");
    Ok(())
}

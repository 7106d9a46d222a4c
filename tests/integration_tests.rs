// Integration tests for the raceday client.
//
// These tests exercise the race lifecycle end-to-end using the library
// crate's public API against a scripted in-memory race service: session
// validation, the create-id addressing offset, countdown and poll timing
// (under paused tokio time), every failure path, and timer-handle
// teardown.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;

use raceday::api::{RaceHandle, RaceService, ServiceError};
use raceday::app::{AppState, SELECTION_NOTICE};
use raceday::config::Config;
use raceday::protocol::{
    CreatedRace, Position, RaceEvent, RaceSnapshot, RaceStatus, Racer, Track, UiUpdate,
    UserCommand,
};
use raceday::race::monitor::{self, RaceFault};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Every call the mock service observes, with the ids it was addressed by.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    ListTracks,
    ListRacers,
    Create { racer_id: u64, track_id: u64 },
    Start(u64),
    Get(u64),
    Accelerate(u64),
}

/// Scripted race service: fixed catalogs, one create response, a queue of
/// race snapshots consumed one per poll.
struct MockRaceService {
    calls: Mutex<Vec<Call>>,
    tracks: Vec<Track>,
    racers: Vec<Racer>,
    created_id: u64,
    create_fails: bool,
    start_fails: bool,
    /// When set, the next `get_race` fails with a transport-style error
    /// instead of consuming a snapshot.
    fail_next_get: AtomicBool,
    snapshots: Mutex<VecDeque<RaceSnapshot>>,
}

impl MockRaceService {
    fn new(created_id: u64, snapshots: Vec<RaceSnapshot>) -> Arc<Self> {
        Arc::new(MockRaceService {
            calls: Mutex::new(Vec::new()),
            tracks: vec![track(7, "Executor"), track(8, "Full Throttle")],
            racers: vec![racer(3, "Anakin"), racer(4, "Sebulba")],
            created_id,
            create_fails: false,
            start_fails: false,
            fail_next_get: AtomicBool::new(false),
            snapshots: Mutex::new(snapshots.into()),
        })
    }

    fn with_failing_start(created_id: u64) -> Arc<Self> {
        let mut service = MockRaceService::new(created_id, Vec::new());
        Arc::get_mut(&mut service).unwrap().start_fails = true;
        service
    }

    fn with_failing_create(created_id: u64) -> Arc<Self> {
        let mut service = MockRaceService::new(created_id, Vec::new());
        Arc::get_mut(&mut service).unwrap().create_fails = true;
        service
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn error(operation: &'static str) -> ServiceError {
        ServiceError::Status {
            operation,
            status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[async_trait]
impl RaceService for MockRaceService {
    async fn list_tracks(&self) -> Result<Vec<Track>, ServiceError> {
        self.record(Call::ListTracks);
        Ok(self.tracks.clone())
    }

    async fn list_racers(&self) -> Result<Vec<Racer>, ServiceError> {
        self.record(Call::ListRacers);
        Ok(self.racers.clone())
    }

    async fn create_race(
        &self,
        racer_id: u64,
        track_id: u64,
    ) -> Result<CreatedRace, ServiceError> {
        self.record(Call::Create { racer_id, track_id });
        if self.create_fails {
            return Err(MockRaceService::error("create_race"));
        }
        Ok(CreatedRace {
            id: self.created_id,
            track: self
                .tracks
                .iter()
                .find(|t| t.id == track_id)
                .cloned()
                .unwrap_or_else(|| track(track_id, "unknown")),
            cars: self.racers.clone(),
        })
    }

    async fn start_race(&self, race: RaceHandle) -> Result<(), ServiceError> {
        self.record(Call::Start(race.get()));
        if self.start_fails {
            Err(MockRaceService::error("start_race"))
        } else {
            Ok(())
        }
    }

    async fn get_race(&self, race: RaceHandle) -> Result<RaceSnapshot, ServiceError> {
        self.record(Call::Get(race.get()));
        if self.fail_next_get.swap(false, Ordering::SeqCst) {
            return Err(MockRaceService::error("get_race"));
        }
        match self.snapshots.lock().unwrap().pop_front() {
            Some(snapshot) => Ok(snapshot),
            None => Err(MockRaceService::error("get_race")),
        }
    }

    async fn accelerate(&self, race: RaceHandle) -> Result<(), ServiceError> {
        self.record(Call::Accelerate(race.get()));
        Ok(())
    }
}

fn track(id: u64, name: &str) -> Track {
    Track {
        id,
        name: name.into(),
    }
}

fn racer(id: u64, name: &str) -> Racer {
    Racer {
        id,
        driver_name: name.into(),
        top_speed: 500,
        acceleration: 10,
        handling: 6,
    }
}

fn position(id: u64, name: &str, segment: u64, final_position: Option<u32>) -> Position {
    Position {
        id,
        driver_name: name.into(),
        segment,
        final_position,
    }
}

fn in_progress(positions: Vec<Position>) -> RaceSnapshot {
    RaceSnapshot {
        status: RaceStatus::InProgress,
        positions,
    }
}

fn finished(positions: Vec<Position>) -> RaceSnapshot {
    RaceSnapshot {
        status: RaceStatus::Finished,
        positions,
    }
}

/// A three-tick race where racer 3 wins over racer 4.
fn happy_snapshots() -> Vec<RaceSnapshot> {
    vec![
        in_progress(vec![
            position(3, "Anakin", 5, None),
            position(4, "Sebulba", 9, None),
        ]),
        in_progress(vec![
            position(3, "Anakin", 110, None),
            position(4, "Sebulba", 80, None),
        ]),
        finished(vec![
            position(3, "Anakin", 201, Some(1)),
            position(4, "Sebulba", 188, Some(2)),
        ]),
    ]
}

/// Build an AppState over the mock plus the channel ends the tests drive.
fn app_fixture(
    service: Arc<MockRaceService>,
) -> (
    AppState,
    mpsc::Sender<UiUpdate>,
    mpsc::Receiver<UiUpdate>,
    mpsc::Receiver<RaceEvent>,
) {
    let (race_tx, race_rx) = mpsc::channel(256);
    let (ui_tx, ui_rx) = mpsc::channel(256);
    let state = AppState::new(Config::default(), service, race_tx);
    (state, ui_tx, ui_rx, race_rx)
}

/// Select track 7 and racer 3, draining the resulting session updates.
async fn select_defaults(
    state: &mut AppState,
    ui_tx: &mpsc::Sender<UiUpdate>,
    ui_rx: &mut mpsc::Receiver<UiUpdate>,
) {
    state
        .handle_command(UserCommand::SelectTrack(7), ui_tx)
        .await;
    state
        .handle_command(UserCommand::SelectRacer(3), ui_tx)
        .await;
    while ui_rx.try_recv().is_ok() {}
}

/// Pump orchestration events into the app state until the race event
/// channel would block, collecting the resulting UI updates. Returns once
/// one of the terminal updates has been observed.
async fn drive_to_terminal(
    state: &mut AppState,
    ui_tx: &mpsc::Sender<UiUpdate>,
    ui_rx: &mut mpsc::Receiver<UiUpdate>,
    race_rx: &mut mpsc::Receiver<RaceEvent>,
) -> Vec<UiUpdate> {
    let mut updates = Vec::new();
    loop {
        let event = race_rx
            .recv()
            .await
            .expect("race event channel closed before a terminal update");
        state.handle_race_event(event, ui_tx).await;
        while let Ok(update) = ui_rx.try_recv() {
            let terminal = matches!(
                update,
                UiUpdate::RaceFinished(_)
                    | UiUpdate::ServiceAbort(_)
                    | UiUpdate::RaceFault(_)
                    | UiUpdate::Notice(_)
            );
            updates.push(update);
            if terminal {
                return updates;
            }
        }
    }
}

// ===========================================================================
// Session validation
// ===========================================================================

#[tokio::test]
async fn create_race_without_selection_makes_no_network_calls() {
    let service = MockRaceService::new(42, Vec::new());
    let (mut state, ui_tx, mut ui_rx, _race_rx) = app_fixture(Arc::clone(&service));

    state.handle_command(UserCommand::CreateRace, &ui_tx).await;

    match ui_rx.recv().await.unwrap() {
        UiUpdate::Notice(message) => assert_eq!(message, SELECTION_NOTICE),
        other => panic!("expected validation notice, got {other:?}"),
    }
    assert!(service.calls().is_empty());
    assert!(state.race_task.is_none());
}

#[tokio::test]
async fn create_race_with_only_a_track_is_still_blocked() {
    let service = MockRaceService::new(42, Vec::new());
    let (mut state, ui_tx, mut ui_rx, _race_rx) = app_fixture(Arc::clone(&service));

    state
        .handle_command(UserCommand::SelectTrack(7), &ui_tx)
        .await;
    while ui_rx.try_recv().is_ok() {}

    state.handle_command(UserCommand::CreateRace, &ui_tx).await;

    assert!(matches!(ui_rx.recv().await.unwrap(), UiUpdate::Notice(_)));
    assert!(service.calls().is_empty());
}

// ===========================================================================
// Happy path: addressing offset, countdown, polling, results
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn orchestration_addresses_race_with_decremented_id() {
    let service = MockRaceService::new(42, happy_snapshots());
    let (mut state, ui_tx, mut ui_rx, mut race_rx) = app_fixture(Arc::clone(&service));
    select_defaults(&mut state, &ui_tx, &mut ui_rx).await;

    state.handle_command(UserCommand::CreateRace, &ui_tx).await;
    let updates = drive_to_terminal(&mut state, &ui_tx, &mut ui_rx, &mut race_rx).await;

    assert!(matches!(updates.last(), Some(UiUpdate::RaceFinished(_))));

    // Create returned ID 42; everything after it addresses race 41.
    assert_eq!(
        service.calls(),
        vec![
            Call::Create {
                racer_id: 3,
                track_id: 7
            },
            Call::Start(41),
            Call::Get(41),
            Call::Get(41),
            Call::Get(41),
        ]
    );

    // The session's handle is the decremented id too, so the gas pedal
    // addresses the same race.
    state.handle_command(UserCommand::Accelerate, &ui_tx).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert_eq!(service.calls().last(), Some(&Call::Accelerate(41)));
}

#[tokio::test(start_paused = true)]
async fn race_lifecycle_renders_in_order_and_on_schedule() {
    let service = MockRaceService::new(42, happy_snapshots());
    let (mut state, ui_tx, mut ui_rx, mut race_rx) = app_fixture(Arc::clone(&service));
    select_defaults(&mut state, &ui_tx, &mut ui_rx).await;

    let started = tokio::time::Instant::now();
    state.handle_command(UserCommand::CreateRace, &ui_tx).await;
    let updates = drive_to_terminal(&mut state, &ui_tx, &mut ui_rx, &mut race_rx).await;

    // 3 countdown seconds plus three 500ms poll ticks.
    assert_eq!(started.elapsed(), Duration::from_millis(4_500));

    // SessionChanged (race handle), RaceCreated, countdown 2 and 1, two
    // leaderboard renders, one results render.
    let mut iter = updates.into_iter();
    assert!(matches!(iter.next(), Some(UiUpdate::SessionChanged(_))));
    match iter.next() {
        Some(UiUpdate::RaceCreated { track_name, cars }) => {
            assert_eq!(track_name, "Executor");
            assert_eq!(cars.len(), 2);
        }
        other => panic!("expected RaceCreated, got {other:?}"),
    }
    assert!(matches!(iter.next(), Some(UiUpdate::CountdownTick(2))));
    assert!(matches!(iter.next(), Some(UiUpdate::CountdownTick(1))));
    assert!(matches!(iter.next(), Some(UiUpdate::Leaderboard(_))));
    assert!(matches!(iter.next(), Some(UiUpdate::Leaderboard(_))));
    match iter.next() {
        Some(UiUpdate::RaceFinished(positions)) => {
            assert_eq!(positions.len(), 2);
            assert_eq!(positions[0].final_position, Some(1));
        }
        other => panic!("expected RaceFinished, got {other:?}"),
    }
    assert!(iter.next().is_none());

    // Polling stopped with the terminal snapshot and the timer slots are
    // clear again.
    assert_eq!(
        service
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Get(_)))
            .count(),
        3
    );
    assert!(state.timers.lock().unwrap().is_inert());
}

// ===========================================================================
// Failure paths
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn start_failure_aborts_with_modal_and_no_polling() {
    let service = MockRaceService::with_failing_start(42);
    let (mut state, ui_tx, mut ui_rx, mut race_rx) = app_fixture(Arc::clone(&service));
    select_defaults(&mut state, &ui_tx, &mut ui_rx).await;

    state.handle_command(UserCommand::CreateRace, &ui_tx).await;
    let updates = drive_to_terminal(&mut state, &ui_tx, &mut ui_rx, &mut race_rx).await;

    assert!(matches!(updates.last(), Some(UiUpdate::ServiceAbort(_))));
    // No retry, no status polls.
    assert_eq!(
        service
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Start(_)))
            .count(),
        1
    );
    assert!(!service.calls().iter().any(|c| matches!(c, Call::Get(_))));
    assert!(state.timers.lock().unwrap().is_inert());
}

#[tokio::test(start_paused = true)]
async fn missing_racer_faults_and_tears_down_both_timers() {
    // Positions never contain the session's racer (id 3).
    let service = MockRaceService::new(
        42,
        vec![in_progress(vec![position(4, "Sebulba", 9, None)])],
    );
    let (mut state, ui_tx, mut ui_rx, mut race_rx) = app_fixture(Arc::clone(&service));
    select_defaults(&mut state, &ui_tx, &mut ui_rx).await;

    state.handle_command(UserCommand::CreateRace, &ui_tx).await;
    let updates = drive_to_terminal(&mut state, &ui_tx, &mut ui_rx, &mut race_rx).await;

    assert!(matches!(updates.last(), Some(UiUpdate::RaceFault(_))));

    // The faulting poll was the only one, and both named handles are
    // inert afterwards.
    assert_eq!(
        service
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Get(_)))
            .count(),
        1
    );
    assert!(state.timers.lock().unwrap().is_inert());
}

#[tokio::test(start_paused = true)]
async fn create_failure_surfaces_a_notice_and_stops_there() {
    let service = MockRaceService::with_failing_create(42);
    let (mut state, ui_tx, mut ui_rx, mut race_rx) = app_fixture(Arc::clone(&service));
    select_defaults(&mut state, &ui_tx, &mut ui_rx).await;

    state.handle_command(UserCommand::CreateRace, &ui_tx).await;
    let updates = drive_to_terminal(&mut state, &ui_tx, &mut ui_rx, &mut race_rx).await;

    match updates.last() {
        Some(UiUpdate::Notice(message)) => {
            assert!(message.starts_with("Could not create race"))
        }
        other => panic!("expected create-failure notice, got {other:?}"),
    }
    // Nothing past the create call: no start, no polls.
    assert_eq!(service.calls().len(), 1);
}

#[tokio::test]
async fn accelerate_without_an_active_race_is_a_noop() {
    let service = MockRaceService::new(42, Vec::new());
    let (mut state, ui_tx, _ui_rx, _race_rx) = app_fixture(Arc::clone(&service));

    state.handle_command(UserCommand::Accelerate, &ui_tx).await;
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
    assert!(service.calls().is_empty());
}

// ===========================================================================
// Superseding and stale events
// ===========================================================================

#[tokio::test]
async fn stale_generation_events_are_discarded() {
    let service = MockRaceService::new(42, Vec::new());
    let (mut state, ui_tx, mut ui_rx, _race_rx) = app_fixture(service);

    state.race_generation = 2;
    state
        .handle_race_event(
            RaceEvent {
                generation: 1,
                kind: raceday::protocol::RaceEventKind::CountdownTick(2),
            },
            &ui_tx,
        )
        .await;

    assert!(ui_rx.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn a_new_race_supersedes_the_previous_orchestration() {
    // First race polls in-progress forever; the second one finishes.
    let mut snapshots = vec![
        in_progress(vec![position(3, "Anakin", 5, None)]);
        64
    ];
    snapshots.push(finished(vec![position(3, "Anakin", 201, Some(1))]));
    let service = MockRaceService::new(42, snapshots);
    let (mut state, ui_tx, mut ui_rx, mut race_rx) = app_fixture(Arc::clone(&service));
    select_defaults(&mut state, &ui_tx, &mut ui_rx).await;

    state.handle_command(UserCommand::CreateRace, &ui_tx).await;
    assert_eq!(state.race_generation, 1);

    // Let the first orchestration get through create and into its
    // countdown before superseding it.
    let event = race_rx.recv().await.unwrap();
    state.handle_race_event(event, &ui_tx).await;
    while ui_rx.try_recv().is_ok() {}

    state.handle_command(UserCommand::CreateRace, &ui_tx).await;
    assert_eq!(state.race_generation, 2);

    // Drive the second orchestration to its finish; anything still queued
    // from generation 1 is dropped on the floor by the generation fence.
    let updates = drive_to_terminal(&mut state, &ui_tx, &mut ui_rx, &mut race_rx).await;
    assert!(matches!(updates.last(), Some(UiUpdate::RaceFinished(_))));
    assert!(state.timers.lock().unwrap().is_inert());
}

// ===========================================================================
// Polling loop in isolation
// ===========================================================================

#[tokio::test(start_paused = true)]
async fn monitor_polls_on_cadence_until_terminal_status() {
    let service = MockRaceService::new(42, happy_snapshots());
    let (events_tx, mut events_rx) = mpsc::channel(64);
    let handle = RaceHandle::from_created(&CreatedRace {
        id: 42,
        track: track(7, "Executor"),
        cars: Vec::new(),
    });

    let started = tokio::time::Instant::now();
    let result = monitor::run(Arc::clone(&service) as Arc<dyn RaceService>, handle, 3, events_tx, 1)
        .await
        .unwrap();

    assert_eq!(started.elapsed(), Duration::from_millis(1_500));
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].final_position, Some(1));

    let mut progress = 0;
    while let Some(event) = events_rx.recv().await {
        assert!(matches!(
            event.kind,
            raceday::protocol::RaceEventKind::Progress { .. }
        ));
        progress += 1;
    }
    assert_eq!(progress, 2);
}

#[tokio::test(start_paused = true)]
async fn monitor_skips_failed_polls_and_keeps_going() {
    // First poll fails at the transport level; the loop logs it, skips the
    // tick, and picks up the terminal snapshot on the next one.
    let service = MockRaceService::new(
        42,
        vec![finished(vec![position(3, "Anakin", 201, Some(1))])],
    );
    service.fail_next_get.store(true, Ordering::SeqCst);
    let handle = RaceHandle::from_created(&CreatedRace {
        id: 42,
        track: track(7, "Executor"),
        cars: Vec::new(),
    });

    let (events_tx, _events_rx) = mpsc::channel(64);
    let started = tokio::time::Instant::now();
    let result = monitor::run(Arc::clone(&service) as Arc<dyn RaceService>, handle, 3, events_tx, 1)
        .await
        .unwrap();

    assert_eq!(started.elapsed(), Duration::from_millis(1_000));
    assert_eq!(result[0].final_position, Some(1));
    assert_eq!(
        service
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Get(_)))
            .count(),
        2
    );
}

#[tokio::test(start_paused = true)]
async fn monitor_faults_when_the_racer_is_missing() {
    let service = MockRaceService::new(
        42,
        vec![in_progress(vec![position(4, "Sebulba", 9, None)])],
    );
    let (events_tx, mut events_rx) = mpsc::channel(64);
    let handle = RaceHandle::from_created(&CreatedRace {
        id: 42,
        track: track(7, "Executor"),
        cars: Vec::new(),
    });

    let result =
        monitor::run(Arc::clone(&service) as Arc<dyn RaceService>, handle, 3, events_tx, 1).await;

    assert_eq!(result, Err(RaceFault::RacerMissing { racer_id: 3 }));
    // No leaderboard render for the faulting snapshot.
    assert!(events_rx.recv().await.is_none());
    // And no further queries were issued.
    assert_eq!(
        service
            .calls()
            .iter()
            .filter(|c| matches!(c, Call::Get(_)))
            .count(),
        1
    );
}

// ===========================================================================
// Catalog loading
// ===========================================================================

#[tokio::test]
async fn catalogs_load_and_reach_the_ui() {
    let service = MockRaceService::new(42, Vec::new());
    let (mut state, ui_tx, mut ui_rx, _race_rx) = app_fixture(Arc::clone(&service));

    state.load_catalogs(&ui_tx).await;

    match ui_rx.recv().await.unwrap() {
        UiUpdate::Catalog { tracks, racers } => {
            assert_eq!(tracks.len(), 2);
            assert_eq!(racers.len(), 2);
        }
        other => panic!("expected Catalog, got {other:?}"),
    }
    assert_eq!(service.calls(), vec![Call::ListTracks, Call::ListRacers]);
}

//! Replay fidelity: record a live session, save, reload, and play it
//! back through a fresh engine, comparing state hashes tick by tick.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cadence_core::{CommandRegistry, PlayerId, Tick};
use cadence_engine::{EngineState, LockstepConfig, LockstepEngine};
use cadence_fixed::{Fp, FpVec3};
use cadence_net::{NetworkService, SessionParams};
use cadence_replay::ReplaySpeed;
use cadence_sim::{EntityFactory, Simulation, UnitEntity};
use cadence_test_utils::{empty_command, move_command, MemoryHub};

const DT: f64 = 0.05;

fn unit_factory() -> EntityFactory {
    let mut factory = EntityFactory::new();
    factory
        .register(
            UnitEntity::TYPE_ID,
            Box::new(|id| Box::new(UnitEntity::new(id, PlayerId(0)))),
        )
        .unwrap();
    factory
}

fn solo_engine() -> LockstepEngine {
    let hub = MemoryHub::new();
    let transport = hub.endpoint(PlayerId(0));
    let service = NetworkService::new(Box::new(transport), CommandRegistry::default());
    let sim = Simulation::new(50, 64, unit_factory());
    LockstepEngine::new(LockstepConfig::default(), sim, service).unwrap()
}

/// Seed the deterministic initial world both the live session and the
/// replay must start from.
fn spawn_initial_world(engine: &mut LockstepEngine) {
    let sim = engine.simulation_mut();
    let id = sim.world_mut().allocate_entity_id();
    sim.world_mut().insert(Box::new(UnitEntity::at(
        id,
        PlayerId(0),
        FpVec3::ZERO,
        Fp::from_int(5),
    )));
}

/// Start a recorded single-player session and run it for `ticks`,
/// returning the engine and the state hash observed at every tick.
fn record_session(ticks: u32) -> (LockstepEngine, BTreeMap<i32, u64>) {
    let mut engine = solo_engine();
    engine.network_mut().create_room("solo", 1).unwrap();
    engine.network_mut().set_session_params(SessionParams {
        seed: 12345,
        tick_interval_ms: 50,
        input_delay_ticks: 2,
    });
    engine.start(true).unwrap();
    engine.set_recorded_at(1_700_000_000_000);
    engine.network_mut().set_ready(true).unwrap();
    engine.update(0.0).unwrap();
    assert_eq!(engine.state(), EngineState::Running);
    spawn_initial_world(&mut engine);

    let mut hashes = BTreeMap::new();
    for i in 0..ticks {
        let cmd = if i == 0 {
            move_command(0, 0, 10, 0, 10)
        } else {
            empty_command(0, 0)
        };
        engine.input_command(cmd).unwrap();
        engine.update(DT).unwrap();
        let tick = engine.simulation().current_tick();
        let hash = engine.simulation_mut().state_hash();
        hashes.insert(tick.0, hash);
    }
    (engine, hashes)
}

// ── S5: replay equivalence through a file ───────────────────────

#[test]
fn recorded_session_replays_identically_from_file() {
    let (mut live, live_hashes) = record_session(200);
    live.stop();
    let path = std::env::temp_dir().join(format!(
        "cadence-replay-fidelity-{}.rply",
        std::process::id()
    ));
    live.save_replay_to_file(&path).unwrap();

    let mut replayer = solo_engine();
    replayer.start_replay_from_file(&path).unwrap();
    spawn_initial_world(&mut replayer);

    let mut replay_hashes = BTreeMap::new();
    let finished = Rc::new(RefCell::new(false));
    let flag = Rc::clone(&finished);
    replayer.set_on_playback_finished(move || *flag.borrow_mut() = true);

    for _ in 0..220 {
        replayer.update(DT).unwrap();
        let tick = replayer.simulation().current_tick();
        let hash = replayer.simulation_mut().state_hash();
        replay_hashes.insert(tick.0, hash);
        if *finished.borrow() {
            break;
        }
    }
    assert!(*finished.borrow(), "playback must reach the end of the log");

    // Hashes agree at every recorded checkpoint 0, 5, 10, …, 200.
    for t in (0..=200).step_by(5) {
        let live_hash = live_hashes.get(&t);
        let replay_hash = replay_hashes.get(&t);
        if let (Some(l), Some(r)) = (live_hash, replay_hash) {
            assert_eq!(l, r, "hash mismatch at tick {t}");
        }
    }
    // And specifically at the final tick.
    assert_eq!(live_hashes.get(&200), replay_hashes.get(&200));

    let _ = std::fs::remove_file(&path);
}

#[test]
fn replay_metadata_round_trips() {
    let (mut live, _) = record_session(50);
    live.stop();
    let data = live.finished_replay().unwrap();
    assert_eq!(data.metadata.random_seed, 12345);
    assert_eq!(data.metadata.tick_interval_ms, 50);
    assert_eq!(data.metadata.player_count, 1);
    assert_eq!(data.metadata.total_ticks, 50);
    assert_eq!(data.metadata.duration_ms, 50 * 50);
    assert_eq!(data.metadata.recorded_at, 1_700_000_000_000);
    assert_eq!(data.metadata.session_id, "session-12345");
    // One entry per executed tick, contiguous from 0.
    assert_eq!(data.ticks.len(), 50);
    assert_eq!(data.ticks.first().unwrap().tick, Tick(0));
    assert_eq!(data.ticks.last().unwrap().tick, Tick(49));
}

// ── Playback controls ───────────────────────────────────────────

#[test]
fn playback_speed_scales_tick_rate() {
    let (mut live, _) = record_session(100);
    live.stop();
    let data = live.finished_replay().unwrap().clone();

    let mut replayer = solo_engine();
    replayer.start_replay(data).unwrap();
    spawn_initial_world(&mut replayer);

    replayer.set_replay_speed(ReplaySpeed::Quadruple).unwrap();
    replayer.update(DT).unwrap();
    // 50 ms of wall time at 4× is 200 ms of playback: 4 ticks.
    assert_eq!(replayer.simulation().current_tick(), Tick(4));

    replayer.set_replay_speed(ReplaySpeed::Half).unwrap();
    replayer.update(DT).unwrap(); // 25 ms of playback — not yet a tick
    assert_eq!(replayer.simulation().current_tick(), Tick(4));
    replayer.update(DT).unwrap(); // completes the 50 ms
    assert_eq!(replayer.simulation().current_tick(), Tick(5));
}

#[test]
fn pause_and_resume_playback() {
    let (mut live, _) = record_session(50);
    live.stop();
    let data = live.finished_replay().unwrap().clone();

    let mut replayer = solo_engine();
    replayer.start_replay(data).unwrap();
    spawn_initial_world(&mut replayer);

    for _ in 0..10 {
        replayer.update(DT).unwrap();
    }
    assert_eq!(replayer.simulation().current_tick(), Tick(10));

    replayer.pause_replay().unwrap();
    for _ in 0..10 {
        replayer.update(DT).unwrap();
    }
    assert_eq!(
        replayer.simulation().current_tick(),
        Tick(10),
        "paused playback must not advance"
    );

    replayer.resume_replay().unwrap();
    replayer.update(DT).unwrap();
    assert_eq!(replayer.simulation().current_tick(), Tick(11));
}

#[test]
fn seek_backward_resimulates_and_stays_deterministic() {
    let (mut live, live_hashes) = record_session(100);
    live.stop();
    let data = live.finished_replay().unwrap().clone();

    let mut replayer = solo_engine();
    replayer.start_replay(data).unwrap();
    spawn_initial_world(&mut replayer);

    // Play to the end.
    for _ in 0..110 {
        replayer.update(DT).unwrap();
    }
    assert_eq!(replayer.simulation().current_tick(), Tick(100));

    // Seek back to tick 50: rollback to a retained snapshot, then the
    // log carries the state forward.
    replayer.seek_replay(Tick(50)).unwrap();
    assert_eq!(replayer.simulation().current_tick(), Tick(50));
    assert_eq!(
        Some(&replayer.simulation_mut().state_hash()),
        live_hashes.get(&50),
        "state after seek must match the live run at that tick"
    );

    // Resume playback from the seek point; the tail matches too.
    replayer.resume_replay().unwrap();
    for _ in 0..60 {
        replayer.update(DT).unwrap();
    }
    assert_eq!(replayer.simulation().current_tick(), Tick(100));
    assert_eq!(
        Some(&replayer.simulation_mut().state_hash()),
        live_hashes.get(&100)
    );
}

#[test]
fn seek_forward_fast_forwards_through_the_log() {
    let (mut live, live_hashes) = record_session(100);
    live.stop();
    let data = live.finished_replay().unwrap().clone();

    let mut replayer = solo_engine();
    replayer.start_replay(data).unwrap();
    spawn_initial_world(&mut replayer);

    for _ in 0..10 {
        replayer.update(DT).unwrap();
    }
    replayer.seek_replay(Tick(80)).unwrap();
    assert_eq!(replayer.simulation().current_tick(), Tick(80));
    assert_eq!(
        Some(&replayer.simulation_mut().state_hash()),
        live_hashes.get(&80)
    );
}

#[test]
fn replay_controls_require_a_loaded_replay() {
    let mut engine = solo_engine();
    assert!(engine.pause_replay().is_err());
    assert!(engine.resume_replay().is_err());
    assert!(engine.set_replay_speed(ReplaySpeed::Double).is_err());
    assert!(engine.seek_replay(Tick(5)).is_err());
}

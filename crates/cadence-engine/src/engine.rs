//! The lockstep engine: clock, gate, predict, rollback, sync, lifecycle.
//!
//! [`LockstepEngine`] owns the simulation, the network service, the
//! input buffer, and the replay machinery, and is driven by the host
//! loop through [`update`](LockstepEngine::update). Each update first
//! drains the transport (all network events are handled synchronously
//! on the caller's thread), then runs as many simulation ticks as the
//! accumulated time allows:
//!
//! - a **confirmed** tick runs when every player's input for the
//!   current tick is buffered;
//! - a **predicted** tick fills missing inputs from each player's
//!   recent history and remembers the guesses for later validation;
//! - with prediction disabled, the engine pauses until inputs arrive.
//!
//! When a real input contradicts a prediction, the engine rolls the
//! simulation back to the nearest snapshot at or before that tick and
//! resimulates forward with the corrected inputs. Sync hashes are
//! exchanged at a fixed tick cadence; a reported mismatch fires the
//! desync hook and attempts the same rollback path.

use smallvec::SmallVec;
use tracing::{debug, warn};

use cadence_core::{Command, CommandKind, PlayerId, Tick};
use cadence_net::{NetEvent, NetworkService};
use cadence_replay::{ReplayData, ReplayPlayer, ReplayRecorder, ReplaySpeed};
use cadence_sim::Simulation;

use crate::buffer::{CommandList, InputBuffer};
use crate::config::LockstepConfig;
use crate::error::{EngineError, RollbackReason};
use crate::predictor::InputPredictor;

/// Lifecycle states of the engine.
///
/// `Running ⇌ Paused` flips on input availability when prediction is
/// disabled; `Finished` is terminal until a new session starts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineState {
    /// Constructed; no session armed.
    #[default]
    Idle,
    /// Armed and waiting for the host's game start.
    WaitingForPlayers,
    /// Ticking.
    Running,
    /// Stalled on missing inputs (prediction disabled).
    Paused,
    /// Session ended.
    Finished,
}

/// A remembered prediction awaiting validation by the real command.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct PendingPrediction {
    tick: Tick,
    player: PlayerId,
    kind: CommandKind,
}

type TickHook = Box<dyn FnMut(Tick)>;
type DesyncHook = Box<dyn FnMut(u64, u64)>;
type CommandHook = Box<dyn FnMut(&Command)>;
type FinishedHook = Box<dyn FnMut()>;

/// The deterministic lockstep engine.
pub struct LockstepEngine {
    config: LockstepConfig,
    state: EngineState,
    sim: Simulation,
    net: NetworkService,
    net_events: crossbeam_channel::Receiver<NetEvent>,
    buffer: InputBuffer,
    predictor: InputPredictor,
    pending_predictions: Vec<PendingPrediction>,

    current_tick: Tick,
    confirmed_tick: Tick,
    accumulator_ms: f64,
    elapsed_ms: f64,
    local_player_id: PlayerId,
    player_count: u32,

    recorder: ReplayRecorder,
    recording_enabled: bool,
    recorded_at_ms: i64,
    finished_replay: Option<ReplayData>,
    replay: Option<ReplayPlayer>,

    on_tick_executed: Option<TickHook>,
    on_desync_detected: Option<DesyncHook>,
    on_command_received: Option<CommandHook>,
    on_playback_finished: Option<FinishedHook>,

    ticks_confirmed: u64,
    ticks_predicted: u64,
    rollbacks_performed: u64,

    cmd_scratch: CommandList,
    history_scratch: Vec<Command>,
}

impl LockstepEngine {
    /// Wire a simulation and a network service into an engine.
    ///
    /// Neither component owns the other: the engine owns both and all
    /// cross-talk flows through it.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Config`] when the configuration fails
    /// validation.
    pub fn new(
        config: LockstepConfig,
        simulation: Simulation,
        network: NetworkService,
    ) -> Result<Self, EngineError> {
        config.validate()?;
        config.validate_ring_coverage(simulation.snapshots().capacity())?;
        let net_events = network.event_receiver();
        Ok(LockstepEngine {
            config,
            state: EngineState::Idle,
            sim: simulation,
            net: network,
            net_events,
            buffer: InputBuffer::new(),
            predictor: InputPredictor::new(),
            pending_predictions: Vec::new(),
            current_tick: Tick(0),
            confirmed_tick: Tick(-1),
            accumulator_ms: 0.0,
            elapsed_ms: 0.0,
            local_player_id: PlayerId(0),
            player_count: 0,
            recorder: ReplayRecorder::new(),
            recording_enabled: false,
            recorded_at_ms: 0,
            finished_replay: None,
            replay: None,
            on_tick_executed: None,
            on_desync_detected: None,
            on_command_received: None,
            on_playback_finished: None,
            ticks_confirmed: 0,
            ticks_predicted: 0,
            rollbacks_performed: 0,
            cmd_scratch: CommandList::new(),
            history_scratch: Vec::new(),
        })
    }

    // ── Lifecycle ───────────────────────────────────────────────

    /// Arm the engine. Ticking begins when the host's `GameStart`
    /// arrives (for the host, that is triggered by the all-ready check
    /// in the network service).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] unless the engine is
    /// `Idle` or `Finished`.
    pub fn start(&mut self, enable_recording: bool) -> Result<(), EngineError> {
        match self.state {
            EngineState::Idle | EngineState::Finished => {}
            state => {
                return Err(EngineError::InvalidState {
                    operation: "start",
                    state,
                })
            }
        }
        self.recording_enabled = enable_recording;
        self.state = EngineState::WaitingForPlayers;
        Ok(())
    }

    /// End the session immediately. No in-flight tick is interrupted —
    /// ticks are not suspendable.
    pub fn stop(&mut self) {
        if self.recorder.is_recording() {
            match self.recorder.stop(self.current_tick.0) {
                Ok(data) => self.finished_replay = Some(data),
                Err(e) => warn!(error = %e, "recorder stop failed"),
            }
        }
        self.state = EngineState::Finished;
    }

    /// Supply the wall-clock stamp recorded into replay metadata. The
    /// engine itself never reads clocks.
    pub fn set_recorded_at(&mut self, unix_ms: i64) {
        self.recorded_at_ms = unix_ms;
    }

    /// Advance the engine by `dt_seconds` of host time.
    ///
    /// Drains the transport, handles events, then runs due simulation
    /// ticks (or replay playback when a replay is loaded). Any rollback
    /// triggered by incoming traffic completes before this returns.
    ///
    /// # Errors
    ///
    /// Propagates simulation and replay failures; transport send
    /// failures inside the loop are logged and do not interrupt
    /// ticking.
    pub fn update(&mut self, dt_seconds: f64) -> Result<(), EngineError> {
        self.elapsed_ms += dt_seconds * 1000.0;

        if self.replay.is_some() {
            return self.update_replay(dt_seconds);
        }

        self.net.poll(self.elapsed_ms as i64);
        self.drain_net_events()?;

        if matches!(self.state, EngineState::Running | EngineState::Paused) {
            self.accumulator_ms += dt_seconds * 1000.0;
        }

        let interval = self.config.tick_interval_ms as f64;
        while self.accumulator_ms >= interval {
            if self.state != EngineState::Running {
                break;
            }
            if self.buffer.has_all(self.current_tick, self.player_count) {
                self.accumulator_ms -= interval;
                self.execute_confirmed_tick()?;
            } else if self.config.use_prediction {
                self.accumulator_ms -= interval;
                self.execute_predicted_tick()?;
            } else {
                debug!(tick = self.current_tick.0, "inputs missing, pausing");
                self.state = EngineState::Paused;
                break;
            }
        }
        Ok(())
    }

    // ── Local input ─────────────────────────────────────────────

    /// Schedule a local command.
    ///
    /// The tick is rewritten to `current_tick + input_delay_ticks` and
    /// the player to the local id; the command goes into the local
    /// buffer and out over the network in the same call.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] unless running or paused,
    /// or a network error from the broadcast.
    pub fn input_command(&mut self, mut cmd: Command) -> Result<(), EngineError> {
        if !matches!(self.state, EngineState::Running | EngineState::Paused) {
            return Err(EngineError::InvalidState {
                operation: "input_command",
                state: self.state,
            });
        }
        cmd.tick = self.current_tick.offset(self.config.input_delay_ticks as i32);
        cmd.player_id = self.local_player_id;
        self.buffer.add(cmd.clone());
        self.net.send_command(&cmd)?;
        Ok(())
    }

    // ── Event handling ──────────────────────────────────────────

    fn drain_net_events(&mut self) -> Result<(), EngineError> {
        while let Ok(event) = self.net_events.try_recv() {
            match event {
                NetEvent::CommandReceived(cmd) => self.handle_remote_command(cmd),
                NetEvent::GameStart {
                    seed,
                    tick_interval_ms,
                    input_delay_ticks,
                    player_ids,
                } => self.handle_game_start(seed, tick_interval_ms, input_delay_ticks, &player_ids),
                NetEvent::DesyncDetected {
                    player_id,
                    tick,
                    local_hash,
                    remote_hash,
                } => {
                    warn!(
                        tick = tick.0,
                        peer = player_id.0,
                        "desync detected, attempting rollback"
                    );
                    if let Some(hook) = self.on_desync_detected.as_mut() {
                        hook(local_hash, remote_hash);
                    }
                    if let Err(e) = self.rollback(tick) {
                        // Recovery beyond the rollback window is the
                        // application's call; the engine keeps running.
                        warn!(error = %e, "desync rollback failed");
                    }
                }
                NetEvent::PlayerJoined { player_id } => {
                    debug!(player = player_id.0, "player joined");
                }
                NetEvent::PlayerLeft { player_id } => {
                    debug!(player = player_id.0, "player left");
                }
                NetEvent::PlayerReadyChanged { .. } => {}
            }
        }
        Ok(())
    }

    fn handle_game_start(
        &mut self,
        seed: i32,
        tick_interval_ms: u32,
        input_delay_ticks: u32,
        player_ids: &[PlayerId],
    ) {
        if self.state != EngineState::WaitingForPlayers {
            debug!(state = ?self.state, "ignoring game start");
            return;
        }
        // The host's parameters win over local defaults.
        self.config.tick_interval_ms = tick_interval_ms;
        self.config.input_delay_ticks = input_delay_ticks;
        self.player_count = player_ids.len() as u32;
        self.local_player_id = self.net.local_player_id();

        self.sim.set_tick_interval_ms(tick_interval_ms);
        self.sim.initialize(seed as u32);
        self.buffer.clear();
        self.pending_predictions.clear();
        self.predictor.reset();
        self.current_tick = Tick(0);
        self.confirmed_tick = Tick(-1);
        // No ticks run until the next update; the host seeds the
        // initial world deterministically in between.
        self.accumulator_ms = 0.0;

        if self.recording_enabled {
            self.recorder.start(
                format!("session-{seed}"),
                self.recorded_at_ms,
                self.player_count as i32,
                tick_interval_ms,
                seed,
            );
        }

        // Prime the pipe: locally issued commands land at
        // `current + input_delay`, so ticks 0..input_delay can never be
        // covered by input_command. Seed them with empty inputs and
        // broadcast, as every peer does symmetrically.
        for t in 0..input_delay_ticks as i32 {
            let cmd = Command::empty(self.local_player_id, Tick(t));
            self.buffer.add(cmd.clone());
            if let Err(e) = self.net.send_command(&cmd) {
                warn!(error = %e, "pipe-priming broadcast failed");
            }
        }

        self.state = EngineState::Running;
    }

    fn handle_remote_command(&mut self, cmd: Command) {
        if let Some(hook) = self.on_command_received.as_mut() {
            hook(&cmd);
        }
        self.buffer.add(cmd.clone());

        if let Some(index) = self
            .pending_predictions
            .iter()
            .position(|p| p.tick == cmd.tick && p.player == cmd.player_id)
        {
            let predicted = self.pending_predictions.swap_remove(index);
            let actual = cmd.payload.kind();
            self.predictor.record_outcome(predicted.kind, actual);
            if predicted.kind != actual {
                debug!(
                    tick = cmd.tick.0,
                    player = cmd.player_id.0,
                    "misprediction, rolling back"
                );
                if let Err(e) = self.rollback(cmd.tick) {
                    warn!(error = %e, "misprediction rollback failed");
                }
            }
        }

        if self.state == EngineState::Paused
            && self.buffer.has_all(self.current_tick, self.player_count)
        {
            // Resume without a catch-up burst: replaying the stall time
            // at once would outrun the local input schedule (the host
            // samples input once per update), re-stalling immediately.
            self.accumulator_ms = 0.0;
            self.state = EngineState::Running;
        }
    }

    // ── Tick execution ──────────────────────────────────────────

    fn execute_confirmed_tick(&mut self) -> Result<(), EngineError> {
        self.maybe_snapshot();

        let tick = self.current_tick;
        let mut commands = std::mem::take(&mut self.cmd_scratch);
        self.buffer.collect_tick(tick, &mut commands);
        if self.recorder.is_recording() {
            self.recorder
                .record_tick(tick, &commands, self.net.registry())?;
        }
        self.sim.tick(&commands);
        self.cmd_scratch = commands;

        if tick.0 % self.config.sync_check_interval as i32 == 0 {
            let hash = self.sim.state_hash();
            if let Err(e) = self.net.send_sync_hash(tick, hash) {
                warn!(error = %e, "sync hash broadcast failed");
            }
        }

        self.confirmed_tick = tick;
        self.current_tick = tick.next();
        self.ticks_confirmed += 1;
        if let Some(hook) = self.on_tick_executed.as_mut() {
            hook(tick);
        }

        self.cleanup_old_data();
        Ok(())
    }

    fn execute_predicted_tick(&mut self) -> Result<(), EngineError> {
        self.maybe_snapshot();

        let tick = self.current_tick;
        let mut commands = std::mem::take(&mut self.cmd_scratch);
        commands.clear();
        for p in 0..self.player_count as i32 {
            let player = PlayerId(p);
            if let Some(cmd) = self.buffer.get(tick, player) {
                commands.push(cmd.clone());
            } else {
                self.fill_history(player, tick);
                let predicted = self.predictor.predict(player, tick, &self.history_scratch);
                self.pending_predictions.push(PendingPrediction {
                    tick,
                    player,
                    kind: predicted.payload.kind(),
                });
                commands.push(predicted);
            }
        }
        // Predicted ticks are recorded too, so the log stays contiguous;
        // rollback resimulation re-records corrected ticks over them.
        if self.recorder.is_recording() {
            self.recorder
                .record_tick(tick, &commands, self.net.registry())?;
        }
        self.sim.tick(&commands);
        self.cmd_scratch = commands;

        self.current_tick = tick.next();
        self.ticks_predicted += 1;
        if let Some(hook) = self.on_tick_executed.as_mut() {
            hook(tick);
        }
        Ok(())
    }

    /// Gather `player`'s most recent real commands (up to five, oldest
    /// first) into the history scratch.
    fn fill_history(&mut self, player: PlayerId, before: Tick) {
        self.history_scratch.clear();
        let oldest = self.buffer.oldest_tick().map_or(before.0, |t| t.0);
        let mut t = before.0 - 1;
        let mut collected: SmallVec<[Command; 5]> = SmallVec::new();
        while t >= oldest && collected.len() < 5 {
            if let Some(cmd) = self.buffer.get(Tick(t), player) {
                collected.push(cmd.clone());
            }
            t -= 1;
        }
        // Scanned newest-first; history reads oldest-first.
        self.history_scratch.extend(collected.into_iter().rev());
    }

    fn maybe_snapshot(&mut self) {
        if self.current_tick.0 % self.config.snapshot_interval as i32 == 0 {
            self.sim.save_snapshot();
        }
    }

    fn cleanup_old_data(&mut self) {
        let horizon = self.current_tick.0 - self.config.max_rollback_ticks as i32 - 10;
        if horizon > 0 {
            self.buffer.clear_before(Tick(horizon));
            self.net.clear_old_data(Tick(horizon));
        }
    }

    // ── Rollback ────────────────────────────────────────────────

    /// Roll back to `target` and resimulate forward with the inputs now
    /// in the buffer.
    ///
    /// Resimulation runs confirmed ticks as far as inputs allow; if a
    /// gap is hit, the engine stops there and the normal gate logic
    /// (prediction or pause) takes over on the next update.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::RollbackRejected`] when the target has
    /// not been executed yet, lies outside the rollback window, or has
    /// no retained snapshot. The engine continues at its current tick
    /// in every rejection case.
    pub fn rollback(&mut self, target: Tick) -> Result<(), EngineError> {
        if target >= self.current_tick {
            return Err(EngineError::RollbackRejected {
                target,
                reason: RollbackReason::TargetInFuture,
            });
        }
        if target.0 < self.current_tick.0 - self.config.max_rollback_ticks as i32 {
            return Err(EngineError::RollbackRejected {
                target,
                reason: RollbackReason::OutsideWindow,
            });
        }

        let resume_to = self.current_tick;
        let restored = self
            .sim
            .rollback(target)
            .map_err(|_| EngineError::RollbackRejected {
                target,
                reason: RollbackReason::NoSnapshot,
            })?;

        debug!(
            target = target.0,
            restored = restored.0,
            resume_to = resume_to.0,
            "rolled back, resimulating"
        );
        self.pending_predictions.clear();
        self.rollbacks_performed += 1;
        self.current_tick = restored;

        // Resimulate forward through the same gate logic as the live
        // path: confirmed where inputs are complete, predicted across
        // gaps. This keeps current_tick in step with the already-spent
        // accumulator; with prediction disabled, a gap stops the resim
        // and the engine resumes when inputs arrive.
        while self.current_tick < resume_to {
            if self.buffer.has_all(self.current_tick, self.player_count) {
                self.execute_confirmed_tick()?;
            } else if self.config.use_prediction {
                self.execute_predicted_tick()?;
            } else {
                break;
            }
        }
        Ok(())
    }

    // ── Replay ──────────────────────────────────────────────────

    /// Write the finished recording to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Replay`] if no recording has been
    /// finished (call [`stop`](LockstepEngine::stop) first) or on file
    /// I/O failure.
    pub fn save_replay_to_file(&self, path: &std::path::Path) -> Result<(), EngineError> {
        let data = self
            .finished_replay
            .as_ref()
            .ok_or(EngineError::Replay(cadence_replay::ReplayError::NotRecording))?;
        let file = std::fs::File::create(path).map_err(cadence_replay::ReplayError::Io)?;
        let mut writer = std::io::BufWriter::new(file);
        cadence_replay::codec::write_replay(&mut writer, data)?;
        Ok(())
    }

    /// The finished recording, once [`stop`](LockstepEngine::stop) has
    /// run with recording enabled.
    pub fn finished_replay(&self) -> Option<&ReplayData> {
        self.finished_replay.as_ref()
    }

    /// Load a replay file and enter playback mode.
    ///
    /// # Errors
    ///
    /// Propagates container errors ([`EngineError::Replay`]) and state
    /// errors from [`start_replay`](LockstepEngine::start_replay).
    pub fn start_replay_from_file(&mut self, path: &std::path::Path) -> Result<(), EngineError> {
        let file = std::fs::File::open(path).map_err(cadence_replay::ReplayError::Io)?;
        let mut reader = std::io::BufReader::new(file);
        let data = cadence_replay::codec::read_replay(&mut reader, self.net.registry())?;
        self.start_replay(data)
    }

    /// Enter playback mode over an in-memory replay.
    ///
    /// The simulation is reinitialized with the replay's seed and tick
    /// interval; the host must seed the same initial world it used for
    /// the live session before the next [`update`](LockstepEngine::update).
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidState`] unless `Idle` or
    /// `Finished`.
    pub fn start_replay(&mut self, data: ReplayData) -> Result<(), EngineError> {
        match self.state {
            EngineState::Idle | EngineState::Finished => {}
            state => {
                return Err(EngineError::InvalidState {
                    operation: "start_replay",
                    state,
                })
            }
        }
        self.sim
            .set_tick_interval_ms(data.metadata.tick_interval_ms as u32);
        self.sim.initialize(data.metadata.random_seed as u32);
        self.player_count = data.metadata.player_count as u32;
        self.buffer.clear();
        self.pending_predictions.clear();
        self.current_tick = Tick(0);
        self.confirmed_tick = Tick(-1);

        let mut player = ReplayPlayer::load(data);
        player.play();
        self.replay = Some(player);
        Ok(())
    }

    fn update_replay(&mut self, dt_seconds: f64) -> Result<(), EngineError> {
        let snapshot_interval = self.config.snapshot_interval as i32;
        let Self { replay, sim, .. } = &mut *self;
        let Some(player) = replay.as_mut() else {
            return Err(EngineError::NoReplayLoaded);
        };
        let step = player.update(dt_seconds, |tick, commands| {
            if tick.0 % snapshot_interval == 0 {
                sim.save_snapshot();
            }
            sim.tick(commands);
        });
        self.current_tick = self.sim.current_tick();
        if step.just_finished {
            if let Some(hook) = self.on_playback_finished.as_mut() {
                hook();
            }
        }
        Ok(())
    }

    /// Pause playback.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoReplayLoaded`] outside playback mode.
    pub fn pause_replay(&mut self) -> Result<(), EngineError> {
        self.replay
            .as_mut()
            .map(|p| p.pause())
            .ok_or(EngineError::NoReplayLoaded)
    }

    /// Resume playback.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoReplayLoaded`] outside playback mode.
    pub fn resume_replay(&mut self) -> Result<(), EngineError> {
        self.replay
            .as_mut()
            .map(|p| p.resume())
            .ok_or(EngineError::NoReplayLoaded)
    }

    /// Change playback speed.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoReplayLoaded`] outside playback mode.
    pub fn set_replay_speed(&mut self, speed: ReplaySpeed) -> Result<(), EngineError> {
        self.replay
            .as_mut()
            .map(|p| p.set_speed(speed))
            .ok_or(EngineError::NoReplayLoaded)
    }

    /// Seek playback to `target`.
    ///
    /// Backward seeks roll the simulation back to the nearest snapshot
    /// at or before the target and resimulate from the log; forward
    /// seeks fast-forward through the log. Snapshots are refreshed
    /// every `snapshot_interval` ticks along the way so future seeks
    /// stay cheap.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NoReplayLoaded`] outside playback mode,
    /// or [`EngineError::RollbackRejected`] when no snapshot covers a
    /// backward target.
    pub fn seek_replay(&mut self, target: Tick) -> Result<(), EngineError> {
        let mut player = self.replay.take().ok_or(EngineError::NoReplayLoaded)?;
        let result = self.seek_replay_inner(&mut player, target);
        self.replay = Some(player);
        result
    }

    fn seek_replay_inner(
        &mut self,
        player: &mut ReplayPlayer,
        target: Tick,
    ) -> Result<(), EngineError> {
        if target < self.sim.current_tick() {
            self.sim
                .rollback(target)
                .map_err(|_| EngineError::RollbackRejected {
                    target,
                    reason: RollbackReason::NoSnapshot,
                })?;
        }

        // Fast-forward the simulation through the log up to the target.
        let data = player.data();
        let start = data.index_at_or_after(self.sim.current_tick());
        let end = data.index_at_or_after(target);
        for entry in &data.ticks[start..end] {
            if entry.tick.0 % self.config.snapshot_interval as i32 == 0 {
                self.sim.save_snapshot();
            }
            self.sim.tick(&entry.commands);
        }

        player.seek_cursor(target);
        self.current_tick = self.sim.current_tick();
        Ok(())
    }

    /// Seek playback to a `[0, 1]` progress fraction.
    ///
    /// # Errors
    ///
    /// Same as [`seek_replay`](LockstepEngine::seek_replay).
    pub fn seek_replay_progress(&mut self, progress: f64) -> Result<(), EngineError> {
        let target = self
            .replay
            .as_ref()
            .ok_or(EngineError::NoReplayLoaded)?
            .tick_at_progress(progress);
        match target {
            Some(tick) => self.seek_replay(tick),
            None => Ok(()),
        }
    }

    /// Leave playback mode, keeping the simulation where playback left
    /// it.
    pub fn stop_replay(&mut self) {
        self.replay = None;
    }

    /// Whether a replay is loaded.
    pub fn is_replaying(&self) -> bool {
        self.replay.is_some()
    }

    /// The playback driver, when loaded.
    pub fn replay_player(&self) -> Option<&ReplayPlayer> {
        self.replay.as_ref()
    }

    // ── Observability hooks ─────────────────────────────────────

    /// Called after each executed tick, before any work on the next.
    pub fn set_on_tick_executed(&mut self, hook: impl FnMut(Tick) + 'static) {
        self.on_tick_executed = Some(Box::new(hook));
    }

    /// Called with `(local_hash, remote_hash)` when a desync is
    /// reported.
    pub fn set_on_desync_detected(&mut self, hook: impl FnMut(u64, u64) + 'static) {
        self.on_desync_detected = Some(Box::new(hook));
    }

    /// Called for every remote command accepted into the buffer.
    pub fn set_on_command_received(&mut self, hook: impl FnMut(&Command) + 'static) {
        self.on_command_received = Some(Box::new(hook));
    }

    /// Called when replay playback reaches the end of the log.
    pub fn set_on_playback_finished(&mut self, hook: impl FnMut() + 'static) {
        self.on_playback_finished = Some(Box::new(hook));
    }

    // ── Accessors ───────────────────────────────────────────────

    /// Current lifecycle state.
    pub fn state(&self) -> EngineState {
        self.state
    }

    /// The tick the engine will execute next.
    pub fn current_tick(&self) -> Tick {
        self.current_tick
    }

    /// The most recent tick executed with all real inputs.
    pub fn confirmed_tick(&self) -> Tick {
        self.confirmed_tick
    }

    /// The local player id (fixed at game start).
    pub fn local_player_id(&self) -> PlayerId {
        self.local_player_id
    }

    /// Number of players in the session.
    pub fn player_count(&self) -> u32 {
        self.player_count
    }

    /// The active configuration (host values after game start).
    pub fn config(&self) -> &LockstepConfig {
        &self.config
    }

    /// Confirmed ticks executed this session.
    pub fn ticks_confirmed(&self) -> u64 {
        self.ticks_confirmed
    }

    /// Predicted ticks executed this session.
    pub fn ticks_predicted(&self) -> u64 {
        self.ticks_predicted
    }

    /// Rollbacks performed this session.
    pub fn rollbacks_performed(&self) -> u64 {
        self.rollbacks_performed
    }

    /// Prediction accuracy in `[0, 1]` (observability only).
    pub fn prediction_accuracy(&self) -> f64 {
        self.predictor.accuracy()
    }

    /// The simulation (render layer reads entity state here after
    /// [`update`](LockstepEngine::update)).
    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// Mutable simulation access for deterministic session setup
    /// (spawning the initial world between game start and the first
    /// tick).
    pub fn simulation_mut(&mut self) -> &mut Simulation {
        &mut self.sim
    }

    /// The network service.
    pub fn network(&self) -> &NetworkService {
        &self.net
    }

    /// Mutable network service access (room lifecycle, readiness).
    pub fn network_mut(&mut self) -> &mut NetworkService {
        &mut self.net
    }

    /// The input buffer, for observability.
    pub fn input_buffer(&self) -> &InputBuffer {
        &self.buffer
    }
}

impl std::fmt::Debug for LockstepEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockstepEngine")
            .field("state", &self.state)
            .field("current_tick", &self.current_tick)
            .field("confirmed_tick", &self.confirmed_tick)
            .field("player_count", &self.player_count)
            .field("local_player_id", &self.local_player_id)
            .field("replaying", &self.replay.is_some())
            .finish()
    }
}

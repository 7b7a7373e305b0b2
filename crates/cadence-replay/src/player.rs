//! Playback clock for a recorded session.
//!
//! [`ReplayPlayer`] mirrors the engine's accumulator-driven tick clock:
//! the host calls [`update`](ReplayPlayer::update) at render cadence and
//! the player emits due tick entries through a callback. The host feeds
//! each entry into its simulation — no network, no prediction, no local
//! input. Seeking is cursor arithmetic here; the resimulation a backward
//! seek needs lives with the engine, which owns the snapshots.

use tracing::debug;

use cadence_core::{Command, Tick};

use crate::types::ReplayData;

/// Playback speed multiplier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ReplaySpeed {
    /// 0.25×.
    Quarter,
    /// 0.5×.
    Half,
    /// 1×.
    #[default]
    Normal,
    /// 2×.
    Double,
    /// 4×.
    Quadruple,
}

impl ReplaySpeed {
    /// The multiplier as a float for accumulator arithmetic.
    pub fn multiplier(self) -> f64 {
        match self {
            Self::Quarter => 0.25,
            Self::Half => 0.5,
            Self::Normal => 1.0,
            Self::Double => 2.0,
            Self::Quadruple => 4.0,
        }
    }
}

/// What an [`update`](ReplayPlayer::update) call did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaybackStep {
    /// Number of tick entries emitted during this update.
    pub ticks_played: u32,
    /// Whether playback reached the end of the log in this update.
    pub just_finished: bool,
}

/// Drives a [`ReplayData`] log on the engine's tick cadence.
#[derive(Debug)]
pub struct ReplayPlayer {
    data: ReplayData,
    cursor: usize,
    accumulator_ms: f64,
    speed: ReplaySpeed,
    playing: bool,
    finished: bool,
}

impl ReplayPlayer {
    /// Load a recorded session, paused at the start.
    pub fn load(data: ReplayData) -> Self {
        ReplayPlayer {
            data,
            cursor: 0,
            accumulator_ms: 0.0,
            speed: ReplaySpeed::Normal,
            playing: false,
            finished: false,
        }
    }

    /// Begin (or restart) playback from the current cursor.
    pub fn play(&mut self) {
        if self.finished {
            debug!("play after finish restarts from the top");
            self.cursor = 0;
            self.finished = false;
        }
        self.playing = true;
        // An empty log has nothing to play.
        if self.data.ticks.is_empty() {
            self.playing = false;
            self.finished = true;
        }
    }

    /// Pause, keeping the cursor.
    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Resume after a pause.
    pub fn resume(&mut self) {
        if !self.finished {
            self.playing = true;
        }
    }

    /// Stop and rewind to the start.
    pub fn stop(&mut self) {
        self.playing = false;
        self.finished = false;
        self.cursor = 0;
        self.accumulator_ms = 0.0;
    }

    /// Set the playback speed.
    pub fn set_speed(&mut self, speed: ReplaySpeed) {
        self.speed = speed;
    }

    /// The current speed.
    pub fn speed(&self) -> ReplaySpeed {
        self.speed
    }

    /// Whether playback is running.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Whether the cursor has consumed the whole log.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// The tick the next emitted entry will carry, or `None` at the end.
    pub fn upcoming_tick(&self) -> Option<Tick> {
        self.data.ticks.get(self.cursor).map(|e| e.tick)
    }

    /// Playback position in `[0, 1]`.
    pub fn progress(&self) -> f64 {
        if self.data.ticks.is_empty() {
            return 1.0;
        }
        self.cursor as f64 / self.data.ticks.len() as f64
    }

    /// The loaded log.
    pub fn data(&self) -> &ReplayData {
        &self.data
    }

    /// Move the cursor to the first entry at or after `tick` without
    /// emitting anything. The engine performs the state work a backward
    /// seek requires before calling this.
    pub fn seek_cursor(&mut self, tick: Tick) {
        self.cursor = self.data.index_at_or_after(tick);
        self.accumulator_ms = 0.0;
        self.finished = self.cursor >= self.data.ticks.len();
    }

    /// Map a `[0, 1]` progress fraction to the tick at that position.
    pub fn tick_at_progress(&self, progress: f64) -> Option<Tick> {
        if self.data.ticks.is_empty() {
            return None;
        }
        let clamped = progress.clamp(0.0, 1.0);
        let index = ((self.data.ticks.len() - 1) as f64 * clamped) as usize;
        Some(self.data.ticks[index].tick)
    }

    /// Advance the playback clock by `dt_seconds`, emitting every due
    /// tick entry to `on_tick` in order.
    ///
    /// One entry becomes due per `tick_interval_ms / speed` of wall
    /// time. Returns how many entries were emitted and whether the log
    /// ended during this call.
    pub fn update(
        &mut self,
        dt_seconds: f64,
        mut on_tick: impl FnMut(Tick, &[Command]),
    ) -> PlaybackStep {
        let mut step = PlaybackStep {
            ticks_played: 0,
            just_finished: false,
        };
        if !self.playing || self.finished {
            return step;
        }

        let interval = self.data.metadata.tick_interval_ms as f64;
        self.accumulator_ms += dt_seconds * 1000.0 * self.speed.multiplier();

        while self.accumulator_ms >= interval {
            self.accumulator_ms -= interval;
            match self.data.ticks.get(self.cursor) {
                Some(entry) => {
                    on_tick(entry.tick, &entry.commands);
                    self.cursor += 1;
                    step.ticks_played += 1;
                }
                None => break,
            }
            if self.cursor >= self.data.ticks.len() {
                self.playing = false;
                self.finished = true;
                step.just_finished = true;
                break;
            }
        }
        step
    }
}

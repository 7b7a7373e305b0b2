//! In-memory replay data types.

use cadence_core::{Command, Tick};

/// Session metadata stored in the replay header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayMetadata {
    /// Container version the data was written with.
    pub version: i32,
    /// Free-form session identifier.
    pub session_id: String,
    /// Caller-supplied wall-clock at recording start, unix milliseconds.
    /// The core never reads clocks itself.
    pub recorded_at: i64,
    /// Session length in milliseconds (`total_ticks * tick_interval_ms`).
    pub duration_ms: i64,
    /// Number of ticks the session ran.
    pub total_ticks: i32,
    /// Number of players in the session.
    pub player_count: i32,
    /// Tick duration the session used.
    pub tick_interval_ms: i32,
    /// Simulation seed the session used.
    pub random_seed: i32,
}

/// One recorded tick: the tick number and the commands executed in it,
/// in execution order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickEntry {
    /// The executed tick.
    pub tick: Tick,
    /// The commands applied during that tick.
    pub commands: Vec<Command>,
}

/// A complete recorded session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReplayData {
    /// Header metadata.
    pub metadata: ReplayMetadata,
    /// Tick entries in ascending tick order.
    pub ticks: Vec<TickEntry>,
}

impl ReplayData {
    /// The entry for `tick`, if it was recorded.
    pub fn entry_at(&self, tick: Tick) -> Option<&TickEntry> {
        self.ticks
            .binary_search_by_key(&tick.0, |e| e.tick.0)
            .ok()
            .map(|i| &self.ticks[i])
    }

    /// The index of the first entry with `entry.tick >= tick`.
    pub fn index_at_or_after(&self, tick: Tick) -> usize {
        self.ticks.partition_point(|e| e.tick.0 < tick.0)
    }

    /// Total number of recorded tick entries.
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Whether the log holds no ticks.
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

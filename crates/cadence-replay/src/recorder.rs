//! Command-log capture during a live session.

use cadence_core::{Command, CommandRegistry, Tick};

use crate::error::ReplayError;
use crate::types::{ReplayData, ReplayMetadata, TickEntry};
use crate::CURRENT_VERSION;

/// Records per-tick command lists into a [`ReplayData`].
///
/// Commands are deep-copied through the registry's serialize→decode
/// path so the log never aliases live engine buffers. Entries are keyed
/// by tick: re-recording a tick (rollback resimulation) overwrites the
/// earlier entry, keeping the log canonical.
#[derive(Debug, Default)]
pub struct ReplayRecorder {
    data: Option<ReplayData>,
}

impl ReplayRecorder {
    /// A recorder with no active recording.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a recording. Discards any previous unfinished one.
    ///
    /// `recorded_at` is the host's wall clock in unix milliseconds; the
    /// core never samples clocks itself.
    pub fn start(
        &mut self,
        session_id: String,
        recorded_at: i64,
        player_count: i32,
        tick_interval_ms: u32,
        seed: i32,
    ) {
        self.data = Some(ReplayData {
            metadata: ReplayMetadata {
                version: CURRENT_VERSION,
                session_id,
                recorded_at,
                duration_ms: 0,
                total_ticks: 0,
                player_count,
                tick_interval_ms: tick_interval_ms as i32,
                random_seed: seed,
            },
            ticks: Vec::new(),
        });
    }

    /// Whether a recording is in progress.
    pub fn is_recording(&self) -> bool {
        self.data.is_some()
    }

    /// Append (or overwrite) the entry for `tick` with deep copies of
    /// `commands`.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::NotRecording`] outside a recording, or
    /// [`ReplayError::InvalidReplayFormat`] if a command's kind is not
    /// in `registry` (the copy is the serialize→decode round trip).
    pub fn record_tick(
        &mut self,
        tick: Tick,
        commands: &[Command],
        registry: &CommandRegistry,
    ) -> Result<(), ReplayError> {
        let data = self.data.as_mut().ok_or(ReplayError::NotRecording)?;

        let mut copies = Vec::with_capacity(commands.len());
        for cmd in commands {
            copies.push(registry.clone_via_wire(cmd)?);
        }
        let entry = TickEntry {
            tick,
            commands: copies,
        };

        match data.ticks.binary_search_by_key(&tick.0, |e| e.tick.0) {
            Ok(i) => data.ticks[i] = entry,
            Err(i) => data.ticks.insert(i, entry),
        }
        Ok(())
    }

    /// Freeze the metadata and return the finished log.
    ///
    /// # Errors
    ///
    /// Returns [`ReplayError::NotRecording`] outside a recording.
    pub fn stop(&mut self, total_ticks: i32) -> Result<ReplayData, ReplayError> {
        let mut data = self.data.take().ok_or(ReplayError::NotRecording)?;
        data.metadata.total_ticks = total_ticks;
        data.metadata.duration_ms = total_ticks as i64 * data.metadata.tick_interval_ms as i64;
        Ok(data)
    }

    /// The in-progress log, for observability.
    pub fn data(&self) -> Option<&ReplayData> {
        self.data.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{CommandPayload, PlayerId};
    use cadence_fixed::FpVec3;

    fn recorder() -> ReplayRecorder {
        let mut rec = ReplayRecorder::new();
        rec.start("s".into(), 0, 2, 50, 7);
        rec
    }

    fn move_cmd(tick: i32) -> Command {
        Command {
            player_id: PlayerId(0),
            tick: Tick(tick),
            payload: CommandPayload::Move {
                target: FpVec3::from_ints(1, 0, 1),
            },
        }
    }

    #[test]
    fn records_deep_copies_keyed_by_tick() {
        let registry = CommandRegistry::default();
        let mut rec = recorder();

        rec.record_tick(Tick(0), &[move_cmd(0)], &registry).unwrap();
        rec.record_tick(Tick(1), &[], &registry).unwrap();

        let data = rec.stop(2).unwrap();
        assert_eq!(data.ticks.len(), 2);
        assert_eq!(data.ticks[0].commands.len(), 1);
        assert_eq!(data.ticks[0].commands[0], move_cmd(0));
        assert_eq!(data.metadata.total_ticks, 2);
        assert_eq!(data.metadata.duration_ms, 100);
    }

    #[test]
    fn rerecording_a_tick_overwrites() {
        let registry = CommandRegistry::default();
        let mut rec = recorder();

        rec.record_tick(Tick(5), &[], &registry).unwrap();
        rec.record_tick(Tick(6), &[], &registry).unwrap();
        // Rollback resimulation revisits tick 5 with the real command.
        rec.record_tick(Tick(5), &[move_cmd(5)], &registry).unwrap();

        let data = rec.stop(7).unwrap();
        assert_eq!(data.ticks.len(), 2);
        assert_eq!(data.entry_at(Tick(5)).unwrap().commands.len(), 1);
    }

    #[test]
    fn entries_stay_sorted_even_out_of_order() {
        let registry = CommandRegistry::default();
        let mut rec = recorder();
        for t in [3, 1, 2, 0] {
            rec.record_tick(Tick(t), &[], &registry).unwrap();
        }
        let data = rec.stop(4).unwrap();
        let order: Vec<i32> = data.ticks.iter().map(|e| e.tick.0).collect();
        assert_eq!(order, vec![0, 1, 2, 3]);
    }

    #[test]
    fn operations_outside_recording_fail() {
        let registry = CommandRegistry::default();
        let mut rec = ReplayRecorder::new();
        assert!(matches!(
            rec.record_tick(Tick(0), &[], &registry),
            Err(ReplayError::NotRecording)
        ));
        assert!(matches!(rec.stop(0), Err(ReplayError::NotRecording)));
    }

    #[test]
    fn stop_ends_the_recording() {
        let mut rec = recorder();
        assert!(rec.is_recording());
        rec.stop(0).unwrap();
        assert!(!rec.is_recording());
    }
}

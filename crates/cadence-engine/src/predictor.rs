//! Last-value input prediction for missing `(tick, player)` slots.
//!
//! When the engine must advance without a player's real input, the
//! predictor clones that player's most recent command with the tick
//! rewritten, or emits `Empty` when there is no history. The engine
//! validates predictions as real commands arrive and reports outcomes
//! back; the accuracy ratio is observability only and never changes
//! engine behavior.

use cadence_core::{Command, CommandKind, PlayerId, Tick};

/// Simple last-value command predictor with an accuracy counter.
#[derive(Debug, Default)]
pub struct InputPredictor {
    total: u64,
    correct: u64,
}

impl InputPredictor {
    /// A predictor with zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Predict `player`'s command for `tick` from their recent history.
    ///
    /// `history` is the player's latest real commands, oldest first; the
    /// engine passes at most the last five. The newest entry is cloned
    /// with the tick rewritten; with no history the prediction is
    /// `Empty`.
    pub fn predict(&self, player: PlayerId, tick: Tick, history: &[Command]) -> Command {
        match history.last() {
            Some(latest) => Command {
                player_id: player,
                tick,
                payload: latest.payload.clone(),
            },
            None => Command::empty(player, tick),
        }
    }

    /// Record whether a prediction's kind matched the real command's.
    pub fn record_outcome(&mut self, predicted: CommandKind, actual: CommandKind) {
        self.total += 1;
        if predicted == actual {
            self.correct += 1;
        }
    }

    /// Fraction of predictions whose kind matched, in `[0, 1]`.
    /// Returns 1.0 before any outcome is recorded.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }

    /// Number of predictions validated so far.
    pub fn total_validated(&self) -> u64 {
        self.total
    }

    /// Number of validated predictions whose kind matched.
    pub fn total_correct(&self) -> u64 {
        self.correct
    }

    /// Zero the counters (new session).
    pub fn reset(&mut self) {
        self.total = 0;
        self.correct = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::CommandPayload;
    use cadence_fixed::FpVec3;

    fn move_cmd(player: i32, tick: i32) -> Command {
        Command {
            player_id: PlayerId(player),
            tick: Tick(tick),
            payload: CommandPayload::Move {
                target: FpVec3::from_ints(1, 0, 1),
            },
        }
    }

    #[test]
    fn no_history_predicts_empty() {
        let predictor = InputPredictor::new();
        let predicted = predictor.predict(PlayerId(2), Tick(7), &[]);
        assert_eq!(predicted, Command::empty(PlayerId(2), Tick(7)));
    }

    #[test]
    fn clones_latest_with_rewritten_tick() {
        let predictor = InputPredictor::new();
        let history = vec![move_cmd(1, 3), move_cmd(1, 4)];
        let predicted = predictor.predict(PlayerId(1), Tick(9), &history);
        assert_eq!(predicted.tick, Tick(9));
        assert_eq!(predicted.player_id, PlayerId(1));
        assert_eq!(predicted.payload, history[1].payload);
    }

    #[test]
    fn accuracy_counts_kind_matches() {
        let mut predictor = InputPredictor::new();
        assert_eq!(predictor.accuracy(), 1.0);

        predictor.record_outcome(CommandKind::EMPTY, CommandKind::EMPTY);
        predictor.record_outcome(CommandKind::EMPTY, CommandKind::ACTION);
        predictor.record_outcome(CommandKind::MOVE, CommandKind::MOVE);
        predictor.record_outcome(CommandKind::MOVE, CommandKind::EMPTY);

        assert_eq!(predictor.total_validated(), 4);
        assert_eq!(predictor.total_correct(), 2);
        assert!((predictor.accuracy() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn reset_zeroes_counters() {
        let mut predictor = InputPredictor::new();
        predictor.record_outcome(CommandKind::EMPTY, CommandKind::MOVE);
        predictor.reset();
        assert_eq!(predictor.total_validated(), 0);
        assert_eq!(predictor.accuracy(), 1.0);
    }
}

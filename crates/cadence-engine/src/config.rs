//! Lockstep engine configuration and validation.

use std::error::Error;
use std::fmt;

/// Tunable parameters for a lockstep session.
///
/// The host's values win: `GameStart` carries the tick interval and
/// input delay to every peer, so mismatched local defaults cannot
/// desynchronize a session.
#[derive(Clone, Debug)]
pub struct LockstepConfig {
    /// Simulation step duration in milliseconds.
    pub tick_interval_ms: u32,
    /// Forward offset applied to locally issued commands so peers
    /// receive them before execution.
    pub input_delay_ticks: u32,
    /// How far back the engine will roll back, in ticks.
    pub max_rollback_ticks: u32,
    /// State hashes are exchanged every this many ticks.
    pub sync_check_interval: u32,
    /// Whether to advance with predicted inputs when real ones are
    /// missing (otherwise the engine pauses).
    pub use_prediction: bool,
    /// A snapshot is saved every this many ticks.
    pub snapshot_interval: u32,
}

impl Default for LockstepConfig {
    fn default() -> Self {
        LockstepConfig {
            tick_interval_ms: 50,
            input_delay_ticks: 2,
            max_rollback_ticks: 10,
            sync_check_interval: 30,
            use_prediction: true,
            snapshot_interval: 5,
        }
    }
}

impl LockstepConfig {
    /// Check structural invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant as a [`ConfigError`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.sync_check_interval == 0 {
            return Err(ConfigError::ZeroSyncInterval);
        }
        if self.snapshot_interval == 0 {
            return Err(ConfigError::ZeroSnapshotInterval);
        }
        Ok(())
    }

    /// Check that a snapshot ring of `ring_capacity` entries can span
    /// the rollback window at this snapshot cadence. The engine calls
    /// this against the simulation it is handed.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::WindowNotCovered`] when it cannot.
    pub fn validate_ring_coverage(&self, ring_capacity: usize) -> Result<(), ConfigError> {
        let coverage = self.snapshot_interval as u64 * ring_capacity as u64;
        if coverage < self.max_rollback_ticks as u64 {
            return Err(ConfigError::WindowNotCovered {
                coverage,
                window: self.max_rollback_ticks,
            });
        }
        Ok(())
    }
}

/// Errors detected by [`LockstepConfig::validate`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `tick_interval_ms` is zero.
    ZeroTickInterval,
    /// `sync_check_interval` is zero.
    ZeroSyncInterval,
    /// `snapshot_interval` is zero.
    ZeroSnapshotInterval,
    /// The snapshot ring cannot span the rollback window.
    WindowNotCovered {
        /// Ticks the ring can span (`snapshot_interval * ring capacity`).
        coverage: u64,
        /// The configured rollback window.
        window: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroTickInterval => write!(f, "tick_interval_ms must be at least 1"),
            Self::ZeroSyncInterval => write!(f, "sync_check_interval must be at least 1"),
            Self::ZeroSnapshotInterval => write!(f, "snapshot_interval must be at least 1"),
            Self::WindowNotCovered { coverage, window } => write!(
                f,
                "snapshot ring spans {coverage} ticks but max_rollback_ticks is {window}"
            ),
        }
    }
}

impl Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(LockstepConfig::default().validate().is_ok());
    }

    #[test]
    fn default_values_match_protocol_defaults() {
        let cfg = LockstepConfig::default();
        assert_eq!(cfg.tick_interval_ms, 50);
        assert_eq!(cfg.input_delay_ticks, 2);
        assert_eq!(cfg.max_rollback_ticks, 10);
        assert_eq!(cfg.sync_check_interval, 30);
        assert!(cfg.use_prediction);
    }

    #[test]
    fn zero_interval_rejected() {
        let cfg = LockstepConfig {
            tick_interval_ms: 0,
            ..LockstepConfig::default()
        };
        assert_eq!(cfg.validate(), Err(ConfigError::ZeroTickInterval));
    }

    #[test]
    fn uncovered_window_rejected() {
        let cfg = LockstepConfig {
            snapshot_interval: 5,
            max_rollback_ticks: 10,
            ..LockstepConfig::default()
        };
        assert_eq!(
            cfg.validate_ring_coverage(1),
            Err(ConfigError::WindowNotCovered {
                coverage: 5,
                window: 10
            })
        );
        assert!(cfg.validate_ring_coverage(2).is_ok());
    }
}

//! Error types for the lockstep engine.

use std::error::Error;
use std::fmt;

use cadence_core::Tick;
use cadence_net::NetError;
use cadence_replay::ReplayError;
use cadence_sim::SimError;

use crate::config::ConfigError;
use crate::engine::EngineState;

/// Why a rollback request was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RollbackReason {
    /// The target tick has not been executed yet — nothing to undo.
    TargetInFuture,
    /// The target is further back than `max_rollback_ticks`.
    OutsideWindow,
    /// No snapshot at or before the target is retained.
    NoSnapshot,
}

impl fmt::Display for RollbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TargetInFuture => write!(f, "target tick is in the future"),
            Self::OutsideWindow => write!(f, "target is outside the rollback window"),
            Self::NoSnapshot => write!(f, "no snapshot at or before the target"),
        }
    }
}

/// Errors from engine lifecycle, rollback, and replay operations.
#[derive(Debug)]
pub enum EngineError {
    /// The configuration failed validation at construction.
    Config(ConfigError),
    /// An operation was called in the wrong lifecycle state.
    InvalidState {
        /// The operation attempted.
        operation: &'static str,
        /// The state the engine was in.
        state: EngineState,
    },
    /// A rollback request could not be honored. The engine keeps
    /// running at its current tick.
    RollbackRejected {
        /// The requested target.
        target: Tick,
        /// Why it was rejected.
        reason: RollbackReason,
    },
    /// A simulation-layer failure (snapshot restore, factory lookup).
    Sim(SimError),
    /// A network-layer failure.
    Net(NetError),
    /// A replay-layer failure (file I/O, container format, recorder).
    Replay(ReplayError),
    /// A replay operation was called with no replay loaded.
    NoReplayLoaded,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid config: {e}"),
            Self::InvalidState { operation, state } => {
                write!(f, "{operation} is not valid in state {state:?}")
            }
            Self::RollbackRejected { target, reason } => {
                write!(f, "rollback to tick {target} rejected: {reason}")
            }
            Self::Sim(e) => write!(f, "simulation: {e}"),
            Self::Net(e) => write!(f, "network: {e}"),
            Self::Replay(e) => write!(f, "replay: {e}"),
            Self::NoReplayLoaded => write!(f, "no replay loaded"),
        }
    }
}

impl Error for EngineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(e) => Some(e),
            Self::Sim(e) => Some(e),
            Self::Net(e) => Some(e),
            Self::Replay(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<SimError> for EngineError {
    fn from(e: SimError) -> Self {
        Self::Sim(e)
    }
}

impl From<NetError> for EngineError {
    fn from(e: NetError) -> Self {
        Self::Net(e)
    }
}

impl From<ReplayError> for EngineError {
    fn from(e: ReplayError) -> Self {
        Self::Replay(e)
    }
}

//! Error types for the simulation layer.

use std::error::Error;
use std::fmt;

use cadence_core::{CommandError, EntityTypeId, Tick};

/// Errors from world mutation, snapshot restore, and rollback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimError {
    /// A snapshot or entity blob referenced an entity type with no
    /// registered factory. The restore aborts; the caller logs and drops.
    UnknownEntityType {
        /// The unregistered type discriminant.
        type_id: EntityTypeId,
    },
    /// An entity type was registered twice with the factory.
    DuplicateEntityType {
        /// The colliding type discriminant.
        type_id: EntityTypeId,
    },
    /// Snapshot bytes were truncated or structurally invalid.
    SnapshotMalformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// No snapshot exists at or before the requested rollback target.
    /// The simulation keeps running at its current tick.
    RollbackImpossible {
        /// The tick the caller asked to roll back to.
        target: Tick,
    },
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntityType { type_id } => {
                write!(f, "no entity factory registered for type {type_id}")
            }
            Self::DuplicateEntityType { type_id } => {
                write!(f, "entity type {type_id} is already registered")
            }
            Self::SnapshotMalformed { detail } => write!(f, "malformed snapshot: {detail}"),
            Self::RollbackImpossible { target } => {
                write!(f, "no snapshot at or before tick {target}")
            }
        }
    }
}

impl Error for SimError {}

impl From<CommandError> for SimError {
    /// Snapshot decoding shares the wire primitives with the command
    /// plane; their errors surface as malformed snapshots here.
    fn from(e: CommandError) -> Self {
        SimError::SnapshotMalformed {
            detail: e.to_string(),
        }
    }
}

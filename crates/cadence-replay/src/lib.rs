//! Deterministic replay for cadence sessions.
//!
//! A replay is the complete command log of a session plus the metadata
//! needed to reproduce it: seed, tick interval, and player count.
//! Because the simulation is deterministic, replaying the log through
//! the same simulation reproduces every world state bit-for-bit — no
//! world snapshots are stored in the file.
//!
//! - [`ReplayRecorder`] captures per-tick command lists (deep-copied
//!   through the command registry so the log can never alias live
//!   buffers).
//! - [`ReplayData`] is the in-memory session log.
//! - [`codec`] reads and writes the binary file container.
//! - [`ReplayPlayer`] mirrors the engine's tick clock to feed the log
//!   back into a simulation at a chosen speed.
//!
//! # File format
//!
//! ```text
//! magic:u32 ("RPLY")
//! version:i32, sessionId:lpUtf8, recordedAt:i64, durationMs:i64,
//! totalTicks:i32, playerCount:i32, tickIntervalMs:i32, randomSeed:i32
//! tickCount:i32
//! per tick: tick:i32, cmdCount:i32, (len:i32, cmdBytes[len])*
//! ```
//!
//! All integers little-endian. Unknown magic or a version newer than
//! [`CURRENT_VERSION`] fails with [`ReplayError::UnsupportedReplay`].

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod player;
pub mod recorder;
pub mod types;

pub use error::ReplayError;
pub use player::{ReplayPlayer, ReplaySpeed};
pub use recorder::ReplayRecorder;
pub use types::{ReplayData, ReplayMetadata, TickEntry};

/// Magic bytes at the start of every replay file: `"RPLY"`, read as a
/// little-endian u32.
pub const MAGIC: u32 = 0x52504C59;

/// Current container version.
pub const CURRENT_VERSION: i32 = 1;

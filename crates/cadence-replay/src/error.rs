//! Error types for the replay subsystem.

use std::error::Error;
use std::fmt;
use std::io;

use cadence_core::CommandError;

/// Errors from replay recording, file I/O, and playback.
#[derive(Debug)]
pub enum ReplayError {
    /// An I/O error during read or write.
    Io(io::Error),
    /// The file is not a cadence replay (bad magic) or was written by a
    /// newer version than this reader understands.
    UnsupportedReplay {
        /// What made the file unsupported.
        reason: UnsupportedReason,
    },
    /// The container decoded structurally wrong (truncated data,
    /// negative counts, undecodable commands).
    InvalidReplayFormat {
        /// Human-readable description of what went wrong.
        detail: String,
    },
    /// The recorder was asked to act outside an active recording.
    NotRecording,
}

/// Why a replay file was rejected outright.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnsupportedReason {
    /// The magic number did not match `"RPLY"`.
    BadMagic {
        /// The value found in the file.
        found: u32,
    },
    /// The version is newer than [`CURRENT_VERSION`](crate::CURRENT_VERSION).
    VersionTooNew {
        /// The version found in the file.
        found: i32,
    },
}

impl fmt::Display for ReplayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::UnsupportedReplay { reason } => match reason {
                UnsupportedReason::BadMagic { found } => {
                    write!(f, "not a replay file (magic {found:#010x})")
                }
                UnsupportedReason::VersionTooNew { found } => {
                    write!(f, "replay version {found} is newer than this reader")
                }
            },
            Self::InvalidReplayFormat { detail } => write!(f, "invalid replay: {detail}"),
            Self::NotRecording => write!(f, "no recording in progress"),
        }
    }
}

impl Error for ReplayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ReplayError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<CommandError> for ReplayError {
    fn from(e: CommandError) -> Self {
        Self::InvalidReplayFormat {
            detail: e.to_string(),
        }
    }
}

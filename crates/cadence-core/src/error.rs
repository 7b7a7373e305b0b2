//! Error types for the command plane.

use std::error::Error;
use std::fmt;

/// Errors from command encoding, decoding, and registry operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandError {
    /// The serialized kind is not registered. The offending message is
    /// logged and dropped by callers; it never unwinds the simulation.
    UnknownKind {
        /// The unrecognized kind discriminant.
        kind: u32,
    },
    /// A kind was registered twice, or a registration collides with a
    /// built-in kind.
    DuplicateKind {
        /// The colliding kind discriminant.
        kind: u32,
    },
    /// The byte stream ended before the structure was complete.
    Truncated {
        /// What was being decoded when the bytes ran out.
        context: &'static str,
    },
    /// The bytes decoded but violate a structural rule.
    Malformed {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind { kind } => write!(f, "unknown command kind {kind}"),
            Self::DuplicateKind { kind } => {
                write!(f, "command kind {kind} is already registered")
            }
            Self::Truncated { context } => write!(f, "truncated input while reading {context}"),
            Self::Malformed { detail } => write!(f, "malformed command: {detail}"),
        }
    }
}

impl Error for CommandError {}

//! Error types for the network service.

use std::error::Error;
use std::fmt;

use cadence_core::CommandError;

/// Errors from the command-plane network layer.
#[derive(Debug)]
pub enum NetError {
    /// The transport failed to send or broadcast.
    Transport {
        /// Description from the transport implementation.
        detail: String,
    },
    /// An incoming message could not be decoded. The message is logged
    /// and dropped; the session continues.
    BadMessage(CommandError),
    /// An operation required a joined room.
    NotInRoom,
    /// `create_room` was called while already in a room.
    AlreadyInRoom,
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { detail } => write!(f, "transport failure: {detail}"),
            Self::BadMessage(e) => write!(f, "bad message: {e}"),
            Self::NotInRoom => write!(f, "not in a room"),
            Self::AlreadyInRoom => write!(f, "already in a room"),
        }
    }
}

impl Error for NetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::BadMessage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CommandError> for NetError {
    fn from(e: CommandError) -> Self {
        NetError::BadMessage(e)
    }
}

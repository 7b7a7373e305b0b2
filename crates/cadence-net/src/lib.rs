//! Command-plane networking for the cadence lockstep core.
//!
//! This crate is a thin broker over an opaque [`Transport`] capability.
//! It owns no sockets: the host supplies whatever carries bytes between
//! peers (UDP, TCP, a relay, or the in-memory hub used in tests), and
//! [`NetworkService`] handles the message vocabulary — commands, sync
//! hashes, readiness, game start, and ping/pong RTT sampling.
//!
//! Incoming traffic is decoded during [`NetworkService::poll`] and
//! surfaced as [`NetEvent`]s through a channel the engine drains at the
//! top of its update, which keeps all simulation state single-threaded.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod message;
pub mod service;
pub mod transport;

pub use error::NetError;
pub use message::Message;
pub use service::{NetEvent, NetworkService, PlayerInfo, SessionParams};
pub use transport::{Reliability, Transport};

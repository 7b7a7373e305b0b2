//! Core types for the cadence lockstep networking core.
//!
//! This crate defines the vocabulary shared by every other cadence crate:
//! strongly-typed identifiers, the player [`Command`] value type with its
//! stable binary serialization, the [`CommandRegistry`] that maps numeric
//! command kinds to decoders, and the little-endian wire primitives the
//! command plane and replay container are built from.
//!
//! Commands are immutable values once accepted into an input buffer, and
//! their byte encoding is part of the wire contract: the first four bytes
//! of any serialized command are the little-endian kind.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod command;
pub mod error;
pub mod id;
pub mod registry;

pub use codec::ByteReader;
pub use command::{Command, CommandPayload};
pub use error::CommandError;
pub use id::{CommandKind, EntityId, EntityTypeId, PlayerId, Tick};
pub use registry::CommandRegistry;

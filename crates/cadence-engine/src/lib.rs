//! The cadence lockstep engine.
//!
//! [`LockstepEngine`] is the conductor of a session: it owns the
//! deterministic simulation, the network service, the
//! [`InputBuffer`], and the replay machinery, and is driven by the
//! host's render loop through [`LockstepEngine::update`].
//!
//! The lockstep discipline: peers exchange only player commands on a
//! shared tick clock, each peer runs the identical simulation, and a
//! tick executes as *confirmed* once every player's input for it is
//! buffered. When inputs lag, the engine can advance *predicted* ticks
//! from recent input history and roll back to a snapshot when a real
//! input contradicts a guess. Periodic state-hash exchange catches any
//! determinism violation as a desync event.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod engine;
pub mod error;
pub mod predictor;

pub use buffer::{CommandList, InputBuffer};
pub use config::{ConfigError, LockstepConfig};
pub use engine::{EngineState, LockstepEngine};
pub use error::{EngineError, RollbackReason};
pub use predictor::InputPredictor;

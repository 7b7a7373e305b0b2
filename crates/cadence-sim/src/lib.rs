//! Deterministic world state and simulation stepping for cadence.
//!
//! The simulation layer owns everything a lockstep peer must reproduce
//! bit-for-bit: the entity set ([`WorldState`]), its serialized form
//! ([`Snapshot`]) with the bounded rollback history ([`SnapshotRing`]),
//! and the per-tick driver ([`Simulation`]) that applies commands,
//! advances entities, and runs registered system passes.
//!
//! # Determinism contract
//!
//! Entities are mutated only inside [`Simulation::tick`] and
//! [`Simulation::rollback`]. Identical seed and identical command
//! sequences yield identical snapshot bytes and identical state hashes
//! at every tick; the world hash sorts entity hashes by id so map
//! iteration order can never leak into the result.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod entity;
pub mod error;
pub mod hash;
pub mod ring;
pub mod simulation;
pub mod unit;
pub mod world;

pub use entity::{Entity, EntityFactory};
pub use error::SimError;
pub use ring::{Snapshot, SnapshotRing};
pub use simulation::{Simulation, SystemPass};
pub use unit::UnitEntity;
pub use world::WorldState;

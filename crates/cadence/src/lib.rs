//! Cadence: a deterministic lockstep networking core for real-time
//! multiplayer games.
//!
//! Peers exchange only player inputs on a discrete tick clock; every
//! participant runs an identical, bit-for-bit reproducible simulation.
//! This facade crate re-exports the public API of every cadence
//! sub-crate; for most users a single `cadence` dependency is enough.
//!
//! # Quick start
//!
//! ```rust
//! use cadence::prelude::*;
//!
//! // A deterministic simulation with the demo unit entity registered.
//! let mut factory = EntityFactory::new();
//! factory
//!     .register(
//!         UnitEntity::TYPE_ID,
//!         Box::new(|id| Box::new(UnitEntity::new(id, PlayerId(0)))),
//!     )
//!     .unwrap();
//! let mut sim = Simulation::new(50, 32, factory);
//! sim.initialize(12345);
//!
//! // Spawn a unit and march it to (10, 0, 10).
//! let id = sim.world_mut().allocate_entity_id();
//! sim.world_mut()
//!     .insert(Box::new(UnitEntity::new(id, PlayerId(0))));
//! let order = Command {
//!     player_id: PlayerId(0),
//!     tick: Tick(0),
//!     payload: CommandPayload::Move {
//!         target: FpVec3::from_ints(10, 0, 10),
//!     },
//! };
//! sim.tick(std::slice::from_ref(&order));
//! for _ in 0..120 {
//!     sim.tick(&[]);
//! }
//! let unit = sim.world().get(id).unwrap();
//! assert_eq!(unit.position(), FpVec3::from_ints(10, 0, 10));
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`fixed`] | `cadence-fixed` | 32.32 fixed point, vectors, trig, PRNG |
//! | [`types`] | `cadence-core` | IDs, commands, registry, wire primitives |
//! | [`sim`] | `cadence-sim` | Entities, world state, snapshots, simulation |
//! | [`engine`] | `cadence-engine` | Lockstep engine, input buffer, predictor |
//! | [`net`] | `cadence-net` | Transport trait, wire messages, network service |
//! | [`replay`] | `cadence-replay` | Replay recording, file container, playback |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Core identifiers, commands, and wire primitives (`cadence-core`).
pub use cadence_core as types;

/// Lockstep engine, input buffer, and predictor (`cadence-engine`).
pub use cadence_engine as engine;

/// Deterministic fixed-point arithmetic and PRNG (`cadence-fixed`).
pub use cadence_fixed as fixed;

/// Transport capability and network service (`cadence-net`).
pub use cadence_net as net;

/// Replay recording and playback (`cadence-replay`).
pub use cadence_replay as replay;

/// World state, snapshots, and simulation stepping (`cadence-sim`).
pub use cadence_sim as sim;

/// Common imports for typical cadence usage.
///
/// ```rust
/// use cadence::prelude::*;
/// ```
pub mod prelude {
    // Fixed-point substrate
    pub use cadence_fixed::{Fp, FpVec2, FpVec3, MathError, Prng};

    // Core command plane
    pub use cadence_core::{
        Command, CommandError, CommandKind, CommandPayload, CommandRegistry, EntityId,
        EntityTypeId, PlayerId, Tick,
    };

    // Simulation
    pub use cadence_sim::{
        Entity, EntityFactory, SimError, Simulation, Snapshot, SnapshotRing, SystemPass,
        UnitEntity, WorldState,
    };

    // Engine
    pub use cadence_engine::{
        EngineError, EngineState, InputBuffer, InputPredictor, LockstepConfig, LockstepEngine,
    };

    // Network
    pub use cadence_net::{
        Message, NetError, NetEvent, NetworkService, PlayerInfo, Reliability, SessionParams,
        Transport,
    };

    // Replay
    pub use cadence_replay::{
        ReplayData, ReplayError, ReplayMetadata, ReplayPlayer, ReplayRecorder, ReplaySpeed,
    };
}

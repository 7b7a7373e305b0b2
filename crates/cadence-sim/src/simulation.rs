//! The per-tick simulation driver.
//!
//! [`Simulation`] wires the world, the snapshot ring, the entity
//! factory, and the deterministic PRNG into a single stepping unit. One
//! [`tick()`](Simulation::tick) call applies the tick's commands to the
//! entities their issuers own, advances every entity, runs the
//! registered [`SystemPass`] pipeline, and increments the world tick.
//! Rollback restores the nearest retained snapshot and trims the ring.
//!
//! The engine above this layer decides *when* to tick and with *which*
//! commands; this layer guarantees that identical seed and identical
//! command sequences yield identical state at every tick.

use cadence_core::{Command, Tick};
use cadence_fixed::Prng;

use crate::entity::{Entity, EntityFactory};
use crate::error::SimError;
use crate::ring::{Snapshot, SnapshotRing};
use crate::world::WorldState;

/// A registered simulation pass run after entity stepping each tick —
/// the collision/AI extension slot.
pub trait SystemPass {
    /// Name for diagnostics.
    fn name(&self) -> &str;
    /// Run the pass over the stepped world.
    fn run(&mut self, world: &mut WorldState, rng: &mut Prng, dt_ms: u32);
}

/// Deterministic simulation: world + snapshot ring + PRNG + passes.
pub struct Simulation {
    world: WorldState,
    snapshots: SnapshotRing,
    factory: EntityFactory,
    rng: Prng,
    systems: Vec<Box<dyn SystemPass>>,
    tick_interval_ms: u32,
    seed: u32,
}

impl Simulation {
    /// Create a simulation stepping at `tick_interval_ms`, retaining
    /// `max_snapshots` rollback snapshots, spawning entities through
    /// `factory`.
    pub fn new(tick_interval_ms: u32, max_snapshots: usize, factory: EntityFactory) -> Self {
        Simulation {
            world: WorldState::new(),
            snapshots: SnapshotRing::new(max_snapshots),
            factory,
            rng: Prng::seeded(0),
            systems: Vec::new(),
            tick_interval_ms,
            seed: 0,
        }
    }

    /// Clear the world and snapshot ring and reseed the PRNG.
    pub fn initialize(&mut self, seed: u32) {
        self.world.clear();
        self.snapshots.clear_all();
        self.rng = Prng::seeded(seed);
        self.seed = seed;
    }

    /// Register a system pass; passes run in registration order.
    pub fn add_system(&mut self, system: Box<dyn SystemPass>) {
        self.systems.push(system);
    }

    /// Execute one tick over `commands`.
    ///
    /// Commands are applied in exactly the order given — the engine is
    /// responsible for the ascending-player ordering — and each command
    /// reaches every entity owned by its issuing player.
    pub fn tick(&mut self, commands: &[Command]) {
        for cmd in commands {
            for entity in self.world.iter_mut() {
                if entity.owner() == cmd.player_id {
                    entity.apply_command(cmd);
                }
            }
        }

        let dt = self.tick_interval_ms;
        for entity in self.world.iter_mut() {
            entity.step(dt);
        }

        for system in &mut self.systems {
            system.run(&mut self.world, &mut self.rng, dt);
        }

        self.world.advance_tick();
    }

    /// Capture the current world (and PRNG words) as a snapshot.
    pub fn create_snapshot(&mut self) -> Snapshot {
        Snapshot {
            tick: self.world.tick(),
            bytes: self.world.encode_snapshot(),
            rng_state: self.rng.state(),
        }
    }

    /// Capture and store a snapshot in the ring.
    pub fn save_snapshot(&mut self) {
        let snapshot = self.create_snapshot();
        self.snapshots.save(snapshot);
    }

    /// Restore the world from an explicit snapshot.
    ///
    /// # Errors
    ///
    /// Propagates [`SimError`] from the restore; on error the session
    /// should be treated as compromised.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) -> Result<(), SimError> {
        self.world.restore_snapshot(&snapshot.bytes, &self.factory)?;
        self.rng = Prng::from_state(snapshot.rng_state);
        Ok(())
    }

    /// Roll back to the nearest snapshot at or before `target`.
    ///
    /// On success the ring drops everything after the restored tick and
    /// the restored tick is returned; the caller resimulates forward
    /// from there.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::RollbackImpossible`] when no snapshot at or
    /// before `target` is retained. The world is left untouched.
    pub fn rollback(&mut self, target: Tick) -> Result<Tick, SimError> {
        let snapshot = self
            .snapshots
            .nearest_at_or_before(target)
            .cloned()
            .ok_or(SimError::RollbackImpossible { target })?;
        self.restore_snapshot(&snapshot)?;
        self.snapshots.clear_after(snapshot.tick);
        Ok(snapshot.tick)
    }

    /// Drop retained snapshots newer than `tick` without restoring.
    pub fn clear_snapshots_after(&mut self, tick: Tick) {
        self.snapshots.clear_after(tick);
    }

    /// The deterministic world hash at the current tick.
    pub fn state_hash(&mut self) -> u64 {
        self.world.state_hash()
    }

    /// The current world tick.
    pub fn current_tick(&self) -> Tick {
        self.world.tick()
    }

    /// The configured tick interval in milliseconds.
    pub fn tick_interval_ms(&self) -> u32 {
        self.tick_interval_ms
    }

    /// Adopt a new tick interval. The session host's `GameStart` (or a
    /// loaded replay's metadata) fixes this before the first tick.
    pub fn set_tick_interval_ms(&mut self, tick_interval_ms: u32) {
        self.tick_interval_ms = tick_interval_ms;
    }

    /// The seed from the last [`initialize`](Simulation::initialize).
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The world, for spawning and render reads.
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Mutable world access, for host-side spawning at session start.
    ///
    /// Mid-session mutation outside [`tick`](Simulation::tick) breaks
    /// the determinism contract; hosts spawn before the first tick or
    /// from inside entity/system code.
    pub fn world_mut(&mut self) -> &mut WorldState {
        &mut self.world
    }

    /// The snapshot ring, for observability.
    pub fn snapshots(&self) -> &SnapshotRing {
        &self.snapshots
    }

    /// The simulation PRNG, for system passes and spawn-time draws.
    pub fn rng_mut(&mut self) -> &mut Prng {
        &mut self.rng
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("tick", &self.world.tick())
            .field("entities", &self.world.len())
            .field("snapshots", &self.snapshots.len())
            .field("systems", &self.systems.len())
            .field("seed", &self.seed)
            .finish()
    }
}

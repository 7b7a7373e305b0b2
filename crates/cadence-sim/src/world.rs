//! The entity set and its deterministic serialization.
//!
//! [`WorldState`] owns every live entity, keyed by [`EntityId`] in
//! insertion order. Snapshots serialize entities in that insertion
//! order; restoration is order-insensitive because identity is the
//! entity id. The world hash sorts a scratch view of entity hashes by
//! id before folding, which is the sole safeguard against map iteration
//! order leaking into cross-peer comparison.

use indexmap::IndexMap;

use cadence_core::codec::{put_i32, ByteReader};
use cadence_core::{EntityId, EntityTypeId, Tick};

use crate::entity::{Entity, EntityFactory};
use crate::error::SimError;
use crate::hash;

/// The set of syncable entities plus world-level counters.
pub struct WorldState {
    entities: IndexMap<i32, Box<dyn Entity>>,
    next_entity_id: i32,
    tick: Tick,
    /// Scratch for the sorted hash fold; retained so steady-state
    /// hashing does not allocate.
    hash_scratch: Vec<(i32, u64)>,
    /// Scratch for entity serialization during snapshot encoding.
    encode_scratch: Vec<u8>,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new()
    }
}

impl WorldState {
    /// An empty world at tick 0.
    pub fn new() -> Self {
        WorldState {
            entities: IndexMap::new(),
            next_entity_id: 1,
            tick: Tick(0),
            hash_scratch: Vec::new(),
            encode_scratch: Vec::new(),
        }
    }

    /// The current tick.
    pub fn tick(&self) -> Tick {
        self.tick
    }

    /// Advance the tick counter by one. Called by the simulation at the
    /// end of each step.
    pub(crate) fn advance_tick(&mut self) {
        self.tick = self.tick.next();
    }

    /// The id the next spawned entity will receive.
    pub fn next_entity_id(&self) -> EntityId {
        EntityId(self.next_entity_id)
    }

    /// Allocate a fresh entity id. Ids are never reused in a session.
    pub fn allocate_entity_id(&mut self) -> EntityId {
        let id = self.next_entity_id;
        self.next_entity_id += 1;
        EntityId(id)
    }

    /// Insert an entity under its own id.
    ///
    /// Keeps `next_entity_id` ahead of any manually constructed id so
    /// allocation stays collision-free.
    pub fn insert(&mut self, entity: Box<dyn Entity>) {
        let id = entity.entity_id();
        if id.0 >= self.next_entity_id {
            self.next_entity_id = id.0 + 1;
        }
        self.entities.insert(id.0, entity);
    }

    /// Remove an entity, returning it if present.
    pub fn remove(&mut self, id: EntityId) -> Option<Box<dyn Entity>> {
        self.entities.shift_remove(&id.0)
    }

    /// Borrow an entity.
    pub fn get(&self, id: EntityId) -> Option<&dyn Entity> {
        self.entities.get(&id.0).map(|e| e.as_ref())
    }

    /// Mutably borrow an entity.
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Box<dyn Entity>> {
        self.entities.get_mut(&id.0)
    }

    /// Iterate entities in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn Entity> {
        self.entities.values().map(|e| e.as_ref())
    }

    /// Mutably iterate entities in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn Entity>> {
        self.entities.values_mut()
    }

    /// Number of live entities.
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Whether the world has no entities.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Remove all entities and reset counters to the initial state.
    pub fn clear(&mut self) {
        self.entities.clear();
        self.next_entity_id = 1;
        self.tick = Tick(0);
    }

    // ── Snapshot encode / restore ───────────────────────────────

    /// Serialize the world:
    /// `tick:i32 | nextEntityId:i32 | count:i32 |`
    /// `(entityId:i32 | typeId:i32 | dataLen:i32 | data)*`
    ///
    /// Entities appear in their current insertion order.
    pub fn encode_snapshot(&mut self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(16 + self.entities.len() * 128);
        put_i32(&mut buf, self.tick.0);
        put_i32(&mut buf, self.next_entity_id);
        put_i32(&mut buf, self.entities.len() as i32);
        for entity in self.entities.values() {
            put_i32(&mut buf, entity.entity_id().0);
            put_i32(&mut buf, entity.type_id().0);
            self.encode_scratch.clear();
            entity.serialize(&mut self.encode_scratch);
            put_i32(&mut buf, self.encode_scratch.len() as i32);
            buf.extend_from_slice(&self.encode_scratch);
        }
        buf
    }

    /// Restore the world from snapshot bytes.
    ///
    /// Entities present in both the world and the snapshot deserialize
    /// in place; entities only in the snapshot are created through
    /// `factory`; entities only in the world are removed. `tick` and
    /// `nextEntityId` are restored verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::SnapshotMalformed`] on structural problems or
    /// [`SimError::UnknownEntityType`] if a listed type has no factory.
    /// The world may be partially updated on error; callers treat that
    /// as fatal to the session.
    pub fn restore_snapshot(
        &mut self,
        bytes: &[u8],
        factory: &EntityFactory,
    ) -> Result<(), SimError> {
        let mut r = ByteReader::new(bytes);
        let tick = Tick(r.read_i32("snapshot tick")?);
        let next_entity_id = r.read_i32("snapshot nextEntityId")?;
        let count = r.read_i32("snapshot count")?;
        if count < 0 {
            return Err(SimError::SnapshotMalformed {
                detail: format!("negative entity count {count}"),
            });
        }

        // Ids present in the snapshot, for the removal sweep below.
        let mut listed = Vec::with_capacity(count as usize);

        for _ in 0..count {
            let entity_id = EntityId(r.read_i32("entity id")?);
            let type_id = EntityTypeId(r.read_i32("entity typeId")?);
            let data = r.read_bytes("entity data")?;
            listed.push(entity_id.0);

            match self.entities.get_mut(&entity_id.0) {
                Some(existing) if existing.type_id() == type_id => {
                    existing.deserialize(data)?;
                }
                _ => {
                    // Either absent or present with a different type;
                    // both cases rebuild from the factory.
                    let mut fresh = factory.create(type_id, entity_id)?;
                    fresh.deserialize(data)?;
                    self.entities.insert(entity_id.0, fresh);
                }
            }
        }

        self.entities.retain(|id, _| listed.contains(id));
        self.tick = tick;
        self.next_entity_id = next_entity_id;
        Ok(())
    }

    // ── Hashing ─────────────────────────────────────────────────

    /// The deterministic world hash.
    ///
    /// FNV-1a over `(tick, entityCount, entityHash…)` with entity hashes
    /// sorted ascending by entity id. Takes `&mut self` only to reuse
    /// the sort scratch; observable state is untouched.
    pub fn state_hash(&mut self) -> u64 {
        self.hash_scratch.clear();
        for entity in self.entities.values() {
            self.hash_scratch
                .push((entity.entity_id().0, entity.state_hash()));
        }
        self.hash_scratch.sort_by_key(|&(id, _)| id);

        let mut h = hash::FNV_OFFSET;
        h = hash::fold_i32(h, self.tick.0);
        h = hash::fold_i32(h, self.hash_scratch.len() as i32);
        for &(_, entity_hash) in &self.hash_scratch {
            h = hash::fold_u64(h, entity_hash);
        }
        h
    }
}

impl std::fmt::Debug for WorldState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldState")
            .field("tick", &self.tick)
            .field("entities", &self.entities.len())
            .field("next_entity_id", &self.next_entity_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::unit::UnitEntity;
    use cadence_core::{Command, CommandPayload, PlayerId};
    use cadence_fixed::FpVec3;

    fn unit_factory() -> EntityFactory {
        let mut factory = EntityFactory::new();
        factory
            .register(
                UnitEntity::TYPE_ID,
                Box::new(|id| Box::new(UnitEntity::new(id, PlayerId(0)))),
            )
            .unwrap();
        factory
    }

    fn spawn_unit(world: &mut WorldState, owner: i32) -> EntityId {
        let id = world.allocate_entity_id();
        world.insert(Box::new(UnitEntity::new(id, PlayerId(owner))));
        id
    }

    #[test]
    fn ids_are_monotonic_and_unique() {
        let mut world = WorldState::new();
        let a = spawn_unit(&mut world, 0);
        let b = spawn_unit(&mut world, 1);
        assert_eq!(a, EntityId(1));
        assert_eq!(b, EntityId(2));
        assert_eq!(world.next_entity_id(), EntityId(3));

        world.remove(a);
        let c = spawn_unit(&mut world, 0);
        assert_eq!(c, EntityId(3), "removed ids are never reused");
    }

    #[test]
    fn insert_with_manual_id_advances_counter() {
        let mut world = WorldState::new();
        world.insert(Box::new(UnitEntity::new(EntityId(10), PlayerId(0))));
        assert_eq!(world.allocate_entity_id(), EntityId(11));
    }

    #[test]
    fn snapshot_round_trips_hash_and_bytes() {
        let factory = unit_factory();
        let mut world = WorldState::new();
        spawn_unit(&mut world, 0);
        spawn_unit(&mut world, 1);
        if let Some(e) = world.get_mut(EntityId(1)) {
            e.apply_command(&Command {
                player_id: PlayerId(0),
                tick: Tick(0),
                payload: CommandPayload::Move {
                    target: FpVec3::from_ints(4, 0, 4),
                },
            });
        }

        let bytes = world.encode_snapshot();
        let hash_before = world.state_hash();

        let mut restored = WorldState::new();
        restored.restore_snapshot(&bytes, &factory).unwrap();

        assert_eq!(restored.state_hash(), hash_before);
        assert_eq!(restored.encode_snapshot(), bytes);
        assert_eq!(restored.next_entity_id(), world.next_entity_id());
        assert_eq!(restored.tick(), world.tick());
    }

    #[test]
    fn restore_removes_unlisted_entities() {
        let factory = unit_factory();
        let mut world = WorldState::new();
        spawn_unit(&mut world, 0);
        let bytes = world.encode_snapshot();

        // A second entity appears after the snapshot was taken.
        spawn_unit(&mut world, 1);
        assert_eq!(world.len(), 2);

        world.restore_snapshot(&bytes, &factory).unwrap();
        assert_eq!(world.len(), 1);
        assert!(world.get(EntityId(2)).is_none());
    }

    #[test]
    fn restore_recreates_missing_entities() {
        let factory = unit_factory();
        let mut world = WorldState::new();
        let id = spawn_unit(&mut world, 0);
        let bytes = world.encode_snapshot();
        let hash_before = world.state_hash();

        world.remove(id);
        assert!(world.is_empty());

        world.restore_snapshot(&bytes, &factory).unwrap();
        assert_eq!(world.len(), 1);
        assert_eq!(world.state_hash(), hash_before);
    }

    #[test]
    fn restore_unknown_type_fails() {
        let factory = EntityFactory::new(); // nothing registered
        let mut world = WorldState::new();
        spawn_unit(&mut world, 0);
        let bytes = world.encode_snapshot();

        let mut fresh = WorldState::new();
        let err = fresh.restore_snapshot(&bytes, &factory).unwrap_err();
        assert_eq!(
            err,
            SimError::UnknownEntityType {
                type_id: UnitEntity::TYPE_ID
            }
        );
    }

    #[test]
    fn restore_truncated_bytes_fails() {
        let factory = unit_factory();
        let mut world = WorldState::new();
        spawn_unit(&mut world, 0);
        let mut bytes = world.encode_snapshot();
        bytes.truncate(bytes.len() - 3);

        let mut fresh = WorldState::new();
        assert!(fresh.restore_snapshot(&bytes, &factory).is_err());
    }

    #[test]
    fn hash_ignores_insertion_order() {
        let mut forward = WorldState::new();
        forward.insert(Box::new(UnitEntity::new(EntityId(1), PlayerId(0))));
        forward.insert(Box::new(UnitEntity::new(EntityId(2), PlayerId(1))));

        let mut reversed = WorldState::new();
        reversed.insert(Box::new(UnitEntity::new(EntityId(2), PlayerId(1))));
        reversed.insert(Box::new(UnitEntity::new(EntityId(1), PlayerId(0))));

        assert_eq!(forward.state_hash(), reversed.state_hash());
    }

    #[test]
    fn hash_depends_on_tick_and_contents() {
        let mut world = WorldState::new();
        spawn_unit(&mut world, 0);
        let h1 = world.state_hash();
        world.advance_tick();
        let h2 = world.state_hash();
        assert_ne!(h1, h2);

        spawn_unit(&mut world, 1);
        assert_ne!(h2, world.state_hash());
    }

    #[test]
    fn clear_resets_counters() {
        let mut world = WorldState::new();
        spawn_unit(&mut world, 0);
        world.advance_tick();
        world.clear();
        assert!(world.is_empty());
        assert_eq!(world.tick(), Tick(0));
        assert_eq!(world.next_entity_id(), EntityId(1));
    }
}

//! The syncable entity trait and the type factory used at restore time.

use indexmap::IndexMap;

use cadence_core::{Command, EntityId, EntityTypeId, PlayerId};
use cadence_fixed::FpVec3;

use crate::error::SimError;

/// A simulation object that participates in snapshots and hashing.
///
/// Entities are mutated only inside the simulation's tick and restore
/// boundaries. Their serialized form must be stable: `serialize`
/// followed by `deserialize` into a fresh instance of the same type
/// reproduces the entity exactly, and [`state_hash`](Entity::state_hash)
/// is FNV-1a over the serialized fields in serialization order.
pub trait Entity: std::fmt::Debug {
    /// Unique id within the session; never reused.
    fn entity_id(&self) -> EntityId;
    /// The type discriminant used for factory lookup at restore time.
    fn type_id(&self) -> EntityTypeId;
    /// The owning player. Commands apply only to entities the issuing
    /// player owns.
    fn owner(&self) -> PlayerId;
    /// World-space position, exposed read-only to the render layer.
    fn position(&self) -> FpVec3;
    /// Append the entity's state fields to `buf` in stable layout.
    fn serialize(&self, buf: &mut Vec<u8>);
    /// Overwrite state from bytes previously produced by `serialize`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::SnapshotMalformed`] on truncated or invalid
    /// bytes; the entity may be left partially updated and the caller
    /// must discard it.
    fn deserialize(&mut self, bytes: &[u8]) -> Result<(), SimError>;
    /// FNV-1a over the serialized fields. Deterministic and
    /// endian-defined.
    fn state_hash(&self) -> u64;
    /// Advance one simulation step of `dt_ms` milliseconds.
    fn step(&mut self, dt_ms: u32);
    /// Apply one command issued by this entity's owner.
    fn apply_command(&mut self, cmd: &Command);
    /// Return to the default state (spawn-time values, id preserved).
    fn reset(&mut self);
}

/// Constructor for a single entity type.
pub type EntityCtor = Box<dyn Fn(EntityId) -> Box<dyn Entity> + Send + Sync>;

/// Registry of entity constructors keyed by [`EntityTypeId`].
///
/// Snapshot restore uses this to recreate entities that exist in the
/// snapshot but not in the live world. `typeId` is the single source of
/// truth at that boundary; there is no reflection.
#[derive(Default)]
pub struct EntityFactory {
    ctors: IndexMap<i32, EntityCtor>,
}

impl EntityFactory {
    /// An empty factory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor for `type_id`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::DuplicateEntityType`] if the type is taken.
    pub fn register(&mut self, type_id: EntityTypeId, ctor: EntityCtor) -> Result<(), SimError> {
        if self.ctors.contains_key(&type_id.0) {
            return Err(SimError::DuplicateEntityType { type_id });
        }
        self.ctors.insert(type_id.0, ctor);
        Ok(())
    }

    /// Construct a fresh entity of `type_id` with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::UnknownEntityType`] for unregistered types.
    pub fn create(
        &self,
        type_id: EntityTypeId,
        entity_id: EntityId,
    ) -> Result<Box<dyn Entity>, SimError> {
        let ctor = self
            .ctors
            .get(&type_id.0)
            .ok_or(SimError::UnknownEntityType { type_id })?;
        Ok(ctor(entity_id))
    }

    /// Whether a constructor exists for `type_id`.
    pub fn is_registered(&self, type_id: EntityTypeId) -> bool {
        self.ctors.contains_key(&type_id.0)
    }
}

impl std::fmt::Debug for EntityFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityFactory")
            .field("types", &self.ctors.keys().collect::<Vec<_>>())
            .finish()
    }
}

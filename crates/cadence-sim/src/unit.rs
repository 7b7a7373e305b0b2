//! The demonstration unit entity: a position with a movement target.

use cadence_core::codec::{put_i32, put_i64, put_u8, ByteReader};
use cadence_core::{Command, CommandPayload, EntityId, EntityTypeId, PlayerId};
use cadence_fixed::{trig, Fp, FpVec3};

use crate::entity::Entity;
use crate::error::SimError;
use crate::hash;

/// Default movement speed in world units per second.
const DEFAULT_MOVE_SPEED: Fp = Fp::from_int(5);

/// A minimal movable unit.
///
/// Responds to `Move` by steering toward the target at `move_speed`
/// units per second and to `Action` by recording the action id. Exists
/// to exercise the full lockstep pipeline; real games register their own
/// entity types alongside it.
#[derive(Debug)]
pub struct UnitEntity {
    entity_id: EntityId,
    owner: PlayerId,
    /// Current world position.
    pub position: FpVec3,
    /// Yaw in radians, facing the current move target.
    pub rotation: Fp,
    /// Per-axis scale, serialized for render-layer symmetry.
    pub scale: FpVec3,
    /// Where the unit is heading.
    pub target_position: FpVec3,
    /// Movement speed in units per second.
    pub move_speed: Fp,
    /// Whether the unit is still en route to `target_position`.
    pub is_moving: bool,
    /// The most recent `Action` command's id, 0 if none.
    pub last_action_id: i32,
}

impl UnitEntity {
    /// The factory discriminant for this type.
    pub const TYPE_ID: EntityTypeId = EntityTypeId(1);

    /// A unit at the origin with default speed.
    pub fn new(entity_id: EntityId, owner: PlayerId) -> Self {
        UnitEntity {
            entity_id,
            owner,
            position: FpVec3::ZERO,
            rotation: Fp::ZERO,
            scale: FpVec3::ONE,
            target_position: FpVec3::ZERO,
            move_speed: DEFAULT_MOVE_SPEED,
            is_moving: false,
            last_action_id: 0,
        }
    }

    /// A unit at `position` with the given speed.
    pub fn at(entity_id: EntityId, owner: PlayerId, position: FpVec3, move_speed: Fp) -> Self {
        UnitEntity {
            position,
            target_position: position,
            move_speed,
            ..UnitEntity::new(entity_id, owner)
        }
    }
}

impl Entity for UnitEntity {
    fn entity_id(&self) -> EntityId {
        self.entity_id
    }

    fn type_id(&self) -> EntityTypeId {
        Self::TYPE_ID
    }

    fn owner(&self) -> PlayerId {
        self.owner
    }

    fn position(&self) -> FpVec3 {
        self.position
    }

    fn serialize(&self, buf: &mut Vec<u8>) {
        put_i32(buf, self.owner.0);
        put_i64(buf, self.position.x.raw());
        put_i64(buf, self.position.y.raw());
        put_i64(buf, self.position.z.raw());
        put_i64(buf, self.rotation.raw());
        put_i64(buf, self.scale.x.raw());
        put_i64(buf, self.scale.y.raw());
        put_i64(buf, self.scale.z.raw());
        put_i64(buf, self.target_position.x.raw());
        put_i64(buf, self.target_position.y.raw());
        put_i64(buf, self.target_position.z.raw());
        put_i64(buf, self.move_speed.raw());
        put_u8(buf, self.is_moving as u8);
        put_i32(buf, self.last_action_id);
    }

    fn deserialize(&mut self, bytes: &[u8]) -> Result<(), SimError> {
        let mut r = ByteReader::new(bytes);
        self.owner = PlayerId(r.read_i32("unit owner")?);
        self.position = read_vec3(&mut r, "unit position")?;
        self.rotation = Fp::from_raw(r.read_i64("unit rotation")?);
        self.scale = read_vec3(&mut r, "unit scale")?;
        self.target_position = read_vec3(&mut r, "unit target")?;
        self.move_speed = Fp::from_raw(r.read_i64("unit moveSpeed")?);
        self.is_moving = match r.read_u8("unit isMoving")? {
            0 => false,
            1 => true,
            other => {
                return Err(SimError::SnapshotMalformed {
                    detail: format!("invalid isMoving flag {other}"),
                })
            }
        };
        self.last_action_id = r.read_i32("unit lastActionId")?;
        Ok(())
    }

    fn state_hash(&self) -> u64 {
        let mut h = hash::FNV_OFFSET;
        h = hash::fold_i32(h, self.owner.0);
        h = hash::fold_i64(h, self.position.x.raw());
        h = hash::fold_i64(h, self.position.y.raw());
        h = hash::fold_i64(h, self.position.z.raw());
        h = hash::fold_i64(h, self.rotation.raw());
        h = hash::fold_i64(h, self.scale.x.raw());
        h = hash::fold_i64(h, self.scale.y.raw());
        h = hash::fold_i64(h, self.scale.z.raw());
        h = hash::fold_i64(h, self.target_position.x.raw());
        h = hash::fold_i64(h, self.target_position.y.raw());
        h = hash::fold_i64(h, self.target_position.z.raw());
        h = hash::fold_i64(h, self.move_speed.raw());
        h = hash::fold_byte(h, self.is_moving as u8);
        h = hash::fold_i32(h, self.last_action_id);
        h
    }

    fn step(&mut self, dt_ms: u32) {
        if !self.is_moving {
            return;
        }
        // move_speed is units/second; dt is milliseconds.
        let dt = Fp::from_ratio(dt_ms as i32, 1000).unwrap_or(Fp::ZERO);
        let max_delta = self.move_speed * dt;
        self.position = self.position.move_towards(self.target_position, max_delta);
        if self.position == self.target_position {
            self.is_moving = false;
        }
    }

    fn apply_command(&mut self, cmd: &Command) {
        match &cmd.payload {
            CommandPayload::Move { target } => {
                self.target_position = *target;
                let offset = *target - self.position;
                if offset == FpVec3::ZERO {
                    self.is_moving = false;
                } else {
                    self.is_moving = true;
                    self.rotation = trig::atan2(offset.x, offset.z);
                }
            }
            CommandPayload::Action { action_id, .. } => {
                self.last_action_id = *action_id;
            }
            CommandPayload::Empty | CommandPayload::Custom { .. } => {}
        }
    }

    fn reset(&mut self) {
        let id = self.entity_id;
        let owner = self.owner;
        *self = UnitEntity::new(id, owner);
    }
}

fn read_vec3(r: &mut ByteReader<'_>, context: &'static str) -> Result<FpVec3, SimError> {
    let x = Fp::from_raw(r.read_i64(context)?);
    let y = Fp::from_raw(r.read_i64(context)?);
    let z = Fp::from_raw(r.read_i64(context)?);
    Ok(FpVec3::new(x, y, z))
}

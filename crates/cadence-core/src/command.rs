//! The player command value type and its stable binary form.
//!
//! A [`Command`] is one player's input for one tick. Commands are plain
//! values with structural equality; once accepted into an input buffer
//! they are never mutated. The binary layout is part of the wire
//! contract:
//!
//! ```text
//! kind:u32 | playerId:i32 | tick:i32 | payload (fixed per kind)
//! ```
//!
//! The kind discriminant leads so that a registry can dispatch on the
//! first four bytes before the full decoder runs; decoders deliberately
//! re-read it from the front of the slice.

use cadence_fixed::{Fp, FpVec3};

use crate::codec::{put_i32, put_i64, put_u32, ByteReader};
use crate::error::CommandError;
use crate::id::{CommandKind, EntityId, PlayerId, Tick};

/// One player's input for one tick.
///
/// # Examples
///
/// ```
/// use cadence_core::{Command, CommandPayload, PlayerId, Tick};
/// use cadence_fixed::FpVec3;
///
/// let cmd = Command {
///     player_id: PlayerId(0),
///     tick: Tick(12),
///     payload: CommandPayload::Move {
///         target: FpVec3::from_ints(10, 0, 10),
///     },
/// };
/// let bytes = cmd.serialize();
/// // The first four bytes are always the kind, little-endian.
/// assert_eq!(&bytes[0..4], &1u32.to_le_bytes());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Command {
    /// The issuing player.
    pub player_id: PlayerId,
    /// The tick this command executes at.
    pub tick: Tick,
    /// The typed input itself.
    pub payload: CommandPayload,
}

/// The typed body of a [`Command`].
///
/// Built-in kinds are enum variants; externally registered kinds travel
/// as [`CommandPayload::Custom`] with their registered discriminant and
/// opaque payload bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandPayload {
    /// No input this tick. Also what the predictor emits for players
    /// with no history.
    Empty,
    /// Order the player's units toward a world-space target.
    Move {
        /// Destination point.
        target: FpVec3,
    },
    /// Trigger a game action, optionally aimed at an entity and a point.
    Action {
        /// Game-defined action discriminant.
        action_id: i32,
        /// The entity the action targets (`EntityId(0)` when untargeted).
        target_entity: EntityId,
        /// World-space aim point.
        point: FpVec3,
    },
    /// An externally registered command kind.
    Custom {
        /// The registered kind discriminant.
        kind: CommandKind,
        /// Opaque payload bytes, excluding the shared header.
        data: Vec<u8>,
    },
}

impl CommandPayload {
    /// The wire discriminant for this payload.
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::Empty => CommandKind::EMPTY,
            Self::Move { .. } => CommandKind::MOVE,
            Self::Action { .. } => CommandKind::ACTION,
            Self::Custom { kind, .. } => *kind,
        }
    }
}

impl Command {
    /// A no-op command for `(player_id, tick)`.
    pub fn empty(player_id: PlayerId, tick: Tick) -> Command {
        Command {
            player_id,
            tick,
            payload: CommandPayload::Empty,
        }
    }

    /// Serialize into `buf` in the stable wire layout.
    pub fn serialize_into(&self, buf: &mut Vec<u8>) {
        put_u32(buf, self.payload.kind().0);
        put_i32(buf, self.player_id.0);
        put_i32(buf, self.tick.0);
        match &self.payload {
            CommandPayload::Empty => {}
            CommandPayload::Move { target } => {
                put_i64(buf, target.x.raw());
                put_i64(buf, target.y.raw());
                put_i64(buf, target.z.raw());
            }
            CommandPayload::Action {
                action_id,
                target_entity,
                point,
            } => {
                put_i32(buf, *action_id);
                put_i32(buf, target_entity.0);
                put_i64(buf, point.x.raw());
                put_i64(buf, point.y.raw());
                put_i64(buf, point.z.raw());
            }
            CommandPayload::Custom { data, .. } => {
                buf.extend_from_slice(data);
            }
        }
    }

    /// Serialize into a fresh byte vector.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(44);
        self.serialize_into(&mut buf);
        buf
    }
}

/// Read the shared `kind | playerId | tick` header, checking the kind.
fn read_header(
    reader: &mut ByteReader<'_>,
    expected: CommandKind,
) -> Result<(PlayerId, Tick), CommandError> {
    let kind = reader.read_u32("command kind")?;
    if kind != expected.0 {
        return Err(CommandError::Malformed {
            detail: format!("decoder for kind {expected} handed kind {kind}"),
        });
    }
    let player_id = PlayerId(reader.read_i32("command playerId")?);
    let tick = Tick(reader.read_i32("command tick")?);
    Ok((player_id, tick))
}

fn read_vec3(reader: &mut ByteReader<'_>, context: &'static str) -> Result<FpVec3, CommandError> {
    let x = Fp::from_raw(reader.read_i64(context)?);
    let y = Fp::from_raw(reader.read_i64(context)?);
    let z = Fp::from_raw(reader.read_i64(context)?);
    Ok(FpVec3::new(x, y, z))
}

/// Decode a serialized `Empty` command. Takes the full byte slice,
/// kind included.
pub fn decode_empty(bytes: &[u8]) -> Result<Command, CommandError> {
    let mut reader = ByteReader::new(bytes);
    let (player_id, tick) = read_header(&mut reader, CommandKind::EMPTY)?;
    Ok(Command {
        player_id,
        tick,
        payload: CommandPayload::Empty,
    })
}

/// Decode a serialized `Move` command. Takes the full byte slice,
/// kind included.
pub fn decode_move(bytes: &[u8]) -> Result<Command, CommandError> {
    let mut reader = ByteReader::new(bytes);
    let (player_id, tick) = read_header(&mut reader, CommandKind::MOVE)?;
    let target = read_vec3(&mut reader, "Move target")?;
    Ok(Command {
        player_id,
        tick,
        payload: CommandPayload::Move { target },
    })
}

/// Decode a serialized `Action` command. Takes the full byte slice,
/// kind included.
pub fn decode_action(bytes: &[u8]) -> Result<Command, CommandError> {
    let mut reader = ByteReader::new(bytes);
    let (player_id, tick) = read_header(&mut reader, CommandKind::ACTION)?;
    let action_id = reader.read_i32("Action actionId")?;
    let target_entity = EntityId(reader.read_i32("Action targetEntity")?);
    let point = read_vec3(&mut reader, "Action point")?;
    Ok(Command {
        player_id,
        tick,
        payload: CommandPayload::Action {
            action_id,
            target_entity,
            point,
        },
    })
}

//! Wire message vocabulary for the command plane.
//!
//! Every message is a byte string beginning with a one-byte type tag,
//! all integers little-endian:
//!
//! | Tag | Name        | Payload                                             |
//! |-----|-------------|-----------------------------------------------------|
//! | 1   | JoinRoom    | reserved                                            |
//! | 2   | LeaveRoom   | reserved                                            |
//! | 3   | PlayerReady | `playerId:i32, ready:u8`                            |
//! | 4   | GameStart   | `seed:i32, tickIntervalMs:i32, inputDelayTicks:i32, n:i32, playerIds:[i32;n]` |
//! | 10  | Command     | `tick:i32, playerId:i32, len:i32, cmdBytes[len]`    |
//! | 11  | CommandAck  | `tick:i32, playerId:i32`                            |
//! | 20  | SyncHash    | `tick:i32, hash:i64, playerId:i32`                  |
//! | 30  | Ping        | `ts:i64, seq:i32`                                   |
//! | 31  | Pong        | `ts:i64, seq:i32`                                   |
//!
//! The `Command` payload's `cmdBytes` is a complete serialized
//! [`cadence_core::Command`]; the outer `tick`/`playerId` fields echo
//! its header so routing never needs the command registry.

use cadence_core::codec::{put_bytes, put_i32, put_i64, put_u8, ByteReader};
use cadence_core::{CommandError, PlayerId, Tick};

/// Message type tags.
mod tag {
    pub const JOIN_ROOM: u8 = 1;
    pub const LEAVE_ROOM: u8 = 2;
    pub const PLAYER_READY: u8 = 3;
    pub const GAME_START: u8 = 4;
    pub const COMMAND: u8 = 10;
    pub const COMMAND_ACK: u8 = 11;
    pub const SYNC_HASH: u8 = 20;
    pub const PING: u8 = 30;
    pub const PONG: u8 = 31;
}

/// A decoded command-plane message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Message {
    /// A peer announces itself. Payload reserved.
    JoinRoom,
    /// A peer is leaving. Payload reserved.
    LeaveRoom,
    /// Readiness toggle for the lobby.
    PlayerReady {
        /// The toggling player.
        player_id: PlayerId,
        /// New readiness state.
        ready: bool,
    },
    /// Host starts the session with shared parameters.
    GameStart {
        /// Simulation seed.
        seed: i32,
        /// Tick duration all peers must use.
        tick_interval_ms: i32,
        /// Input delay all peers must use.
        input_delay_ticks: i32,
        /// Every participating player, in id order.
        player_ids: Vec<PlayerId>,
    },
    /// A serialized player command.
    Command {
        /// Execution tick (echoes the command header).
        tick: Tick,
        /// Issuing player (echoes the command header).
        player_id: PlayerId,
        /// The full serialized command.
        cmd_bytes: Vec<u8>,
    },
    /// Receipt for a command (observability; no retransmit logic).
    CommandAck {
        /// Acknowledged tick.
        tick: Tick,
        /// Acknowledged player.
        player_id: PlayerId,
    },
    /// A peer's state hash at a checkpoint tick.
    SyncHash {
        /// Checkpoint tick.
        tick: Tick,
        /// The peer's world hash (i64 on the wire).
        hash: i64,
        /// Reporting player.
        player_id: PlayerId,
    },
    /// RTT probe.
    Ping {
        /// Sender's clock at send time, milliseconds.
        ts: i64,
        /// Probe sequence number.
        seq: i32,
    },
    /// RTT probe reply, echoing the probe fields.
    Pong {
        /// Echoed clock value.
        ts: i64,
        /// Echoed sequence number.
        seq: i32,
    },
}

impl Message {
    /// Encode into the tagged wire form.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(64);
        match self {
            Message::JoinRoom => put_u8(&mut buf, tag::JOIN_ROOM),
            Message::LeaveRoom => put_u8(&mut buf, tag::LEAVE_ROOM),
            Message::PlayerReady { player_id, ready } => {
                put_u8(&mut buf, tag::PLAYER_READY);
                put_i32(&mut buf, player_id.0);
                put_u8(&mut buf, *ready as u8);
            }
            Message::GameStart {
                seed,
                tick_interval_ms,
                input_delay_ticks,
                player_ids,
            } => {
                put_u8(&mut buf, tag::GAME_START);
                put_i32(&mut buf, *seed);
                put_i32(&mut buf, *tick_interval_ms);
                put_i32(&mut buf, *input_delay_ticks);
                put_i32(&mut buf, player_ids.len() as i32);
                for id in player_ids {
                    put_i32(&mut buf, id.0);
                }
            }
            Message::Command {
                tick,
                player_id,
                cmd_bytes,
            } => {
                put_u8(&mut buf, tag::COMMAND);
                put_i32(&mut buf, tick.0);
                put_i32(&mut buf, player_id.0);
                put_bytes(&mut buf, cmd_bytes);
            }
            Message::CommandAck { tick, player_id } => {
                put_u8(&mut buf, tag::COMMAND_ACK);
                put_i32(&mut buf, tick.0);
                put_i32(&mut buf, player_id.0);
            }
            Message::SyncHash {
                tick,
                hash,
                player_id,
            } => {
                put_u8(&mut buf, tag::SYNC_HASH);
                put_i32(&mut buf, tick.0);
                put_i64(&mut buf, *hash);
                put_i32(&mut buf, player_id.0);
            }
            Message::Ping { ts, seq } => {
                put_u8(&mut buf, tag::PING);
                put_i64(&mut buf, *ts);
                put_i32(&mut buf, *seq);
            }
            Message::Pong { ts, seq } => {
                put_u8(&mut buf, tag::PONG);
                put_i64(&mut buf, *ts);
                put_i32(&mut buf, *seq);
            }
        }
        buf
    }

    /// Decode from the tagged wire form.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::Truncated`] / [`CommandError::Malformed`]
    /// on structural problems, or [`CommandError::UnknownKind`] for an
    /// unrecognized tag (the caller logs and drops).
    pub fn decode(bytes: &[u8]) -> Result<Message, CommandError> {
        let mut r = ByteReader::new(bytes);
        let tag = r.read_u8("message tag")?;
        let message = match tag {
            tag::JOIN_ROOM => Message::JoinRoom,
            tag::LEAVE_ROOM => Message::LeaveRoom,
            tag::PLAYER_READY => Message::PlayerReady {
                player_id: PlayerId(r.read_i32("PlayerReady playerId")?),
                ready: match r.read_u8("PlayerReady ready")? {
                    0 => false,
                    1 => true,
                    other => {
                        return Err(CommandError::Malformed {
                            detail: format!("invalid ready flag {other}"),
                        })
                    }
                },
            },
            tag::GAME_START => {
                let seed = r.read_i32("GameStart seed")?;
                let tick_interval_ms = r.read_i32("GameStart tickIntervalMs")?;
                let input_delay_ticks = r.read_i32("GameStart inputDelayTicks")?;
                let n = r.read_i32("GameStart n")?;
                if n < 0 {
                    return Err(CommandError::Malformed {
                        detail: format!("negative player count {n}"),
                    });
                }
                let mut player_ids = Vec::with_capacity(n as usize);
                for _ in 0..n {
                    player_ids.push(PlayerId(r.read_i32("GameStart playerId")?));
                }
                Message::GameStart {
                    seed,
                    tick_interval_ms,
                    input_delay_ticks,
                    player_ids,
                }
            }
            tag::COMMAND => Message::Command {
                tick: Tick(r.read_i32("Command tick")?),
                player_id: PlayerId(r.read_i32("Command playerId")?),
                cmd_bytes: r.read_bytes("Command cmdBytes")?.to_vec(),
            },
            tag::COMMAND_ACK => Message::CommandAck {
                tick: Tick(r.read_i32("CommandAck tick")?),
                player_id: PlayerId(r.read_i32("CommandAck playerId")?),
            },
            tag::SYNC_HASH => Message::SyncHash {
                tick: Tick(r.read_i32("SyncHash tick")?),
                hash: r.read_i64("SyncHash hash")?,
                player_id: PlayerId(r.read_i32("SyncHash playerId")?),
            },
            tag::PING => Message::Ping {
                ts: r.read_i64("Ping ts")?,
                seq: r.read_i32("Ping seq")?,
            },
            tag::PONG => Message::Pong {
                ts: r.read_i64("Pong ts")?,
                seq: r.read_i32("Pong seq")?,
            },
            other => {
                return Err(CommandError::UnknownKind { kind: other as u32 });
            }
        };
        Ok(message)
    }

    /// The delivery class this message type travels under.
    pub fn reliability(&self) -> crate::transport::Reliability {
        match self {
            Message::Ping { .. } | Message::Pong { .. } => {
                crate::transport::Reliability::Unreliable
            }
            _ => crate::transport::Reliability::ReliableOrdered,
        }
    }
}

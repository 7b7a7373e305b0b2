//! Binary encode/decode for the replay file container.
//!
//! All integers are little-endian; strings and command blobs are
//! length-prefixed. The format carries no world state — only metadata
//! and the command log — so the codec is generic over `Read`/`Write`
//! and tests run entirely against in-memory buffers.

use std::io::{Read, Write};

use cadence_core::{Command, CommandRegistry, Tick};

use crate::error::{ReplayError, UnsupportedReason};
use crate::types::{ReplayData, ReplayMetadata, TickEntry};
use crate::{CURRENT_VERSION, MAGIC};

// ── Primitive writers ───────────────────────────────────────────

fn write_u32_le(w: &mut dyn Write, v: u32) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_i32_le(w: &mut dyn Write, v: i32) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_i64_le(w: &mut dyn Write, v: i64) -> Result<(), ReplayError> {
    w.write_all(&v.to_le_bytes())?;
    Ok(())
}

fn write_str(w: &mut dyn Write, s: &str) -> Result<(), ReplayError> {
    write_i32_le(w, s.len() as i32)?;
    w.write_all(s.as_bytes())?;
    Ok(())
}

// ── Primitive readers ───────────────────────────────────────────

fn read_u32_le(r: &mut dyn Read) -> Result<u32, ReplayError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn read_i32_le(r: &mut dyn Read) -> Result<i32, ReplayError> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(i32::from_le_bytes(buf))
}

fn read_i64_le(r: &mut dyn Read) -> Result<i64, ReplayError> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf)?;
    Ok(i64::from_le_bytes(buf))
}

fn read_str(r: &mut dyn Read) -> Result<String, ReplayError> {
    let len = read_i32_le(r)?;
    if len < 0 {
        return Err(ReplayError::InvalidReplayFormat {
            detail: format!("negative string length {len}"),
        });
    }
    let mut buf = vec![0u8; len as usize];
    r.read_exact(&mut buf)?;
    String::from_utf8(buf).map_err(|e| ReplayError::InvalidReplayFormat {
        detail: format!("invalid UTF-8 string: {e}"),
    })
}

// ── Container encode/decode ─────────────────────────────────────

/// Write a complete replay to `w`.
///
/// # Errors
///
/// Returns [`ReplayError::Io`] on sink failure.
pub fn write_replay(w: &mut dyn Write, data: &ReplayData) -> Result<(), ReplayError> {
    write_u32_le(w, MAGIC)?;

    let meta = &data.metadata;
    write_i32_le(w, meta.version)?;
    write_str(w, &meta.session_id)?;
    write_i64_le(w, meta.recorded_at)?;
    write_i64_le(w, meta.duration_ms)?;
    write_i32_le(w, meta.total_ticks)?;
    write_i32_le(w, meta.player_count)?;
    write_i32_le(w, meta.tick_interval_ms)?;
    write_i32_le(w, meta.random_seed)?;

    write_i32_le(w, data.ticks.len() as i32)?;
    let mut cmd_buf = Vec::with_capacity(64);
    for entry in &data.ticks {
        write_i32_le(w, entry.tick.0)?;
        write_i32_le(w, entry.commands.len() as i32)?;
        for cmd in &entry.commands {
            cmd_buf.clear();
            cmd.serialize_into(&mut cmd_buf);
            write_i32_le(w, cmd_buf.len() as i32)?;
            w.write_all(&cmd_buf)?;
        }
    }
    Ok(())
}

/// Read a complete replay from `r`, decoding commands through
/// `registry`.
///
/// # Errors
///
/// Returns [`ReplayError::UnsupportedReplay`] for a bad magic or a
/// too-new version, [`ReplayError::InvalidReplayFormat`] for structural
/// damage (including commands of unregistered kinds), and
/// [`ReplayError::Io`] for source failures.
pub fn read_replay(
    r: &mut dyn Read,
    registry: &CommandRegistry,
) -> Result<ReplayData, ReplayError> {
    let magic = read_u32_le(r)?;
    if magic != MAGIC {
        return Err(ReplayError::UnsupportedReplay {
            reason: UnsupportedReason::BadMagic { found: magic },
        });
    }

    let version = read_i32_le(r)?;
    if version > CURRENT_VERSION {
        return Err(ReplayError::UnsupportedReplay {
            reason: UnsupportedReason::VersionTooNew { found: version },
        });
    }

    let metadata = ReplayMetadata {
        version,
        session_id: read_str(r)?,
        recorded_at: read_i64_le(r)?,
        duration_ms: read_i64_le(r)?,
        total_ticks: read_i32_le(r)?,
        player_count: read_i32_le(r)?,
        tick_interval_ms: read_i32_le(r)?,
        random_seed: read_i32_le(r)?,
    };

    let tick_count = read_i32_le(r)?;
    if tick_count < 0 {
        return Err(ReplayError::InvalidReplayFormat {
            detail: format!("negative tick count {tick_count}"),
        });
    }

    let mut ticks = Vec::with_capacity(tick_count as usize);
    let mut cmd_buf = Vec::with_capacity(64);
    for _ in 0..tick_count {
        let tick = Tick(read_i32_le(r)?);
        let cmd_count = read_i32_le(r)?;
        if cmd_count < 0 {
            return Err(ReplayError::InvalidReplayFormat {
                detail: format!("negative command count {cmd_count} at tick {tick}"),
            });
        }
        let mut commands: Vec<Command> = Vec::with_capacity(cmd_count as usize);
        for _ in 0..cmd_count {
            let len = read_i32_le(r)?;
            if len < 0 {
                return Err(ReplayError::InvalidReplayFormat {
                    detail: format!("negative command length {len} at tick {tick}"),
                });
            }
            cmd_buf.resize(len as usize, 0);
            r.read_exact(&mut cmd_buf)?;
            commands.push(registry.decode(&cmd_buf)?);
        }
        ticks.push(TickEntry { tick, commands });
    }

    Ok(ReplayData { metadata, ticks })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{CommandPayload, PlayerId};
    use cadence_fixed::FpVec3;

    fn sample() -> ReplayData {
        ReplayData {
            metadata: ReplayMetadata {
                version: CURRENT_VERSION,
                session_id: "match-42".into(),
                recorded_at: 1_700_000_000_000,
                duration_ms: 10_000,
                total_ticks: 200,
                player_count: 2,
                tick_interval_ms: 50,
                random_seed: 12345,
            },
            ticks: vec![
                TickEntry {
                    tick: Tick(0),
                    commands: vec![
                        Command {
                            player_id: PlayerId(0),
                            tick: Tick(0),
                            payload: CommandPayload::Move {
                                target: FpVec3::from_ints(10, 0, 10),
                            },
                        },
                        Command::empty(PlayerId(1), Tick(0)),
                    ],
                },
                TickEntry {
                    tick: Tick(1),
                    commands: vec![],
                },
            ],
        }
    }

    #[test]
    fn round_trips_through_memory() {
        let data = sample();
        let mut buf = Vec::new();
        write_replay(&mut buf, &data).unwrap();

        let registry = CommandRegistry::default();
        let decoded = read_replay(&mut buf.as_slice(), &registry).unwrap();
        assert_eq!(data, decoded);
    }

    #[test]
    fn file_starts_with_rply_magic_le() {
        let mut buf = Vec::new();
        write_replay(&mut buf, &sample()).unwrap();
        assert_eq!(&buf[0..4], &0x52504C59u32.to_le_bytes());
    }

    #[test]
    fn bad_magic_is_unsupported() {
        let mut buf = Vec::new();
        write_replay(&mut buf, &sample()).unwrap();
        buf[0] ^= 0xFF;

        let registry = CommandRegistry::default();
        let err = read_replay(&mut buf.as_slice(), &registry).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::UnsupportedReplay {
                reason: UnsupportedReason::BadMagic { .. }
            }
        ));
    }

    #[test]
    fn future_version_is_unsupported() {
        let mut buf = Vec::new();
        write_replay(&mut buf, &sample()).unwrap();
        // Version field sits right after the 4-byte magic.
        buf[4..8].copy_from_slice(&(CURRENT_VERSION + 1).to_le_bytes());

        let registry = CommandRegistry::default();
        let err = read_replay(&mut buf.as_slice(), &registry).unwrap_err();
        assert!(matches!(
            err,
            ReplayError::UnsupportedReplay {
                reason: UnsupportedReason::VersionTooNew { .. }
            }
        ));
    }

    #[test]
    fn truncated_file_is_io_error() {
        let mut buf = Vec::new();
        write_replay(&mut buf, &sample()).unwrap();
        buf.truncate(buf.len() - 5);

        let registry = CommandRegistry::default();
        assert!(matches!(
            read_replay(&mut buf.as_slice(), &registry),
            Err(ReplayError::Io(_))
        ));
    }

    #[test]
    fn unknown_command_kind_is_invalid_format() {
        let mut data = sample();
        data.ticks[0].commands = vec![Command {
            player_id: PlayerId(0),
            tick: Tick(0),
            payload: CommandPayload::Custom {
                kind: cadence_core::CommandKind(88),
                data: vec![1, 2, 3],
            },
        }];
        let mut buf = Vec::new();
        write_replay(&mut buf, &data).unwrap();

        // Reader's registry never learned kind 88.
        let registry = CommandRegistry::default();
        assert!(matches!(
            read_replay(&mut buf.as_slice(), &registry),
            Err(ReplayError::InvalidReplayFormat { .. })
        ));
    }

    #[test]
    fn registered_custom_kind_round_trips() {
        let mut data = sample();
        data.ticks[0].commands = vec![Command {
            player_id: PlayerId(0),
            tick: Tick(0),
            payload: CommandPayload::Custom {
                kind: cadence_core::CommandKind(88),
                data: vec![1, 2, 3],
            },
        }];
        let mut buf = Vec::new();
        write_replay(&mut buf, &data).unwrap();

        let mut registry = CommandRegistry::default();
        registry
            .register_opaque(cadence_core::CommandKind(88))
            .unwrap();
        let decoded = read_replay(&mut buf.as_slice(), &registry).unwrap();
        assert_eq!(data, decoded);
    }
}

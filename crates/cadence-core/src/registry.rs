//! Command kind registry: numeric discriminant → decoder dispatch.
//!
//! The registry reads the leading four bytes of a serialized command,
//! looks up the decoder registered for that kind, and hands it the whole
//! byte slice (the decoder re-skips the kind). Built-in kinds are
//! registered by [`CommandRegistry::default`]; game-specific kinds
//! register at startup, and kind numbers are part of the wire contract.

use indexmap::IndexMap;

use crate::command::{self, Command, CommandPayload};
use crate::error::CommandError;
use crate::id::{CommandKind, PlayerId, Tick};

/// A decoder for one command kind. Receives the full serialized command,
/// kind prefix included.
pub type DecodeFn = Box<dyn Fn(&[u8]) -> Result<Command, CommandError> + Send + Sync>;

/// Maps command kinds to their decoders.
pub struct CommandRegistry {
    decoders: IndexMap<u32, DecodeFn>,
}

impl Default for CommandRegistry {
    /// A registry with the built-in kinds (`Empty`, `Move`, `Action`)
    /// pre-registered.
    fn default() -> Self {
        let mut registry = CommandRegistry {
            decoders: IndexMap::new(),
        };
        registry
            .decoders
            .insert(CommandKind::EMPTY.0, Box::new(command::decode_empty) as DecodeFn);
        registry
            .decoders
            .insert(CommandKind::MOVE.0, Box::new(command::decode_move) as DecodeFn);
        registry
            .decoders
            .insert(CommandKind::ACTION.0, Box::new(command::decode_action) as DecodeFn);
        registry
    }
}

impl CommandRegistry {
    /// Register a decoder for an external kind.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::DuplicateKind`] if the kind is already
    /// registered (including the built-ins).
    pub fn register(
        &mut self,
        kind: CommandKind,
        decode: DecodeFn,
    ) -> Result<(), CommandError> {
        if self.decoders.contains_key(&kind.0) {
            return Err(CommandError::DuplicateKind { kind: kind.0 });
        }
        self.decoders.insert(kind.0, decode);
        Ok(())
    }

    /// Register an external kind whose payload stays opaque.
    ///
    /// The decoded command carries the raw payload bytes as
    /// [`CommandPayload::Custom`]; the game interprets them in its
    /// entities' `apply_command`.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::DuplicateKind`] if the kind is taken.
    pub fn register_opaque(&mut self, kind: CommandKind) -> Result<(), CommandError> {
        self.register(
            kind,
            Box::new(move |bytes| {
                let mut reader = crate::codec::ByteReader::new(bytes);
                let found = reader.read_u32("command kind")?;
                if found != kind.0 {
                    return Err(CommandError::Malformed {
                        detail: format!("opaque decoder for kind {kind} handed kind {found}"),
                    });
                }
                let player_id = PlayerId(reader.read_i32("command playerId")?);
                let tick = Tick(reader.read_i32("command tick")?);
                Ok(Command {
                    player_id,
                    tick,
                    payload: CommandPayload::Custom {
                        kind,
                        data: reader.rest().to_vec(),
                    },
                })
            }),
        )
    }

    /// Whether a decoder exists for `kind`.
    pub fn is_registered(&self, kind: CommandKind) -> bool {
        self.decoders.contains_key(&kind.0)
    }

    /// Number of registered kinds.
    pub fn len(&self) -> usize {
        self.decoders.len()
    }

    /// Whether the registry is empty (never true after `default()`).
    pub fn is_empty(&self) -> bool {
        self.decoders.is_empty()
    }

    /// Decode a serialized command by its leading kind discriminant.
    ///
    /// # Errors
    ///
    /// Returns [`CommandError::UnknownKind`] for unregistered kinds,
    /// [`CommandError::Truncated`] for short inputs, or whatever the
    /// kind's decoder reports.
    pub fn decode(&self, bytes: &[u8]) -> Result<Command, CommandError> {
        if bytes.len() < 4 {
            return Err(CommandError::Truncated {
                context: "command kind",
            });
        }
        let kind = u32::from_le_bytes(bytes[0..4].try_into().expect("length checked"));
        let decode = self
            .decoders
            .get(&kind)
            .ok_or(CommandError::UnknownKind { kind })?;
        decode(bytes)
    }

    /// Deep-copy a command by running it through serialize → decode.
    ///
    /// The replay recorder uses this so the log can never alias live
    /// buffer state.
    ///
    /// # Errors
    ///
    /// Fails only if the command's kind is not registered here.
    pub fn clone_via_wire(&self, cmd: &Command) -> Result<Command, CommandError> {
        self.decode(&cmd.serialize())
    }
}

impl std::fmt::Debug for CommandRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRegistry")
            .field("kinds", &self.decoders.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_fixed::FpVec3;

    #[test]
    fn default_registry_decodes_builtins() {
        let registry = CommandRegistry::default();
        assert_eq!(registry.len(), 3);

        let cmd = Command {
            player_id: PlayerId(2),
            tick: Tick(5),
            payload: CommandPayload::Move {
                target: FpVec3::from_ints(1, 2, 3),
            },
        };
        let decoded = registry.decode(&cmd.serialize()).unwrap();
        assert_eq!(cmd, decoded);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let registry = CommandRegistry::default();
        let mut bytes = Command::empty(PlayerId(0), Tick(0)).serialize();
        bytes[0..4].copy_from_slice(&999u32.to_le_bytes());
        assert_eq!(
            registry.decode(&bytes),
            Err(CommandError::UnknownKind { kind: 999 })
        );
    }

    #[test]
    fn short_input_is_truncated() {
        let registry = CommandRegistry::default();
        assert!(matches!(
            registry.decode(&[1, 0]),
            Err(CommandError::Truncated { .. })
        ));
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let mut registry = CommandRegistry::default();
        assert_eq!(
            registry.register_opaque(CommandKind::MOVE),
            Err(CommandError::DuplicateKind { kind: 1 })
        );
        registry.register_opaque(CommandKind(50)).unwrap();
        assert_eq!(
            registry.register_opaque(CommandKind(50)),
            Err(CommandError::DuplicateKind { kind: 50 })
        );
    }

    #[test]
    fn opaque_kind_round_trips() {
        let mut registry = CommandRegistry::default();
        registry.register_opaque(CommandKind(7)).unwrap();

        let cmd = Command {
            player_id: PlayerId(1),
            tick: Tick(30),
            payload: CommandPayload::Custom {
                kind: CommandKind(7),
                data: vec![0xCA, 0xFE, 0x00],
            },
        };
        let decoded = registry.decode(&cmd.serialize()).unwrap();
        assert_eq!(cmd, decoded);
    }

    #[test]
    fn clone_via_wire_is_deep() {
        let registry = CommandRegistry::default();
        let cmd = Command {
            player_id: PlayerId(0),
            tick: Tick(1),
            payload: CommandPayload::Action {
                action_id: 1,
                target_entity: crate::id::EntityId(4),
                point: FpVec3::from_ints(0, 0, 0),
            },
        };
        let copy = registry.clone_via_wire(&cmd).unwrap();
        assert_eq!(cmd, copy);
    }
}

//! The network service: room lifecycle, player table, and message routing.
//!
//! [`NetworkService`] brokers between the opaque [`Transport`] and the
//! lockstep engine. Outbound, it frames commands and sync hashes into
//! wire messages. Inbound, [`poll`](NetworkService::poll) decodes
//! transport traffic and surfaces it as [`NetEvent`]s on a channel; the
//! engine drains that channel at the top of each update, so all
//! simulation state stays on the game-loop thread regardless of how the
//! transport is driven.
//!
//! Sync hashes are keyed by the `(tick, player)` tuple. When the local
//! hash and a remote hash for the same tick are both present and differ,
//! the service emits exactly one [`NetEvent::DesyncDetected`] for that
//! pair.

use crossbeam_channel::{unbounded, Receiver, Sender};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use cadence_core::{Command, CommandRegistry, PlayerId, Tick};

use crate::error::NetError;
use crate::message::Message;
use crate::transport::Transport;

/// One row of the player table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayerInfo {
    /// Session id, also the transport address.
    pub player_id: PlayerId,
    /// Display name.
    pub name: String,
    /// Lobby readiness.
    pub ready: bool,
    /// Smoothed round-trip time in milliseconds, 0 until measured.
    pub ping_ms: u32,
}

/// Session parameters the host fixes before starting the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionParams {
    /// Simulation seed.
    pub seed: i32,
    /// Tick duration every peer must use.
    pub tick_interval_ms: u32,
    /// Input delay every peer must use.
    pub input_delay_ticks: u32,
}

/// Events surfaced to the engine by [`NetworkService::poll`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NetEvent {
    /// A remote command decoded successfully.
    CommandReceived(Command),
    /// The host started the session.
    GameStart {
        /// Simulation seed.
        seed: i32,
        /// Tick duration in milliseconds.
        tick_interval_ms: u32,
        /// Input delay in ticks.
        input_delay_ticks: u32,
        /// Every participating player.
        player_ids: Vec<PlayerId>,
    },
    /// A remote hash disagreed with the local hash at a checkpoint.
    DesyncDetected {
        /// The disagreeing peer.
        player_id: PlayerId,
        /// The checkpoint tick.
        tick: Tick,
        /// Our hash at that tick.
        local_hash: u64,
        /// The peer's hash at that tick.
        remote_hash: u64,
    },
    /// A peer joined the room.
    PlayerJoined {
        /// The new peer.
        player_id: PlayerId,
    },
    /// A peer left the room.
    PlayerLeft {
        /// The departed peer.
        player_id: PlayerId,
    },
    /// A peer toggled readiness.
    PlayerReadyChanged {
        /// The toggling peer.
        player_id: PlayerId,
        /// The new state.
        ready: bool,
    },
}

/// Thin broker over a [`Transport`].
pub struct NetworkService {
    transport: Box<dyn Transport>,
    registry: CommandRegistry,
    players: IndexMap<i32, PlayerInfo>,
    local_player_id: PlayerId,
    is_host: bool,
    room: Option<String>,
    max_players: u32,
    session: Option<SessionParams>,
    local_hashes: IndexMap<i32, u64>,
    remote_hashes: IndexMap<(i32, i32), u64>,
    desyncs_reported: IndexSet<(i32, i32)>,
    events_tx: Sender<NetEvent>,
    events_rx: Receiver<NetEvent>,
    ping_seq: i32,
    inbox: Vec<(PlayerId, Vec<u8>)>,
}

impl NetworkService {
    /// Wrap a transport and command registry.
    pub fn new(transport: Box<dyn Transport>, registry: CommandRegistry) -> Self {
        let (events_tx, events_rx) = unbounded();
        NetworkService {
            transport,
            registry,
            players: IndexMap::new(),
            local_player_id: PlayerId(0),
            is_host: false,
            room: None,
            max_players: 0,
            session: None,
            local_hashes: IndexMap::new(),
            remote_hashes: IndexMap::new(),
            desyncs_reported: IndexSet::new(),
            events_tx,
            events_rx,
            ping_seq: 0,
            inbox: Vec::new(),
        }
    }

    // ── Room lifecycle ──────────────────────────────────────────

    /// Host path: open a room for `max_players`. The host is player 0
    /// and joins its own table immediately.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::AlreadyInRoom`] if a room is active.
    pub fn create_room(&mut self, name: &str, max_players: u32) -> Result<(), NetError> {
        if self.room.is_some() {
            return Err(NetError::AlreadyInRoom);
        }
        self.room = Some(name.to_string());
        self.max_players = max_players;
        self.is_host = true;
        self.local_player_id = PlayerId(0);
        self.players.insert(
            0,
            PlayerInfo {
                player_id: PlayerId(0),
                name: "host".to_string(),
                ready: false,
                ping_ms: 0,
            },
        );
        Ok(())
    }

    /// Peer path: join a room under the id the transport assigned us.
    ///
    /// Peer id assignment belongs to the matchmaking layer, which is
    /// out of scope; the in-memory test hub hands out sequential ids.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::AlreadyInRoom`] if a room is active, or a
    /// transport error from announcing the join.
    pub fn join_room(&mut self, name: &str, local_id: PlayerId) -> Result<(), NetError> {
        if self.room.is_some() {
            return Err(NetError::AlreadyInRoom);
        }
        self.room = Some(name.to_string());
        self.is_host = false;
        self.local_player_id = local_id;
        self.players.insert(
            local_id.0,
            PlayerInfo {
                player_id: local_id,
                name: format!("player-{local_id}"),
                ready: false,
                ping_ms: 0,
            },
        );
        self.send_message(&Message::JoinRoom)
    }

    /// Leave the room, announcing the departure.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::NotInRoom`] when no room is active.
    pub fn leave_room(&mut self) -> Result<(), NetError> {
        if self.room.is_none() {
            return Err(NetError::NotInRoom);
        }
        let result = self.send_message(&Message::LeaveRoom);
        self.room = None;
        self.players.clear();
        self.session = None;
        self.local_hashes.clear();
        self.remote_hashes.clear();
        self.desyncs_reported.clear();
        result
    }

    /// Fix the session parameters the host will announce in `GameStart`.
    pub fn set_session_params(&mut self, params: SessionParams) {
        self.session = Some(params);
    }

    /// Toggle local readiness. On the host, this may trigger the game
    /// start if every seat is filled and ready.
    ///
    /// # Errors
    ///
    /// Returns a transport error from the broadcast.
    pub fn set_ready(&mut self, ready: bool) -> Result<(), NetError> {
        let local = self.local_player_id;
        if let Some(info) = self.players.get_mut(&local.0) {
            info.ready = ready;
        }
        self.send_message(&Message::PlayerReady {
            player_id: local,
            ready,
        })?;
        if self.is_host {
            self.maybe_start_game()?;
        }
        Ok(())
    }

    /// Host check: when the room is full and everyone is ready,
    /// broadcast `GameStart` and surface it locally too.
    fn maybe_start_game(&mut self) -> Result<(), NetError> {
        let Some(params) = self.session else {
            return Ok(());
        };
        if self.players.len() != self.max_players as usize {
            return Ok(());
        }
        if !self.players.values().all(|p| p.ready) {
            return Ok(());
        }

        let mut player_ids: Vec<PlayerId> =
            self.players.values().map(|p| p.player_id).collect();
        player_ids.sort();

        let message = Message::GameStart {
            seed: params.seed,
            tick_interval_ms: params.tick_interval_ms as i32,
            input_delay_ticks: params.input_delay_ticks as i32,
            player_ids: player_ids.clone(),
        };
        self.send_message(&message)?;

        // The host's engine consumes the same event as every peer.
        self.emit(NetEvent::GameStart {
            seed: params.seed,
            tick_interval_ms: params.tick_interval_ms,
            input_delay_ticks: params.input_delay_ticks,
            player_ids,
        });
        Ok(())
    }

    // ── Outbound traffic ────────────────────────────────────────

    /// Broadcast a local command (reliable-ordered).
    ///
    /// # Errors
    ///
    /// Returns a transport error from the broadcast.
    pub fn send_command(&mut self, cmd: &Command) -> Result<(), NetError> {
        let message = Message::Command {
            tick: cmd.tick,
            player_id: cmd.player_id,
            cmd_bytes: cmd.serialize(),
        };
        self.send_message(&message)
    }

    /// Record the local hash for `tick` and broadcast it.
    ///
    /// Remote hashes that arrived first are compared immediately.
    ///
    /// # Errors
    ///
    /// Returns a transport error from the broadcast.
    pub fn send_sync_hash(&mut self, tick: Tick, hash: u64) -> Result<(), NetError> {
        self.local_hashes.insert(tick.0, hash);

        // A peer's hash may have arrived before ours was computed.
        let pending: Vec<(i32, u64)> = self
            .remote_hashes
            .iter()
            .filter(|((t, _), _)| *t == tick.0)
            .map(|((_, p), &h)| (*p, h))
            .collect();
        for (player, remote_hash) in pending {
            self.compare_hashes(Tick(tick.0), PlayerId(player), hash, remote_hash);
        }

        let message = Message::SyncHash {
            tick,
            hash: hash as i64,
            player_id: self.local_player_id,
        };
        self.send_message(&message)
    }

    /// Broadcast an RTT probe stamped with the caller's clock.
    ///
    /// # Errors
    ///
    /// Returns a transport error from the broadcast.
    pub fn send_ping(&mut self, now_ms: i64) -> Result<(), NetError> {
        self.ping_seq += 1;
        let message = Message::Ping {
            ts: now_ms,
            seq: self.ping_seq,
        };
        self.send_message(&message)
    }

    /// Prune hash bookkeeping for ticks older than `tick`.
    pub fn clear_old_data(&mut self, tick: Tick) {
        self.local_hashes.retain(|&t, _| t >= tick.0);
        self.remote_hashes.retain(|&(t, _), _| t >= tick.0);
        self.desyncs_reported.retain(|&(t, _)| t >= tick.0);
    }

    fn send_message(&mut self, message: &Message) -> Result<(), NetError> {
        let bytes = message.encode();
        self.transport.broadcast(&bytes, message.reliability())
    }

    // ── Inbound traffic ─────────────────────────────────────────

    /// Drain the transport, decode each message, and emit events.
    ///
    /// `now_ms` is the caller's monotonic clock in milliseconds, used
    /// only for RTT arithmetic. Malformed messages are logged and
    /// dropped; they never interrupt the session.
    pub fn poll(&mut self, now_ms: i64) {
        let mut inbox = std::mem::take(&mut self.inbox);
        inbox.clear();
        self.transport.poll(&mut |peer, bytes| {
            inbox.push((peer, bytes.to_vec()));
        });

        for (peer, bytes) in inbox.drain(..) {
            match Message::decode(&bytes) {
                Ok(message) => self.handle_message(peer, message, now_ms),
                Err(e) => {
                    warn!(peer = peer.0, error = %e, "dropping undecodable message");
                }
            }
        }
        self.inbox = inbox;
    }

    fn handle_message(&mut self, peer: PlayerId, message: Message, now_ms: i64) {
        match message {
            Message::JoinRoom => {
                self.players.entry(peer.0).or_insert_with(|| PlayerInfo {
                    player_id: peer,
                    name: format!("player-{peer}"),
                    ready: false,
                    ping_ms: 0,
                });
                self.emit(NetEvent::PlayerJoined { player_id: peer });
            }
            Message::LeaveRoom => {
                if self.players.shift_remove(&peer.0).is_some() {
                    self.emit(NetEvent::PlayerLeft { player_id: peer });
                }
            }
            Message::PlayerReady { player_id, ready } => {
                // A peer can only flag itself; trust the header over
                // the envelope but log disagreement.
                if player_id != peer {
                    debug!(peer = peer.0, claimed = player_id.0, "ready flag relabeled");
                }
                self.players.entry(player_id.0).or_insert_with(|| PlayerInfo {
                    player_id,
                    name: format!("player-{player_id}"),
                    ready: false,
                    ping_ms: 0,
                });
                if let Some(info) = self.players.get_mut(&player_id.0) {
                    info.ready = ready;
                }
                self.emit(NetEvent::PlayerReadyChanged { player_id, ready });
                if self.is_host {
                    if let Err(e) = self.maybe_start_game() {
                        warn!(error = %e, "failed to broadcast game start");
                    }
                }
            }
            Message::GameStart {
                seed,
                tick_interval_ms,
                input_delay_ticks,
                player_ids,
            } => {
                self.session = Some(SessionParams {
                    seed,
                    tick_interval_ms: tick_interval_ms as u32,
                    input_delay_ticks: input_delay_ticks as u32,
                });
                for id in &player_ids {
                    self.players.entry(id.0).or_insert_with(|| PlayerInfo {
                        player_id: *id,
                        name: format!("player-{id}"),
                        ready: true,
                        ping_ms: 0,
                    });
                }
                self.emit(NetEvent::GameStart {
                    seed,
                    tick_interval_ms: tick_interval_ms as u32,
                    input_delay_ticks: input_delay_ticks as u32,
                    player_ids,
                });
            }
            Message::Command { cmd_bytes, .. } => match self.registry.decode(&cmd_bytes) {
                Ok(cmd) => self.emit(NetEvent::CommandReceived(cmd)),
                Err(e) => {
                    // Unknown or malformed kinds are dropped with a log
                    // line; determinism is unaffected because no peer
                    // could decode them either.
                    warn!(peer = peer.0, error = %e, "dropping undecodable command");
                }
            },
            Message::CommandAck { .. } => {
                // Delivery is reliable-ordered by contract; acks are
                // observability-only and currently uncounted.
            }
            Message::SyncHash {
                tick,
                hash,
                player_id,
            } => {
                let remote_hash = hash as u64;
                self.remote_hashes.insert((tick.0, player_id.0), remote_hash);
                if let Some(&local_hash) = self.local_hashes.get(&tick.0) {
                    self.compare_hashes(tick, player_id, local_hash, remote_hash);
                }
            }
            Message::Ping { ts, seq } => {
                let reply = Message::Pong { ts, seq };
                if let Err(e) =
                    self.transport
                        .send(peer, &reply.encode(), reply.reliability())
                {
                    debug!(peer = peer.0, error = %e, "pong send failed");
                }
            }
            Message::Pong { ts, .. } => {
                let rtt = (now_ms - ts).max(0) as u32;
                if let Some(info) = self.players.get_mut(&peer.0) {
                    info.ping_ms = rtt;
                }
            }
        }
    }

    fn compare_hashes(&mut self, tick: Tick, player: PlayerId, local: u64, remote: u64) {
        if local == remote {
            return;
        }
        if !self.desyncs_reported.insert((tick.0, player.0)) {
            return; // already reported for this (tick, player)
        }
        warn!(
            tick = tick.0,
            peer = player.0,
            local = format_args!("{local:#018x}"),
            remote = format_args!("{remote:#018x}"),
            "state hash mismatch"
        );
        self.emit(NetEvent::DesyncDetected {
            player_id: player,
            tick,
            local_hash: local,
            remote_hash: remote,
        });
    }

    fn emit(&self, event: NetEvent) {
        // The channel is unbounded and the receiver lives as long as
        // the service, so send cannot fail in practice.
        let _ = self.events_tx.send(event);
    }

    // ── Accessors ───────────────────────────────────────────────

    /// A receiver for the service's event stream. The engine holds one
    /// and drains it each update.
    pub fn event_receiver(&self) -> Receiver<NetEvent> {
        self.events_rx.clone()
    }

    /// The player table, in join order.
    pub fn players(&self) -> impl Iterator<Item = &PlayerInfo> {
        self.players.values()
    }

    /// Number of players in the room.
    pub fn player_count(&self) -> u32 {
        self.players.len() as u32
    }

    /// The local player's id.
    pub fn local_player_id(&self) -> PlayerId {
        self.local_player_id
    }

    /// Whether this peer opened the room.
    pub fn is_host(&self) -> bool {
        self.is_host
    }

    /// The active room name, if joined.
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// The announced session parameters, once known.
    pub fn session_params(&self) -> Option<SessionParams> {
        self.session
    }

    /// The command registry used for decoding.
    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }
}

impl std::fmt::Debug for NetworkService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetworkService")
            .field("room", &self.room)
            .field("local_player_id", &self.local_player_id)
            .field("is_host", &self.is_host)
            .field("players", &self.players.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Reliability;
    use std::collections::VecDeque;

    /// Loopback transport: broadcasts land in a queue the test can
    /// inject back as another peer's traffic.
    #[derive(Default)]
    struct LoopTransport {
        pub sent: Vec<(Option<PlayerId>, Vec<u8>, Reliability)>,
        pub incoming: VecDeque<(PlayerId, Vec<u8>)>,
    }

    impl Transport for LoopTransport {
        fn send(
            &mut self,
            peer: PlayerId,
            bytes: &[u8],
            reliability: Reliability,
        ) -> Result<(), NetError> {
            self.sent.push((Some(peer), bytes.to_vec(), reliability));
            Ok(())
        }

        fn broadcast(&mut self, bytes: &[u8], reliability: Reliability) -> Result<(), NetError> {
            self.sent.push((None, bytes.to_vec(), reliability));
            Ok(())
        }

        fn poll(&mut self, dispatch: &mut dyn FnMut(PlayerId, &[u8])) {
            while let Some((peer, bytes)) = self.incoming.pop_front() {
                dispatch(peer, &bytes);
            }
        }
    }

    fn host_service() -> NetworkService {
        let mut service = NetworkService::new(
            Box::new(LoopTransport::default()),
            CommandRegistry::default(),
        );
        service.create_room("test", 2).unwrap();
        service.set_session_params(SessionParams {
            seed: 12345,
            tick_interval_ms: 50,
            input_delay_ticks: 2,
        });
        service
    }

    impl NetworkService {
        /// Decode-and-handle directly, the same path `poll` takes after
        /// draining the transport.
        fn inject_at(&mut self, peer: PlayerId, message: Message, now_ms: i64) {
            let bytes = message.encode();
            let decoded = Message::decode(&bytes).unwrap();
            self.handle_message(peer, decoded, now_ms);
        }
    }

    fn inject(service: &mut NetworkService, peer: PlayerId, message: Message) {
        service.inject_at(peer, message, 0);
    }

    #[test]
    fn create_room_seats_the_host() {
        let service = host_service();
        assert!(service.is_host());
        assert_eq!(service.local_player_id(), PlayerId(0));
        assert_eq!(service.player_count(), 1);
        assert_eq!(service.room(), Some("test"));
    }

    #[test]
    fn create_room_twice_fails() {
        let mut service = host_service();
        assert!(matches!(
            service.create_room("other", 2),
            Err(NetError::AlreadyInRoom)
        ));
    }

    #[test]
    fn join_adds_player_and_emits_event() {
        let mut service = host_service();
        let events = service.event_receiver();
        inject(&mut service, PlayerId(1), Message::JoinRoom);

        assert_eq!(service.player_count(), 2);
        assert_eq!(
            events.try_recv().unwrap(),
            NetEvent::PlayerJoined {
                player_id: PlayerId(1)
            }
        );
    }

    #[test]
    fn all_ready_triggers_game_start() {
        let mut service = host_service();
        let events = service.event_receiver();

        inject(&mut service, PlayerId(1), Message::JoinRoom);
        inject(
            &mut service,
            PlayerId(1),
            Message::PlayerReady {
                player_id: PlayerId(1),
                ready: true,
            },
        );
        // Not everyone ready yet — no start.
        while let Ok(event) = events.try_recv() {
            assert!(!matches!(event, NetEvent::GameStart { .. }));
        }

        service.set_ready(true).unwrap();
        let start = events
            .try_iter()
            .find(|e| matches!(e, NetEvent::GameStart { .. }))
            .expect("game start after all ready");
        match start {
            NetEvent::GameStart {
                seed, player_ids, ..
            } => {
                assert_eq!(seed, 12345);
                assert_eq!(player_ids, vec![PlayerId(0), PlayerId(1)]);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn commands_decode_and_surface() {
        let mut service = host_service();
        let events = service.event_receiver();

        let cmd = Command::empty(PlayerId(1), Tick(5));
        inject(
            &mut service,
            PlayerId(1),
            Message::Command {
                tick: cmd.tick,
                player_id: cmd.player_id,
                cmd_bytes: cmd.serialize(),
            },
        );
        assert_eq!(events.try_recv().unwrap(), NetEvent::CommandReceived(cmd));
    }

    #[test]
    fn unknown_command_kind_is_dropped_silently() {
        let mut service = host_service();
        let events = service.event_receiver();

        let mut cmd_bytes = Command::empty(PlayerId(1), Tick(5)).serialize();
        cmd_bytes[0..4].copy_from_slice(&777u32.to_le_bytes());
        inject(
            &mut service,
            PlayerId(1),
            Message::Command {
                tick: Tick(5),
                player_id: PlayerId(1),
                cmd_bytes,
            },
        );
        assert!(events.try_recv().is_err(), "bad command must not surface");
    }

    #[test]
    fn desync_fires_once_per_tick_and_player() {
        let mut service = host_service();
        let events = service.event_receiver();

        service.send_sync_hash(Tick(30), 0xAAAA).unwrap();
        let mismatch = Message::SyncHash {
            tick: Tick(30),
            hash: 0xBBBB,
            player_id: PlayerId(1),
        };
        inject(&mut service, PlayerId(1), mismatch.clone());
        inject(&mut service, PlayerId(1), mismatch);

        let desyncs: Vec<_> = events
            .try_iter()
            .filter(|e| matches!(e, NetEvent::DesyncDetected { .. }))
            .collect();
        assert_eq!(desyncs.len(), 1, "exactly one desync per (tick, player)");
        match &desyncs[0] {
            NetEvent::DesyncDetected {
                local_hash,
                remote_hash,
                tick,
                ..
            } => {
                assert_eq!(*local_hash, 0xAAAA);
                assert_eq!(*remote_hash, 0xBBBB);
                assert_eq!(*tick, Tick(30));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn matching_hashes_stay_quiet() {
        let mut service = host_service();
        let events = service.event_receiver();

        service.send_sync_hash(Tick(30), 0xAAAA).unwrap();
        inject(
            &mut service,
            PlayerId(1),
            Message::SyncHash {
                tick: Tick(30),
                hash: 0xAAAA,
                player_id: PlayerId(1),
            },
        );
        assert!(events
            .try_iter()
            .all(|e| !matches!(e, NetEvent::DesyncDetected { .. })));
    }

    #[test]
    fn remote_hash_before_local_still_detects() {
        let mut service = host_service();
        let events = service.event_receiver();

        inject(
            &mut service,
            PlayerId(1),
            Message::SyncHash {
                tick: Tick(60),
                hash: 0x1111,
                player_id: PlayerId(1),
            },
        );
        // No local hash yet — nothing to compare.
        assert!(events
            .try_iter()
            .all(|e| !matches!(e, NetEvent::DesyncDetected { .. })));

        service.send_sync_hash(Tick(60), 0x2222).unwrap();
        assert!(events
            .try_iter()
            .any(|e| matches!(e, NetEvent::DesyncDetected { .. })));
    }

    #[test]
    fn clear_old_data_prunes_hash_tables() {
        let mut service = host_service();
        service.send_sync_hash(Tick(30), 1).unwrap();
        service.send_sync_hash(Tick(60), 2).unwrap();
        service.clear_old_data(Tick(50));

        // A stale remote hash for tick 30 can no longer match anything.
        let events = service.event_receiver();
        inject(
            &mut service,
            PlayerId(1),
            Message::SyncHash {
                tick: Tick(30),
                hash: 999,
                player_id: PlayerId(1),
            },
        );
        assert!(events
            .try_iter()
            .all(|e| !matches!(e, NetEvent::DesyncDetected { .. })));
    }

    #[test]
    fn pong_updates_rtt() {
        let mut service = host_service();
        inject(&mut service, PlayerId(1), Message::JoinRoom);
        service.send_ping(1_000).unwrap();

        // Peer echoes the probe; 80 ms later we see the pong.
        service.inject_at(PlayerId(1), Message::Pong { ts: 1_000, seq: 1 }, 1_080);
        let peer = service
            .players()
            .find(|p| p.player_id == PlayerId(1))
            .unwrap();
        assert_eq!(peer.ping_ms, 80);
    }

    #[test]
    fn leave_room_clears_state() {
        let mut service = host_service();
        inject(&mut service, PlayerId(1), Message::JoinRoom);
        service.leave_room().unwrap();
        assert_eq!(service.room(), None);
        assert_eq!(service.player_count(), 0);
        assert!(matches!(service.leave_room(), Err(NetError::NotInRoom)));
    }
}

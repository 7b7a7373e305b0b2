//! Test doubles shared across the cadence workspace.
//!
//! [`MemoryHub`] is an in-process message mesh: each peer gets a
//! [`MemoryTransport`] endpoint, broadcasts fan out to every other
//! endpoint, and individual links can be blocked to stage late-arrival
//! and rollback scenarios. Delivery is reliable-ordered per link, which
//! matches the contract the engine assumes for command traffic.

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use indexmap::{IndexMap, IndexSet};

use cadence_core::{Command, CommandPayload, PlayerId, Tick};
use cadence_fixed::FpVec3;
use cadence_net::{NetError, Reliability, Transport};

#[derive(Default)]
struct HubState {
    /// Per-destination inbound queues of `(sender, bytes)`.
    queues: IndexMap<i32, VecDeque<(PlayerId, Vec<u8>)>>,
    /// Blocked `(from, to)` links; traffic parks in `held` until the
    /// link unblocks.
    blocked: IndexSet<(i32, i32)>,
    held: Vec<(i32, i32, Vec<u8>)>,
}

impl HubState {
    fn deliver(&mut self, from: PlayerId, to: PlayerId, bytes: &[u8]) {
        if self.blocked.contains(&(from.0, to.0)) {
            self.held.push((from.0, to.0, bytes.to_vec()));
            return;
        }
        if let Some(queue) = self.queues.get_mut(&to.0) {
            queue.push_back((from, bytes.to_vec()));
        }
    }
}

/// An in-memory message mesh for multi-peer tests.
#[derive(Clone, Default)]
pub struct MemoryHub {
    state: Arc<Mutex<HubState>>,
}

impl MemoryHub {
    /// An empty hub.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer and return its transport endpoint.
    pub fn endpoint(&self, id: PlayerId) -> MemoryTransport {
        let mut state = self.state.lock().unwrap();
        state.queues.entry(id.0).or_default();
        MemoryTransport {
            id,
            state: Arc::clone(&self.state),
        }
    }

    /// Block or unblock the directed link `from → to`. While blocked,
    /// traffic is held; unblocking flushes held messages in send order.
    pub fn set_link_blocked(&self, from: PlayerId, to: PlayerId, blocked: bool) {
        let mut state = self.state.lock().unwrap();
        if blocked {
            state.blocked.insert((from.0, to.0));
            return;
        }
        state.blocked.shift_remove(&(from.0, to.0));
        let released: Vec<(i32, Vec<u8>)> = {
            let held = &mut state.held;
            let mut released = Vec::new();
            held.retain(|(f, t, bytes)| {
                if *f == from.0 && *t == to.0 {
                    released.push((*f, bytes.clone()));
                    false
                } else {
                    true
                }
            });
            released
        };
        for (sender, bytes) in released {
            if let Some(queue) = state.queues.get_mut(&to.0) {
                queue.push_back((PlayerId(sender), bytes));
            }
        }
    }

    /// Messages currently parked on blocked links.
    pub fn held_count(&self) -> usize {
        self.state.lock().unwrap().held.len()
    }
}

/// One peer's endpoint into a [`MemoryHub`].
pub struct MemoryTransport {
    id: PlayerId,
    state: Arc<Mutex<HubState>>,
}

impl Transport for MemoryTransport {
    fn send(
        &mut self,
        peer: PlayerId,
        bytes: &[u8],
        _reliability: Reliability,
    ) -> Result<(), NetError> {
        let mut state = self.state.lock().unwrap();
        state.deliver(self.id, peer, bytes);
        Ok(())
    }

    fn broadcast(&mut self, bytes: &[u8], _reliability: Reliability) -> Result<(), NetError> {
        let mut state = self.state.lock().unwrap();
        let destinations: Vec<i32> = state
            .queues
            .keys()
            .copied()
            .filter(|&id| id != self.id.0)
            .collect();
        for to in destinations {
            state.deliver(self.id, PlayerId(to), bytes);
        }
        Ok(())
    }

    fn poll(&mut self, dispatch: &mut dyn FnMut(PlayerId, &[u8])) {
        loop {
            let next = {
                let mut state = self.state.lock().unwrap();
                state
                    .queues
                    .get_mut(&self.id.0)
                    .and_then(|queue| queue.pop_front())
            };
            match next {
                Some((sender, bytes)) => dispatch(sender, &bytes),
                None => break,
            }
        }
    }
}

// ── Command builders ────────────────────────────────────────────

/// A `Move` command toward integer coordinates.
pub fn move_command(player: i32, tick: i32, x: i32, y: i32, z: i32) -> Command {
    Command {
        player_id: PlayerId(player),
        tick: Tick(tick),
        payload: CommandPayload::Move {
            target: FpVec3::from_ints(x, y, z),
        },
    }
}

/// An `Action` command with only an action id.
pub fn action_command(player: i32, tick: i32, action_id: i32) -> Command {
    Command {
        player_id: PlayerId(player),
        tick: Tick(tick),
        payload: CommandPayload::Action {
            action_id,
            target_entity: cadence_core::EntityId(0),
            point: FpVec3::ZERO,
        },
    }
}

/// An `Empty` command.
pub fn empty_command(player: i32, tick: i32) -> Command {
    Command::empty(PlayerId(player), Tick(tick))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_reaches_every_other_peer() {
        let hub = MemoryHub::new();
        let mut a = hub.endpoint(PlayerId(0));
        let mut b = hub.endpoint(PlayerId(1));
        let mut c = hub.endpoint(PlayerId(2));

        a.broadcast(b"hello", Reliability::ReliableOrdered).unwrap();

        let mut seen_b = Vec::new();
        b.poll(&mut |sender, bytes| seen_b.push((sender, bytes.to_vec())));
        assert_eq!(seen_b, vec![(PlayerId(0), b"hello".to_vec())]);

        let mut seen_c = 0;
        c.poll(&mut |_, _| seen_c += 1);
        assert_eq!(seen_c, 1);

        // The sender hears nothing back.
        let mut seen_a = 0;
        a.poll(&mut |_, _| seen_a += 1);
        assert_eq!(seen_a, 0);
    }

    #[test]
    fn per_link_order_is_preserved() {
        let hub = MemoryHub::new();
        let mut a = hub.endpoint(PlayerId(0));
        let mut b = hub.endpoint(PlayerId(1));

        for i in 0..5u8 {
            a.send(PlayerId(1), &[i], Reliability::ReliableOrdered)
                .unwrap();
        }
        let mut seen = Vec::new();
        b.poll(&mut |_, bytes| seen.push(bytes[0]));
        assert_eq!(seen, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn blocked_links_hold_and_flush_in_order() {
        let hub = MemoryHub::new();
        let mut a = hub.endpoint(PlayerId(0));
        let mut b = hub.endpoint(PlayerId(1));

        hub.set_link_blocked(PlayerId(0), PlayerId(1), true);
        a.send(PlayerId(1), &[1], Reliability::ReliableOrdered)
            .unwrap();
        a.send(PlayerId(1), &[2], Reliability::ReliableOrdered)
            .unwrap();
        assert_eq!(hub.held_count(), 2);

        let mut seen = Vec::new();
        b.poll(&mut |_, bytes| seen.push(bytes[0]));
        assert!(seen.is_empty(), "blocked link must not deliver");

        hub.set_link_blocked(PlayerId(0), PlayerId(1), false);
        b.poll(&mut |_, bytes| seen.push(bytes[0]));
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(hub.held_count(), 0);
    }

    #[test]
    fn blocking_one_direction_leaves_the_other_open() {
        let hub = MemoryHub::new();
        let mut a = hub.endpoint(PlayerId(0));
        let mut b = hub.endpoint(PlayerId(1));

        hub.set_link_blocked(PlayerId(0), PlayerId(1), true);
        b.send(PlayerId(0), &[9], Reliability::ReliableOrdered)
            .unwrap();

        let mut seen = Vec::new();
        a.poll(&mut |_, bytes| seen.push(bytes[0]));
        assert_eq!(seen, vec![9]);
    }
}

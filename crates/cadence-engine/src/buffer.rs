//! The `(tick, player) → command` input store.
//!
//! [`InputBuffer`] holds every command the engine knows about, keyed by
//! execution tick and issuing player. The engine gates tick execution on
//! [`has_all`](InputBuffer::has_all), collects per-tick command lists in
//! ascending player order (a determinism requirement), and periodically
//! trims ticks that have left the rollback window.
//!
//! Bounds (`oldest_tick` / `newest_tick`) are tracked incrementally on
//! insert and recomputed by scan after bulk clears.

use indexmap::IndexMap;
use smallvec::SmallVec;

use cadence_core::{Command, PlayerId, Tick};

/// Per-tick command lists stay inline up to this many players.
pub type CommandList = SmallVec<[Command; 8]>;

/// Tick- and player-keyed command storage with retention bounds.
#[derive(Debug, Default)]
pub struct InputBuffer {
    ticks: IndexMap<i32, IndexMap<i32, Command>>,
    oldest_tick: Option<Tick>,
    newest_tick: Option<Tick>,
}

impl InputBuffer {
    /// An empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `cmd` at `(cmd.tick, cmd.player_id)`.
    ///
    /// Re-inserting into an occupied slot overwrites: the latest arrival
    /// is authoritative when a peer resends.
    pub fn add(&mut self, cmd: Command) {
        let tick = cmd.tick;
        self.ticks
            .entry(tick.0)
            .or_default()
            .insert(cmd.player_id.0, cmd);

        match self.oldest_tick {
            Some(oldest) if oldest <= tick => {}
            _ => self.oldest_tick = Some(tick),
        }
        match self.newest_tick {
            Some(newest) if newest >= tick => {}
            _ => self.newest_tick = Some(tick),
        }
    }

    /// The command at `(tick, player)`, if present.
    pub fn get(&self, tick: Tick, player: PlayerId) -> Option<&Command> {
        self.ticks.get(&tick.0)?.get(&player.0)
    }

    /// Whether `(tick, player)` is filled.
    pub fn has_slot(&self, tick: Tick, player: PlayerId) -> bool {
        self.get(tick, player).is_some()
    }

    /// Whether exactly the players `0..player_count` all have a command
    /// at `tick`.
    pub fn has_all(&self, tick: Tick, player_count: u32) -> bool {
        match self.ticks.get(&tick.0) {
            Some(slots) => {
                slots.len() == player_count as usize
                    && (0..player_count as i32).all(|p| slots.contains_key(&p))
            }
            None => false,
        }
    }

    /// Iterate the commands stored at `tick`, in arbitrary order.
    pub fn iter_tick(&self, tick: Tick) -> impl Iterator<Item = &Command> {
        self.ticks.get(&tick.0).into_iter().flat_map(|m| m.values())
    }

    /// Collect the commands at `tick` into `out`, sorted ascending by
    /// player id. `out` is cleared first; its capacity is reused, so the
    /// steady-state path does not allocate.
    pub fn collect_tick(&self, tick: Tick, out: &mut CommandList) {
        out.clear();
        if let Some(slots) = self.ticks.get(&tick.0) {
            out.extend(slots.values().cloned());
            out.sort_by_key(|c| c.player_id);
        }
    }

    /// The commands at `tick` as a fresh list, sorted by player id.
    pub fn as_list(&self, tick: Tick) -> CommandList {
        let mut out = CommandList::new();
        self.collect_tick(tick, &mut out);
        out
    }

    /// Number of commands stored at `tick`.
    pub fn count_at(&self, tick: Tick) -> usize {
        self.ticks.get(&tick.0).map_or(0, |m| m.len())
    }

    /// Number of ticks with at least one command.
    pub fn tick_count(&self) -> usize {
        self.ticks.len()
    }

    /// Total number of stored commands.
    pub fn len(&self) -> usize {
        self.ticks.values().map(|m| m.len()).sum()
    }

    /// Whether the buffer holds no commands.
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// The smallest tick with a stored command.
    pub fn oldest_tick(&self) -> Option<Tick> {
        self.oldest_tick
    }

    /// The largest tick with a stored command.
    pub fn newest_tick(&self) -> Option<Tick> {
        self.newest_tick
    }

    /// Drop every tick strictly before `tick` (retention sweep).
    pub fn clear_before(&mut self, tick: Tick) {
        self.ticks.retain(|&t, _| t >= tick.0);
        self.recompute_bounds();
    }

    /// Drop every tick strictly after `tick`.
    pub fn clear_after(&mut self, tick: Tick) {
        self.ticks.retain(|&t, _| t <= tick.0);
        self.recompute_bounds();
    }

    /// Drop everything.
    pub fn clear(&mut self) {
        self.ticks.clear();
        self.oldest_tick = None;
        self.newest_tick = None;
    }

    fn recompute_bounds(&mut self) {
        self.oldest_tick = self.ticks.keys().min().copied().map(Tick);
        self.newest_tick = self.ticks.keys().max().copied().map(Tick);
    }
}

//! Tick-keyed snapshot storage for rollback.
//!
//! [`SnapshotRing`] is a bounded, insertion-ordered map from tick to
//! [`Snapshot`]. When the ring exceeds its capacity the oldest insertion
//! is evicted, which in steady state is also the oldest tick. Rollback
//! asks for the nearest snapshot at or before a target tick and clears
//! everything after it before resimulating.

use indexmap::IndexMap;

use cadence_core::Tick;

/// A deterministic serialization of the world at a known tick.
///
/// `bytes` encode `(tick, nextEntityId, entityCount, entities…)` in the
/// layout produced by
/// [`WorldState::encode_snapshot`](crate::world::WorldState::encode_snapshot).
/// The PRNG word pair rides alongside the world bytes so a rollback
/// restores the randomness stream along with the entities.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    /// The tick the world was at when captured.
    pub tick: Tick,
    /// The serialized world.
    pub bytes: Vec<u8>,
    /// The simulation PRNG state at capture time.
    pub rng_state: (u64, u64),
}

/// Bounded tick → snapshot history.
#[derive(Debug)]
pub struct SnapshotRing {
    slots: IndexMap<i32, Snapshot>,
    max_snapshots: usize,
}

impl SnapshotRing {
    /// Create a ring holding at most `max_snapshots` entries.
    ///
    /// # Panics
    ///
    /// Panics if `max_snapshots` is zero; a rollback window needs at
    /// least one snapshot.
    pub fn new(max_snapshots: usize) -> Self {
        assert!(max_snapshots > 0, "SnapshotRing capacity must be at least 1");
        SnapshotRing {
            slots: IndexMap::with_capacity(max_snapshots + 1),
            max_snapshots,
        }
    }

    /// Store a snapshot, evicting the oldest insertion past capacity.
    ///
    /// Saving at an existing tick replaces that entry in place.
    pub fn save(&mut self, snapshot: Snapshot) {
        self.slots.insert(snapshot.tick.0, snapshot);
        while self.slots.len() > self.max_snapshots {
            self.slots.shift_remove_index(0);
        }
    }

    /// The snapshot at exactly `tick`, if retained.
    pub fn get(&self, tick: Tick) -> Option<&Snapshot> {
        self.slots.get(&tick.0)
    }

    /// The newest snapshot with `snapshot.tick <= tick`.
    pub fn nearest_at_or_before(&self, tick: Tick) -> Option<&Snapshot> {
        self.slots
            .values()
            .filter(|s| s.tick <= tick)
            .max_by_key(|s| s.tick)
    }

    /// Drop every snapshot with `snapshot.tick > tick`.
    ///
    /// Called after a rollback so resimulation regenerates the history
    /// it is about to overwrite.
    pub fn clear_after(&mut self, tick: Tick) {
        self.slots.retain(|&t, _| t <= tick.0);
    }

    /// Drop everything.
    pub fn clear_all(&mut self) {
        self.slots.clear();
    }

    /// Number of retained snapshots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the ring is empty.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// The configured capacity.
    pub fn capacity(&self) -> usize {
        self.max_snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snap(tick: i32) -> Snapshot {
        Snapshot {
            tick: Tick(tick),
            bytes: vec![tick as u8],
            rng_state: (tick as u64, 0),
        }
    }

    #[test]
    fn new_ring_is_empty() {
        let ring = SnapshotRing::new(4);
        assert!(ring.is_empty());
        assert_eq!(ring.capacity(), 4);
        assert!(ring.get(Tick(0)).is_none());
    }

    #[test]
    #[should_panic(expected = "at least 1")]
    fn zero_capacity_panics() {
        SnapshotRing::new(0);
    }

    #[test]
    fn save_and_get_exact() {
        let mut ring = SnapshotRing::new(4);
        ring.save(snap(5));
        assert_eq!(ring.get(Tick(5)).unwrap().tick, Tick(5));
        assert!(ring.get(Tick(4)).is_none());
    }

    #[test]
    fn eviction_removes_oldest_insertion() {
        let mut ring = SnapshotRing::new(3);
        for t in [0, 5, 10, 15] {
            ring.save(snap(t));
        }
        assert_eq!(ring.len(), 3);
        assert!(ring.get(Tick(0)).is_none());
        assert!(ring.get(Tick(5)).is_some());
        assert!(ring.get(Tick(15)).is_some());
    }

    #[test]
    fn save_same_tick_replaces() {
        let mut ring = SnapshotRing::new(3);
        ring.save(snap(5));
        ring.save(Snapshot {
            tick: Tick(5),
            bytes: vec![99],
            rng_state: (1, 2),
        });
        assert_eq!(ring.len(), 1);
        assert_eq!(ring.get(Tick(5)).unwrap().bytes, vec![99]);
    }

    #[test]
    fn nearest_at_or_before_picks_newest_candidate() {
        let mut ring = SnapshotRing::new(8);
        for t in [0, 5, 10, 15] {
            ring.save(snap(t));
        }
        assert_eq!(ring.nearest_at_or_before(Tick(12)).unwrap().tick, Tick(10));
        assert_eq!(ring.nearest_at_or_before(Tick(15)).unwrap().tick, Tick(15));
        assert_eq!(ring.nearest_at_or_before(Tick(4)).unwrap().tick, Tick(0));
        assert!(ring.nearest_at_or_before(Tick(-1)).is_none());
    }

    #[test]
    fn clear_after_trims_future() {
        let mut ring = SnapshotRing::new(8);
        for t in [0, 5, 10, 15] {
            ring.save(snap(t));
        }
        ring.clear_after(Tick(7));
        assert_eq!(ring.len(), 2);
        assert!(ring.get(Tick(10)).is_none());
        assert!(ring.get(Tick(15)).is_none());
        assert!(ring.get(Tick(5)).is_some());
    }

    #[test]
    fn clear_all_empties() {
        let mut ring = SnapshotRing::new(4);
        ring.save(snap(1));
        ring.clear_all();
        assert!(ring.is_empty());
    }

    #[test]
    fn resave_after_clear_after_stays_bounded() {
        let mut ring = SnapshotRing::new(4);
        for t in [0, 5, 10, 15] {
            ring.save(snap(t));
        }
        ring.clear_after(Tick(5));
        // Resimulation saves the same ticks again.
        for t in [10, 15, 20, 25] {
            ring.save(snap(t));
        }
        assert_eq!(ring.len(), 4);
        assert_eq!(ring.nearest_at_or_before(Tick(100)).unwrap().tick, Tick(25));
    }
}

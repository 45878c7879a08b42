//! Classic linear probing with tombstone-free deletion.
//!
//! The simplest of the four disciplines: probe forward from the preferred
//! bucket until the hash or an empty cell turns up. Deletion uses the
//! forward-shift algorithm from Goodrich & Tamassia §6.3.3 instead of
//! tombstones, so a table never accumulates graves and lookup cost depends
//! only on the live load. The trade-off is that an unsuccessful lookup must
//! walk to the end of its cluster, since without tombstones the maximum
//! insertion probe length cannot bound it.
//!
//! After any operation, every stored hash is reachable from its preferred
//! bucket through a gap-free run of occupied cells.

use crate::hash32::DefaultHasher32;
use crate::hash32::Hasher32;
use crate::table::Keys;
use crate::table::Probe;
use crate::table::RawTable;
use crate::table::TableFullError;
use crate::IntSet;

/// A linear probing set of non-zero 32-bit keys.
///
/// # Examples
///
/// ```rust
/// use perm_set::LpSet;
///
/// let mut set = LpSet::new(8, 0.75);
/// assert_eq!(set.capacity(), 10);
/// assert!(set.add(7).unwrap());
/// assert!(set.contains(7));
/// assert!(set.remove(7));
/// assert!(set.is_empty());
/// ```
pub struct LpSet<H = DefaultHasher32> {
    table: RawTable,
    hasher: H,
}

impl LpSet {
    /// Creates a set that can hold `max_entries` keys at the given load
    /// factor, using the default hasher.
    ///
    /// The backing array gets `max_entries / load_factor` cells (truncated)
    /// and never grows.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is zero or `load_factor` is outside
    /// `(0, 1]`.
    pub fn new(max_entries: usize, load_factor: f64) -> Self {
        Self::with_hasher(max_entries, load_factor, DefaultHasher32::default())
    }
}

impl<H: Hasher32> LpSet<H> {
    /// Creates a set with an explicit hasher.
    ///
    /// The hasher must be a permutation that never maps a non-zero key to
    /// zero; every mixer in [`crate::hash32`] except the Speck cipher
    /// qualifies.
    pub fn with_hasher(max_entries: usize, load_factor: f64, hasher: H) -> Self {
        Self {
            table: RawTable::new(max_entries, load_factor),
            hasher,
        }
    }

    /// Returns the number of cells in the backing array.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Returns the number of keys currently stored.
    pub fn len(&self) -> usize {
        self.table.len
    }

    /// Returns `true` if the set contains no keys.
    pub fn is_empty(&self) -> bool {
        self.table.len == 0
    }

    /// Returns `true` if `key` is present.
    ///
    /// # Panics
    ///
    /// Panics if `key` is zero.
    pub fn contains(&self, key: u32) -> bool {
        assert!(key != 0, "key 0 is reserved as the empty sentinel");
        matches!(self.table.probe(self.hasher.hash(key)), Probe::Hit(_))
    }

    /// Inserts `key`, returning `Ok(false)` if it was already present.
    ///
    /// The probe that establishes absence ends at the first empty cell of
    /// the key's chain, which is exactly where the hash is written.
    ///
    /// # Errors
    ///
    /// Returns [`TableFullError`] if a full revolution finds no empty cell;
    /// the table is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `key` is zero.
    pub fn add(&mut self, key: u32) -> Result<bool, TableFullError> {
        assert!(key != 0, "key 0 is reserved as the empty sentinel");
        let hash = self.hasher.hash(key);
        match self.table.probe(hash) {
            Probe::Hit(_) => Ok(false),
            Probe::Open(bucket) => {
                self.table.slots[bucket] = hash;
                self.table.len += 1;
                Ok(true)
            }
            Probe::Exhausted => Err(TableFullError),
        }
    }

    /// Removes `key`, returning `false` if it was absent.
    ///
    /// # Panics
    ///
    /// Panics if `key` is zero.
    pub fn remove(&mut self, key: u32) -> bool {
        assert!(key != 0, "key 0 is reserved as the empty sentinel");
        let hash = self.hasher.hash(key);
        match self.table.probe(hash) {
            Probe::Hit(bucket) => {
                self.table.slots[bucket] = 0;
                self.table.shift_chain(bucket);
                self.table.len -= 1;
                true
            }
            _ => false,
        }
    }

    /// Removes every key, keeping the allocation.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Returns an iterator that recovers the stored keys by inverting
    /// their hashes. The order is unspecified.
    pub fn iter(&self) -> Keys<'_, H> {
        Keys::new(&self.table.slots, &self.hasher)
    }

    /// The backing array of hash cells; `0` means empty.
    ///
    /// Serialized as little-endian words this is a complete representation
    /// of the set for the hasher it was built with.
    pub fn slots(&self) -> &[u32] {
        &self.table.slots
    }

    /// Histogram of forward probe distances for the stored keys.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::ProbeHistogram {
        self.table
            .probe_histogram(|hash, bucket| self.table.probe_distance(hash, bucket))
    }

    /// Occupancy and clustering statistics.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::DebugStats {
        self.table.debug_stats()
    }
}

impl<H: Hasher32> IntSet for LpSet<H> {
    fn capacity(&self) -> usize {
        LpSet::capacity(self)
    }

    fn len(&self) -> usize {
        LpSet::len(self)
    }

    fn contains(&self, key: u32) -> bool {
        LpSet::contains(self, key)
    }

    fn add(&mut self, key: u32) -> Result<bool, TableFullError> {
        LpSet::add(self, key)
    }

    fn remove(&mut self, key: u32) -> bool {
        LpSet::remove(self, key)
    }

    fn clear(&mut self) {
        LpSet::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;

    use super::*;

    /// Every stored hash must be reachable from its preferred bucket
    /// without crossing an empty cell.
    fn check_invariant(set: &LpSet) {
        let slots = set.slots();
        let m = slots.len();
        for (bucket, &cell) in slots.iter().enumerate() {
            if cell == 0 {
                continue;
            }
            let mut i = ((u64::from(cell) * m as u64) >> 32) as usize;
            while i != bucket {
                assert_ne!(slots[i], 0, "gap before bucket {bucket}");
                i = (i + 1) % m;
            }
        }
    }

    #[test]
    fn fill_and_drain() {
        let mut set = LpSet::new(8, 0.75);
        assert_eq!(set.capacity(), 10);
        for key in 1..=6 {
            assert!(set.add(key).unwrap());
        }
        assert_eq!(set.len(), 6);
        for key in 1..=6 {
            assert!(set.contains(key), "{key}");
        }
        for key in 1..=6 {
            assert!(set.remove(key), "{key}");
        }
        assert_eq!(set.len(), 0);
        for key in 1..=6 {
            assert!(!set.contains(key), "{key}");
        }
    }

    #[test]
    fn add_is_idempotent() {
        let mut set = LpSet::new(8, 0.75);
        assert!(set.add(42).unwrap());
        assert!(!set.add(42).unwrap());
        assert_eq!(set.len(), 1);
        let snapshot: Vec<u32> = set.slots().to_vec();
        assert!(!set.add(42).unwrap());
        assert_eq!(set.slots(), &snapshot[..]);
    }

    #[test]
    fn remove_is_idempotent() {
        let mut set = LpSet::new(8, 0.75);
        set.add(42).unwrap();
        assert!(set.remove(42));
        assert!(!set.remove(42));
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn clear_is_idempotent() {
        let mut set = LpSet::new(8, 0.75);
        for key in 1..=5 {
            set.add(key).unwrap();
        }
        set.clear();
        set.clear();
        assert_eq!(set.len(), 0);
        for key in 1..=5 {
            assert!(!set.contains(key));
        }
        assert!(set.slots().iter().all(|&cell| cell == 0));
    }

    #[test]
    fn full_table_reports_error() {
        let mut set = LpSet::new(4, 1.0);
        for key in 1..=4 {
            assert!(set.add(key).unwrap());
        }
        assert_eq!(set.add(5), Err(TableFullError));
        assert_eq!(set.len(), 4);
        for key in 1..=4 {
            assert!(set.contains(key));
        }
        // Duplicates are still reported on a full table.
        assert_eq!(set.add(3), Ok(false));
    }

    #[test]
    #[should_panic(expected = "empty sentinel")]
    fn zero_key_panics() {
        let mut set = LpSet::new(8, 0.75);
        let _ = set.add(0);
    }

    #[test]
    fn iter_recovers_keys() {
        let mut set = LpSet::new(16, 0.75);
        for key in [3u32, 9, 27, 81] {
            set.add(key).unwrap();
        }
        let mut keys: Vec<u32> = set.iter().collect();
        keys.sort_unstable();
        assert_eq!(keys, [3, 9, 27, 81]);
    }

    #[test]
    fn random_ops_match_reference() {
        let mut rng = StdRng::seed_from_u64(0x1f2e_3d4c);
        let mut set = LpSet::new(1000, 0.5);
        let mut model: HashSet<u32> = HashSet::new();
        for step in 0..100_000 {
            let key = rng.random_range(1..=1000u32);
            if rng.random_bool(0.55) {
                assert_eq!(set.add(key).unwrap(), model.insert(key), "step {step}");
            } else {
                assert_eq!(set.remove(key), model.remove(&key), "step {step}");
            }
            assert_eq!(set.len(), model.len(), "step {step}");
            if step % 1024 == 0 {
                check_invariant(&set);
            }
        }
        check_invariant(&set);
        for key in 1..=1000u32 {
            assert_eq!(set.contains(key), model.contains(&key));
        }
    }
}

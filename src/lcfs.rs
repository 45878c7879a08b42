//! Last-come-first-served linear probing.
//!
//! The LCFS heuristic (Poblete & Munro, 1989) turns the usual insertion
//! rule on its head: the newcomer always gets its preferred bucket, and
//! whatever chain currently starts there slides one cell forward to make
//! room. Like Robin Hood, this sharply reduces the variance of successful
//! lookup cost (the expected value is unchanged); unsuccessful lookups are
//! unaffected and still walk to the end of the cluster.
//!
//! Lookup and deletion are exactly the linear probing ones; the discipline
//! only changes where inserts land.

use crate::hash32::DefaultHasher32;
use crate::hash32::Hasher32;
use crate::table::Keys;
use crate::table::Probe;
use crate::table::RawTable;
use crate::table::TableFullError;
use crate::IntSet;

/// A last-come-first-served probing set of non-zero 32-bit keys.
///
/// # Examples
///
/// ```rust
/// use perm_set::LcfsSet;
///
/// let mut set = LcfsSet::new(100, 0.75);
/// for key in 1..=100 {
///     set.add(key).unwrap();
/// }
/// for key in (2..=100).step_by(2) {
///     set.remove(key);
/// }
/// assert_eq!(set.len(), 50);
/// assert!(set.contains(51) && !set.contains(50));
/// ```
pub struct LcfsSet<H = DefaultHasher32> {
    table: RawTable,
    hasher: H,
}

impl LcfsSet {
    /// Creates a set that can hold `max_entries` keys at the given load
    /// factor, using the default hasher.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is zero or `load_factor` is outside
    /// `(0, 1]`.
    pub fn new(max_entries: usize, load_factor: f64) -> Self {
        Self::with_hasher(max_entries, load_factor, DefaultHasher32::default())
    }
}

impl<H: Hasher32> LcfsSet<H> {
    /// Creates a set with an explicit hasher.
    ///
    /// The hasher must be a permutation that never maps a non-zero key to
    /// zero.
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
    /// The new hash is written into its preferred bucket; the chain that
    /// occupied `[preferred, first_empty)` slides one cell forward.
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
            Probe::Exhausted => Err(TableFullError),
            // The probe's empty cell is the end of the chain starting at
            // the preferred bucket: walk the hole back to the front.
            Probe::Open(empty) => {
                let preferred = self.table.preferred_bucket(hash);
                let mut bucket = empty;
                while bucket != preferred {
                    let prev = self.table.prev(bucket);
                    self.table.slots[bucket] = self.table.slots[prev];
                    bucket = prev;
                }
                self.table.slots[preferred] = hash;
                self.table.len += 1;
                Ok(true)
            }
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

impl<H: Hasher32> IntSet for LcfsSet<H> {
    fn capacity(&self) -> usize {
        LcfsSet::capacity(self)
    }

    fn len(&self) -> usize {
        LcfsSet::len(self)
    }

    fn contains(&self, key: u32) -> bool {
        LcfsSet::contains(self, key)
    }

    fn add(&mut self, key: u32) -> Result<bool, TableFullError> {
        LcfsSet::add(self, key)
    }

    fn remove(&mut self, key: u32) -> bool {
        LcfsSet::remove(self, key)
    }

    fn clear(&mut self) {
        LcfsSet::clear(self)
    }
}

//! Robin Hood linear probing.
//!
//! The Robin Hood heuristic (Celis, Larson & Munro, FOCS 1985) compares,
//! at every occupied bucket an insert passes, the resident's probe distance
//! with the inserting element's. Whenever the resident is closer to home,
//! the newcomer takes its cell and the resident carries on probing. The
//! effect is a dramatic reduction in the variance of successful lookup
//! cost, and it buys an early-termination rule for unsuccessful lookups:
//! once we have probed further than the current resident's own distance,
//! the key cannot be in the table, because it would have displaced that resident
//! on insert.
//!
//! Deletion is the Robin Hood backward shift: the cells after the removed
//! one slide left until the first cell that is empty or already sits in
//! its preferred bucket. No tombstones.
//!
//! ## Invariant
//!
//! Within a cluster, preferred buckets are non-decreasing; equivalently,
//! for consecutive occupied buckets the probe distance grows by at most
//! one cell to the next.

use crate::hash32::DefaultHasher32;
use crate::hash32::Hasher32;
use crate::table::Keys;
use crate::table::RawTable;
use crate::table::TableFullError;
use crate::IntSet;

/// A Robin Hood probing set of non-zero 32-bit keys.
///
/// # Examples
///
/// ```rust
/// use perm_set::RhSet;
///
/// let mut set = RhSet::new(1000, 0.9);
/// for key in 1..=900 {
///     set.add(key).unwrap();
/// }
/// assert_eq!(set.len(), 900);
/// assert!(set.contains(137));
/// ```
pub struct RhSet<H = DefaultHasher32> {
    table: RawTable,
    hasher: H,
}

impl RhSet {
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

impl<H: Hasher32> RhSet<H> {
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

    /// Lookup with the Robin Hood early-termination rule.
    fn lookup(&self, hash: u32) -> Option<usize> {
        let mut bucket = self.table.preferred_bucket(hash);
        let mut probe_len = 0;
        while self.table.slots[bucket] != 0 {
            if self.table.slots[bucket] == hash {
                return Some(bucket);
            }
            // Probing past the resident's own distance proves absence: on
            // insert we would have displaced it.
            if probe_len == self.table.capacity()
                || probe_len > self.table.probe_distance(self.table.slots[bucket], bucket)
            {
                break;
            }
            bucket = self.table.next(bucket);
            probe_len += 1;
        }
        None
    }

    /// Returns `true` if `key` is present.
    ///
    /// # Panics
    ///
    /// Panics if `key` is zero.
    pub fn contains(&self, key: u32) -> bool {
        assert!(key != 0, "key 0 is reserved as the empty sentinel");
        self.lookup(self.hasher.hash(key)).is_some()
    }

    /// Inserts `key`, returning `Ok(false)` if it was already present.
    ///
    /// # Errors
    ///
    /// Returns [`TableFullError`] if every cell is occupied; the table is
    /// unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `key` is zero.
    pub fn add(&mut self, key: u32) -> Result<bool, TableFullError> {
        assert!(key != 0, "key 0 is reserved as the empty sentinel");
        let mut hash = self.hasher.hash(key);
        if self.lookup(hash).is_some() {
            return Ok(false);
        }
        // Checked before the first swap so a failed insert cannot strand
        // the carried hash mid-displacement.
        if self.table.len == self.table.capacity() {
            return Err(TableFullError);
        }
        let mut bucket = self.table.preferred_bucket(hash);
        let mut insert_dist = 0;
        let mut total = 0;
        while self.table.slots[bucket] != 0 {
            let resident_dist = self.table.probe_distance(self.table.slots[bucket], bucket);
            if resident_dist < insert_dist {
                // The resident is richer; it yields its cell and carries on
                // probing in our place.
                core::mem::swap(&mut self.table.slots[bucket], &mut hash);
                insert_dist = resident_dist;
            }
            bucket = self.table.next(bucket);
            insert_dist += 1;
            total += 1;
            debug_assert!(total <= self.table.capacity());
        }
        self.table.slots[bucket] = hash;
        self.table.len += 1;
        Ok(true)
    }

    /// Removes `key`, returning `false` if it was absent.
    ///
    /// # Panics
    ///
    /// Panics if `key` is zero.
    pub fn remove(&mut self, key: u32) -> bool {
        assert!(key != 0, "key 0 is reserved as the empty sentinel");
        let hash = self.hasher.hash(key);
        let Some(bucket) = self.lookup(hash) else {
            return false;
        };
        // Shift the chain left by one, up to the first cell that is empty
        // or already home; such a cell must not move.
        let end = self.move_boundary(self.table.next(bucket));
        let mut curr = bucket;
        while end != self.table.next(curr) {
            self.table.slots[curr] = self.table.slots[self.table.next(curr)];
            curr = self.table.next(curr);
        }
        self.table.slots[curr] = 0;
        self.table.len -= 1;
        true
    }

    /// First bucket at or after `start` that is empty or in its preferred
    /// position. Every bucket before it is right of its preferred bucket
    /// and tolerates a one-cell shift left.
    fn move_boundary(&self, start: usize) -> usize {
        let mut bucket = start;
        while self.table.slots[bucket] != 0
            && bucket != self.table.preferred_bucket(self.table.slots[bucket])
        {
            bucket = self.table.next(bucket);
        }
        bucket
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

impl<H: Hasher32> IntSet for RhSet<H> {
    fn capacity(&self) -> usize {
        RhSet::capacity(self)
    }

    fn len(&self) -> usize {
        RhSet::len(self)
    }

    fn contains(&self, key: u32) -> bool {
        RhSet::contains(self, key)
    }

    fn add(&mut self, key: u32) -> Result<bool, TableFullError> {
        RhSet::add(self, key)
    }

    fn remove(&mut self, key: u32) -> bool {
        RhSet::remove(self, key)
    }

    fn clear(&mut self) {
        RhSet::clear(self)
    }
}

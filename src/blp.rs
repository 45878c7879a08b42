//! Bidirectional linear probing (Amble & Knuth, 1974).
//!
//! The table maintains a stronger invariant than the cyclic disciplines:
//! within every maximal run of occupied cells, hashes are sorted in
//! ascending unsigned order, and every cell's run contains its preferred
//! bucket. Sortedness means a lookup can compare instead of only matching:
//! starting at the preferred bucket it walks right while the resident
//! hashes are smaller, left while they are larger, and concludes absence
//! the moment the ordering rules the key out.
//!
//! The insert is the simplified one from Liu, Zhang & Zheng's concurrent
//! BLP formulation: pick a probe direction from how the resident of the
//! preferred bucket compares (a smaller resident means the chain sits too
//! far right, so make room on the left), find the nearest empty cell in
//! that direction, and rotate the intervening segment one cell toward it
//! so the new hash lands in sorted position. If the chosen direction runs
//! into a table edge without an empty cell, the other direction is tried
//! before giving up.
//!
//! The array is *not* treated as a ring: probes stop at the edges, which
//! is what keeps runs sorted without a wrap-around special case.
//!
//! Deletion picks a direction from the deleted cell's position relative to
//! its preferred bucket, then slides the movable part of the chain one
//! cell into the hole. A cell may move left only if it currently sits
//! right of its preferred bucket, and vice versa, so the run-contains-
//! preferred-bucket invariant survives. When the deleted cell sits exactly
//! in its preferred bucket and both neighbors continue its chain, the side
//! whose hash is numerically closer moves in.

use crate::hash32::DefaultHasher32;
use crate::hash32::Hasher32;
use crate::table::Keys;
use crate::table::RawTable;
use crate::table::TableFullError;
use crate::IntSet;

/// Which neighbor chain moves into a deleted cell.
enum MoveDirection {
    Left,
    Right,
    None,
}

/// An Amble–Knuth bidirectional probing set of non-zero 32-bit keys.
///
/// # Examples
///
/// ```rust
/// use perm_set::BlpSet;
///
/// let mut set = BlpSet::new(16, 1.0);
/// for key in [7u32, 42, 99, 1, 2, 3] {
///     set.add(key).unwrap();
/// }
/// // Within every run of occupied cells, hashes are sorted ascending.
/// for pair in set.slots().windows(2) {
///     if pair[0] != 0 && pair[1] != 0 {
///         assert!(pair[0] < pair[1]);
///     }
/// }
/// ```
pub struct BlpSet<H = DefaultHasher32> {
    table: RawTable,
    hasher: H,
}

impl BlpSet {
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

impl<H: Hasher32> BlpSet<H> {
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

    /// Sorted-run lookup: walk toward the hash's ordered position.
    ///
    /// An empty preferred bucket compares as 0, smaller than any hash, so
    /// the right-walk arm also covers it and stops immediately.
    fn lookup(&self, hash: u32) -> Option<usize> {
        let slots = &self.table.slots;
        let last = slots.len() - 1;
        let mut bucket = self.table.preferred_bucket(hash);
        if slots[bucket] < hash {
            while bucket < last && slots[bucket + 1] != 0 && slots[bucket + 1] <= hash {
                bucket += 1;
            }
        } else if slots[bucket] > hash {
            while bucket > 0 && slots[bucket - 1] != 0 && slots[bucket - 1] >= hash {
                bucket -= 1;
            }
        }
        (slots[bucket] == hash).then_some(bucket)
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
    /// Returns [`TableFullError`] if neither direction reaches an empty
    /// cell; the table is unchanged.
    ///
    /// # Panics
    ///
    /// Panics if `key` is zero.
    pub fn add(&mut self, key: u32) -> Result<bool, TableFullError> {
        assert!(key != 0, "key 0 is reserved as the empty sentinel");
        let hash = self.hasher.hash(key);
        if self.lookup(hash).is_some() {
            return Ok(false);
        }
        let mut bucket = self.table.preferred_bucket(hash);
        if self.table.slots[bucket] != 0 {
            let last = self.table.capacity() - 1;
            // A smaller resident means the chain is skewed right of where
            // this hash sorts, so room is made on the left; at the edges
            // only one direction exists.
            let probe_left =
                (bucket > 0 && self.table.slots[bucket] < hash) || bucket == last;
            bucket = self.insertion_bucket(hash, bucket, probe_left)?;
        }
        self.table.slots[bucket] = hash;
        self.table.len += 1;
        Ok(true)
    }

    /// Finds the empty cell for an insert and rotates the segment between
    /// it and the insertion point, trying the opposite direction if the
    /// preferred one hits a table edge first.
    fn insertion_bucket(
        &mut self,
        hash: u32,
        start: usize,
        probe_left: bool,
    ) -> Result<usize, TableFullError> {
        if probe_left {
            if let Some(empty) = self.find_empty_left(start) {
                return Ok(self.shift_empty_right(empty, hash));
            }
            if let Some(empty) = self.find_empty_right(start) {
                return Ok(self.shift_empty_left(empty, hash));
            }
        } else {
            if let Some(empty) = self.find_empty_right(start) {
                return Ok(self.shift_empty_left(empty, hash));
            }
            if let Some(empty) = self.find_empty_left(start) {
                return Ok(self.shift_empty_right(empty, hash));
            }
        }
        Err(TableFullError)
    }

    fn find_empty_left(&self, start: usize) -> Option<usize> {
        let mut bucket = start;
        while bucket > 0 && self.table.slots[bucket] != 0 {
            bucket -= 1;
        }
        (self.table.slots[bucket] == 0).then_some(bucket)
    }

    fn find_empty_right(&self, start: usize) -> Option<usize> {
        let last = self.table.capacity() - 1;
        let mut bucket = start;
        while bucket < last && self.table.slots[bucket] != 0 {
            bucket += 1;
        }
        (self.table.slots[bucket] == 0).then_some(bucket)
    }

    /// Moves the hole at `empty` rightward past every resident smaller
    /// than `hash`, returning the hash's sorted insertion cell.
    fn shift_empty_right(&mut self, empty: usize, hash: u32) -> usize {
        let last = self.table.capacity() - 1;
        let mut bucket = empty;
        while bucket < last && self.table.slots[bucket + 1] != 0 && self.table.slots[bucket + 1] < hash
        {
            self.table.slots[bucket] = self.table.slots[bucket + 1];
            bucket += 1;
        }
        bucket
    }

    /// Mirror image of [`Self::shift_empty_right`].
    fn shift_empty_left(&mut self, empty: usize, hash: u32) -> usize {
        let mut bucket = empty;
        while bucket > 0 && self.table.slots[bucket - 1] != 0 && self.table.slots[bucket - 1] > hash
        {
            self.table.slots[bucket] = self.table.slots[bucket - 1];
            bucket -= 1;
        }
        bucket
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
        let last = self.table.capacity() - 1;
        let direction = if bucket == 0 {
            MoveDirection::Left
        } else if bucket == last {
            MoveDirection::Right
        } else {
            self.move_direction(bucket)
        };
        match direction {
            // Sole member of its chain: the cell can simply be emptied.
            MoveDirection::None => self.table.slots[bucket] = 0,
            MoveDirection::Left => {
                let end = self.move_boundary_right(bucket);
                let mut curr = bucket;
                while curr < end {
                    self.table.slots[curr] = self.table.slots[curr + 1];
                    curr += 1;
                }
                self.table.slots[end] = 0;
            }
            MoveDirection::Right => {
                let end = self.move_boundary_left(bucket);
                let mut curr = bucket;
                while curr > end {
                    self.table.slots[curr] = self.table.slots[curr - 1];
                    curr -= 1;
                }
                self.table.slots[end] = 0;
            }
        }
        self.table.len -= 1;
        true
    }

    /// Chooses which neighbor chain absorbs the hole at `bucket`.
    ///
    /// Only called away from the table edges.
    fn move_direction(&self, bucket: usize) -> MoveDirection {
        let slots = &self.table.slots;
        let preferred = self.table.preferred_bucket(slots[bucket]);
        let left_preferred =
            (slots[bucket - 1] != 0).then(|| self.table.preferred_bucket(slots[bucket - 1]));
        let right_preferred =
            (slots[bucket + 1] != 0).then(|| self.table.preferred_bucket(slots[bucket + 1]));
        if bucket == preferred {
            let left_in_chain = left_preferred == Some(preferred);
            let right_in_chain = right_preferred == Some(preferred);
            match (left_in_chain, right_in_chain) {
                (false, false) => MoveDirection::None,
                (true, false) => MoveDirection::Right,
                (false, true) => MoveDirection::Left,
                // Chain extends both ways: the numerically closer neighbor
                // moves into the hole; ties move the right side.
                (true, true) => {
                    let prev_diff = slots[bucket].abs_diff(slots[bucket - 1]);
                    let next_diff = slots[bucket].abs_diff(slots[bucket + 1]);
                    if prev_diff > next_diff {
                        MoveDirection::Left
                    } else {
                        MoveDirection::Right
                    }
                }
            }
        } else if bucket < preferred {
            MoveDirection::Right
        } else {
            MoveDirection::Left
        }
    }

    /// Last cell of the chain that may shift one cell left into `start`:
    /// the walk extends while the next cell sits right of its preferred
    /// bucket, and ends on an empty cell if the run does.
    fn move_boundary_right(&self, start: usize) -> usize {
        let last = self.table.capacity() - 1;
        let mut bucket = start;
        while bucket < last && self.table.slots[bucket] != 0 {
            let next = self.table.slots[bucket + 1];
            if next != 0 && bucket + 1 <= self.table.preferred_bucket(next) {
                break;
            }
            bucket += 1;
        }
        bucket
    }

    /// Mirror image of [`Self::move_boundary_right`], stopping before an
    /// empty cell instead of on it.
    fn move_boundary_left(&self, start: usize) -> usize {
        let mut bucket = start;
        while bucket > 0 && self.table.slots[bucket] != 0 {
            let prev = self.table.slots[bucket - 1];
            if prev == 0 || bucket - 1 >= self.table.preferred_bucket(prev) {
                break;
            }
            bucket -= 1;
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

    /// Histogram of absolute offsets from the preferred bucket.
    ///
    /// BLP probes both directions, so the distance here is `|bucket -
    /// preferred|` rather than the forward-cyclic measure the other
    /// disciplines report.
    #[cfg(feature = "stats")]
    pub fn probe_histogram(&self) -> crate::ProbeHistogram {
        self.table.probe_histogram(|hash, bucket| {
            self.table.preferred_bucket(hash).abs_diff(bucket)
        })
    }

    /// Occupancy and clustering statistics.
    #[cfg(feature = "stats")]
    pub fn debug_stats(&self) -> crate::DebugStats {
        self.table.debug_stats()
    }
}

impl<H: Hasher32> IntSet for BlpSet<H> {
    fn capacity(&self) -> usize {
        BlpSet::capacity(self)
    }

    fn len(&self) -> usize {
        BlpSet::len(self)
    }

    fn contains(&self, key: u32) -> bool {
        BlpSet::contains(self, key)
    }

    fn add(&mut self, key: u32) -> Result<bool, TableFullError> {
        BlpSet::add(self, key)
    }

    fn remove(&mut self, key: u32) -> bool {
        BlpSet::remove(self, key)
    }

    fn clear(&mut self) {
        BlpSet::clear(self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::Rng;
    use rand::SeedableRng;

    use super::*;

    fn preferred(cell: u32, m: usize) -> usize {
        ((u64::from(cell) * m as u64) >> 32) as usize
    }

    /// Runs are strictly ascending and contain every member's preferred
    /// bucket.
    fn check_invariant(set: &BlpSet) {
        let slots = set.slots();
        let m = slots.len();
        for (bucket, pair) in slots.windows(2).enumerate() {
            if pair[0] != 0 && pair[1] != 0 {
                assert!(pair[0] < pair[1], "run out of order at bucket {bucket}");
            }
        }
        let mut bucket = 0;
        while bucket < m {
            if slots[bucket] == 0 {
                bucket += 1;
                continue;
            }
            let start = bucket;
            while bucket < m && slots[bucket] != 0 {
                bucket += 1;
            }
            let end = bucket - 1;
            for i in start..=end {
                let p = preferred(slots[i], m);
                assert!(
                    (start..=end).contains(&p),
                    "bucket {i} strayed from its run [{start}, {end}]"
                );
            }
        }
    }

    #[test]
    fn runs_stay_sorted() {
        let mut set = BlpSet::new(16, 1.0);
        for key in [7u32, 42, 99, 1, 2, 3] {
            assert!(set.add(key).unwrap());
        }
        assert_eq!(set.len(), 6);
        check_invariant(&set);
        for key in [7u32, 42, 99, 1, 2, 3] {
            assert!(set.contains(key), "{key}");
        }
    }

    #[test]
    fn add_is_idempotent() {
        let mut set = BlpSet::new(8, 0.75);
        assert!(set.add(42).unwrap());
        assert!(!set.add(42).unwrap());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn remove_all_orders() {
        let mut set = BlpSet::new(32, 0.75);
        let keys: Vec<u32> = (1..=24).collect();
        for &key in &keys {
            assert!(set.add(key).unwrap());
        }
        check_invariant(&set);
        // Remove front-to-back, then refill and remove back-to-front.
        for &key in &keys {
            assert!(set.remove(key), "{key}");
            check_invariant(&set);
        }
        assert!(set.is_empty());
        for &key in &keys {
            set.add(key).unwrap();
        }
        for &key in keys.iter().rev() {
            assert!(set.remove(key), "{key}");
            check_invariant(&set);
        }
        assert!(set.is_empty());
    }

    #[test]
    fn full_table_reports_error() {
        let mut set = BlpSet::new(4, 1.0);
        for key in 1..=4 {
            assert!(set.add(key).unwrap());
        }
        let snapshot: Vec<u32> = set.slots().to_vec();
        assert_eq!(set.add(5), Err(TableFullError));
        assert_eq!(set.slots(), &snapshot[..]);
        assert_eq!(set.add(1), Ok(false));
    }

    #[test]
    fn single_cell_table() {
        let mut set = BlpSet::new(1, 1.0);
        assert_eq!(set.capacity(), 1);
        assert!(set.add(5).unwrap());
        assert_eq!(set.add(6), Err(TableFullError));
        assert!(set.remove(5));
        assert!(set.add(6).unwrap());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut set = BlpSet::new(8, 0.75);
        set.add(1).unwrap();
        set.clear();
        set.clear();
        assert!(set.is_empty());
        assert!(!set.contains(1));
    }

    #[test]
    fn random_ops_match_reference() {
        let mut rng = StdRng::seed_from_u64(0xb1d1_5e7);
        let mut set = BlpSet::new(1000, 0.5);
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

    #[test]
    fn dense_random_churn() {
        // High load exercises the direction fallback and edge handling.
        let mut rng = StdRng::seed_from_u64(42);
        let mut set = BlpSet::new(64, 1.0);
        let mut model: HashSet<u32> = HashSet::new();
        for _ in 0..50_000 {
            let key = rng.random_range(1..=96u32);
            if rng.random_bool(0.6) && model.len() < 64 {
                assert_eq!(set.add(key).unwrap(), model.insert(key));
            } else {
                assert_eq!(set.remove(key), model.remove(&key));
            }
        }
        check_invariant(&set);
        for key in 1..=96u32 {
            assert_eq!(set.contains(key), model.contains(&key));
        }
    }
}

//! The slot array shared by all probing disciplines.
//!
//! A table is one contiguous array of `u32` cells. A cell holds the hash of
//! a stored key, and because every supported hash function is a permutation
//! of the 32-bit domain, the hash *is* the stored representation; nothing
//! else needs to be kept per bucket. The value `0` marks an empty cell,
//! which is why the set types reject the key `0` and require a permutation
//! that fixes zero.
//!
//! ## Design
//!
//! The cell count is fixed at construction as `max_entries / load_factor`
//! (truncated) and never changes; a full table is a caller error surfaced
//! as [`TableFullError`], not a trigger for resizing. Hashes map to their
//! preferred bucket with the multiply-high range reduction rather than
//! modulo: for a hash `h` and table of `m` cells the preferred bucket is
//! `(h as u64 * m as u64) >> 32`. This is cheaper than `%` and keeps the
//! bucket computation a single multiply on every probe.
//!
//! The probe walk here is the plain linear one used by the LP and LCFS
//! disciplines. Its result deliberately distinguishes "found the hash" from
//! "found the empty cell where it would go": the insertion point discovered
//! during a failed lookup is exactly where `add` writes, so the conflation
//! is load-bearing rather than an accident. Robin Hood and bidirectional
//! probing bring their own walks and only borrow the arithmetic helpers.
//!
//! Deletion support is the forward-shift algorithm from Goodrich &
//! Tamassia, *Algorithm Design and Applications* §6.3.3: after a cell is
//! emptied, later chain members are moved back over the hole whenever their
//! preferred bucket still reaches their new position, leaving no tombstones
//! behind.

use alloc::boxed::Box;
#[cfg(feature = "stats")]
use alloc::vec::Vec;

use crate::hash32::Hasher32;

/// Error returned by `add` when no empty cell can be found.
///
/// Linear and Robin Hood probing give up after one full revolution;
/// bidirectional probing gives up once both directions hit a table edge
/// without passing an empty cell. The failed `add` leaves the table
/// unchanged, but a table that produces this error was sized too small for
/// its workload and will keep producing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableFullError;

impl core::fmt::Display for TableFullError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("no empty cell reachable in the table")
    }
}

impl core::error::Error for TableFullError {}

/// Result of the linear probe walk.
///
/// `Open` carries the insertion point: the first empty cell at or after the
/// preferred bucket. LP and LCFS treat it both as "absent" and as the
/// target cell for an insert.
pub(crate) enum Probe {
    /// The hash occupies this bucket.
    Hit(usize),
    /// The hash is absent; this is the first empty bucket of its chain.
    Open(usize),
    /// A full revolution found neither the hash nor an empty cell.
    Exhausted,
}

/// Fixed-capacity array of hash cells plus the occupancy count.
pub(crate) struct RawTable {
    pub(crate) slots: Box<[u32]>,
    pub(crate) len: usize,
}

impl RawTable {
    /// Allocates a table of `max_entries / load_factor` zeroed cells.
    ///
    /// # Panics
    ///
    /// Panics if `max_entries` is zero, `load_factor` is outside `(0, 1]`,
    /// or the resulting cell count does not fit the 32-bit bucket space.
    pub(crate) fn new(max_entries: usize, load_factor: f64) -> Self {
        assert!(max_entries > 0, "max_entries must be positive");
        assert!(
            load_factor > 0.0 && load_factor <= 1.0,
            "load_factor must be in (0, 1]"
        );
        let cells = (max_entries as f64 / load_factor) as usize;
        assert!(
            cells <= u32::MAX as usize,
            "{cells} cells exceeds the 32-bit bucket space"
        );
        Self {
            slots: alloc::vec![0u32; cells].into_boxed_slice(),
            len: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Maps a hash to the bucket it would occupy in an empty table.
    ///
    /// Multiply-high range reduction (https://github.com/lemire/fastrange);
    /// not equivalent to `hash % capacity`, but uniform for uniform hashes
    /// and much cheaper. Hash `0` is the empty sentinel and has no bucket.
    #[inline(always)]
    pub(crate) fn preferred_bucket(&self, hash: u32) -> usize {
        debug_assert!(hash != 0, "hash 0 is the empty sentinel");
        ((u64::from(hash) * self.slots.len() as u64) >> 32) as usize
    }

    /// Forward cyclic distance from the hash's preferred bucket to `bucket`.
    #[inline(always)]
    pub(crate) fn probe_distance(&self, hash: u32, bucket: usize) -> usize {
        let preferred = self.preferred_bucket(hash);
        if preferred > bucket {
            self.slots.len() - preferred + bucket
        } else {
            bucket - preferred
        }
    }

    /// Reduces a position in `[0, 2 * capacity)` onto the ring.
    #[inline(always)]
    fn wrap(&self, pos: usize) -> usize {
        debug_assert!(pos < 2 * self.slots.len());
        if pos >= self.slots.len() {
            pos - self.slots.len()
        } else {
            pos
        }
    }

    #[inline(always)]
    pub(crate) fn next(&self, bucket: usize) -> usize {
        self.wrap(bucket + 1)
    }

    #[inline(always)]
    pub(crate) fn prev(&self, bucket: usize) -> usize {
        if bucket == 0 {
            self.slots.len() - 1
        } else {
            bucket - 1
        }
    }

    /// Linear probe walk from the hash's preferred bucket.
    pub(crate) fn probe(&self, hash: u32) -> Probe {
        let mut bucket = self.preferred_bucket(hash);
        let mut probe_len = 0;
        while self.slots[bucket] != 0 && self.slots[bucket] != hash {
            if probe_len == self.slots.len() {
                return Probe::Exhausted;
            }
            bucket = self.next(bucket);
            probe_len += 1;
        }
        if self.slots[bucket] == hash {
            Probe::Hit(bucket)
        } else {
            Probe::Open(bucket)
        }
    }

    /// Closes the hole left at `emptied` by moving later chain members back.
    ///
    /// Walks forward from the hole; a cell may move into it only if its
    /// preferred bucket lies in the cyclic interval `(cell, hole]`, i.e. the
    /// move keeps the cell reachable from its preferred bucket. Moving a
    /// cell relocates the hole, and the scan restarts one past it. Stops at
    /// the first empty cell.
    pub(crate) fn shift_chain(&mut self, emptied: usize) {
        debug_assert!(self.slots[emptied] == 0);
        let mut hole = emptied;
        let mut shift = 1;
        let mut src = self.wrap(hole + shift);
        while self.slots[src] != 0 {
            let preferred = self.preferred_bucket(self.slots[src]);
            // The two arms are the same cyclic-interval test split on
            // whether the scan has wrapped past the hole.
            let reachable = if src <= hole {
                preferred <= hole && preferred > src
            } else {
                preferred <= hole || preferred > src
            };
            if reachable {
                self.slots[hole] = self.slots[src];
                self.slots[src] = 0;
                hole = src;
                shift = 1;
            } else {
                shift += 1;
            }
            src = self.wrap(hole + shift);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.slots.fill(0);
        self.len = 0;
    }
}

/// Iterator over the keys of a set, in table order.
///
/// Keys are not stored anywhere; each one is recovered on the fly by
/// applying the hasher's inverse permutation to the occupied cells. The
/// order is an artifact of the probing discipline and may change after any
/// mutation.
pub struct Keys<'a, H> {
    slots: core::slice::Iter<'a, u32>,
    hasher: &'a H,
}

impl<'a, H> Keys<'a, H> {
    pub(crate) fn new(slots: &'a [u32], hasher: &'a H) -> Self {
        Self {
            slots: slots.iter(),
            hasher,
        }
    }
}

impl<H: Hasher32> Iterator for Keys<'_, H> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        for &cell in self.slots.by_ref() {
            if cell != 0 {
                return Some(self.hasher.unhash(cell));
            }
        }
        None
    }
}

/// Histogram of probe distances for the occupied cells of a table.
#[cfg(feature = "stats")]
#[derive(Debug, Clone)]
pub struct ProbeHistogram {
    /// Number of keys in the table.
    pub populated: usize,
    /// Number of cells in the backing array.
    pub capacity: usize,
    /// `counts[d]` is the number of keys stored `d` buckets from their
    /// preferred bucket.
    pub counts: Vec<usize>,
    /// Largest probe distance of any stored key.
    pub max_distance: usize,
}

#[cfg(feature = "stats")]
impl ProbeHistogram {
    /// Pretty-print the histogram as a bar chart.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        if self.populated == 0 {
            println!("probe histogram: empty");
            return;
        }
        println!(
            "probe distances ({} keys, {} cells):",
            self.populated, self.capacity
        );
        let max = self.counts.iter().copied().max().unwrap_or(0);
        for (distance, &count) in self.counts.iter().enumerate() {
            let bar = render_bar(count, max);
            println!("{distance:>3} | {bar} ({count})");
        }
    }
}

#[cfg(all(feature = "stats", feature = "std"))]
fn render_bar(count: usize, max: usize) -> alloc::string::String {
    use alloc::string::String;

    if count == 0 || max == 0 {
        return String::new();
    }
    let max_bar = 60usize;
    let total_units = max_bar * 8;
    let units = ((count as u128 * total_units as u128).div_ceil(max as u128)) as usize;
    let mut bar = "█".repeat(units / 8);
    let rem = units % 8;
    if rem > 0 {
        bar.push(['▏', '▎', '▍', '▌', '▋', '▊', '▉'][rem - 1]);
    }
    bar
}

/// Occupancy and clustering summary for a table.
#[cfg(feature = "stats")]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of keys in the table.
    pub populated: usize,
    /// Number of cells in the backing array.
    pub capacity: usize,
    /// `populated / capacity`.
    pub load_factor: f64,
    /// Number of maximal runs of occupied cells.
    pub clusters: usize,
    /// Length of the longest run of occupied cells.
    pub max_cluster: usize,
    /// Bytes allocated for the cell array.
    pub table_bytes: usize,
}

#[cfg(feature = "stats")]
impl DebugStats {
    /// Pretty-print the statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== table statistics ===");
        println!(
            "population: {}/{} cells ({:.2}% load)",
            self.populated,
            self.capacity,
            self.load_factor * 100.0
        );
        println!(
            "clusters: {} (longest {})",
            self.clusters, self.max_cluster
        );
        println!("allocated: {} bytes", self.table_bytes);
    }
}

#[cfg(feature = "stats")]
impl RawTable {
    /// Builds a probe-distance histogram using the supplied distance
    /// measure (forward-cyclic for the cyclic disciplines, absolute offset
    /// for the bidirectional one).
    pub(crate) fn probe_histogram(
        &self,
        mut distance: impl FnMut(u32, usize) -> usize,
    ) -> ProbeHistogram {
        let mut counts = Vec::new();
        let mut max_distance = 0;
        for (bucket, &cell) in self.slots.iter().enumerate() {
            if cell == 0 {
                continue;
            }
            let d = distance(cell, bucket);
            if d >= counts.len() {
                counts.resize(d + 1, 0);
            }
            counts[d] += 1;
            max_distance = max_distance.max(d);
        }
        ProbeHistogram {
            populated: self.len,
            capacity: self.capacity(),
            counts,
            max_distance,
        }
    }

    /// Counts maximal runs of occupied cells, treating the array as a ring.
    pub(crate) fn debug_stats(&self) -> DebugStats {
        let m = self.capacity();
        let mut clusters = 0;
        let mut max_cluster = 0;
        let mut run = 0;
        // A run that touches both ends is one cluster on the ring, so scan
        // from the first empty cell if there is one.
        let start = self.slots.iter().position(|&c| c == 0).unwrap_or(0);
        for i in 0..m {
            if self.slots[(start + i) % m] != 0 {
                run += 1;
            } else if run > 0 {
                clusters += 1;
                max_cluster = max_cluster.max(run);
                run = 0;
            }
        }
        if run > 0 {
            clusters += 1;
            max_cluster = max_cluster.max(run);
        }
        DebugStats {
            populated: self.len,
            capacity: m,
            load_factor: if m == 0 {
                0.0
            } else {
                self.len as f64 / m as f64
            },
            clusters,
            max_cluster,
            table_bytes: m * core::mem::size_of::<u32>(),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn capacity_is_truncated_quotient() {
        assert_eq!(RawTable::new(8, 0.75).capacity(), 10);
        assert_eq!(RawTable::new(1000, 0.9).capacity(), 1111);
        assert_eq!(RawTable::new(16, 1.0).capacity(), 16);
    }

    #[test]
    #[should_panic(expected = "max_entries")]
    fn zero_entries_panics() {
        RawTable::new(0, 0.5);
    }

    #[test]
    #[should_panic(expected = "load_factor")]
    fn zero_load_factor_panics() {
        RawTable::new(8, 0.0);
    }

    #[test]
    #[should_panic(expected = "load_factor")]
    fn excess_load_factor_panics() {
        RawTable::new(8, 1.5);
    }

    #[test]
    fn preferred_bucket_is_high_bits_for_pow2_capacity() {
        // For a power-of-two cell count the multiply-high reduction is
        // exactly the top log2(m) bits of the hash.
        let table = RawTable::new(8, 1.0);
        for hash in [1u32, 0x1234_5678, 0x8000_0000, u32::MAX] {
            assert_eq!(table.preferred_bucket(hash), (hash >> 29) as usize);
        }
    }

    #[test]
    fn preferred_bucket_is_not_modulo() {
        // Small sequential hashes all land in bucket 0; a modulo mapping
        // would spread them.
        let table = RawTable::new(1000, 1.0);
        for hash in 1u32..100 {
            assert_eq!(table.preferred_bucket(hash), 0);
        }
    }

    #[test]
    fn probe_distance_wraps() {
        let table = RawTable::new(8, 1.0);
        // Hash with preferred bucket 7 probed at bucket 1 wrapped around.
        let hash = 0xf000_0000u32;
        assert_eq!(table.preferred_bucket(hash), 7);
        assert_eq!(table.probe_distance(hash, 7), 0);
        assert_eq!(table.probe_distance(hash, 1), 2);
    }

    #[test]
    fn ring_step_helpers() {
        let table = RawTable::new(4, 1.0);
        assert_eq!(table.next(3), 0);
        assert_eq!(table.next(0), 1);
        assert_eq!(table.prev(0), 3);
        assert_eq!(table.prev(2), 1);
    }

    proptest! {
        #[test]
        fn preferred_bucket_in_range(hash in 1u32.., entries in 1usize..10_000) {
            let table = RawTable::new(entries, 1.0);
            prop_assert!(table.preferred_bucket(hash) < table.capacity());
        }

        #[test]
        fn preferred_bucket_monotone(a in 1u32.., b in 1u32..) {
            let table = RawTable::new(977, 1.0);
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(table.preferred_bucket(lo) <= table.preferred_bucket(hi));
        }
    }

    /// The six set operations behave identically across disciplines; drive
    /// each with the same op sequences against a reference model.
    mod model {
        use std::collections::HashSet;

        use proptest::prelude::*;
        use proptest::test_runner::TestCaseError;

        use crate::IntSet;

        #[derive(Clone, Debug)]
        enum Op {
            Add(u32),
            Remove(u32),
            Clear,
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                8 => (1u32..=48).prop_map(Op::Add),
                8 => (1u32..=48).prop_map(Op::Remove),
                1 => Just(Op::Clear),
            ]
        }

        fn ops_match_model<S: IntSet>(mut set: S, ops: &[Op]) -> Result<(), TestCaseError> {
            let mut model: HashSet<u32> = HashSet::new();
            for op in ops {
                match *op {
                    // Key universe (48) never exceeds table capacity, so
                    // adds cannot hit TableFullError.
                    Op::Add(key) => {
                        prop_assert_eq!(set.add(key).unwrap(), model.insert(key));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(set.remove(key), model.remove(&key));
                    }
                    Op::Clear => {
                        set.clear();
                        model.clear();
                    }
                }
                prop_assert_eq!(set.len(), model.len());
                prop_assert_eq!(set.is_empty(), model.is_empty());
            }
            for key in 1u32..=48 {
                prop_assert_eq!(set.contains(key), model.contains(&key));
            }
            Ok(())
        }

        proptest! {
            #[test]
            fn lp(ops in proptest::collection::vec(op_strategy(), 0..256)) {
                ops_match_model(crate::LpSet::new(48, 0.75), &ops)?;
            }

            #[test]
            fn rh(ops in proptest::collection::vec(op_strategy(), 0..256)) {
                ops_match_model(crate::RhSet::new(48, 0.75), &ops)?;
            }

            #[test]
            fn lcfs(ops in proptest::collection::vec(op_strategy(), 0..256)) {
                ops_match_model(crate::LcfsSet::new(48, 0.75), &ops)?;
            }

            #[test]
            fn blp(ops in proptest::collection::vec(op_strategy(), 0..256)) {
                ops_match_model(crate::BlpSet::new(48, 0.75), &ops)?;
            }
        }
    }
}

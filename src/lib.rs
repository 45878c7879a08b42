#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// Bidirectional (Amble–Knuth) linear probing over hash-sorted runs.
pub mod blp;

pub mod hash32;

/// Reversible permutations of the 64-bit integer domain.
///
/// This module mirrors [`hash32`] for callers that key other structures by
/// `u64`; the set types in this crate store 32-bit cells and use [`hash32`].
pub mod hash64;

/// Last-come-first-served linear probing.
pub mod lcfs;

pub mod lp;

/// Robin Hood linear probing.
pub mod rh;

mod table;

pub use blp::BlpSet;
pub use hash32::DefaultHasher32;
pub use hash32::Hasher32;
pub use hash64::Hasher64;
pub use lcfs::LcfsSet;
pub use lp::LpSet;
pub use rh::RhSet;
#[cfg(feature = "stats")]
pub use table::DebugStats;
pub use table::Keys;
#[cfg(feature = "stats")]
pub use table::ProbeHistogram;
pub use table::TableFullError;

/// The common contract of the four probing disciplines.
///
/// Every implementation stores non-zero 32-bit keys in a fixed-capacity
/// table; the methods mirror the inherent methods of the set types so that
/// code (and tests) can be generic over the probing discipline.
pub trait IntSet {
    /// Returns the number of cells in the backing array.
    fn capacity(&self) -> usize;

    /// Returns the number of keys currently stored.
    fn len(&self) -> usize;

    /// Returns `true` if the set contains no keys.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` if `key` is present.
    fn contains(&self, key: u32) -> bool;

    /// Inserts `key`, returning `Ok(false)` if it was already present.
    ///
    /// Fails with [`TableFullError`] when no empty cell is reachable; the
    /// table is left exactly as it was before the call.
    fn add(&mut self, key: u32) -> Result<bool, TableFullError>;

    /// Removes `key`, returning `false` if it was absent.
    fn remove(&mut self, key: u32) -> bool;

    /// Removes every key, keeping the allocation.
    fn clear(&mut self);
}

//! Reversible permutations of the 32-bit integer domain.
//!
//! Every hasher here is a bijection: `hash` and `unhash` are exact inverses
//! of each other over all of `u32`. The sets in this crate lean on that
//! property to store nothing but the hash; the key is recovered, when
//! needed at all, by running the permutation backwards.
//!
//! The mixers are built from two invertible primitives: multiplication by
//! an odd constant (inverted by multiplying with its modular inverse mod
//! 2^32) and the xor-shift `x ^= x >> k` (inverted by re-applying the shift
//! at `k`, `2k`, `4k`, … until the shift leaves the word). Inverses run the
//! inverted steps in reverse order. Each mixer fixes zero, which is what
//! lets the sets reserve `0` as their empty sentinel. [`Speck32`] is the
//! exception: a keyed block cipher is a bijection but maps `0` elsewhere,
//! so it satisfies the round-trip contract while being unsuitable as a set
//! hasher.

use alloc::vec::Vec;

use cfg_if::cfg_if;

/// A reversible permutation of `u32`.
///
/// Implementations must satisfy `unhash(hash(x)) == x` and
/// `hash(unhash(x)) == x` for every `x`.
pub trait Hasher32 {
    /// Applies the forward permutation.
    fn hash(&self, x: u32) -> u32;

    /// Applies the inverse permutation.
    fn unhash(&self, x: u32) -> u32;
}

cfg_if! {
    if #[cfg(feature = "three-round-hasher")] {
        /// Permutation used by the set types unless one is supplied
        /// explicitly.
        pub type DefaultHasher32 = Prospector3;
    } else {
        /// Permutation used by the set types unless one is supplied
        /// explicitly.
        pub type DefaultHasher32 = Prospector2;
    }
}

/// The identity permutation.
///
/// Useful as a baseline and for keys that are already well distributed;
/// adversarial or sequential keys will cluster badly.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Hasher32 for Identity {
    #[inline]
    fn hash(&self, x: u32) -> u32 {
        x
    }

    #[inline]
    fn unhash(&self, x: u32) -> u32 {
        x
    }
}

/// Golden-ratio multiplicative hash, as popularized by fastutil's
/// `HashCommon`.
#[derive(Clone, Copy, Debug, Default)]
pub struct Phi;

const INT_PHI: u32 = 0x9e37_79b9;
const INV_INT_PHI: u32 = 0x144c_bc89;

impl Hasher32 for Phi {
    #[inline]
    fn hash(&self, x: u32) -> u32 {
        debug_assert!(x != 0);
        let x = x.wrapping_mul(INT_PHI);
        x ^ (x >> 16)
    }

    #[inline]
    fn unhash(&self, x: u32) -> u32 {
        debug_assert!(x != 0);
        let x = x ^ (x >> 16);
        x.wrapping_mul(INV_INT_PHI)
    }
}

/// The murmur3 32-bit finalizer
/// (https://github.com/aappleby/smhasher/wiki/MurmurHash3).
#[derive(Clone, Copy, Debug, Default)]
pub struct Murmur3;

impl Hasher32 for Murmur3 {
    #[inline]
    fn hash(&self, mut x: u32) -> u32 {
        x ^= x >> 16;
        x = x.wrapping_mul(0x85eb_ca6b);
        x ^= x >> 13;
        x = x.wrapping_mul(0xc2b2_ae35);
        x ^= x >> 16;
        x
    }

    #[inline]
    fn unhash(&self, mut x: u32) -> u32 {
        x ^= x >> 16;
        x = x.wrapping_mul(0x7ed1_b41d);
        x ^= (x >> 13) ^ (x >> 26);
        x = x.wrapping_mul(0xa5cb_9243);
        x ^= x >> 16;
        x
    }
}

/// The integer mixer from the H2 database
/// (https://github.com/h2database/h2database).
#[derive(Clone, Copy, Debug, Default)]
pub struct H2;

impl Hasher32 for H2 {
    #[inline]
    fn hash(&self, mut x: u32) -> u32 {
        debug_assert!(x != 0);
        x ^= x >> 16;
        x = x.wrapping_mul(0x045d_9f3b);
        x ^= x >> 16;
        x = x.wrapping_mul(0x045d_9f3b);
        x ^= x >> 16;
        x
    }

    #[inline]
    fn unhash(&self, mut x: u32) -> u32 {
        debug_assert!(x != 0);
        x ^= x >> 16;
        x = x.wrapping_mul(0x119d_e1f3);
        x ^= x >> 16;
        x = x.wrapping_mul(0x119d_e1f3);
        x ^= x >> 16;
        x
    }
}

/// The hash-prospector two-round function
/// (https://github.com/skeeto/hash-prospector#two-round-functions).
///
/// The default set hasher: measurably better bias than the murmur3
/// finalizer at the same cost.
#[derive(Clone, Copy, Debug, Default)]
pub struct Prospector2;

impl Hasher32 for Prospector2 {
    #[inline]
    fn hash(&self, mut x: u32) -> u32 {
        debug_assert!(x != 0);
        x ^= x >> 16;
        x = x.wrapping_mul(0x7feb_352d);
        x ^= x >> 15;
        x = x.wrapping_mul(0x846c_a68b);
        x ^= x >> 16;
        x
    }

    #[inline]
    fn unhash(&self, mut x: u32) -> u32 {
        debug_assert!(x != 0);
        x ^= x >> 16;
        x = x.wrapping_mul(0x4302_1123);
        x ^= (x >> 15) ^ (x >> 30);
        x = x.wrapping_mul(0x1d69_e2a5);
        x ^= x >> 16;
        x
    }
}

/// The hash-prospector three-round function
/// (https://github.com/skeeto/hash-prospector#three-round-functions).
#[derive(Clone, Copy, Debug, Default)]
pub struct Prospector3;

impl Hasher32 for Prospector3 {
    #[inline]
    fn hash(&self, mut x: u32) -> u32 {
        debug_assert!(x != 0);
        x ^= x >> 17;
        x = x.wrapping_mul(0xed5a_d4bb);
        x ^= x >> 11;
        x = x.wrapping_mul(0xac4c_1b51);
        x ^= x >> 15;
        x = x.wrapping_mul(0x3184_8bab);
        x ^= x >> 14;
        x
    }

    #[inline]
    fn unhash(&self, mut x: u32) -> u32 {
        debug_assert!(x != 0);
        x ^= (x >> 14) ^ (x >> 28);
        x = x.wrapping_mul(0x32b2_1703);
        x ^= (x >> 15) ^ (x >> 30);
        x = x.wrapping_mul(0x469e_0db1);
        x ^= (x >> 11) ^ (x >> 22);
        x = x.wrapping_mul(0x79a8_5073);
        x ^= x >> 17;
        x
    }
}

/// The Speck32/64 block cipher as a keyed permutation.
///
/// `hash` encrypts a 32-bit block and `unhash` decrypts it, so the pair
/// round-trips like every other hasher here. Unlike the mixers above the
/// cipher does not fix zero (`hash(0)` is some key-dependent value), which
/// makes it a valid [`Hasher32`] but *not* a valid hasher for the set
/// types, whose empty sentinel relies on zero staying put.
#[derive(Clone, Debug)]
pub struct Speck32 {
    round_keys: Vec<u16>,
}

impl Speck32 {
    /// Round count used by [`Speck32::new`].
    pub const DEFAULT_ROUNDS: usize = 20;

    /// Builds the cipher with the default round count.
    pub fn new(key: u64) -> Self {
        Self::with_rounds(key, Self::DEFAULT_ROUNDS)
    }

    /// Builds the cipher with an explicit round count.
    ///
    /// The full-strength cipher uses 22 rounds; fewer rounds weaken the
    /// mixing but keep the permutation property.
    ///
    /// # Panics
    ///
    /// Panics if `rounds` is zero.
    pub fn with_rounds(key: u64, rounds: usize) -> Self {
        assert!(rounds > 0, "at least one round is required");
        let mut round_keys = Vec::with_capacity(rounds);
        let mut k = key as u16;
        // Sliding window of the key schedule's l-sequence.
        let mut l = [(key >> 16) as u16, (key >> 32) as u16, (key >> 48) as u16];
        round_keys.push(k);
        for i in 0..rounds - 1 {
            let next_l = k.wrapping_add(l[i % 3].rotate_right(7)) ^ (i as u16);
            l[i % 3] = next_l;
            k = k.rotate_left(2) ^ next_l;
            round_keys.push(k);
        }
        Self { round_keys }
    }
}

impl Hasher32 for Speck32 {
    fn hash(&self, x: u32) -> u32 {
        let mut hi = (x >> 16) as u16;
        let mut lo = x as u16;
        for &k in &self.round_keys {
            hi = hi.rotate_right(7).wrapping_add(lo) ^ k;
            lo = lo.rotate_left(2) ^ hi;
        }
        (u32::from(hi) << 16) | u32::from(lo)
    }

    fn unhash(&self, x: u32) -> u32 {
        let mut hi = (x >> 16) as u16;
        let mut lo = x as u16;
        for &k in self.round_keys.iter().rev() {
            lo = (lo ^ hi).rotate_right(2);
            hi = (hi ^ k).wrapping_sub(lo).rotate_left(7);
        }
        (u32::from(hi) << 16) | u32::from(lo)
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    fn mixers() -> [(&'static str, &'static dyn Hasher32); 6] {
        [
            ("identity", &Identity),
            ("phi", &Phi),
            ("murmur3", &Murmur3),
            ("h2", &H2),
            ("prospector2", &Prospector2),
            ("prospector3", &Prospector3),
        ]
    }

    #[test]
    fn round_trip_edge_values() {
        let edges = [1u32, 2, 3, 0x0000_ffff, 0x5555_5555, 0xaaaa_aaaa, u32::MAX];
        for (name, hasher) in mixers() {
            for x in edges {
                assert_eq!(hasher.unhash(hasher.hash(x)), x, "{name} hash({x})");
                assert_eq!(hasher.hash(hasher.unhash(x)), x, "{name} unhash({x})");
            }
        }
    }

    #[test]
    fn mixers_never_hash_to_zero() {
        // A permutation fixing 0 cannot map anything else there; spot-check
        // a spread of inputs anyway since the sets depend on it.
        for (name, hasher) in mixers() {
            for x in (1u32..=1_000_000).step_by(997) {
                assert_ne!(hasher.hash(x), 0, "{name} hash({x})");
            }
            assert_ne!(hasher.hash(u32::MAX), 0, "{name}");
        }
    }

    #[test]
    fn speck_round_trips() {
        let cipher = Speck32::new(0x0123_4567_89ab_cdef);
        for x in (0u32..=2_000_000).step_by(1009) {
            assert_eq!(cipher.unhash(cipher.hash(x)), x);
            assert_eq!(cipher.hash(cipher.unhash(x)), x);
        }
    }

    #[test]
    fn speck_matches_published_vector() {
        // Speck32/64 test vector from the cipher's specification: key
        // 0x1918_1110_0908_0100, plaintext 0x6574_694c, 22 rounds.
        let cipher = Speck32::with_rounds(0x1918_1110_0908_0100, 22);
        assert_eq!(cipher.hash(0x6574_694c), 0xa868_42f2);
        assert_eq!(cipher.unhash(0xa868_42f2), 0x6574_694c);
    }

    #[test]
    fn distinct_speck_keys_disagree() {
        let a = Speck32::new(1);
        let b = Speck32::new(2);
        assert_ne!(a.hash(0x1234_5678), b.hash(0x1234_5678));
    }

    proptest! {
        #[test]
        fn round_trip(x in 1u32..) {
            for (name, hasher) in mixers() {
                prop_assert_eq!(hasher.unhash(hasher.hash(x)), x, "{}", name);
                prop_assert_eq!(hasher.hash(hasher.unhash(x)), x, "{}", name);
            }
        }

        #[test]
        fn nonzero_preserved(x in 1u32..) {
            for (name, hasher) in mixers() {
                prop_assert_ne!(hasher.hash(x), 0, "{}", name);
            }
        }

        #[test]
        fn speck_round_trip(x in any::<u32>(), key in any::<u64>()) {
            let cipher = Speck32::new(key);
            prop_assert_eq!(cipher.unhash(cipher.hash(x)), x);
        }
    }
}

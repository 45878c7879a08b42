//! Reversible permutations of the 64-bit integer domain.
//!
//! The same construction as [`crate::hash32`] at double the width: odd
//! multiplications are inverted with modular inverses mod 2^64, xor-shifts
//! with the usual self-composition identity. Every `hash`/`unhash` pair
//! round-trips the full `u64` domain.

/// A reversible permutation of `u64`.
///
/// Implementations must satisfy `unhash(hash(x)) == x` and
/// `hash(unhash(x)) == x` for every `x`.
pub trait Hasher64 {
    /// Applies the forward permutation.
    fn hash(&self, x: u64) -> u64;

    /// Applies the inverse permutation.
    fn unhash(&self, x: u64) -> u64;
}

/// The identity permutation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Identity;

impl Hasher64 for Identity {
    #[inline]
    fn hash(&self, x: u64) -> u64 {
        x
    }

    #[inline]
    fn unhash(&self, x: u64) -> u64 {
        x
    }
}

/// The murmur3 64-bit finalizer
/// (https://github.com/aappleby/smhasher/wiki/MurmurHash3).
#[derive(Clone, Copy, Debug, Default)]
pub struct Murmur3;

impl Hasher64 for Murmur3 {
    #[inline]
    fn hash(&self, mut x: u64) -> u64 {
        debug_assert!(x != 0);
        x ^= x >> 33;
        x = x.wrapping_mul(0xff51_afd7_ed55_8ccd);
        x ^= x >> 33;
        x = x.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
        x ^= x >> 33;
        x
    }

    #[inline]
    fn unhash(&self, mut x: u64) -> u64 {
        debug_assert!(x != 0);
        x ^= x >> 33;
        x = x.wrapping_mul(0x9cb4_b2f8_1293_37db);
        x ^= x >> 33;
        x = x.wrapping_mul(0x4f74_430c_22a5_4005);
        x ^= x >> 33;
        x
    }
}

/// Variant 13 of the murmur3 64-bit finalizer
/// (http://zimbry.blogspot.com/2011/09/better-bit-mixing-improving-on.html),
/// the mixer splitmix64 settled on.
#[derive(Clone, Copy, Debug, Default)]
pub struct Variant13;

impl Hasher64 for Variant13 {
    #[inline]
    fn hash(&self, mut x: u64) -> u64 {
        debug_assert!(x != 0);
        x ^= x >> 30;
        x = x.wrapping_mul(0xbf58_476d_1ce4_e5b9);
        x ^= x >> 27;
        x = x.wrapping_mul(0x94d0_49bb_1331_11eb);
        x ^= x >> 31;
        x
    }

    #[inline]
    fn unhash(&self, mut x: u64) -> u64 {
        debug_assert!(x != 0);
        x ^= (x >> 31) ^ (x >> 62);
        x = x.wrapping_mul(0x3196_42b2_d24d_8ec3);
        x ^= (x >> 27) ^ (x >> 54);
        x = x.wrapping_mul(0x96de_1b17_3f11_9089);
        x ^= (x >> 30) ^ (x >> 60);
        x
    }
}

/// Golden-ratio multiplicative hash, 64-bit fastutil flavor.
#[derive(Clone, Copy, Debug, Default)]
pub struct Phi;

const LONG_PHI: u64 = 0x9e37_79b9_7f4a_7c15;
const INV_LONG_PHI: u64 = 0xf1de_83e1_9937_733d;

impl Hasher64 for Phi {
    #[inline]
    fn hash(&self, x: u64) -> u64 {
        debug_assert!(x != 0);
        let mut x = x.wrapping_mul(LONG_PHI);
        x ^= x >> 32;
        x ^ (x >> 16)
    }

    #[inline]
    fn unhash(&self, mut x: u64) -> u64 {
        debug_assert!(x != 0);
        x ^= x >> 32;
        x ^= x >> 16;
        x ^= x >> 32;
        x.wrapping_mul(INV_LONG_PHI)
    }
}

/// Thomas Wang's 64-bit mixer, inverted step by step
/// (https://naml.us/post/inverse-of-a-hash-function/).
///
/// A bijection, but one that does not fix zero (the first step complements
/// the input), so it is not usable with the zero-sentinel sets.
#[derive(Clone, Copy, Debug, Default)]
pub struct Wang;

impl Hasher64 for Wang {
    #[inline]
    fn hash(&self, mut x: u64) -> u64 {
        x = (!x).wrapping_add(x << 21);
        x ^= x >> 24;
        x = x.wrapping_add(x << 3).wrapping_add(x << 8); // x * 265
        x ^= x >> 14;
        x = x.wrapping_add(x << 2).wrapping_add(x << 4); // x * 21
        x ^= x >> 28;
        x.wrapping_add(x << 31)
    }

    fn unhash(&self, mut x: u64) -> u64 {
        // Invert x = x + (x << 31).
        let mut tmp = x.wrapping_sub(x << 31);
        x = x.wrapping_sub(tmp << 31);

        // Invert x ^= x >> 28.
        tmp = x ^ (x >> 28);
        x ^= tmp >> 28;

        // Invert x *= 21.
        x = x.wrapping_mul(0xcf3c_f3cf_3cf3_cf3d);

        // Invert x ^= x >> 14.
        tmp = x ^ (x >> 14);
        tmp = x ^ (tmp >> 14);
        tmp = x ^ (tmp >> 14);
        x ^= tmp >> 14;

        // Invert x *= 265.
        x = x.wrapping_mul(0xd38f_f08b_1c03_dd39);

        // Invert x ^= x >> 24.
        tmp = x ^ (x >> 24);
        x ^= tmp >> 24;

        // Invert x = (~x) + (x << 21).
        tmp = !x;
        tmp = !(x.wrapping_sub(tmp << 21));
        tmp = !(x.wrapping_sub(tmp << 21));
        !(x.wrapping_sub(tmp << 21))
    }
}

/// degski's 64-bit mixer
/// (https://gist.github.com/degski/6e2069d6035ae04d5d6f64981c995ec2).
#[derive(Clone, Copy, Debug, Default)]
pub struct Degski;

impl Hasher64 for Degski {
    #[inline]
    fn hash(&self, mut x: u64) -> u64 {
        debug_assert!(x != 0);
        x ^= x >> 32;
        x = x.wrapping_mul(0xd6e8_feb8_6659_fd93);
        x ^= x >> 32;
        x = x.wrapping_mul(0xd6e8_feb8_6659_fd93);
        x ^= x >> 32;
        x
    }

    #[inline]
    fn unhash(&self, mut x: u64) -> u64 {
        debug_assert!(x != 0);
        x ^= x >> 32;
        x = x.wrapping_mul(0xcfee_444d_8b59_a89b);
        x ^= x >> 32;
        x = x.wrapping_mul(0xcfee_444d_8b59_a89b);
        x ^= x >> 32;
        x
    }
}

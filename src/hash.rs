//! Implementations of hash functions

use crate::consts::{FNV_OFFSET_BASIS, FNV_PRIME};

/// 32 bit FNV-1a hash function
///
/// Source: <http://www.isthe.com/chongo/tech/comp/fnv/>
///
/// The digest producer hashes with exactly this arithmetic, so the multiply must wrap at 32 bits.
pub fn fnv1a(input: &[u8]) -> u32 {
    let mut hash: u32 = FNV_OFFSET_BASIS;
    for &byte in input {
        hash ^= byte as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/* -------------------- Unit Tests -------------------- */

//! Fingerprint and bucket index derivation
//!
//! Every item maps to a 12 bit fingerprint and two candidate buckets. The producer stored the
//! fingerprint in one of the two, so a lookup only needs to recompute both and scan them.

use crate::consts::FINGERPRINT_MASK;
use crate::hash::fnv1a;

pub type BucketIndex = u32;
pub type Fingerprint = u16;

/// Compute the fingerprint of an item, always in `[1, 4095]`
///
/// As in the producer, the fingerprint cannot be zero because 0 marks an empty slot.
pub fn fingerprint(item: &[u8]) -> Fingerprint {
    let fp = (fnv1a(item) & FINGERPRINT_MASK) as Fingerprint;
    fp + (fp == 0) as Fingerprint
}

/// The bucket an item hashes to first
///
/// This is a true modulo, not a mask. A digest declaring zero buckets has nowhere to look, so we
/// return 0 instead of dividing by zero.
pub fn primary_bucket(item: &[u8], num_buckets: u32) -> BucketIndex {
    if num_buckets == 0 {
        return 0;
    }
    fnv1a(item) % num_buckets
}

/// The other candidate bucket for a fingerprint
///
/// The offset is the hash of the fingerprint's decimal text, forced odd so it is never 0 when
/// `num_buckets > 1`. XOR with a fixed offset is an involution, so calling this on the alternate
/// bucket gives back the original one.
///
/// `num_buckets` is assumed to be a power of two (the producer's convention). It is not checked.
pub fn alternate_bucket(bucket: BucketIndex, fp: Fingerprint, num_buckets: u32) -> BucketIndex {
    let mask = match num_buckets.checked_sub(1) {
        Some(mask) => mask,
        None => return 0,
    };
    let offset = (fnv1a(fp.to_string().as_bytes()) | 1) & mask;
    (bucket ^ offset) & mask
}

/* -------------------- Unit Tests -------------------- */

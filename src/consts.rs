//! Fixed parameters of the digest wire format
//!
//! None of these are carried in the header, so they have to match the producer exactly.

/// Width of a stored fingerprint
pub const FINGERPRINT_BITS: u32 = 12;
/// Lowest `FINGERPRINT_BITS` bits of a hash
pub const FINGERPRINT_MASK: u32 = (1 << FINGERPRINT_BITS) - 1;
/// Each bucket holds 4 fingerprints
pub const BUCKET_SIZE: usize = 4;

/// The only version byte we understand
pub const DIGEST_VERSION: u8 = 1;
/// Version (1) + bucket count (2) + reserved (2)
pub const HEADER_LEN: usize = 5;
/// Every slot is a big-endian u16
pub const SLOT_LEN: usize = 2;

pub const FNV_OFFSET_BASIS: u32 = 2_166_136_261;
pub const FNV_PRIME: u32 = 16_777_619;

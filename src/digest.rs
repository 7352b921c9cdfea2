//! # Cache Digest
//!
//! A read-only view of a Cuckoo filter serialized by the client. We never insert, delete or resize;
//! the filter arrives as base64 text, is decoded once, and then answers membership queries.
//!
//! Layout after base64 decoding:
//!
//! ```text
//! [version: u8 = 1][num_buckets: u16 BE][reserved: u16][slot: u16 BE] * num_buckets * 4
//! ```
//!
//! Slots are row-major (bucket 0 slots 0..4, bucket 1 slots 0..4, ...) and 0 marks an empty slot.

use core::str::FromStr;

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use byteorder::{BigEndian, ByteOrder};
use tracing::{debug, trace};

use crate::consts::{BUCKET_SIZE, DIGEST_VERSION, HEADER_LEN, SLOT_LEN};
use crate::error::{DigestError, Result};
use crate::index::{alternate_bucket, fingerprint, primary_bucket, BucketIndex, Fingerprint};

/// Standard alphabet, canonical padding, but tolerant of stray bits in the last quantum like the
/// producer's decoder
const DIGEST_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_allow_trailing_bits(true)
        .with_decode_padding_mode(DecodePaddingMode::RequireCanonical),
);

type Bucket = [Fingerprint; BUCKET_SIZE];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum State {
    #[default]
    Invalid,
    Valid {
        num_buckets: u32,
        buckets: Vec<Bucket>,
    },
}

/// A decoded cache digest
///
/// Either valid, with a bucket table, or invalid. An invalid digest behaves as if nothing is
/// cached: every lookup misses. Once built it is never mutated, so it can be shared across threads
/// freely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Digest {
    state: State,
}

impl Digest {
    /// Decode a digest, collapsing every failure into an invalid digest
    ///
    /// This is what request handling should call. The cause of a failure is only logged.
    pub fn decode(input: &str) -> Digest {
        match Digest::try_decode(input) {
            Ok(digest) => digest,
            Err(err) => {
                debug!(%err, input_len = input.len(), "cache digest rejected");
                Digest::default()
            }
        }
    }

    /// Decode a digest, reporting why it failed
    ///
    /// Accepts the standard or URL-safe alphabet, with or without `=` padding.
    pub fn try_decode(input: &str) -> Result<Digest> {
        if input.is_empty() {
            return Err(DigestError::Empty);
        }
        let data = DIGEST_BASE64.decode(normalize_base64(input))?;
        Digest::from_bytes(&data)
    }

    /// Parse the binary layout
    ///
    /// A body shorter than the header promises is still valid: missing slots stay empty.
    pub fn from_bytes(data: &[u8]) -> Result<Digest> {
        if data.len() < HEADER_LEN {
            return Err(DigestError::TooShort { len: data.len() });
        }
        if data[0] != DIGEST_VERSION {
            return Err(DigestError::UnsupportedVersion(data[0]));
        }
        // data[3..5] is reserved and ignored
        let num_buckets = BigEndian::read_u16(&data[1..3]) as u32;

        let mut buckets = vec![[0; BUCKET_SIZE]; num_buckets as usize];
        let slots = buckets.iter_mut().flat_map(|bucket| bucket.iter_mut());
        let body = data[HEADER_LEN..].chunks_exact(SLOT_LEN);
        let mut filled = 0usize;
        for (slot, bytes) in slots.zip(body) {
            *slot = BigEndian::read_u16(bytes);
            filled += 1;
        }

        let truncated = filled < buckets.len() * BUCKET_SIZE;
        trace!(num_buckets, bytes = data.len(), truncated, "cache digest decoded");
        Ok(Digest {
            state: State::Valid {
                num_buckets,
                buckets,
            },
        })
    }

    /// Did the digest parse?
    pub fn is_valid(&self) -> bool {
        matches!(self.state, State::Valid { .. })
    }

    /// Bucket count declared in the header, 0 for an invalid digest
    pub fn num_buckets(&self) -> u32 {
        match self.state {
            State::Valid { num_buckets, .. } => num_buckets,
            State::Invalid => 0,
        }
    }

    /// Check if an item might be in the digest
    ///
    /// False positives are possible, false negatives are not (for items the producer inserted).
    /// Always false on an invalid digest.
    pub fn lookup(&self, item: &str) -> bool {
        self.lookup_bytes(item.as_bytes())
    }

    /// Same as [`Digest::lookup`], for keys that are not UTF-8 text
    pub fn lookup_bytes(&self, item: &[u8]) -> bool {
        let (num_buckets, buckets) = match &self.state {
            State::Valid {
                num_buckets,
                buckets,
            } => (*num_buckets, buckets),
            State::Invalid => return false,
        };
        let fp = fingerprint(item);
        let candidate_1 = primary_bucket(item, num_buckets);
        let candidate_2 = alternate_bucket(candidate_1, fp, num_buckets);
        bucket_contains(buckets, candidate_1, fp) || bucket_contains(buckets, candidate_2, fp)
    }
}

impl FromStr for Digest {
    type Err = DigestError;

    fn from_str(s: &str) -> Result<Digest> {
        Digest::try_decode(s)
    }
}

/// Map the URL-safe alphabet onto the standard one and re-pad to a multiple of 4
fn normalize_base64(input: &str) -> String {
    let mut normalized: String = input
        .chars()
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            c => c,
        })
        .collect();
    while normalized.len() % 4 != 0 {
        normalized.push('=');
    }
    normalized
}

fn bucket_contains(buckets: &[Bucket], bucket_index: BucketIndex, fp: Fingerprint) -> bool {
    buckets
        .get(bucket_index as usize)
        .map_or(false, |bucket| bucket.contains(&fp))
}

/* -------------------- Unit Tests -------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_maps_url_safe_and_pads() {
        assert_eq!(normalize_base64("AQ-_"), "AQ+/");
        assert_eq!(normalize_base64("AQA"), "AQA=");
        assert_eq!(normalize_base64("AQ"), "AQ==");
        assert_eq!(normalize_base64("AQA="), "AQA=");
    }

    #[test]
    fn header_only_digest() {
        let digest = Digest::from_bytes(&[1, 0, 2, 0xAB, 0xCD]).unwrap();
        assert!(digest.is_valid());
        assert_eq!(digest.num_buckets(), 2);
        match digest.state {
            State::Valid { buckets, .. } => assert_eq!(buckets, vec![[0; 4]; 2]),
            State::Invalid => panic!("expected valid"),
        }
    }

    #[test]
    fn slots_are_big_endian_row_major() {
        let mut data = vec![1, 0, 2, 0, 0];
        for slot in 1u16..=8 {
            data.extend_from_slice(&(slot * 0x101).to_be_bytes());
        }
        let digest = Digest::from_bytes(&data).unwrap();
        match digest.state {
            State::Valid { buckets, .. } => {
                assert_eq!(buckets[0], [0x101, 0x202, 0x303, 0x404]);
                assert_eq!(buckets[1], [0x505, 0x606, 0x707, 0x808]);
            }
            State::Invalid => panic!("expected valid"),
        }
    }

    // An odd trailing byte is not half a slot
    #[test]
    fn truncated_body_zero_fills() {
        let data = [1, 0, 1, 0, 0, 0x0A, 0xBC, 0x0D];
        let digest = Digest::from_bytes(&data).unwrap();
        match digest.state {
            State::Valid { buckets, .. } => assert_eq!(buckets, vec![[0xABC, 0, 0, 0]]),
            State::Invalid => panic!("expected valid"),
        }
    }

    #[test]
    fn extra_trailing_bytes_ignored() {
        let data = [1, 0, 1, 0, 0, 0, 1, 0, 2, 0, 3, 0, 4, 0xFF, 0xFF];
        let digest = Digest::from_bytes(&data).unwrap();
        match digest.state {
            State::Valid { buckets, .. } => assert_eq!(buckets, vec![[1, 2, 3, 4]]),
            State::Invalid => panic!("expected valid"),
        }
    }

    #[test]
    fn failure_causes() {
        assert_eq!(Digest::try_decode(""), Err(DigestError::Empty));
        assert!(matches!(
            Digest::try_decode("not-valid-base64!!!"),
            Err(DigestError::Base64(_))
        ));
        assert_eq!(
            Digest::from_bytes(&[1, 0]),
            Err(DigestError::TooShort { len: 2 })
        );
        assert_eq!(
            Digest::from_bytes(&[2, 0, 4, 0, 0]),
            Err(DigestError::UnsupportedVersion(2))
        );
    }

    #[test]
    fn zero_buckets_never_matches() {
        let digest = Digest::from_bytes(&[1, 0, 0, 0, 0]).unwrap();
        assert!(digest.is_valid());
        assert!(!digest.lookup("anything"));
    }

    #[test]
    fn invalid_default() {
        let digest = Digest::default();
        assert!(!digest.is_valid());
        assert_eq!(digest.num_buckets(), 0);
        assert!(!digest.lookup(""));
    }

    #[test]
    fn from_str_matches_try_decode() {
        let digest: Digest = "AQABAAA".parse().unwrap();
        assert_eq!(digest.num_buckets(), 1);
        assert!("".parse::<Digest>().is_err());
    }

    #[test]
    fn lookup_bytes_matches_lookup() {
        let digest = Digest::decode("AQAEAAQAAAAAAAAAAAXNB-UAAAAACT4NhgAAAAAAAAAAAAAAAA");
        assert!(digest.lookup_bytes(b"src/css/critical.css:B20ictSB"));
        assert!(!digest.lookup_bytes(b"src/css/critical.css:DIFFERENT"));
        assert!(!Digest::default().lookup_bytes(b"src/css/critical.css:B20ictSB"));
    }
}

//! # Cache Digest
//!
//! A client keeps a compact record of the versioned assets it already has in cache: a Cuckoo
//! filter, serialized and base64 encoded. This crate is the server side of that exchange. It
//! decodes the digest and answers "might the client already have this asset?" so a response can
//! skip what is cached.
//!
//! The filter is built elsewhere, by an independent implementation. Everything here (the FNV-1a
//! hash, the 12 bit fingerprints, the bucket arithmetic, the byte layout) has to match it bit for
//! bit, or lookups silently always miss.
//!
//! ```
//! use cache_digest::Digest;
//!
//! let digest = Digest::decode("AQAEAAQAAAAAAAAAAAXNB-UAAAAACT4NhgAAAAAAAAAAAAAAAA");
//! assert!(digest.is_valid());
//! assert!(digest.lookup("src/css/critical.css:B20ictSB"));
//! assert!(!digest.lookup("src/css/critical.css:DIFFERENT"));
//!
//! // Anything malformed behaves as an empty cache
//! assert!(!Digest::decode("%%%").lookup("src/css/critical.css:B20ictSB"));
//! ```

pub mod consts;
mod digest;
mod error;
mod hash;
mod index;

pub use digest::Digest;
pub use error::DigestError;
pub use hash::fnv1a;
pub use index::{alternate_bucket, fingerprint, primary_bucket, BucketIndex, Fingerprint};

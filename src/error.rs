use thiserror::Error;

/// Why a digest string failed to parse
///
/// [`Digest::decode`](crate::Digest::decode) folds all of these into an invalid digest. They only
/// surface through the fallible constructors, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DigestError {
    /// Input string was empty
    #[error("empty digest")]
    Empty,

    /// Input was not base64 in either alphabet
    #[error("base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes are shorter than the 5 byte header
    #[error("digest is {len} bytes, header needs 5")]
    TooShort { len: usize },

    /// Version byte was not 1
    #[error("unsupported digest version {0}")]
    UnsupportedVersion(u8),
}

pub type Result<T> = std::result::Result<T, DigestError>;

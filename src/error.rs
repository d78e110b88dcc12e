use core::{fmt, result};

/// Result is a specialized [`result::Result`] for this crate.
pub type Result<T> = result::Result<T, Error>;

/// Error is the error type returned by this crate.
#[derive(Debug)]
pub enum Error {
    /// `keyId` exceeded the 255-byte limit imposed by the `aes128gcm`
    /// header's one-byte length field.
    KeyIdTooLong,
    /// The ciphertext ended before a terminating record was seen.
    Truncated,
    /// The last record's padding delimiter was not `0x02`.
    InvalidPaddingLast,
    /// A non-last record's padding delimiter was not `0x01`.
    InvalidPaddingNonLast,
    /// A record's padding block decrypted to all zero bytes.
    AllZeroPlaintext,
    /// None of `key`, a sender private key, or `keyId`+`keyMap` could
    /// resolve to a secret.
    UnableDetermineKey,
    /// Web Push (`aes128gcm` with ECDH) requires an `authSecret`.
    NoAuthSecret,
    /// `rs` fell outside `[overhead+1, 2^31-1]`.
    InvalidRecordSize,
    /// An explicit `key` was not exactly 16 bytes.
    InvalidKeyLength,
    /// An explicit `salt` was not exactly 16 bytes.
    InvalidSaltLength,
    /// AEAD seal or open failed. Intentionally non-specific: an opaque
    /// failure avoids becoming a padding/plaintext oracle.
    AeadFailure,
    /// ECDH key agreement or key parsing failed.
    EcdhFailure,
    /// The CSPRNG failed to fill a buffer.
    RngFailure,
    /// HKDF was asked to expand more than `255 * 32` bytes.
    InvalidKeySize(hkdf::InvalidLength),
    /// Too many records were written; the 32-bit counter overflowed.
    CounterOverflow,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::KeyIdTooLong => write!(f, "keyId is too long"),
            Error::Truncated => write!(f, "ciphertext is truncated"),
            Error::InvalidPaddingLast => {
                write!(f, "invalid padding delimiter on last record")
            }
            Error::InvalidPaddingNonLast => {
                write!(f, "invalid padding delimiter on non-last record")
            }
            Error::AllZeroPlaintext => write!(f, "record padding is all zero"),
            Error::UnableDetermineKey => write!(f, "unable to determine key"),
            Error::NoAuthSecret => {
                write!(f, "no authentication secret for webpush")
            }
            Error::InvalidRecordSize => write!(f, "invalid record size"),
            Error::InvalidKeyLength => write!(f, "invalid explicit key length"),
            Error::InvalidSaltLength => write!(f, "invalid salt length"),
            Error::AeadFailure => write!(f, "AEAD seal/open failed"),
            Error::EcdhFailure => write!(f, "ECDH key agreement failed"),
            Error::RngFailure => write!(f, "CSPRNG failure"),
            Error::InvalidKeySize(err) => write!(f, "invalid key size: {err}"),
            Error::CounterOverflow => write!(f, "record counter overflow"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::InvalidKeySize(err) => Some(err),
            _ => None,
        }
    }
}

impl From<hkdf::InvalidLength> for Error {
    fn from(value: hkdf::InvalidLength) -> Self {
        Error::InvalidKeySize(value)
    }
}

impl From<aead::Error> for Error {
    fn from(_value: aead::Error) -> Self {
        Error::AeadFailure
    }
}

impl From<rand_core::Error> for Error {
    fn from(_value: rand_core::Error) -> Self {
        Error::RngFailure
    }
}

impl From<p256::elliptic_curve::Error> for Error {
    fn from(_value: p256::elliptic_curve::Error) -> Self {
        Error::EcdhFailure
    }
}

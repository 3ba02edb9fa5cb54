//! Error types for `blindex` operations.

use std::fmt;

/// Main error type for `blindex` operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Encryption operation failed
    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Authentication tag verification failed (data may be corrupted or tampered)
    #[error("authentication failed: ciphertext may be corrupted or tampered")]
    AuthenticationFailed,

    /// Payload is structurally invalid (e.g. shorter than nonce + tag)
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// Key material has the wrong length
    #[error("invalid key length: expected {expected} bytes, got {actual}")]
    InvalidKeyLength {
        /// Required key length in bytes
        expected: usize,
        /// Length of the key that was supplied
        actual: usize,
    },

    /// N-gram window size must be at least 1
    #[error("n-gram size must be at least 1")]
    InvalidNgramSize,

    /// Canonical value encoding failed
    #[error("value encoding failed: {0}")]
    EncodingFailed(String),

    /// Blind index derivation failed
    #[error("blind index derivation failed: {0}")]
    IndexDerivationFailed(String),

    /// Key provider operation failed
    #[error("key provider error: {0}")]
    KeyProvider(#[from] KeyProviderError),

    /// Token index store backend failed
    #[error("token store error: {0}")]
    Store(String),
}

/// Errors specific to key provider operations.
#[derive(Debug)]
pub enum KeyProviderError {
    /// A required key is not configured
    MissingKey(String),

    /// Key material is present but unusable (bad encoding, wrong length)
    InvalidKey(String),

    /// I/O operation failed. Not constructed by the providers shipped
    /// here; exists for external implementations that read key material
    /// from files or sockets.
    Io(std::io::Error),
}

impl fmt::Display for KeyProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingKey(name) => write!(f, "missing key: {name}"),
            Self::InvalidKey(msg) => write!(f, "invalid key: {msg}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for KeyProviderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for KeyProviderError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

//! Key provider abstraction for key retrieval.
//!
//! The core performs no key derivation, rotation, or storage itself: a
//! provider hands over two independent, already-materialized 256-bit
//! secrets. The *data key* is used only for authenticated encryption and
//! the *index key* only for HMAC index derivation — reusing one for the
//! other purpose breaks the separation between "can decrypt" and
//! "can search", so the two must never be the same secret.

use crate::error::KeyProviderError;
use secrecy::SecretVec;

/// Required key length in bytes (256 bits) for both keys.
pub const KEY_SIZE: usize = 32;

/// Supplies the two secrets the engine needs.
///
/// Implementations must be thread-safe (`Send + Sync`) to support
/// concurrent encryption and derivation. A provider that cannot supply a
/// key should fail here, at retrieval time; the engine materializes keys
/// at construction so the failure surfaces as a setup error, never
/// mid-operation.
pub trait KeyProvider: Send + Sync {
    /// Returns the 32-byte data key used for authenticated encryption.
    ///
    /// # Errors
    ///
    /// Returns `KeyProviderError::MissingKey` if no data key is configured.
    fn data_key(&self) -> Result<SecretVec<u8>, KeyProviderError>;

    /// Returns the 32-byte index key used for blind index derivation.
    ///
    /// # Errors
    ///
    /// Returns `KeyProviderError::MissingKey` if no index key is configured.
    fn index_key(&self) -> Result<SecretVec<u8>, KeyProviderError>;
}

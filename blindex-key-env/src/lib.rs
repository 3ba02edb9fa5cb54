//! Environment and static key providers for `blindex`.
//!
//! Keys are materialized at construction, so a missing or malformed key
//! fails setup immediately rather than surfacing mid-operation. There is
//! no silent default: without both keys the provider cannot be built.

#![warn(clippy::pedantic, clippy::nursery)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blindex::error::KeyProviderError;
use blindex::key_provider::{KeyProvider, KEY_SIZE};
use secrecy::{ExposeSecret, SecretVec};

/// Default environment variable for the base64-encoded data key.
pub const DATA_KEY_VAR: &str = "BLINDEX_DATA_KEY";

/// Default environment variable for the base64-encoded index key.
pub const INDEX_KEY_VAR: &str = "BLINDEX_INDEX_KEY";

/// Holds both secrets in memory.
///
/// Build it directly from raw key bytes, or via
/// [`from_env`](Self::from_env) with base64-encoded keys from the
/// environment — the pattern for containerized deployments where keys
/// are injected as secrets.
pub struct StaticKeyProvider {
    data_key: SecretVec<u8>,
    index_key: SecretVec<u8>,
}

impl StaticKeyProvider {
    /// Creates a provider from raw 32-byte keys.
    ///
    /// # Errors
    ///
    /// Returns `KeyProviderError::InvalidKey` if either key is not 32
    /// bytes, or if the two keys are identical — the data and index keys
    /// must be independent secrets.
    pub fn new(data_key: Vec<u8>, index_key: Vec<u8>) -> Result<Self, KeyProviderError> {
        if data_key.len() != KEY_SIZE {
            return Err(KeyProviderError::InvalidKey(format!(
                "data key must be {KEY_SIZE} bytes, got {}",
                data_key.len()
            )));
        }
        if index_key.len() != KEY_SIZE {
            return Err(KeyProviderError::InvalidKey(format!(
                "index key must be {KEY_SIZE} bytes, got {}",
                index_key.len()
            )));
        }
        if data_key == index_key {
            return Err(KeyProviderError::InvalidKey(
                "data key and index key must be independent secrets".to_string(),
            ));
        }
        Ok(Self { data_key: SecretVec::new(data_key), index_key: SecretVec::new(index_key) })
    }

    /// Creates a provider from `BLINDEX_DATA_KEY` / `BLINDEX_INDEX_KEY`.
    ///
    /// # Errors
    ///
    /// Returns `KeyProviderError::MissingKey` if a variable is unset and
    /// `KeyProviderError::InvalidKey` if a value fails base64 decoding
    /// or has the wrong length.
    pub fn from_env() -> Result<Self, KeyProviderError> {
        Self::from_vars(DATA_KEY_VAR, INDEX_KEY_VAR)
    }

    /// Creates a provider from custom environment variable names.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`from_env`](Self::from_env).
    pub fn from_vars(data_var: &str, index_var: &str) -> Result<Self, KeyProviderError> {
        Self::new(read_key_var(data_var)?, read_key_var(index_var)?)
    }
}

impl KeyProvider for StaticKeyProvider {
    fn data_key(&self) -> Result<SecretVec<u8>, KeyProviderError> {
        Ok(SecretVec::new(self.data_key.expose_secret().clone()))
    }

    fn index_key(&self) -> Result<SecretVec<u8>, KeyProviderError> {
        Ok(SecretVec::new(self.index_key.expose_secret().clone()))
    }
}

fn read_key_var(var: &str) -> Result<Vec<u8>, KeyProviderError> {
    let encoded = std::env::var(var).map_err(|_| KeyProviderError::MissingKey(var.to_string()))?;
    STANDARD
        .decode(encoded.trim())
        .map_err(|e| KeyProviderError::InvalidKey(format!("{var} is not valid base64: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn b64(bytes: &[u8]) -> String {
        STANDARD.encode(bytes)
    }

    #[test]
    fn test_static_provider_round_trip() {
        let provider = StaticKeyProvider::new(vec![1u8; 32], vec![2u8; 32]).unwrap();

        assert_eq!(provider.data_key().unwrap().expose_secret(), &vec![1u8; 32]);
        assert_eq!(provider.index_key().unwrap().expose_secret(), &vec![2u8; 32]);
    }

    #[test]
    fn test_rejects_wrong_length() {
        let result = StaticKeyProvider::new(vec![1u8; 16], vec![2u8; 32]);
        assert!(matches!(result, Err(KeyProviderError::InvalidKey(_))));

        let result = StaticKeyProvider::new(vec![1u8; 32], vec![2u8; 33]);
        assert!(matches!(result, Err(KeyProviderError::InvalidKey(_))));
    }

    #[test]
    fn test_rejects_identical_keys() {
        let result = StaticKeyProvider::new(vec![9u8; 32], vec![9u8; 32]);
        assert!(matches!(result, Err(KeyProviderError::InvalidKey(_))));
    }

    #[test]
    fn test_from_vars() {
        std::env::set_var("BLINDEX_TEST_FROM_VARS_DK", b64(&[3u8; 32]));
        std::env::set_var("BLINDEX_TEST_FROM_VARS_IK", b64(&[4u8; 32]));

        let provider =
            StaticKeyProvider::from_vars("BLINDEX_TEST_FROM_VARS_DK", "BLINDEX_TEST_FROM_VARS_IK")
                .unwrap();
        assert_eq!(provider.data_key().unwrap().expose_secret(), &vec![3u8; 32]);
    }

    #[test]
    fn test_missing_var() {
        let result =
            StaticKeyProvider::from_vars("BLINDEX_TEST_UNSET_DK", "BLINDEX_TEST_UNSET_IK");
        assert!(matches!(result, Err(KeyProviderError::MissingKey(_))));
    }

    #[test]
    fn test_invalid_base64() {
        std::env::set_var("BLINDEX_TEST_BAD_B64_DK", "not base64!!!");
        std::env::set_var("BLINDEX_TEST_BAD_B64_IK", b64(&[4u8; 32]));

        let result =
            StaticKeyProvider::from_vars("BLINDEX_TEST_BAD_B64_DK", "BLINDEX_TEST_BAD_B64_IK");
        assert!(matches!(result, Err(KeyProviderError::InvalidKey(_))));
    }

    #[test]
    fn test_short_decoded_key() {
        std::env::set_var("BLINDEX_TEST_SHORT_DK", b64(&[1u8; 8]));
        std::env::set_var("BLINDEX_TEST_SHORT_IK", b64(&[4u8; 32]));

        let result =
            StaticKeyProvider::from_vars("BLINDEX_TEST_SHORT_DK", "BLINDEX_TEST_SHORT_IK");
        assert!(matches!(result, Err(KeyProviderError::InvalidKey(_))));
    }
}

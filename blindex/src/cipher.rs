//! Authenticated encryption of field values.
//!
//! Wire format: `nonce (12 bytes) ‖ ciphertext‖tag`. There is no version
//! byte and no algorithm identifier — algorithm and key choice are
//! implicit and external, so switching the AEAD requires a full data
//! migration rather than runtime negotiation.
//!
//! A fresh 96-bit nonce is drawn from the OS random source on every
//! encryption call. Nonce uniqueness therefore rests on randomness alone;
//! at extremely high write volumes per key a counter or hybrid scheme
//! would bound the collision risk deterministically, but that needs
//! per-key state this stateless cipher does not hold.

use crate::error::Error;
use aes_gcm::{
    aead::{rand_core::RngCore, Aead, KeyInit, OsRng, Payload},
    Aes256Gcm,
};
use chacha20poly1305::ChaCha20Poly1305;
use secrecy::{ExposeSecret, SecretVec};
use zeroize::Zeroizing;

/// Nonce size for both supported AEADs (96 bits).
pub const NONCE_SIZE: usize = 12;

/// Poly1305/GCM authentication tag size (128 bits).
pub const TAG_SIZE: usize = 16;

/// Required data key length in bytes (256 bits).
pub const DATA_KEY_SIZE: usize = 32;

/// AEAD algorithm for field encryption.
///
/// Both modes share the 32-byte key, 12-byte nonce, and 16-byte tag, so
/// payloads are indistinguishable at the storage layer and the mode stays
/// implicit as the wire format requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherMode {
    /// AES-256-GCM (default).
    Aes256Gcm,
    /// ChaCha20-Poly1305.
    ChaCha20Poly1305,
}

impl Default for CipherMode {
    fn default() -> Self {
        Self::Aes256Gcm
    }
}

/// A field value to encrypt.
///
/// Non-text, non-binary values are converted to a canonical deterministic
/// byte encoding (compact JSON with sorted object keys) before
/// encryption, so the plaintext handed to the cipher is reproducible.
/// The ciphertext itself is still non-deterministic because of the random
/// nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Raw bytes, passed through unchanged.
    Bytes(Vec<u8>),
    /// Text, encoded as UTF-8.
    Text(String),
    /// Structured data, encoded as compact sorted-key JSON.
    Structured(serde_json::Value),
}

impl FieldValue {
    /// Returns the canonical byte encoding of this value.
    ///
    /// # Errors
    ///
    /// Returns `Error::EncodingFailed` if JSON serialization fails.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, Error> {
        match self {
            Self::Bytes(bytes) => Ok(bytes.clone()),
            Self::Text(text) => Ok(text.as_bytes().to_vec()),
            // serde_json maps are BTreeMaps, so object keys serialize sorted
            Self::Structured(value) => {
                serde_json::to_vec(value).map_err(|e| Error::EncodingFailed(e.to_string()))
            }
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for FieldValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Bytes(value)
    }
}

impl From<serde_json::Value> for FieldValue {
    fn from(value: serde_json::Value) -> Self {
        Self::Structured(value)
    }
}

/// Authenticated cipher over a caller-supplied data key.
///
/// Pure and re-entrant: each call takes its own value and returns a fresh
/// payload, with no shared mutable state. Safe to share across threads.
pub struct FieldCipher {
    key: SecretVec<u8>,
    mode: CipherMode,
}

impl FieldCipher {
    /// Creates a cipher over the given 256-bit data key.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyLength` if the key is not 32 bytes. A
    /// short or placeholder key is a configuration error and is rejected
    /// here rather than silently accepted.
    pub fn new(key: SecretVec<u8>, mode: CipherMode) -> Result<Self, Error> {
        let actual = key.expose_secret().len();
        if actual != DATA_KEY_SIZE {
            return Err(Error::InvalidKeyLength { expected: DATA_KEY_SIZE, actual });
        }
        Ok(Self { key, mode })
    }

    /// Encrypts a value, returning `nonce ‖ ciphertext‖tag`.
    ///
    /// A fresh random nonce is generated per call; the payload must never
    /// be persisted without its nonce prefix.
    ///
    /// # Arguments
    ///
    /// * `value` - The value to encrypt (canonically encoded first)
    /// * `aad` - Optional associated data bound into the authentication tag
    ///
    /// # Errors
    ///
    /// Returns error if canonical encoding or the AEAD operation fails.
    pub fn encrypt(&self, value: &FieldValue, aad: Option<&[u8]>) -> Result<Vec<u8>, Error> {
        let plaintext = Zeroizing::new(value.canonical_bytes()?);

        let mut nonce_bytes = [0u8; NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce_bytes);

        let payload = Payload { msg: &plaintext, aad: aad.unwrap_or(&[]) };
        let ciphertext = match self.mode {
            CipherMode::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(self.key.expose_secret())
                    .map_err(|e| Error::EncryptionFailed(format!("invalid data key: {e}")))?;
                cipher
                    .encrypt(&aes_gcm::Nonce::from(nonce_bytes), payload)
                    .map_err(|e| Error::EncryptionFailed(format!("AES-GCM encryption failed: {e}")))?
            }
            CipherMode::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(self.key.expose_secret())
                    .map_err(|e| Error::EncryptionFailed(format!("invalid data key: {e}")))?;
                cipher
                    .encrypt(&chacha20poly1305::Nonce::from(nonce_bytes), payload)
                    .map_err(|e| {
                        Error::EncryptionFailed(format!("ChaCha20-Poly1305 encryption failed: {e}"))
                    })?
            }
        };

        let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
        result.extend_from_slice(&nonce_bytes);
        result.extend_from_slice(&ciphertext);
        Ok(result)
    }

    /// Decrypts a payload produced by [`encrypt`](Self::encrypt).
    ///
    /// # Arguments
    ///
    /// * `payload` - `nonce ‖ ciphertext‖tag`
    /// * `aad` - Associated data; must match the value used at encryption
    ///
    /// # Returns
    ///
    /// The canonical plaintext bytes.
    ///
    /// # Errors
    ///
    /// * `Error::MalformedPayload` if the payload is shorter than
    ///   nonce + tag — rejected before any decryption is attempted.
    /// * `Error::AuthenticationFailed` if the tag does not verify
    ///   (tampered ciphertext, wrong key, or mismatched associated data).
    ///   This is a hard failure, never a fallback to partial data, and
    ///   must not be retried: a tampered payload cannot verify on retry.
    pub fn decrypt(&self, payload: &[u8], aad: Option<&[u8]>) -> Result<Vec<u8>, Error> {
        if payload.len() < NONCE_SIZE + TAG_SIZE {
            return Err(Error::MalformedPayload(format!(
                "payload too short: {} bytes (minimum: {})",
                payload.len(),
                NONCE_SIZE + TAG_SIZE
            )));
        }

        let (nonce_slice, ciphertext) = payload.split_at(NONCE_SIZE);
        let mut nonce_bytes = [0u8; NONCE_SIZE];
        nonce_bytes.copy_from_slice(nonce_slice);

        let payload = Payload { msg: ciphertext, aad: aad.unwrap_or(&[]) };
        let plaintext = match self.mode {
            CipherMode::Aes256Gcm => {
                let cipher = Aes256Gcm::new_from_slice(self.key.expose_secret())
                    .map_err(|e| Error::EncryptionFailed(format!("invalid data key: {e}")))?;
                cipher
                    .decrypt(&aes_gcm::Nonce::from(nonce_bytes), payload)
                    .map_err(|_| Error::AuthenticationFailed)?
            }
            CipherMode::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(self.key.expose_secret())
                    .map_err(|e| Error::EncryptionFailed(format!("invalid data key: {e}")))?;
                cipher
                    .decrypt(&chacha20poly1305::Nonce::from(nonce_bytes), payload)
                    .map_err(|_| Error::AuthenticationFailed)?
            }
        };

        Ok(plaintext)
    }
}

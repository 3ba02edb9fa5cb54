//! Blind index derivation for searchable encryption.
//!
//! Two deterministic, keyed derivations per value: a primary equality
//! index and a set of n-gram token hashes. Both are HMAC-SHA256 tags
//! truncated to a fixed width — determinism is what makes equality and
//! substring search over ciphertext possible, and it is also the leakage:
//! anyone who can read the index store learns which rows share a value
//! and which n-grams recur. That trade-off is deliberate; randomizing the
//! index would remove searchability.
//!
//! Truncation widths bound storage size at the cost of a calculable
//! collision probability. 16 bytes for the primary index and 12 bytes per
//! token keep collisions cryptographically negligible for expected corpus
//! sizes while limiting the distinguishing power each stored tag carries.
//! Stored indexes are immutable, so changing either width is a full data
//! migration — the same operational class as changing the AEAD.

use crate::error::Error;
use crate::normalize::normalize;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretVec};
use sha2::Sha256;
use std::collections::BTreeSet;

type HmacSha256 = Hmac<Sha256>;

/// Primary blind index width (16 bytes).
pub const PRIMARY_INDEX_SIZE: usize = 16;

/// Token hash width (12 bytes).
pub const TOKEN_HASH_SIZE: usize = 12;

/// Default n-gram window length.
pub const DEFAULT_NGRAM_SIZE: usize = 3;

/// Required index key length in bytes (256 bits).
pub const INDEX_KEY_SIZE: usize = 32;

/// A 16-byte deterministic equality tag.
pub type PrimaryIndex = [u8; PRIMARY_INDEX_SIZE];

/// A 12-byte deterministic n-gram tag.
pub type TokenHash = [u8; TOKEN_HASH_SIZE];

/// Returns the contiguous character windows of length `n`, left to right.
///
/// Windows are over characters, not bytes, so `"café"` with `n = 3`
/// yields `["caf", "afé"]`. When the input is shorter than `n` (or `n`
/// is 0) the whole input becomes the single token — short values are not
/// split, which makes them searchable only by a whole-value match on
/// that one token. Duplicates are kept.
///
/// The input is expected to be already normalized; [`BlindIndexer`]
/// normalizes before calling this.
#[must_use]
pub fn ngrams(normalized: &str, n: usize) -> Vec<String> {
    let chars: Vec<char> = normalized.chars().collect();
    if n == 0 || chars.len() < n {
        return vec![normalized.to_string()];
    }
    chars.windows(n).map(|window| window.iter().collect()).collect()
}

/// Derives blind indexes from plaintext values.
///
/// Pure and re-entrant over a caller-supplied index key: repeated calls
/// with identical inputs yield bit-identical outputs, and no state is
/// shared between calls.
pub struct BlindIndexer {
    index_key: SecretVec<u8>,
    ngram_size: usize,
}

impl BlindIndexer {
    /// Creates an indexer over the given 256-bit index key.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidKeyLength` if the key is not 32 bytes.
    /// * `Error::InvalidNgramSize` if `ngram_size` is 0.
    pub fn new(index_key: SecretVec<u8>, ngram_size: usize) -> Result<Self, Error> {
        let actual = index_key.expose_secret().len();
        if actual != INDEX_KEY_SIZE {
            return Err(Error::InvalidKeyLength { expected: INDEX_KEY_SIZE, actual });
        }
        if ngram_size == 0 {
            return Err(Error::InvalidNgramSize);
        }
        Ok(Self { index_key, ngram_size })
    }

    /// Creates an indexer with the default n-gram size of 3.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKeyLength` if the key is not 32 bytes.
    pub fn with_default_ngram_size(index_key: SecretVec<u8>) -> Result<Self, Error> {
        Self::new(index_key, DEFAULT_NGRAM_SIZE)
    }

    /// Returns the configured n-gram window length.
    #[must_use]
    pub const fn ngram_size(&self) -> usize {
        self.ngram_size
    }

    /// Computes the primary equality index for a text value.
    ///
    /// `HMAC-SHA256(index_key, normalize(value))` truncated to 16 bytes.
    /// Same key and same normalized value always produce the identical
    /// tag; different normalized values produce tags indistinguishable
    /// from random, so nothing beyond equality is revealed (modulo
    /// truncation collisions).
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexDerivationFailed` if the HMAC cannot be keyed.
    pub fn primary(&self, value: &str) -> Result<PrimaryIndex, Error> {
        let normalized = normalize(value);
        self.primary_bytes(normalized.as_bytes())
    }

    /// Computes the primary equality index over raw bytes.
    ///
    /// Bytes have no case or composition to canonicalize, so no
    /// normalization is applied. Used for indexing binary field values.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexDerivationFailed` if the HMAC cannot be keyed.
    pub fn primary_bytes(&self, data: &[u8]) -> Result<PrimaryIndex, Error> {
        let digest = self.hmac(data)?;
        let mut index = [0u8; PRIMARY_INDEX_SIZE];
        index.copy_from_slice(&digest[..PRIMARY_INDEX_SIZE]);
        Ok(index)
    }

    /// Computes the token hash set for a text value.
    ///
    /// One `HMAC-SHA256(index_key, ngram)` tag, truncated to 12 bytes,
    /// per n-gram of the normalized value. An empty string yields a
    /// single empty-string token — valid, if low-utility, output rather
    /// than an error; callers may reject empty values upstream.
    ///
    /// # Errors
    ///
    /// Returns `Error::IndexDerivationFailed` if the HMAC cannot be keyed.
    pub fn token_hashes(&self, value: &str) -> Result<BTreeSet<TokenHash>, Error> {
        let normalized = normalize(value);
        let mut hashes = BTreeSet::new();
        for gram in ngrams(&normalized, self.ngram_size) {
            let digest = self.hmac(gram.as_bytes())?;
            let mut hash = [0u8; TOKEN_HASH_SIZE];
            hash.copy_from_slice(&digest[..TOKEN_HASH_SIZE]);
            hashes.insert(hash);
        }
        Ok(hashes)
    }

    fn hmac(&self, data: &[u8]) -> Result<[u8; 32], Error> {
        let mut mac = HmacSha256::new_from_slice(self.index_key.expose_secret())
            .map_err(|e| Error::IndexDerivationFailed(format!("invalid index key: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().into())
    }
}

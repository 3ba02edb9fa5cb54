//! Field-level write and query surface.
//!
//! A [`SearchableField`] binds a cipher and an indexer to one
//! entity/field pair. Writes are explicit: [`protect`](SearchableField::protect)
//! returns the full `{ciphertext, primary index, token hashes}` bundle
//! for the caller's persistence layer to store atomically, and
//! [`store_row`](SearchableField::store_row) performs the two-phase
//! write — compute the complete token set first, then hand it to the
//! store as one batch for the atomic replace. There are no hidden
//! side effects on assignment and no deferred recomputation hooks.

use crate::cipher::{CipherMode, FieldCipher, FieldValue};
use crate::error::Error;
use crate::index::{BlindIndexer, PrimaryIndex, TokenHash, DEFAULT_NGRAM_SIZE};
use crate::key_provider::KeyProvider;
use crate::query::{self, ContainsPredicate, EqualityPredicate};
use crate::store::{RowId, TokenIndexStore};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifies the entity/field pair a value belongs to.
///
/// The context doubles as the AEAD associated data, so a payload
/// encrypted for `users|email` will not decrypt as `users|phone`, and it
/// is what the token store keys its entries by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldContext {
    entity: String,
    field: String,
}

impl FieldContext {
    /// Creates a new field context.
    #[must_use]
    pub fn new(entity: impl Into<String>, field: impl Into<String>) -> Self {
        Self { entity: entity.into(), field: field.into() }
    }

    /// Returns the entity identifier.
    #[must_use]
    pub fn entity(&self) -> &str {
        &self.entity
    }

    /// Returns the field identifier.
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}

impl fmt::Display for FieldContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.entity, self.field)
    }
}

/// The complete write bundle for one field value.
///
/// Everything the persistence layer needs to commit in a single
/// transaction: the encrypted payload, the equality index to store next
/// to it, and the token set destined for the token index store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtectedValue {
    /// `nonce ‖ ciphertext‖tag` payload.
    pub ciphertext: Vec<u8>,
    /// 16-byte deterministic equality tag.
    pub primary_index: PrimaryIndex,
    /// 12-byte deterministic n-gram tags; empty for binary values.
    pub token_hashes: BTreeSet<TokenHash>,
}

/// Encrypts, indexes, and queries one entity/field pair.
///
/// Both keys are materialized from the provider at construction, so a
/// misconfigured provider fails setup instead of failing per call. The
/// field itself is pure and re-entrant after that: every operation takes
/// its own value and returns a fresh result.
pub struct SearchableField {
    context: FieldContext,
    cipher: FieldCipher,
    indexer: BlindIndexer,
}

impl SearchableField {
    /// Creates a field with explicit cipher mode and n-gram size.
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot supply a key, a key has the
    /// wrong length, or the n-gram size is 0.
    pub fn new<P: KeyProvider>(
        provider: &P,
        context: FieldContext,
        mode: CipherMode,
        ngram_size: usize,
    ) -> Result<Self, Error> {
        let cipher = FieldCipher::new(provider.data_key()?, mode)?;
        let indexer = BlindIndexer::new(provider.index_key()?, ngram_size)?;
        Ok(Self { context, cipher, indexer })
    }

    /// Creates a field with the default cipher mode and n-gram size of 3.
    ///
    /// # Errors
    ///
    /// Returns error if the provider cannot supply a key or a key has
    /// the wrong length.
    pub fn with_defaults<P: KeyProvider>(
        provider: &P,
        context: FieldContext,
    ) -> Result<Self, Error> {
        Self::new(provider, context, CipherMode::default(), DEFAULT_NGRAM_SIZE)
    }

    /// Returns the field's context.
    #[must_use]
    pub const fn context(&self) -> &FieldContext {
        &self.context
    }

    /// Encrypts and indexes a value, returning the full write bundle.
    ///
    /// Text values are indexed over their normalized form; structured
    /// values over their canonical JSON text (so equality search works on
    /// them); binary values get a primary index over the raw bytes and an
    /// empty token set, since n-gram substring search over binary data is
    /// meaningless.
    ///
    /// # Errors
    ///
    /// Returns error if encoding, encryption, or derivation fails.
    pub fn protect(&self, value: &FieldValue) -> Result<ProtectedValue, Error> {
        let aad = self.context.to_string();
        let ciphertext = self.cipher.encrypt(value, Some(aad.as_bytes()))?;

        let (primary_index, token_hashes) = match value {
            FieldValue::Text(text) => {
                (self.indexer.primary(text)?, self.indexer.token_hashes(text)?)
            }
            FieldValue::Structured(json) => {
                let text = serde_json::to_string(json)
                    .map_err(|e| Error::EncodingFailed(e.to_string()))?;
                (self.indexer.primary(&text)?, self.indexer.token_hashes(&text)?)
            }
            FieldValue::Bytes(bytes) => (self.indexer.primary_bytes(bytes)?, BTreeSet::new()),
        };

        Ok(ProtectedValue { ciphertext, primary_index, token_hashes })
    }

    /// Decrypts a payload produced by [`protect`](Self::protect).
    ///
    /// # Returns
    ///
    /// The canonical plaintext bytes.
    ///
    /// # Errors
    ///
    /// Returns `Error::AuthenticationFailed` if the payload was tampered
    /// with, encrypted under another key, or belongs to a different
    /// field context; `Error::MalformedPayload` if it is structurally
    /// invalid.
    pub fn reveal(&self, payload: &[u8]) -> Result<Vec<u8>, Error> {
        let aad = self.context.to_string();
        self.cipher.decrypt(payload, Some(aad.as_bytes()))
    }

    /// Two-phase write: computes the full bundle, then applies the
    /// atomic token replace on the store.
    ///
    /// Returns the bundle so the caller can persist ciphertext and
    /// primary index in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns error if protection fails or the store rejects the
    /// replace; on a store error no partial token set was computed — the
    /// batch is all-or-nothing on the engine side.
    pub fn store_row<S: TokenIndexStore + ?Sized>(
        &self,
        store: &S,
        row: RowId,
        value: &FieldValue,
    ) -> Result<ProtectedValue, Error> {
        let protected = self.protect(value)?;
        store.replace_tokens(self.context.entity(), self.context.field(), row, &protected.token_hashes)?;
        Ok(protected)
    }

    /// Removes a row's tokens (row deleted, or field value cleared).
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the backend fails.
    pub fn remove_row<S: TokenIndexStore + ?Sized>(&self, store: &S, row: RowId) -> Result<(), Error> {
        store.delete_tokens(self.context.entity(), self.context.field(), row)
    }

    /// Builds an equality predicate for a query term.
    ///
    /// # Errors
    ///
    /// Returns error if index derivation fails.
    pub fn equals(&self, term: &str) -> Result<EqualityPredicate, Error> {
        query::equals(&self.indexer, term)
    }

    /// Builds a substring predicate for a query term.
    ///
    /// # Errors
    ///
    /// Returns error if index derivation fails.
    pub fn contains(&self, term: &str) -> Result<ContainsPredicate, Error> {
        query::contains(&self.indexer, term)
    }

    /// Substring search: returns candidate rows from the store.
    ///
    /// Candidates may include false positives and must be verified by
    /// decrypt-and-recheck where exactness matters.
    ///
    /// # Errors
    ///
    /// Returns error if derivation fails or the backend fails.
    pub fn find_containing<S: TokenIndexStore + ?Sized>(
        &self,
        store: &S,
        term: &str,
    ) -> Result<BTreeSet<RowId>, Error> {
        self.contains(term)?.candidate_rows(store, self.context.entity(), self.context.field())
    }
}

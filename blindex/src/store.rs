//! Token index store boundary.
//!
//! The store persists `(entity, field, row) → set of token hashes` and
//! answers reverse lookups. The storage technology is out of scope here;
//! this module fixes only the semantics a backend must provide, the most
//! important being the atomic replace: a write to a row-field's token set
//! is delete-all-then-insert-new applied so that no concurrent reader
//! ever observes a partially-updated set. The engine computes the full
//! token set before calling [`replace_tokens`](TokenIndexStore::replace_tokens)
//! and hands it over as one batch — never streamed — precisely so the
//! backend can make that replace atomic.

use crate::error::Error;
use crate::index::TokenHash;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

/// Identifier of a row within an entity.
pub type RowId = u64;

/// Persists and queries per-row token hash sets.
///
/// Membership is set semantics: storing a duplicate hash for a row is a
/// no-op for matching purposes. The stored set for a row must always
/// reflect the last successfully committed value of that field.
pub trait TokenIndexStore: Send + Sync {
    /// Atomically replaces the token set for one row-field.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the backend fails.
    fn replace_tokens(
        &self,
        entity: &str,
        field: &str,
        row: RowId,
        hashes: &BTreeSet<TokenHash>,
    ) -> Result<(), Error>;

    /// Removes all tokens for one row-field (row deleted or value cleared).
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the backend fails.
    fn delete_tokens(&self, entity: &str, field: &str, row: RowId) -> Result<(), Error>;

    /// Returns the rows whose token set contains `hash`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the backend fails.
    fn rows_with_hash(
        &self,
        entity: &str,
        field: &str,
        hash: &TokenHash,
    ) -> Result<BTreeSet<RowId>, Error>;

    /// Returns the rows whose token set contains at least `required` of
    /// the given hashes.
    ///
    /// `required == 0` or an empty hash set returns the empty set, not
    /// every row: a threshold query with nothing to match is treated as
    /// degenerate rather than vacuously true. [`crate::query`] never
    /// issues such a call (predicates clamp `required` to at least 1),
    /// but backends must implement the same behavior so direct callers
    /// see identical results everywhere.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the backend fails.
    fn rows_with_at_least(
        &self,
        entity: &str,
        field: &str,
        hashes: &BTreeSet<TokenHash>,
        required: usize,
    ) -> Result<BTreeSet<RowId>, Error>;
}

/// In-memory reference store.
///
/// A mutex-guarded map keyed by `(entity, field)`; the replace happens
/// entirely under the lock, which gives the atomic-replace guarantee a
/// transactional backend would provide. Suitable for tests and embedded
/// use, not for durable storage.
#[derive(Default)]
pub struct MemoryTokenStore {
    fields: Mutex<HashMap<(String, String), HashMap<RowId, BTreeSet<TokenHash>>>>,
}

impl MemoryTokenStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(
        &self,
    ) -> Result<
        std::sync::MutexGuard<'_, HashMap<(String, String), HashMap<RowId, BTreeSet<TokenHash>>>>,
        Error,
    > {
        self.fields.lock().map_err(|_| Error::Store("token store lock poisoned".to_string()))
    }
}

impl TokenIndexStore for MemoryTokenStore {
    fn replace_tokens(
        &self,
        entity: &str,
        field: &str,
        row: RowId,
        hashes: &BTreeSet<TokenHash>,
    ) -> Result<(), Error> {
        let mut fields = self.locked()?;
        fields
            .entry((entity.to_string(), field.to_string()))
            .or_default()
            .insert(row, hashes.clone());
        Ok(())
    }

    fn delete_tokens(&self, entity: &str, field: &str, row: RowId) -> Result<(), Error> {
        let mut fields = self.locked()?;
        if let Some(rows) = fields.get_mut(&(entity.to_string(), field.to_string())) {
            rows.remove(&row);
        }
        Ok(())
    }

    fn rows_with_hash(
        &self,
        entity: &str,
        field: &str,
        hash: &TokenHash,
    ) -> Result<BTreeSet<RowId>, Error> {
        let fields = self.locked()?;
        let Some(rows) = fields.get(&(entity.to_string(), field.to_string())) else {
            return Ok(BTreeSet::new());
        };
        Ok(rows.iter().filter(|(_, hashes)| hashes.contains(hash)).map(|(row, _)| *row).collect())
    }

    fn rows_with_at_least(
        &self,
        entity: &str,
        field: &str,
        hashes: &BTreeSet<TokenHash>,
        required: usize,
    ) -> Result<BTreeSet<RowId>, Error> {
        if hashes.is_empty() || required == 0 {
            return Ok(BTreeSet::new());
        }
        let fields = self.locked()?;
        let Some(rows) = fields.get(&(entity.to_string(), field.to_string())) else {
            return Ok(BTreeSet::new());
        };
        Ok(rows
            .iter()
            .filter(|(_, stored)| stored.intersection(hashes).count() >= required)
            .map(|(row, _)| *row)
            .collect())
    }
}

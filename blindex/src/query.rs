//! Query-side translation of plaintext search terms into index predicates.
//!
//! Both translations are pure, single-shot functions from a plaintext
//! term and the write-time index key to a predicate over stored indexes.
//! They share the derivation logic of [`crate::index`] byte for byte with
//! the write path — the only thing that keeps writes and reads consistent.

use crate::error::Error;
use crate::index::{BlindIndexer, PrimaryIndex, TokenHash};
use crate::store::{RowId, TokenIndexStore};
use std::collections::BTreeSet;

/// Translates an equality query term into a primary-index predicate.
///
/// # Errors
///
/// Returns error if index derivation fails.
pub fn equals(indexer: &BlindIndexer, term: &str) -> Result<EqualityPredicate, Error> {
    Ok(EqualityPredicate { primary: indexer.primary(term)? })
}

/// Translates a substring query term into a token-set predicate.
///
/// By default every n-gram of the query must appear in a row's stored
/// token set; relax with [`ContainsPredicate::with_required`] for fuzzy
/// matching.
///
/// # Errors
///
/// Returns error if index derivation fails.
pub fn contains(indexer: &BlindIndexer, term: &str) -> Result<ContainsPredicate, Error> {
    let hashes = indexer.token_hashes(term)?;
    let required = hashes.len();
    Ok(ContainsPredicate { hashes, required })
}

/// Predicate: "stored primary index equals this tag."
///
/// Matching is correctness-equivalent to plaintext equality after
/// normalization, modulo the negligible truncation-collision probability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EqualityPredicate {
    primary: PrimaryIndex,
}

impl EqualityPredicate {
    /// The tag to compare stored primary indexes against.
    #[must_use]
    pub const fn primary(&self) -> &PrimaryIndex {
        &self.primary
    }

    /// Whether a stored primary index satisfies this predicate.
    #[must_use]
    pub fn matches(&self, stored: &PrimaryIndex) -> bool {
        &self.primary == stored
    }
}

/// Predicate: "stored token set contains at least `required` of these
/// hashes."
///
/// This is a necessary-but-not-sufficient filter. It returns *candidate*
/// rows: hash collisions, or query n-grams appearing in a row in a
/// different order or context than the literal substring, can produce
/// false positives. A caller that needs exactness must decrypt the
/// candidates and re-check the plaintext. It never produces false
/// negatives for well-formed data: a row whose value literally contains
/// the query substring carries all of that substring's n-gram tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainsPredicate {
    hashes: BTreeSet<TokenHash>,
    required: usize,
}

impl ContainsPredicate {
    /// The query-derived token hashes.
    #[must_use]
    pub const fn hashes(&self) -> &BTreeSet<TokenHash> {
        &self.hashes
    }

    /// How many of the hashes a row must carry to match.
    #[must_use]
    pub const fn required(&self) -> usize {
        self.required
    }

    /// Relaxes (or restores) the match threshold.
    ///
    /// Clamped to `1..=hashes.len()` so the predicate can be neither
    /// vacuous nor unsatisfiable.
    #[must_use]
    pub fn with_required(mut self, required: usize) -> Self {
        self.required = required.clamp(1, self.hashes.len().max(1));
        self
    }

    /// Whether a stored token set satisfies this predicate.
    #[must_use]
    pub fn matches(&self, stored: &BTreeSet<TokenHash>) -> bool {
        self.hashes.intersection(stored).count() >= self.required
    }

    /// Evaluates the predicate against a store, returning candidate rows.
    ///
    /// # Errors
    ///
    /// Returns `Error::Store` if the backend fails.
    pub fn candidate_rows<S: TokenIndexStore + ?Sized>(
        &self,
        store: &S,
        entity: &str,
        field: &str,
    ) -> Result<BTreeSet<RowId>, Error> {
        store.rows_with_at_least(entity, field, &self.hashes, self.required)
    }
}

//! # `blindex`
//!
//! Searchable field-level encryption: values are stored encrypted at
//! rest while equality and substring search remain possible without
//! decrypting every row.
//!
//! ## How it works
//!
//! Write path: plaintext → [`normalize`](normalize::normalize) →
//! authenticated encryption plus two deterministic HMAC derivations — a
//! 16-byte primary equality index and a set of 12-byte n-gram token
//! hashes — all handed back as one bundle for the caller's persistence
//! layer. Read path: the query term goes through the identical
//! normalization and derivation, producing a predicate over the stored
//! indexes. Substring queries return *candidate* rows that may need a
//! decrypt-and-verify pass.
//!
//! ## Security model
//!
//! **Deterministic leakage is deliberate.** The primary index and token
//! hashes are deterministic so that search works at all; this necessarily
//! reveals equality patterns (which rows share a value) and n-gram
//! frequency patterns to anyone who can read the index store. Do not
//! "fix" this by randomizing the index — that removes searchability.
//! Access patterns (timing, result volume) are not hidden either.
//!
//! Two independent 256-bit secrets are required: a data key (encryption
//! only) and an index key (HMAC derivation only). Reusing one for the
//! other collapses the separation between "can decrypt" and "can search".
//!
//! ## Example
//!
//! ```rust,ignore
//! use blindex::prelude::*;
//!
//! let provider = StaticKeyProvider::from_env()?;
//! let field = SearchableField::with_defaults(&provider, FieldContext::new("users", "email"))?;
//! let store = MemoryTokenStore::new();
//!
//! let bundle = field.store_row(&store, 1, &FieldValue::from("alice@example.com"))?;
//! // persist bundle.ciphertext and bundle.primary_index alongside the row
//!
//! let candidates = field.find_containing(&store, "example")?;
//! ```

#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cipher;
pub mod error;
pub mod field;
pub mod index;
pub mod key_provider;
pub mod normalize;
pub mod query;
pub mod store;

pub mod prelude {
    //! Convenience re-exports for common use.
    pub use crate::cipher::{CipherMode, FieldCipher, FieldValue};
    pub use crate::error::{Error, KeyProviderError};
    pub use crate::field::{FieldContext, ProtectedValue, SearchableField};
    pub use crate::index::{BlindIndexer, PrimaryIndex, TokenHash};
    pub use crate::key_provider::KeyProvider;
    pub use crate::query::{ContainsPredicate, EqualityPredicate};
    pub use crate::store::{MemoryTokenStore, RowId, TokenIndexStore};
}

//! Text canonicalization applied before any cryptographic derivation.
//!
//! Every index derivation — write path and query path alike — must go
//! through [`normalize`]. Mismatched normalization between the two paths
//! silently breaks search, so the transformation lives in exactly one
//! function and nothing else in the crate calls the normalization
//! primitives directly.

use unicode_normalization::UnicodeNormalization;

/// Canonicalizes text: Unicode NFKC normalization, then lowercase.
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`. Inputs that are
/// equal under normalization always derive equal indexes.
///
/// # Example
///
/// ```
/// use blindex::normalize::normalize;
///
/// assert_eq!(normalize("Café"), "café");
/// assert_eq!(normalize("CAFÉ"), "café");
/// ```
#[must_use]
pub fn normalize(value: &str) -> String {
    value.nfkc().collect::<String>().to_lowercase()
}

//! Integration tests for the full write/query paths.

use blindex::index::ngrams;
use blindex::normalize::normalize;
use blindex::prelude::*;
use blindex_key_env::StaticKeyProvider;
use proptest::prelude::*;
use secrecy::SecretVec;
use std::collections::HashSet;

fn provider() -> StaticKeyProvider {
    StaticKeyProvider::new(vec![0x41; 32], vec![0x42; 32]).expect("valid keys")
}

#[test]
fn test_end_to_end_write_and_search() {
    let provider = provider();
    let field = SearchableField::with_defaults(&provider, FieldContext::new("users", "email"))
        .expect("field setup");
    let store = MemoryTokenStore::new();

    let values: [(RowId, &str); 3] = [
        (1, "alice@example.com"),
        (2, "bob@sample.net"),
        (3, "Carol@Example.ORG"),
    ];

    let mut bundles = Vec::new();
    for (row, value) in values {
        bundles.push((row, value, field.store_row(&store, row, &FieldValue::from(value)).unwrap()));
    }

    // Substring: candidate rows, then decrypt-and-verify for exactness
    let candidates = field.find_containing(&store, "example").unwrap();
    assert_eq!(candidates, [1, 3].into());

    for (row, value, bundle) in &bundles {
        if candidates.contains(row) {
            let plaintext = field.reveal(&bundle.ciphertext).unwrap();
            let text = String::from_utf8(plaintext).unwrap();
            assert!(normalize(&text).contains("example"), "false positive for {value}");
        }
    }

    // Equality: query-side tag equals the write-side tag after normalization
    let predicate = field.equals("carol@example.org").unwrap();
    let stored: Vec<_> =
        bundles.iter().filter(|(_, _, b)| predicate.matches(&b.primary_index)).collect();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].0, 3);
}

#[test]
fn test_cafe_scenario() {
    // Key of 32 zero bytes, value "Café", n = 3
    let indexer = BlindIndexer::with_default_ngram_size(SecretVec::new(vec![0u8; 32])).unwrap();

    assert_eq!(normalize("Café"), "café");
    assert_eq!(ngrams("café", 3), vec!["caf", "afé"]);

    let write_hashes = indexer.token_hashes("Café").unwrap();
    assert_eq!(write_hashes.len(), 2);
    for hash in &write_hashes {
        assert_eq!(hash.len(), 12);
    }

    // An equality query with "CAFÉ" normalizes identically and reuses
    // the same tokens and the same primary index as the original insert
    assert_eq!(indexer.token_hashes("CAFÉ").unwrap(), write_hashes);
    assert_eq!(indexer.primary("CAFÉ").unwrap(), indexer.primary("Café").unwrap());
}

#[test]
fn test_short_value_scenario() {
    let provider = provider();
    let field = SearchableField::with_defaults(&provider, FieldContext::new("users", "name"))
        .expect("field setup");
    let store = MemoryTokenStore::new();

    // "Al" with n = 3: single whole-value token, not an error
    assert_eq!(ngrams(&normalize("Al"), 3), vec!["al"]);
    let bundle = field.store_row(&store, 1, &FieldValue::from("Al")).unwrap();
    assert_eq!(bundle.token_hashes.len(), 1);

    // A query for "z" derives a disjoint token set and matches no rows
    assert!(field.find_containing(&store, "z").unwrap().is_empty());

    // The short value is findable only by whole-value match on its token
    assert_eq!(field.find_containing(&store, "al").unwrap(), [1].into());
}

#[test]
fn test_nonce_uniqueness_sample() {
    let cipher = FieldCipher::new(SecretVec::new(vec![9u8; 32]), CipherMode::default()).unwrap();
    let value = FieldValue::from("x");

    let mut nonces = HashSet::new();
    for _ in 0..10_000 {
        let payload = cipher.encrypt(&value, None).unwrap();
        let nonce: [u8; 12] = payload[..12].try_into().unwrap();
        assert!(nonces.insert(nonce), "nonce collision in 10k sample");
    }
}

#[test]
fn test_tamper_detection_bit_positions() {
    let cipher = FieldCipher::new(SecretVec::new(vec![9u8; 32]), CipherMode::default()).unwrap();
    let payload = cipher.encrypt(&FieldValue::from("tamper target"), None).unwrap();

    // One flipped bit anywhere in the payload must fail authentication;
    // sweep every bit of a representative sample of byte positions
    for byte_index in [0, 5, 11, 12, 20, payload.len() - 17, payload.len() - 16, payload.len() - 1]
    {
        for bit in 0..8 {
            let mut corrupted = payload.clone();
            corrupted[byte_index] ^= 1 << bit;
            assert!(
                matches!(cipher.decrypt(&corrupted, None), Err(Error::AuthenticationFailed)),
                "flip of byte {byte_index} bit {bit} went undetected"
            );
        }
    }
}

#[test]
fn test_round_trip_returns_canonical_encoding() {
    let cipher = FieldCipher::new(SecretVec::new(vec![9u8; 32]), CipherMode::default()).unwrap();

    let value = FieldValue::Structured(serde_json::json!({"name": "Ada", "age": 36}));
    let payload = cipher.encrypt(&value, None).unwrap();

    assert_eq!(cipher.decrypt(&payload, None).unwrap(), value.canonical_bytes().unwrap());
}

proptest! {
    #[test]
    fn prop_normalize_idempotent(value in "\\PC*") {
        let once = normalize(&value);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn prop_primary_equality_iff_normalized_equality(a in "\\PC{0,24}", b in "\\PC{0,24}") {
        let indexer =
            BlindIndexer::with_default_ngram_size(SecretVec::new(vec![3u8; 32])).unwrap();
        let equal_normalized = normalize(&a) == normalize(&b);
        let equal_primary = indexer.primary(&a).unwrap() == indexer.primary(&b).unwrap();
        prop_assert_eq!(equal_normalized, equal_primary);
    }

    #[test]
    fn prop_derivation_deterministic(value in "\\PC{0,32}") {
        let indexer =
            BlindIndexer::with_default_ngram_size(SecretVec::new(vec![3u8; 32])).unwrap();
        prop_assert_eq!(indexer.primary(&value).unwrap(), indexer.primary(&value).unwrap());
        prop_assert_eq!(
            indexer.token_hashes(&value).unwrap(),
            indexer.token_hashes(&value).unwrap()
        );
    }

    #[test]
    fn prop_substring_no_false_negatives(
        value in "[a-z]{3,24}",
        start in 0usize..20,
        len in 3usize..8,
    ) {
        let indexer =
            BlindIndexer::with_default_ngram_size(SecretVec::new(vec![3u8; 32])).unwrap();

        let start = start.min(value.len().saturating_sub(3));
        let end = (start + len).min(value.len());
        let substring = &value[start..end];

        let value_hashes = indexer.token_hashes(&value).unwrap();
        let query_hashes = indexer.token_hashes(substring).unwrap();
        prop_assert!(query_hashes.is_subset(&value_hashes));
    }

    #[test]
    fn prop_encrypt_round_trip(plaintext in proptest::collection::vec(any::<u8>(), 0..256)) {
        let cipher =
            FieldCipher::new(SecretVec::new(vec![9u8; 32]), CipherMode::default()).unwrap();
        let payload = cipher.encrypt(&FieldValue::Bytes(plaintext.clone()), None).unwrap();
        prop_assert_eq!(cipher.decrypt(&payload, None).unwrap(), plaintext);
    }
}

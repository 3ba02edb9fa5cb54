//! End-to-end demo: encrypt, index, and search a field.

use blindex::prelude::*;
use blindex_key_env::StaticKeyProvider;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Two independent 256-bit secrets: one for encryption, one for indexes
    let provider = StaticKeyProvider::new(vec![0x11; 32], vec![0x22; 32])?;

    let field = SearchableField::with_defaults(&provider, FieldContext::new("users", "email"))?;
    let store = MemoryTokenStore::new();

    // Write path: one bundle per row, tokens handed to the store as a batch
    let rows: [(RowId, &str); 3] = [
        (1, "alice@example.com"),
        (2, "bob@sample.net"),
        (3, "carol@example.org"),
    ];
    for (row, email) in rows {
        let bundle = field.store_row(&store, row, &FieldValue::from(email))?;
        println!(
            "row {row}: {} ciphertext bytes, {} tokens",
            bundle.ciphertext.len(),
            bundle.token_hashes.len()
        );
        // A real persistence layer would now commit bundle.ciphertext and
        // bundle.primary_index in the same transaction.
    }

    // Equality query: deterministic tag comparison, case-insensitive
    let alice = field.protect(&FieldValue::from("alice@example.com"))?;
    let predicate = field.equals("Alice@EXAMPLE.com")?;
    println!("equality match: {}", predicate.matches(&alice.primary_index));

    // Substring query: candidate rows, verify by decrypting if exactness matters
    let candidates = field.find_containing(&store, "example")?;
    println!("rows containing \"example\": {candidates:?}");

    let decrypted = field.reveal(&alice.ciphertext)?;
    println!("decrypted row 1: {}", String::from_utf8_lossy(&decrypted));

    Ok(())
}

//! `blindex` CLI for key generation and offline index derivation.

#![warn(clippy::pedantic, clippy::nursery)]

use aes_gcm::aead::{rand_core::RngCore, OsRng};
use anyhow::Context;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use blindex::index::{BlindIndexer, DEFAULT_NGRAM_SIZE};
use blindex::key_provider::KEY_SIZE;
use blindex_key_env::INDEX_KEY_VAR;
use clap::{Parser, Subcommand};
use secrecy::SecretVec;

#[derive(Parser)]
#[command(name = "blindex")]
#[command(about = "blindex key generation and index derivation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a fresh data/index key pair
    Keygen,
    /// Derive the primary index and token hashes for a value
    ///
    /// Uses --index-key when given, otherwise BLINDEX_INDEX_KEY from the
    /// environment. Useful for debugging stored indexes without touching
    /// the data key.
    Derive {
        /// The plaintext value to derive indexes for
        value: String,
        /// Base64-encoded 32-byte index key
        #[arg(long)]
        index_key: Option<String>,
        /// N-gram window length
        #[arg(short = 'n', long, default_value_t = DEFAULT_NGRAM_SIZE)]
        ngram_size: usize,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Keygen => keygen(),
        Commands::Derive { value, index_key, ngram_size } => {
            derive(&value, index_key.as_deref(), ngram_size)
        }
    }
}

fn keygen() -> anyhow::Result<()> {
    let mut data_key = [0u8; KEY_SIZE];
    let mut index_key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut data_key);
    OsRng.fill_bytes(&mut index_key);

    println!("export BLINDEX_DATA_KEY=\"{}\"", STANDARD.encode(data_key));
    println!("export BLINDEX_INDEX_KEY=\"{}\"", STANDARD.encode(index_key));
    Ok(())
}

fn derive(value: &str, index_key: Option<&str>, ngram_size: usize) -> anyhow::Result<()> {
    let encoded = match index_key {
        Some(key) => key.to_string(),
        None => std::env::var(INDEX_KEY_VAR)
            .with_context(|| format!("no --index-key given and {INDEX_KEY_VAR} is unset"))?,
    };
    let key = STANDARD.decode(encoded.trim()).context("index key is not valid base64")?;

    let indexer = BlindIndexer::new(SecretVec::new(key), ngram_size)?;

    let primary = indexer.primary(value)?;
    println!("primary: {}", hex::encode(primary));

    for hash in indexer.token_hashes(value)? {
        println!("token:   {}", hex::encode(hash));
    }
    Ok(())
}

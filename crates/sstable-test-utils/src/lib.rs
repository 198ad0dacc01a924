//! Test utilities for sstable
//!
//! Provides seeded random dictionaries, scratch directories, and log setup for
//! tests and benchmarks.

use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};
use sstable_core::Dictionary;
use std::collections::HashSet;
use std::ops::Range;
use std::path::PathBuf;
use tempfile::TempDir;

/// Environment variable naming the parent directory for scratch tables
pub const TEST_DIR_ENV: &str = "SSTABLE_TEST_DIR";

/// Key length range used by [`random_dictionary`] defaults
pub const DEFAULT_KEY_LEN: Range<usize> = 20..1000;

/// Value length range used by [`random_dictionary`] defaults
pub const DEFAULT_VALUE_LEN: Range<usize> = 20..1000;

/// Shape of a generated dictionary
#[derive(Debug, Clone)]
pub struct DictionaryShape {
    /// Number of distinct keys
    pub entries: usize,
    /// Key lengths, in bytes
    pub key_len: Range<usize>,
    /// Value lengths, in bytes
    pub value_len: Range<usize>,
    /// RNG seed; equal seeds give equal dictionaries
    pub seed: u64,
}

impl DictionaryShape {
    /// `entries` pairs with the default length ranges
    pub fn new(entries: usize, seed: u64) -> Self {
        Self {
            entries,
            key_len: DEFAULT_KEY_LEN,
            value_len: DEFAULT_VALUE_LEN,
            seed,
        }
    }

    /// Set the key length range
    #[must_use]
    pub fn with_key_len(mut self, key_len: Range<usize>) -> Self {
        self.key_len = key_len;
        self
    }

    /// Set the value length range
    #[must_use]
    pub fn with_value_len(mut self, value_len: Range<usize>) -> Self {
        self.value_len = value_len;
        self
    }

    /// Generate the dictionary
    pub fn build(&self) -> Dictionary {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut seen = HashSet::with_capacity(self.entries);
        let mut dict = Dictionary::with_capacity(self.entries);

        while dict.len() < self.entries {
            let key = random_bytes(&mut rng, &self.key_len);
            if !seen.insert(key.clone()) {
                continue;
            }
            let value = random_bytes(&mut rng, &self.value_len);
            dict.insert(key, value);
        }

        dict
    }
}

/// `entries` random pairs with distinct keys, in generation order
///
/// Key and value lengths are drawn from 20..1000 bytes.
pub fn random_dictionary(entries: usize, seed: u64) -> Dictionary {
    DictionaryShape::new(entries, seed).build()
}

/// Random key guaranteed not to be in `dict`
pub fn absent_key(dict: &Dictionary, seed: u64) -> Vec<u8> {
    let keys: HashSet<&[u8]> = dict.iter().map(|kv| kv.key.as_slice()).collect();
    let mut rng = StdRng::seed_from_u64(seed);

    loop {
        let key = random_bytes(&mut rng, &DEFAULT_KEY_LEN);
        if !keys.contains(key.as_slice()) {
            return key;
        }
    }
}

fn random_bytes(rng: &mut StdRng, len: &Range<usize>) -> Vec<u8> {
    let n = if len.is_empty() {
        len.start
    } else {
        rng.random_range(len.clone())
    };
    let mut bytes = vec![0u8; n];
    rng.fill(&mut bytes[..]);
    bytes
}

/// Create a scratch directory for table files
///
/// Placed under `$SSTABLE_TEST_DIR` when set (`~` is expanded), otherwise in
/// the system temp directory. Removed when the returned guard drops.
pub fn scratch_dir() -> std::io::Result<TempDir> {
    match scratch_root() {
        Some(root) => {
            std::fs::create_dir_all(&root)?;
            tempfile::Builder::new().prefix("sstable-").tempdir_in(root)
        }
        None => tempfile::Builder::new().prefix("sstable-").tempdir(),
    }
}

fn scratch_root() -> Option<PathBuf> {
    let raw = std::env::var(TEST_DIR_ENV).ok()?;
    if raw.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(shellexpand::tilde(&raw).to_string()))
}

/// Install a test log subscriber honoring `RUST_LOG`
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

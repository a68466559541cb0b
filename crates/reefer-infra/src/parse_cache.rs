//! Content-addressed cache of parsed spreadsheets
//!
//! Entries are keyed by the SHA-256 of the file bytes plus the header
//! keyword, so a file name reused with different content never hits a stale
//! entry.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use reefer_types::Result;

/// Hex SHA-256 of a byte buffer
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CacheKey {
    hash: String,
    keyword: String,
}

/// In-memory parse results for the lifetime of one run
#[derive(Debug, Default)]
pub struct ParseCache<V> {
    entries: HashMap<CacheKey, V>,
    hits: usize,
}

impl<V: Clone> ParseCache<V> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
        }
    }

    pub fn get(&self, bytes: &[u8], keyword: &str) -> Option<&V> {
        self.entries.get(&key(bytes, keyword))
    }

    /// Cached value for `(bytes, keyword)`, computing and storing it on a miss.
    /// Failed parses are not cached.
    pub fn get_or_try_insert_with<F>(&mut self, bytes: &[u8], keyword: &str, parse: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        let key = key(bytes, keyword);
        if let Some(value) = self.entries.get(&key) {
            self.hits += 1;
            log::debug!("parse cache hit {}", &key.hash[..12]);
            return Ok(value.clone());
        }
        let value = parse()?;
        self.entries.insert(key, value.clone());
        Ok(value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> usize {
        self.hits
    }
}

fn key(bytes: &[u8], keyword: &str) -> CacheKey {
    CacheKey {
        hash: content_hash(bytes),
        keyword: keyword.to_string(),
    }
}

//! Content-addressed embedding cache (§4.2, §6.3 `embedding_cache`).
//!
//! Cache key is `sha256(text ∥ model_id ∥ dims)` so a model upgrade or a
//! dimension change (Matryoshka truncation width) never collides with a
//! stale entry from a different configuration.

use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};

/// Default cache entry lifetime, mirrored from `Config::embedding_cache_ttl_days`.
pub const DEFAULT_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub vector: Vec<f32>,
    pub created_at: DateTime<Utc>,
}

pub fn cache_key(text: &str, model_id: &str, dims: usize) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(b"\0");
    hasher.update(model_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(dims.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// In-memory embedding cache; the storage layer persists entries to
/// `embedding_cache` and rehydrates this on startup, but lookups during a
/// single process's lifetime never have to touch SQLite.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    entries: std::collections::HashMap<String, CacheEntry>,
    ttl_days: i64,
}

impl EmbeddingCache {
    pub fn new(ttl_days: i64) -> Self {
        Self { entries: std::collections::HashMap::new(), ttl_days }
    }

    pub fn get(&self, text: &str, model_id: &str, dims: usize) -> Option<Vec<f32>> {
        let key = cache_key(text, model_id, dims);
        let entry = self.entries.get(&key)?;
        let age = Utc::now() - entry.created_at;
        if age > Duration::days(self.ttl_days) {
            return None;
        }
        Some(entry.vector.clone())
    }

    pub fn put(&mut self, text: &str, model_id: &str, dims: usize, vector: Vec<f32>) {
        let key = cache_key(text, model_id, dims);
        self.entries.insert(key, CacheEntry { vector, created_at: Utc::now() });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

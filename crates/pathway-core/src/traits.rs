use std::future::Future;
use std::time::Duration;

use crate::types::{Document, VectorMatch};

/// Turns text into a vector. Failures are opaque upstream failures.
pub trait EmbeddingProvider: Send + Sync {
    /// Stable identifier for the provider/model (e.g. `hash:xxh64:d384`).
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed(&self, text: &str) -> impl Future<Output = anyhow::Result<Vec<f32>>> + Send;
}

/// Nearest-neighbour lookup over stored embeddings.
pub trait VectorStore: Send + Sync {
    /// Returns at most `max_count` rows with `similarity >= threshold`, best first.
    fn query(
        &self,
        embedding: &[f32],
        threshold: f32,
        max_count: usize,
    ) -> impl Future<Output = anyhow::Result<Vec<VectorMatch>>> + Send;
}

/// Case-insensitive substring lookup over stored titles and contents.
pub trait KeywordStore: Send + Sync {
    fn search_text(
        &self,
        query: &str,
        max_count: usize,
    ) -> impl Future<Output = anyhow::Result<Vec<Document>>> + Send;
}

/// Key/value store with per-entry time-to-live.
///
/// `get` returns `None` for missing or expired keys; `set` overwrites.
pub trait CacheStore<V>: Send + Sync {
    fn get(&self, key: &str) -> Option<V>;
    fn set(&self, key: &str, value: V, ttl: Duration);
}

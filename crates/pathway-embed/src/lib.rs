//! pathway-embed
//!
//! Development embedder and vector helpers. Production embeddings come from an
//! external provider behind `pathway_core::traits::EmbeddingProvider`; the
//! hashing embedder here is deterministic and model-free, for local runs and
//! tests.
use anyhow::{anyhow, Result};
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use pathway_core::traits::EmbeddingProvider;

mod pool;

pub use pool::{cosine_similarity, l2_normalize};

pub const DEFAULT_DIM: usize = 384;

/// Bag-of-tokens embedder: each lowercased token is hashed into a bucket.
/// Texts sharing tokens land close together; identical texts embed identically.
pub struct HashEmbedder { dim: usize, id: String }

impl HashEmbedder {
    pub fn new(dim: usize) -> Self { Self { dim, id: format!("hash:xxh64:d{}", dim) } }

    pub fn embed_sync(&self, text: &str) -> Result<Vec<f32>> {
        if self.dim == 0 { return Err(anyhow!("embedding dimension must be positive")); }
        let mut v = vec![0f32; self.dim];
        for token in text.split(|c: char| !c.is_alphanumeric()).filter(|t| !t.is_empty()) {
            let mut hasher = XxHash64::with_seed(0);
            token.to_lowercase().hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            v[idx] += 1.0 + (((h >> 32) as u32) as f32) / (u32::MAX as f32) * 0.1;
        }
        l2_normalize(&mut v);
        Ok(v)
    }
}

impl Default for HashEmbedder {
    fn default() -> Self { Self::new(DEFAULT_DIM) }
}

impl EmbeddingProvider for HashEmbedder {
    fn embedder_id(&self) -> &str { &self.id }
    fn dim(&self) -> usize { self.dim }
    async fn embed(&self, text: &str) -> Result<Vec<f32>> { self.embed_sync(text) }
}

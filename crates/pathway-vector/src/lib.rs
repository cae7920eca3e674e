//! pathway-vector
//!
//! In-memory vector store with exact cosine scoring. Suitable for development
//! corpora and tests; production deployments back `VectorStore` with a
//! managed index.
use anyhow::{anyhow, Result};
use parking_lot::RwLock;

use pathway_core::traits::{EmbeddingProvider, VectorStore};
use pathway_core::types::{Document, Meta, VectorMatch, META_TITLE, META_URL};
use pathway_embed::cosine_similarity;

#[derive(Debug, Clone)]
struct VectorRow { id: String, content: String, metadata: Meta, vector: Vec<f32> }

#[derive(Debug, Default)]
pub struct MemoryVectorStore { dim: Option<usize>, rows: RwLock<Vec<VectorRow>> }

impl MemoryVectorStore {
    pub fn new() -> Self { Self::default() }

    /// A store that rejects vectors whose length differs from `dim`.
    pub fn with_dim(dim: usize) -> Self { Self { dim: Some(dim), rows: RwLock::new(Vec::new()) } }

    pub fn len(&self) -> usize { self.rows.read().len() }

    pub fn is_empty(&self) -> bool { self.rows.read().is_empty() }

    /// Inserts or replaces the row for `doc.id`. `title` and `url` are folded
    /// into metadata so query results can surface them.
    pub fn upsert(&self, doc: &Document, vector: Vec<f32>) -> Result<()> {
        if let Some(dim) = self.dim {
            if vector.len() != dim { return Err(anyhow!("vector for '{}' has dim {}, expected {}", doc.id, vector.len(), dim)); }
        }
        let mut metadata = doc.metadata.clone();
        if !doc.title.is_empty() { metadata.entry(META_TITLE.to_string()).or_insert_with(|| doc.title.clone()); }
        if let Some(url) = &doc.url { metadata.entry(META_URL.to_string()).or_insert_with(|| url.clone()); }
        let row = VectorRow { id: doc.id.clone(), content: doc.content.clone(), metadata, vector };
        let mut rows = self.rows.write();
        match rows.iter_mut().find(|r| r.id == row.id) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
        Ok(())
    }

    /// Embeds each document's title and content with `embedder` and upserts it.
    pub async fn index_documents<E: EmbeddingProvider>(&self, embedder: &E, docs: &[Document]) -> Result<usize> {
        for doc in docs {
            let vector = embedder.embed(&embedding_text(doc)).await?;
            self.upsert(doc, vector)?;
        }
        tracing::info!(count = docs.len(), embedder = embedder.embedder_id(), "indexed documents into vector store");
        Ok(docs.len())
    }

    fn score(&self, embedding: &[f32], threshold: f32, max_count: usize) -> Vec<VectorMatch> {
        let rows = self.rows.read();
        let mut hits: Vec<VectorMatch> = rows
            .iter()
            .map(|r| (r, cosine_similarity(embedding, &r.vector)))
            .filter(|(_, s)| *s >= threshold)
            .map(|(r, s)| VectorMatch { id: r.id.clone(), content: r.content.clone(), metadata: r.metadata.clone(), similarity: s.clamp(0.0, 1.0) })
            .collect();
        hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        hits.truncate(max_count);
        hits
    }
}

/// Text embedded for a document: title and content joined by a newline.
pub fn embedding_text(doc: &Document) -> String {
    if doc.title.is_empty() { doc.content.clone() } else { format!("{}\n{}", doc.title, doc.content) }
}

impl VectorStore for MemoryVectorStore {
    async fn query(&self, embedding: &[f32], threshold: f32, max_count: usize) -> Result<Vec<VectorMatch>> {
        if let Some(dim) = self.dim {
            if embedding.len() != dim { return Err(anyhow!("query vector has dim {}, expected {}", embedding.len(), dim)); }
        }
        Ok(self.score(embedding, threshold, max_count))
    }
}

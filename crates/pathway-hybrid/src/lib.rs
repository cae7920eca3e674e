//! pathway-hybrid
//!
//! Merges vector-similarity retrieval with keyword fallback under a TTL cache.
//! See `HybridSearchEngine::search` for the pipeline and `endpoint` for the
//! request/response surface.
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use pathway_core::config::Settings;
use pathway_core::error::{Error, Result};
use pathway_core::traits::{CacheStore, EmbeddingProvider, KeywordStore, VectorStore};
use pathway_core::types::{SearchFilter, SearchResult};

pub mod endpoint;
pub mod fingerprint;

pub use endpoint::{ErrorBody, SearchRequest, SearchResponse};
pub use fingerprint::{normalize_query, SearchFingerprint};

pub type ResultCache = Arc<dyn CacheStore<Vec<SearchResult>>>;

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub vector_threshold: f32,
    pub vector_max_candidates: usize,
    pub keyword_max_hits: usize,
    pub default_limit: usize,
    pub cache_ttl: Duration,
    pub fingerprint_prefix_chars: usize,
}

impl Default for SearchOptions {
    fn default() -> Self { Self::from(&Settings::default()) }
}

impl From<&Settings> for SearchOptions {
    fn from(s: &Settings) -> Self {
        Self {
            vector_threshold: s.search.vector_threshold,
            vector_max_candidates: s.search.vector_max_candidates,
            keyword_max_hits: s.search.keyword_max_hits,
            default_limit: s.search.default_limit,
            cache_ttl: Duration::from_secs(s.cache.ttl_secs),
            fingerprint_prefix_chars: s.cache.fingerprint_prefix_chars,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub results: Vec<SearchResult>,
    pub from_cache: bool,
}

pub struct HybridSearchEngine<E, V, K> where E: EmbeddingProvider, V: VectorStore, K: KeywordStore {
    embedder: E,
    vector: V,
    keyword: K,
    cache: ResultCache,
    options: SearchOptions,
}

impl<E, V, K> HybridSearchEngine<E, V, K> where E: EmbeddingProvider, V: VectorStore, K: KeywordStore {
    pub fn new(embedder: E, vector: V, keyword: K, cache: ResultCache) -> Self {
        Self::with_options(embedder, vector, keyword, cache, SearchOptions::default())
    }

    pub fn with_options(embedder: E, vector: V, keyword: K, cache: ResultCache, options: SearchOptions) -> Self {
        Self { embedder, vector, keyword, cache, options }
    }

    pub fn options(&self) -> &SearchOptions { &self.options }
    pub fn embedder(&self) -> &E { &self.embedder }
    pub fn vector_store(&self) -> &V { &self.vector }
    pub fn keyword_store(&self) -> &K { &self.keyword }

    pub async fn search(&self, query: &str, filter: &SearchFilter, limit: usize) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() { return Err(Error::Validation("query must not be empty".to_string())); }
        if limit == 0 { return Err(Error::Validation("limit must be at least 1".to_string())); }

        let key = SearchFingerprint::new(query, filter, limit, self.options.fingerprint_prefix_chars);
        if let Some(results) = self.cache.get(key.as_str()) {
            tracing::debug!(key = %key, count = results.len(), "search cache hit");
            return Ok(SearchOutcome { results, from_cache: true });
        }
        tracing::debug!(key = %key, "search cache miss");

        // Branches see the same normalized text the fingerprint is built from.
        let query = normalize_query(query);
        let (dense, keyword) = futures::join!(self.vector_branch(&query, filter), self.keyword_branch(&query, filter));
        let dense = dense?;
        let (dense_count, keyword_count) = (dense.len(), keyword.len());

        let mut merged = merge_results(dense, keyword);
        rank_results(&mut merged);
        merged.truncate(limit);

        self.cache.set(key.as_str(), merged.clone(), self.options.cache_ttl);
        tracing::info!(dense = dense_count, keyword = keyword_count, returned = merged.len(), "hybrid search completed");
        Ok(SearchOutcome { results: merged, from_cache: false })
    }

    async fn vector_branch(&self, query: &str, filter: &SearchFilter) -> Result<Vec<SearchResult>> {
        let embedding = self.embedder.embed(query).await.map_err(|e| Error::upstream("embedding request failed", e))?;
        let matches = self.vector
            .query(&embedding, self.options.vector_threshold, self.options.vector_max_candidates)
            .await
            .map_err(|e| Error::upstream("vector store query failed", e))?;
        Ok(matches.into_iter().filter(|m| filter.matches(&m.metadata)).map(SearchResult::from_vector).collect())
    }

    async fn keyword_branch(&self, query: &str, filter: &SearchFilter) -> Vec<SearchResult> {
        match self.keyword.search_text(query, self.options.keyword_max_hits).await {
            Ok(docs) => docs.into_iter().filter(|d| filter.matches(&d.metadata)).map(SearchResult::from_keyword).collect(),
            Err(e) => {
                tracing::warn!(error = %e, "keyword search failed; continuing with vector results only");
                vec![]
            }
        }
    }
}

/// Vector rows first, then keyword rows whose id is not yet present.
/// Within each branch the first occurrence of an id wins.
pub fn merge_results(dense: Vec<SearchResult>, keyword: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut seen: HashSet<String> = HashSet::with_capacity(dense.len() + keyword.len());
    let mut merged = Vec::with_capacity(dense.len() + keyword.len());
    for r in dense.into_iter().chain(keyword) {
        if seen.insert(r.id.clone()) { merged.push(r); }
    }
    merged
}

/// Stable descending sort by similarity; equal scores keep merge order.
/// `total_cmp` keeps the order total even if a NaN slips through.
pub fn rank_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
}

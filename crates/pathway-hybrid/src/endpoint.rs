use serde::{Deserialize, Serialize};

use pathway_core::error::Error;
use pathway_core::traits::{EmbeddingProvider, KeywordStore, VectorStore};
use pathway_core::types::{SearchFilter, SearchResult};

use crate::HybridSearchEngine;

/// Body of a search request. `query` is optional here so that a missing
/// query surfaces as a validation error rather than a decode error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, rename = "type")]
    pub type_filter: Option<String>,
    #[serde(default, rename = "source")]
    pub source_filter: Option<String>,
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self { Self { query: Some(query.into()), ..Self::default() } }

    /// Blank filter strings count as absent.
    pub fn filter(&self) -> SearchFilter {
        let clean = |f: &Option<String>| f.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);
        SearchFilter::new(clean(&self.type_filter), clean(&self.source_filter))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub from_cache: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
}

impl From<Error> for ErrorBody {
    fn from(e: Error) -> Self { Self { status: e.status_code(), error: e.to_string() } }
}

impl<E, V, K> HybridSearchEngine<E, V, K> where E: EmbeddingProvider, V: VectorStore, K: KeywordStore {
    pub async fn handle(&self, request: &SearchRequest) -> Result<SearchResponse, ErrorBody> {
        let query = match request.query.as_deref() {
            Some(q) if !q.trim().is_empty() => q,
            _ => return Err(Error::Validation("missing required field: query".to_string()).into()),
        };
        let limit = request.limit.unwrap_or(self.options().default_limit);
        let outcome = self.search(query, &request.filter(), limit).await.map_err(|e| {
            tracing::warn!(error = %e, "search request failed");
            ErrorBody::from(e)
        })?;
        Ok(SearchResponse { results: outcome.results, from_cache: outcome.from_cache })
    }

    /// JSON in, `(status, JSON body)` out.
    pub async fn handle_json(&self, body: &str) -> (u16, String) {
        let response = match serde_json::from_str::<SearchRequest>(body) {
            Ok(request) => self.handle(&request).await,
            Err(e) => Err(Error::Validation(format!("malformed request body: {e}")).into()),
        };
        let encoded = match &response {
            Ok(ok) => serde_json::to_string(ok),
            Err(err) => serde_json::to_string(err),
        };
        match (response, encoded) {
            (Ok(_), Ok(json)) => (200, json),
            (Err(err), Ok(json)) => (err.status, json),
            (_, Err(e)) => (500, format!("{{\"status\":500,\"error\":\"encoding failed: {}\"}}", e.to_string().replace('"', "'"))),
        }
    }
}

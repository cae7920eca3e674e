//! Domain types shared by the retrieval and streaming crates.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = String;
pub type Meta = HashMap<String, String>;

/// Metadata key matched against the `type` filter of a search.
pub const META_TYPE: &str = "type";
/// Metadata key matched against the `source` filter of a search.
pub const META_SOURCE: &str = "source";
pub const META_TITLE: &str = "title";
pub const META_URL: &str = "url";

/// Similarity assigned to results that only the keyword branch produced.
pub const KEYWORD_SIMILARITY: f32 = 0.5;

/// A stored item that both the vector and keyword stores can return.
///
/// - `id`: globally unique identifier
/// - `title`/`content`: the text matched by keyword search
/// - `url`: optional link back to the original resource
/// - `metadata`: free-form facets; `type` and `source` drive filtering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocId,
    #[serde(default)]
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub metadata: Meta,
}

/// Indicates which branch produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OriginKind {
    Vector,
    Text,
}

/// A row returned by a vector store for a nearest-neighbour lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorMatch {
    pub id: DocId,
    pub content: String,
    #[serde(default)]
    pub metadata: Meta,
    pub similarity: f32,
}

/// The ranked surface returned by the hybrid engine.
///
/// `similarity` is in `[0, 1]`, higher is better. `origin_kind` labels the
/// branch that contributed the row after merging.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub id: DocId,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub similarity: f32,
    #[serde(default)]
    pub metadata: Meta,
    pub origin_kind: OriginKind,
}

impl SearchResult {
    /// Builds a vector-origin result; `title` and `url` are read from metadata.
    /// A non-finite score becomes 0.0.
    pub fn from_vector(m: VectorMatch) -> Self {
        let title = m.metadata.get(META_TITLE).cloned().unwrap_or_default();
        let url = m.metadata.get(META_URL).cloned();
        Self {
            id: m.id,
            title,
            content: m.content,
            url,
            similarity: if m.similarity.is_finite() { m.similarity.clamp(0.0, 1.0) } else { 0.0 },
            metadata: m.metadata,
            origin_kind: OriginKind::Vector,
        }
    }

    /// Builds a keyword-origin result with the default keyword similarity.
    pub fn from_keyword(d: Document) -> Self {
        Self {
            id: d.id,
            title: d.title,
            content: d.content,
            url: d.url,
            similarity: KEYWORD_SIMILARITY,
            metadata: d.metadata,
            origin_kind: OriginKind::Text,
        }
    }
}

/// Optional `type`/`source` constraints applied to both search branches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilter {
    pub type_filter: Option<String>,
    pub source_filter: Option<String>,
}

impl SearchFilter {
    pub fn new(type_filter: Option<String>, source_filter: Option<String>) -> Self {
        Self { type_filter, source_filter }
    }

    /// A row passes when every provided filter equals the matching metadata value.
    pub fn matches(&self, metadata: &Meta) -> bool {
        let check = |key: &str, want: &Option<String>| match want {
            Some(v) => metadata.get(key).is_some_and(|got| got == v),
            None => true,
        };
        check(META_TYPE, &self.type_filter) && check(META_SOURCE, &self.source_filter)
    }
}

use std::fmt;

use pathway_core::types::SearchFilter;

/// Cache key for one search request.
///
/// Only the first `prefix_chars` characters of the normalized query take
/// part, so distinct long queries sharing that prefix map to the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchFingerprint(String);

impl SearchFingerprint {
    pub fn new(query: &str, filter: &SearchFilter, limit: usize, prefix_chars: usize) -> Self {
        let normalized = normalize_query(query);
        let prefix: String = normalized.chars().take(prefix_chars).collect();
        let or_any = |f: &Option<String>| f.clone().unwrap_or_else(|| "*".to_string());
        Self(format!(
            "search:{}|type={}|source={}|limit={}",
            prefix,
            or_any(&filter.type_filter),
            or_any(&filter.source_filter),
            limit
        ))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for SearchFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// Lowercases and collapses whitespace runs to single spaces.
pub fn normalize_query(query: &str) -> String {
    query.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

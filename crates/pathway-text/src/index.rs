use anyhow::Result;
use parking_lot::RwLock;

use pathway_core::traits::KeywordStore;
use pathway_core::types::Document;

struct TextEntry { doc: Document, title_lower: String, content_lower: String }

/// Documents kept in insertion order with pre-lowercased title/content.
#[derive(Default)]
pub struct MemoryTextIndex { entries: RwLock<Vec<TextEntry>> }

impl MemoryTextIndex {
	pub fn new() -> Self { Self::default() }

	pub fn len(&self) -> usize { self.entries.read().len() }

	pub fn is_empty(&self) -> bool { self.entries.read().is_empty() }

	/// Adds documents, replacing any stored document with the same id in place.
	pub fn index(&self, docs: &[Document]) -> usize {
		let mut entries = self.entries.write();
		for d in docs {
			let entry = TextEntry { title_lower: d.title.to_lowercase(), content_lower: d.content.to_lowercase(), doc: d.clone() };
			match entries.iter_mut().find(|e| e.doc.id == d.id) {
				Some(existing) => *existing = entry,
				None => entries.push(entry),
			}
		}
		tracing::debug!(count = docs.len(), total = entries.len(), "indexed documents into text index");
		docs.len()
	}

	pub fn search(&self, query: &str, max_count: usize) -> Vec<Document> {
		let needle = query.trim().to_lowercase();
		if needle.is_empty() || max_count == 0 { return vec![]; }
		self.entries
			.read()
			.iter()
			.filter(|e| e.title_lower.contains(&needle) || e.content_lower.contains(&needle))
			.take(max_count)
			.map(|e| e.doc.clone())
			.collect()
	}
}

impl KeywordStore for MemoryTextIndex {
	async fn search_text(&self, query: &str, max_count: usize) -> Result<Vec<Document>> { Ok(self.search(query, max_count)) }
}

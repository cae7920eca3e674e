//! Loads searchable documents from a directory tree.
//!
//! `.json` files hold one document or an array of documents. `.txt` files
//! become one document each, with the first path component as the `type`
//! facet.
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{Document, Meta, META_SOURCE, META_TITLE, META_TYPE};

#[derive(Debug, Clone, Default)]
pub struct CorpusLoader;

impl CorpusLoader {
    pub fn new() -> Self { Self }

    pub fn load_directory(&self, dir: &Path) -> Result<Vec<Document>> {
        let files = self.list_corpus_files(dir);
        if files.is_empty() {
            tracing::warn!(dir = %dir.display(), "no corpus files found");
            return Ok(vec![]);
        }
        let mut docs = Vec::new();
        for file_path in &files {
            let loaded = match file_path.extension().and_then(|s| s.to_str()) {
                Some("json") => self.read_json(file_path)?,
                _ => vec![self.read_txt(file_path, dir)?],
            };
            tracing::debug!(file = %file_path.display(), count = loaded.len(), "loaded corpus file");
            docs.extend(loaded);
        }
        tracing::info!(files = files.len(), documents = docs.len(), "corpus loaded");
        Ok(docs)
    }

    fn read_json(&self, file_path: &Path) -> Result<Vec<Document>> {
        let raw = fs::read_to_string(file_path).with_context(|| format!("reading {}", file_path.display()))?;
        let value: serde_json::Value = serde_json::from_str(&raw).with_context(|| format!("parsing {}", file_path.display()))?;
        let docs = if value.is_array() { serde_json::from_value(value)? } else { vec![serde_json::from_value(value)?] };
        Ok(docs)
    }

    fn read_txt(&self, file_path: &Path, root: &Path) -> Result<Document> {
        let content = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(_) => String::from_utf8_lossy(&fs::read(file_path)?).to_string(),
        };
        let relative = file_path.strip_prefix(root).unwrap_or(file_path);
        let title = file_path.file_stem().map(|s| s.to_string_lossy().to_string()).unwrap_or_default();
        let mut metadata = Meta::new();
        metadata.insert(META_TYPE.to_string(), self.type_from_path(relative));
        metadata.insert(META_SOURCE.to_string(), "file".to_string());
        metadata.insert(META_TITLE.to_string(), title.clone());
        Ok(Document {
            id: relative.to_string_lossy().replace('\\', "/"),
            title,
            content: content.trim().to_string(),
            url: None,
            metadata,
        })
    }

    fn type_from_path(&self, relative: &Path) -> String {
        let mut components = relative.components();
        match (components.next(), components.next()) {
            (Some(first), Some(_)) => first.as_os_str().to_string_lossy().to_string(),
            _ => "misc".to_string(),
        }
    }

    fn list_corpus_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(root).into_iter().filter_map(|e| e.ok()).filter(|e| e.file_type().is_file()) {
            let path = entry.path();
            if matches!(path.extension().and_then(|s| s.to_str()), Some("txt") | Some("json")) { files.push(path.to_path_buf()); }
        }
        files.sort(); files
    }
}

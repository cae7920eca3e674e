use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pathway_cache::QueryCache;
use pathway_core::config::Settings;
use pathway_core::corpus::CorpusLoader;
use pathway_core::types::{Document, SearchResult};
use pathway_embed::HashEmbedder;
use pathway_hybrid::{HybridSearchEngine, ResultCache, SearchOptions, SearchRequest};
use pathway_text::MemoryTextIndex;
use pathway_vector::MemoryVectorStore;

use crate::output;

pub type LocalEngine = HybridSearchEngine<HashEmbedder, MemoryVectorStore, MemoryTextIndex>;

pub struct SearchArgs {
    pub query: String,
    pub type_filter: Option<String>,
    pub source_filter: Option<String>,
    pub limit: Option<usize>,
    pub corpus: Option<PathBuf>,
    pub json: bool,
    pub repeat: bool,
}

pub async fn run(settings: &Settings, args: SearchArgs) -> Result<()> {
    let corpus_dir = args
        .corpus
        .clone()
        .or_else(|| settings.corpus_dir(Path::new(".")))
        .ok_or_else(|| anyhow!("no corpus directory: pass --corpus or set data.corpus_dir"))?;
    let docs = CorpusLoader::new()
        .load_directory(&corpus_dir)
        .with_context(|| format!("loading corpus from {}", corpus_dir.display()))?;
    let engine = build_engine(settings, &docs).await?;

    let request = SearchRequest {
        query: Some(args.query.clone()),
        type_filter: args.type_filter,
        source_filter: args.source_filter,
        limit: args.limit,
    };
    let runs = if args.repeat { 2 } else { 1 };
    for _ in 0..runs {
        let response = engine.handle(&request).await.map_err(|e| anyhow!("search failed ({}): {}", e.status, e.error))?;
        let rendered = if args.json { output::format_json(&response)? } else { output::format_human(&args.query, &response) };
        println!("{rendered}");
    }
    Ok(())
}

/// Index `docs` into fresh in-memory stores and wrap them in an engine.
pub async fn build_engine(settings: &Settings, docs: &[Document]) -> Result<LocalEngine> {
    let embedder = HashEmbedder::default();
    let vector = MemoryVectorStore::new();
    vector.index_documents(&embedder, docs).await?;
    let text = MemoryTextIndex::new();
    text.index(docs);
    let cache: ResultCache = Arc::new(QueryCache::<Vec<SearchResult>>::new());
    Ok(HybridSearchEngine::with_options(embedder, vector, text, cache, SearchOptions::from(settings)))
}

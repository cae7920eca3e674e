use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use pathway_cache::{ManualClock, QueryCache};
use pathway_core::error::Error;
use pathway_core::traits::{EmbeddingProvider, KeywordStore, VectorStore};
use pathway_core::types::{Document, Meta, OriginKind, SearchFilter, SearchResult, VectorMatch};
use pathway_hybrid::{merge_results, rank_results, HybridSearchEngine, ResultCache, SearchFingerprint};

#[derive(Clone, Default)]
struct StubEmbedder { calls: Arc<AtomicUsize>, fail: bool }

impl EmbeddingProvider for StubEmbedder {
    fn embedder_id(&self) -> &str { "stub" }
    fn dim(&self) -> usize { 2 }
    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail { bail!("embedding service unavailable"); }
        Ok(vec![1.0, 0.0])
    }
}

#[derive(Default)]
struct StubVector { rows: Vec<VectorMatch>, fail: bool, seen: Arc<Mutex<Option<(f32, usize)>>>, barrier: Option<Arc<tokio::sync::Barrier>> }

impl VectorStore for StubVector {
    async fn query(&self, _embedding: &[f32], threshold: f32, max_count: usize) -> anyhow::Result<Vec<VectorMatch>> {
        *self.seen.lock().unwrap() = Some((threshold, max_count));
        if let Some(b) = &self.barrier { b.wait().await; }
        if self.fail { bail!("vector index offline"); }
        Ok(self.rows.iter().take(max_count).cloned().collect())
    }
}

#[derive(Default)]
struct StubKeyword { docs: Vec<Document>, fail: bool, barrier: Option<Arc<tokio::sync::Barrier>>, queries: Arc<Mutex<Vec<String>>> }

impl KeywordStore for StubKeyword {
    async fn search_text(&self, query: &str, max_count: usize) -> anyhow::Result<Vec<Document>> {
        self.queries.lock().unwrap().push(query.to_string());
        if let Some(b) = &self.barrier { b.wait().await; }
        if self.fail { bail!("text index locked"); }
        Ok(self.docs.iter().take(max_count).cloned().collect())
    }
}

fn meta(pairs: &[(&str, &str)]) -> Meta { pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect() }

fn vm(id: &str, similarity: f32, m: Meta) -> VectorMatch {
    VectorMatch { id: id.into(), content: format!("vector {id}"), metadata: m, similarity }
}

fn kd(id: &str, m: Meta) -> Document {
    Document { id: id.into(), title: format!("title {id}"), content: format!("keyword {id}"), url: None, metadata: m }
}

fn ids(results: &[SearchResult]) -> Vec<&str> { results.iter().map(|r| r.id.as_str()).collect() }

fn engine(embedder: StubEmbedder, vector: StubVector, keyword: StubKeyword) -> (HybridSearchEngine<StubEmbedder, StubVector, StubKeyword>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new());
    let cache: ResultCache = Arc::new(QueryCache::<Vec<SearchResult>>::with_clock(clock.clone()));
    (HybridSearchEngine::new(embedder, vector, keyword, cache), clock)
}

#[tokio::test]
async fn merge_dedups_with_vector_winning_and_ranks() -> anyhow::Result<()> {
    let vector = StubVector { rows: vec![vm("b", 0.75, Meta::new()), vm("a", 0.9, Meta::new())], ..Default::default() };
    let keyword = StubKeyword { docs: vec![kd("b", Meta::new()), kd("c", Meta::new())], ..Default::default() };
    let seen = vector.seen.clone();
    let (engine, _) = engine(StubEmbedder::default(), vector, keyword);

    let out = engine.search("solar jobs", &SearchFilter::default(), 10).await?;
    assert!(!out.from_cache);
    assert_eq!(ids(&out.results), vec!["a", "b", "c"]);
    assert_eq!(out.results[1].origin_kind, OriginKind::Vector, "vector wins ties on id");
    assert_eq!(out.results[1].similarity, 0.75);
    assert_eq!(out.results[2].similarity, 0.5, "keyword-only rows default to 0.5");
    assert_eq!(*seen.lock().unwrap(), Some((0.7, 20)));

    let unique: HashSet<&str> = ids(&out.results).into_iter().collect();
    assert_eq!(unique.len(), out.results.len());
    Ok(())
}

#[tokio::test]
async fn equal_similarity_keeps_vector_first_order() -> anyhow::Result<()> {
    let vector = StubVector { rows: vec![vm("v1", 0.5, Meta::new()), vm("v2", 0.5, Meta::new()), vm("top", 0.8, Meta::new())], ..Default::default() };
    let keyword = StubKeyword { docs: vec![kd("k1", Meta::new()), kd("k2", Meta::new())], ..Default::default() };
    let (engine, _) = engine(StubEmbedder::default(), vector, keyword);
    let out = engine.search("q", &SearchFilter::default(), 10).await?;
    assert_eq!(ids(&out.results), vec!["top", "v1", "v2", "k1", "k2"]);
    for pair in out.results.windows(2) { assert!(pair[0].similarity >= pair[1].similarity); }
    Ok(())
}

#[tokio::test]
async fn repeat_within_ttl_is_served_from_cache() -> anyhow::Result<()> {
    let embedder = StubEmbedder::default();
    let calls = embedder.calls.clone();
    let vector = StubVector { rows: vec![vm("a", 0.9, Meta::new())], ..Default::default() };
    let (engine, clock) = engine(embedder, vector, StubKeyword::default());
    let filter = SearchFilter::new(Some("job".into()), None);

    let first = engine.search("Solar Jobs", &SearchFilter::default(), 5).await?;
    clock.advance(Duration::from_secs(3599));
    let second = engine.search("  solar   jobs ", &SearchFilter::default(), 5).await?;
    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.results, second.results);
    assert_eq!(calls.load(Ordering::SeqCst), 1, "cache hit skips the embedding call");

    let filtered = engine.search("solar jobs", &filter, 5).await?;
    assert!(!filtered.from_cache, "different filters are different fingerprints");
    let other_limit = engine.search("solar jobs", &SearchFilter::default(), 6).await?;
    assert!(!other_limit.from_cache, "limit is part of the fingerprint");
    Ok(())
}

#[tokio::test]
async fn repeat_after_ttl_recomputes() -> anyhow::Result<()> {
    let embedder = StubEmbedder::default();
    let calls = embedder.calls.clone();
    let (engine, clock) = engine(embedder, StubVector { rows: vec![vm("a", 0.9, Meta::new())], ..Default::default() }, StubKeyword::default());
    engine.search("heat pumps", &SearchFilter::default(), 10).await?;
    clock.advance(Duration::from_secs(3600));
    let again = engine.search("heat pumps", &SearchFilter::default(), 10).await?;
    assert!(!again.from_cache);
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    Ok(())
}

#[tokio::test]
async fn embedding_failure_is_upstream_and_not_cached() {
    let embedder = StubEmbedder { fail: true, ..Default::default() };
    let calls = embedder.calls.clone();
    let (engine, _) = engine(embedder, StubVector::default(), StubKeyword { docs: vec![kd("k", Meta::new())], ..Default::default() });
    for _ in 0..2 {
        match engine.search("wind", &SearchFilter::default(), 10).await {
            Err(Error::Upstream(msg)) => assert!(msg.contains("embedding service unavailable"), "{msg}"),
            other => panic!("expected upstream error, got {other:?}"),
        }
    }
    assert_eq!(calls.load(Ordering::SeqCst), 2, "failed searches are not cached");
}

#[tokio::test]
async fn vector_store_failure_is_upstream() {
    let (engine, _) = engine(StubEmbedder::default(), StubVector { fail: true, ..Default::default() }, StubKeyword::default());
    let err = engine.search("wind", &SearchFilter::default(), 10).await.unwrap_err();
    assert!(matches!(err, Error::Upstream(ref m) if m.contains("vector index offline")));
    assert_eq!(err.status_code(), 502);
}

#[tokio::test]
async fn keyword_failure_is_best_effort() -> anyhow::Result<()> {
    let vector = StubVector { rows: vec![vm("a", 0.8, Meta::new())], ..Default::default() };
    let (engine, _) = engine(StubEmbedder::default(), vector, StubKeyword { fail: true, ..Default::default() });
    let out = engine.search("wind", &SearchFilter::default(), 10).await?;
    assert_eq!(ids(&out.results), vec!["a"]);
    Ok(())
}

#[tokio::test]
async fn filters_apply_to_both_branches() -> anyhow::Result<()> {
    let vector = StubVector {
        rows: vec![
            vm("v-job", 0.9, meta(&[("type", "job"), ("source", "masscec")])),
            vm("v-training", 0.95, meta(&[("type", "training"), ("source", "masscec")])),
            vm("v-untyped", 0.99, Meta::new()),
        ],
        ..Default::default()
    };
    let keyword = StubKeyword {
        docs: vec![kd("k-job-web", meta(&[("type", "job"), ("source", "web")])), kd("k-job", meta(&[("type", "job"), ("source", "masscec")]))],
        ..Default::default()
    };
    let (engine, _) = engine(StubEmbedder::default(), vector, keyword);

    let jobs = engine.search("installer", &SearchFilter::new(Some("job".into()), None), 10).await?;
    assert_eq!(ids(&jobs.results), vec!["v-job", "k-job-web", "k-job"]);

    let masscec_jobs = engine.search("installer", &SearchFilter::new(Some("job".into()), Some("masscec".into())), 10).await?;
    assert_eq!(ids(&masscec_jobs.results), vec!["v-job", "k-job"]);
    Ok(())
}

#[tokio::test]
async fn validation_happens_before_any_work() {
    let embedder = StubEmbedder::default();
    let calls = embedder.calls.clone();
    let (engine, _) = engine(embedder, StubVector::default(), StubKeyword::default());
    assert!(matches!(engine.search("   ", &SearchFilter::default(), 10).await, Err(Error::Validation(_))));
    assert!(matches!(engine.search("solar", &SearchFilter::default(), 0).await, Err(Error::Validation(_))));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn results_are_truncated_to_limit() -> anyhow::Result<()> {
    let rows = (0..8).map(|i| vm(&format!("v{i}"), 0.9 - i as f32 * 0.01, Meta::new())).collect();
    let (engine, _) = engine(StubEmbedder::default(), StubVector { rows, ..Default::default() }, StubKeyword { docs: vec![kd("k", Meta::new())], ..Default::default() });
    let out = engine.search("q", &SearchFilter::default(), 3).await?;
    assert_eq!(ids(&out.results), vec!["v0", "v1", "v2"]);
    Ok(())
}

#[tokio::test]
async fn nan_vector_score_ranks_last_within_bounds() -> anyhow::Result<()> {
    let vector = StubVector { rows: vec![vm("low", 0.71, Meta::new()), vm("nan", f32::NAN, Meta::new()), vm("high", 0.95, Meta::new())], ..Default::default() };
    let (engine, _) = engine(StubEmbedder::default(), vector, StubKeyword::default());
    let out = engine.search("q", &SearchFilter::default(), 10).await?;
    assert_eq!(ids(&out.results), vec!["high", "low", "nan"]);
    for r in &out.results { assert!((0.0..=1.0).contains(&r.similarity), "{} scored {}", r.id, r.similarity); }
    Ok(())
}

#[tokio::test]
async fn branches_see_the_normalized_query() -> anyhow::Result<()> {
    let keyword = StubKeyword::default();
    let queries = keyword.queries.clone();
    let (engine, _) = engine(StubEmbedder::default(), StubVector::default(), keyword);
    engine.search("  Solar   Jobs ", &SearchFilter::default(), 10).await?;
    let again = engine.search("solar jobs", &SearchFilter::default(), 10).await?;
    assert!(again.from_cache);
    assert_eq!(*queries.lock().unwrap(), vec!["solar jobs".to_string()]);
    Ok(())
}

#[tokio::test]
async fn branches_run_concurrently() -> anyhow::Result<()> {
    // Each branch blocks until the other has started; sequential execution would never finish.
    let barrier = Arc::new(tokio::sync::Barrier::new(2));
    let vector = StubVector { rows: vec![vm("a", 0.9, Meta::new())], barrier: Some(barrier.clone()), ..Default::default() };
    let keyword = StubKeyword { docs: vec![kd("b", Meta::new())], barrier: Some(barrier), ..Default::default() };
    let (engine, _) = engine(StubEmbedder::default(), vector, keyword);
    let out = tokio::time::timeout(Duration::from_secs(5), engine.search("q", &SearchFilter::default(), 10)).await??;
    assert_eq!(ids(&out.results), vec!["a", "b"]);
    Ok(())
}

#[test]
fn merge_and_rank_helpers() {
    let r = |id: &str, s: f32, o: OriginKind| SearchResult { id: id.into(), title: String::new(), content: String::new(), url: None, similarity: s, metadata: HashMap::new(), origin_kind: o };
    let dense = vec![r("x", 0.7, OriginKind::Vector), r("x", 0.9, OriginKind::Vector), r("y", 0.5, OriginKind::Vector)];
    let keyword = vec![r("z", 0.5, OriginKind::Text), r("y", 0.5, OriginKind::Text)];
    let mut merged = merge_results(dense, keyword);
    assert_eq!(ids(&merged), vec!["x", "y", "z"]);
    assert_eq!(merged[0].similarity, 0.7, "first occurrence inside a branch wins");
    rank_results(&mut merged);
    assert_eq!(ids(&merged), vec!["x", "y", "z"]);
    assert_eq!(merged[1].origin_kind, OriginKind::Vector);

    let mut with_nan = vec![r("b", 0.2, OriginKind::Vector), r("n", f32::NAN, OriginKind::Vector), r("c", 0.9, OriginKind::Text)];
    rank_results(&mut with_nan);
    let finite: Vec<&str> = with_nan.iter().filter(|x| x.similarity.is_finite()).map(|x| x.id.as_str()).collect();
    assert_eq!(finite, vec!["c", "b"], "a NaN row does not disturb the finite order");
}

#[test]
fn fingerprint_normalizes_and_truncates() {
    let any = SearchFilter::default();
    assert_eq!(SearchFingerprint::new("  Solar   JOBS ", &any, 10, 100), SearchFingerprint::new("solar jobs", &any, 10, 100));
    assert_eq!(SearchFingerprint::new("solar jobs", &any, 10, 100).as_str(), "search:solar jobs|type=*|source=*|limit=10");

    let long_a = format!("{} boston", "a".repeat(100));
    let long_b = format!("{} worcester", "a".repeat(100));
    assert_eq!(
        SearchFingerprint::new(&long_a, &any, 10, 100),
        SearchFingerprint::new(&long_b, &any, 10, 100),
        "queries sharing the bounded prefix collide"
    );
    let typed = SearchFilter::new(Some("job".into()), Some("web".into()));
    assert_eq!(SearchFingerprint::new("é solar", &typed, 3, 1).to_string(), "search:é|type=job|source=web|limit=3");
}

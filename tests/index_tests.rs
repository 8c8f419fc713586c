//! Vector index lifecycle, persistence round-trips, and retrieval ordering.

use std::collections::HashMap;
use std::sync::Arc;

use crag::mock::MockEmbedding;
use crag::{Chunk, CragError, VectorIndex};

const DIM: usize = 256;

fn chunk(id: &str, text: &str) -> Chunk {
    Chunk {
        id: id.to_string(),
        text: text.to_string(),
        metadata: HashMap::new(),
        document_id: "doc".to_string(),
    }
}

fn stats_corpus() -> Vec<Chunk> {
    vec![
        chunk("var_0", "Variance measures the spread of a distribution around its mean."),
        chunk(
            "clt_0",
            "The central limit theorem states that sample means converge to a normal \
             distribution as the sample size grows.",
        ),
        chunk("reg_0", "Linear regression fits a line that minimizes squared residuals."),
    ]
}

#[tokio::test]
async fn build_fails_on_empty_corpus() {
    let index = VectorIndex::new(Arc::new(MockEmbedding::new(DIM)));
    let result = index.build(&[]).await;
    assert!(matches!(result, Err(CragError::EmptyCorpus)));
}

#[tokio::test]
async fn persist_fails_before_build() {
    let dir = tempfile::tempdir().unwrap();
    let index = VectorIndex::new(Arc::new(MockEmbedding::new(DIM)));
    let result = index.persist(&dir.path().join("idx")).await;
    assert!(matches!(result, Err(CragError::NotBuilt)));
}

#[tokio::test]
async fn retrieve_fails_before_build_or_load() {
    let index = VectorIndex::new(Arc::new(MockEmbedding::new(DIM)));
    let result = index.retrieve("anything", 3).await;
    assert!(matches!(result, Err(CragError::NotInitialized)));
}

#[test]
fn load_fails_with_not_found_on_missing_path() {
    let result =
        VectorIndex::load("no/such/index".as_ref(), Arc::new(MockEmbedding::new(DIM)));
    assert!(matches!(result, Err(CragError::NotFound { .. })));
}

#[tokio::test]
async fn persist_and_load_round_trip_preserves_retrieval() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("idx");

    let index = VectorIndex::new(Arc::new(MockEmbedding::new(DIM)));
    index.build(&stats_corpus()).await.unwrap();

    let before = index.retrieve("central limit theorem", 3).await.unwrap();
    index.persist(&path).await.unwrap();

    let reloaded = VectorIndex::load(&path, Arc::new(MockEmbedding::new(DIM))).unwrap();
    let after = reloaded.retrieve("central limit theorem", 3).await.unwrap();

    let ids_before: Vec<&str> = before.iter().map(|r| r.chunk.id.as_str()).collect();
    let ids_after: Vec<&str> = after.iter().map(|r| r.chunk.id.as_str()).collect();
    assert_eq!(ids_before, ids_after);
}

#[tokio::test]
async fn load_rejects_mismatched_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("idx");

    let index = VectorIndex::new(Arc::new(MockEmbedding::new(32)));
    index.build(&stats_corpus()).await.unwrap();
    index.persist(&path).await.unwrap();

    let result = VectorIndex::load(&path, Arc::new(MockEmbedding::new(64)));
    assert!(matches!(
        result,
        Err(CragError::DimensionMismatch { expected: 32, actual: 64 })
    ));
}

#[tokio::test]
async fn load_rejects_truncated_entry_list() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("idx");

    let index = VectorIndex::new(Arc::new(MockEmbedding::new(DIM)));
    index.build(&stats_corpus()).await.unwrap();
    index.persist(&path).await.unwrap();

    // Drop one entry from the serialized list while leaving the manifest alone.
    let entries_path = path.join("index.json");
    let mut entries: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&entries_path).unwrap()).unwrap();
    entries.as_array_mut().unwrap().pop();
    std::fs::write(&entries_path, serde_json::to_vec(&entries).unwrap()).unwrap();

    let result = VectorIndex::load(&path, Arc::new(MockEmbedding::new(DIM)));
    assert!(matches!(result, Err(CragError::Persist { .. })));
}

#[tokio::test]
async fn load_rejects_mismatched_model_identity() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("idx");

    let index = VectorIndex::new(Arc::new(MockEmbedding::new(DIM)));
    index.build(&stats_corpus()).await.unwrap();
    index.persist(&path).await.unwrap();

    let other = Arc::new(MockEmbedding::new(DIM).with_model("some-other-model"));
    let result = VectorIndex::load(&path, other);
    assert!(matches!(result, Err(CragError::ModelMismatch { .. })));
}

#[tokio::test]
async fn retrieve_orders_by_descending_similarity_and_caps_at_k() {
    let index = VectorIndex::new(Arc::new(MockEmbedding::new(DIM)));
    index.build(&stats_corpus()).await.unwrap();

    let results = index.retrieve("variance of a distribution", 2).await.unwrap();
    assert_eq!(results.len(), 2);
    for window in results.windows(2) {
        assert!(window[0].score >= window[1].score);
    }

    // k larger than the corpus returns everything, still ordered.
    let all = index.retrieve("variance of a distribution", 10).await.unwrap();
    assert_eq!(all.len(), 3);
    for window in all.windows(2) {
        assert!(window[0].score >= window[1].score);
    }
}

#[tokio::test]
async fn central_limit_theorem_query_ranks_its_chunk_first() {
    let index = VectorIndex::new(Arc::new(MockEmbedding::new(DIM)));
    index.build(&stats_corpus()).await.unwrap();

    let results = index.retrieve("Central limit theorem", 2).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].chunk.id, "clt_0");
    assert!(results[0].score > results[1].score);
}

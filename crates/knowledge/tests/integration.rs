//! Integration tests for ingestion and retrieval over the knowledge base.

use async_trait::async_trait;
use researchbot_common::{Embedder, Result, Retriever};
use researchbot_knowledge::{Document, KnowledgeBase, KnowledgeConfig, index_directory};
use std::sync::Arc;

const VOCAB: &[&str] = &["vaporware", "diana", "reeves", "funding", "rust", "ocean", "launch"];

struct BagOfWords;

#[async_trait]
impl Embedder for BagOfWords {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let lower = text.to_lowercase();
        Ok(VOCAB
            .iter()
            .map(|w| lower.matches(w).count() as f32)
            .collect())
    }

    fn dimension(&self) -> usize {
        VOCAB.len()
    }
}

fn kb() -> KnowledgeBase {
    KnowledgeBase::new("test_docs", Arc::new(BagOfWords))
}

fn txt() -> Vec<String> {
    vec![".txt".to_string()]
}

#[tokio::test]
async fn test_empty_base_returns_no_hits() {
    let kb = kb();
    assert!(kb.is_empty());
    let hits = kb.search("VaporWare", 5).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn test_search_ranks_by_similarity_and_caps_k() {
    let kb = kb();
    kb.add_documents(vec![
        Document::new("Ocean currents and tides.", "ocean.txt"),
        Document::new("VaporWare was founded by Diana Reeves.", "vapor.txt"),
        Document::new("Rust ownership rules.", "rust.txt"),
        Document::new("VaporWare funding collapsed after the launch.", "funding.txt"),
    ])
    .await
    .unwrap();
    assert_eq!(kb.len(), 4);

    let hits = kb.search("Diana Reeves VaporWare", 2).await.unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].metadata["source"], "vapor.txt");
    assert!(hits[1].content.contains("VaporWare"));
}

#[tokio::test]
async fn test_index_directory_filters_extensions_and_chunks() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("a.txt"), "VaporWare launch notes.").unwrap();
    std::fs::write(dir.path().join("b.txt"), "Diana Reeves biography.").unwrap();
    std::fs::write(dir.path().join("c.md"), "Ignored markdown.").unwrap();
    std::fs::create_dir(dir.path().join("nested.txt")).unwrap();

    let kb = kb();
    let report = index_directory(&kb, dir.path(), &txt(), &KnowledgeConfig::default())
        .await
        .unwrap();

    assert_eq!(report.files_indexed, 2);
    assert_eq!(report.files_skipped, 0);
    assert_eq!(report.chunks_indexed, 2);
    assert_eq!(kb.len(), 2);

    let hits = kb.search("Diana Reeves", 1).await.unwrap();
    assert!(hits[0].metadata["source"].ends_with("b.txt"));
    assert_eq!(hits[0].metadata["chunk"], "0");
}

#[tokio::test]
async fn test_index_directory_splits_large_files() {
    let dir = tempfile::tempdir().unwrap();
    let text = "rust ".repeat(100);
    std::fs::write(dir.path().join("long.txt"), &text).unwrap();

    let config = KnowledgeConfig {
        chunk_size: 100,
        chunk_overlap: 20,
        ..Default::default()
    };
    let kb = kb();
    let report = index_directory(&kb, dir.path(), &txt(), &config)
        .await
        .unwrap();

    assert_eq!(report.files_indexed, 1);
    assert!(report.chunks_indexed > 1);
    assert_eq!(kb.len(), report.chunks_indexed);
}

#[tokio::test]
async fn test_missing_directory_indexes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let kb = kb();
    let report = index_directory(
        &kb,
        &dir.path().join("does-not-exist"),
        &txt(),
        &KnowledgeConfig::default(),
    )
    .await
    .unwrap();

    assert_eq!(report.chunks_indexed, 0);
    assert!(kb.is_empty());
}

#[tokio::test]
async fn test_empty_extensions_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let kb = kb();
    let err = index_directory(&kb, dir.path(), &[], &KnowledgeConfig::default())
        .await
        .unwrap_err();
    assert_eq!(err.code(), "INGESTION_ERROR");
}

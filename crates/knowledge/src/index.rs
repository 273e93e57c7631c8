//! In-memory vector index over document chunks.

use async_trait::async_trait;
use parking_lot::RwLock;
use researchbot_common::{Embedder, ResearchError, Result, Retriever, SearchHit};
use researchbot_memory::cosine_similarity;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// A document (or chunk) ready to be indexed.
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub metadata: BTreeMap<String, String>,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert("source".to_string(), source.into());
        Self {
            content: content.into(),
            metadata,
        }
    }
}

struct IndexedChunk {
    document: Document,
    embedding: Vec<f32>,
}

/// Cosine-similarity knowledge base, populated by ingestion and queried
/// by the research core through [`Retriever`].
pub struct KnowledgeBase {
    collection: String,
    embedder: Arc<dyn Embedder>,
    chunks: RwLock<Vec<IndexedChunk>>,
}

impl KnowledgeBase {
    pub fn new(collection: impl Into<String>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            collection: collection.into(),
            embedder,
            chunks: RwLock::new(Vec::new()),
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Embed and index `documents`, returning how many were added.
    pub async fn add_documents(&self, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let texts: Vec<String> = documents.iter().map(|d| d.content.clone()).collect();
        let embeddings = self.embedder.embed_batch(&texts).await?;
        if embeddings.len() != documents.len() {
            return Err(ResearchError::Embedding(format!(
                "expected {} embeddings, got {}",
                documents.len(),
                embeddings.len()
            )));
        }

        let added = documents.len();
        let mut chunks = self.chunks.write();
        chunks.extend(
            documents
                .into_iter()
                .zip(embeddings)
                .map(|(document, embedding)| IndexedChunk {
                    document,
                    embedding,
                }),
        );

        info!(
            collection = %self.collection,
            added,
            total = chunks.len(),
            "Indexed documents"
        );
        Ok(added)
    }
}

#[async_trait]
impl Retriever for KnowledgeBase {
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<(f32, SearchHit)> = self
            .chunks
            .read()
            .iter()
            .map(|c| {
                (
                    cosine_similarity(&query_embedding, &c.embedding),
                    SearchHit {
                        content: c.document.content.clone(),
                        metadata: c.document.metadata.clone(),
                    },
                )
            })
            .collect();

        // Stable sort keeps insertion order among equal scores.
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));
        scored.truncate(k);

        debug!(collection = %self.collection, query = %query, hits = scored.len(), "Searched knowledge base");
        Ok(scored.into_iter().map(|(_, hit)| hit).collect())
    }
}

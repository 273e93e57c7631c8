//! Namespaced in-process vector memory.

use crate::embedding::cosine_similarity;
use crate::types::{MemoryConfig, MemoryRecord};
use async_trait::async_trait;
use parking_lot::RwLock;
use researchbot_common::{Embedder, MemoryHit, MemoryStore, Namespace, ResearchError, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

type Partition = Arc<Mutex<Vec<MemoryRecord>>>;

/// Memory store keeping one partition per namespace.
///
/// Writes to the same namespace are serialized by that partition's mutex,
/// so concurrent saves for one user never lose updates. Searches only ever
/// look inside the requested partition.
pub struct VectorMemoryStore {
    config: MemoryConfig,
    embedder: Arc<dyn Embedder>,
    partitions: RwLock<HashMap<Namespace, Partition>>,
}

impl VectorMemoryStore {
    pub fn new(config: MemoryConfig, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            config,
            embedder,
            partitions: RwLock::new(HashMap::new()),
        }
    }

    fn partition(&self, namespace: &Namespace) -> Partition {
        if let Some(p) = self.partitions.read().get(namespace) {
            return p.clone();
        }
        self.partitions
            .write()
            .entry(namespace.clone())
            .or_default()
            .clone()
    }

    fn existing_partition(&self, namespace: &Namespace) -> Option<Partition> {
        self.partitions.read().get(namespace).cloned()
    }

    /// Number of records stored under `namespace`.
    pub async fn count(&self, namespace: &Namespace) -> usize {
        match self.existing_partition(namespace) {
            Some(p) => p.lock().await.len(),
            None => 0,
        }
    }
}

#[async_trait]
impl MemoryStore for VectorMemoryStore {
    async fn save(&self, namespace: &Namespace, content: &str) -> Result<String> {
        if content.trim().is_empty() {
            return Err(ResearchError::Memory("refusing to save empty memory".into()));
        }

        let embedding = self.embedder.embed(content).await?;
        let record = MemoryRecord::new(namespace.clone(), content, embedding);
        let id = record.id.clone();

        let partition = self.partition(namespace);
        let mut records = partition.lock().await;
        records.push(record);

        debug!(namespace = %namespace, memory_id = %id, total = records.len(), "Saved memory");
        Ok(id)
    }

    async fn search(&self, namespace: &Namespace, query: &str) -> Result<Vec<MemoryHit>> {
        let Some(partition) = self.existing_partition(namespace) else {
            debug!(namespace = %namespace, "No memories for namespace");
            return Ok(Vec::new());
        };

        let query_embedding = self.embedder.embed(query).await?;
        let records = partition.lock().await;

        let mut hits: Vec<MemoryHit> = records
            .iter()
            .map(|r| MemoryHit {
                id: r.id.clone(),
                content: r.content.clone(),
                score: cosine_similarity(&query_embedding, &r.embedding),
            })
            .filter(|h| h.score >= self.config.min_similarity)
            .collect();

        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(self.config.max_results);

        debug!(namespace = %namespace, hits = hits.len(), "Searched memories");
        Ok(hits)
    }
}

//! Memory records and configuration.

use researchbot_common::Namespace;
use serde::{Deserialize, Serialize};

/// A durable fact about a user's research context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique ID
    pub id: String,

    /// Owning namespace
    pub namespace: Namespace,

    /// Free-text content
    pub content: String,

    /// Creation timestamp (Unix millis)
    pub created_at: u64,

    /// Vector embedding used for semantic lookup
    #[serde(skip)]
    pub embedding: Vec<f32>,
}

impl MemoryRecord {
    pub fn new(namespace: Namespace, content: impl Into<String>, embedding: Vec<f32>) -> Self {
        let now = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();

        Self {
            id: format!("mem_{}", uuid::Uuid::new_v4()),
            namespace,
            content: content.into(),
            created_at: now,
            embedding,
        }
    }
}

/// Configuration for the memory system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,

    /// Embedding dimension
    #[serde(default = "default_embedding_dim")]
    pub embedding_dim: usize,

    /// Maximum memories to return in search
    #[serde(default = "default_max_results")]
    pub max_results: usize,

    /// Minimum similarity score for retrieval
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f32,

    /// Budget for memory context injected into the transcript
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: usize,
}

fn default_embedding_model() -> String {
    "all-MiniLM-L6-v2".into()
}

fn default_embedding_dim() -> usize {
    384
}

fn default_max_results() -> usize {
    5
}

fn default_min_similarity() -> f32 {
    0.25
}

fn default_max_context_tokens() -> usize {
    1024
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            embedding_model: default_embedding_model(),
            embedding_dim: default_embedding_dim(),
            max_results: default_max_results(),
            min_similarity: default_min_similarity(),
            max_context_tokens: default_max_context_tokens(),
        }
    }
}

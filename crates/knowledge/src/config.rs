//! Knowledge base configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KnowledgeConfig {
    /// Name of the document collection
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Directory indexed at startup
    #[serde(default = "default_documents_dir")]
    pub documents_dir: PathBuf,

    /// File extensions picked up by ingestion
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Maximum characters per chunk
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// Hits requested per retrieval query
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_collection() -> String {
    "research_docs".into()
}

fn default_documents_dir() -> PathBuf {
    PathBuf::from("./documents")
}

fn default_extensions() -> Vec<String> {
    vec![".txt".into()]
}

fn default_chunk_size() -> usize {
    1000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_top_k() -> usize {
    5
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            collection: default_collection(),
            documents_dir: default_documents_dir(),
            extensions: default_extensions(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

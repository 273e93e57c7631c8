//! Error types for ResearchBot.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ResearchError {
    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Retrieval error: {0}")]
    Retrieval(String),

    #[error("Memory error: {0}")]
    Memory(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("{capability} call timed out after {timeout_ms}ms")]
    Timeout {
        capability: &'static str,
        timeout_ms: u64,
    },

    #[error("Research request cancelled")]
    Cancelled,

    #[error("Agent error: {0}")]
    Agent(String),

    #[error("Ingestion error: {0}")]
    Ingestion(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResearchError {
    /// True when an external capability (completion, retrieval, memory,
    /// embedding) failed or did not answer in time.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            Self::Completion(_)
                | Self::Retrieval(_)
                | Self::Memory(_)
                | Self::Embedding(_)
                | Self::Timeout { .. }
        )
    }

    /// Short machine-readable code, used by the HTTP layer.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Completion(_) => "COMPLETION_UNAVAILABLE",
            Self::Retrieval(_) => "RETRIEVAL_UNAVAILABLE",
            Self::Memory(_) => "MEMORY_UNAVAILABLE",
            Self::Embedding(_) => "EMBEDDING_UNAVAILABLE",
            Self::Timeout { .. } => "UPSTREAM_TIMEOUT",
            Self::Cancelled => "CANCELLED",
            Self::Agent(_) => "AGENT_ERROR",
            Self::Ingestion(_) => "INGESTION_ERROR",
            Self::Config(_) => "INVALID_REQUEST",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, ResearchError>;

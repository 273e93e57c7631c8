//! Common types and traits shared across ResearchBot crates.
//!
//! This crate provides the error taxonomy, the transcript passed between
//! specialist roles, and the capability traits (retrieval, memory,
//! embeddings) that the orchestration core consumes.

pub mod error;
pub mod message;
pub mod request;
pub mod source;
pub mod traits;

pub use error::{ResearchError, Result};
pub use message::{AgentMessage, MessageRole, Transcript};
pub use request::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MAX_ITERATIONS, DEFAULT_USER_ID, ResearchRequest,
};
pub use source::{SearchHit, Source};
pub use traits::{
    AgentRole, Embedder, MemoryHit, MemoryStore, Namespace, Retriever, ToolCapability,
};

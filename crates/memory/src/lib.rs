//! Long-term memory for ResearchBot.
//!
//! Durable facts about a user's research context, isolated per
//! `(kind, user_id)` namespace and looked up semantically.
//!
//! ```text
//! supervisor ──search_memory(ns, q)──► VectorMemoryStore ──► partition[ns]
//!            ──manage_memory(ns, c)──►        │                  │
//!                                             ▼                  ▼
//!                                      EmbeddingService    cosine ranking
//! ```

pub mod embedding;
pub mod retrieval;
pub mod store;
pub mod types;

pub use embedding::{EmbeddingError, EmbeddingService, cosine_similarity};
pub use retrieval::format_memory_context;
pub use store::VectorMemoryStore;
pub use types::{MemoryConfig, MemoryRecord};

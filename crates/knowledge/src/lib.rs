//! Knowledge base for ResearchBot.
//!
//! The research core only consumes this through the `Retriever` trait;
//! ingestion populates it and nothing in the core mutates it.

pub mod config;
pub mod index;
pub mod ingest;
pub mod splitter;

pub use config::KnowledgeConfig;
pub use index::{Document, KnowledgeBase};
pub use ingest::{IngestReport, index_directory};
pub use splitter::TextSplitter;

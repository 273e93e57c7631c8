//! Capability traits and role identifiers.
//!
//! These live in `researchbot-common` so that the agents, memory,
//! knowledge and coordinator crates can reference them without circular
//! dependencies, and so tests can substitute fakes for every external
//! collaborator.

use crate::{Result, SearchHit};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Specialist roles of the delegation pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentRole {
    Analyst,
    Researcher,
    Writer,
}

impl AgentRole {
    /// The fixed delegation order.
    pub const ORDER: [AgentRole; 3] = [AgentRole::Analyst, AgentRole::Researcher, AgentRole::Writer];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Analyst => "analyst",
            AgentRole::Researcher => "researcher",
            AgentRole::Writer => "writer",
        }
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tools a role or the supervisor may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCapability {
    /// Can query the knowledge base
    Retrieval,
    /// Can search long-term memory
    SearchMemory,
    /// Can write long-term memory
    ManageMemory,
}

/// Semantic search over the external knowledge base.
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Top-`k` hits for `query`, ranked by relevance descending.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>>;
}

/// Scoping key under which memory records are isolated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Namespace {
    pub kind: String,
    pub user_id: String,
}

impl Namespace {
    pub fn new(kind: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            user_id: user_id.into(),
        }
    }

    /// The `(memories, user_id)` namespace used by the supervisor.
    pub fn memories(user_id: impl Into<String>) -> Self {
        Self::new("memories", user_id)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.kind, self.user_id)
    }
}

/// A memory search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryHit {
    pub id: String,
    pub content: String,
    pub score: f32,
}

/// Namespaced long-term memory.
///
/// A record saved under one namespace must never be returned by a search
/// under another.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// Save `content` under `namespace`, returning the new record ID.
    async fn save(&self, namespace: &Namespace, content: &str) -> Result<String>;

    /// Records under `namespace` most similar to `query`, best first.
    async fn search(&self, namespace: &Namespace, query: &str) -> Result<Vec<MemoryHit>>;
}

/// Text embedding capability shared by memory and the knowledge base.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimension(&self) -> usize;
}

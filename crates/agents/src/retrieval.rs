//! Retrieval adapter: fan sub-queries out to the knowledge base.

use crate::guard::CallLimits;
use futures::future::join_all;
use researchbot_common::{ResearchError, Result, Retriever, Source};
use std::sync::Arc;
use tracing::{debug, warn};

/// Hits requested per query.
pub const TOP_K: usize = 5;

pub struct RetrievalAdapter {
    retriever: Arc<dyn Retriever>,
    top_k: usize,
}

impl RetrievalAdapter {
    pub fn new(retriever: Arc<dyn Retriever>) -> Self {
        Self {
            retriever,
            top_k: TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Search every query and tag each hit with the query that produced it.
    ///
    /// Queries run concurrently; results are concatenated in query order,
    /// then rank order. A failing query is logged and skipped. Cancellation
    /// is the only error that aborts the batch.
    pub async fn retrieve(&self, queries: &[String], limits: &CallLimits) -> Result<Vec<Source>> {
        limits.check()?;

        let searches = queries.iter().map(|query| async move {
            let hits = limits
                .run("retrieval", self.retriever.search(query, self.top_k))
                .await;
            (query, hits)
        });

        let mut sources = Vec::new();
        for (query, outcome) in join_all(searches).await {
            match outcome {
                Ok(hits) => {
                    debug!(query = %query, hits = hits.len(), "Retrieved");
                    sources.extend(hits.into_iter().map(|hit| Source::from_hit(hit, query.as_str())));
                }
                Err(ResearchError::Cancelled) => return Err(ResearchError::Cancelled),
                Err(e) => {
                    warn!(query = %query, error = %e, "Retrieval failed for query, skipping");
                }
            }
        }

        Ok(sources)
    }
}

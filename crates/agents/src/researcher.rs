//! Document researcher - the only role that searches the knowledge base.

use crate::dedup::Deduplicator;
use crate::guard::CallLimits;
use crate::planner::parse_sub_questions;
use crate::retrieval::RetrievalAdapter;
use crate::traits::Agent;
use async_trait::async_trait;
use researchbot_common::{
    AgentMessage, AgentRole, Result, Retriever, Source, ToolCapability, Transcript,
};
use researchbot_llm::LlmClient;
use std::sync::Arc;
use tracing::info;

/// Output when retrieval comes back empty.
pub const NO_DOCUMENTS_MESSAGE: &str = "No relevant documents found for this query.";

const RESEARCHER_SYSTEM_PROMPT: &str = r#"You are the Document Researcher.
Search the Vapor Labs archive to find relevant information.
Use the search results thoroughly.
Note source references for each piece of information."#;

/// Retrieves sources for the analyst's plan and writes research notes.
pub struct ResearcherAgent {
    llm: Arc<dyn LlmClient>,
    retrieval: RetrievalAdapter,
    dedup: Deduplicator,
}

impl ResearcherAgent {
    pub fn new(llm: Arc<dyn LlmClient>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            llm,
            retrieval: RetrievalAdapter::new(retriever),
            dedup: Deduplicator::default(),
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.retrieval = self.retrieval.with_top_k(top_k);
        self
    }

    pub fn with_deduplicator(mut self, dedup: Deduplicator) -> Self {
        self.dedup = dedup;
        self
    }

    /// The analyst's sub-questions, or the original question.
    fn queries(transcript: &Transcript) -> Vec<String> {
        transcript
            .last_from(AgentRole::Analyst.as_str())
            .and_then(|m| parse_sub_questions(&m.content))
            .unwrap_or_else(|| vec![transcript.question().to_string()])
    }
}

/// `[Source i: <source>]` blocks separated by horizontal rules.
pub fn format_search_results(sources: &[Source]) -> String {
    if sources.is_empty() {
        return NO_DOCUMENTS_MESSAGE.to_string();
    }
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[Source {}: {}]\n{}", i + 1, s.source_name(), s.content))
        .collect::<Vec<_>>()
        .join("\n\n---\n\n")
}

#[async_trait]
impl Agent for ResearcherAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Researcher
    }

    fn name(&self) -> &str {
        "Document Researcher"
    }

    fn tools(&self) -> &[ToolCapability] {
        &[ToolCapability::Retrieval]
    }

    fn system_prompt(&self) -> &str {
        RESEARCHER_SYSTEM_PROMPT
    }

    async fn run(&self, transcript: &Transcript, limits: &CallLimits) -> Result<AgentMessage> {
        let queries = Self::queries(transcript);
        info!(agent = %self.role(), queries = queries.len(), "Searching documents");

        let sources = self
            .dedup
            .dedupe(self.retrieval.retrieve(&queries, limits).await?);
        if sources.is_empty() {
            return Ok(AgentMessage::from_agent(
                self.role().as_str(),
                NO_DOCUMENTS_MESSAGE,
            ));
        }

        let results = format_search_results(&sources);
        let input = format!("{}\n\nSearch results:\n{}", transcript.render(), results);
        let notes = limits
            .run(
                "completion",
                self.llm.complete_text(Some(self.system_prompt()), &input),
            )
            .await?;

        Ok(AgentMessage::from_agent(
            self.role().as_str(),
            format!("Search results:\n{results}\n\nResearch notes:\n{notes}"),
        ))
    }
}

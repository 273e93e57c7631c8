//! Compose cited findings from retrieved sources.

use crate::guard::CallLimits;
use researchbot_common::{Result, Source};
use researchbot_llm::LlmClient;
use std::sync::Arc;
use tracing::debug;

/// Returned without a completion call when nothing was retrieved.
pub const NO_SOURCES_MESSAGE: &str = "I couldn't find any relevant information in my knowledge base to answer your research question. Could you try rephrasing your query or ask about a different topic?";

const SYNTHESIS_INSTRUCTION: &str = r#"You are ResearchBot synthesizing research findings.

Instructions:
- Synthesize the information into clear, well-organized findings
- Cite sources using [1], [2], etc.
- Note any conflicting information between sources
- Acknowledge gaps if the sources don't fully answer the question
- Be thorough but concise
"#;

pub struct Synthesizer {
    llm: Arc<dyn LlmClient>,
}

impl Synthesizer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    pub async fn synthesize(
        &self,
        query: &str,
        sources: &[Source],
        limits: &CallLimits,
    ) -> Result<String> {
        if sources.is_empty() {
            debug!("No sources, skipping synthesis");
            return Ok(NO_SOURCES_MESSAGE.to_string());
        }

        let input = format!(
            "Research Question: {query}\n\nSources:\n{}\n\nResearch Findings:",
            numbered_context(sources)
        );
        limits
            .run(
                "completion",
                self.llm.complete_text(Some(SYNTHESIS_INSTRUCTION), &input),
            )
            .await
    }
}

/// `[Source i] content` blocks, numbered from 1 in source order.
pub fn numbered_context(sources: &[Source]) -> String {
    sources
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[Source {}] {}", i + 1, s.content))
        .collect::<Vec<_>>()
        .join("\n\n")
}

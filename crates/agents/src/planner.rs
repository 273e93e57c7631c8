//! Query planning: decompose a question into focused sub-questions.

use crate::guard::CallLimits;
use researchbot_common::Result;
use researchbot_llm::LlmClient;
use std::sync::Arc;
use tracing::{debug, info};

/// Marker the planner instruction asks the model to emit.
pub const SUB_QUESTIONS_MARKER: &str = "SUB_QUESTIONS:";

const PLANNER_INSTRUCTION: &str = r#"You are ResearchBot planning a research strategy.

Break the query into focused sub-questions if it would benefit from multiple searches.
For simple, direct questions, no sub-questions are needed.

Examples:
- "What was VaporWare?" -> No sub-questions needed
- "Who was Diana Reeves?" -> No sub-questions needed
- "Why did Vapor Labs fail and what lessons were learned?" -> "Why did Vapor Labs fail?", "What lessons were learned from Vapor Labs?"

Respond in this exact format:
SUB_QUESTIONS: comma-separated list, or "none" if the original query is sufficient
"#;

pub struct QueryPlanner {
    llm: Arc<dyn LlmClient>,
}

impl QueryPlanner {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Sub-questions for `query`, or `None` to search the query as-is.
    ///
    /// Completion failures propagate.
    pub async fn plan(&self, query: &str, limits: &CallLimits) -> Result<Option<Vec<String>>> {
        let input = format!("Query: {query}");
        let response = limits
            .run(
                "completion",
                self.llm.complete_text(Some(PLANNER_INSTRUCTION), &input),
            )
            .await?;

        let plan = parse_sub_questions(&response);
        match &plan {
            Some(questions) => info!(count = questions.len(), "Planned sub-questions"),
            None => debug!("No sub-questions needed"),
        }
        Ok(plan)
    }
}

/// Parse the value following the first `SUB_QUESTIONS:` marker.
///
/// Absent marker, `none`, `n/a` or an empty value yield `None`. Otherwise
/// the value is split on commas; entries are trimmed of whitespace and
/// surrounding quotes and empties dropped. A list that ends up empty is
/// also `None`.
pub fn parse_sub_questions(text: &str) -> Option<Vec<String>> {
    let (_, rest) = text.split_once(SUB_QUESTIONS_MARKER)?;
    let line = rest.lines().next().unwrap_or("").trim();

    let lowered = line.to_lowercase();
    if matches!(lowered.as_str(), "" | "none" | "n/a") {
        return None;
    }

    let questions: Vec<String> = line
        .split(',')
        .map(|q| q.trim().trim_matches(|c: char| matches!(c, '"' | '“' | '”')).trim())
        .filter(|q| !q.is_empty())
        .map(str::to_string)
        .collect();

    if questions.is_empty() {
        None
    } else {
        Some(questions)
    }
}

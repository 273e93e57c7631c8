//! Self-reflection: score findings and advance the iteration count.

use crate::guard::CallLimits;
use crate::research_loop::ResearchState;
use regex::Regex;
use researchbot_common::Result;
use researchbot_llm::LlmClient;
use std::sync::{Arc, LazyLock};
use tracing::debug;

/// Used when the response holds no parsable score.
pub const DEFAULT_CONFIDENCE: f32 = 0.7;

static SCORE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0?\.\d+|1\.0|0|1").expect("valid score pattern"));

const REFLECTION_INSTRUCTION: &str = r#"Evaluate these research findings on a scale of 0.0 to 1.0.

Consider:
- Does it fully address the question?
- Is it well-supported by cited sources?
- Are there significant gaps?

Respond with ONLY a number between 0.0 and 1.0:
"#;

pub struct Reflector {
    llm: Arc<dyn LlmClient>,
}

impl Reflector {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// Confidence in `[0.0, 1.0]` that `findings` answer `query`.
    pub async fn score(&self, query: &str, findings: &str, limits: &CallLimits) -> Result<f32> {
        let input = format!("Original Question: {query}\nFindings: {findings}");
        let response = limits
            .run(
                "completion",
                self.llm.complete_text(Some(REFLECTION_INSTRUCTION), &input),
            )
            .await?;
        Ok(parse_confidence(&response))
    }

    /// Score the state's findings, record the confidence and count the pass.
    pub async fn reflect(&self, state: &mut ResearchState, limits: &CallLimits) -> Result<f32> {
        let findings = state.findings.as_deref().unwrap_or_default();
        let confidence = self.score(&state.query, findings, limits).await?;
        state.set_confidence(confidence);
        state.iteration += 1;
        debug!(iteration = state.iteration, confidence, "Reflected");
        Ok(confidence)
    }
}

/// First score-like token in `text`, clamped; [`DEFAULT_CONFIDENCE`] if none.
pub fn parse_confidence(text: &str) -> f32 {
    SCORE_PATTERN
        .find(text.trim())
        .and_then(|m| m.as_str().parse::<f32>().ok())
        .unwrap_or(DEFAULT_CONFIDENCE)
        .clamp(0.0, 1.0)
}

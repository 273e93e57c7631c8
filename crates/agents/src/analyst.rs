//! Query analyst - turns the question into a research plan.

use crate::guard::CallLimits;
use crate::traits::Agent;
use async_trait::async_trait;
use researchbot_common::{AgentMessage, AgentRole, Result, ToolCapability, Transcript};
use researchbot_llm::LlmClient;
use std::sync::Arc;
use tracing::info;

const ANALYST_SYSTEM_PROMPT: &str = r#"You are the Query Analyst for ResearchBot.
Analyze research questions and create focused plans.
Consider any context about the user's ongoing research
that may inform your analysis.
For simple questions, direct search is sufficient.
For complex questions, break them into sub-questions.

End your analysis with one line in this exact format:
SUB_QUESTIONS: comma-separated list, or "none" if the original question is sufficient
"#;

/// Plans research without tools.
pub struct AnalystAgent {
    llm: Arc<dyn LlmClient>,
}

impl AnalystAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for AnalystAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Analyst
    }

    fn name(&self) -> &str {
        "Query Analyst"
    }

    fn tools(&self) -> &[ToolCapability] {
        &[]
    }

    fn system_prompt(&self) -> &str {
        ANALYST_SYSTEM_PROMPT
    }

    async fn run(&self, transcript: &Transcript, limits: &CallLimits) -> Result<AgentMessage> {
        info!(agent = %self.role(), "Analyzing question");

        let analysis = limits
            .run(
                "completion",
                self.llm
                    .complete_text(Some(self.system_prompt()), &transcript.render()),
            )
            .await?;

        Ok(AgentMessage::from_agent(self.role().as_str(), analysis))
    }
}

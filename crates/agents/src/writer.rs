//! Report writer - composes the final answer.

use crate::guard::CallLimits;
use crate::traits::Agent;
use async_trait::async_trait;
use researchbot_common::{AgentMessage, AgentRole, Result, ToolCapability, Transcript};
use researchbot_llm::LlmClient;
use std::sync::Arc;
use tracing::info;

const WRITER_SYSTEM_PROMPT: &str = r#"You are the Report Writer.
Synthesize research findings into clear responses.
Cite sources using [Source 1], [Source 2], etc.
Consider the user's research context and preferences
when tailoring your response."#;

pub struct WriterAgent {
    llm: Arc<dyn LlmClient>,
}

impl WriterAgent {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Agent for WriterAgent {
    fn role(&self) -> AgentRole {
        AgentRole::Writer
    }

    fn name(&self) -> &str {
        "Report Writer"
    }

    fn tools(&self) -> &[ToolCapability] {
        &[]
    }

    fn system_prompt(&self) -> &str {
        WRITER_SYSTEM_PROMPT
    }

    async fn run(&self, transcript: &Transcript, limits: &CallLimits) -> Result<AgentMessage> {
        info!(agent = %self.role(), "Writing report");

        let report = limits
            .run(
                "completion",
                self.llm
                    .complete_text(Some(self.system_prompt()), &transcript.render()),
            )
            .await?;

        Ok(AgentMessage::from_agent(self.role().as_str(), report))
    }
}

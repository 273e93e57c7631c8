//! The fixed delegation pipeline: analyst, then researcher, then writer.
//!
//! Order is structural. [`RolePipeline::new`] refuses agents that do not
//! fill the expected role at each position, and `run` always walks them in
//! that order. Each role sees the full transcript so far and appends its
//! output to it.

use crate::analyst::AnalystAgent;
use crate::dedup::Deduplicator;
use crate::guard::CallLimits;
use crate::researcher::ResearcherAgent;
use crate::traits::Agent;
use crate::writer::WriterAgent;
use researchbot_common::{AgentMessage, AgentRole, ResearchError, Result, Retriever, Transcript};
use researchbot_llm::LlmClient;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info};

/// Result of a pipeline execution.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    /// Results from each step, in execution order.
    pub steps: Vec<StepResult>,
    /// Total execution time in milliseconds.
    pub duration_ms: u64,
}

impl PipelineResult {
    /// The writer's message.
    pub fn final_output(&self) -> Option<&AgentMessage> {
        self.steps.last().map(|s| &s.output)
    }
}

/// Result of a single pipeline step.
#[derive(Debug, Clone)]
pub struct StepResult {
    pub role: AgentRole,
    pub agent_name: String,
    pub output: AgentMessage,
    /// Execution time for this step in milliseconds.
    pub duration_ms: u64,
}

pub struct RolePipeline {
    agents: [Arc<dyn Agent>; 3],
}

impl RolePipeline {
    pub fn new(
        analyst: Arc<dyn Agent>,
        researcher: Arc<dyn Agent>,
        writer: Arc<dyn Agent>,
    ) -> Result<Self> {
        let agents = [analyst, researcher, writer];
        for (agent, expected) in agents.iter().zip(AgentRole::ORDER) {
            if agent.role() != expected {
                return Err(ResearchError::Agent(format!(
                    "{} fills role {}, expected {}",
                    agent.name(),
                    agent.role(),
                    expected
                )));
            }
        }
        Ok(Self { agents })
    }

    /// The standard roles over one completion client and one knowledge base.
    pub fn standard(
        llm: Arc<dyn LlmClient>,
        retriever: Arc<dyn Retriever>,
        top_k: usize,
        dedup: Deduplicator,
    ) -> Self {
        Self {
            agents: [
                Arc::new(AnalystAgent::new(llm.clone())),
                Arc::new(
                    ResearcherAgent::new(llm.clone(), retriever)
                        .with_top_k(top_k)
                        .with_deduplicator(dedup),
                ),
                Arc::new(WriterAgent::new(llm)),
            ],
        }
    }

    pub fn agents(&self) -> &[Arc<dyn Agent>] {
        &self.agents
    }

    /// Run every role in order, appending each output to `transcript`.
    ///
    /// Stops at the first failing role and propagates its error.
    pub async fn run(&self, transcript: &mut Transcript, limits: &CallLimits) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let mut steps = Vec::with_capacity(self.agents.len());

        for (i, agent) in self.agents.iter().enumerate() {
            limits.check()?;
            let step_start = Instant::now();

            info!(step = i + 1, role = %agent.role(), "Delegating");

            let output = match agent.run(transcript, limits).await {
                Ok(output) => output,
                Err(e) => {
                    error!(step = i + 1, role = %agent.role(), error = %e, "Step failed");
                    return Err(e);
                }
            };

            debug!(
                step = i + 1,
                role = %agent.role(),
                output_len = output.content.len(),
                "Step completed"
            );

            transcript.push(output.clone());
            steps.push(StepResult {
                role: agent.role(),
                agent_name: agent.name().to_string(),
                output,
                duration_ms: step_start.elapsed().as_millis() as u64,
            });
        }

        Ok(PipelineResult {
            steps,
            duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

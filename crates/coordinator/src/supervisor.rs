//! Delegation supervisor.
//!
//! Runs the fixed role pipeline, bracketed by an optional memory search
//! before the analyst and an optional memory save after the writer:
//!
//! ```text
//! [search_memory] -> analyst -> researcher -> writer -> [manage_memory]
//! ```
//!
//! Memory lives under the `(memories, user_id)` namespace of the request.

use researchbot_agents::{CallLimits, RolePipeline, StepResult};
use researchbot_common::{
    AgentMessage, MemoryStore, Namespace, ResearchRequest, Result, ToolCapability, Transcript,
};
use researchbot_llm::LlmClient;
use researchbot_memory::format_memory_context;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Final answer when no role produced any output.
pub const SUPERVISOR_FALLBACK: &str = "Unable to find relevant information.";

const MEMORY_NOTE_INSTRUCTION: &str = r#"You are the Research Coordinator for ResearchBot, keeping long-term memory about this user's research.

Save important information about the user's research:
- Research topics and goals
- Preferences for detail level
- Key findings they've discovered
- Questions they're still exploring
- Anything the user explicitly asks to remember

Respond with a short note of one to three sentences, or NONE if nothing is worth saving."#;

/// What the supervisor did for one request.
#[derive(Debug, Clone)]
pub struct SupervisorOutcome {
    pub answer: String,
    pub transcript: Transcript,
    pub steps: Vec<StepResult>,
    /// Memory hits injected before the analyst ran
    pub memories_recalled: usize,
    /// ID of the memory record saved after the writer, if any
    pub memory_saved: Option<String>,
    pub duration_ms: u64,
}

struct MemoryBracket {
    store: Arc<dyn MemoryStore>,
    max_context_tokens: usize,
}

pub struct DelegationSupervisor {
    llm: Arc<dyn LlmClient>,
    pipeline: RolePipeline,
    memory: Option<MemoryBracket>,
}

impl DelegationSupervisor {
    pub fn new(llm: Arc<dyn LlmClient>, pipeline: RolePipeline) -> Self {
        Self {
            llm,
            pipeline,
            memory: None,
        }
    }

    /// Enable memory search before and memory save after the pipeline.
    pub fn with_memory(mut self, store: Arc<dyn MemoryStore>, max_context_tokens: usize) -> Self {
        self.memory = Some(MemoryBracket {
            store,
            max_context_tokens,
        });
        self
    }

    /// Tools the supervisor itself holds.
    pub fn tools(&self) -> &[ToolCapability] {
        if self.memory.is_some() {
            &[ToolCapability::SearchMemory, ToolCapability::ManageMemory]
        } else {
            &[]
        }
    }

    pub fn pipeline(&self) -> &RolePipeline {
        &self.pipeline
    }

    pub async fn research(&self, request: &ResearchRequest, limits: &CallLimits) -> Result<SupervisorOutcome> {
        request.validate()?;
        let start_time = Instant::now();
        let namespace = Namespace::memories(request.user_id.as_str());

        info!(
            request_id = %request.id,
            namespace = %namespace,
            memory = self.memory.is_some(),
            "Starting delegated research"
        );

        let mut transcript = Transcript::new(request.question.as_str());

        let mut memories_recalled = 0;
        if let Some(memory) = &self.memory {
            let hits = limits
                .run(
                    "memory",
                    memory.store.search(&namespace, &request.question),
                )
                .await?;
            memories_recalled = hits.len();
            if let Some(context) = format_memory_context(&hits, memory.max_context_tokens) {
                debug!(hits = hits.len(), "Injecting memory context");
                transcript.push(AgentMessage::system(context));
            }
        }

        let result = self.pipeline.run(&mut transcript, limits).await?;

        let answer = transcript
            .last_output()
            .map(|m| m.content.clone())
            .unwrap_or_else(|| SUPERVISOR_FALLBACK.to_string());

        let memory_saved = match &self.memory {
            Some(memory) => {
                self.save_memory(memory, &namespace, &request.question, &answer, limits)
                    .await?
            }
            None => None,
        };

        info!(
            request_id = %request.id,
            steps = result.steps.len(),
            memories_recalled,
            memory_saved = memory_saved.is_some(),
            "Delegated research completed"
        );

        Ok(SupervisorOutcome {
            answer,
            transcript,
            steps: result.steps,
            memories_recalled,
            memory_saved,
            duration_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    async fn save_memory(
        &self,
        memory: &MemoryBracket,
        namespace: &Namespace,
        question: &str,
        answer: &str,
        limits: &CallLimits,
    ) -> Result<Option<String>> {
        let input = format!("User question:\n{question}\n\nFinal answer:\n{answer}");
        let note = limits
            .run(
                "completion",
                self.llm.complete_text(Some(MEMORY_NOTE_INSTRUCTION), &input),
            )
            .await?;

        let Some(note) = memory_note(&note) else {
            debug!(namespace = %namespace, "Nothing worth remembering");
            return Ok(None);
        };

        let id = limits
            .run("memory", memory.store.save(namespace, note))
            .await?;
        info!(namespace = %namespace, memory_id = %id, "Saved memory");
        Ok(Some(id))
    }
}

/// The note to save, or `None` when the model declined.
fn memory_note(response: &str) -> Option<&str> {
    let note = response.trim();
    let bare = note.trim_end_matches('.').trim();
    if bare.is_empty() || bare.eq_ignore_ascii_case("none") {
        None
    } else {
        Some(note)
    }
}

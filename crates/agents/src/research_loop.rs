//! Self-reflective research loop.
//!
//! An explicit state machine:
//!
//! ```text
//! PLAN -> RETRIEVE -> SYNTHESIZE -> REFLECT -+-> DONE
//!            ^                               |
//!            +------- confidence too low ----+
//! ```
//!
//! `PLAN` runs exactly once. Out of `REFLECT` the loop stops when the
//! iteration ceiling is reached, otherwise retrieves again (same plan) while
//! confidence is below the threshold.

use crate::dedup::Deduplicator;
use crate::guard::CallLimits;
use crate::planner::QueryPlanner;
use crate::reflector::Reflector;
use crate::retrieval::RetrievalAdapter;
use crate::synthesizer::Synthesizer;
use researchbot_common::{ResearchRequest, Result, Retriever, Source};
use researchbot_llm::LlmClient;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Final answer when no findings were ever produced.
pub const NO_FINDINGS_MESSAGE: &str = "I wasn't able to find relevant information for your query.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    Plan,
    Retrieve,
    Synthesize,
    Reflect,
    Done,
}

/// Working state of one research request.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchState {
    pub query: String,
    /// Sub-questions; `None` means search the query itself.
    pub plan: Option<Vec<String>>,
    /// Replaced on every retrieval pass.
    pub sources: Vec<Source>,
    pub findings: Option<String>,
    pub confidence: Option<f32>,
    /// Completed reflect passes.
    pub iteration: u32,
    pub max_iterations: u32,
    pub confidence_threshold: f32,
}

impl ResearchState {
    pub fn new(query: impl Into<String>, max_iterations: u32, confidence_threshold: f32) -> Self {
        Self {
            query: query.into(),
            plan: None,
            sources: Vec::new(),
            findings: None,
            confidence: None,
            iteration: 0,
            max_iterations,
            confidence_threshold,
        }
    }

    pub fn from_request(request: &ResearchRequest) -> Self {
        Self::new(
            request.question.clone(),
            request.max_iterations,
            request.confidence_threshold,
        )
    }

    /// Queries for the next retrieval pass.
    pub fn queries(&self) -> Vec<String> {
        self.plan
            .clone()
            .unwrap_or_else(|| vec![self.query.clone()])
    }

    pub fn set_confidence(&mut self, confidence: f32) {
        self.confidence = Some(confidence.clamp(0.0, 1.0));
    }
}

/// Transition table of the loop.
pub fn next_phase(phase: Phase, state: &ResearchState) -> Phase {
    match phase {
        Phase::Plan => Phase::Retrieve,
        Phase::Retrieve => Phase::Synthesize,
        Phase::Synthesize => Phase::Reflect,
        Phase::Reflect => {
            if state.iteration >= state.max_iterations {
                Phase::Done
            } else if state.confidence.unwrap_or(0.0) < state.confidence_threshold {
                Phase::Retrieve
            } else {
                Phase::Done
            }
        }
        Phase::Done => Phase::Done,
    }
}

/// Result of a completed loop.
#[derive(Debug, Clone, Serialize)]
pub struct ResearchOutcome {
    pub answer: String,
    pub state: ResearchState,
    /// Every phase entered, ending with `Done`.
    pub trace: Vec<Phase>,
}

pub struct ResearchLoop {
    planner: QueryPlanner,
    retrieval: RetrievalAdapter,
    dedup: Deduplicator,
    synthesizer: Synthesizer,
    reflector: Reflector,
}

impl ResearchLoop {
    pub fn new(llm: Arc<dyn LlmClient>, retriever: Arc<dyn Retriever>) -> Self {
        Self {
            planner: QueryPlanner::new(llm.clone()),
            retrieval: RetrievalAdapter::new(retriever),
            dedup: Deduplicator::default(),
            synthesizer: Synthesizer::new(llm.clone()),
            reflector: Reflector::new(llm),
        }
    }

    pub fn with_deduplicator(mut self, dedup: Deduplicator) -> Self {
        self.dedup = dedup;
        self
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.retrieval = self.retrieval.with_top_k(top_k);
        self
    }

    /// Drive `request` to `DONE`.
    ///
    /// Any upstream failure or cancellation aborts the loop; findings that
    /// were never reflected on are not returned.
    pub async fn run(&self, request: &ResearchRequest, limits: &CallLimits) -> Result<ResearchOutcome> {
        request.validate()?;

        info!(
            request_id = %request.id,
            max_iterations = request.max_iterations,
            "Starting research loop"
        );

        let mut state = ResearchState::from_request(request);
        let mut phase = Phase::Plan;
        let mut trace = Vec::new();

        loop {
            trace.push(phase);
            if phase == Phase::Done {
                break;
            }

            if let Err(e) = self.step(phase, &mut state, limits).await {
                error!(request_id = %request.id, phase = ?phase, error = %e, "Research loop failed");
                return Err(e);
            }
            phase = next_phase(phase, &state);
        }

        info!(
            request_id = %request.id,
            iterations = state.iteration,
            confidence = state.confidence.unwrap_or_default(),
            sources = state.sources.len(),
            "Research loop completed"
        );

        let answer = state
            .findings
            .clone()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or_else(|| NO_FINDINGS_MESSAGE.to_string());

        Ok(ResearchOutcome {
            answer,
            state,
            trace,
        })
    }

    async fn step(&self, phase: Phase, state: &mut ResearchState, limits: &CallLimits) -> Result<()> {
        limits.check()?;
        match phase {
            Phase::Plan => {
                state.plan = self.planner.plan(&state.query, limits).await?;
            }
            Phase::Retrieve => {
                let retrieved = self.retrieval.retrieve(&state.queries(), limits).await?;
                let before = retrieved.len();
                state.sources = self.dedup.dedupe(retrieved);
                debug!(retrieved = before, kept = state.sources.len(), "Deduplicated sources");
            }
            Phase::Synthesize => {
                let findings = self
                    .synthesizer
                    .synthesize(&state.query, &state.sources, limits)
                    .await?;
                state.findings = Some(findings);
            }
            Phase::Reflect => {
                self.reflector.reflect(state, limits).await?;
            }
            Phase::Done => {}
        }
        Ok(())
    }
}

//! Research core for ResearchBot.
//!
//! Two orchestration modes share the same building blocks:
//!
//! - **Self-reflective loop** ([`ResearchLoop`]): plan, retrieve,
//!   deduplicate, synthesize and reflect until confident or out of
//!   iterations.
//! - **Role pipeline** ([`RolePipeline`]): a query analyst, a document
//!   researcher and a report writer, always in that order.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       RESEARCH CORE                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ResearchLoop                      RolePipeline              │
//! │  ┌────────┐ ┌──────────┐          ┌─────────┐               │
//! │  │Planner │→│Retrieval │          │ Analyst │               │
//! │  └────────┘ └────┬─────┘          └────┬────┘               │
//! │            ┌─────▼─────┐          ┌────▼──────┐             │
//! │            │  Dedup    │          │Researcher │──┐          │
//! │            └─────┬─────┘          └────┬──────┘  │          │
//! │  ┌─────────┐ ┌───▼────────┐       ┌────▼────┐    │          │
//! │  │Reflector│←│Synthesizer │       │ Writer  │    │          │
//! │  └─────────┘ └────────────┘       └─────────┘    │          │
//! │       │            ▲                             │          │
//! │       └────────────┘                             ▼          │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │            Retriever (knowledge base)                │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every capability call is bounded by [`CallLimits`].

pub mod analyst;
pub mod dedup;
pub mod guard;
pub mod pipeline;
pub mod planner;
pub mod reflector;
pub mod research_loop;
pub mod researcher;
pub mod retrieval;
pub mod synthesizer;
pub mod traits;
pub mod writer;

pub use analyst::AnalystAgent;
pub use dedup::{DEFAULT_PREFIX_CHARS, DedupKey, Deduplicator, PrefixKey};
pub use guard::{CallLimits, DEFAULT_CALL_TIMEOUT};
pub use pipeline::{PipelineResult, RolePipeline, StepResult};
pub use planner::{QueryPlanner, SUB_QUESTIONS_MARKER, parse_sub_questions};
pub use reflector::{DEFAULT_CONFIDENCE, Reflector, parse_confidence};
pub use research_loop::{
    NO_FINDINGS_MESSAGE, Phase, ResearchLoop, ResearchOutcome, ResearchState, next_phase,
};
pub use researcher::{NO_DOCUMENTS_MESSAGE, ResearcherAgent, format_search_results};
pub use retrieval::{RetrievalAdapter, TOP_K};
pub use synthesizer::{NO_SOURCES_MESSAGE, Synthesizer, numbered_context};
pub use traits::Agent;
pub use writer::WriterAgent;

//! Coordination layer for ResearchBot.
//!
//! Owns configuration, the delegation supervisor and the [`ResearchBot`]
//! facade that routes a question to the configured engine.
//!
//! ```text
//!           research(question, user_id?, max_iterations?)
//!                            │
//!                            ▼
//!                    ┌───────────────┐
//!                    │  ResearchBot  │
//!                    └───────┬───────┘
//!            self_reflective │ multi_agent
//!            ┌───────────────┴────────────────┐
//!            ▼                                ▼
//!     ┌──────────────┐              ┌────────────────────┐
//!     │ ResearchLoop │              │DelegationSupervisor│ ◄── memory
//!     └──────────────┘              └─────────┬──────────┘
//!                                             ▼
//!                               analyst → researcher → writer
//! ```

pub mod bot;
pub mod config;
pub mod supervisor;

pub use bot::ResearchBot;
pub use config::{BotConfig, ResearchConfig, ResearchMode};
pub use supervisor::{DelegationSupervisor, SUPERVISOR_FALLBACK, SupervisorOutcome};

//! Completion capability for ResearchBot.
//!
//! An OpenAI-compatible chat client wrapped in retry and concurrency
//! limiting layers. The orchestration core only sees [`LlmClient`].

pub mod client;
pub mod config;
pub mod openai;
pub mod retry;

pub use client::{ChatMessage, LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};
pub use config::{LlmConfig, SemaphoredClient, build_llm_client};
pub use openai::OpenAiClient;
pub use retry::{RetryConfig, RetryingClient};

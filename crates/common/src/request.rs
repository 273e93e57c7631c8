//! Per-request research configuration.

use crate::{ResearchError, Result};
use serde::{Deserialize, Serialize};

/// Identity used for memory operations when the caller supplies none.
pub const DEFAULT_USER_ID: &str = "default_user";

/// Default ceiling on reflect passes.
pub const DEFAULT_MAX_ITERATIONS: u32 = 3;

/// Confidence below which the research loop retrieves again.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.6;

/// A single research request with its explicit configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchRequest {
    /// Unique request ID
    pub id: String,

    /// The natural-language question
    pub question: String,

    /// Memory namespace owner
    pub user_id: String,

    /// Maximum number of reflect passes (>= 1)
    pub max_iterations: u32,

    /// Confidence threshold for stopping the loop
    pub confidence_threshold: f32,
}

impl ResearchRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            id: format!("req_{}", uuid::Uuid::new_v4()),
            question: question.into(),
            user_id: DEFAULT_USER_ID.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }

    pub fn with_user(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = user_id.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Reject requests the research loop cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.question.trim().is_empty() {
            return Err(ResearchError::Config("Question must not be empty".into()));
        }
        if self.max_iterations == 0 {
            return Err(ResearchError::Config(
                "max_iterations must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(ResearchError::Config(format!(
                "confidence_threshold {} is outside [0.0, 1.0]",
                self.confidence_threshold
            )));
        }
        if self.user_id.trim().is_empty() {
            return Err(ResearchError::Config("user_id must not be empty".into()));
        }
        Ok(())
    }
}

use std::time::Duration;

use async_trait::async_trait;
use researchbot_common::{ResearchError, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::client::{LlmClient, LlmRequest, LlmResponse};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 30_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Retries transient completion failures with exponential backoff.
///
/// Retrying lives here, in the capability adapter; the planner,
/// synthesizer and reflector never retry on their own.
pub struct RetryingClient<T: LlmClient> {
    inner: T,
    config: RetryConfig,
}

const TRANSIENT_MARKERS: &[&str] = &[
    "429",
    "rate limit",
    "500",
    "502",
    "503",
    "504",
    "bad gateway",
    "service unavailable",
    "gateway timeout",
    "connection reset",
];

impl<T: LlmClient> RetryingClient<T> {
    pub fn new(inner: T, config: RetryConfig) -> Self {
        Self { inner, config }
    }

    fn is_transient(error: &ResearchError) -> bool {
        match error {
            ResearchError::Timeout { .. } => true,
            ResearchError::Completion(msg) => {
                let lower = msg.to_lowercase();
                TRANSIENT_MARKERS.iter().any(|m| lower.contains(m))
            }
            _ => false,
        }
    }

    /// Seconds from a `Retry-After: N` hint embedded in the error, as millis.
    fn retry_after_ms(error: &ResearchError) -> Option<u64> {
        let ResearchError::Completion(msg) = error else {
            return None;
        };
        let pos = msg.to_lowercase().find("retry-after")?;
        msg[pos..]
            .split_whitespace()
            .skip(1)
            .find_map(|word| {
                word.trim_matches(|c: char| !c.is_ascii_digit())
                    .parse::<u64>()
                    .ok()
            })
            .map(|secs| secs * 1000)
    }

    fn backoff_ms(&self, attempt: u32) -> u64 {
        let base = self.config.initial_delay_ms as f64
            * self.config.backoff_multiplier.powi(attempt as i32);
        // Deterministic spread so concurrent requests do not retry in lockstep.
        let spread = (attempt.wrapping_mul(2_654_435_761) % 100) as f64 / 1000.0;
        let delay = (base * (1.0 + spread)) as u64;
        delay.min(self.config.max_delay_ms)
    }
}

#[async_trait]
impl<T: LlmClient> LlmClient for RetryingClient<T> {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let mut attempt = 0;
        loop {
            let error = match self.inner.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(e) => e,
            };

            if attempt >= self.config.max_retries || !Self::is_transient(&error) {
                return Err(error);
            }

            let delay = Self::retry_after_ms(&error)
                .unwrap_or_else(|| self.backoff_ms(attempt))
                .min(self.config.max_delay_ms);

            warn!(
                attempt = attempt + 1,
                max_retries = self.config.max_retries,
                delay_ms = delay,
                error = %error,
                "Retrying completion request"
            );

            tokio::time::sleep(Duration::from_millis(delay)).await;
            attempt += 1;
        }
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

//! Timeout and cancellation bounds for capability calls.
//!
//! Every completion, retrieval and memory call made on behalf of a research
//! request goes through [`CallLimits::run`], which races the call against a
//! per-call timeout and the request's cancellation token.

use researchbot_common::{ResearchError, Result};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Default per-call timeout.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone)]
pub struct CallLimits {
    timeout: Duration,
    cancel: CancellationToken,
}

impl CallLimits {
    pub fn new(timeout: Duration, cancel: CancellationToken) -> Self {
        Self { timeout, cancel }
    }

    /// Limits with a fresh, never-cancelled token.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self::new(timeout, CancellationToken::new())
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// `Err(Cancelled)` once the request has been cancelled.
    pub fn check(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(ResearchError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Run `call`, aborting it on cancellation or after the timeout.
    ///
    /// Dropping the future on either path aborts the in-flight request.
    pub async fn run<T, F>(&self, capability: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ResearchError::Cancelled),
            outcome = tokio::time::timeout(self.timeout, call) => match outcome {
                Ok(result) => result,
                Err(_) => Err(ResearchError::Timeout {
                    capability,
                    timeout_ms: self.timeout.as_millis() as u64,
                }),
            },
        }
    }
}

impl Default for CallLimits {
    fn default() -> Self {
        Self::with_timeout(DEFAULT_CALL_TIMEOUT)
    }
}

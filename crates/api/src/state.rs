//! Application state for the API server.

use researchbot_coordinator::{BotConfig, ResearchBot};
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for the API server.
pub struct AppState {
    /// The research facade behind every endpoint
    pub bot: Arc<ResearchBot>,

    /// Server start time (for health checks)
    pub start_time: Instant,
}

impl AppState {
    pub fn new(bot: ResearchBot) -> Self {
        Self {
            bot: Arc::new(bot),
            start_time: Instant::now(),
        }
    }

    /// Build the production stack from configuration.
    pub fn from_config(config: BotConfig) -> researchbot_common::Result<Self> {
        Ok(Self::new(ResearchBot::from_config(config)?))
    }

    /// Get the uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

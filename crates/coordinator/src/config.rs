//! Configuration for ResearchBot.
//!
//! # Security Features
//!
//! - Config file permission validation on Unix systems
//! - Rejects world-readable files containing API keys
//! - Warns about API keys stored in config files

use researchbot_agents::{DEFAULT_CALL_TIMEOUT, DEFAULT_PREFIX_CHARS};
use researchbot_common::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_MAX_ITERATIONS, DEFAULT_USER_ID,
};
use researchbot_knowledge::KnowledgeConfig;
use researchbot_llm::LlmConfig;
use researchbot_memory::MemoryConfig;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BotConfig {
    /// Completion provider
    #[serde(default)]
    pub llm: LlmConfig,

    /// Long-term memory
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Knowledge base and ingestion
    #[serde(default)]
    pub knowledge: KnowledgeConfig,

    /// Orchestration defaults
    #[serde(default)]
    pub research: ResearchConfig,
}

/// Which orchestration engine answers `research`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResearchMode {
    /// Plan, retrieve, synthesize, reflect until confident
    #[default]
    SelfReflective,
    /// Analyst, researcher, writer under a supervisor with memory
    MultiAgent,
}

impl ResearchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResearchMode::SelfReflective => "self_reflective",
            ResearchMode::MultiAgent => "multi_agent",
        }
    }
}

impl fmt::Display for ResearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResearchConfig {
    #[serde(default)]
    pub mode: ResearchMode,

    /// Reflect passes before the loop stops regardless of confidence
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Confidence below which the loop retrieves again
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Memory identity for callers that supply none
    #[serde(default = "default_user_id")]
    pub default_user_id: String,

    /// Content prefix length used as the dedup key
    #[serde(default = "default_dedup_prefix_chars")]
    pub dedup_prefix_chars: usize,

    /// Per-call timeout for completion, retrieval and memory calls
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,

    /// Bracket the role pipeline with memory search and save
    #[serde(default = "default_memory_enabled")]
    pub memory_enabled: bool,
}

fn default_max_iterations() -> u32 {
    DEFAULT_MAX_ITERATIONS
}

fn default_confidence_threshold() -> f32 {
    DEFAULT_CONFIDENCE_THRESHOLD
}

fn default_user_id() -> String {
    DEFAULT_USER_ID.into()
}

fn default_dedup_prefix_chars() -> usize {
    DEFAULT_PREFIX_CHARS
}

fn default_call_timeout_ms() -> u64 {
    DEFAULT_CALL_TIMEOUT.as_millis() as u64
}

fn default_memory_enabled() -> bool {
    true
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            mode: ResearchMode::default(),
            max_iterations: default_max_iterations(),
            confidence_threshold: default_confidence_threshold(),
            default_user_id: default_user_id(),
            dedup_prefix_chars: default_dedup_prefix_chars(),
            call_timeout_ms: default_call_timeout_ms(),
            memory_enabled: default_memory_enabled(),
        }
    }
}

impl ResearchConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl BotConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Security
    ///
    /// On Unix systems, this function validates that:
    /// - The file is a regular file (not a symlink)
    /// - The file is not world-readable if it contains an API key
    /// - Warns if API keys are stored in the config file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();

        #[cfg(unix)]
        validate_config_file_permissions(path)?;

        let config = Self::from_file_unchecked(path)?;

        if config.llm.api_key.is_some() {
            warn!(
                "API key found in config file '{}'. For better security, \
                 use the OPENAI_API_KEY environment variable instead.",
                path.display()
            );
        }

        Ok(config)
    }

    /// Load configuration from a TOML file without permission checks.
    ///
    /// Use this only for testing or when you've already validated the file.
    pub fn from_file_unchecked(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the orchestration engines cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let research = &self.research;
        if research.max_iterations == 0 {
            anyhow::bail!("research.max_iterations must be at least 1");
        }
        if !(0.0..=1.0).contains(&research.confidence_threshold) {
            anyhow::bail!(
                "research.confidence_threshold {} is outside [0.0, 1.0]",
                research.confidence_threshold
            );
        }
        if research.default_user_id.trim().is_empty() {
            anyhow::bail!("research.default_user_id must not be empty");
        }
        if research.call_timeout_ms == 0 {
            anyhow::bail!("research.call_timeout_ms must be positive");
        }
        if research.dedup_prefix_chars == 0 {
            anyhow::bail!("research.dedup_prefix_chars must be positive");
        }
        if self.knowledge.chunk_size == 0 {
            anyhow::bail!("knowledge.chunk_size must be positive");
        }
        if self.knowledge.top_k == 0 {
            anyhow::bail!("knowledge.top_k must be positive");
        }
        Ok(())
    }
}

/// Validate config file permissions on Unix systems.
///
/// Requirements:
/// - File must be a regular file (not symlink, directory, etc.)
/// - File must not be world-writable (mode & 0o002 == 0)
/// - If file contains API key patterns, must not be world-readable
#[cfg(unix)]
fn validate_config_file_permissions(path: &std::path::Path) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = std::fs::symlink_metadata(path)
        .map_err(|e| anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e))?;

    if !metadata.is_file() {
        anyhow::bail!(
            "Config path '{}' is not a regular file. Symlinks and directories are not allowed.",
            path.display()
        );
    }

    let permission_bits = metadata.permissions().mode() & 0o777;

    if permission_bits & 0o002 != 0 {
        anyhow::bail!(
            "Config file '{}' is world-writable (mode {:04o}). \
             This is a security risk. Fix with: chmod o-w {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    let content = std::fs::read_to_string(path).unwrap_or_default();
    let has_api_key = content.contains("api_key")
        && (content.contains("sk-") || content.contains("key ="));

    if has_api_key && permission_bits & 0o004 != 0 {
        anyhow::bail!(
            "Config file '{}' contains an API key but is world-readable (mode {:04o}). \
             This is a security risk. Fix with: chmod 600 {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    if has_api_key && permission_bits & 0o040 != 0 {
        warn!(
            "Config file '{}' contains an API key and is group-readable (mode {:04o}). \
             Consider restricting access with: chmod 600 {}",
            path.display(),
            permission_bits,
            path.display()
        );
    }

    Ok(())
}

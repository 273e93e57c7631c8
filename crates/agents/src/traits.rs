//! The specialist role contract.

use crate::guard::CallLimits;
use async_trait::async_trait;
use researchbot_common::{AgentMessage, AgentRole, Result, ToolCapability, Transcript};

/// A specialist role in the delegation pipeline.
///
/// Roles are stateless between invocations: everything they know about a
/// request arrives in the transcript.
#[async_trait]
pub trait Agent: Send + Sync {
    /// The role this agent fills.
    fn role(&self) -> AgentRole;

    /// Human-readable name.
    fn name(&self) -> &str;

    /// Tools this role may use. Possibly empty.
    fn tools(&self) -> &[ToolCapability];

    fn has_tool(&self, tool: ToolCapability) -> bool {
        self.tools().contains(&tool)
    }

    /// The fixed system instruction for this role.
    fn system_prompt(&self) -> &str;

    /// Produce this role's contribution given the running transcript.
    async fn run(&self, transcript: &Transcript, limits: &CallLimits) -> Result<AgentMessage>;
}

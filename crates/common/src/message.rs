//! Message and transcript types passed between the supervisor and its roles.

use serde::{Deserialize, Serialize};

/// Role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// A single entry in a research transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentMessage {
    /// Unique message ID
    pub id: String,

    /// Role of the sender
    pub role: MessageRole,

    /// Message content
    pub content: String,

    /// Name of the specialist role that produced this message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_agent: Option<String>,

    /// Timestamp (Unix millis)
    pub timestamp: u64,
}

impl AgentMessage {
    fn with_role(role: MessageRole, content: String, source_agent: Option<String>) -> Self {
        Self {
            id: format!("msg_{}", uuid::Uuid::new_v4()),
            role,
            content,
            source_agent,
            timestamp: now_millis(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content.into(), None)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::System, content.into(), None)
    }

    pub fn from_agent(agent: impl Into<String>, content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content.into(), Some(agent.into()))
    }
}

/// The running record of one delegated research request: the original
/// question, any injected context and every role output, in order.
///
/// Each specialist receives the whole transcript as its working context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    question: String,
    messages: Vec<AgentMessage>,
}

impl Transcript {
    pub fn new(question: impl Into<String>) -> Self {
        let question = question.into();
        Self {
            messages: vec![AgentMessage::user(question.clone())],
            question,
        }
    }

    /// The original question.
    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn push(&mut self, message: AgentMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[AgentMessage] {
        &self.messages
    }

    /// Latest output produced by the named role, if it has run.
    pub fn last_from(&self, agent: &str) -> Option<&AgentMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.source_agent.as_deref() == Some(agent))
    }

    /// Latest assistant output of any role.
    pub fn last_output(&self) -> Option<&AgentMessage> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == MessageRole::Assistant && !m.content.trim().is_empty())
    }

    /// Render the transcript as prompt input.
    pub fn render(&self) -> String {
        self.messages
            .iter()
            .map(|m| match (&m.role, &m.source_agent) {
                (MessageRole::User, _) => format!("User question:\n{}", m.content),
                (MessageRole::System, _) => format!("Context:\n{}", m.content),
                (MessageRole::Assistant, Some(agent)) => format!("[{}]\n{}", agent, m.content),
                (MessageRole::Assistant, None) => m.content.clone(),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

pub(crate) fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

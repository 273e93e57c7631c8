use async_trait::async_trait;
use researchbot_common::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LlmRequest {
    pub system_prompt: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl LlmRequest {
    /// One-shot request: an optional instruction plus a single user input.
    pub fn prompt(system_prompt: Option<&str>, input: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.map(str::to_string),
            messages: vec![ChatMessage {
                role: Role::User,
                content: input.into(),
            }],
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    pub content: String,
    pub model: String,
    pub usage: Option<TokenUsage>,
    pub finish_reason: Option<String>,
}

/// The completion capability: stateless, one-shot text completion.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse>;

    fn model_name(&self) -> &str;

    /// `complete(instruction, input) -> text`.
    async fn complete_text(&self, system_prompt: Option<&str>, input: &str) -> Result<String> {
        let response = self.complete(LlmRequest::prompt(system_prompt, input)).await?;
        Ok(response.content)
    }
}

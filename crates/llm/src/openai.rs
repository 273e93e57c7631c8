use std::time::Duration;

use async_trait::async_trait;
use researchbot_common::{ResearchError, Result};
use serde::{Deserialize, Serialize};

use crate::client::{LlmClient, LlmRequest, LlmResponse, Role, TokenUsage};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    model: String,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct Choice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

/// Client for any OpenAI-compatible `/v1/chat/completions` endpoint.
pub struct OpenAiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    timeout: Duration,
    default_temperature: Option<f32>,
    default_max_tokens: Option<u32>,
    http_client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(
        base_url: Option<String>,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ResearchError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            model,
            api_key,
            timeout,
            default_temperature: None,
            default_max_tokens: None,
            http_client,
        })
    }

    /// Sampling settings applied when a request leaves them unset.
    pub fn with_defaults(mut self, temperature: Option<f32>, max_tokens: Option<u32>) -> Self {
        self.default_temperature = temperature;
        self.default_max_tokens = max_tokens;
        self
    }

    fn wire_role(role: Role) -> &'static str {
        match role {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }

    fn build_body<'a>(&'a self, request: &LlmRequest) -> ChatCompletionRequest<'a> {
        let system = request.system_prompt.iter().map(|s| WireMessage {
            role: "system".to_string(),
            content: Some(s.clone()),
        });
        let rest = request.messages.iter().map(|m| WireMessage {
            role: Self::wire_role(m.role).to_string(),
            content: Some(m.content.clone()),
        });

        ChatCompletionRequest {
            model: &self.model,
            messages: system.chain(rest).collect(),
            temperature: request.temperature.or(self.default_temperature),
            max_completion_tokens: request.max_tokens.or(self.default_max_tokens),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: LlmRequest) -> Result<LlmResponse> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = self.build_body(&request);

        let mut http_req = self.http_client.post(&url).json(&body);
        if let Some(ref key) = self.api_key {
            http_req = http_req.bearer_auth(key);
        }

        let response = http_req.send().await.map_err(|e| {
            if e.is_timeout() {
                ResearchError::Timeout {
                    capability: "completion",
                    timeout_ms: self.timeout.as_millis() as u64,
                }
            } else {
                ResearchError::Completion(format!("request to {url} failed: {e}"))
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .map(|v| format!(", Retry-After: {v}"))
                .unwrap_or_default();
            let body_text = response.text().await.unwrap_or_default();
            return Err(ResearchError::Completion(format!(
                "API error {status}: {body_text}{retry_after}"
            )));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| ResearchError::Completion(format!("malformed response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ResearchError::Completion("response contained no choices".into()))?;

        Ok(LlmResponse {
            content: choice.message.content.unwrap_or_default(),
            model: parsed.model,
            usage: parsed.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
            }),
            finish_reason: choice.finish_reason,
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChatMessage;

    fn client(base_url: Option<&str>) -> OpenAiClient {
        OpenAiClient::new(
            base_url.map(str::to_string),
            "gpt-5-nano".to_string(),
            Some("sk-test".to_string()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn body_puts_system_prompt_first() {
        let client = client(None);
        let request = LlmRequest {
            system_prompt: Some("Be helpful.".to_string()),
            messages: vec![ChatMessage {
                role: Role::User,
                content: "Hello".to_string(),
            }],
            temperature: Some(0.5),
            max_tokens: Some(512),
        };

        let json = serde_json::to_value(client.build_body(&request)).unwrap();

        assert_eq!(json["model"], "gpt-5-nano");
        assert_eq!(json["temperature"], 0.5);
        assert_eq!(json["max_completion_tokens"], 512);
        let messages = json["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[1]["content"], "Hello");
    }

    #[test]
    fn body_omits_unset_fields() {
        let client = client(None);
        let json = serde_json::to_value(client.build_body(&LlmRequest::prompt(None, "Hi"))).unwrap();

        assert_eq!(json["messages"].as_array().unwrap().len(), 1);
        assert!(json.get("temperature").is_none());
        assert!(json.get("max_completion_tokens").is_none());
    }

    #[test]
    fn defaults_fill_unset_sampling_fields() {
        let client = client(None).with_defaults(Some(0.2), Some(256));
        let json = serde_json::to_value(client.build_body(&LlmRequest::prompt(None, "Hi"))).unwrap();
        assert!((json["temperature"].as_f64().unwrap() - 0.2).abs() < 1e-6);
        assert_eq!(json["max_completion_tokens"], 256);
    }

    #[test]
    fn base_url_defaults_and_trims() {
        assert_eq!(client(None).base_url, "https://api.openai.com");
        assert_eq!(
            client(Some("http://localhost:11434/")).base_url,
            "http://localhost:11434"
        );
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_completion_error() {
        let client = client(Some("http://127.0.0.1:1"));
        let err = client
            .complete(LlmRequest::prompt(None, "Hi"))
            .await
            .unwrap_err();
        assert!(err.is_upstream());
    }
}

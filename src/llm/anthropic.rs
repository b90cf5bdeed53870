use crate::error::{Result, ScoutError};
use crate::llm::client::{parse_json_payload, CompletionRequest, CompletionResponse, ModelClient, Usage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const ANTHROPIC_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic messages-API client
pub struct AnthropicClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: &'a str,
    messages: Vec<ApiMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: ApiUsage,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize, Default)]
struct ApiUsage {
    #[serde(default)]
    input_tokens: u64,
    #[serde(default)]
    output_tokens: u64,
}

impl AnthropicClient {
    /// Create a client for the given model and credentials
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: Option<&str>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url
                .unwrap_or(ANTHROPIC_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ModelClient for AnthropicClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = ApiRequest {
            model: &self.model,
            messages: vec![ApiMessage { role: "user", content: &request.user }],
            system: request.system.as_deref(),
            max_tokens: request.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: request.temperature,
        };

        let started = Instant::now();

        let response = self
            .http
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoutError::ModelCall(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::ModelCall(format!("status {}: {}", status, body)));
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::ModelCall(e.to_string()))?;

        let mut text = String::new();
        for block in &parsed.content {
            if let ContentBlock::Text { text: t } = block {
                text.push_str(t);
            }
        }

        if text.is_empty() {
            return Err(ScoutError::InvalidModelResponse(
                "completion had no text content".to_string(),
            ));
        }

        Ok(CompletionResponse {
            data: parse_json_payload(&text)?,
            usage: Usage {
                prompt_tokens: parsed.usage.input_tokens,
                completion_tokens: parsed.usage.output_tokens,
                inference_time_ms: started.elapsed().as_millis() as u64,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_api_request_serialization() {
        let body = ApiRequest {
            model: "claude-3-7-sonnet-latest",
            messages: vec![ApiMessage { role: "user", content: "find the button" }],
            system: Some("locate elements"),
            max_tokens: 4096,
            temperature: None,
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "claude-3-7-sonnet-latest");
        assert_eq!(value["system"], "locate elements");
        assert_eq!(value["max_tokens"], 4096);
        assert!(value.get("temperature").is_none());
    }

    #[test]
    fn test_api_response_deserialization() {
        let value = json!({
            "id": "msg_1",
            "content": [
                {"type": "text", "text": "{\"elements\":"},
                {"type": "text", "text": " []}"}
            ],
            "usage": {"input_tokens": 20, "output_tokens": 4}
        });

        let parsed: ApiResponse = serde_json::from_value(value).unwrap();
        assert_eq!(parsed.content.len(), 2);
        assert_eq!(parsed.usage.input_tokens, 20);
    }

    #[test]
    fn test_unknown_content_blocks_are_tolerated() {
        let value = json!({
            "content": [
                {"type": "thinking", "thinking": "hmm"},
                {"type": "text", "text": "{}"}
            ]
        });

        let parsed: ApiResponse = serde_json::from_value(value).unwrap();
        let text: Vec<_> = parsed
            .content
            .iter()
            .filter(|b| matches!(b, ContentBlock::Text { .. }))
            .collect();
        assert_eq!(text.len(), 1);
    }
}

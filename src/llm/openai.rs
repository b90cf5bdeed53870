use crate::error::{Result, ScoutError};
use crate::llm::client::{parse_json_payload, CompletionRequest, CompletionResponse, ModelClient, Usage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const CEREBRAS_BASE_URL: &str = "https://api.cerebras.ai/v1";
pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Shared wire core for chat-completions-compatible backends
///
/// Several vendor families speak the same `/chat/completions` shape and
/// differ only in base URL and credentials; their concrete clients all
/// delegate here.
pub(crate) struct ChatCompletionsCore {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: ApiUsage,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct ApiUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl ChatCompletionsCore {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let mut messages = Vec::new();
        if let Some(system) = request.system.as_deref() {
            messages.push(ChatMessage { role: "system", content: system });
        }
        messages.push(ChatMessage { role: "user", content: &request.user });

        let body = ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: ResponseFormat { format_type: "json_object" },
        };

        let started = Instant::now();

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ScoutError::ModelCall(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::ModelCall(format!("status {}: {}", status, body)));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ScoutError::ModelCall(e.to_string()))?;

        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .ok_or_else(|| ScoutError::InvalidModelResponse("completion had no content".to_string()))?;

        Ok(CompletionResponse {
            data: parse_json_payload(content)?,
            usage: Usage {
                prompt_tokens: parsed.usage.prompt_tokens,
                completion_tokens: parsed.usage.completion_tokens,
                inference_time_ms: started.elapsed().as_millis() as u64,
            },
        })
    }
}

/// OpenAI chat-completions client
pub struct OpenAiClient {
    core: ChatCompletionsCore,
}

impl OpenAiClient {
    /// Create a client for the given model and credentials
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: Option<&str>) -> Self {
        Self {
            core: ChatCompletionsCore::new(base_url.unwrap_or(OPENAI_BASE_URL), api_key, model),
        }
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    fn model_name(&self) -> &str {
        self.core.model()
    }

    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.core.create_completion(request).await
    }
}

/// Cerebras inference client (chat-completions compatible)
pub struct CerebrasClient {
    core: ChatCompletionsCore,
}

impl CerebrasClient {
    /// Create a client for the given model and credentials
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: Option<&str>) -> Self {
        Self {
            core: ChatCompletionsCore::new(base_url.unwrap_or(CEREBRAS_BASE_URL), api_key, model),
        }
    }
}

#[async_trait]
impl ModelClient for CerebrasClient {
    fn model_name(&self) -> &str {
        self.core.model()
    }

    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.core.create_completion(request).await
    }
}

/// Groq inference client (chat-completions compatible)
pub struct GroqClient {
    core: ChatCompletionsCore,
}

impl GroqClient {
    /// Create a client for the given model and credentials
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: Option<&str>) -> Self {
        Self {
            core: ChatCompletionsCore::new(base_url.unwrap_or(GROQ_BASE_URL), api_key, model),
        }
    }
}

#[async_trait]
impl ModelClient for GroqClient {
    fn model_name(&self) -> &str {
        self.core.model()
    }

    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.core.create_completion(request).await
    }
}

use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One inference call: a prompt pair plus the request it belongs to
///
/// The request id scopes caching; the payload fields are what the backend
/// actually sees.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CompletionRequest {
    /// Logical request identifier (cache scope, not sent to the backend)
    pub request_id: String,

    /// System prompt, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// User message
    pub user: String,

    /// Sampling temperature override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Maximum completion tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl CompletionRequest {
    /// Create a request with the given id and user message
    pub fn new(request_id: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            system: None,
            user: user.into(),
            temperature: None,
            max_tokens: None,
        }
    }

    /// Builder method: set the system prompt
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Builder method: set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Builder method: set the maximum completion tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// Token and latency accounting for one completion
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub inference_time_ms: u64,
}

/// A structured completion: the parsed JSON payload plus usage metrics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletionResponse {
    /// The JSON object the model produced
    pub data: serde_json::Value,

    /// Token counts and latency for this call
    pub usage: Usage,
}

/// Capability trait for model backends
///
/// One required operation: submit a prompt, receive a structured completion
/// plus usage metrics. One implementation per vendor family; the gateway
/// picks the right one.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// The model identifier this client submits to
    fn model_name(&self) -> &str;

    /// Run one completion
    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse>;
}

/// Extract the JSON object from a completion's text
///
/// Backends are instructed to answer with a single JSON object, but some wrap
/// it in prose or code fences; the outermost brace pair is authoritative.
pub(crate) fn parse_json_payload(text: &str) -> Result<serde_json::Value> {
    let trimmed = text.trim();

    if let Ok(value) = serde_json::from_str(trimmed) {
        return Ok(value);
    }

    let start = trimmed.find('{');
    let end = trimmed.rfind('}');
    if let (Some(start), Some(end)) = (start, end) {
        if start < end {
            if let Ok(value) = serde_json::from_str(&trimmed[start..=end]) {
                return Ok(value);
            }
        }
    }

    Err(ScoutError::InvalidModelResponse(format!(
        "no JSON object in completion: {}",
        truncate(trimmed, 200)
    )))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

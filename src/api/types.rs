use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One log line forwarded from the remote session to the caller's sink
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LogLine {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub auxiliary: HashMap<String, Value>,
}

/// Generic response envelope used by non-streamed endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub data: Option<T>,
}

/// Parameters for the session-start call
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionParams {
    pub model_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dom_settle_timeout_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbose: Option<u8>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_heal: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_timeout_ms: Option<u64>,

    /// Opaque session-create parameters forwarded to the remote service
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_create_params: Option<Value>,

    /// Existing remote session to attach to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Result of the session-start call
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionResult {
    pub session_id: Option<String>,

    #[serde(default)]
    pub available: Option<bool>,
}

/// Options for a delegated act call
#[derive(Debug, Clone, Default, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActOptions {
    pub action: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<HashMap<String, String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Result of a delegated act call
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ActResult {
    pub success: bool,
    pub message: String,
    pub action: String,
}

/// Options for a delegated extract call
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,

    /// JSON Schema describing the expected extraction shape
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_definition: Option<Value>,
}

impl ExtractOptions {
    /// Create options for a free-form extraction
    pub fn new(instruction: impl Into<String>) -> Self {
        Self {
            instruction: Some(instruction.into()),
            schema_definition: None,
        }
    }

    /// Attach the JSON Schema of a typed extraction target
    pub fn with_schema<T: JsonSchema>(mut self) -> Self {
        let schema = schemars::schema_for!(T);
        self.schema_definition = serde_json::to_value(schema).ok();
        self
    }
}

/// Options for a delegated observe call
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObserveOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instruction: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_action: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub draw_overlay: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub iframes: Option<bool>,
}

/// Navigation options forwarded to the remote session
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GotoOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_until: Option<String>,
}

/// Agent configuration for delegated agent execution
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,

    /// Local-only integration endpoints; rejected in delegated mode
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<String>,
}

/// Execution options for delegated agent execution
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentExecuteOptions {
    pub instruction: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_steps: Option<u32>,
}

/// Result of delegated agent execution
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentResult {
    pub success: bool,

    #[serde(default)]
    pub message: Option<String>,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub actions: Vec<Value>,
}

use crate::error::{Result, ScoutError};
use crate::llm::client::{parse_json_payload, CompletionRequest, CompletionResponse, ModelClient, Usage};
use crate::llm::gateway::ClientOptions;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Instant;

pub const GOOGLE_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Credential style for the generateContent endpoint
enum GoogleAuth {
    /// Developer API key sent as `x-goog-api-key`
    ApiKey(String),
    /// OAuth access token (vertex-managed deployments)
    Bearer(String),
}

/// Google generateContent client
pub struct GoogleClient {
    http: reqwest::Client,
    endpoint: String,
    auth: GoogleAuth,
    model: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ApiRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    usage_metadata: UsageMetadata,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u64,
    #[serde(default)]
    candidates_token_count: u64,
}

impl GoogleClient {
    /// Create a client against the public generateContent endpoint
    pub fn new(model: impl Into<String>, api_key: impl Into<String>, base_url: Option<&str>) -> Self {
        let model = model.into();
        let base = base_url.unwrap_or(GOOGLE_BASE_URL).trim_end_matches('/').to_string();
        let endpoint = format!("{}/v1beta/models/{}:generateContent", base, model);

        Self {
            http: reqwest::Client::new(),
            endpoint,
            auth: GoogleAuth::ApiKey(api_key.into()),
            model,
        }
    }

    /// Create a client against an explicit endpoint with bearer credentials
    fn with_bearer_endpoint(model: String, endpoint: String, token: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            auth: GoogleAuth::Bearer(token),
            model,
        }
    }
}

#[async_trait]
impl ModelClient for GoogleClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let body = ApiRequest {
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &request.user }],
            }],
            system_instruction: request.system.as_deref().map(|system| Content {
                role: None,
                parts: vec![Part { text: system }],
            }),
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: request.max_tokens,
                response_mime_type: "application/json",
            },
        };

        let started = Instant::now();

        let mut http_request = self.http.post(&self.endpoint).json(&body);
        http_request = match &self.auth {
            GoogleAuth::ApiKey(key) => http_request.header("x-goog-api-key", key),
            GoogleAuth::Bearer(token) => http_request.bearer_auth(token),
        };

        let response = http_request
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

        let text: String = parsed
            .candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(ScoutError::InvalidModelResponse(
                "completion had no candidates".to_string(),
            ));
        }

        Ok(CompletionResponse {
            data: parse_json_payload(&text)?,
            usage: Usage {
                prompt_tokens: parsed.usage_metadata.prompt_token_count,
                completion_tokens: parsed.usage_metadata.candidates_token_count,
                inference_time_ms: started.elapsed().as_millis() as u64,
            },
        })
    }
}

/// Vertex-managed deployment client
///
/// Wraps the generic Google client by composition: same request shaping,
/// different endpoint and credential style. Construction validates the three
/// required configuration fields before any network use.
pub struct GoogleVertexClient {
    inner: GoogleClient,
}

impl GoogleVertexClient {
    /// Create a client for a vertex-managed deployment
    ///
    /// Requires `vertexai`, `project`, and `location` in the options; a
    /// missing field is a configuration error.
    pub fn new(model: impl Into<String>, options: &ClientOptions) -> Result<Self> {
        if !options.vertexai {
            return Err(ScoutError::Configuration(
                "vertex-managed client requires the vertexai option".to_string(),
            ));
        }

        let project = options.project.as_deref().ok_or_else(|| {
            ScoutError::Configuration("vertex-managed client requires a project".to_string())
        })?;
        let location = options.location.as_deref().ok_or_else(|| {
            ScoutError::Configuration("vertex-managed client requires a location".to_string())
        })?;

        let model = model.into();
        let endpoint = format!(
            "https://{location}-aiplatform.googleapis.com/v1/projects/{project}/locations/{location}/publishers/google/models/{model}:generateContent",
        );
        let token = options.api_key.clone().unwrap_or_default();

        Ok(Self {
            inner: GoogleClient::with_bearer_endpoint(model, endpoint, token),
        })
    }
}

#[async_trait]
impl ModelClient for GoogleVertexClient {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.inner.create_completion(request).await
    }
}

use crate::api::stream::{StreamDecoder, StreamEvent};
use crate::api::types::{
    ActOptions, ActResult, AgentConfig, AgentExecuteOptions, AgentResult, ApiEnvelope,
    ExtractOptions, GotoOptions, LogLine, ObserveOptions, StartSessionParams, StartSessionResult,
};
use crate::error::{Result, ScoutError};
use crate::observe::ObserveResult;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;

/// Default endpoint of the remote execution service
pub const DEFAULT_API_URL: &str = "https://api.stagehand.browserbase.com/v1";

/// The only region the delegated-execution rollout currently serves
const DEFAULT_REGION: &str = "us-west-2";

/// Sink receiving log lines streamed back from the remote session
pub type LogSink = Arc<dyn Fn(LogLine) + Send + Sync>;

/// Configuration for a remote execution session
#[derive(Debug, Clone)]
pub struct RemoteClientConfig {
    /// Service endpoint
    pub api_url: String,

    /// Service API key
    pub api_key: String,

    /// Project identifier
    pub project_id: String,

    /// Credential forwarded to the session's model backend
    pub model_api_key: String,
}

impl RemoteClientConfig {
    /// Create a configuration against the default endpoint
    pub fn new(
        api_key: impl Into<String>,
        project_id: impl Into<String>,
        model_api_key: impl Into<String>,
    ) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: api_key.into(),
            project_id: project_id.into(),
            model_api_key: model_api_key.into(),
        }
    }

    /// Builder method: override the service endpoint
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

/// Client for delegating the action/extract/observe lifecycle to a remote
/// execution session
///
/// State machine: unstarted until [`start_session`](Self::start_session)
/// succeeds, then active for every method call, then ended by
/// [`end`](Self::end). Callers must serialize calls against one session;
/// the protocol assumes exclusive ownership during a call.
pub struct RemoteSessionClient {
    http: reqwest::Client,
    config: RemoteClientConfig,
    session_id: Option<String>,
    logger: LogSink,
}

impl RemoteSessionClient {
    /// Create an unstarted client
    pub fn new(config: RemoteClientConfig, logger: LogSink) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
            session_id: None,
            logger,
        }
    }

    /// The active session identifier, once started
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Start a remote session
    ///
    /// A 401 surfaces as [`ScoutError::Unauthorized`] and leaves the client
    /// unstarted. A non-default region short-circuits: the caller-supplied
    /// session id is treated as authoritative without any network call.
    pub async fn start_session(&mut self, params: StartSessionParams) -> Result<StartSessionResult> {
        if self.config.model_api_key.is_empty() {
            return Err(ScoutError::Configuration(
                "a model API key is required to start a session".to_string(),
            ));
        }

        let region = params
            .session_create_params
            .as_ref()
            .and_then(|p| p.get("region"))
            .and_then(Value::as_str);
        if let Some(region) = region {
            if region != DEFAULT_REGION {
                return Ok(StartSessionResult {
                    session_id: params.session_id.clone(),
                    available: Some(false),
                });
            }
        }

        let body = serde_json::to_value(&params)
            .map_err(|e| ScoutError::Configuration(e.to_string()))?;
        let response = self.request("/sessions/start", Some(body)).await?;

        let status = response.status();
        if status.as_u16() == 401 {
            return Err(ScoutError::Unauthorized(
                "ensure you provided a valid API key and that it is whitelisted".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("session start failed ({}): {}", status, body);
            return Err(ScoutError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let text = response
            .text()
            .await
            .map_err(|e| ScoutError::ResponseParse(e.to_string()))?;
        if text.is_empty() {
            return Err(ScoutError::ResponseBody);
        }

        let envelope: ApiEnvelope<StartSessionResult> = serde_json::from_str(&text)
            .map_err(|e| ScoutError::ResponseParse(e.to_string()))?;

        if !envelope.success {
            return Err(ScoutError::ServerReported(
                envelope.message.unwrap_or_else(|| "session start failed".to_string()),
            ));
        }

        let mut result = envelope.data.ok_or(ScoutError::ResponseBody)?;
        self.session_id = result.session_id.clone();

        // Rollout reroute: an unavailable session defers to the caller's id
        if result.available == Some(false) && params.session_id.is_some() {
            result.session_id = params.session_id;
        }

        Ok(result)
    }

    /// Perform an action against the remote session
    pub async fn act(&self, options: &ActOptions) -> Result<Option<ActResult>> {
        self.execute("act", serde_json::to_value(options).unwrap_or_default(), &[])
            .await
    }

    /// Extract structured data from the remote session's page
    pub async fn extract(&self, options: &ExtractOptions) -> Result<Option<Value>> {
        self.execute("extract", serde_json::to_value(options).unwrap_or_default(), &[])
            .await
    }

    /// Observe elements on the remote session's page
    pub async fn observe(&self, options: &ObserveOptions) -> Result<Option<Vec<ObserveResult>>> {
        self.execute("observe", serde_json::to_value(options).unwrap_or_default(), &[])
            .await
    }

    /// Navigate the remote session to a URL
    pub async fn goto(&self, url: &str, options: Option<&GotoOptions>) -> Result<()> {
        let args = json!({ "url": url, "options": options });
        self.execute::<Value>("navigate", args, &[]).await.map(|_| ())
    }

    /// Run an autonomous agent inside the remote session
    ///
    /// Local-only integration features are rejected before any network call.
    pub async fn agent_execute(
        &self,
        config: &AgentConfig,
        options: &AgentExecuteOptions,
    ) -> Result<Option<AgentResult>> {
        if !config.integrations.is_empty() {
            return Err(ScoutError::UnsupportedIntegration(
                "integrations are not supported in delegated-execution mode; run locally to use them"
                    .to_string(),
            ));
        }

        let args = json!({ "agentConfig": config, "executeOptions": options });
        self.execute("agentExecute", args, &[]).await
    }

    /// End the remote session, returning the HTTP status
    pub async fn end(&mut self) -> Result<u16> {
        let session_id = self.require_session()?.to_string();
        let response = self
            .request(&format!("/sessions/{}/end", session_id), None)
            .await?;
        Ok(response.status().as_u16())
    }

    fn require_session(&self) -> Result<&str> {
        self.session_id.as_deref().ok_or_else(|| {
            ScoutError::Configuration("no active session; call start_session first".to_string())
        })
    }

    /// One streamed method call: POST, then incrementally decode the chunked
    /// body, forwarding log records and resolving on the terminal event
    async fn execute<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Value,
        query: &[(String, String)],
    ) -> Result<Option<T>> {
        let session_id = self.require_session()?;

        let path = format!("/sessions/{}/{}", session_id, method);
        let response = self.request_with_query(&path, Some(args), query).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoutError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let mut decoder = StreamDecoder::new();
        let mut stream = response.bytes_stream();

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| ScoutError::ResponseParse(e.to_string()))?;

            for event in decoder.feed(&chunk)? {
                match event {
                    StreamEvent::Log(line) => (self.logger)(line),
                    StreamEvent::ServerError(message) => {
                        return Err(ScoutError::ServerReported(message));
                    }
                    StreamEvent::Finished(result) => {
                        return match result {
                            Some(value) => serde_json::from_value(value)
                                .map(Some)
                                .map_err(|e| ScoutError::ResponseParse(e.to_string())),
                            None => Ok(None),
                        };
                    }
                }
            }
        }

        if decoder.pending() > 0 {
            log::warn!(
                "stream ended with {} buffered byte(s) and no terminal event",
                decoder.pending()
            );
        }

        Ok(None)
    }

    async fn request(&self, path: &str, body: Option<Value>) -> Result<reqwest::Response> {
        self.request_with_query(path, body, &[]).await
    }

    async fn request_with_query(
        &self,
        path: &str,
        body: Option<Value>,
        query: &[(String, String)],
    ) -> Result<reqwest::Response> {
        let url = format!("{}{}", self.config.api_url.trim_end_matches('/'), path);

        let mut request = self
            .http
            .post(&url)
            .header("x-bb-api-key", &self.config.api_key)
            .header("x-bb-project-id", &self.config.project_id)
            // Real-time logs require a streamed response
            .header("x-stream-response", "true")
            .header("x-model-api-key", &self.config.model_api_key)
            .header("x-sent-at", chrono::Utc::now().to_rfc3339())
            .header("x-language", "rust")
            .header("x-sdk-version", env!("CARGO_PKG_VERSION"));

        if let Some(session_id) = &self.session_id {
            request = request.header("x-bb-session-id", session_id);
        }

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(&body);
        }

        request.send().await.map_err(|e| {
            ScoutError::Http {
                status: 0,
                body: e.to_string(),
            }
        })
    }
}

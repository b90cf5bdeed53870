use crate::error::{Result, ScoutError};
use crate::llm::adapter;
use crate::llm::anthropic::AnthropicClient;
use crate::llm::cache::ResponseCache;
use crate::llm::cached::CachedClient;
use crate::llm::client::ModelClient;
use crate::llm::google::{GoogleClient, GoogleVertexClient};
use crate::llm::openai::{CerebrasClient, GroqClient, OpenAiClient};
use std::sync::Arc;

/// Options influencing how a model identifier is turned into a client
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    /// Backend credential; falls back to the vendor's conventional
    /// environment variable when absent
    pub api_key: Option<String>,

    /// Custom base endpoint override
    pub base_url: Option<String>,

    /// Route google models to a vertex-managed deployment
    pub vertexai: bool,

    /// Vertex-managed project identifier
    pub project: Option<String>,

    /// Vertex-managed location identifier
    pub location: Option<String>,
}

/// A model identifier, resolved once at construction time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelId {
    /// Bare name looked up in the static model table
    Static(String),

    /// Namespaced `vendor/model` identifier
    Namespaced { provider: String, model: String },
}

impl ModelId {
    /// Split an identifier on the namespace separator
    pub fn parse(identifier: &str) -> Self {
        match identifier.split_once('/') {
            Some((provider, model)) => Self::Namespaced {
                provider: provider.to_string(),
                model: model.to_string(),
            },
            None => Self::Static(identifier.to_string()),
        }
    }
}

/// Dispatch family a model identifier resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderFamily {
    OpenAi,
    Anthropic,
    Google,
    Cerebras,
    Groq,
    /// Namespaced identifiers routed through the multi-vendor adapter
    Adapter,
}

/// Static model table for bare identifiers
const MODEL_TABLE: &[(&str, ProviderFamily)] = &[
    ("gpt-4.1", ProviderFamily::OpenAi),
    ("gpt-4.1-mini", ProviderFamily::OpenAi),
    ("gpt-4o", ProviderFamily::OpenAi),
    ("gpt-4o-mini", ProviderFamily::OpenAi),
    ("o3", ProviderFamily::OpenAi),
    ("o3-mini", ProviderFamily::OpenAi),
    ("o4-mini", ProviderFamily::OpenAi),
    ("claude-3-5-sonnet-latest", ProviderFamily::Anthropic),
    ("claude-3-7-sonnet-latest", ProviderFamily::Anthropic),
    ("claude-3-7-sonnet-20250219", ProviderFamily::Anthropic),
    ("cerebras-llama-3.3-70b", ProviderFamily::Cerebras),
    ("cerebras-llama-3.1-8b", ProviderFamily::Cerebras),
    ("groq-llama-3.3-70b-versatile", ProviderFamily::Groq),
    ("gemini-1.5-flash", ProviderFamily::Google),
    ("gemini-1.5-pro", ProviderFamily::Google),
    ("gemini-2.0-flash", ProviderFamily::Google),
    ("gemini-2.5-flash", ProviderFamily::Google),
    ("gemini-2.5-pro", ProviderFamily::Google),
];

fn static_model_family(name: &str) -> Option<ProviderFamily> {
    MODEL_TABLE
        .iter()
        .find(|(model, _)| *model == name)
        .map(|(_, family)| *family)
}

fn known_models() -> Vec<String> {
    MODEL_TABLE.iter().map(|(model, _)| model.to_string()).collect()
}

fn env_key_for(family: ProviderFamily) -> &'static str {
    match family {
        ProviderFamily::OpenAi => "OPENAI_API_KEY",
        ProviderFamily::Anthropic => "ANTHROPIC_API_KEY",
        ProviderFamily::Google => "GOOGLE_API_KEY",
        ProviderFamily::Cerebras => "CEREBRAS_API_KEY",
        ProviderFamily::Groq => "GROQ_API_KEY",
        ProviderFamily::Adapter => "",
    }
}

/// Routes model identifiers to the right backend client
///
/// Constructed once and passed to whatever needs dispatch; there is no
/// process-wide registry. When caching is enabled every resolved client is
/// wrapped in a caching decorator scoped by request id.
pub struct ModelGateway {
    cache: Option<Arc<ResponseCache>>,
}

impl ModelGateway {
    /// Create a gateway, optionally with response caching
    pub fn new(enable_caching: bool) -> Self {
        Self {
            cache: enable_caching.then(|| Arc::new(ResponseCache::new())),
        }
    }

    /// Resolve a model identifier to a callable client
    ///
    /// Precedence: vertex-managed deployments first (`google/...` plus the
    /// `vertexai` option), then namespaced identifiers through the
    /// multi-vendor adapter, then the static model table.
    pub fn resolve(&self, identifier: &str, options: &ClientOptions) -> Result<Arc<dyn ModelClient>> {
        let client: Arc<dyn ModelClient> = match ModelId::parse(identifier) {
            ModelId::Namespaced { provider, model } => {
                if provider == "google" && options.vertexai {
                    Arc::new(GoogleVertexClient::new(model, options)?)
                } else {
                    adapter::resolve_namespaced(&provider, &model, options)?
                }
            }
            ModelId::Static(name) => {
                let family = static_model_family(&name)
                    .ok_or_else(|| ScoutError::UnsupportedModel(known_models()))?;

                let api_key = options
                    .api_key
                    .clone()
                    .or_else(|| std::env::var(env_key_for(family)).ok())
                    .unwrap_or_default();
                let base_url = options.base_url.as_deref();

                match family {
                    ProviderFamily::OpenAi => Arc::new(OpenAiClient::new(name, api_key, base_url)),
                    ProviderFamily::Anthropic => Arc::new(AnthropicClient::new(name, api_key, base_url)),
                    ProviderFamily::Google => Arc::new(GoogleClient::new(name, api_key, base_url)),
                    ProviderFamily::Cerebras => Arc::new(CerebrasClient::new(name, api_key, base_url)),
                    ProviderFamily::Groq => Arc::new(GroqClient::new(name, api_key, base_url)),
                    // Bare identifiers never reach the adapter
                    ProviderFamily::Adapter => unreachable!(),
                }
            }
        };

        Ok(match &self.cache {
            Some(cache) => Arc::new(CachedClient::new(client, cache.clone())),
            None => client,
        })
    }

    /// Drop every cached response created under the given request id
    ///
    /// No-op when caching is disabled.
    pub fn clean_request_cache(&self, request_id: &str) {
        let Some(cache) = &self.cache else {
            return;
        };

        log::debug!("cleaning response cache for request {}", request_id);
        cache.delete_for_request(request_id);
    }

    /// The cache backing resolved clients, when caching is enabled
    pub fn cache(&self) -> Option<&Arc<ResponseCache>> {
        self.cache.as_ref()
    }

    /// Report which dispatch family an identifier would use, without
    /// constructing a client
    ///
    /// `prefer_native` makes namespaced identifiers report their native
    /// family instead of the adapter, for callers that insist on the
    /// vendor-direct path.
    pub fn provider_family(identifier: &str, prefer_native: bool) -> Option<ProviderFamily> {
        if let ModelId::Namespaced { provider, .. } = ModelId::parse(identifier) {
            if !prefer_native && adapter::is_recognized(&provider) {
                return Some(ProviderFamily::Adapter);
            }
        }

        static_model_family(identifier)
    }
}

use crate::error::{Result, ScoutError};
use crate::llm::anthropic::{AnthropicClient, ANTHROPIC_BASE_URL};
use crate::llm::client::{CompletionRequest, CompletionResponse, ModelClient};
use crate::llm::gateway::ClientOptions;
use crate::llm::google::GoogleClient;
use crate::llm::openai::{ChatCompletionsCore, CEREBRAS_BASE_URL, GROQ_BASE_URL, OPENAI_BASE_URL};
use async_trait::async_trait;
use std::sync::Arc;

/// Wire shape a namespaced sub-provider speaks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Wire {
    ChatCompletions,
    Anthropic,
    Google,
}

struct SubProvider {
    name: &'static str,
    base_url: &'static str,
    env_key: &'static str,
    wire: Wire,
}

/// Sub-providers recognized on the namespaced `vendor/model` path
const SUB_PROVIDERS: &[SubProvider] = &[
    SubProvider { name: "openai", base_url: OPENAI_BASE_URL, env_key: "OPENAI_API_KEY", wire: Wire::ChatCompletions },
    SubProvider { name: "anthropic", base_url: ANTHROPIC_BASE_URL, env_key: "ANTHROPIC_API_KEY", wire: Wire::Anthropic },
    SubProvider { name: "google", base_url: "", env_key: "GOOGLE_API_KEY", wire: Wire::Google },
    SubProvider { name: "groq", base_url: GROQ_BASE_URL, env_key: "GROQ_API_KEY", wire: Wire::ChatCompletions },
    SubProvider { name: "cerebras", base_url: CEREBRAS_BASE_URL, env_key: "CEREBRAS_API_KEY", wire: Wire::ChatCompletions },
    SubProvider { name: "deepseek", base_url: "https://api.deepseek.com/v1", env_key: "DEEPSEEK_API_KEY", wire: Wire::ChatCompletions },
    SubProvider { name: "mistral", base_url: "https://api.mistral.ai/v1", env_key: "MISTRAL_API_KEY", wire: Wire::ChatCompletions },
    SubProvider { name: "xai", base_url: "https://api.x.ai/v1", env_key: "XAI_API_KEY", wire: Wire::ChatCompletions },
    SubProvider { name: "together", base_url: "https://api.together.xyz/v1", env_key: "TOGETHER_API_KEY", wire: Wire::ChatCompletions },
    SubProvider { name: "perplexity", base_url: "https://api.perplexity.ai", env_key: "PERPLEXITY_API_KEY", wire: Wire::ChatCompletions },
];

/// Names of every recognized sub-provider
pub fn recognized_providers() -> Vec<String> {
    SUB_PROVIDERS.iter().map(|p| p.name.to_string()).collect()
}

/// Whether a sub-provider name is recognized
pub fn is_recognized(name: &str) -> bool {
    SUB_PROVIDERS.iter().any(|p| p.name == name)
}

/// Multi-vendor adapter client for chat-completions-compatible sub-providers
pub struct AdapterClient {
    core: ChatCompletionsCore,
}

#[async_trait]
impl ModelClient for AdapterClient {
    fn model_name(&self) -> &str {
        self.core.model()
    }

    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.core.create_completion(request).await
    }
}

/// Construct a client for a namespaced `vendor/model` identifier
///
/// A caller-supplied API key (optionally with a custom base endpoint) yields
/// a freshly credentialed instance; without one, the sub-provider's
/// conventional environment variable supplies the credential. Unrecognized
/// sub-providers are an error listing the recognized set.
pub fn resolve_namespaced(
    provider: &str,
    model: &str,
    options: &ClientOptions,
) -> Result<Arc<dyn ModelClient>> {
    let sub = SUB_PROVIDERS
        .iter()
        .find(|p| p.name == provider)
        .ok_or_else(|| ScoutError::UnsupportedProvider(recognized_providers()))?;

    let api_key = options
        .api_key
        .clone()
        .or_else(|| std::env::var(sub.env_key).ok())
        .unwrap_or_default();
    let base_url = options.base_url.as_deref();

    Ok(match sub.wire {
        Wire::ChatCompletions => Arc::new(AdapterClient {
            core: ChatCompletionsCore::new(base_url.unwrap_or(sub.base_url), api_key, model),
        }),
        Wire::Anthropic => Arc::new(AnthropicClient::new(model, api_key, base_url)),
        Wire::Google => Arc::new(GoogleClient::new(model, api_key, base_url)),
    })
}

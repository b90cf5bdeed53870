//! Model gateway and backend clients
//!
//! This module routes a model identifier string to a callable backend and
//! caches its responses. It includes:
//! - ModelClient: the single-operation capability trait all backends share
//! - ModelGateway: identifier dispatch (vertex-managed, namespaced, static)
//! - ResponseCache / CachedClient: request-scoped response caching
//! - Per-vendor clients: OpenAI, Anthropic, Google (plus vertex-managed),
//!   Cerebras, Groq, and the multi-vendor adapter for namespaced identifiers

pub mod adapter;
pub mod anthropic;
pub mod cache;
pub mod cached;
pub mod client;
pub mod gateway;
pub mod google;
pub mod openai;

pub use adapter::AdapterClient;
pub use anthropic::AnthropicClient;
pub use cache::{CacheEntry, CacheKey, ResponseCache};
pub use cached::CachedClient;
pub use client::{CompletionRequest, CompletionResponse, ModelClient, Usage};
pub use gateway::{ClientOptions, ModelGateway, ModelId, ProviderFamily};
pub use google::{GoogleClient, GoogleVertexClient};
pub use openai::{CerebrasClient, GroqClient, OpenAiClient};

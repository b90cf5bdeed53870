use crate::error::Result;
use crate::llm::cache::{CacheEntry, CacheKey, ResponseCache};
use crate::llm::client::{CompletionRequest, CompletionResponse, ModelClient};
use async_trait::async_trait;
use std::sync::Arc;

/// Caching decorator around any model client
///
/// Hits are scoped to the request id embedded in each completion request;
/// the gateway's `clean_request_cache` retires them in bulk.
pub struct CachedClient {
    inner: Arc<dyn ModelClient>,
    cache: Arc<ResponseCache>,
}

impl CachedClient {
    /// Wrap a client with the given cache
    pub fn new(inner: Arc<dyn ModelClient>, cache: Arc<ResponseCache>) -> Self {
        Self { inner, cache }
    }
}

#[async_trait]
impl ModelClient for CachedClient {
    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        let key = CacheKey::new(&request.request_id, request);

        if let Some(hit) = self.cache.get(&key) {
            log::debug!("cache hit for request {}", request.request_id);
            return Ok(CompletionResponse {
                data: hit.data,
                usage: hit.usage,
            });
        }

        let response = self.inner.create_completion(request).await?;

        self.cache.set(
            key,
            CacheEntry {
                data: response.data.clone(),
                usage: response.usage.clone(),
            },
        );

        Ok(response)
    }
}

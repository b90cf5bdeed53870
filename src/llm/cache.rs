use crate::llm::client::Usage;
use serde::Serialize;
use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::sync::Mutex;

/// Cache key: the owning request id plus a digest of the canonical payload
///
/// Identical prompts under different request ids cache independently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    request_id: String,
    digest: u64,
}

impl CacheKey {
    /// Derive a key from a request id and a serializable payload
    pub fn new(request_id: &str, payload: &impl Serialize) -> Self {
        let canonical = serde_json::to_string(payload).unwrap_or_default();
        let mut hasher = DefaultHasher::new();
        canonical.hash(&mut hasher);
        Self {
            request_id: request_id.to_string(),
            digest: hasher.finish(),
        }
    }

    /// The request id this key belongs to
    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

/// A cached model response with its usage counters
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub data: serde_json::Value,
    pub usage: Usage,
}

/// In-memory, single-process cache of model responses
///
/// Safe for one logical session at a time; the embedding system adds its own
/// locking if it needs more.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<CacheKey, CacheEntry>>,
}

impl ResponseCache {
    /// Create a new empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a cached response
    pub fn get(&self, key: &CacheKey) -> Option<CacheEntry> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }

    /// Store a response under a key
    pub fn set(&self, key: CacheKey, entry: CacheEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key, entry);
        }
    }

    /// Remove every entry created under the given request id
    ///
    /// Entries under other request ids are untouched.
    pub fn delete_for_request(&self, request_id: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|key, _| key.request_id != request_id);
        }
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Check if the cache is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

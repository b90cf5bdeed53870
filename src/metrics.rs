use crate::llm::Usage;
use serde::Serialize;
use std::sync::Mutex;

/// Which accounting bucket an inference call belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKind {
    Observe,
    Act,
}

/// Accumulated usage for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UsageBucket {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub inference_time_ms: u64,
    pub call_count: u64,
}

impl UsageBucket {
    fn add(&mut self, usage: &Usage) {
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
        self.inference_time_ms += usage.inference_time_ms;
        self.call_count += 1;
    }
}

/// Snapshot of all buckets at one point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub observe: UsageBucket,
    pub act: UsageBucket,
}

/// Token and latency accounting shared across handlers
#[derive(Debug, Default)]
pub struct Metrics {
    inner: Mutex<MetricsSnapshot>,
}

impl Metrics {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Attribute one call's usage to a bucket
    pub fn record(&self, kind: FunctionKind, usage: &Usage) {
        if let Ok(mut snapshot) = self.inner.lock() {
            match kind {
                FunctionKind::Observe => snapshot.observe.add(usage),
                FunctionKind::Act => snapshot.act.add(usage),
            }
        }
    }

    /// Current totals
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().map(|snapshot| *snapshot).unwrap_or_default()
    }
}

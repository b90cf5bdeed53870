//! Page-control capability surface
//!
//! The core never talks to a browser directly. Everything it needs from the
//! live document (settle waiting, accessibility snapshots, frame discovery,
//! script evaluation) goes through the [`PageDriver`] trait. The `cdp`
//! feature ships a ready-made adapter; embedders can supply their own.

#[cfg(feature = "cdp")]
pub mod cdp;

use crate::a11y::AxNode;
use crate::error::{Result, ScoutError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::time::{Duration, Instant};

/// Identifier of a nested frame as reported by the driver
pub type FrameId = String;

/// Default deadline for settle waiting
pub const DEFAULT_SETTLE_TIMEOUT_MS: u64 = 30_000;

/// Accessibility data for one frame, as delivered by the driver
///
/// Nodes come as a flat list; the encoder reconstructs the hierarchy from
/// their `child_ids`. Locators are keyed by backend node id and may be
/// missing for any node, so callers must tolerate lookup misses.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxSnapshot {
    /// Flat node list in document order
    pub nodes: Vec<AxNode>,

    /// XPath expressions keyed by backend node id
    #[serde(default)]
    pub xpath_by_backend: HashMap<u64, String>,
}

/// A nested frame discovered on the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FrameHandle {
    /// Driver-scoped frame identifier
    pub frame_id: FrameId,

    /// Backend node id of the hosting element in the parent frame
    pub backend_node_id: Option<u64>,
}

/// Capability trait for the underlying page-control surface
///
/// All operations suspend the calling task; none of them block. Implementors
/// map their own failures into [`ScoutError::PageDriver`], except settle
/// waiting which reports [`ScoutError::DomSettleTimeout`] on deadline.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Wait until no further layout or network activity is expected
    async fn wait_for_settled_dom(&self, timeout: Duration) -> Result<()>;

    /// Take an accessibility snapshot of one frame (`None` = top frame)
    async fn accessibility_snapshot(&self, frame: Option<&FrameId>) -> Result<AxSnapshot>;

    /// Enumerate nested frames of the top frame
    async fn child_frames(&self) -> Result<Vec<FrameHandle>>;

    /// Evaluate a script against the document, returning its JSON value
    async fn evaluate(&self, expression: &str) -> Result<serde_json::Value>;
}

/// Poll an async predicate until it yields a truthy value or the deadline passes
///
/// The deadline is wall-clock; an in-flight poll that outlives it is not
/// aborted, its result is simply discarded.
pub async fn wait_until_truthy<T, F, Fut>(timeout: Duration, mut poll: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    let start = Instant::now();

    loop {
        match poll().await {
            Ok(Some(value)) => return Ok(value),
            Ok(None) => {}
            Err(e) => log::debug!("poll attempt failed, retrying: {}", e),
        }

        if start.elapsed() >= timeout {
            return Err(ScoutError::DomSettleTimeout(timeout.as_millis() as u64));
        }

        tokio::time::sleep(Duration::from_millis(100)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_wait_until_truthy_returns_first_truthy_value() {
        let attempts = AtomicU32::new(0);

        let value = wait_until_truthy(Duration::from_secs(2), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move { Ok(if n >= 2 { Some(n) } else { None }) }
        })
        .await
        .unwrap();

        assert_eq!(value, 2);
    }

    #[tokio::test]
    async fn test_wait_until_truthy_times_out() {
        let result: Result<u32> =
            wait_until_truthy(Duration::from_millis(50), || async { Ok(None) }).await;

        assert!(matches!(result, Err(ScoutError::DomSettleTimeout(_))));
    }

    #[tokio::test]
    async fn test_wait_until_truthy_survives_poll_errors() {
        let attempts = AtomicU32::new(0);

        let value = wait_until_truthy(Duration::from_secs(2), || {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ScoutError::PageDriver("transient".to_string()))
                } else {
                    Ok(Some("ready"))
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, "ready");
    }
}

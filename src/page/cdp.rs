use crate::error::{Result, ScoutError};
use crate::page::{wait_until_truthy, AxSnapshot, FrameHandle, FrameId, PageDriver};
use async_trait::async_trait;
use headless_chrome::Tab;
use std::sync::Arc;
use std::time::Duration;

/// Quiet window with no DOM mutations that counts as settled
const SETTLE_QUIET_MS: u64 = 500;

/// `PageDriver` implementation over a Chrome DevTools Protocol tab
///
/// Accessibility snapshots are produced by an injected walker script, so
/// nested-frame traversal reaches exactly the frames the top document can
/// script (one level of same-origin nesting); cross-origin frames surface as
/// driver errors, which the combiner degrades to skipped frames.
pub struct CdpDriver {
    tab: Arc<Tab>,
}

impl CdpDriver {
    /// Wrap an existing tab
    pub fn new(tab: Arc<Tab>) -> Self {
        Self { tab }
    }

    /// Navigate the tab and wait for the load to commit
    pub async fn navigate(&self, url: &str) -> Result<()> {
        let tab = self.tab.clone();
        let url = url.to_string();

        tokio::task::spawn_blocking(move || {
            tab.navigate_to(&url)
                .and_then(|tab| tab.wait_until_navigated())
                .map(|_| ())
                .map_err(|e| ScoutError::PageDriver(format!("failed to navigate to {}: {}", url, e)))
        })
        .await
        .map_err(|e| ScoutError::PageDriver(e.to_string()))?
    }

    /// Evaluate an expression on the blocking pool, returning its JSON value
    async fn eval_value(&self, expression: String) -> Result<serde_json::Value> {
        let tab = self.tab.clone();

        let object = tokio::task::spawn_blocking(move || {
            tab.evaluate(&expression, false)
                .map_err(|e| ScoutError::PageDriver(e.to_string()))
        })
        .await
        .map_err(|e| ScoutError::PageDriver(e.to_string()))??;

        Ok(object.value.unwrap_or(serde_json::Value::Null))
    }

    /// Evaluate an expression that returns a JSON string and parse it
    async fn eval_json(&self, expression: String) -> Result<serde_json::Value> {
        let value = self.eval_value(expression).await?;

        let text: String = serde_json::from_value(value)
            .map_err(|e| ScoutError::PageDriver(format!("script returned no JSON string: {}", e)))?;

        serde_json::from_str(&text)
            .map_err(|e| ScoutError::PageDriver(format!("failed to parse script output: {}", e)))
    }

    fn frame_index(frame: &FrameId) -> Result<usize> {
        frame
            .strip_prefix("frame-")
            .and_then(|index| index.parse().ok())
            .ok_or_else(|| ScoutError::PageDriver(format!("unknown frame id {}", frame)))
    }
}

#[async_trait]
impl PageDriver for CdpDriver {
    async fn wait_for_settled_dom(&self, timeout: Duration) -> Result<()> {
        let driver = self;

        wait_until_truthy(timeout, move || async move {
            let probe = driver
                .eval_json(include_str!("settle_probe.js").to_string())
                .await?;

            let ready = probe["ready"].as_bool().unwrap_or(false);
            let quiet_ms = probe["quietMs"].as_u64().unwrap_or(0);

            Ok((ready && quiet_ms >= SETTLE_QUIET_MS).then_some(()))
        })
        .await
    }

    async fn accessibility_snapshot(&self, frame: Option<&FrameId>) -> Result<AxSnapshot> {
        let argument = match frame {
            Some(frame) => Self::frame_index(frame)?.to_string(),
            None => "null".to_string(),
        };

        let expression = format!("({})({})", include_str!("a11y_snapshot.js"), argument);
        let value = self.eval_json(expression).await?;

        serde_json::from_value(value)
            .map_err(|e| ScoutError::PageDriver(format!("malformed snapshot: {}", e)))
    }

    async fn child_frames(&self) -> Result<Vec<FrameHandle>> {
        let value = self
            .eval_value("document.querySelectorAll('iframe').length".to_string())
            .await?;
        let count = value.as_u64().unwrap_or(0);

        Ok((0..count)
            .map(|index| FrameHandle {
                frame_id: format!("frame-{}", index),
                backend_node_id: None,
            })
            .collect())
    }

    async fn evaluate(&self, expression: &str) -> Result<serde_json::Value> {
        self.eval_value(expression.to_string()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_index_parsing() {
        assert_eq!(CdpDriver::frame_index(&"frame-0".to_string()).unwrap(), 0);
        assert_eq!(CdpDriver::frame_index(&"frame-12".to_string()).unwrap(), 12);
        assert!(CdpDriver::frame_index(&"12".to_string()).is_err());
        assert!(CdpDriver::frame_index(&"frame-x".to_string()).is_err());
    }
}

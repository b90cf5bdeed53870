use crate::error::Result;
use crate::observe::{ObserveResult, NOT_SUPPORTED};
use crate::page::PageDriver;

/// Render a non-functional highlight box over each resolved locator
///
/// Purely a visual side effect; the overlays capture no pointer events and
/// are removed by [`clear_overlays`].
pub async fn draw_observe_overlay<D: PageDriver + ?Sized>(
    driver: &D,
    results: &[ObserveResult],
) -> Result<()> {
    let selectors: Vec<&str> = results
        .iter()
        .map(|result| result.selector.as_str())
        .filter(|selector| *selector != "xpath=" && *selector != NOT_SUPPORTED)
        .collect();

    if selectors.is_empty() {
        return Ok(());
    }

    let script = format!(
        "({})({})",
        include_str!("overlay.js"),
        serde_json::to_string(&selectors).unwrap_or_else(|_| "[]".to_string())
    );

    driver.evaluate(&script).await.map(|_| ())
}

/// Remove every overlay previously drawn by [`draw_observe_overlay`]
pub async fn clear_overlays<D: PageDriver + ?Sized>(driver: &D) -> Result<()> {
    driver.evaluate(include_str!("clear_overlay.js")).await.map(|_| ())
}

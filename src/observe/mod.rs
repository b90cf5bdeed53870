//! Observation pipeline
//!
//! Orchestrates instruction -> model call -> candidate elements -> locator
//! mapping. Degraded cases (missing locators, shadow-DOM containment,
//! overlay failures) never fail the call; settle and model failures do.

pub mod inference;
pub mod overlay;

pub use inference::DEFAULT_OBSERVE_INSTRUCTION;
pub use overlay::{clear_overlays, draw_observe_overlay};

use crate::a11y::{combine_frames, trim_trailing_text_node, EncodedId};
use crate::error::Result;
use crate::llm::{CompletionRequest, ModelClient};
use crate::metrics::{FunctionKind, Metrics};
use crate::page::{PageDriver, DEFAULT_SETTLE_TIMEOUT_MS};
use inference::{build_system_prompt, build_user_message, parse_elements, RawElement};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Sentinel method and selector for elements that cannot be addressed
pub const NOT_SUPPORTED: &str = "not-supported";

/// One resolved element: what it is, how to act on it, and where it lives
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ObserveResult {
    /// Locator expression (`xpath=...`), or the not-supported sentinel
    pub selector: String,

    /// Model-provided description of the element
    pub description: String,

    /// Action-method name, or the not-supported sentinel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    /// Ordered action arguments
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
}

/// Parameters for a single observation call
#[derive(Debug, Clone, Default)]
pub struct ObserveParams<'a> {
    /// Natural-language instruction; `None` asks for everything actionable
    pub instruction: Option<&'a str>,

    /// Logical request identifier (cache scope, metrics correlation)
    pub request_id: &'a str,

    /// Ask the model for method/arguments alongside each element
    pub return_action: bool,

    /// Render a visual overlay over the resolved locators
    pub draw_overlay: bool,

    /// Attribute usage to the act bucket instead of observe
    pub from_act: bool,

    /// Traverse nested frames instead of recording them as placeholders
    pub iframes: bool,

    /// Settle deadline override in milliseconds
    pub dom_settle_timeout_ms: Option<u64>,
}

/// Resolves instructions to concrete elements on the live document
pub struct ObserveHandler<D: PageDriver + ?Sized> {
    driver: Arc<D>,
    metrics: Arc<Metrics>,
    user_provided_instructions: Option<String>,
    experimental: bool,
}

impl<D: PageDriver + ?Sized> ObserveHandler<D> {
    /// Create a handler over the given page driver
    pub fn new(
        driver: Arc<D>,
        metrics: Arc<Metrics>,
        user_provided_instructions: Option<String>,
        experimental: bool,
    ) -> Self {
        Self {
            driver,
            metrics,
            user_provided_instructions,
            experimental,
        }
    }

    /// Resolve an instruction to an ordered list of elements
    ///
    /// Returns an empty list when nothing matches; never fails for zero
    /// matches. Settle and model failures propagate.
    pub async fn observe(
        &self,
        model: &dyn ModelClient,
        params: ObserveParams<'_>,
    ) -> Result<Vec<ObserveResult>> {
        let instruction = params.instruction.unwrap_or(DEFAULT_OBSERVE_INSTRUCTION);

        log::debug!("starting observation: {}", instruction);

        let timeout = Duration::from_millis(
            params.dom_settle_timeout_ms.unwrap_or(DEFAULT_SETTLE_TIMEOUT_MS),
        );
        self.driver.wait_for_settled_dom(timeout).await?;

        log::debug!("getting accessibility tree data");
        let combined = combine_frames(self.driver.as_ref(), params.iframes, self.experimental).await?;

        let request = CompletionRequest::new(
            params.request_id,
            build_user_message(instruction, &combined.tree),
        )
        .with_system(build_system_prompt(
            self.user_provided_instructions.as_deref(),
            params.return_action,
        ));

        let response = model.create_completion(&request).await?;

        let kind = if params.from_act {
            FunctionKind::Act
        } else {
            FunctionKind::Observe
        };
        self.metrics.record(kind, &response.usage);

        let mut elements = parse_elements(&response.data);

        if !combined.discovered_frames.is_empty() {
            log::warn!(
                "found {} iframe(s) on the page; pass iframes: true to interact with their content",
                combined.discovered_frames.len()
            );

            for frame in &combined.discovered_frames {
                let Some(backend) = frame.backend_node_id else {
                    continue;
                };
                elements.push(RawElement {
                    // Host frame unknown here; ordinal 0 marks the top frame
                    element_id: EncodedId::new(0, backend).to_string(),
                    description: "an iframe".to_string(),
                    method: Some(NOT_SUPPORTED.to_string()),
                    arguments: Vec::new(),
                });
            }
        }

        let mut results = Vec::new();
        for element in elements {
            if !EncodedId::is_composite(&element.element_id) {
                // Raw ids only occur for nodes inside a shadow boundary
                log::debug!("element {} is inside a shadow DOM", element.element_id);
                results.push(ObserveResult {
                    selector: NOT_SUPPORTED.to_string(),
                    description: "an element inside a shadow DOM".to_string(),
                    method: Some(NOT_SUPPORTED.to_string()),
                    arguments: Vec::new(),
                });
                continue;
            }

            let xpath = combined
                .locator_map
                .get_str(&element.element_id)
                .map(trim_trailing_text_node)
                .unwrap_or_default();

            if xpath.is_empty() {
                log::warn!(
                    "empty locator for element {}, dropping it from the result",
                    element.element_id
                );
                continue;
            }

            results.push(ObserveResult {
                selector: format!("xpath={}", xpath),
                description: element.description,
                method: element.method,
                arguments: element.arguments,
            });
        }

        log::debug!("found {} element(s)", results.len());

        if params.draw_overlay {
            if let Err(e) = draw_observe_overlay(self.driver.as_ref(), &results).await {
                log::debug!("overlay rendering failed: {}", e);
            }
        }

        Ok(results)
    }
}

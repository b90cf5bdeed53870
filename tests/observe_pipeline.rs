use async_trait::async_trait;
use page_scout::a11y::AxNode;
use page_scout::error::{Result, ScoutError};
use page_scout::llm::{CompletionRequest, CompletionResponse, ModelClient, Usage};
use page_scout::metrics::Metrics;
use page_scout::observe::{ObserveHandler, ObserveParams, NOT_SUPPORTED};
use page_scout::page::{AxSnapshot, FrameHandle, FrameId, PageDriver};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct MockDriver {
    top: AxSnapshot,
    settle_fails: bool,
    evaluate_fails: bool,
    evaluations: Mutex<Vec<String>>,
}

impl MockDriver {
    fn new(top: AxSnapshot) -> Self {
        Self {
            top,
            settle_fails: false,
            evaluate_fails: false,
            evaluations: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn wait_for_settled_dom(&self, timeout: Duration) -> Result<()> {
        if self.settle_fails {
            Err(ScoutError::DomSettleTimeout(timeout.as_millis() as u64))
        } else {
            Ok(())
        }
    }

    async fn accessibility_snapshot(&self, frame: Option<&FrameId>) -> Result<AxSnapshot> {
        match frame {
            None => Ok(self.top.clone()),
            Some(id) => Err(ScoutError::PageDriver(format!("unknown frame {}", id))),
        }
    }

    async fn child_frames(&self) -> Result<Vec<FrameHandle>> {
        Ok(Vec::new())
    }

    async fn evaluate(&self, expression: &str) -> Result<Value> {
        self.evaluations
            .lock()
            .unwrap()
            .push(expression.to_string());

        if self.evaluate_fails {
            Err(ScoutError::PageDriver("script failed".to_string()))
        } else {
            Ok(Value::Bool(true))
        }
    }
}

struct MockModel {
    payload: Value,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl MockModel {
    fn new(payload: Value) -> Self {
        Self {
            payload,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn last_request(&self) -> CompletionRequest {
        self.requests.lock().unwrap().last().cloned().expect("no model call happened")
    }
}

#[async_trait]
impl ModelClient for MockModel {
    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn create_completion(&self, request: &CompletionRequest) -> Result<CompletionResponse> {
        self.requests.lock().unwrap().push(request.clone());
        Ok(CompletionResponse {
            data: self.payload.clone(),
            usage: Usage {
                prompt_tokens: 50,
                completion_tokens: 10,
                inference_time_ms: 120,
            },
        })
    }
}

fn page_snapshot() -> AxSnapshot {
    AxSnapshot {
        nodes: vec![
            AxNode::new("RootWebArea", "1")
                .with_name("Shop")
                .with_backend_id(1)
                .with_children(vec!["2", "3", "4"]),
            AxNode::new("button", "2").with_name("Add to cart").with_backend_id(2),
            AxNode::new("link", "3").with_name("Checkout").with_backend_id(3),
            AxNode::new("textbox", "4").with_name("Search").with_backend_id(4),
        ],
        xpath_by_backend: HashMap::from([
            (1, "/html".to_string()),
            (2, "/html/body/button".to_string()),
            (3, "/html/body/a".to_string()),
            (4, "/html/body/input".to_string()),
        ]),
    }
}

fn handler(driver: Arc<MockDriver>, metrics: Arc<Metrics>) -> ObserveHandler<MockDriver> {
    let _ = env_logger::builder().is_test(true).try_init();
    ObserveHandler::new(driver, metrics, None, false)
}

#[tokio::test]
async fn observe_resolves_elements_in_model_order() {
    let driver = Arc::new(MockDriver::new(page_snapshot()));
    let model = MockModel::new(json!({
        "elements": [
            {"elementId": "0-3", "description": "checkout link", "method": "click", "arguments": []},
            {"elementId": "0-2", "description": "add to cart", "method": "click", "arguments": []}
        ]
    }));

    let results = handler(driver, Arc::new(Metrics::new()))
        .observe(
            &model,
            ObserveParams {
                instruction: Some("how do I pay?"),
                request_id: "req-1",
                return_action: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    // The model's ordering survives locator resolution
    assert_eq!(results[0].selector, "xpath=/html/body/a");
    assert_eq!(results[0].description, "checkout link");
    assert_eq!(results[1].selector, "xpath=/html/body/button");
}

#[tokio::test]
async fn observe_with_zero_elements_returns_empty_list() {
    let driver = Arc::new(MockDriver::new(page_snapshot()));
    let model = MockModel::new(json!({"elements": []}));

    let results = handler(driver, Arc::new(Metrics::new()))
        .observe(
            &model,
            ObserveParams {
                instruction: Some("find the nonexistent thing"),
                request_id: "req-1",
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(results.is_empty());
}

#[tokio::test]
async fn observe_drops_elements_with_missing_locators() {
    // Scenario: two addressable nodes, one of them absent from the map
    let mut snapshot = page_snapshot();
    snapshot.xpath_by_backend.remove(&3);

    let driver = Arc::new(MockDriver::new(snapshot));
    let model = MockModel::new(json!({
        "elements": [
            {"elementId": "0-2", "description": "add to cart"},
            {"elementId": "0-3", "description": "checkout link"}
        ]
    }));

    let results = handler(driver, Arc::new(Metrics::new()))
        .observe(
            &model,
            ObserveParams {
                instruction: Some("what can I do here?"),
                request_id: "req-1",
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].description, "add to cart");
}

#[tokio::test]
async fn observe_trims_synthetic_text_node_suffixes() {
    let mut snapshot = page_snapshot();
    snapshot
        .xpath_by_backend
        .insert(3, "/html/body/a/text()[1]".to_string());

    let driver = Arc::new(MockDriver::new(snapshot));
    let model = MockModel::new(json!({
        "elements": [{"elementId": "0-3", "description": "checkout link"}]
    }));

    let results = handler(driver, Arc::new(Metrics::new()))
        .observe(
            &model,
            ObserveParams {
                instruction: Some("pay"),
                request_id: "req-1",
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(results[0].selector, "xpath=/html/body/a");
}

#[tokio::test]
async fn observe_degrades_shadow_dom_elements_to_stubs() {
    let driver = Arc::new(MockDriver::new(page_snapshot()));
    let model = MockModel::new(json!({
        "elements": [
            {"elementId": "417", "description": "a button inside a web component"},
            {"elementId": "0-2", "description": "add to cart"}
        ]
    }));

    let results = handler(driver, Arc::new(Metrics::new()))
        .observe(
            &model,
            ObserveParams {
                instruction: Some("click the button"),
                request_id: "req-1",
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].selector, NOT_SUPPORTED);
    assert_eq!(results[0].method.as_deref(), Some(NOT_SUPPORTED));
    assert_eq!(results[0].description, "an element inside a shadow DOM");
    assert_eq!(results[1].selector, "xpath=/html/body/button");
}

#[tokio::test]
async fn observe_appends_placeholders_for_discovered_iframes() {
    let mut snapshot = page_snapshot();
    snapshot.nodes.push(
        AxNode::new("Iframe", "5")
            .with_backend_id(9)
            .with_frame_id("frame-0"),
    );
    if let Some(root) = snapshot.nodes.first_mut() {
        root.child_ids.push("5".to_string());
    }
    snapshot
        .xpath_by_backend
        .insert(9, "/html/body/iframe".to_string());

    let driver = Arc::new(MockDriver::new(snapshot));
    let model = MockModel::new(json!({"elements": []}));

    let results = handler(driver, Arc::new(Metrics::new()))
        .observe(
            &model,
            ObserveParams {
                instruction: Some("anything"),
                request_id: "req-1",
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].description, "an iframe");
    assert_eq!(results[0].method.as_deref(), Some(NOT_SUPPORTED));
    assert!(results[0].arguments.is_empty());
    assert_eq!(results[0].selector, "xpath=/html/body/iframe");
}

#[tokio::test]
async fn observe_substitutes_the_default_instruction() {
    let driver = Arc::new(MockDriver::new(page_snapshot()));
    let model = MockModel::new(json!({"elements": []}));

    handler(driver, Arc::new(Metrics::new()))
        .observe(
            &model,
            ObserveParams {
                instruction: None,
                request_id: "req-1",
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let request = model.last_request();
    assert!(request.user.contains("Be comprehensive"));
    assert!(request.user.contains("[0-2] button: Add to cart"));
}

#[tokio::test]
async fn observe_records_usage_in_the_right_bucket() {
    let metrics = Arc::new(Metrics::new());
    let driver = Arc::new(MockDriver::new(page_snapshot()));
    let model = MockModel::new(json!({"elements": []}));

    let handler = handler(driver, metrics.clone());

    handler
        .observe(
            &model,
            ObserveParams {
                instruction: Some("observe"),
                request_id: "req-1",
                ..Default::default()
            },
        )
        .await
        .unwrap();

    handler
        .observe(
            &model,
            ObserveParams {
                instruction: Some("act"),
                request_id: "req-2",
                from_act: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let snapshot = metrics.snapshot();
    assert_eq!(snapshot.observe.call_count, 1);
    assert_eq!(snapshot.observe.prompt_tokens, 50);
    assert_eq!(snapshot.act.call_count, 1);
    assert_eq!(snapshot.act.inference_time_ms, 120);
}

#[tokio::test]
async fn observe_settle_failure_propagates() {
    let mut driver = MockDriver::new(page_snapshot());
    driver.settle_fails = true;

    let model = MockModel::new(json!({"elements": []}));
    let result = handler(Arc::new(driver), Arc::new(Metrics::new()))
        .observe(
            &model,
            ObserveParams {
                instruction: Some("anything"),
                request_id: "req-1",
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(ScoutError::DomSettleTimeout(_))));
    // The model was never consulted
    assert!(model.requests.lock().unwrap().is_empty());
}

#[tokio::test]
async fn observe_overlay_failures_are_swallowed() {
    let mut driver = MockDriver::new(page_snapshot());
    driver.evaluate_fails = true;
    let driver = Arc::new(driver);

    let model = MockModel::new(json!({
        "elements": [{"elementId": "0-2", "description": "add to cart"}]
    }));

    let results = handler(driver.clone(), Arc::new(Metrics::new()))
        .observe(
            &model,
            ObserveParams {
                instruction: Some("cart"),
                request_id: "req-1",
                draw_overlay: true,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    // The overlay script did run (and failed), proving best-effort dispatch
    let evaluations = driver.evaluations.lock().unwrap();
    assert!(evaluations.iter().any(|e| e.contains("data-page-scout-overlay")));
}

#[tokio::test]
async fn observe_user_instructions_reach_the_system_prompt() {
    let driver = Arc::new(MockDriver::new(page_snapshot()));
    let model = MockModel::new(json!({"elements": []}));
    let metrics = Arc::new(Metrics::new());

    let handler = ObserveHandler::new(
        driver,
        metrics,
        Some("Never suggest destructive actions.".to_string()),
        false,
    );

    handler
        .observe(
            &model,
            ObserveParams {
                instruction: Some("anything"),
                request_id: "req-1",
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let request = model.last_request();
    assert!(request
        .system
        .unwrap()
        .starts_with("Never suggest destructive actions."));
}

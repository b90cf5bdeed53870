//! # page-scout
//!
//! A Rust library that resolves natural-language instructions to concrete,
//! addressable elements on a live document, and optionally delegates the
//! whole action/extract/observe lifecycle to a remote execution service.
//!
//! ## Features
//!
//! - **Accessibility Encoding**: Turn per-frame accessibility data into a
//!   simplified, LLM-consumable tree plus a map from frame-scoped ids back
//!   to concrete locators
//! - **Observation Pipeline**: Instruction in, ordered list of resolved
//!   elements out, with graceful degradation for unaddressable elements
//! - **Model Gateway**: Route a model identifier string to the right backend
//!   (static table, namespaced `vendor/model`, or vertex-managed), with
//!   request-scoped response caching
//! - **Remote Sessions**: Delegate execution to a remote service over a
//!   chunked streaming protocol with live log forwarding
//!
//! ## Observing a page
//!
//! ```rust,no_run
//! use page_scout::{ClientOptions, Metrics, ModelGateway, ObserveHandler, ObserveParams};
//! use page_scout::page::PageDriver;
//! use std::sync::Arc;
//!
//! # async fn run(driver: Arc<dyn PageDriver>) -> page_scout::Result<()> {
//! let gateway = ModelGateway::new(true);
//! let model = gateway.resolve("openai/gpt-4.1", &ClientOptions::default())?;
//!
//! let handler = ObserveHandler::new(driver, Arc::new(Metrics::new()), None, false);
//! let results = handler
//!     .observe(
//!         model.as_ref(),
//!         ObserveParams {
//!             instruction: Some("find the login button"),
//!             request_id: "req-1",
//!             return_action: true,
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//!
//! for result in results {
//!     println!("{} -> {}", result.description, result.selector);
//! }
//! gateway.clean_request_cache("req-1");
//! # Ok(())
//! # }
//! ```
//!
//! ## Delegating to a remote session
//!
//! ```rust,no_run
//! use page_scout::api::{ActOptions, RemoteClientConfig, RemoteSessionClient, StartSessionParams};
//! use std::sync::Arc;
//!
//! # async fn run() -> page_scout::Result<()> {
//! let config = RemoteClientConfig::new("api-key", "project-id", "model-api-key");
//! let mut client = RemoteSessionClient::new(config, Arc::new(|line| println!("{}", line.message)));
//!
//! client
//!     .start_session(StartSessionParams {
//!         model_name: "gpt-4.1".to_string(),
//!         ..Default::default()
//!     })
//!     .await?;
//!
//! client
//!     .act(&ActOptions { action: "click the login button".to_string(), ..Default::default() })
//!     .await?;
//! client.end().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Overview
//!
//! - [`a11y`]: accessibility-tree encoding, frame combination, locator maps
//! - [`observe`]: the instruction-to-elements observation pipeline
//! - [`llm`]: model gateway, backend clients, and response caching
//! - [`api`]: remote-session client and its streaming protocol
//! - [`page`]: the page-control capability trait (plus the `cdp` adapter)
//! - [`error`]: error types and result aliases

pub mod a11y;
pub mod api;
pub mod error;
pub mod llm;
pub mod metrics;
pub mod observe;
pub mod page;

pub use a11y::{AxNode, CombinedTree, EncodedId, LocatorMap};
pub use api::{LogLine, LogSink, RemoteClientConfig, RemoteSessionClient};
pub use error::{Result, ScoutError};
pub use llm::{ClientOptions, ModelClient, ModelGateway, ProviderFamily, ResponseCache, Usage};
pub use metrics::{FunctionKind, Metrics, MetricsSnapshot};
pub use observe::{ObserveHandler, ObserveParams, ObserveResult, NOT_SUPPORTED};
pub use page::{AxSnapshot, PageDriver};

#[cfg(feature = "cdp")]
pub use page::cdp::CdpDriver;

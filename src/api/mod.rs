//! Remote execution protocol
//!
//! An alternate path that delegates the whole action/extract/observe
//! lifecycle to a remote session over a chunked streaming protocol. It is
//! independent of the local observation pipeline and does not use the
//! encoding components. It includes:
//! - RemoteSessionClient: session lifecycle and streamed method calls
//! - StreamDecoder: incremental record decoding tolerant of arbitrary chunk
//!   boundaries
//! - Wire types for requests, results, and forwarded log lines

pub mod client;
pub mod stream;
pub mod types;

pub use client::{LogSink, RemoteClientConfig, RemoteSessionClient, DEFAULT_API_URL};
pub use stream::{StreamDecoder, StreamEvent, RECORD_PREFIX};
pub use types::{
    ActOptions, ActResult, AgentConfig, AgentExecuteOptions, AgentResult, ExtractOptions,
    GotoOptions, LogLine, ObserveOptions, StartSessionParams, StartSessionResult,
};

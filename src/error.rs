use thiserror::Error;

/// Errors that can occur during instruction resolution or remote execution
#[derive(Debug, Error)]
pub enum ScoutError {
    /// A required configuration field is missing or inconsistent
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The remote service rejected the credentials (HTTP 401)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// A non-success HTTP status outside the cases handled explicitly
    #[error("HTTP error {status}: {body}")]
    Http { status: u16, body: String },

    /// The response carried no body where a streamed body was expected
    #[error("Response body missing")]
    ResponseBody,

    /// A streamed record could not be decoded
    #[error("Failed to parse server response: {0}")]
    ResponseParse(String),

    /// The remote service reported an error inside the stream
    #[error("Server error: {0}")]
    ServerReported(String),

    /// The model identifier is not in the static model table
    #[error("Unsupported model. Available models: {}", .0.join(", "))]
    UnsupportedModel(Vec<String>),

    /// The namespaced sub-provider is not recognized
    #[error("Unsupported provider. Available providers: {}", .0.join(", "))]
    UnsupportedProvider(Vec<String>),

    /// A local-only integration feature was requested in delegated mode
    #[error("Unsupported integration: {0}")]
    UnsupportedIntegration(String),

    /// The document did not reach a settled state within the deadline
    #[error("DOM did not settle within {0}ms")]
    DomSettleTimeout(u64),

    /// The page driver failed to perform a document operation
    #[error("Page driver error: {0}")]
    PageDriver(String),

    /// A model backend call failed (network or non-success status)
    #[error("Model call failed: {0}")]
    ModelCall(String),

    /// The model returned a completion that could not be interpreted
    #[error("Invalid model response: {0}")]
    InvalidModelResponse(String),
}

/// Result type alias for page-scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

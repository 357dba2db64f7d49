use thiserror::Error;

/// Top-level engine errors.
///
/// Only fatal conditions surface through this type: configuration problems,
/// request validation failures, decomposition failures, and graph contract
/// violations. Per-call generation failures are not errors — they are
/// reported as [`crate::pipeline::GenerationFailure`] metadata alongside a
/// successful analysis.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Validation failed: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Decomposition failed: {0}")]
    Decomposition(#[from] DecompositionError),

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Argument graph construction errors.
///
/// These indicate contract violations by the caller (or by a pipeline stage
/// merging unvalidated data) and are always fatal; the graph is never left
/// partially modified by a failed operation.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("Duplicate claim id: {id}")]
    DuplicateClaim { id: String },

    #[error("Dangling reference: {entity} targets unknown claim {claim_id}")]
    DanglingReference {
        entity: &'static str,
        claim_id: String,
    },

    #[error("Duplicate defense for claim {claim_id}")]
    DuplicateDefense { claim_id: String },

    #[error("Invalid claim categorization: {message}")]
    InvalidPartition { message: String },
}

/// Decomposition stage errors.
///
/// Decomposition is fail-fast: without at least one valid claim set there is
/// no meaningful partial result, so any of these aborts the whole analysis.
#[derive(Debug, Error)]
pub enum DecompositionError {
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("Malformed decomposition payload: {message}")]
    Malformed { message: String },

    #[error("Invalid claim {id}: {reason}")]
    InvalidClaim { id: String, reason: String },

    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Reasoning service gateway errors.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Rate limited by reasoning service{}", retry_after_display(.retry_after_ms))]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Reasoning service unavailable ({}): {message}", status_display(.status))]
    Unavailable { status: Option<u16>, message: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

fn retry_after_display(retry_after_ms: &Option<u64>) -> String {
    match retry_after_ms {
        Some(ms) => format!(" (retry after {}ms)", ms),
        None => String::new(),
    }
}

fn status_display(status: &Option<u16>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "no status".to_string(),
    }
}

impl GatewayError {
    /// Whether a retry with backoff could plausibly succeed.
    ///
    /// Rate limits, timeouts and 5xx responses are transient; malformed
    /// payloads and 4xx responses are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::RateLimited { .. } | GatewayError::Timeout { .. } => true,
            GatewayError::Unavailable { status, .. } => status.map_or(true, |code| code >= 500),
            GatewayError::MalformedResponse { .. } => false,
            GatewayError::Http(_) => true,
        }
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;

/// Result type alias for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Result type alias for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

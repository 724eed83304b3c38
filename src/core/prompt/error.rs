//! Error types for prompt compilation.
//!
//! The deterministic pipeline phases never fail: malformed input degrades to
//! empty phrases. Errors only exist at the edges, loading a data cache from
//! disk and the best-effort enhancement call, and the latter is always
//! swallowed by the engine before it reaches a caller.

use thiserror::Error;

/// Result type alias for prompt operations.
pub type Result<T> = std::result::Result<T, PromptError>;

#[derive(Error, Debug)]
pub enum PromptError {
    // =========================================================================
    // Data Errors
    // =========================================================================

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// File system I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // =========================================================================
    // Enhancement Errors
    // =========================================================================

    /// HTTP request to the local generation service failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The generation service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The generation service is not reachable.
    #[error("Enhancement service unavailable at {host}")]
    Unavailable { host: String },

    /// The call exceeded its hard timeout.
    #[error("Operation timed out: {operation}")]
    Timeout { operation: String },

    /// The response body did not carry generated text.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The rewrite failed one of the acceptance gates.
    #[error("Enhancement rejected by {gate} gate: {reason}")]
    GateRejected { gate: &'static str, reason: String },
}

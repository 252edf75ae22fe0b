//! Error types for the billwise domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Reasoning failures are fatal to a query; tool failures never leave the
//! dispatcher and are folded into the transcript instead.

use thiserror::Error;

use crate::message::Transcript;

/// The top-level error type returned by `ask`.
#[derive(Debug, Error)]
pub enum Error {
    // --- Reasoning backend ---
    #[error("Reasoning error: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("Reasoning backend did not answer within {timeout_ms}ms")]
    ReasoningTimeout { timeout_ms: u64 },

    // --- Loop control ---
    #[error("Loop limit exceeded: no final answer after {max_turns} reasoning turns")]
    LoopLimitExceeded {
        max_turns: u32,
        /// The transcript as it stood when the cap was hit, for diagnostics.
        transcript: Box<Transcript>,
    },

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// The partial transcript carried by a loop-limit failure.
    pub fn transcript(&self) -> Option<&Transcript> {
        match self {
            Error::LoopLimitExceeded { transcript, .. } => Some(transcript),
            _ => None,
        }
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum ReasoningError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("Invalid transcript: {0}")]
    InvalidTranscript(String),

    #[error("Backend not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

impl ReasoningError {
    /// Whether a retry could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ReasoningError::Network(_) | ReasoningError::RateLimited { .. }
        ) || matches!(self, ReasoningError::ApiError { status_code, .. } if *status_code >= 500)
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool timed out: {tool_name} after {timeout_ms}ms")]
    Timeout { tool_name: String, timeout_ms: u64 },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}

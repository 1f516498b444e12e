//! Error types for the SUMA relay domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant; the gateway maps them
//! to HTTP statuses at the request boundary.

use thiserror::Error;

/// The top-level error type for all relay operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Chat pipeline errors ---
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    // --- Mail relay errors ---
    #[error("Mail error: {0}")]
    Mail(#[from] MailError),

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

// --- Bounded context errors ---

/// Errors from the outbound completion API call.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    /// Required credential absent. Checked before any network I/O.
    #[error("{0}")]
    NotConfigured(String),

    /// Non-success response from the completion API. The message is the
    /// upstream-supplied human-readable error, passed through verbatim.
    #[error("{message}")]
    Api { status_code: u16, message: String },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Errors from the conversational turn pipeline.
#[derive(Debug, Clone, Error)]
pub enum ChatError {
    /// The caller omitted the session id. The only input validation
    /// performed by the turn engine itself.
    #[error("sessionId es requerido.")]
    MissingSession,
}

/// Errors from the contact-email relay.
#[derive(Debug, Clone, Error)]
pub enum MailError {
    #[error("{0}")]
    NotConfigured(String),

    #[error("{0}")]
    Delivery(String),

    #[error("Network error: {0}")]
    Network(String),
}

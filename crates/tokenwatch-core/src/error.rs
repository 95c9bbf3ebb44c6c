// ── Core error types ──
//
// Only setup and misuse are errors. Transport failures after activation
// surface as connection-state transitions, malformed frames are dropped,
// and gated sends are silent.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Lifecycle errors ─────────────────────────────────────────────
    #[error("Client is already active; deactivate it before activating again")]
    AlreadyActive,

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to agent: {reason}")]
    ConnectionFailed { reason: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint { url: String, reason: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tokenwatch_api::Error> for CoreError {
    fn from(err: tokenwatch_api::Error) -> Self {
        match err {
            tokenwatch_api::Error::InvalidUrl(e) => CoreError::InvalidEndpoint {
                url: String::new(),
                reason: e.to_string(),
            },
            tokenwatch_api::Error::UnsupportedScheme { scheme } => CoreError::InvalidEndpoint {
                url: String::new(),
                reason: format!("unsupported scheme '{scheme}' (expected ws or wss)"),
            },
            tokenwatch_api::Error::WebSocketConnect(reason)
            | tokenwatch_api::Error::WebSocketStream(reason) => {
                CoreError::ConnectionFailed { reason }
            }
            tokenwatch_api::Error::Serialization(e) => {
                CoreError::Internal(format!("Serialization error: {e}"))
            }
        }
    }
}

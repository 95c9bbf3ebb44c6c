use thiserror::Error;

/// Top-level error type for the `tokenwatch-api` crate.
///
/// Only setup and serialization failures are errors here. Once a socket is
/// running, transport trouble is reported as a [`SocketEvent`] instead.
/// `tokenwatch-core` maps these into user-facing diagnostics.
///
/// [`SocketEvent`]: crate::websocket::SocketEvent
#[derive(Debug, Error)]
pub enum Error {
    // ── Endpoint ────────────────────────────────────────────────────
    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The URL parsed but is not a WebSocket URL.
    #[error("Unsupported endpoint scheme '{scheme}' (expected ws or wss)")]
    UnsupportedScheme { scheme: String },

    // ── WebSocket ───────────────────────────────────────────────────
    /// WebSocket handshake failed.
    #[error("WebSocket connection failed: {0}")]
    WebSocketConnect(String),

    /// Reading or writing an established WebSocket failed.
    #[error("WebSocket stream error: {0}")]
    WebSocketStream(String),

    // ── Data ────────────────────────────────────────────────────────
    /// JSON serialization of an outbound command failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

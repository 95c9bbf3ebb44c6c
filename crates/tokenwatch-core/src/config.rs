// ── Runtime connection configuration ──
//
// Describes *where* to connect. Never touches disk: the binary builds a
// `ClientConfig` from its config file and flags and hands it in.

use url::Url;

use crate::error::CoreError;

/// Endpoint used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8000";

/// Configuration for one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Agent WebSocket endpoint (e.g., `ws://localhost:8000`).
    pub endpoint: Url,
}

impl ClientConfig {
    /// Build a config from an already-parsed URL, rejecting non-WebSocket schemes.
    pub fn new(endpoint: Url) -> Result<Self, CoreError> {
        if !matches!(endpoint.scheme(), "ws" | "wss") {
            return Err(CoreError::InvalidEndpoint {
                url: endpoint.to_string(),
                reason: format!(
                    "unsupported scheme '{}' (expected ws or wss)",
                    endpoint.scheme()
                ),
            });
        }
        Ok(Self { endpoint })
    }

    /// Parse and validate an endpoint string.
    pub fn parse(endpoint: &str) -> Result<Self, CoreError> {
        let url = Url::parse(endpoint).map_err(|e| CoreError::InvalidEndpoint {
            url: endpoint.to_string(),
            reason: e.to_string(),
        })?;
        Self::new(url)
    }
}

//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use tokenwatch_config::ConfigError;
use tokenwatch_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to agent at {url}")]
    #[diagnostic(
        code(tokenwatch::connection_failed),
        help(
            "Check that the agent is running and reachable ({reason}).\n\
             Override the endpoint with --endpoint or TOKENWATCH_ENDPOINT."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("Connection to {url} did not open within {seconds}s")]
    #[diagnostic(
        code(tokenwatch::timeout),
        help("Increase the wait with --wait or check agent responsiveness.")
    )]
    Timeout { url: String, seconds: u64 },

    #[error("Invalid endpoint '{url}'")]
    #[diagnostic(
        code(tokenwatch::invalid_endpoint),
        help("{reason}\nExpected a ws:// or wss:// URL, e.g. ws://localhost:8000")
    )]
    InvalidEndpoint { url: String, reason: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(tokenwatch::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Could not load configuration")]
    #[diagnostic(
        code(tokenwatch::config),
        help("Check the config file at {path}")
    )]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(tokenwatch::config_exists),
        help("Use --force to overwrite {path}")
    )]
    ConfigExists { path: String },

    // ── Internal ─────────────────────────────────────────────────────

    #[error("{0}")]
    #[diagnostic(code(tokenwatch::internal))]
    Internal(String),

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Failed to render JSON: {0}")]
    #[diagnostic(code(tokenwatch::json))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(tokenwatch::yaml))]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to render TOML: {0}")]
    #[diagnostic(code(tokenwatch::toml))]
    Toml(#[from] toml::ser::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::InvalidEndpoint { .. } | Self::Validation { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidEndpoint { url, reason } => CliError::InvalidEndpoint { url, reason },

            CoreError::ConnectionFailed { reason } => CliError::ConnectionFailed {
                url: "(unknown)".into(),
                reason,
            },

            CoreError::AlreadyActive => CliError::Internal("connection already active".into()),

            CoreError::Internal(message) => CliError::Internal(message),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::Io(e) => CliError::Io(e),
            source => CliError::Config {
                path: tokenwatch_config::config_path().display().to_string(),
                source,
            },
        }
    }
}

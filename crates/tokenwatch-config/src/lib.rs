//! Configuration file for the tokenwatch CLI.
//!
//! A small TOML file in the platform config directory, layered with
//! figment and translated into `tokenwatch_core::ClientConfig`. The core
//! crate never reads files itself.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tokenwatch_core::{ClientConfig, DEFAULT_ENDPOINT};

/// Environment variable prefix; only `TOKENWATCH_ENDPOINT` is honored.
pub const ENV_PREFIX: &str = "TOKENWATCH_";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Agent WebSocket endpoint (`ws://` or `wss://`).
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Default output format for data commands.
    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            output: default_output(),
        }
    }
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.into()
}
fn default_output() -> String {
    "table".into()
}

impl Config {
    /// Translate into the core client configuration, validating the endpoint.
    pub fn to_client_config(&self) -> Result<ClientConfig, ConfigError> {
        ClientConfig::parse(&self.endpoint).map_err(|e| ConfigError::Validation {
            field: "endpoint".into(),
            reason: e.to_string(),
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "tokenwatch", "tokenwatch").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("tokenwatch");
    p
}

// ── Config loading ──────────────────────────────────────────────────

fn file_figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
}

/// Load the config from the canonical path, then `TOKENWATCH_ENDPOINT`.
pub fn load_config() -> Result<Config, ConfigError> {
    let figment =
        file_figment(&config_path()).merge(Env::prefixed(ENV_PREFIX).only(&["endpoint"]));
    Ok(figment.extract()?)
}

/// Load defaults overlaid with a specific file. A missing file yields
/// the defaults; no environment variables are consulted.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    Ok(file_figment(path).extract()?)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`, creating parent dirs.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

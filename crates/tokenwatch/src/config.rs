//! `GlobalOpts`-aware wrappers over `tokenwatch-config`.
//!
//! Precedence: `--endpoint` flag, then `TOKENWATCH_ENDPOINT` (both via
//! clap), then the config file, then the built-in default.

use clap::ValueEnum;

use tokenwatch_config::Config;
use tokenwatch_core::ClientConfig;

use crate::cli::{GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output::{self, OutputOpts};

/// Load the config file; a missing file yields the defaults.
pub fn load() -> Result<Config, CliError> {
    Ok(tokenwatch_config::load_config()?)
}

/// The config file with command-line overrides applied.
pub fn resolved(global: &GlobalOpts, cfg: &Config) -> Config {
    let mut resolved = cfg.clone();
    if let Some(ref endpoint) = global.endpoint {
        resolved.endpoint.clone_from(endpoint);
    }
    if let Some(format) = global.output {
        resolved.output = format_name(format);
    }
    resolved
}

/// Build the core `ClientConfig` from flags and file.
pub fn resolve_client_config(global: &GlobalOpts, cfg: &Config) -> Result<ClientConfig, CliError> {
    let endpoint = global.endpoint.as_deref().unwrap_or(&cfg.endpoint);
    Ok(ClientConfig::parse(endpoint)?)
}

/// Resolve output settings: `--output`, then the file's `output` key.
pub fn resolve_output(global: &GlobalOpts, cfg: &Config) -> Result<OutputOpts, CliError> {
    let format = match global.output {
        Some(format) => format,
        None => OutputFormat::from_str(&cfg.output, true).map_err(|_| CliError::Validation {
            field: "output".into(),
            reason: format!(
                "'{}' in config file is not one of table, json, json-compact, yaml, plain",
                cfg.output
            ),
        })?,
    };

    Ok(OutputOpts {
        format,
        color: output::should_color(global.color),
        quiet: global.quiet,
    })
}

/// The kebab-case name clap uses for an output format.
pub fn format_name(format: OutputFormat) -> String {
    format
        .to_possible_value()
        .map_or_else(|| "table".into(), |v| v.get_name().to_owned())
}

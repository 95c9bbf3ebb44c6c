//! Config subcommand handlers.

use tokenwatch_config::{Config, config_path};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts, OutputFormat};
use crate::config;
use crate::error::CliError;
use crate::output::{self, OutputOpts};

pub fn handle(args: ConfigArgs, resolved: &Config, out: &OutputOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: write the resolved values ─────────────────────────
        ConfigCommand::Init { force } => {
            let path = config_path();
            if path.exists() && !force {
                return Err(CliError::ConfigExists {
                    path: path.display().to_string(),
                });
            }

            // Refuse to persist an endpoint the client can't use.
            resolved.to_client_config()?;
            let path = tokenwatch_config::save_config(resolved)?;

            if !out.quiet {
                eprintln!("Configuration written to {}", path.display());
                eprintln!("  endpoint: {}", resolved.endpoint);
                eprintln!("  output:   {}", resolved.output);
            }
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let detail = toml::to_string_pretty(resolved)?;
            let rendered = output::render_single(
                out.format,
                resolved,
                |_| detail.clone(),
                |c| c.endpoint.clone(),
            )?;
            output::print_output(rendered.trim_end(), out.quiet);
            Ok(())
        }

        // ── Path ────────────────────────────────────────────────────
        ConfigCommand::Path => {
            output::print_output(&config_path().display().to_string(), out.quiet);
            Ok(())
        }
    }
}

/// Output settings for config commands, which must work even when the
/// file's `output` key is invalid.
pub fn output_opts(global: &GlobalOpts, cfg: &Config) -> OutputOpts {
    config::resolve_output(global, cfg).unwrap_or(OutputOpts {
        format: global.output.unwrap_or(OutputFormat::Table),
        color: output::should_color(global.color),
        quiet: global.quiet,
    })
}

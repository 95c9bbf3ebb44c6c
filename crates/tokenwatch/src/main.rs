mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tokenwatch_core::Controller;

use crate::cli::{Cli, Command, ConfigCommand};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

/// Diagnostics go to stderr so stdout carries only data.
fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        // Config commands don't need a connection
        Command::Config(args) => {
            let cfg = match config::load() {
                Ok(cfg) => cfg,
                // `init --force` and `path` must work past a broken file
                Err(e) if !matches!(args.command, ConfigCommand::Show) => {
                    tracing::warn!(error = %e, "ignoring unreadable config file");
                    tokenwatch_config::Config::default()
                }
                Err(e) => return Err(e),
            };
            let out = commands::config_cmd::output_opts(&cli.global, &cfg);
            let resolved = config::resolved(&cli.global, &cfg);
            commands::config_cmd::handle(args, &resolved, &out)
        }

        // Shell completions generation
        Command::Completions(args) => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Cli::command();
            generate(args.shell, &mut cmd, "tokenwatch", &mut std::io::stdout());
            Ok(())
        }

        // All other commands talk to the agent
        cmd => {
            let cfg = config::load()?;
            let client_config = config::resolve_client_config(&cli.global, &cfg)?;
            let out = config::resolve_output(&cli.global, &cfg)?;
            let controller = Controller::new(client_config);

            tracing::debug!(command = ?cmd, endpoint = %controller.config().endpoint, "dispatching command");
            commands::dispatch(cmd, &controller, &out).await
        }
    }
}

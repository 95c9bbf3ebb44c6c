//! Command dispatch: bridges CLI args -> controller lifecycle -> output formatting.

pub mod config_cmd;
pub mod send;
pub mod tokens;
pub mod watch;

use std::time::Duration;

use tokenwatch_core::{ConnectionState, Controller};

use crate::cli::Command;
use crate::error::CliError;
use crate::output::OutputOpts;

/// Handshake bound for commands that don't take a `--wait`.
pub const DEFAULT_CONNECT_WAIT_SECS: u64 = 10;

/// Dispatch a connection-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    controller: &Controller,
    out: &OutputOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Watch(args) => watch::handle(controller, args, out).await,
        Command::Tokens(args) => tokens::handle(controller, args, out).await,
        Command::Task(args) => send::task(controller, args, out).await,
        Command::Ask(args) => send::ask(controller, args, out).await,
        // Config and Completions are handled before dispatch
        Command::Config(_) | Command::Completions(_) => Err(CliError::Internal(
            "command does not use a connection".into(),
        )),
    }
}

/// Activate and wait for the handshake, bounded by `wait_secs`.
///
/// On any outcome other than `Connected` the controller is deactivated
/// before the error is returned.
pub async fn connect(controller: &Controller, wait_secs: u64) -> Result<(), CliError> {
    controller.activate().await?;
    let url = controller.config().endpoint.to_string();

    let handshake = tokio::time::timeout(
        Duration::from_secs(wait_secs),
        controller.wait_for_handshake(),
    )
    .await;

    match handshake {
        Ok(ConnectionState::Connected) => {
            tracing::debug!(%url, "connected");
            Ok(())
        }
        Ok(_) => {
            controller.deactivate().await;
            let reason = controller
                .last_error()
                .unwrap_or_else(|| controller.store().status());
            Err(CliError::ConnectionFailed { url, reason })
        }
        Err(_) => {
            controller.deactivate().await;
            Err(CliError::Timeout {
                url,
                seconds: wait_secs,
            })
        }
    }
}

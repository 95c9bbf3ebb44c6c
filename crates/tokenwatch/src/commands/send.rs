//! `task` and `ask`: deliver one command to the agent.

use tokenwatch_core::{Command, ConnectionState, Controller};

use crate::cli::{AskArgs, TaskArgs};
use crate::error::CliError;
use crate::output::{self, OutputOpts};

use super::connect;

pub async fn task(controller: &Controller, args: TaskArgs, out: &OutputOpts) -> Result<(), CliError> {
    require_text("task", &args.text)?;
    deliver(controller, Command::SetTask { task: args.text }, args.wait, out).await
}

pub async fn ask(controller: &Controller, args: AskArgs, out: &OutputOpts) -> Result<(), CliError> {
    require_text("question", &args.question)?;
    let command = Command::Ask {
        question: args.question,
    };
    deliver(controller, command, args.wait, out).await
}

/// Blank input never reaches the wire; the text itself is sent untrimmed.
fn require_text(field: &str, value: &str) -> Result<(), CliError> {
    if value.trim().is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "must not be empty".into(),
        });
    }
    Ok(())
}

async fn deliver(
    controller: &Controller,
    command: Command,
    wait_secs: u64,
    out: &OutputOpts,
) -> Result<(), CliError> {
    connect(controller, wait_secs).await?;
    if let Err(e) = require_open(controller) {
        controller.deactivate().await;
        return Err(e);
    }
    controller.send(&command).await;
    // Flushes the queued frame before the close handshake.
    controller.deactivate().await;

    let rendered = output::render_single(out.format, &command, describe, |c| {
        c.kind().to_owned()
    })?;
    output::print_output(&rendered, out.quiet);
    Ok(())
}

/// The agent may hang up between the handshake and the send, in which
/// case the controller would drop the command silently.
fn require_open(controller: &Controller) -> Result<(), CliError> {
    if *controller.connection_state().borrow() == ConnectionState::Connected {
        return Ok(());
    }
    Err(CliError::ConnectionFailed {
        url: controller.config().endpoint.to_string(),
        reason: controller
            .last_error()
            .unwrap_or_else(|| "connection closed before the command was sent".into()),
    })
}

fn describe(command: &Command) -> String {
    match command {
        Command::SetTask { task } => format!("Task submitted: {task}"),
        Command::Ask { question } => format!("Question submitted: {question}"),
    }
}

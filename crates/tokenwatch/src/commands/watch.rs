//! `watch`: follow the agent live.
//!
//! Table/plain output prints one line per change (status, metadata, each
//! newly discovered token). JSON prints one snapshot per change, YAML one
//! document per change.

use std::sync::Arc;
use std::time::Duration;

use owo_colors::OwoColorize;

use tokenwatch_core::{ConnectionState, Controller, Metadata, SyncState, Token};

use crate::cli::{OutputFormat, WatchArgs};
use crate::error::CliError;
use crate::output::{self, OutputOpts};

use super::{DEFAULT_CONNECT_WAIT_SECS, connect};

pub async fn handle(controller: &Controller, args: WatchArgs, out: &OutputOpts) -> Result<(), CliError> {
    connect(controller, DEFAULT_CONNECT_WAIT_SECS).await?;

    let mut printer = ChangePrinter::new(*out);
    let mut states = controller.subscribe();
    let mut conn = controller.connection_state();
    printer.show(states.current())?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    let deadline = async {
        match args.duration {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(deadline);

    let outcome = loop {
        tokio::select! {
            _ = &mut ctrl_c => break Ok(()),
            () = &mut deadline => break Ok(()),
            snapshot = states.changed() => match snapshot {
                Some(snapshot) => {
                    if let Err(e) = printer.show(&snapshot) {
                        break Err(e);
                    }
                }
                None => break Ok(()),
            },
            changed = conn.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
                let state = *conn.borrow_and_update();
                if matches!(state, ConnectionState::Disconnected | ConnectionState::Error) {
                    break ended(controller);
                }
            }
        }
    };

    // Every event the socket produced is applied once this returns.
    controller.deactivate().await;
    printer.show(&controller.store().snapshot())?;
    outcome
}

/// A close is a clean end; a transport failure before it is not.
fn ended(controller: &Controller) -> Result<(), CliError> {
    match controller.last_error() {
        Some(reason) => Err(CliError::ConnectionFailed {
            url: controller.config().endpoint.to_string(),
            reason: format!("connection lost: {reason}"),
        }),
        None => Ok(()),
    }
}

// ── Change rendering ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Change {
    Status(String),
    Meta(Metadata),
    Token(Token),
    Replaced(usize),
}

/// What changed between two snapshots, in display order.
fn diff(prev: Option<&SyncState>, next: &SyncState) -> Vec<Change> {
    let mut changes = Vec::new();

    if prev.is_none_or(|p| p.status != next.status) {
        changes.push(Change::Status(next.status.clone()));
    }
    if prev.is_none_or(|p| p.metadata != next.metadata) && next.metadata != Metadata::default() {
        changes.push(Change::Meta(next.metadata.clone()));
    }

    let before = prev.map_or(&[][..], |p| p.tokens.as_slice());
    let after = next.tokens.as_slice();
    let appended = after.len() >= before.len() && after.starts_with(before);
    let fresh = if appended {
        after.get(before.len()..).unwrap_or_default()
    } else {
        changes.push(Change::Replaced(after.len()));
        after
    };
    changes.extend(fresh.iter().cloned().map(Change::Token));

    changes
}

struct ChangePrinter {
    out: OutputOpts,
    last: Option<Arc<SyncState>>,
}

impl ChangePrinter {
    fn new(out: OutputOpts) -> Self {
        Self { out, last: None }
    }

    fn show(&mut self, next: &Arc<SyncState>) -> Result<(), CliError> {
        if self.last.as_deref() == Some(next.as_ref()) {
            return Ok(());
        }

        match self.out.format {
            OutputFormat::Table | OutputFormat::Plain => {
                for change in diff(self.last.as_deref(), next) {
                    output::print_output(&self.line(&change), self.out.quiet);
                }
            }
            OutputFormat::Json | OutputFormat::JsonCompact => {
                let rendered = output::render_json(next.as_ref(), true)?;
                output::print_output(&rendered, self.out.quiet);
            }
            OutputFormat::Yaml => {
                let rendered = output::render_yaml(next.as_ref())?;
                output::print_output(&format!("---\n{}", rendered.trim_end()), self.out.quiet);
            }
        }

        self.last = Some(Arc::clone(next));
        Ok(())
    }

    fn line(&self, change: &Change) -> String {
        let (label, text) = match change {
            Change::Status(status) => ("status", status.clone()),
            Change::Meta(meta) => ("meta", format!("{}: {}", meta.title, meta.description)),
            Change::Token(token) => (
                "token",
                format!(
                    "{} ({})  {}  {}",
                    token.name,
                    token.symbol,
                    output::fmt_market_cap(token.market_cap),
                    output::fmt_price(token.price)
                ),
            ),
            Change::Replaced(count) => ("tokens", format!("list replaced, {count} entries")),
        };

        if self.out.color {
            format!("{:<7}{}", label.dimmed(), text.bold())
        } else {
            format!("{label:<7}{text}")
        }
    }
}

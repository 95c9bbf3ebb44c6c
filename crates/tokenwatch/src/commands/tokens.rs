//! `tokens`: collect for a while, then print the token table.

use std::time::Duration;

use tokenwatch_core::{ConnectionState, Controller, Token};

use crate::cli::{OutputFormat, TokenSort, TokensArgs};
use crate::error::CliError;
use crate::output::{self, OutputOpts, TokenRow};

use super::{DEFAULT_CONNECT_WAIT_SECS, connect};

pub async fn handle(
    controller: &Controller,
    args: TokensArgs,
    out: &OutputOpts,
) -> Result<(), CliError> {
    connect(controller, DEFAULT_CONNECT_WAIT_SECS).await?;

    // Collect until the window closes or the agent goes away.
    let mut conn = controller.connection_state();
    let _ = tokio::time::timeout(
        Duration::from_secs(args.wait),
        conn.wait_for(|state| *state != ConnectionState::Connected),
    )
    .await;
    controller.deactivate().await;

    let snapshot = controller.store().snapshot();
    let mut tokens = controller.store().tokens_snapshot();
    sort_tokens(&mut tokens, args.sort);
    let summary = output::token_summary(&tokens);
    if let Some(limit) = args.limit {
        tokens.truncate(limit);
    }

    if out.format == OutputFormat::Table && !out.quiet && !snapshot.metadata.title.is_empty() {
        output::print_output(&snapshot.metadata.title, false);
    }

    let rendered = output::render_list(out.format, &tokens, TokenRow::from_token, |t| {
        t.name.clone()
    })?;
    output::print_output(&rendered, out.quiet);

    if out.format == OutputFormat::Table {
        output::print_output(&summary, out.quiet);
    }
    Ok(())
}

/// Stable sort; `None` keeps discovery order.
fn sort_tokens(tokens: &mut [Token], sort: Option<TokenSort>) {
    match sort {
        Some(TokenSort::MarketCap) => {
            tokens.sort_by(|a, b| b.market_cap.total_cmp(&a.market_cap));
        }
        Some(TokenSort::Name) => tokens.sort_by(|a, b| a.name.cmp(&b.name)),
        None => {}
    }
}

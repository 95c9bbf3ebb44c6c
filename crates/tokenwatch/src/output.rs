//! Output formatting: table, JSON, YAML, plain.
//!
//! Renders data in the format selected by `--output`. Table uses `tabled`,
//! structured formats use serde, plain emits one identifier per line.

use std::io::{self, IsTerminal, Write};

use tabled::{Table, Tabled, settings::Style};

use tokenwatch_core::Token;

use crate::cli::{ColorMode, OutputFormat};
use crate::error::CliError;

/// Resolved output settings shared by every handler.
#[derive(Debug, Clone, Copy)]
pub struct OutputOpts {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
}

/// Determine whether color output should be enabled.
pub fn should_color(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => io::stdout().is_terminal() && std::env::var("NO_COLOR").is_err(),
    }
}

// ── Render dispatchers ───────────────────────────────────────────────

/// Render a list of serde-serializable + tabled items in the chosen format.
///
/// - `table`: uses the `Tabled` derive to build a pretty table
/// - `json` / `json-compact`: serializes the original data via serde
/// - `yaml`: serializes via serde_yaml
/// - `plain`: calls `id_fn` on each item to emit one identifier per line
pub fn render_list<T, R>(
    format: OutputFormat,
    data: &[T],
    to_row: impl Fn(&T) -> R,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
    R: Tabled,
{
    match format {
        OutputFormat::Table => {
            let rows: Vec<R> = data.iter().map(to_row).collect();
            Ok(render_table(&rows))
        }
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(data.iter().map(&id_fn).collect::<Vec<_>>().join("\n")),
    }
}

/// Render a single serde-serializable item in the chosen format.
///
/// Table rendering uses a custom `detail_fn` that returns a pre-formatted string,
/// since single-item detail views don't use `Tabled` derive.
pub fn render_single<T>(
    format: OutputFormat,
    data: &T,
    detail_fn: impl Fn(&T) -> String,
    id_fn: impl Fn(&T) -> String,
) -> Result<String, CliError>
where
    T: serde::Serialize,
{
    match format {
        OutputFormat::Table => Ok(detail_fn(data)),
        OutputFormat::Json => render_json(data, false),
        OutputFormat::JsonCompact => render_json(data, true),
        OutputFormat::Yaml => render_yaml(data),
        OutputFormat::Plain => Ok(id_fn(data)),
    }
}

/// Print the rendered output to stdout, respecting quiet mode.
pub fn print_output(output: &str, quiet: bool) {
    if quiet || output.is_empty() {
        return;
    }
    let mut stdout = io::stdout().lock();
    let _ = writeln!(stdout, "{output}");
}

// ── Format-specific renderers ────────────────────────────────────────

fn render_table<R: Tabled>(rows: &[R]) -> String {
    Table::new(rows).with(Style::rounded()).to_string()
}

pub(crate) fn render_json<T: serde::Serialize + ?Sized>(
    data: &T,
    compact: bool,
) -> Result<String, CliError> {
    let rendered = if compact {
        serde_json::to_string(data)?
    } else {
        serde_json::to_string_pretty(data)?
    };
    Ok(rendered)
}

pub(crate) fn render_yaml<T: serde::Serialize + ?Sized>(data: &T) -> Result<String, CliError> {
    Ok(serde_yaml::to_string(data)?)
}

// ── Token formatting ─────────────────────────────────────────────────

/// Compact dollar amount: `$1.23M`, `$4.56K`, or the plain value below 1000.
pub fn fmt_market_cap(value: f64) -> String {
    if value >= 1_000_000.0 {
        format!("${:.2}M", value / 1_000_000.0)
    } else if value >= 1_000.0 {
        format!("${:.2}K", value / 1_000.0)
    } else {
        format!("${value}")
    }
}

pub fn fmt_price(value: f64) -> String {
    format!("${value:.6}")
}

#[derive(Tabled)]
pub struct TokenRow {
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Symbol")]
    pub symbol: String,
    #[tabled(rename = "Market Cap")]
    pub market_cap: String,
    #[tabled(rename = "Price")]
    pub price: String,
}

impl TokenRow {
    pub fn from_token(t: &Token) -> Self {
        Self {
            name: t.name.clone(),
            symbol: t.symbol.clone(),
            market_cap: fmt_market_cap(t.market_cap),
            price: fmt_price(t.price),
        }
    }
}

/// Count, total and average market cap of a token list.
#[allow(clippy::cast_precision_loss, clippy::as_conversions)]
pub fn token_summary(tokens: &[Token]) -> String {
    let total: f64 = tokens.iter().map(|t| t.market_cap).sum();
    let average = if tokens.is_empty() {
        0.0
    } else {
        total / tokens.len() as f64
    };
    format!(
        "{} tokens, total {}, average {}",
        tokens.len(),
        fmt_market_cap(total),
        fmt_market_cap(average)
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn token(name: &str, market_cap: f64) -> Token {
        Token {
            name: name.into(),
            symbol: name.to_uppercase(),
            market_cap,
            price: 0.5,
        }
    }

    #[test]
    fn market_cap_suffixes() {
        assert_eq!(fmt_market_cap(1_234_567.0), "$1.23M");
        assert_eq!(fmt_market_cap(1_000_000.0), "$1.00M");
        assert_eq!(fmt_market_cap(4_560.0), "$4.56K");
        assert_eq!(fmt_market_cap(789.0), "$789");
        assert_eq!(fmt_market_cap(12.5), "$12.5");
        assert_eq!(fmt_market_cap(0.0), "$0");
    }

    #[test]
    fn price_has_six_decimals() {
        assert_eq!(fmt_price(0.5), "$0.500000");
        assert_eq!(fmt_price(1234.0), "$1234.000000");
    }

    #[test]
    fn summary_of_empty_list() {
        assert_eq!(token_summary(&[]), "0 tokens, total $0, average $0");
    }

    #[test]
    fn summary_totals_and_averages() {
        let tokens = [token("a", 1_500.0), token("b", 500.0)];
        assert_eq!(token_summary(&tokens), "2 tokens, total $2.00K, average $1.00K");
    }

    #[test]
    fn plain_lists_one_name_per_line() {
        let tokens = [token("Foo", 1.0), token("Bar", 2.0)];
        let out = render_list(
            OutputFormat::Plain,
            &tokens,
            TokenRow::from_token,
            |t| t.name.clone(),
        )
        .unwrap();
        assert_eq!(out, "Foo\nBar");
    }

    #[test]
    fn compact_json_uses_wire_field_names() {
        let tokens = [token("Foo", 100.0)];
        let out = render_list(OutputFormat::JsonCompact, &tokens, TokenRow::from_token, |t| {
            t.name.clone()
        })
        .unwrap();
        assert_eq!(
            out,
            r#"[{"name":"Foo","symbol":"FOO","marketCap":100.0,"price":0.5}]"#
        );
    }

    #[test]
    fn table_has_headers_and_formatted_values() {
        let tokens = [token("Foo", 2_500_000.0)];
        let out = render_list(OutputFormat::Table, &tokens, TokenRow::from_token, |t| {
            t.name.clone()
        })
        .unwrap();
        assert!(out.contains("Market Cap"));
        assert!(out.contains("$2.50M"));
        assert!(out.contains("$0.500000"));
    }
}

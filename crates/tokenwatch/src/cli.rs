//! Clap derive structures for the `tokenwatch` CLI.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tokenwatch -- follow a token discovery agent from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "tokenwatch",
    version,
    about = "Mirror and steer a token discovery agent over WebSocket",
    long_about = "Connects to a token discovery agent, mirrors its status, metadata and\n\
        discovered tokens, and sends it tasks and questions.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Agent WebSocket endpoint (overrides the config file)
    #[arg(long, short = 'e', env = "TOKENWATCH_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Follow the agent live, printing changes as they arrive
    #[command(alias = "w")]
    Watch(WatchArgs),

    /// Collect discovered tokens for a while, then print them
    #[command(alias = "t")]
    Tokens(TokensArgs),

    /// Give the agent a new task
    Task(TaskArgs),

    /// Ask the agent a question
    Ask(AskArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Watch ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Stop after this many seconds (default: until Ctrl-C or disconnect)
    #[arg(long, short = 'd')]
    pub duration: Option<u64>,
}

// ── Tokens ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TokensArgs {
    /// Seconds to collect before printing
    #[arg(long, short = 'w', default_value = "5")]
    pub wait: u64,

    /// Sort order (default: discovery order)
    #[arg(long, short = 's')]
    pub sort: Option<TokenSort>,

    /// Show at most this many tokens
    #[arg(long, short = 'l')]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TokenSort {
    /// Largest market cap first
    MarketCap,
    /// Alphabetical by name
    Name,
}

// ── Commands to the agent ────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct TaskArgs {
    /// Task description for the agent
    pub text: String,

    /// Seconds to wait for the connection to open
    #[arg(long, short = 'w', default_value = "10")]
    pub wait: u64,
}

#[derive(Debug, Args)]
pub struct AskArgs {
    /// Question for the agent
    pub question: String,

    /// Seconds to wait for the connection to open
    #[arg(long, short = 'w', default_value = "10")]
    pub wait: u64,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file from the current flags and defaults
    Init {
        /// Overwrite an existing config file
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

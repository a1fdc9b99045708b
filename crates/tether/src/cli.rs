//! Clap derive structures for the `tether` CLI.
//!
//! Defines the command tree, global flags, and shared presentation
//! types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use tether_config::Config;

// ── Top-Level CLI ────────────────────────────────────────────────────

/// tether -- control the tether companion service
#[derive(Debug, Parser)]
#[command(
    name = "tether",
    version,
    about = "Control the tether companion service from the command line",
    long_about = "Talks to the local tether companion service over its loopback REST API:\n\
        VPN session control, login credentials, and service health.",
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
    /// Companion service base URL
    #[arg(long, short = 'u', env = "TETHER_BASE_URL", global = true)]
    pub base_url: Option<String>,

    /// Bearer token cache file
    #[arg(long, env = "TETHER_TOKEN_FILE", global = true)]
    pub token_file: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'o', env = "TETHER_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, env = "TETHER_COLOR", global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, env = "TETHER_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Status poll cadence for watch, in seconds
    #[arg(long, env = "TETHER_POLL_INTERVAL", global = true)]
    pub poll_interval: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
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

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Resolved presentation options ────────────────────────────────────

/// Effective output settings for one invocation.
///
/// Flags beat the config file's `[defaults]` section, which beats
/// built-ins.
#[derive(Debug, Clone)]
pub struct ViewOpts {
    pub output: OutputFormat,
    pub color: ColorMode,
    pub quiet: bool,
}

impl ViewOpts {
    pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Self {
        let output = global.output.clone().unwrap_or_else(|| {
            OutputFormat::from_str(&cfg.defaults.output, true).unwrap_or(OutputFormat::Table)
        });
        let color = global.color.clone().unwrap_or_else(|| {
            ColorMode::from_str(&cfg.defaults.color, true).unwrap_or(ColorMode::Auto)
        });

        Self {
            output,
            color,
            quiet: global.quiet,
        }
    }
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the live VPN connection state
    Status,

    /// List the VPN profiles the companion can connect
    #[command(alias = "ls")]
    Profiles,

    /// Connect a VPN profile (the configured default when omitted)
    Connect(ConnectArgs),

    /// Disconnect the active VPN session
    Disconnect,

    /// Show or set the default VPN profile
    Default(DefaultArgs),

    /// Fetch login credentials from the companion
    Creds(CredsArgs),

    /// Show the associate email for the logged-in user
    Email,

    /// Check companion service health
    Health,

    /// Stream connection state changes until interrupted
    Watch,

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Args)]
pub struct ConnectArgs {
    /// Profile ID to connect; omit to use the companion's default
    pub profile: Option<String>,
}

#[derive(Debug, Args)]
pub struct DefaultArgs {
    /// Profile ID to make the default; omit to show the current one
    pub profile: Option<String>,
}

#[derive(Debug, Args)]
pub struct CredsArgs {
    /// Caller context label reported to the companion
    #[arg(long, default_value = "cli")]
    pub context: String,

    /// Request headless-flow credentials
    #[arg(long)]
    pub headless: bool,

    /// Print the password instead of masking it
    #[arg(long)]
    pub show_secret: bool,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Write a config file with the default settings
    Init,

    /// Display the current resolved configuration
    Show,

    /// Print the config file path
    Path,

    /// Set a configuration value
    Set {
        /// Config key, e.g. "base_url" or "poll_interval_secs"
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}

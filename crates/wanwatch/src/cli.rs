//! Clap derive structures for the `wanwatch` CLI.
//!
//! Global flags override the active config profile; every flag also has
//! a `WANWATCH_*` environment variable.

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-level CLI ────────────────────────────────────────────────────

/// wanwatch: watch firewall WAN links over digest-auth REST or SNMP
#[derive(Debug, Parser)]
#[command(
    name = "wanwatch",
    version,
    about = "Watch firewall WAN link state and bandwidth",
    long_about = "Polls a firewall appliance for WAN interface status over its \
        digest-authenticated REST API or SNMP v2c, records link up/down \
        transitions, and derives bandwidth from interface counters.",
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
    /// Appliance profile to use
    #[arg(long, short = 'p', env = "WANWATCH_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Acquisition method
    #[arg(long, short = 'm', env = "WANWATCH_METHOD", global = true, value_enum)]
    pub method: Option<Method>,

    /// REST API base URL (e.g. https://192.168.168.168/api/sonicos)
    #[arg(long, short = 'u', env = "WANWATCH_URL", global = true)]
    pub url: Option<String>,

    /// Appliance host (SNMP target, or REST host when no URL is given)
    #[arg(long, short = 'H', env = "WANWATCH_HOST", global = true)]
    pub host: Option<String>,

    /// Comma-separated WAN interfaces to monitor, e.g. X1,X2
    #[arg(long, short = 'i', env = "WANWATCH_INTERFACES", global = true)]
    pub interfaces: Option<String>,

    /// Accept self-signed TLS certificates
    #[arg(long, short = 'k', env = "WANWATCH_INSECURE", global = true)]
    pub insecure: bool,

    /// Per-request timeout in seconds
    #[arg(long, env = "WANWATCH_TIMEOUT", global = true)]
    pub timeout: Option<u64>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "WANWATCH_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color
    #[arg(long, env = "WANWATCH_COLOR", default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Enums ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Method {
    /// Digest-authenticated REST API
    Rest,
    /// SNMP v2c walk of IF-MIB
    Snmp,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rest => "rest",
            Self::Snmp => "snmp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
    JsonCompact,
    Yaml,
    Plain,
}

impl OutputFormat {
    pub fn is_structured(self) -> bool {
        matches!(self, Self::Json | Self::JsonCompact | Self::Yaml)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

// ── Commands ─────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Poll the appliance once and print interface status
    Poll,

    /// Poll continuously, printing link events and bandwidth
    Watch(WatchArgs),

    /// Inspect configuration
    Config(ConfigArgs),
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Seconds between polls (overrides the profile)
    #[arg(long, short = 'n', env = "WANWATCH_REFRESH_INTERVAL")]
    pub interval: Option<u64>,

    /// Stop after this many successful polls
    #[arg(long, short = 'c', value_parser = clap::value_parser!(u64).range(1..))]
    pub count: Option<u64>,
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Show the resolved profile with secrets redacted
    Show,
}

use super::app_config::LogLevel;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "autowaifu",
    version,
    about = "Posts prefetched images to registered Discord channels on a schedule",
    long_about = None
)]
pub struct CliArgs {
    /// Bot token. Falls back to `DISCORD_BOT_TOKEN`.
    #[arg(long, env = "DISCORD_BOT_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Configuration file path.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH")]
    pub log_path: Option<PathBuf>,

    /// Log to stderr instead of a file.
    #[arg(long)]
    pub log_to_stderr: bool,

    /// Log verbosity level.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Registry file path.
    #[arg(long, value_name = "PATH")]
    pub registry_path: Option<PathBuf>,

    /// Image API endpoint.
    #[arg(long, value_name = "URL")]
    pub api_base_url: Option<String>,

    /// Upstream requests per second.
    #[arg(long)]
    pub rate_limit: Option<f64>,

    /// Prefetch cache capacity.
    #[arg(long)]
    pub cache_size: Option<usize>,

    /// Seconds between broadcasts.
    #[arg(long, value_name = "SECS")]
    pub broadcast_interval: Option<u64>,

    /// Seconds between cache refills.
    #[arg(long, value_name = "SECS")]
    pub refill_interval: Option<u64>,

    /// Reject count that must be exceeded before an image is retracted.
    #[arg(long)]
    pub reject_threshold: Option<u32>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Run the scheduler until interrupted.
    Run,
    /// Register a channel to receive broadcasts for a server.
    Register {
        /// Server id.
        #[arg(long)]
        group: String,
        /// Channel id.
        #[arg(long)]
        target: String,
    },
    /// Stop broadcasting to a server.
    Unregister {
        /// Server id.
        #[arg(long)]
        group: String,
    },
    /// Show the registered channel for a server.
    Describe {
        /// Server id.
        #[arg(long)]
        group: String,
    },
}

impl CliArgs {
    /// Returns the requested command, defaulting to `run`.
    #[must_use]
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }
}

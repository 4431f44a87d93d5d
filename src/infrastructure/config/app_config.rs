//! Application configuration.

use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::SchedulerConfig;
use crate::application::services::{
    DEFAULT_CACHE_SIZE, DEFAULT_REJECT_THRESHOLD, DEFAULT_RETRACTION_NOTICE,
    DEFAULT_TRACKED_MESSAGES,
};
use crate::application::use_cases::DEFAULT_REFILL_BATCH;
use crate::infrastructure::discord::DISCORD_API_BASE;
use crate::infrastructure::upstream::{DEFAULT_IMAGE_API_URL, DEFAULT_RATE_LIMIT};

pub(crate) const APP_NAME: &str = "autowaifu";
pub(crate) const APP_QUALIFIER: &str = "com";
pub(crate) const APP_ORGANIZATION: &str = "linuxmobile";

/// Log level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Trace level.
    Trace,
    /// Debug level.
    Debug,
    /// Info level.
    #[default]
    Info,
    /// Warning level.
    Warn,
    /// Error level.
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Trace => write!(f, "trace"),
            Self::Debug => write!(f, "debug"),
            Self::Info => write!(f, "info"),
            Self::Warn => write!(f, "warn"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Application configuration loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Log file path.
    #[serde(default)]
    pub log_path: Option<PathBuf>,

    /// Log to stderr instead of a file.
    #[serde(default)]
    pub log_to_stderr: bool,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Registry file path.
    #[serde(default)]
    pub registry_path: Option<PathBuf>,

    /// Fetch and broadcast settings.
    #[serde(default)]
    pub scheduler: SchedulerSettings,

    /// Retraction settings.
    #[serde(default)]
    pub feedback: FeedbackSettings,

    /// Discord API settings.
    #[serde(default)]
    pub discord: DiscordSettings,
}

/// Fetch and broadcast settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Image API endpoint.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Upstream requests per second.
    #[serde(default = "default_rate_limit")]
    pub rate_limit: f64,

    /// Prefetch cache capacity.
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// Concurrent fetches per refill tick.
    #[serde(default = "default_refill_batch")]
    pub refill_batch: usize,

    /// Seconds between refill ticks.
    #[serde(default = "default_refill_interval_secs")]
    pub refill_interval_secs: u64,

    /// Seconds between broadcast ticks.
    #[serde(default = "default_broadcast_interval_secs")]
    pub broadcast_interval_secs: u64,

    /// Upstream request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            rate_limit: default_rate_limit(),
            cache_size: default_cache_size(),
            refill_batch: default_refill_batch(),
            refill_interval_secs: default_refill_interval_secs(),
            broadcast_interval_secs: default_broadcast_interval_secs(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl SchedulerSettings {
    /// Returns the tick periods.
    #[must_use]
    pub fn intervals(&self) -> SchedulerConfig {
        SchedulerConfig {
            broadcast_interval: Duration::from_secs(self.broadcast_interval_secs.max(1)),
            refill_interval: Duration::from_secs(self.refill_interval_secs.max(1)),
        }
    }

    /// Returns the upstream request timeout.
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// Retraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSettings {
    /// Reject count that must be exceeded to retract.
    #[serde(default = "default_reject_threshold")]
    pub reject_threshold: u32,

    /// Notice posted in place of a retracted image.
    #[serde(default = "default_retraction_notice")]
    pub retraction_notice: String,

    /// Retracted messages remembered to avoid repeat attempts.
    #[serde(default = "default_tracked_messages")]
    pub tracked_messages: usize,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            reject_threshold: default_reject_threshold(),
            retraction_notice: default_retraction_notice(),
            tracked_messages: default_tracked_messages(),
        }
    }
}

/// Discord API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordSettings {
    /// REST API base URL.
    #[serde(default = "default_discord_api_base")]
    pub api_base_url: String,
}

impl Default for DiscordSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_discord_api_base(),
        }
    }
}

fn default_api_base_url() -> String {
    DEFAULT_IMAGE_API_URL.to_string()
}

const fn default_rate_limit() -> f64 {
    DEFAULT_RATE_LIMIT
}

const fn default_cache_size() -> usize {
    DEFAULT_CACHE_SIZE
}

const fn default_refill_batch() -> usize {
    DEFAULT_REFILL_BATCH
}

const fn default_refill_interval_secs() -> u64 {
    60
}

const fn default_broadcast_interval_secs() -> u64 {
    30
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_reject_threshold() -> u32 {
    DEFAULT_REJECT_THRESHOLD
}

fn default_retraction_notice() -> String {
    DEFAULT_RETRACTION_NOTICE.to_string()
}

const fn default_tracked_messages() -> usize {
    DEFAULT_TRACKED_MESSAGES
}

fn default_discord_api_base() -> String {
    DISCORD_API_BASE.to_string()
}

use super::args::CliArgs;

impl AppConfig {
    /// Merges CLI arguments into the configuration.
    pub fn merge_with_args(&mut self, args: &CliArgs) {
        if let Some(log_path) = &args.log_path {
            self.log_path = Some(log_path.clone());
        }
        if args.log_to_stderr {
            self.log_to_stderr = true;
        }
        if let Some(log_level) = args.log_level {
            self.log_level = log_level;
        }
        if let Some(registry_path) = &args.registry_path {
            self.registry_path = Some(registry_path.clone());
        }
        if let Some(api_base_url) = &args.api_base_url {
            self.scheduler.api_base_url.clone_from(api_base_url);
        }
        if let Some(rate_limit) = args.rate_limit {
            self.scheduler.rate_limit = rate_limit;
        }
        if let Some(cache_size) = args.cache_size {
            self.scheduler.cache_size = cache_size;
        }
        if let Some(secs) = args.broadcast_interval {
            self.scheduler.broadcast_interval_secs = secs;
        }
        if let Some(secs) = args.refill_interval {
            self.scheduler.refill_interval_secs = secs;
        }
        if let Some(threshold) = args.reject_threshold {
            self.feedback.reject_threshold = threshold;
        }
    }

    /// Returns default config directory.
    #[must_use]
    pub fn default_config_dir() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Returns default log file path.
    #[must_use]
    pub fn default_log_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join("autowaifu.log"))
    }

    /// Returns effective log path, or `None` when logging to stderr.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        if self.log_to_stderr {
            return None;
        }
        self.log_path.clone().or_else(Self::default_log_path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_path: None,
            log_to_stderr: false,
            log_level: LogLevel::Info,
            registry_path: None,
            scheduler: SchedulerSettings::default(),
            feedback: FeedbackSettings::default(),
            discord: DiscordSettings::default(),
        }
    }
}

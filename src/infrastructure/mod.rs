//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// Discord REST client.
pub mod discord;
/// Registry persistence.
pub mod storage;
/// Image API client.
pub mod upstream;

pub use config::{AppConfig, CliArgs, Command, LogLevel, StorageManager};
pub use discord::{BotIdentity, DiscordRestClient};
pub use storage::JsonRegistryStore;
pub use upstream::{ImageApiClient, RateLimiter};

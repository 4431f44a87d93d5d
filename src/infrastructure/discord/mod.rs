//! Discord REST delivery adapter.

mod client;
mod dto;

pub use client::{BotIdentity, DISCORD_API_BASE, DiscordRestClient};

//! Autowaifu - a prefetching image broadcaster for Discord.
//!
//! This crate keeps a bounded cache of image URLs filled from a rate-limited
//! upstream API, posts one image per tick to every registered channel, and
//! retracts posts that collect too many rejections.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing services, use cases and the scheduler.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing adapters for external services.
pub mod infrastructure;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "autowaifu";

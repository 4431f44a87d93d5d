//! Upstream image API client.

mod client;
mod dto;
pub mod rate_limiter;

pub use client::{DEFAULT_IMAGE_API_URL, ImageApiClient};
pub use rate_limiter::{DEFAULT_RATE_LIMIT, RateLimiter};

//! Image API HTTP client.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use tracing::{debug, warn};

use super::dto::ImageResponse;
use super::rate_limiter::RateLimiter;
use crate::domain::entities::ImageItem;
use crate::domain::errors::FetchError;
use crate::domain::ports::ImageSourcePort;

/// Default image endpoint.
pub const DEFAULT_IMAGE_API_URL: &str = "https://api.waifu.pics/sfw/waifu";

const USER_AGENT: &str = concat!("autowaifu/", env!("CARGO_PKG_VERSION"));
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Rate-limited client for the image API.
///
/// The HTTP session is created on first use and dropped by `close`. A closed
/// client refuses further fetches.
pub struct ImageApiClient {
    base_url: String,
    timeout: Duration,
    limiter: RateLimiter,
    session: RwLock<Option<Client>>,
    closed: AtomicBool,
}

impl ImageApiClient {
    /// Creates a client for the default endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_IMAGE_API_URL)
    }

    /// Creates a client for a custom endpoint.
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            limiter: RateLimiter::default(),
            session: RwLock::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Sets the request rate, per second.
    #[must_use]
    pub fn with_rate_limit(mut self, rate: f64) -> Self {
        self.limiter = RateLimiter::per_second(rate);
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the configured endpoint.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn session(&self) -> Result<Client, FetchError> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(FetchError::Closed);
        }

        if let Some(client) = self.session.read().as_ref() {
            return Ok(client.clone());
        }

        let mut session = self.session.write();
        if let Some(client) = session.as_ref() {
            return Ok(client.clone());
        }

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(self.timeout)
            .build()
            .map_err(|e| FetchError::session(format!("failed to create HTTP client: {e}")))?;

        debug!(base_url = %self.base_url, "Opened image API session");
        *session = Some(client.clone());
        Ok(client)
    }
}

fn map_transport_error(e: &reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout
    } else if e.is_connect() {
        FetchError::network(format!("failed to connect: {e}"))
    } else {
        FetchError::network(e.to_string())
    }
}

#[async_trait]
impl ImageSourcePort for ImageApiClient {
    async fn open(&self) -> Result<(), FetchError> {
        self.session().map(|_| ())
    }

    async fn fetch_one(&self) -> Result<Option<ImageItem>, FetchError> {
        let client = self.session()?;
        self.limiter.reserve().await;

        let response = client.get(&self.base_url).send().await.map_err(|e| {
            warn!(error = %e, "Failed to reach image API");
            map_transport_error(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            debug!(%status, "Image API returned no item");
            return Ok(None);
        }

        let body = response.bytes().await.map_err(|e| map_transport_error(&e))?;

        match serde_json::from_slice::<ImageResponse>(&body) {
            Ok(image) if !image.url.trim().is_empty() => Ok(Some(ImageItem::new(image.url))),
            Ok(_) => Ok(None),
            Err(e) => {
                debug!(error = %e, "Malformed image API response");
                Ok(None)
            }
        }
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        if self.session.write().take().is_some() {
            debug!("Closed image API session");
        }
    }
}

impl Default for ImageApiClient {
    fn default() -> Self {
        Self::new()
    }
}

//! Upstream image source port definition.

use async_trait::async_trait;

use crate::domain::entities::ImageItem;
use crate::domain::errors::FetchError;

/// Port for fetching single images from the upstream API.
#[async_trait]
pub trait ImageSourcePort: Send + Sync {
    /// Opens the shared HTTP session if it is not already open.
    async fn open(&self) -> Result<(), FetchError>;

    /// Fetches one image.
    ///
    /// `Ok(None)` means the API answered but had nothing usable.
    async fn fetch_one(&self) -> Result<Option<ImageItem>, FetchError>;

    /// Tears down the shared HTTP session.
    async fn close(&self);
}

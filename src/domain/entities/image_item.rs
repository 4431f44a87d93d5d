//! Fetched image value object.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One fetched image reference ready for delivery.
///
/// Immutable once produced. Each item is handed to delivery at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageItem {
    url: String,
}

impl ImageItem {
    /// Wraps an image URL.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// Returns the image URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Consumes the item and returns the URL.
    #[must_use]
    pub fn into_url(self) -> String {
        self.url
    }
}

impl fmt::Display for ImageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_as_plain_string() {
        let item = ImageItem::new("https://i.waifu.pics/abc.png");
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(json, "\"https://i.waifu.pics/abc.png\"");
    }
}

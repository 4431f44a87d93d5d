//! Delivered message references and outgoing payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::image_item::ImageItem;
use super::target::TargetId;

/// Discord "blurple" accent colour used for image embeds.
pub const EMBED_COLOR: u32 = 0x0058_65F2;

/// Identifies one message this service delivered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageRef {
    /// Channel the message lives in.
    pub target: TargetId,
    /// Platform message identifier.
    pub message_id: String,
}

impl MessageRef {
    /// Creates a message reference.
    #[must_use]
    pub fn new(target: TargetId, message_id: impl Into<String>) -> Self {
        Self {
            target,
            message_id: message_id.into(),
        }
    }
}

impl std::fmt::Display for MessageRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.target, self.message_id)
    }
}

/// Content handed to every target in one broadcast tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryPayload {
    image_url: String,
    color: u32,
    timestamp: Option<DateTime<Utc>>,
}

impl DeliveryPayload {
    /// Builds an image embed for the given item.
    #[must_use]
    pub fn from_item(item: &ImageItem) -> Self {
        Self {
            image_url: item.url().to_string(),
            color: EMBED_COLOR,
            timestamp: None,
        }
    }

    /// Stamps the embed with a time.
    #[must_use]
    pub const fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    /// Returns the image URL.
    #[must_use]
    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    /// Returns the embed colour.
    #[must_use]
    pub const fn color(&self) -> u32 {
        self.color
    }

    /// Returns the embed timestamp, if any.
    #[must_use]
    pub const fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }
}

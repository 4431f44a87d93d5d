use serde::{Deserialize, Serialize};

/// Discord API user response structure.
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    /// Discord user ID.
    pub id: String,
    /// Discord username.
    pub username: String,
    /// Whether the user is a bot.
    #[serde(default)]
    pub bot: bool,
}

/// Discord API error response structure.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    /// Error message from Discord.
    pub message: String,
    /// Seconds to wait when rate limited.
    #[serde(default)]
    pub retry_after: Option<f64>,
}

/// Discord API channel response structure.
#[derive(Debug, Deserialize)]
pub struct ChannelResponse {
    /// Channel ID.
    pub id: String,
    /// Owning guild, absent for DMs.
    #[serde(default)]
    pub guild_id: Option<String>,
}

/// Discord API message response structure.
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    /// Message ID.
    pub id: String,
}

/// Create message request body.
#[derive(Debug, Serialize)]
pub struct CreateMessageRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<EmbedPayload<'a>>,
}

/// Embed with a single image.
#[derive(Debug, Serialize)]
pub struct EmbedPayload<'a> {
    pub color: u32,
    pub image: EmbedImagePayload<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmbedImagePayload<'a> {
    pub url: &'a str,
}

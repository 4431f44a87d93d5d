//! Discord REST API client used for delivery.

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, Url, header};
use serde::Serialize;
use tracing::{debug, warn};

use super::dto::{
    ChannelResponse, CreateMessageRequest, EmbedImagePayload, EmbedPayload, ErrorResponse,
    MessageResponse, UserResponse,
};
use crate::domain::entities::{
    BotToken, DeliveryPayload, FeedbackKind, GroupId, MessageRef, TargetId,
};
use crate::domain::errors::DeliveryError;
use crate::domain::ports::DeliveryPort;

/// Discord REST API base URL.
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";
const USER_AGENT: &str = concat!(
    "DiscordBot (",
    env!("CARGO_PKG_NAME"),
    ", ",
    env!("CARGO_PKG_VERSION"),
    ")"
);
const DEFAULT_RETRY_AFTER_MS: u64 = 5000;

/// Identity of the authenticated bot user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentity {
    /// Bot user ID.
    pub id: String,
    /// Bot username.
    pub username: String,
}

/// Discord REST client authenticated with a bot token.
pub struct DiscordRestClient {
    client: Client,
    base_url: String,
    token: BotToken,
}

impl DiscordRestClient {
    /// Creates new client with default base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(token: BotToken) -> Result<Self, DeliveryError> {
        Self::with_base_url(token, DISCORD_API_BASE)
    }

    /// Creates client with custom base URL.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn with_base_url(
        token: BotToken,
        base_url: impl Into<String>,
    ) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                DeliveryError::unexpected(format!("failed to create HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            token,
        })
    }

    /// Validates the bot token and returns the bot identity.
    ///
    /// # Errors
    /// Returns error if the token is rejected or Discord is unreachable.
    pub async fn validate_token(&self) -> Result<BotIdentity, DeliveryError> {
        debug!("Validating bot token against Discord API");

        let url = self.endpoint(&["users", "@me"])?;
        let user: UserResponse = self
            .request(Method::GET, url, None::<&()>)
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError::unexpected(format!("failed to parse response: {e}")))?;

        if !user.bot {
            warn!(user_id = %user.id, "Token does not belong to a bot account");
        }

        debug!(user_id = %user.id, username = %user.username, "Bot token validated");

        Ok(BotIdentity {
            id: user.id,
            username: user.username,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, DeliveryError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| DeliveryError::unexpected(format!("invalid base URL: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| DeliveryError::unexpected("base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn request<B: Serialize + Sync>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
    ) -> Result<reqwest::Response, DeliveryError> {
        let mut request = self
            .client
            .request(method, url)
            .header(header::AUTHORIZATION, self.token.authorization());
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                DeliveryError::transport("request timed out")
            } else if e.is_connect() {
                DeliveryError::transport("failed to connect to Discord")
            } else {
                DeliveryError::transport(e.to_string())
            }
        })?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(Self::handle_error_response(status, response).await)
        }
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> DeliveryError {
        let error = response.json::<ErrorResponse>().await.ok();
        let error_message = error
            .as_ref()
            .map_or_else(|| format!("HTTP {status}"), |e| e.message.clone());

        match status {
            StatusCode::FORBIDDEN => DeliveryError::forbidden(error_message),
            StatusCode::NOT_FOUND => DeliveryError::NotFound,
            StatusCode::TOO_MANY_REQUESTS => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let retry_after_ms = error
                    .and_then(|e| e.retry_after)
                    .map_or(DEFAULT_RETRY_AFTER_MS, |secs| (secs * 1000.0) as u64);
                DeliveryError::RateLimited { retry_after_ms }
            }
            StatusCode::UNAUTHORIZED => DeliveryError::unexpected("invalid bot token"),
            s if s.is_server_error() => {
                DeliveryError::transport(format!("Discord API unavailable: {status}"))
            }
            _ => DeliveryError::unexpected(format!(
                "unexpected response: {status} - {error_message}"
            )),
        }
    }

    async fn create_message(
        &self,
        target: &TargetId,
        body: &CreateMessageRequest<'_>,
    ) -> Result<MessageRef, DeliveryError> {
        let url = self.endpoint(&["channels", target.as_str(), "messages"])?;
        let message: MessageResponse = self
            .request(Method::POST, url, Some(body))
            .await?
            .json()
            .await
            .map_err(|e| DeliveryError::unexpected(format!("failed to parse message: {e}")))?;

        Ok(MessageRef::new(target.clone(), message.id))
    }
}

#[async_trait]
impl DeliveryPort for DiscordRestClient {
    async fn target_exists(
        &self,
        group: &GroupId,
        target: &TargetId,
    ) -> Result<bool, DeliveryError> {
        if target.snowflake().is_none() {
            return Ok(false);
        }

        let url = self.endpoint(&["channels", target.as_str()])?;
        match self.request(Method::GET, url, None::<&()>).await {
            Ok(response) => {
                let channel: ChannelResponse = response.json().await.map_err(|e| {
                    DeliveryError::unexpected(format!("failed to parse channel: {e}"))
                })?;
                let in_group = channel.guild_id.as_deref() == Some(group.as_str());
                debug!(channel_id = %channel.id, in_group, "Resolved channel");
                Ok(in_group)
            }
            Err(DeliveryError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }

    async fn send(
        &self,
        target: &TargetId,
        payload: &DeliveryPayload,
    ) -> Result<MessageRef, DeliveryError> {
        let body = CreateMessageRequest {
            content: None,
            embeds: vec![EmbedPayload {
                color: payload.color(),
                image: EmbedImagePayload {
                    url: payload.image_url(),
                },
                timestamp: payload.timestamp().map(|t| t.to_rfc3339()),
            }],
        };

        self.create_message(target, &body).await
    }

    async fn add_feedback_affordance(
        &self,
        message: &MessageRef,
        kind: FeedbackKind,
    ) -> Result<(), DeliveryError> {
        let url = self.endpoint(&[
            "channels",
            message.target.as_str(),
            "messages",
            &message.message_id,
            "reactions",
            kind.emoji(),
            "@me",
        ])?;
        self.request(Method::PUT, url, None::<&()>).await?;
        Ok(())
    }

    async fn delete_message(&self, message: &MessageRef) -> Result<(), DeliveryError> {
        let url = self.endpoint(&[
            "channels",
            message.target.as_str(),
            "messages",
            &message.message_id,
        ])?;
        self.request(Method::DELETE, url, None::<&()>).await?;
        Ok(())
    }

    async fn send_notice(
        &self,
        target: &TargetId,
        content: &str,
    ) -> Result<MessageRef, DeliveryError> {
        let body = CreateMessageRequest {
            content: Some(content),
            embeds: Vec::new(),
        };

        self.create_message(target, &body).await
    }
}

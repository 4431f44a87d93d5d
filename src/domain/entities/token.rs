//! Discord bot token value object.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// Bot token with format validation, masking and zeroize-on-drop.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct BotToken {
    value: String,
}

impl BotToken {
    const MIN_TOKEN_LENGTH: usize = 50;

    /// Creates a token after checking its shape.
    ///
    /// Accepts an optional `Bot ` prefix.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let raw = value.into();
        let value = raw.trim().trim_start_matches("Bot ").to_string();

        if value.len() < Self::MIN_TOKEN_LENGTH || value.split('.').count() != 3 {
            return None;
        }

        Some(Self { value })
    }

    /// Returns the `Authorization` header value.
    #[must_use]
    pub fn authorization(&self) -> String {
        format!("Bot {}", self.value)
    }

    /// Returns masked token for display.
    #[must_use]
    pub fn masked(&self) -> String {
        if self.value.len() <= 10 {
            return "*".repeat(self.value.len());
        }

        let prefix = &self.value[..4];
        let suffix = &self.value[self.value.len() - 4..];
        format!("{prefix}...{suffix}")
    }
}

impl fmt::Debug for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotToken")
            .field("value", &self.masked())
            .finish()
    }
}

impl fmt::Display for BotToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.masked())
    }
}

//! Approve/reject feedback signals on delivered messages.

use super::delivery::MessageRef;

const APPROVE_EMOJI: &str = "\u{1F44D}";
const REJECT_EMOJI: &str = "\u{1F44E}";

/// Feedback affordance attached to every delivered image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeedbackKind {
    /// Thumbs up.
    Approve,
    /// Thumbs down.
    Reject,
}

impl FeedbackKind {
    /// Both affordances, in the order they are attached.
    pub const ALL: [Self; 2] = [Self::Approve, Self::Reject];

    /// Returns the reaction emoji for this kind.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Approve => APPROVE_EMOJI,
            Self::Reject => REJECT_EMOJI,
        }
    }

    /// Maps a reaction emoji back to a feedback kind.
    #[must_use]
    pub fn from_emoji(emoji: &str) -> Option<Self> {
        match emoji {
            APPROVE_EMOJI => Some(Self::Approve),
            REJECT_EMOJI => Some(Self::Reject),
            _ => None,
        }
    }
}

impl std::fmt::Display for FeedbackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Approve => write!(f, "approve"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// A reaction observed on some message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackEvent {
    /// Message the reaction was added to.
    pub message: MessageRef,
    /// Raw reaction emoji.
    pub emoji: String,
    /// Platform's current count for this emoji on the message.
    pub count: u32,
    /// Whether the reacting user is a bot.
    pub reactor_is_bot: bool,
    /// Whether the message was authored by this service.
    pub authored_by_self: bool,
}

impl FeedbackEvent {
    /// Creates a user reaction event on one of our own messages.
    #[must_use]
    pub fn new(message: MessageRef, kind: FeedbackKind, count: u32) -> Self {
        Self {
            message,
            emoji: kind.emoji().to_string(),
            count,
            reactor_is_bot: false,
            authored_by_self: true,
        }
    }

    /// Marks the reacting user as a bot.
    #[must_use]
    pub const fn from_bot(mut self) -> Self {
        self.reactor_is_bot = true;
        self
    }

    /// Marks the message as authored by someone else.
    #[must_use]
    pub const fn on_foreign_message(mut self) -> Self {
        self.authored_by_self = false;
        self
    }

    /// Returns the feedback kind, or `None` for unrelated emoji.
    #[must_use]
    pub fn kind(&self) -> Option<FeedbackKind> {
        FeedbackKind::from_emoji(&self.emoji)
    }
}

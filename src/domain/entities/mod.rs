//! Domain entity definitions.

mod delivery;
mod feedback;
mod image_item;
mod target;
mod token;

pub use delivery::{DeliveryPayload, EMBED_COLOR, MessageRef};
pub use feedback::{FeedbackEvent, FeedbackKind};
pub use image_item::ImageItem;
pub use target::{GroupId, TargetId};
pub use token::BotToken;

//! Domain layer with core entities, errors and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Port definitions.
pub mod ports;

pub use entities::{
    BotToken, DeliveryPayload, FeedbackEvent, FeedbackKind, GroupId, ImageItem, MessageRef,
    TargetId,
};
pub use errors::{DeliveryError, FetchError, RegistryError, StoreError};
pub use ports::{DeliveryPort, ImageSourcePort, RegistryStorePort};

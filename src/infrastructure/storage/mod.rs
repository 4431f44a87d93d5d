//! Registry persistence adapters.

mod json_registry_store;

pub use json_registry_store::{JsonRegistryStore, REGISTRY_FILE_NAME};

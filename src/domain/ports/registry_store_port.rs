//! Target registry persistence port definition.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::domain::entities::{GroupId, TargetId};
use crate::domain::errors::StoreError;

/// Persisted group to target mapping.
pub type RegistryEntries = BTreeMap<GroupId, TargetId>;

/// Port for loading and saving the target registry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegistryStorePort: Send + Sync {
    /// Loads the persisted mapping.
    async fn load(&self) -> Result<RegistryEntries, StoreError>;

    /// Replaces the persisted mapping.
    async fn save(&self, entries: &RegistryEntries) -> Result<(), StoreError>;
}

//! Group to delivery target mapping.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::application::dto::RegistrationStatus;
use crate::domain::entities::{GroupId, TargetId};
use crate::domain::errors::RegistryError;
use crate::domain::ports::{DeliveryPort, RegistryEntries, RegistryStorePort};

/// In-memory registry of one delivery target per group.
///
/// Mutations are persisted through the store after every change. Readers take
/// a snapshot, so a broadcast tick never holds the lock across a network call.
///
/// The store may be shared with other processes. [`TargetRegistry::refresh`]
/// picks up their changes, and an unsaved local change is never replaced by a
/// reload.
pub struct TargetRegistry {
    entries: RwLock<RegistryEntries>,
    store: Arc<dyn RegistryStorePort>,
    platform: Arc<dyn DeliveryPort>,
    dirty: AtomicBool,
}

impl TargetRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(store: Arc<dyn RegistryStorePort>, platform: Arc<dyn DeliveryPort>) -> Self {
        Self {
            entries: RwLock::new(RegistryEntries::new()),
            store,
            platform,
            dirty: AtomicBool::new(false),
        }
    }

    /// Replaces the in-memory mapping with the persisted one.
    ///
    /// A missing or unreadable store yields an empty registry. Returns the
    /// number of entries loaded.
    pub async fn load(&self) -> usize {
        let loaded = match self.store.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to load target registry, starting empty");
                RegistryEntries::new()
            }
        };

        let count = loaded.len();
        *self.entries.write() = loaded;
        self.dirty.store(false, Ordering::SeqCst);
        info!(targets = count, "Target registry loaded");
        count
    }

    /// Reloads the mapping from the store.
    ///
    /// Keeps the in-memory mapping when the store cannot be read or when a
    /// local change has not been saved yet. Returns true if the mapping was
    /// replaced.
    pub async fn refresh(&self) -> bool {
        if self.dirty.load(Ordering::SeqCst) {
            debug!("Target registry has unsaved changes, not reloading");
            return false;
        }

        let loaded = match self.store.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "Failed to reload target registry, keeping current targets");
                return false;
            }
        };

        let mut entries = self.entries.write();
        if self.dirty.load(Ordering::SeqCst) {
            return false;
        }
        if *entries != loaded {
            debug!(
                before = entries.len(),
                after = loaded.len(),
                "Target registry changed on disk"
            );
            *entries = loaded;
        }
        true
    }

    /// Registers `target` for `group`.
    ///
    /// # Errors
    /// Returns `AlreadyRegistered` if the group has a target, or
    /// `InvalidTarget` if the target does not resolve on the platform.
    pub async fn register(&self, group: GroupId, target: TargetId) -> Result<(), RegistryError> {
        if self.entries.read().contains_key(&group) {
            return Err(RegistryError::AlreadyRegistered { group });
        }

        if !self.resolves(&group, &target).await {
            debug!(group = %group, target = %target, "Rejected unresolvable target");
            return Err(RegistryError::InvalidTarget { target });
        }

        {
            let mut entries = self.entries.write();
            if entries.contains_key(&group) {
                return Err(RegistryError::AlreadyRegistered { group });
            }
            entries.insert(group.clone(), target.clone());
            self.dirty.store(true, Ordering::SeqCst);
        }

        info!(group = %group, target = %target, "Registered delivery target");
        self.persist().await;
        Ok(())
    }

    /// Removes the target of `group` and returns it.
    ///
    /// # Errors
    /// Returns `NotRegistered` if the group has no target.
    pub async fn unregister(&self, group: &GroupId) -> Result<TargetId, RegistryError> {
        let removed = {
            let mut entries = self.entries.write();
            let removed = entries.remove(group);
            if removed.is_some() {
                self.dirty.store(true, Ordering::SeqCst);
            }
            removed
        };
        let Some(target) = removed else {
            return Err(RegistryError::NotRegistered {
                group: group.clone(),
            });
        };

        info!(group = %group, target = %target, "Unregistered delivery target");
        self.persist().await;
        Ok(target)
    }

    /// Reports the target of `group` and whether it still resolves.
    pub async fn describe(&self, group: &GroupId) -> RegistrationStatus {
        let current = self.entries.read().get(group).cloned();
        match current {
            None => RegistrationStatus::NotRegistered,
            Some(target) if self.resolves(group, &target).await => {
                RegistrationStatus::Active(target)
            }
            Some(target) => RegistrationStatus::Dangling(target),
        }
    }

    /// Returns the target of `group` without touching the platform.
    #[must_use]
    pub fn get(&self, group: &GroupId) -> Option<TargetId> {
        self.entries.read().get(group).cloned()
    }

    /// Returns a copy of every entry.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(GroupId, TargetId)> {
        self.entries
            .read()
            .iter()
            .map(|(g, t)| (g.clone(), t.clone()))
            .collect()
    }

    /// Returns the number of registered groups.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Returns true if no group is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Writes the current mapping to the store.
    ///
    /// Reloads first, so changes saved by another process since the last
    /// tick are written back rather than overwritten.
    pub async fn flush(&self) {
        self.refresh().await;
        self.persist().await;
    }

    async fn resolves(&self, group: &GroupId, target: &TargetId) -> bool {
        if target.snowflake().is_none() {
            return false;
        }

        match self.platform.target_exists(group, target).await {
            Ok(exists) => exists,
            Err(e) => {
                warn!(target = %target, error = %e, "Could not resolve target");
                false
            }
        }
    }

    async fn persist(&self) {
        let entries = self.entries.read().clone();
        match self.store.save(&entries).await {
            Ok(()) => {
                if *self.entries.read() == entries {
                    self.dirty.store(false, Ordering::SeqCst);
                }
            }
            Err(e) => {
                self.dirty.store(true, Ordering::SeqCst);
                error!(error = %e, targets = entries.len(), "Failed to persist target registry");
            }
        }
    }
}

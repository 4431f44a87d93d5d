//! Flat JSON file holding the group to target mapping.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use directories::ProjectDirs;
use tokio::fs;
use tracing::{debug, warn};

use crate::domain::errors::StoreError;
use crate::domain::ports::{RegistryEntries, RegistryStorePort};
use crate::infrastructure::config::app_config::{APP_NAME, APP_ORGANIZATION, APP_QUALIFIER};

/// Registry file name inside the data directory.
pub const REGISTRY_FILE_NAME: &str = "waifu.json";

/// Registry persisted as a `{"group": "target"}` JSON document.
#[derive(Debug, Clone)]
pub struct JsonRegistryStore {
    path: PathBuf,
}

impl JsonRegistryStore {
    /// Creates a store backed by `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the default registry path in the platform data directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from(APP_QUALIFIER, APP_ORGANIZATION, APP_NAME)
            .map(|dirs| dirs.data_dir().join(REGISTRY_FILE_NAME))
    }

    /// Returns the backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StoreError> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(parent)?;

        let mut temp_file = tempfile::NamedTempFile::new_in(parent)?;
        temp_file.write_all(content)?;
        temp_file.persist(path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[async_trait]
impl RegistryStorePort for JsonRegistryStore {
    async fn load(&self) -> Result<RegistryEntries, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No registry file yet");
                return Ok(RegistryEntries::new());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|e| {
            warn!(path = %self.path.display(), error = %e, "Registry file is malformed");
            StoreError::from(e)
        })
    }

    async fn save(&self, entries: &RegistryEntries) -> Result<(), StoreError> {
        let content = serde_json::to_vec(entries)?;
        let path = self.path.clone();

        tokio::task::spawn_blocking(move || Self::write_atomic(&path, &content))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e)))??;

        debug!(path = %self.path.display(), targets = entries.len(), "Registry saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::application::services::TargetRegistry;
    use crate::domain::entities::{GroupId, TargetId};
    use crate::domain::ports::mocks::{MockDelivery, TargetBehavior};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let store = JsonRegistryStore::new(dir.path().join(REGISTRY_FILE_NAME));

        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = JsonRegistryStore::new(dir.path().join("nested").join(REGISTRY_FILE_NAME));

        let mut entries = RegistryEntries::new();
        entries.insert(GroupId::from("111"), TargetId::from("222"));
        store.save(&entries).await.unwrap();

        assert_eq!(store.load().await.unwrap(), entries);
    }

    #[tokio::test]
    async fn test_reads_flat_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        std::fs::write(&path, r#"{"1000": "2000", "3000": "4000"}"#).unwrap();

        let entries = JsonRegistryStore::new(path).load().await.unwrap();

        assert_eq!(entries.get(&GroupId::from("3000")), Some(&TargetId::from("4000")));
    }

    #[tokio::test]
    async fn test_malformed_file_is_error_at_store_level() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        std::fs::write(&path, "{not json").unwrap();

        let result = JsonRegistryStore::new(path).load().await;

        assert!(matches!(result, Err(StoreError::Json(_))));
    }

    #[tokio::test]
    async fn test_registry_recovers_from_corrupted_or_missing_store() {
        let dir = tempdir().unwrap();
        let corrupted = dir.path().join("corrupted.json");
        std::fs::write(&corrupted, "[1, 2").unwrap();

        for path in [corrupted, dir.path().join("missing.json")] {
            let registry = TargetRegistry::new(
                Arc::new(JsonRegistryStore::new(path)),
                Arc::new(MockDelivery::new()),
            );

            assert_eq!(registry.load().await, 0);
            assert!(registry.is_empty());
        }
    }

    #[tokio::test]
    async fn test_shared_file_is_not_clobbered_by_stale_registry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(REGISTRY_FILE_NAME);
        let platform = Arc::new(MockDelivery::new().with_target(100_u64, TargetBehavior::Accept));
        let running = TargetRegistry::new(Arc::new(JsonRegistryStore::new(&path)), platform.clone());
        let cli = TargetRegistry::new(Arc::new(JsonRegistryStore::new(&path)), platform);
        assert_eq!(running.load().await, 0);

        cli.load().await;
        cli.register(GroupId::from("1"), TargetId::from(100_u64))
            .await
            .unwrap();
        running.refresh().await;
        assert_eq!(running.get(&GroupId::from("1")), Some(TargetId::from(100_u64)));

        cli.unregister(&GroupId::from("1")).await.unwrap();
        cli.register(GroupId::from("2"), TargetId::from(100_u64))
            .await
            .unwrap();
        running.flush().await;

        let on_disk = JsonRegistryStore::new(&path).load().await.unwrap();
        assert_eq!(on_disk.len(), 1);
        assert_eq!(on_disk.get(&GroupId::from("2")), Some(&TargetId::from(100_u64)));
    }
}

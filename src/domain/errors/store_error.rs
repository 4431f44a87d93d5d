//! Registry persistence errors.

use thiserror::Error;

/// Errors reading or writing the persisted target registry.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum StoreError {
    #[error("failed to determine data directory")]
    DirectoryNotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

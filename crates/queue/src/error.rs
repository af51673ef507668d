use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("stored value under {key} is not valid UTF-8")]
    Encoding { key: String },
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("a sync is already in progress")]
    SyncInProgress,

    #[error(transparent)]
    Store(#[from] StoreError),
}

use thiserror::Error;

/// Failures raised by a key-value storage backend or by decoding its values.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("invalid stored value: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Operation-scoped persistence failures surfaced to callers.
///
/// Write-path failures are wrapped with the operation and, where applicable,
/// the topic id so the caller can tell which save was lost. Read-path
/// failures never reach this type; they degrade to defaults inside
/// [`crate::persist::ProgressStore`].
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("failed to save progress for topic {topic_id}")]
    SaveProgress {
        topic_id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to mark topic {topic_id} as completed")]
    MarkCompleted {
        topic_id: String,
        #[source]
        source: StoreError,
    },

    #[error("failed to save category preferences")]
    SavePreferences(#[source] StoreError),

    #[error("failed to save app settings")]
    SaveSettings(#[source] StoreError),

    #[error("failed to clear stored data")]
    ClearStorage(#[source] StoreError),

    #[error("failed to record app version")]
    RecordVersion(#[source] StoreError),
}

pub type Result<T> = std::result::Result<T, CoreError>;

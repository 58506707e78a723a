//! Error taxonomy shared by the store, session, tips and backend layers.
//!
//! Validation and persistence failures are returned as values so callers
//! decide how to present them. Best-effort failures (last-seen writes,
//! history saves, speech) never reach this far: they are logged with
//! [`crate::db::LogOnError`] and dropped where they happen.

use crate::domain::RecordId;

/// Required fields missing on a card or tip.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("question is required")]
    MissingQuestion,
    #[error("answer is required")]
    MissingAnswer,
    #[error("at least one tag is required")]
    MissingTags,
    #[error("title is required")]
    MissingTitle,
    #[error("content is required")]
    MissingContent,
}

/// Failure reported by a [`crate::backend::Backend`].
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The connection mutex was poisoned by a panicking thread.
    #[error("database unavailable")]
    Unavailable,

    #[error("record {0} does not exist")]
    Missing(RecordId),
}

/// Initial fetch failed; nothing may be selected from the missing set.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to load cards: {0}")]
    Cards(#[source] BackendError),
    #[error("failed to load tips: {0}")]
    Tips(#[source] BackendError),
}

/// Result of a rejected create/update/delete. In-memory state is untouched.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no record with id {0}")]
    NotFound(RecordId),

    #[error("persistence failed: {0}")]
    Persistence(BackendError),
}

impl From<BackendError> for StoreError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Missing(id) => StoreError::NotFound(id),
            other => StoreError::Persistence(other),
        }
    }
}

/// Durable key/value storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
    #[error("storage unavailable")]
    Unavailable,
}

/// Seed file import failures.
#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("failed to read seed file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse seed file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to import seed data: {0}")]
    Database(#[from] rusqlite::Error),
}

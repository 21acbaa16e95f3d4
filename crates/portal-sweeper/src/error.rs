use portal_core::StorageError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SweepError {
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}

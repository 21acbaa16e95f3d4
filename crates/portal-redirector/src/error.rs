use portal_core::StorageError;
use thiserror::Error;

/// Failures while resolving a code.
///
/// Unknown and expired codes are not errors; they are
/// [`Resolution`](crate::Resolution) outcomes.
#[derive(Debug, Clone, Error)]
pub enum RedirectorError {
    #[error("storage operation failed: {0}")]
    Storage(
        #[from]
        #[source]
        StorageError,
    ),
}

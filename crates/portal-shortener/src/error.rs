use portal_core::{CoreError, StorageError};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ShortenerError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("invalid expiration: {0}")]
    InvalidExpiration(String),
    #[error("invalid short code: {0}")]
    InvalidShortCode(String),
    #[error("alias already exists: {0}")]
    AliasConflict(String),
    /// Every attempt collided with an existing code. The code length should
    /// be widened.
    #[error("could not allocate a free short code after {attempts} attempts")]
    AllocationExhausted { attempts: usize },
    #[error("storage error: {0}")]
    Storage(#[source] StorageError),
}

impl From<CoreError> for ShortenerError {
    fn from(value: CoreError) -> Self {
        match value {
            CoreError::InvalidShortCode(message) => Self::InvalidShortCode(message),
        }
    }
}

impl From<StorageError> for ShortenerError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::AlreadyExists(code) => Self::AliasConflict(code),
            other => Self::Storage(other),
        }
    }
}

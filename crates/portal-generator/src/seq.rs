use crate::error::GeneratorError;
use crate::{encode_base62, Generator};
use portal_core::ShortCode;
use std::sync::atomic::{AtomicU64, Ordering};

const MAX_PREFIX_LENGTH: usize = 16;
const COUNTER_WIDTH: usize = 6;

/// A short code generator using a sequential counter.
///
/// This generator produces codes like "wh000000", "wh000001", ..., with the
/// counter rendered in base62. It never repeats itself within a single
/// instance, so allocation against an otherwise empty store never retries.
///
/// For multi-node deployments each node should use a unique prefix
/// (e.g., "a-", "b-") so their sequences cannot overlap.
#[derive(Debug)]
pub struct SeqGenerator {
    counter: AtomicU64,
    prefix: String,
}

impl Clone for SeqGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
            prefix: self.prefix.clone(),
        }
    }
}

impl SeqGenerator {
    /// Creates a new sequential generator with a custom prefix.
    pub fn with_prefix(prefix: impl Into<String>) -> Result<Self, GeneratorError> {
        Self::with_offset(prefix, 0)
    }

    /// Creates a new sequential generator starting from a specific counter value.
    ///
    /// Useful for resuming from a known state.
    pub fn with_offset(prefix: impl Into<String>, offset: u64) -> Result<Self, GeneratorError> {
        let prefix = prefix.into();
        let valid = prefix.len() <= MAX_PREFIX_LENGTH
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(GeneratorError::InvalidPrefix(prefix));
        }

        Ok(Self {
            counter: AtomicU64::new(offset),
            prefix,
        })
    }
}

impl Generator for SeqGenerator {
    fn generate(&self) -> ShortCode {
        let count = self.counter.fetch_add(1, Ordering::SeqCst);
        ShortCode::new_unchecked(format!(
            "{}{}",
            self.prefix,
            encode_base62(count, COUNTER_WIDTH)
        ))
    }
}

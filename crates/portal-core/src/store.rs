use crate::error::StorageError;
use crate::mapping::Mapping;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Position inside an expiration scan.
///
/// Scans walk codes in `(expire_at, code)` order; the cursor is the last
/// position returned, and the next page starts strictly after it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct ScanCursor {
    pub expire_at: Timestamp,
    pub code: ShortCode,
}

/// One page of an expiration scan.
#[derive(Debug, Clone, Default)]
pub struct ExpiredBatch {
    /// Codes whose stored expiration is at or before the scan bound.
    pub codes: Vec<ShortCode>,
    /// Where to resume. `None` once the scan is exhausted.
    pub next: Option<ScanCursor>,
}

/// Key-value store of short code to [`Mapping`].
///
/// The store owns every mutation. Operations on the same code are
/// linearizable; operations on different codes proceed independently.
#[async_trait]
pub trait MappingStore: Send + Sync + 'static {
    /// Inserts a new mapping.
    ///
    /// Returns `Err(StorageError::AlreadyExists)` if the code is present, even
    /// when the present mapping has already expired: an expired code stays
    /// taken until it is swept.
    async fn put(&self, mapping: Mapping) -> Result<()>;

    /// Retrieves the mapping for a code regardless of its expiration state.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<Mapping>>;

    /// Removes a mapping unconditionally.
    /// Returns `true` if the mapping existed and was removed.
    async fn delete(&self, code: &ShortCode) -> Result<bool>;

    /// Lists codes with `expire_at <= before`, at most `limit` per page.
    ///
    /// Pass `None` to start a scan and the returned `next` cursor to continue
    /// it. A scan can be restarted from `None` at any time.
    async fn list_expired_before(
        &self,
        before: Timestamp,
        after: Option<&ScanCursor>,
        limit: usize,
    ) -> Result<ExpiredBatch>;

    /// Removes a mapping only if it is still present and expired at `now`.
    /// Returns `true` if a mapping was removed.
    async fn purge_expired(&self, code: &ShortCode, now: Timestamp) -> Result<bool>;

    /// Number of stored mappings, live or expired.
    async fn count(&self) -> Result<usize>;
}

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use jiff::Timestamp;
use parking_lot::Mutex;
use portal_core::store::Result;
use portal_core::{ExpiredBatch, Mapping, MappingStore, ScanCursor, ShortCode, StorageError};
use std::collections::BTreeSet;
use std::ops::Bound;
use tracing::trace;

/// In-memory implementation of [`MappingStore`] using DashMap.
///
/// DashMap provides better concurrency than `RwLock<HashMap>` because it
/// uses sharded locks, allowing concurrent reads and writes to different
/// buckets without blocking. Every mutation of a code goes through the
/// entry API, so it runs under that code's shard lock.
///
/// Mappings with an expiration are also kept in an ordered index so sweeps
/// can find them without walking the whole map. The index is only touched
/// while the shard lock of the affected code is held (shard first, then
/// index), which keeps it in step with the map.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    mappings: DashMap<ShortCode, Mapping>,
    expirations: Mutex<BTreeSet<ScanCursor>>,
}

impl InMemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    fn index(&self, mapping: &Mapping) {
        if let Some(expire_at) = mapping.expire_at() {
            self.expirations.lock().insert(ScanCursor {
                expire_at,
                code: mapping.code().clone(),
            });
        }
    }

    fn unindex(&self, mapping: &Mapping) {
        if let Some(expire_at) = mapping.expire_at() {
            self.expirations.lock().remove(&ScanCursor {
                expire_at,
                code: mapping.code().clone(),
            });
        }
    }

    #[cfg(test)]
    fn indexed(&self) -> usize {
        self.expirations.lock().len()
    }
}

#[async_trait]
impl MappingStore for InMemoryStore {
    async fn put(&self, mapping: Mapping) -> Result<()> {
        match self.mappings.entry(mapping.code().clone()) {
            // Expired entries still hold their code until swept.
            Entry::Occupied(slot) => Err(StorageError::AlreadyExists(slot.key().to_string())),
            Entry::Vacant(slot) => {
                self.index(&mapping);
                slot.insert(mapping);
                Ok(())
            }
        }
    }

    async fn get(&self, code: &ShortCode) -> Result<Option<Mapping>> {
        Ok(self.mappings.get(code).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, code: &ShortCode) -> Result<bool> {
        match self.mappings.entry(code.clone()) {
            Entry::Occupied(slot) => {
                self.unindex(slot.get());
                slot.remove();
                Ok(true)
            }
            Entry::Vacant(_) => Ok(false),
        }
    }

    async fn list_expired_before(
        &self,
        before: Timestamp,
        after: Option<&ScanCursor>,
        limit: usize,
    ) -> Result<ExpiredBatch> {
        let limit = limit.max(1);
        let lower = match after {
            Some(cursor) => Bound::Excluded(cursor.clone()),
            None => Bound::Unbounded,
        };

        let index = self.expirations.lock();
        let mut due = index
            .range((lower, Bound::Unbounded))
            .take_while(|entry| entry.expire_at <= before)
            .peekable();

        let mut batch = ExpiredBatch::default();
        let mut last = None;
        while batch.codes.len() < limit {
            let Some(entry) = due.next() else {
                break;
            };
            batch.codes.push(entry.code.clone());
            last = Some(entry);
        }
        if due.peek().is_some() {
            batch.next = last.cloned();
        }

        trace!(
            before = %before,
            found = batch.codes.len(),
            more = batch.next.is_some(),
            "listed expired codes"
        );
        Ok(batch)
    }

    async fn purge_expired(&self, code: &ShortCode, now: Timestamp) -> Result<bool> {
        match self.mappings.entry(code.clone()) {
            Entry::Occupied(slot) if slot.get().is_expired_at(now) => {
                self.unindex(slot.get());
                slot.remove();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.mappings.len())
    }
}

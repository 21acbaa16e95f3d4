use std::sync::Arc;

use crate::redirector::{Redirector, Resolution};
use async_trait::async_trait;
use portal_core::{Clock, MappingState, MappingStore, ShortCode, SystemClock};
use tracing::{debug, trace};

/// Service for handling URL redirects.
///
/// Reads mappings from the store and applies the expiration policy. Whether
/// a mapping is expired depends only on the clock and the stored
/// timestamp, never on whether a sweep has run yet.
#[derive(Debug, Clone)]
pub struct RedirectorService<S, C = SystemClock> {
    store: Arc<S>,
    clock: C,
}

impl<S: MappingStore> RedirectorService<S> {
    /// Creates a new RedirectorService backed by the system clock.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: MappingStore, C: Clock> RedirectorService<S, C> {
    pub fn with_clock(store: Arc<S>, clock: C) -> Self {
        Self { store, clock }
    }

    /// Resolves a short code to its original URL.
    ///
    /// # Returns
    ///
    /// * `Ok(Resolution::Live { .. })` - The original URL if found and not expired
    /// * `Ok(Resolution::Expired { .. })` - If the code exists but has expired
    /// * `Ok(Resolution::NotFound)` - If the code doesn't exist
    /// * `Err(e)` - If there was an error accessing the store
    pub async fn resolve(&self, code: &ShortCode) -> crate::Result<Resolution> {
        Redirector::resolve(self, code).await
    }
}

#[async_trait]
impl<S: MappingStore, C: Clock> Redirector for RedirectorService<S, C> {
    async fn resolve(&self, code: &ShortCode) -> crate::Result<Resolution> {
        trace!(code = %code, "resolving short code");

        let Some(mapping) = self.store.get(code).await? else {
            trace!(code = %code, "short code not found");
            return Ok(Resolution::NotFound);
        };

        match (mapping.state_at(self.clock.now()), mapping.expire_at()) {
            (MappingState::Expired, Some(expired_at)) => {
                debug!(code = %code, expired_at = %expired_at, "short code has expired");
                Ok(Resolution::Expired { expired_at })
            }
            _ => {
                debug!(code = %code, url = %mapping.original_url(), "resolved short code");
                Ok(Resolution::Live {
                    original_url: mapping.into_original_url(),
                })
            }
        }
    }
}

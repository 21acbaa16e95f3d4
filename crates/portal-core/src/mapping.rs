use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Observable lifecycle state of a [`Mapping`] at a given instant.
///
/// A purged mapping is simply absent from the store, so it has no variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingState {
    Live,
    Expired,
}

/// A short code together with the URL it redirects to.
///
/// Mappings are immutable once built. The store replaces or deletes them as a
/// whole and never edits one in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mapping {
    code: ShortCode,
    original_url: String,
    /// `None` means the mapping never expires.
    expire_at: Option<Timestamp>,
}

impl Mapping {
    pub fn new(
        code: ShortCode,
        original_url: impl Into<String>,
        expire_at: Option<Timestamp>,
    ) -> Self {
        Self {
            code,
            original_url: original_url.into(),
            expire_at,
        }
    }

    pub fn code(&self) -> &ShortCode {
        &self.code
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn expire_at(&self) -> Option<Timestamp> {
        self.expire_at
    }

    /// Returns `true` once `now` has reached the expiration instant.
    pub fn is_expired_at(&self, now: Timestamp) -> bool {
        self.expire_at.is_some_and(|expire_at| now >= expire_at)
    }

    pub fn state_at(&self, now: Timestamp) -> MappingState {
        if self.is_expired_at(now) {
            MappingState::Expired
        } else {
            MappingState::Live
        }
    }

    pub fn into_original_url(self) -> String {
        self.original_url
    }
}

use crate::Result;
use async_trait::async_trait;
use jiff::Timestamp;
use portal_core::ShortCode;

/// Outcome of resolving a short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The code is live; redirect to `original_url`.
    Live { original_url: String },
    /// The code is known but its expiration has passed.
    Expired { expired_at: Timestamp },
    /// The code is unknown, deleted, or already swept.
    NotFound,
}

#[async_trait]
pub trait Redirector: Send + Sync + 'static {
    /// Resolves a short code to the URL it redirects to.
    async fn resolve(&self, code: &ShortCode) -> Result<Resolution>;
}

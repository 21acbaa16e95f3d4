//! URL shortener service implementation.
//!
//! This crate turns a shorten request into a stored [`Mapping`]: it validates
//! the target URL, resolves the expiration policy against a clock, and
//! allocates a short code, retrying on collisions.
//!
//! [`Mapping`]: portal_core::Mapping

pub mod error;
pub mod service;
pub mod shortener;

pub use error::ShortenerError;
pub use service::{ShortenerService, ShortenerSettings};
pub use shortener::{ExpirationPolicy, ShortenParams, Shortener};

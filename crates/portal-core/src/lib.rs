//! Core types and traits for the Portal URL shortener.
//!
//! This crate provides the types shared by the shortener, the redirector
//! and the expiration sweeper: the [`Mapping`] record, the validated
//! [`ShortCode`], the [`MappingStore`] contract and the [`Clock`] used to
//! judge expiration.

pub mod clock;
pub mod error;
pub mod mapping;
pub mod shortcode;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, StorageError};
pub use mapping::{Mapping, MappingState};
pub use shortcode::ShortCode;
pub use store::{ExpiredBatch, MappingStore, ScanCursor};

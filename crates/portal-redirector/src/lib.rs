//! Redirect resolution.
//!
//! [`RedirectorService`] looks a short code up in a [`MappingStore`] and
//! judges it against the clock. It never deletes anything: an expired
//! mapping is reported as [`Resolution::Expired`] until the sweeper removes
//! it, after which it is [`Resolution::NotFound`].
//!
//! ```rust
//! use std::sync::Arc;
//! use portal_core::{Mapping, MappingStore, ShortCode};
//! use portal_redirector::{RedirectorService, Resolution};
//! use portal_storage::InMemoryStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = Arc::new(InMemoryStore::new());
//! let code = ShortCode::new("abc123")?;
//! store
//!     .put(Mapping::new(code.clone(), "https://example.com", None))
//!     .await?;
//!
//! let service = RedirectorService::new(store);
//! if let Resolution::Live { original_url } = service.resolve(&code).await? {
//!     println!("Redirect to: {}", original_url);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! [`MappingStore`]: portal_core::MappingStore

pub mod error;
pub mod redirector;
pub mod service;

pub use error::RedirectorError;
pub use redirector::{Redirector, Resolution};
pub use service::RedirectorService;

pub type Result<T> = std::result::Result<T, RedirectorError>;

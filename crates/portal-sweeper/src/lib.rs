//! Background purging of expired mappings.
//!
//! Expiration is decided by time alone, so the sweeper exists only to bound
//! the size of the store. Resolving an expired code gives the same answer
//! before and after its sweep, except that a swept code is no longer known.

pub mod error;
pub mod sweeper;

pub use error::SweepError;
pub use sweeper::{ExpirationSweeper, SweeperHandle, SweeperSettings};

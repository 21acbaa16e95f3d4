//! Short code generators.
//!
//! Generators only propose codes. Uniqueness is settled when the code is
//! inserted into the store, and the allocator retries with a fresh code on
//! collision.

pub mod error;
pub mod random;
pub mod seq;

pub use error::GeneratorError;
pub use random::RandomGenerator;
pub use seq::SeqGenerator;

use portal_core::ShortCode;

/// The base62 alphabet shared by every generator in this crate.
pub const BASE62_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Trait for generating short codes.
///
/// Implementations are pure generators that don't interact with storage.
///
/// Implementations can vary from simple random generators to
/// sequence-based generators.
pub trait Generator: Send + Sync + 'static {
    /// Proposes a short code. The code may already be taken; the store has
    /// the final word.
    fn generate(&self) -> ShortCode;
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn generate(&self) -> ShortCode {
        (**self).generate()
    }
}

/// Encodes `value` in base62, left-padded with zeros to at least `width`.
pub(crate) fn encode_base62(mut value: u64, width: usize) -> String {
    let mut digits = Vec::with_capacity(width.max(11));
    loop {
        digits.push(BASE62_ALPHABET[(value % 62) as usize]);
        value /= 62;
        if value == 0 {
            break;
        }
    }
    while digits.len() < width {
        digits.push(b'0');
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

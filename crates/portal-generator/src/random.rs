use crate::error::GeneratorError;
use crate::{Generator, BASE62_ALPHABET};
use portal_core::shortcode::{MAX_LENGTH, MIN_LENGTH};
use portal_core::ShortCode;
use rand::Rng;

/// Shortest length [`RandomGenerator::for_capacity`] will pick.
const MIN_CAPACITY_LENGTH: usize = 4;
/// Longest length [`RandomGenerator::for_capacity`] will pick.
const MAX_CAPACITY_LENGTH: usize = 16;
/// The code space must be this many times larger than the expected number of
/// mappings, keeping the chance that a single attempt collides at or below
/// 1 in 10,000 when the store is full.
const COLLISION_HEADROOM: u128 = 10_000;

/// Generates random fixed-length base62 codes.
///
/// Uses the thread-local RNG, so a single instance can be shared across
/// threads without synchronization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RandomGenerator {
    length: usize,
}

impl RandomGenerator {
    /// Creates a generator producing codes of exactly `length` characters.
    pub fn new(length: usize) -> Result<Self, GeneratorError> {
        if !(MIN_LENGTH..=MAX_LENGTH).contains(&length) {
            return Err(GeneratorError::InvalidLength {
                length,
                min: MIN_LENGTH,
                max: MAX_LENGTH,
            });
        }
        Ok(Self { length })
    }

    /// Creates a generator whose code length is sized for a store holding up
    /// to `expected_mappings` entries.
    ///
    /// ```
    /// use portal_generator::RandomGenerator;
    ///
    /// assert_eq!(RandomGenerator::for_capacity(1_000_000).length(), 6);
    /// assert_eq!(RandomGenerator::for_capacity(10_000_000).length(), 7);
    /// ```
    pub fn for_capacity(expected_mappings: u64) -> Self {
        Self {
            length: length_for_capacity(expected_mappings),
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }
}

/// Smallest code length whose base62 space holds `expected_mappings` with
/// [`COLLISION_HEADROOM`] to spare.
pub fn length_for_capacity(expected_mappings: u64) -> usize {
    let target = u128::from(expected_mappings.max(1)) * COLLISION_HEADROOM;

    let mut length = MIN_CAPACITY_LENGTH;
    let mut space = 62_u128.pow(MIN_CAPACITY_LENGTH as u32);
    while space < target && length < MAX_CAPACITY_LENGTH {
        length += 1;
        space *= 62;
    }
    length
}

impl Generator for RandomGenerator {
    fn generate(&self) -> ShortCode {
        let mut rng = rand::rng();
        let code: String = (0..self.length)
            .map(|_| char::from(BASE62_ALPHABET[rng.random_range(0..BASE62_ALPHABET.len())]))
            .collect();
        ShortCode::new_unchecked(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rejects_out_of_range_lengths() {
        assert_eq!(
            RandomGenerator::new(2),
            Err(GeneratorError::InvalidLength {
                length: 2,
                min: 3,
                max: 32
            })
        );
        assert!(RandomGenerator::new(33).is_err());
        assert!(RandomGenerator::new(3).is_ok());
        assert!(RandomGenerator::new(32).is_ok());
    }

    #[test]
    fn codes_have_requested_length_and_alphabet() {
        let generator = RandomGenerator::new(8).unwrap();

        for _ in 0..1_000 {
            let code = generator.generate();
            assert_eq!(code.as_str().len(), 8);
            assert!(code.as_str().bytes().all(|b| BASE62_ALPHABET.contains(&b)));
            // generated codes must pass the same validation as user input
            assert!(ShortCode::new(code.as_str()).is_ok());
        }
    }

    #[test]
    fn codes_are_spread_out() {
        let generator = RandomGenerator::new(8).unwrap();
        let codes: HashSet<_> = (0..1_000).map(|_| generator.generate()).collect();
        // 62^8 possibilities; any repeat here means the RNG is broken
        assert_eq!(codes.len(), 1_000);
    }

    #[test]
    fn capacity_sizing() {
        assert_eq!(length_for_capacity(0), 4);
        assert_eq!(length_for_capacity(1_000), 4);
        assert_eq!(length_for_capacity(100_000), 6);
        assert_eq!(length_for_capacity(1_000_000), 6);
        assert_eq!(length_for_capacity(10_000_000), 7);
        assert_eq!(length_for_capacity(u64::MAX), 13);
    }

    #[test]
    fn generator_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RandomGenerator>();
    }
}

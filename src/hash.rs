//! Salted index derivation for Bloom filters
//!
//! Keys are hashed with keyed SipHash-1-3 (128-bit output). Every digest yields
//! four 32-bit words; digests for counters 0, 1, 2, ... are chained until there
//! are enough words, one per hash function. Each word is reduced modulo the bit
//! length to give a bit index.

use crate::{BloomError, Result};
use rand::Rng;
use siphasher::sip128::{Hasher128, SipHasher13};
use std::hash::Hasher;

/// Number of 32-bit words produced by one 128-bit digest
const WORDS_PER_DIGEST: usize = 4;

/// Derives bit indices from keys using a per-filter set of salts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaltedHasher {
    salts: Vec<u64>,
}

impl SaltedHasher {
    /// Create a hasher from explicit salts
    ///
    /// The salts must be non-empty and pairwise distinct; the number of salts is
    /// the number of indices produced per key.
    pub fn new(salts: Vec<u64>) -> Result<Self> {
        if salts.is_empty() {
            return Err(BloomError::Configuration(
                "At least one salt is required".to_string(),
            ));
        }
        for (i, salt) in salts.iter().enumerate() {
            if salts[..i].contains(salt) {
                return Err(BloomError::Configuration(format!(
                    "Duplicate salt {:#018x}",
                    salt
                )));
            }
        }
        Ok(SaltedHasher { salts })
    }

    /// Create a hasher with `count` distinct random salts drawn from `rng`
    pub fn random<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        let mut salts = Vec::with_capacity(count);
        while salts.len() < count {
            let salt: u64 = rng.gen();
            if !salts.contains(&salt) {
                salts.push(salt);
            }
        }
        SaltedHasher { salts }
    }

    /// The salts, in the order they key successive digests
    pub fn salts(&self) -> &[u64] {
        &self.salts
    }

    /// Number of indices produced per key
    pub fn hash_count(&self) -> usize {
        self.salts.len()
    }

    /// 128-bit digest of `key` for the given counter
    ///
    /// The counter picks the salt (cycling through them) and is also mixed into
    /// the SipHash key, so successive counters never repeat a digest.
    pub fn digest(&self, key: &[u8], counter: usize) -> u128 {
        let salt = self.salts[counter % self.salts.len()];
        let mut hasher = SipHasher13::new_with_keys(salt, counter as u64);
        hasher.write(key);
        hasher.finish128().as_u128()
    }

    /// Bit indices of `key` in a vector of `bit_length` bits
    ///
    /// Always returns exactly `hash_count()` indices, each `< bit_length`.
    pub fn indices(&self, key: &[u8], bit_length: usize) -> Vec<usize> {
        debug_assert!(bit_length > 0, "bit length must be > 0");

        let count = self.hash_count();
        let mut indices = Vec::with_capacity(count);
        let mut counter = 0;

        while indices.len() < count {
            let digest = self.digest(key, counter);
            for word in 0..WORDS_PER_DIGEST {
                if indices.len() == count {
                    break;
                }
                let value = (digest >> (32 * word)) as u32;
                indices.push(value as usize % bit_length);
            }
            counter += 1;
        }

        indices
    }
}

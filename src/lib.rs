//! # Salted Bloom
//!
//! A classic Bloom filter sized from a target capacity and false positive rate.
//! Bit indices come from a keyed 128-bit digest whose keys are random salts drawn
//! once per filter, so two filters built with the same parameters lay out their
//! bits differently while each one stays fully deterministic.

pub mod bloom;
pub mod hash;
pub mod utils;

pub use bloom::{BloomFilter, BloomStats};
pub use hash::SaltedHasher;
pub use utils::{optimal_bloom_parameters, BloomParameters};

use thiserror::Error;

/// Common error types for the library
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BloomError {
    /// Construction parameters are out of range; no filter is produced.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The filter already holds `capacity` keys. The filter is left untouched
    /// and keeps answering queries, with a degraded false positive rate if the
    /// caller keeps going past capacity some other way.
    #[error("Capacity exceeded: filter holds {capacity} keys, {rejected} key(s) rejected")]
    CapacityExceeded { capacity: usize, rejected: usize },
}

pub type Result<T> = std::result::Result<T, BloomError>;

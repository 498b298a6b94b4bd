//! Standard Bloom filter implementation
//!
//! A space-efficient probabilistic data structure for membership testing,
//! sized from a capacity and a target false positive rate.

use crate::{
    hash::SaltedHasher,
    utils::{false_positive_rate, optimal_bloom_parameters},
    BloomError, Result,
};
use bit_vec::BitVec;
use rand::Rng;
use tracing::{debug, warn};

/// A standard Bloom filter
#[derive(Debug, Clone)]
pub struct BloomFilter {
    /// Bit array storing the filter data
    bits: BitVec,
    /// Salted index derivation, one salt per hash function
    hasher: SaltedHasher,
    /// Maximum number of keys the filter accepts
    capacity: usize,
    /// Target false positive rate at full capacity
    error_rate: f64,
    /// Number of keys inserted
    key_count: usize,
}

impl BloomFilter {
    /// Create a new Bloom filter with salts from the thread-local generator
    ///
    /// # Arguments
    /// * `capacity` - Maximum number of keys to insert
    /// * `error_rate` - False positive rate to hold at full capacity, in (0, 1)
    pub fn new(capacity: usize, error_rate: f64) -> Result<Self> {
        Self::with_rng(capacity, error_rate, &mut rand::thread_rng())
    }

    /// Create a new Bloom filter drawing its salts from `rng`
    ///
    /// A seeded generator gives a reproducible bit layout.
    pub fn with_rng<R: Rng + ?Sized>(capacity: usize, error_rate: f64, rng: &mut R) -> Result<Self> {
        let params = optimal_bloom_parameters(capacity, error_rate)?;
        let hasher = SaltedHasher::random(params.hash_count, rng);

        debug!(
            capacity,
            error_rate,
            bit_length = params.bit_length,
            hash_count = params.hash_count,
            "created bloom filter"
        );

        Ok(BloomFilter {
            bits: BitVec::from_elem(params.bit_length, false),
            hasher,
            capacity,
            error_rate,
            key_count: 0,
        })
    }

    /// Insert a batch of keys
    ///
    /// Keys are inserted in order. Once the filter is full the remaining keys
    /// of the batch, including the one that hit the limit, are not inserted and
    /// `BloomError::CapacityExceeded` reports how many were rejected. Keys
    /// accepted before that point stay inserted.
    pub fn add<I, K>(&mut self, keys: I) -> Result<()>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        let mut keys = keys.into_iter();

        while let Some(key) = keys.next() {
            if self.key_count >= self.capacity {
                let rejected = 1 + keys.count();
                warn!(
                    capacity = self.capacity,
                    rejected, "bloom filter at capacity, rejecting remaining keys"
                );
                return Err(BloomError::CapacityExceeded {
                    capacity: self.capacity,
                    rejected,
                });
            }
            self.insert(key.as_ref());
        }

        Ok(())
    }

    /// Insert a single key
    pub fn add_one<K: AsRef<[u8]>>(&mut self, key: K) -> Result<()> {
        self.add(std::iter::once(key))
    }

    fn insert(&mut self, key: &[u8]) {
        for index in self.hasher.indices(key, self.bits.len()) {
            self.bits.set(index, true);
        }
        self.key_count += 1;
    }

    /// Check a batch of keys
    ///
    /// Returns one flag per key, in input order. `true` means the key might be
    /// present (false positives are possible), `false` means it is definitely
    /// absent.
    pub fn check<I, K>(&self, keys: I) -> Vec<bool>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<[u8]>,
    {
        keys.into_iter().map(|key| self.contains(key)).collect()
    }

    /// Check if a key might be in the filter
    pub fn contains<K: AsRef<[u8]>>(&self, key: K) -> bool {
        self.hasher
            .indices(key.as_ref(), self.bits.len())
            .into_iter()
            .all(|index| self.bits.get(index).unwrap_or(false))
    }

    /// Bit indices a key maps to in this filter
    pub fn indices<K: AsRef<[u8]>>(&self, key: K) -> Vec<usize> {
        self.hasher.indices(key.as_ref(), self.bits.len())
    }

    /// Maximum number of keys the filter accepts
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Target false positive rate at full capacity
    pub fn error_rate(&self) -> f64 {
        self.error_rate
    }

    /// Length of the bit vector
    pub fn length(&self) -> usize {
        self.bits.len()
    }

    /// Number of hash values computed per key
    pub fn hash_count(&self) -> usize {
        self.hasher.hash_count()
    }

    /// Number of keys inserted
    pub fn key_count(&self) -> usize {
        self.key_count
    }

    /// Check if no key was inserted yet
    pub fn is_empty(&self) -> bool {
        self.key_count == 0
    }

    /// Check if the filter rejects further insertions
    pub fn is_full(&self) -> bool {
        self.key_count >= self.capacity
    }

    /// Number of bits currently set
    pub fn on_bit_count(&self) -> usize {
        self.bits.iter().filter(|&bit| bit).count()
    }

    /// Per-filter salts, one per hash function
    pub fn salts(&self) -> &[u64] {
        self.hasher.salts()
    }

    /// Get the current load factor (fraction of bits set)
    pub fn load_factor(&self) -> f64 {
        self.on_bit_count() as f64 / self.bits.len() as f64
    }

    /// Get the estimated false positive rate from the current load
    pub fn estimated_fpr(&self) -> f64 {
        self.load_factor().powi(self.hash_count() as i32)
    }

    /// Get statistics about the filter
    pub fn stats(&self) -> BloomStats {
        let on_bits = self.on_bit_count();
        let load_factor = on_bits as f64 / self.bits.len() as f64;

        BloomStats {
            capacity: self.capacity,
            bit_length: self.bits.len(),
            num_hash_functions: self.hash_count(),
            elements_inserted: self.key_count,
            on_bits,
            load_factor,
            estimated_fpr: load_factor.powi(self.hash_count() as i32),
            expected_fpr_at_capacity: false_positive_rate(
                self.bits.len(),
                self.hash_count(),
                self.capacity,
            ),
        }
    }
}

/// Statistics about a Bloom filter
#[derive(Debug, Clone)]
pub struct BloomStats {
    pub capacity: usize,
    pub bit_length: usize,
    pub num_hash_functions: usize,
    pub elements_inserted: usize,
    pub on_bits: usize,
    pub load_factor: f64,
    pub estimated_fpr: f64,
    pub expected_fpr_at_capacity: f64,
}

impl std::fmt::Display for BloomStats {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "BloomFilter Stats:\n\
             - Capacity: {} keys\n\
             - Bit length: {} bits\n\
             - Hash functions: {}\n\
             - Elements inserted: {}\n\
             - Bits set: {}\n\
             - Load factor: {:.3}\n\
             - Estimated FPR: {:.6}\n\
             - Expected FPR at capacity: {:.6}",
            self.capacity,
            self.bit_length,
            self.num_hash_functions,
            self.elements_inserted,
            self.on_bits,
            self.load_factor,
            self.estimated_fpr,
            self.expected_fpr_at_capacity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn seeded(capacity: usize, error_rate: f64) -> BloomFilter {
        BloomFilter::with_rng(capacity, error_rate, &mut StdRng::seed_from_u64(2024)).unwrap()
    }

    #[test]
    fn test_bloom_filter_basic() {
        let mut bloom = seeded(10, 0.1);

        assert!(bloom.length() >= 1);
        assert!(bloom.hash_count() >= 1);
        assert!(bloom.is_empty());

        bloom.add(["a", "b", "c"]).unwrap();

        assert_eq!(bloom.key_count(), 3);
        assert_eq!(bloom.check(["a", "b", "c"]), vec![true, true, true]);
        assert!(bloom.on_bit_count() > 0);
    }

    #[test]
    fn test_bloom_filter_false_negatives() {
        let mut bloom = seeded(1000, 0.01);

        let test_key = "99999";
        assert!(!bloom.contains(test_key));

        bloom.add_one(test_key).unwrap();
        assert!(bloom.contains(test_key));
    }

    #[test]
    fn test_parameters_match_sizing() {
        let bloom = seeded(1000, 0.01);
        let params = optimal_bloom_parameters(1000, 0.01).unwrap();

        assert_eq!(bloom.capacity(), 1000);
        assert_eq!(bloom.error_rate(), 0.01);
        assert_eq!(bloom.length(), params.bit_length);
        assert_eq!(bloom.hash_count(), params.hash_count);
        assert_eq!(bloom.salts().len(), params.hash_count);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(matches!(
            BloomFilter::new(0, 0.1),
            Err(BloomError::Configuration(_))
        ));
        assert!(matches!(
            BloomFilter::new(10, 1.0),
            Err(BloomError::Configuration(_))
        ));
        assert!(matches!(
            BloomFilter::new(10, 0.0),
            Err(BloomError::Configuration(_))
        ));
    }

    #[test]
    fn test_capacity_rejects_rest_of_batch() {
        let mut bloom = seeded(3, 0.1);

        let err = bloom.add(["a", "b", "c", "d", "e"]).unwrap_err();
        assert_eq!(
            err,
            BloomError::CapacityExceeded {
                capacity: 3,
                rejected: 2
            }
        );
        assert_eq!(bloom.key_count(), 3);
        assert!(bloom.is_full());
        assert_eq!(bloom.check(["a", "b", "c"]), vec![true, true, true]);
    }

    #[test]
    fn test_rejected_insert_leaves_bits_untouched() {
        let mut bloom = seeded(2, 0.1);
        bloom.add(["x", "y"]).unwrap();
        let before = bloom.bits.clone();

        assert!(bloom.add_one("z").is_err());
        assert_eq!(bloom.bits, before);
        assert_eq!(bloom.key_count(), 2);
    }

    #[test]
    fn test_empty_batch() {
        let mut bloom = seeded(5, 0.1);

        bloom.add(Vec::<&str>::new()).unwrap();
        assert_eq!(bloom.key_count(), 0);
        assert!(bloom.check(Vec::<&str>::new()).is_empty());
    }

    #[test]
    fn test_check_single_key_returns_one_flag() {
        let mut bloom = seeded(5, 0.1);
        bloom.add_one(b"bytes".to_vec()).unwrap();

        assert_eq!(bloom.check([b"bytes"]), vec![true]);
    }

    #[test]
    fn test_indices_match_set_bits() {
        let mut bloom = seeded(100, 0.01);
        bloom.add_one("key").unwrap();

        let indices = bloom.indices("key");
        assert_eq!(indices.len(), bloom.hash_count());
        for index in indices {
            assert_eq!(bloom.bits.get(index), Some(true));
        }
    }

    #[test]
    fn test_bloom_filter_stats() {
        let mut bloom = seeded(1000, 0.01);

        for i in 0..100 {
            bloom.add_one(i.to_string()).unwrap();
        }

        let stats = bloom.stats();
        assert_eq!(stats.num_hash_functions, bloom.hash_count());
        assert_eq!(stats.elements_inserted, 100);
        assert_eq!(stats.on_bits, bloom.on_bit_count());
        assert!(stats.load_factor > 0.0);
        assert!(stats.estimated_fpr > 0.0);
        assert!(stats.expected_fpr_at_capacity <= 0.01);
        assert!(stats.to_string().starts_with("BloomFilter Stats:"));
    }

    #[test]
    fn test_same_seed_same_layout() {
        let mut a = seeded(50, 0.05);
        let mut b = seeded(50, 0.05);
        a.add(["one", "two"]).unwrap();
        b.add(["one", "two"]).unwrap();

        assert_eq!(a.salts(), b.salts());
        assert_eq!(a.bits, b.bits);
    }
}

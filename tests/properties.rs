//! Property tests for insertion and lookup

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use salted_bloom::BloomFilter;

proptest! {
    #[test]
    fn test_inserted_keys_always_found(
        seed in any::<u64>(),
        keys in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..32), 1..64),
    ) {
        let mut bloom = BloomFilter::with_rng(64, 0.01, &mut StdRng::seed_from_u64(seed)).unwrap();
        bloom.add(&keys).unwrap();

        prop_assert!(bloom.check(&keys).into_iter().all(|hit| hit));
    }

    #[test]
    fn test_index_derivation_is_stable(
        seed in any::<u64>(),
        key in prop::collection::vec(any::<u8>(), 0..64),
        others in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..32),
    ) {
        let mut bloom = BloomFilter::with_rng(64, 0.05, &mut StdRng::seed_from_u64(seed)).unwrap();
        let before = bloom.indices(&key);

        bloom.add_one(&key).unwrap();
        bloom.add(&others).unwrap();

        prop_assert_eq!(before.len(), bloom.hash_count());
        prop_assert!(before.iter().all(|&index| index < bloom.length()));
        prop_assert_eq!(bloom.indices(&key), before);
    }

    #[test]
    fn test_key_count_never_exceeds_capacity(
        capacity in 1usize..50,
        inserts in 0usize..120,
    ) {
        let mut bloom = BloomFilter::with_rng(capacity, 0.1, &mut StdRng::seed_from_u64(0)).unwrap();
        let result = bloom.add((0..inserts).map(|i| i.to_le_bytes()));

        prop_assert_eq!(result.is_err(), inserts > capacity);
        prop_assert_eq!(bloom.key_count(), inserts.min(capacity));
    }

    #[test]
    fn test_batch_and_single_checks_agree(
        keys in prop::collection::vec("[a-z]{0,8}", 0..40),
        probe in prop::collection::vec("[a-z]{0,8}", 0..40),
    ) {
        let mut bloom = BloomFilter::with_rng(40, 0.2, &mut StdRng::seed_from_u64(1)).unwrap();
        bloom.add(&keys).unwrap();

        let single: Vec<bool> = probe.iter().map(|key| bloom.contains(key)).collect();
        prop_assert_eq!(bloom.check(&probe), single);
    }
}

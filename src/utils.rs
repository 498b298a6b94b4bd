//! Sizing for Bloom filters

use crate::{BloomError, Result};

/// Largest hash count considered when searching for the smallest bit vector.
pub const MAX_HASH_COUNT: usize = 100;

/// Optimal Bloom filter parameters for a capacity and error rate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloomParameters {
    pub bit_length: usize,
    pub hash_count: usize,
    /// Theoretical false positive rate once `capacity` keys are inserted
    pub expected_fpr: f64,
}

/// Validate construction parameters
fn validate(capacity: usize, error_rate: f64) -> Result<()> {
    if capacity == 0 {
        return Err(BloomError::Configuration(
            "Capacity must be > 0".to_string(),
        ));
    }
    // The negated comparison also rejects NaN.
    if !(error_rate > 0.0 && error_rate < 1.0) {
        return Err(BloomError::Configuration(format!(
            "Error rate must be in (0, 1), got {}",
            error_rate
        )));
    }
    Ok(())
}

/// Calculate the smallest bit vector (and its hash count) that keeps the false
/// positive rate at or below `error_rate` once `capacity` keys are inserted.
///
/// For each k in `1..=MAX_HASH_COUNT` the required length is
/// `m_k = -(k * n) / ln(1 - p^(1/k))`; the smallest `m_k` wins and the bit
/// length is `floor(m_k) + 1`.
pub fn optimal_bloom_parameters(capacity: usize, error_rate: f64) -> Result<BloomParameters> {
    validate(capacity, error_rate)?;

    let n = capacity as f64;
    let mut best: Option<(f64, usize)> = None;

    for k in 1..=MAX_HASH_COUNT {
        let kf = k as f64;
        let m = -(kf * n) / (1.0 - error_rate.powf(1.0 / kf)).ln();
        // p^(1/k) rounds to 1.0 for p close to 1, which yields m = 0
        if !(m.is_finite() && m > 0.0) {
            continue;
        }
        match best {
            Some((best_m, _)) if best_m <= m => {}
            _ => best = Some((m, k)),
        }
    }

    let (min_m, hash_count) = best.ok_or_else(|| {
        BloomError::Configuration(format!(
            "No finite bit length for capacity {} and error rate {}",
            capacity, error_rate
        ))
    })?;

    let bit_length = if min_m < usize::MAX as f64 {
        (min_m.floor() as usize).checked_add(1)
    } else {
        None
    }
    .ok_or_else(|| BloomError::Configuration("Bit length overflows usize".to_string()))?;

    Ok(BloomParameters {
        bit_length,
        hash_count,
        expected_fpr: false_positive_rate(bit_length, hash_count, capacity),
    })
}

/// Theoretical false positive rate: (1 - e^(-k * n / m))^k
pub fn false_positive_rate(bit_length: usize, hash_count: usize, keys: usize) -> f64 {
    if bit_length == 0 {
        return 1.0;
    }
    let k = hash_count as f64;
    let exponent = -k * keys as f64 / bit_length as f64;
    (1.0 - exponent.exp()).powi(hash_count as i32)
}

//! Bloom filter harness
//!
//! Run with: `cargo run --bin bloom_harness -- --capacity 10000 --error-rate 0.01`

use anyhow::{ensure, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use salted_bloom::{BloomError, BloomFilter};
use std::time::Instant;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bloom_harness")]
#[command(about = "Build a Bloom filter, fill it and measure its false positive rate")]
struct Cli {
    /// Maximum number of keys the filter is sized for
    #[arg(long, default_value_t = 10_000)]
    capacity: usize,

    /// Target false positive rate at full capacity
    #[arg(long, default_value_t = 0.01)]
    error_rate: f64,

    /// Number of distinct keys to insert (defaults to the capacity)
    #[arg(long)]
    inserts: Option<usize>,

    /// Number of never-inserted keys to query
    #[arg(long, default_value_t = 5_000)]
    queries: usize,

    /// Seed for the salt generator, for a reproducible run
    #[arg(long)]
    seed: Option<u64>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let start = Instant::now();
    let mut filter = match cli.seed {
        Some(seed) => {
            BloomFilter::with_rng(cli.capacity, cli.error_rate, &mut StdRng::seed_from_u64(seed))?
        }
        None => BloomFilter::new(cli.capacity, cli.error_rate)?,
    };
    let creation_time = start.elapsed().as_secs_f64();

    info!(
        bit_length = filter.length(),
        hash_count = filter.hash_count(),
        "filter ready in {:.6}s",
        creation_time
    );

    let inserts = cli.inserts.unwrap_or(cli.capacity);
    let inserted: Vec<String> = (0..inserts).map(|i| format!("key-{}", i)).collect();

    let start = Instant::now();
    match filter.add(&inserted) {
        Ok(()) => {}
        Err(BloomError::CapacityExceeded { capacity, rejected }) => {
            warn!(capacity, rejected, "insertion stopped at capacity");
        }
        Err(err) => return Err(err.into()),
    }
    let insert_time = start.elapsed().as_secs_f64();
    let accepted = &inserted[..filter.key_count()];

    let false_negatives = filter
        .check(accepted)
        .into_iter()
        .filter(|&hit| !hit)
        .count();
    ensure!(
        false_negatives == 0,
        "{} inserted keys were reported absent",
        false_negatives
    );

    let absent: Vec<String> = (0..cli.queries).map(|i| format!("absent-{}", i)).collect();
    let start = Instant::now();
    let false_positives = filter.check(&absent).into_iter().filter(|&hit| hit).count();
    let query_time = start.elapsed().as_secs_f64();

    let observed_fpr = if absent.is_empty() {
        0.0
    } else {
        false_positives as f64 / absent.len() as f64
    };

    println!("{}", filter.stats());
    println!();
    println!("Insert: {} keys in {:.6}s", filter.key_count(), insert_time);
    println!("Query: {} keys in {:.6}s", absent.len(), query_time);
    println!(
        "False positives: {} / {} = {:.6} (target {})",
        false_positives,
        absent.len(),
        observed_fpr,
        filter.error_rate()
    );

    Ok(())
}

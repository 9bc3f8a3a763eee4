//! Fills a tree with keys drawn from a small fixed set and prints its shape.
//!
//! Run with `RUST_LOG=bptree_index=trace` to also see every split as it happens.

use bptree_index::{BPTree, Comparator};
use tracing_subscriber::EnvFilter;

/// Candidate keys, in tenths: 0.0, 0.5, 0.2 and 0.8.
const TENTHS: [u32; 4] = [0, 5, 2, 8];
const INSERTS: usize = 400;

/// Deterministic linear congruential generator, so runs are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next_index(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) % bound as u64) as usize
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut tree = BPTree::new(3);
    let mut inserted = Vec::with_capacity(INSERTS);
    let mut rng = Lcg(0x5eed);

    for _ in 0..INSERTS {
        let key = TENTHS[rng.next_index(TENTHS.len())];
        inserted.push(key);
        tree.insert(key, key);
        tracing::trace!(key, len = tree.len(), "tree structure:\n{tree}");
    }

    println!("Tree structure after {} inserts:\n{tree}", tree.len());

    let filtered = tree.range_search(&2, Comparator::AtLeast);
    let expected = inserted.iter().filter(|&&k| k >= 2).count();
    println!("Values >= 0.2: {} (expected {expected})", filtered.len());
    println!("{filtered:?}");
    for key in TENTHS {
        let bucket = tree.get_all(&key).map_or(0, <[u32]>::len);
        println!("  0.{key}: {bucket} values");
    }
}

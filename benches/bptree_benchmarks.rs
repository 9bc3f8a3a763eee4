use bptree_index::{BPTree, Comparator};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::collections::BTreeMap;
use std::hint::black_box;

const N: usize = 10_000;
const BRANCHING_FACTORS: [usize; 3] = [3, 16, 128];

// ─── Helper functions to generate key sequences ─────────────────────────────

fn ordered_keys(n: usize) -> Vec<i64> {
    (0..n as i64).collect()
}

fn random_keys(n: usize) -> Vec<i64> {
    // Use a simple LCG for deterministic pseudo-random sequence
    let mut keys = Vec::with_capacity(n);
    let mut x: u64 = 12345;
    for _ in 0..n {
        x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
        keys.push((x >> 33) as i64 % (n as i64 / 4));
    }
    keys
}

fn build(branching_factor: usize, keys: &[i64]) -> BPTree<i64, i64> {
    let mut tree = BPTree::new(branching_factor);
    tree.extend(keys.iter().map(|&k| (k, k)));
    tree
}

// ─── Insert Benchmarks ──────────────────────────────────────────────────────

fn bench_insert_ordered(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let mut group = c.benchmark_group("insert_ordered");

    for branching_factor in BRANCHING_FACTORS {
        group.bench_function(BenchmarkId::new("BPTree", branching_factor), |b| {
            b.iter(|| build(branching_factor, &keys));
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap<Vec>", N), |b| {
        b.iter(|| {
            let mut map: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
            for &k in &keys {
                map.entry(k).or_default().push(k);
            }
            map
        });
    });

    group.finish();
}

fn bench_insert_random_duplicates(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("insert_random_duplicates");

    for branching_factor in BRANCHING_FACTORS {
        group.bench_function(BenchmarkId::new("BPTree", branching_factor), |b| {
            b.iter(|| build(branching_factor, &keys));
        });
    }

    group.bench_function(BenchmarkId::new("BTreeMap<Vec>", N), |b| {
        b.iter(|| {
            let mut map: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
            for &k in &keys {
                map.entry(k).or_default().push(k);
            }
            map
        });
    });

    group.finish();
}

// ─── Lookup Benchmarks ──────────────────────────────────────────────────────

fn bench_get_random(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("get_random");

    for branching_factor in BRANCHING_FACTORS {
        let tree = build(branching_factor, &keys);
        group.bench_function(BenchmarkId::new("BPTree", branching_factor), |b| {
            b.iter(|| {
                let mut sum = 0i64;
                for k in &keys {
                    if let Some(&v) = tree.get(k) {
                        sum = sum.wrapping_add(v);
                    }
                }
                sum
            });
        });
    }

    group.finish();
}

// ─── Range Search Benchmarks ────────────────────────────────────────────────

fn bench_range_search(c: &mut Criterion) {
    let keys = ordered_keys(N);
    let probe = N as i64 / 2;
    let mut group = c.benchmark_group("range_search");

    for branching_factor in BRANCHING_FACTORS {
        let tree = build(branching_factor, &keys);
        for comparator in [Comparator::AtMost, Comparator::Equal, Comparator::AtLeast] {
            let id = BenchmarkId::new(format!("BPTree/{comparator}"), branching_factor);
            group.bench_function(id, |b| {
                b.iter(|| tree.range_search(black_box(&probe), comparator).len());
            });
        }
    }

    group.finish();
}

fn bench_iterate(c: &mut Criterion) {
    let keys = random_keys(N);
    let mut group = c.benchmark_group("iterate");

    for branching_factor in BRANCHING_FACTORS {
        let tree = build(branching_factor, &keys);
        group.bench_function(BenchmarkId::new("BPTree", branching_factor), |b| {
            b.iter(|| tree.iter().fold(0i64, |acc, (_, &v)| acc.wrapping_add(v)));
        });
    }

    group.finish();
}

// ─── Criterion Groups ───────────────────────────────────────────────────────

criterion_group!(insert_benches, bench_insert_ordered, bench_insert_random_duplicates,);

criterion_group!(search_benches, bench_get_random, bench_range_search, bench_iterate,);

criterion_main!(insert_benches, search_benches);

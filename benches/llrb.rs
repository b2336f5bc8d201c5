// Throughput of the symbol table for i64 keys and values:
// * initial load of N entries, in random order.
// * get on every loaded key.
// * delete of every loaded key.
// * rank and select across the loaded set.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use rand::{rngs::SmallRng, Rng, SeedableRng};

use llrb_symtab::Llrb;

const SIZES: [usize; 3] = [1_000, 10_000, 100_000];

fn random_keys(n: usize) -> Vec<i64> {
    let mut rng = SmallRng::from_seed([7; 16]);
    (0..n).map(|_| rng.gen::<i64>()).collect()
}

fn load(keys: &[i64]) -> Llrb<i64, i64> {
    let mut llrb = Llrb::new("bench");
    for key in keys.iter() {
        llrb.set(*key, *key);
    }
    llrb
}

fn bench_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("set");
    for n in SIZES.iter() {
        let keys = random_keys(*n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| black_box(load(keys)))
        });
    }
    group.finish();
}

fn bench_get(c: &mut Criterion) {
    let mut group = c.benchmark_group("get");
    for n in SIZES.iter() {
        let keys = random_keys(*n);
        let llrb = load(&keys);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter(|| {
                for key in keys.iter() {
                    black_box(llrb.get(key));
                }
            })
        });
    }
    group.finish();
}

fn bench_delete(c: &mut Criterion) {
    let mut group = c.benchmark_group("delete");
    for n in SIZES.iter() {
        let keys = random_keys(*n);
        let llrb = load(&keys);
        group.bench_with_input(BenchmarkId::from_parameter(n), &keys, |b, keys| {
            b.iter_batched(
                || llrb.clone(),
                |mut llrb| {
                    for key in keys.iter() {
                        black_box(llrb.delete(key));
                    }
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_rank_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank_select");
    for n in SIZES.iter() {
        let keys = random_keys(*n);
        let llrb = load(&keys);
        group.bench_with_input(BenchmarkId::from_parameter(n), &llrb, |b, llrb| {
            b.iter(|| {
                for rank in 0..llrb.len() {
                    if let Ok(key) = llrb.select(rank) {
                        black_box(llrb.rank(&key));
                    }
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_set, bench_get, bench_delete, bench_rank_select);
criterion_main!(benches);

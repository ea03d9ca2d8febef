use std::hint::black_box;
use std::time::{Duration, Instant};

use bench::{RuntimeProfile, default_rng, random_closed_range, random_values};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use implicit_treap::ImplicitTreap;

const SIZES: [usize; 5] = [1_000, 4_000, 16_000, 64_000, 256_000];
const OPS_PER_ITER: usize = 100;
const VALUE_RANGE: std::ops::RangeInclusive<i64> = -1_000_000_000..=1_000_000_000;
const DELTA_RANGE: std::ops::RangeInclusive<i64> = -1_000..=1_000;

#[derive(Clone, Copy)]
enum Op {
    At { position: usize },
    RangeSum { l: usize, r: usize },
    RangeAdd { l: usize, r: usize, delta: i64 },
    Reverse { l: usize, r: usize },
    Insert { position: usize, value: i64 },
    Erase { position: usize },
}

/// Generates a mixed workload that keeps the length within
/// `OPS_PER_ITER` of `len`.
fn generate_ops(rng: &mut StdRng, mut len: usize) -> Vec<Op> {
    let mut ops = Vec::with_capacity(OPS_PER_ITER);
    for _ in 0..OPS_PER_ITER {
        let roll = if len == 0 { 4 } else { rng.random_range(0..6) };
        let op = match roll {
            0 => Op::At {
                position: rng.random_range(0..len),
            },
            1 => {
                let (l, r) = random_closed_range(rng, len);
                Op::RangeSum { l, r }
            }
            2 => {
                let (l, r) = random_closed_range(rng, len);
                Op::RangeAdd {
                    l,
                    r,
                    delta: rng.random_range(DELTA_RANGE),
                }
            }
            3 => {
                let (l, r) = random_closed_range(rng, len);
                Op::Reverse { l, r }
            }
            4 => {
                len += 1;
                Op::Insert {
                    position: rng.random_range(0..len),
                    value: rng.random_range(VALUE_RANGE),
                }
            }
            _ => {
                len -= 1;
                Op::Erase {
                    position: rng.random_range(0..=len),
                }
            }
        };
        ops.push(op);
    }
    ops
}

fn run_ops(seq: &mut ImplicitTreap<i64>, ops: &[Op]) {
    for op in ops {
        let outcome = match *op {
            Op::At { position } => seq.at(position).map(black_box).is_ok(),
            Op::RangeSum { l, r } => seq.range_sum(l, r).map(black_box).is_ok(),
            Op::RangeAdd { l, r, delta } => seq.range_add(l, r, delta).is_ok(),
            Op::Reverse { l, r } => seq.reverse(l, r).is_ok(),
            Op::Insert { position, value } => seq.insert(value, position).is_ok(),
            Op::Erase { position } => seq.erase(position).map(black_box).is_ok(),
        };
        debug_assert!(outcome);
    }
}

fn bench_mixed(c: &mut Criterion) {
    let mut group = c.benchmark_group("implicit_treap/mixed");
    let mut rng = default_rng();
    for size in SIZES {
        RuntimeProfile::for_len(size).apply(&mut group);
        let initial = random_values(&mut rng, size, VALUE_RANGE);
        let mut seq = ImplicitTreap::from_iter_with_seed(initial, size as u64);
        let base_seed: u64 = rng.random();

        group.bench_function(BenchmarkId::from_parameter(size), |bencher| {
            bencher.iter_custom(|iters| {
                let mut total = Duration::ZERO;
                // Reuse the same sequence; regenerate ops per iteration from a fixed seed.
                for iter in 0..iters {
                    let mut op_rng = StdRng::seed_from_u64(base_seed ^ iter);
                    let ops = generate_ops(&mut op_rng, seq.len());
                    let start = Instant::now();
                    run_ops(&mut seq, &ops);
                    black_box(seq.len());
                    total += start.elapsed();
                }
                total
            })
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("implicit_treap/build");
    let mut rng = default_rng();
    for size in SIZES {
        RuntimeProfile::for_len(size).apply(&mut group);
        let initial = random_values(&mut rng, size, VALUE_RANGE);

        group.bench_with_input(BenchmarkId::new("bulk", size), &initial, |bencher, values| {
            bencher.iter(|| ImplicitTreap::from_iter_with_seed(values.iter().copied(), 1).len())
        });
        group.bench_with_input(BenchmarkId::new("push_back", size), &initial, |bencher, values| {
            bencher.iter(|| {
                let mut seq = ImplicitTreap::<i64>::with_seed(1);
                for value in values {
                    seq.push_back(*value);
                }
                seq.len()
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_mixed, bench_build);
criterion_main!(benches);

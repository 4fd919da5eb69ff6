//! Benchmarks for step generation and reconstruction
//!
//! Measures performance of:
//! - Materializing sorting logs at growing input sizes
//! - Reconstructing a state at the start, middle and end of a log
//! - Generating a backtracking search with a deep call tree

use algoscope_algos::array::{bubble_sort, merge_sort, reconstruct_array};
use algoscope_algos::backtrack::permutations;
use algoscope_algos::board::n_queens;
use algoscope_trace::Block;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

/// Deterministic scrambled values (LCG) so runs are comparable.
fn scrambled(n: usize) -> Vec<Block> {
    let mut seed: u64 = 0x5eed;
    let values: Vec<i64> = (0..n)
        .map(|_| {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            ((seed >> 33) % 1000) as i64
        })
        .collect();
    Block::from_values(&values)
}

/// Benchmark materializing sort logs
fn bench_generate(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");

    for &n in &[16usize, 64, 256] {
        let blocks = scrambled(n);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("bubble", n), &blocks, |b, blocks| {
            b.iter(|| bubble_sort(black_box(blocks)))
        });
        group.bench_with_input(BenchmarkId::new("merge", n), &blocks, |b, blocks| {
            b.iter(|| merge_sort(black_box(blocks)))
        });
    }
    group.finish();
}

/// Benchmark seeking: cost grows with the target index
fn bench_reconstruct(c: &mut Criterion) {
    let mut group = c.benchmark_group("reconstruct");

    let steps = bubble_sort(&scrambled(128));
    let last = steps.len() - 1;
    for (name, index) in [("start", 0), ("middle", last / 2), ("end", last)] {
        group.throughput(Throughput::Elements(index as u64 + 1));
        group.bench_with_input(BenchmarkId::new(name, index), &index, |b, &i| {
            b.iter(|| reconstruct_array(black_box(&steps), black_box(i)))
        });
    }
    group.finish();
}

/// Benchmark recursive producers
fn bench_backtracking(c: &mut Criterion) {
    let mut group = c.benchmark_group("backtracking");

    let items = Block::from_values(&[1, 2, 3, 4, 5, 6]);
    group.bench_function("permutations_6", |b| {
        b.iter(|| permutations(black_box(&items)))
    });
    for n in [6usize, 8] {
        group.bench_with_input(BenchmarkId::new("n_queens", n), &n, |b, &n| {
            b.iter(|| n_queens(black_box(n)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generate, bench_reconstruct, bench_backtracking);
criterion_main!(benches);

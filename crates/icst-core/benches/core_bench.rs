//! Criterion benchmarks for icst-core block operations
//!
//! Run with: cargo bench -p icst-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use icst_core::AntiDenormal;
use icst_core::filter::{biquad, fir, iir1, lplsynth, lpssynth};
use icst_core::special::{FilterType, Resonance, dzbilin, eqzbiquad, roots};
use icst_core::vector::{self, NoiseGen};

const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn generate_test_signal(size: usize) -> Vec<f32> {
    let mut d = vec![0.0f32; size];
    NoiseGen::new(17).unoise(&mut d);
    vector::mul(&mut d, 0.5);
    d
}

fn bench_reductions(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reductions");

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);
        let other = generate_test_signal(block_size + 1);

        group.bench_with_input(BenchmarkId::new("dotp", block_size), &block_size, |b, _| {
            b.iter(|| black_box(vector::dotp(black_box(&input), &other[1..])));
        });
        group.bench_with_input(BenchmarkId::new("rms", block_size), &block_size, |b, _| {
            b.iter(|| black_box(vector::rms(black_box(&input))));
        });
        group.bench_with_input(BenchmarkId::new("median", block_size), &block_size, |b, _| {
            b.iter(|| black_box(vector::median(black_box(&input))));
        });
    }

    group.finish();
}

fn bench_biquad(c: &mut Criterion) {
    let mut group = c.benchmark_group("Biquad");

    let (a, bc) = eqzbiquad(0.02, Resonance::Q(0.707), FilterType::Lowpass, 0.0);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(
            BenchmarkId::new("process", block_size),
            &block_size,
            |b, _| {
                let mut state = [0.0f64; 2];
                let mut adn = AntiDenormal::default();
                let mut block = input.clone();
                b.iter(|| {
                    block.copy_from_slice(&input);
                    biquad(black_box(&mut block), &a, &bc, &mut state, &mut adn);
                });
            },
        );
    }

    group.bench_function("coefficient_calc", |b| {
        b.iter(|| {
            black_box(eqzbiquad(
                black_box(0.02),
                Resonance::Octaves(1.0),
                FilterType::Peaking,
                6.0,
            ))
        });
    });

    group.finish();
}

fn bench_first_order_and_fir(c: &mut Criterion) {
    let mut group = c.benchmark_group("FirstOrderAndFir");

    let (a, bc) = dzbilin(0.05, FilterType::Lowpass, 0.0);
    let mut taps = vec![0.0f32; 32];
    vector::hann(&mut taps);

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(BenchmarkId::new("iir1", block_size), &block_size, |b, _| {
            let mut state = 0.0f32;
            let mut adn = AntiDenormal::default();
            let mut block = input.clone();
            b.iter(|| {
                block.copy_from_slice(&input);
                iir1(black_box(&mut block), &a, &bc, &mut state, &mut adn);
            });
        });

        group.bench_with_input(BenchmarkId::new("fir_32", block_size), &block_size, |b, _| {
            let mut state = vec![0.0f32; 31];
            let mut block = input.clone();
            b.iter(|| {
                block.copy_from_slice(&input);
                fir(black_box(&mut block), &taps, &mut state);
            });
        });
    }

    group.finish();
}

fn bench_lpc_synthesis(c: &mut Criterion) {
    let mut group = c.benchmark_group("LpcSynthesis");

    let k = [0.5, -0.3, 0.2, -0.1, 0.05, -0.02, 0.01, 0.0];
    let f = [0.02f32, 0.05, 0.09, 0.14, 0.2, 0.27, 0.33, 0.41];

    for &block_size in BLOCK_SIZES {
        let input = generate_test_signal(block_size);

        group.bench_with_input(BenchmarkId::new("lattice", block_size), &block_size, |b, _| {
            let mut state = [0.0f64; 8];
            let mut block = input.clone();
            b.iter(|| {
                block.copy_from_slice(&input);
                lplsynth(black_box(&mut block), &k, &mut state);
            });
        });

        group.bench_with_input(BenchmarkId::new("lsf", block_size), &block_size, |b, _| {
            let mut state = [0.0f64; 17];
            let mut block = input.clone();
            b.iter(|| {
                block.copy_from_slice(&input);
                lpssynth(black_box(&mut block), &f, &mut state);
            });
        });
    }

    group.finish();
}

fn bench_roots(c: &mut Criterion) {
    let mut group = c.benchmark_group("Roots");

    for degree in [4usize, 8, 16] {
        let coeffs: Vec<f64> = (0..=degree).map(|i| 1.0 + (i % 3) as f64).collect();
        group.bench_with_input(BenchmarkId::new("laguerre", degree), &degree, |b, _| {
            let mut r = vec![0.0f64; 2 * degree];
            b.iter(|| black_box(roots(black_box(&coeffs), &mut r)));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_reductions,
    bench_biquad,
    bench_first_order_and_fir,
    bench_lpc_synthesis,
    bench_roots,
);

criterion_main!(benches);

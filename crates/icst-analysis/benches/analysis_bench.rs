//! Criterion benchmarks for icst-analysis components
//!
//! Run with: cargo bench -p icst-analysis

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use icst_analysis::lpc::{lp_durbin, lpc_to_lsf};
use icst_analysis::{
    FftProcessor, Normalization, PartialTracker, PitchDetector, Radix2Backend, Reassignment,
    SpectralAnalyzer,
};
use icst_core::vector::{NoiseGen, bacorr, hann};
use std::f32::consts::PI;

const SAMPLE_RATE: f32 = 48000.0;

/// Generate a test sine wave
fn generate_sine(size: usize, frequency: f32) -> Vec<f32> {
    (0..size)
        .map(|i| (2.0 * PI * frequency * i as f32 / SAMPLE_RATE).sin())
        .collect()
}

/// Generate a tone with four harmonics
fn generate_complex_signal(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE;
            let f1 = (2.0 * PI * 440.0 * t).sin();
            let f2 = 0.5 * (2.0 * PI * 880.0 * t).sin();
            let f3 = 0.25 * (2.0 * PI * 1320.0 * t).sin();
            let f4 = 0.125 * (2.0 * PI * 1760.0 * t).sin();
            (f1 + f2 + f3 + f4) * 0.5
        })
        .collect()
}

fn generate_noise(size: usize) -> Vec<f32> {
    let mut d = vec![0.0f32; size];
    NoiseGen::new(0x1234_5678).unoise(&mut d);
    d
}

// ============================================================================
// FFT benchmarks
// ============================================================================

fn bench_realfft(c: &mut Criterion) {
    let mut group = c.benchmark_group("RealFFT");

    let sizes = [256, 512, 1024, 2048, 4096, 8192];

    for &size in &sizes {
        let mut fft = FftProcessor::new();
        let mut radix2 = FftProcessor::with_backend(Radix2Backend::new());
        let input = generate_sine(size, 440.0);
        let mut d = input.clone();

        group.bench_with_input(BenchmarkId::new("rustfft", size), &size, |b, _| {
            b.iter(|| {
                d.copy_from_slice(&input);
                fft.realfft(black_box(&mut d));
            })
        });
        group.bench_with_input(BenchmarkId::new("radix2", size), &size, |b, _| {
            b.iter(|| {
                d.copy_from_slice(&input);
                radix2.realfft(black_box(&mut d));
            })
        });
    }

    group.finish();
}

fn bench_realfft_roundtrip(c: &mut Criterion) {
    let mut group = c.benchmark_group("RealFFT_Roundtrip");

    for &size in &[256, 1024, 4096] {
        let mut fft = FftProcessor::new();
        let input = generate_complex_signal(size);
        let mut d = input.clone();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                d.copy_from_slice(&input);
                fft.realfft(&mut d);
                fft.realifft(black_box(&mut d));
            })
        });
    }

    group.finish();
}

fn bench_dct(c: &mut Criterion) {
    let mut group = c.benchmark_group("DCT");

    for &size in &[64, 256, 1024] {
        let mut fft = FftProcessor::new();
        let input = generate_noise(size);
        let mut d = input.clone();

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                d.copy_from_slice(&input);
                fft.dct(black_box(&mut d));
            })
        });
    }

    group.finish();
}

// ============================================================================
// Spectrum benchmarks
// ============================================================================

fn bench_reassigned_spectrum(c: &mut Criterion) {
    let mut group = c.benchmark_group("Reassigned_Spectrum");

    for &size in &[512, 1024, 2048, 4096] {
        let mut window = vec![0.0f32; size + 1];
        hann(&mut window);
        let mut analyzer = SpectralAnalyzer::new(&window);
        let input = generate_complex_signal(size);
        let mut d = input.clone();
        let mut freq = vec![0.0f32; size];
        let mut amp = vec![0.0f32; size / 2];

        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, _| {
            b.iter(|| {
                d.copy_from_slice(&input);
                analyzer.analyse_spectrum(
                    black_box(&mut d),
                    Reassignment {
                        freq: Some(&mut freq),
                        amp: Some(&mut amp),
                        time: None,
                    },
                );
            })
        });
    }

    group.finish();
}

fn bench_partial_tracking(c: &mut Criterion) {
    let size = 2048;
    let mut window = vec![0.0f32; size + 1];
    hann(&mut window);
    let mut analyzer = SpectralAnalyzer::new(&window);
    let mut d = generate_complex_signal(size);
    let mut freq = vec![0.0f32; size];
    let mut amp = vec![0.0f32; size / 2];
    analyzer.analyse_spectrum(
        &mut d,
        Reassignment {
            freq: Some(&mut freq),
            amp: Some(&mut amp),
            time: None,
        },
    );
    let mut tracker = PartialTracker::new(size);

    c.bench_function("PartialTracker_update_2048", |b| {
        b.iter(|| tracker.update(black_box(&freq), black_box(&amp)))
    });
}

// ============================================================================
// Pitch benchmarks
// ============================================================================

fn bench_pitch(c: &mut Criterion) {
    let mut group = c.benchmark_group("Pitch");

    let schemes = [
        ("mcleod", Normalization::McLeod),
        ("cauchy_schwarz", Normalization::CauchySchwarz),
        ("biased_cauchy_schwarz", Normalization::BiasedCauchySchwarz),
        ("yin", Normalization::Yin),
    ];

    for &size in &[512, 1024, 2048] {
        let mut detector = PitchDetector::new(size);
        let input = generate_complex_signal(size);
        for (name, scheme) in schemes {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| black_box(detector.detect(black_box(&input), scheme)))
            });
        }
    }

    group.finish();
}

// ============================================================================
// LPC benchmarks
// ============================================================================

fn bench_lpc(c: &mut Criterion) {
    let mut group = c.benchmark_group("LPC");

    let input = generate_noise(2048);
    for &order in &[8, 16, 32] {
        let mut rm = vec![0.0f32; order + 1];
        bacorr(&mut rm, &input);
        let mut a = vec![0.0f64; order + 1];
        let mut k = vec![0.0f64; order];

        group.bench_with_input(BenchmarkId::new("durbin", order), &order, |b, _| {
            b.iter(|| black_box(lp_durbin(&mut a, &mut k, black_box(&rm))))
        });

        let _ = lp_durbin(&mut a, &mut k, &rm);
        let mut fft = FftProcessor::new();
        let mut lsf = vec![0.0f32; order];
        group.bench_with_input(BenchmarkId::new("lsf", order), &order, |b, _| {
            b.iter(|| black_box(lpc_to_lsf(&mut lsf, black_box(&a), 512, &mut fft)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_realfft,
    bench_realfft_roundtrip,
    bench_dct,
    bench_reassigned_spectrum,
    bench_partial_tracking,
    bench_pitch,
    bench_lpc,
);

criterion_main!(benches);

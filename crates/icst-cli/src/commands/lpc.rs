//! Linear prediction of a synthetic two-formant signal.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use icst_analysis::FftProcessor;
use icst_analysis::lpc::{lp_durbin, lpc_to_lsf};
use icst_core::filter::lpdsynth;
use icst_core::vector::{NoiseGen, bacorr};

use super::common::{SignalStats, load_config};

#[derive(Args)]
pub struct LpcArgs {
    /// First formant in Hz
    #[arg(long, default_value = "700.0")]
    f1: f32,

    /// Second formant in Hz
    #[arg(long, default_value = "2200.0")]
    f2: f32,

    /// Formant bandwidth in Hz
    #[arg(long, default_value = "300.0")]
    bandwidth: f32,

    /// Signal length in samples
    #[arg(short = 'n', long, default_value = "8192")]
    length: usize,

    /// Prediction order; overrides the configuration
    #[arg(short, long)]
    order: Option<usize>,

    /// LSF search grid; overrides the configuration
    #[arg(long)]
    grid: Option<usize>,

    /// Noise seed of the excitation
    #[arg(long, default_value = "7")]
    seed: u32,

    /// Analysis configuration (TOML); sets sample rate, order and grid
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// All-pole predictor with a resonator pair per formant `(freq, radius)`,
/// frequencies relative to the sample rate.
fn formant_predictor(formants: &[(f64, f64)]) -> Vec<f64> {
    let mut poly = vec![1.0f64];
    for &(f, r) in formants {
        let w = 2.0 * std::f64::consts::PI * f;
        let section = [1.0, -2.0 * r * w.cos(), r * r];
        let mut next = vec![0.0f64; poly.len() + 2];
        for (i, &x) in poly.iter().enumerate() {
            for (j, &y) in section.iter().enumerate() {
                next[i + j] += x * y;
            }
        }
        poly = next;
    }
    poly
}

pub fn run(args: LpcArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let fs = f64::from(config.sample_rate);
    let order = args.order.unwrap_or(config.lpc.order);
    let grid = args.grid.unwrap_or(config.lpc.grid);
    if order < 2 || order % 2 != 0 {
        anyhow::bail!("order must be even and at least 2, got {order}");
    }
    if args.length <= order {
        anyhow::bail!("signal of {} samples is too short for order {order}", args.length);
    }
    for f in [args.f1, args.f2] {
        if !(f > 0.0 && f64::from(f) < 0.5 * fs) {
            anyhow::bail!("formant {f} Hz is outside 0..{} Hz", 0.5 * fs);
        }
    }

    // pole radius from the -3 dB bandwidth
    let radius = (-std::f64::consts::PI * f64::from(args.bandwidth) / fs).exp();
    let formants = [
        (f64::from(args.f1) / fs, radius),
        (f64::from(args.f2) / fs, radius),
    ];
    let a_true = formant_predictor(&formants);

    let mut x = vec![0.0f32; args.length];
    NoiseGen::new(args.seed).unoise(&mut x);
    let mut state = [0.0f64; 4];
    lpdsynth(&mut x, &a_true, &mut state);
    tracing::info!(order, length = args.length, radius, "analysing formant signal");

    println!(
        "Formant signal: {} Hz and {} Hz, bandwidth {} Hz, {} Hz sample rate",
        args.f1, args.f2, args.bandwidth, config.sample_rate
    );
    println!("{}", SignalStats::of(&x));

    let mut rm = vec![0.0f32; order + 1];
    bacorr(&mut rm, &x);
    let mut a = vec![0.0f64; order + 1];
    let mut k = vec![0.0f64; order];
    let prediction = lp_durbin(&mut a, &mut k, &rm).context("Levinson-Durbin recursion failed")?;

    println!();
    println!("Order {order} prediction:");
    println!("  max |k|:        {:.4}", prediction.max_reflection);
    println!("  residual ratio: {:.5}", prediction.residual_ratio);
    println!();
    println!("  {:>3} {:>12} {:>12}", "i", "a[i]", "k[i]");
    for i in 0..order {
        println!("  {:>3} {:>12.6} {:>12.6}", i + 1, a[i + 1], k[i]);
    }

    let mut lsf = vec![0.0f32; order];
    let mut fft = FftProcessor::new();
    lpc_to_lsf(&mut lsf, &a, grid, &mut fft)
        .with_context(|| format!("no LSF on a grid of {grid}"))?;

    println!();
    println!("Line spectral frequencies:");
    for pair in lsf.chunks(2) {
        let lo = f64::from(pair[0]) * fs;
        let hi = f64::from(pair[1]) * fs;
        println!("  {lo:>9.1} Hz {hi:>9.1} Hz  (gap {:.1} Hz)", hi - lo);
    }
    Ok(())
}

//! Fundamental frequency detection on a synthetic tone.

use std::path::PathBuf;

use clap::Args;
use icst_analysis::{Normalization, PitchDetector};
use icst_core::vector::{NoiseGen, mac, sine};

use super::common::{SignalStats, load_config};

const SCHEMES: [(&str, Normalization); 4] = [
    ("mcleod", Normalization::McLeod),
    ("cauchy-schwarz", Normalization::CauchySchwarz),
    ("biased-cauchy-schwarz", Normalization::BiasedCauchySchwarz),
    ("yin", Normalization::Yin),
];

#[derive(Args)]
pub struct PitchArgs {
    /// Fundamental of the test tone in Hz
    #[arg(short, long, default_value = "220.0")]
    freq: f32,

    /// Number of harmonics, with 1/n amplitudes
    #[arg(long, default_value = "8")]
    harmonics: usize,

    /// Amplitude of added uniform noise
    #[arg(long, default_value = "0.0")]
    noise: f32,

    /// Noise seed
    #[arg(long, default_value = "1")]
    seed: u32,

    /// Analysis configuration (TOML); sets sample rate and frame size
    #[arg(short, long)]
    config: Option<PathBuf>,
}

/// Harmonic tone with `1/n` amplitudes plus uniform noise.
fn test_tone(args: &PitchArgs, size: usize, sample_rate: f32) -> Vec<f32> {
    let mut tone = vec![0.0f32; size];
    let mut partial = vec![0.0f32; size];
    // sine spans its periods over size - 1 steps
    let steps = size.saturating_sub(1) as f32;
    let periods = args.freq * steps / sample_rate;
    for n in 1..=args.harmonics {
        let k = n as f32;
        // stop at the Nyquist frequency
        if 2.0 * k * periods >= steps {
            break;
        }
        sine(&mut partial, k * periods, 0.0, false);
        mac(&mut tone, &partial, 1.0 / k);
    }
    if args.noise > 0.0 {
        NoiseGen::new(args.seed).unoise(&mut partial);
        mac(&mut tone, &partial, args.noise);
    }
    tone
}

pub fn run(args: PitchArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    let size = config.pitch.size;
    let fs = config.sample_rate;
    if !(args.freq > 0.0 && args.freq < 0.5 * fs) {
        anyhow::bail!("frequency {} Hz is outside 0..{} Hz", args.freq, 0.5 * fs);
    }

    let tone = test_tone(&args, size, fs);
    tracing::info!(size, fs, freq = args.freq, "analysing test tone");

    println!(
        "Test tone: {} Hz, {} harmonics, noise {}, {} samples at {} Hz",
        args.freq, args.harmonics, args.noise, size, fs
    );
    println!("{}", SignalStats::of(&tone));
    println!();
    println!("  {:<24} {:>12} {:>10}", "scheme", "frequency", "tonality");

    let mut detector = PitchDetector::new(size);
    for (name, scheme) in SCHEMES {
        let (f, tonality) = detector.detect(&tone, scheme);
        let marker = if scheme == config.pitch.scheme { "*" } else { " " };
        println!(
            "{marker} {:<24} {:>9.2} Hz {:>10.3}",
            name,
            f * fs,
            tonality
        );
    }
    Ok(())
}

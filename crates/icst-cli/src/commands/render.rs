//! Oscillator, envelope and filter rendering.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use icst_analysis::{Normalization, PitchDetector};
use icst_core::vector::mul_vec;
use icst_synth::{
    ChambFilter, Effect, Envelope, EnvelopeEvent, EnvelopeParam, EnvelopePreset, FilterMode, FmOsc,
    Mix, VaOsc, VaShape, WaveOsc,
};
use serde::{Deserialize, Serialize};

use super::common::SignalStats;

/// Oscillator feeding the render chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OscKind {
    /// Band-limited wavetable sawtooth
    Wave,
    /// Alias suppressed sawtooth
    Saw,
    /// Alias suppressed pulse
    Pulse,
    /// Two operator FM
    Fm,
}

/// Render settings, loadable from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub oscillator: OscKind,
    pub sample_rate: f32,
    /// Oscillator range in Hz.
    pub min_pitch: f32,
    pub max_pitch: f32,
    /// Pitch control in `0..=1`, exponential across the range.
    pub pitch: f32,
    pub duration: f32,
    /// Gate length as a share of the duration.
    pub gate: f32,
    pub block: usize,
    /// Normalized segment times.
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    /// Normalized filter cutoff and resonance.
    pub cutoff: f32,
    pub resonance: f32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            oscillator: OscKind::Wave,
            sample_rate: 48000.0,
            min_pitch: 27.5,
            max_pitch: 3520.0,
            pitch: 0.5,
            duration: 1.0,
            gate: 0.7,
            block: 64,
            attack: 0.3,
            decay: 0.5,
            sustain: 0.6,
            release: 0.5,
            cutoff: 0.7,
            resonance: 0.3,
        }
    }
}

impl RenderSettings {
    fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    fn validate(&self) -> anyhow::Result<()> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            anyhow::bail!("sample rate must be positive");
        }
        if !(self.min_pitch > 0.0 && self.min_pitch < self.max_pitch) {
            anyhow::bail!(
                "pitch range {}..{} Hz is empty",
                self.min_pitch,
                self.max_pitch
            );
        }
        if !(self.duration.is_finite() && self.duration > 0.0) || self.block == 0 {
            anyhow::bail!("duration and block size must be positive");
        }
        Ok(())
    }

    /// Oscillator frequency in Hz.
    fn frequency(&self) -> f32 {
        self.min_pitch * (self.max_pitch / self.min_pitch).powf(self.pitch.clamp(0.0, 1.0))
    }
}

#[derive(Args)]
pub struct RenderArgs {
    /// Settings file (TOML); flags override its values
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Oscillator
    #[arg(long, value_enum)]
    osc: Option<OscKind>,

    /// Pitch control in 0..1
    #[arg(short, long)]
    pitch: Option<f32>,

    /// Duration in seconds
    #[arg(short, long)]
    duration: Option<f32>,

    /// Block size in samples
    #[arg(short, long)]
    block: Option<usize>,

    /// Filter cutoff in 0..1
    #[arg(long)]
    cutoff: Option<f32>,

    /// Print the effective settings as TOML
    #[arg(long)]
    show_settings: bool,
}

impl RenderArgs {
    fn settings(&self) -> anyhow::Result<RenderSettings> {
        let mut settings = match &self.settings {
            Some(path) => RenderSettings::load(path)?,
            None => RenderSettings::default(),
        };
        if let Some(osc) = self.osc {
            settings.oscillator = osc;
        }
        if let Some(pitch) = self.pitch {
            settings.pitch = pitch;
        }
        if let Some(duration) = self.duration {
            settings.duration = duration;
        }
        if let Some(block) = self.block {
            settings.block = block;
        }
        if let Some(cutoff) = self.cutoff {
            settings.cutoff = cutoff;
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// The oscillator of a render, with its scratch buffers.
enum Source {
    Wave(Box<WaveOsc>),
    Va(VaOsc),
    Fm {
        modulator: FmOsc,
        carrier: FmOsc,
        pm: Vec<i32>,
    },
}

impl Source {
    fn new(settings: &RenderSettings) -> Self {
        let (max, min, fs) = (settings.max_pitch, settings.min_pitch, settings.sample_rate);
        match settings.oscillator {
            OscKind::Wave => {
                let mut osc = WaveOsc::new(2048, 2, max, min, fs);
                let saw: Vec<f32> = (1..1024).flat_map(|k| [0.0, -1.0 / k as f32]).collect();
                osc.load_table(&saw, 0);
                osc.load_table(&saw[..2], 1);
                Self::Wave(Box::new(osc))
            }
            OscKind::Saw | OscKind::Pulse => {
                let mut osc = VaOsc::new(max, min, fs);
                if settings.oscillator == OscKind::Pulse {
                    osc.set_shape(VaShape::Pulse);
                }
                Self::Va(osc)
            }
            OscKind::Fm => Self::Fm {
                modulator: FmOsc::new(max, min, fs),
                carrier: FmOsc::new(max, min, fs),
                pm: vec![0; settings.block],
            },
        }
    }

    fn render(&mut self, out: &mut [f32], pitch: f32, zero: &[i32]) {
        match self {
            Self::Wave(osc) => osc.update(out, pitch, 0.0, 0.0, zero),
            Self::Va(osc) => osc.update(out, pitch, 0.3, zero),
            Self::Fm {
                modulator,
                carrier,
                pm,
            } => {
                let pm = &mut pm[..out.len()];
                modulator.update_modulator(pm, pitch, 0.08, 0.2, zero, Mix::Replace);
                carrier.update_carrier(out, pitch, 1.0, 0.0, pm, Mix::Replace);
            }
        }
    }
}

/// Render the chain: oscillator, envelope, Chamberlin lowpass.
fn render(settings: &RenderSettings) -> Vec<f32> {
    let total = (settings.duration * settings.sample_rate) as usize;
    let gate = (settings.gate.clamp(0.0, 1.0) * total as f32) as usize;

    let mut source = Source::new(settings);
    let mut env = Envelope::new(4.0 * settings.sample_rate, 1.0, 4);
    env.preset(EnvelopePreset::Adsr);
    env.set_param(0, EnvelopeParam::Time(settings.attack));
    env.set_param(1, EnvelopeParam::Time(settings.decay));
    env.set_param(1, EnvelopeParam::Level(settings.sustain));
    env.set_param(2, EnvelopeParam::Time(settings.release));
    env.event(EnvelopeEvent::KeyDown);

    let mut filter = ChambFilter::new();
    filter.prepare(settings.sample_rate, settings.block);
    filter.set_mode(FilterMode::Lowpass);
    filter.set_frequency(settings.cutoff);
    filter.set_resonance(settings.resonance);

    let zero = vec![0i32; settings.block];
    let mut gain = vec![0.0f32; settings.block];
    let mut out = vec![0.0f32; total];
    let mut start = 0;
    let mut released = false;
    for block in out.chunks_mut(settings.block) {
        // key up lands on the first block boundary past the gate
        if !released && start >= gate {
            env.event(EnvelopeEvent::KeyUp);
            released = true;
        }
        let n = block.len();
        source.render(block, settings.pitch, &zero[..n]);
        env.update(&mut gain[..n], 0.0, 1.0);
        mul_vec(block, &gain[..n]);
        filter.process_in_place(block);
        start += n;
    }
    out
}

pub fn run(args: RenderArgs) -> anyhow::Result<()> {
    let settings = args.settings()?;
    if args.show_settings {
        println!("{}", toml::to_string_pretty(&settings)?);
    }

    tracing::info!(osc = ?settings.oscillator, block = settings.block, "rendering");
    let out = render(&settings);

    println!(
        "Rendered {:?} at {:.1} Hz for {} s in blocks of {}",
        settings.oscillator,
        settings.frequency(),
        settings.duration,
        settings.block
    );
    println!("{}", SignalStats::of(&out));

    // fundamental of a frame from the sustained part
    let size = 4096.min(out.len().next_power_of_two() / 2).max(4);
    let frame_start = (out.len() / 4).min(out.len().saturating_sub(size));
    if let Some(frame) = out.get(frame_start..frame_start + size) {
        let mut detector = PitchDetector::new(size);
        let (f, tonality) = detector.detect(frame, Normalization::McLeod);
        println!(
            "  pitch:   {:.1} Hz (tonality {:.2})",
            f * settings.sample_rate,
            tonality
        );
    }
    Ok(())
}

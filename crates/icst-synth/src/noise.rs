//! White and pink noise source.

use crate::effect::Effect;
use icst_core::vector::NoiseGen;
use std::sync::atomic::{AtomicU32, Ordering};

static SEED: AtomicU32 = AtomicU32::new(0x1f12_3bb5);

/// Noise spectrum.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NoiseKind {
    /// Uniform white noise in `[-1, 1)`.
    #[default]
    White,
    /// Pink noise, flat to ±0.3 dB per octave from 0.00045 to 0.45 fs.
    Pink,
}

/// Noise generator. Both kinds have an RMS amplitude of about 0.577.
///
/// # Example
///
/// ```rust
/// use icst_synth::{Noise, NoiseKind};
///
/// let mut noise = Noise::with_kind(NoiseKind::Pink);
/// let mut out = [0.0f32; 256];
/// noise.render(&mut out);
/// assert!(out.iter().any(|&x| x != 0.0));
/// ```
#[derive(Debug, Clone)]
pub struct Noise {
    rng: NoiseGen,
    kind: NoiseKind,
    s: [f32; 3],
}

impl Default for Noise {
    fn default() -> Self {
        Self::new()
    }
}

impl Noise {
    /// White noise generator.
    pub fn new() -> Self {
        Self::with_kind(NoiseKind::White)
    }

    /// Generator of the given kind.
    pub fn with_kind(kind: NoiseKind) -> Self {
        Self {
            rng: NoiseGen::new(SEED.fetch_add(0x6c07_8965, Ordering::Relaxed)),
            kind,
            s: [0.0; 3],
        }
    }

    /// Change the spectrum. Takes effect with the next block.
    pub fn set_kind(&mut self, kind: NoiseKind) {
        self.kind = kind;
    }

    /// Current spectrum.
    pub fn kind(&self) -> NoiseKind {
        self.kind
    }

    /// Fill `out` with noise.
    pub fn render(&mut self, out: &mut [f32]) {
        self.rng.unoise(out);
        if self.kind == NoiseKind::Pink {
            let [mut s1, mut s2, mut s3] = self.s;
            for y in out.iter_mut() {
                let x = *y + 2.479_309 * s1 - 1.985_012_7 * s2 + 0.505_600_4 * s3;
                *y = 0.577_35 * x - 1.093_526 * s1 + 0.553_428 * s2 - 0.035_872 * s3;
                s3 = s2;
                s2 = s1;
                s1 = x;
            }
            self.s = [s1, s2, s3];
        }
    }
}

impl Effect for Noise {
    /// Overwrites `data`; the input is ignored.
    fn process_in_place(&mut self, data: &mut [f32]) {
        self.render(data);
    }

    fn process_block(&mut self, _input: &[f32], output: &mut [f32]) {
        self.render(output);
    }
}

//! Ring modulation, audio-to-phase-modulation conversion and the Hilbert
//! transformer.

use crate::denormal::OffsetPairs;
use crate::effect::Effect;
use icst_core::ANTI_DENORMAL;
use icst_core::fast_math::fdtoi_f64;
use libm::{cosf, sinf};

/// Ring modulator with a zero at fs/2 on both inputs, a correction
/// postfilter and a 5 Hz DC trap.
///
/// # Example
///
/// ```rust
/// use icst_synth::RingMod;
///
/// let mut ring = RingMod::new();
/// let carrier = [1.0f32; 64];
/// let signal = [0.5f32; 64];
/// let mut out = [0.0f32; 64];
/// ring.process_two(&carrier, &signal, &mut out);
/// assert!(out[63] > 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct RingMod {
    in1d: f32,
    in2d: f32,
    od: f32,
    dc: f32,
    a: f32,
    adn: OffsetPairs,
}

impl Default for RingMod {
    fn default() -> Self {
        Self::new()
    }
}

impl RingMod {
    /// Ring modulator prepared for 48 kHz.
    pub fn new() -> Self {
        let mut ring = Self {
            in1d: 0.0,
            in2d: 0.0,
            od: 0.0,
            dc: 0.0,
            a: 0.0,
            adn: OffsetPairs::new(),
        };
        ring.set_sample_rate(48000.0);
        ring
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.a = 31.4 / sample_rate.max(62.8);
    }

    #[inline]
    fn step(&mut self, x1: f32, x2: f32, adn: f32) -> f32 {
        self.od = 0.416_666_66 * (x1 + self.in1d) * (x2 + self.in2d) - 0.666_666_7 * self.od + adn;
        self.in1d = x1;
        self.in2d = x2;
        let y = self.od - self.dc;
        self.dc += self.a * y;
        y
    }

    /// Multiply `in1` by `in2` into `out`.
    ///
    /// # Panics
    ///
    /// Panics if `in1` or `in2` is shorter than `out`.
    pub fn process_two(&mut self, in1: &[f32], in2: &[f32], out: &mut [f32]) {
        let adn = self.adn.next_pair();
        for (i, y) in out.iter_mut().enumerate() {
            *y = self.step(in1[i], in2[i], adn[i & 1]);
        }
    }
}

impl Effect for RingMod {
    fn prepare(&mut self, sample_rate: f32, _block_size: usize) {
        self.set_sample_rate(sample_rate);
    }

    /// Modulates the signal with itself.
    fn process_in_place(&mut self, data: &mut [f32]) {
        let adn = self.adn.next_pair();
        for (i, y) in data.iter_mut().enumerate() {
            *y = self.step(*y, *y, adn[i & 1]);
        }
    }
}

/// Converts audio in `-1..=1` to a phase modulation signal.
///
/// The input passes a first-order lowpass with an extra zero at fs/2 and is
/// scaled so that full level spans ±2^34 accumulator units (±4 periods),
/// wrapped to `i32`.
#[derive(Debug, Clone)]
pub struct AudioToPm {
    c1: f32,
    c2: f32,
    pmi: f32,
    s1: f32,
}

impl AudioToPm {
    /// Converter for `sample_rate` with lowpass corner `fc` (at least 5 Hz).
    pub fn new(sample_rate: f32, fc: f32) -> Self {
        let x = if sample_rate > 0.0 {
            core::f32::consts::PI * (fc.max(5.0) / sample_rate).min(0.499)
        } else {
            core::f32::consts::PI * 0.499
        };
        let x = 2.0 * sinf(x) / (sinf(x) + cosf(x));
        Self {
            c1: x * 536_870_912.0,
            c2: 1.0 - x,
            pmi: 0.0,
            s1: 0.0,
        }
    }

    /// Convert `input` into `out`, gliding the modulation depth to `modint`.
    ///
    /// # Panics
    ///
    /// Panics if `input` is shorter than `out`.
    pub fn update(&mut self, input: &[f32], out: &mut [i32], modint: f32) {
        if out.is_empty() {
            return;
        }
        let dpmi = (self.c1 * modint.clamp(1e-8, 1.0) - self.pmi) / out.len() as f32;
        let adn = [ANTI_DENORMAL, -0.28 * ANTI_DENORMAL];
        for (i, y) in out.iter_mut().enumerate() {
            let x = self.pmi * input[i] + self.c2 * self.s1 + adn[i & 1];
            *y = fdtoi_f64(f64::from(x + self.s1)).wrapping_shl(4);
            self.s1 = x;
            self.pmi += dpmi;
        }
    }
}

/// Cascade of second-order allpass sections `y = s₂ - c·x`.
#[derive(Debug, Clone)]
struct AllpassChain<const N: usize> {
    c: [f32; N],
    s: [[f32; 2]; N],
}

impl<const N: usize> AllpassChain<N> {
    const fn new(c: [f32; N]) -> Self {
        Self { c, s: [[0.0; 2]; N] }
    }

    #[inline]
    fn process(&mut self, mut x: f32) -> f32 {
        for (&c, s) in self.c.iter().zip(self.s.iter_mut()) {
            let y = s[1] - c * x;
            s[1] = s[0];
            s[0] = x + c * y;
            x = y;
        }
        x
    }
}

/// Hilbert transformer producing two outputs in quadrature.
///
/// The phase difference stays within 0.017 degrees of 90 for frequencies
/// from 0.00015 to 0.49985 fs.
///
/// # Example
///
/// ```rust
/// use icst_synth::Hilbert;
///
/// let mut hilbert = Hilbert::new();
/// let input: Vec<f32> = (0..2048).map(|i| (0.1 * i as f32).sin()).collect();
/// let mut re = vec![0.0f32; 2048];
/// let mut im = vec![0.0f32; 2048];
/// hilbert.update(&input, &mut re, &mut im);
///
/// // the analytic signal has a constant envelope
/// let envelope = (re[2000] * re[2000] + im[2000] * im[2000]).sqrt();
/// assert!((envelope - 1.0).abs() < 0.02);
/// ```
#[derive(Debug, Clone)]
pub struct Hilbert {
    chain1: AllpassChain<8>,
    chain2: AllpassChain<8>,
    z1: f32,
    adn: OffsetPairs,
}

impl Default for Hilbert {
    fn default() -> Self {
        Self::new()
    }
}

impl Hilbert {
    /// Transformer with cleared state.
    pub fn new() -> Self {
        Self {
            chain1: AllpassChain::new([
                0.999_533_6,
                0.997_023_1,
                0.991_184_05,
                0.975_597_06,
                0.933_889_4,
                0.827_559_4,
                0.590_957_9,
                0.219_852_06,
            ]),
            chain2: AllpassChain::new([
                0.998_478_4,
                0.994_786_06,
                0.985_287_2,
                0.959_716_3,
                0.892_466_6,
                0.729_672_4,
                0.413_200_8,
                0.061_990_08,
            ]),
            z1: 0.0,
            adn: OffsetPairs::new(),
        }
    }

    /// Transform `input` into the in-phase `out1` and quadrature `out2`.
    ///
    /// # Panics
    ///
    /// Panics if the buffers differ in length.
    pub fn update(&mut self, input: &[f32], out1: &mut [f32], out2: &mut [f32]) {
        assert!(input.len() == out1.len() && input.len() == out2.len());
        let adn = self.adn.next_pair();
        for (i, &x) in input.iter().enumerate() {
            let x = x + adn[i & 1];
            out1[i] = self.z1;
            self.z1 = self.chain1.process(x);
            out2[i] = self.chain2.process(x);
        }
    }
}

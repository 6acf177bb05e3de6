//! Virtual analog sawtooth and pulse oscillators.

use super::{PitchMap, glide};
use crate::mailbox::PhaseMailbox;
use crate::shared::SharedTable;
use icst_core::fast_math::fdtoi_f64;
use icst_core::vector::{linear, mul, polyval};
use std::sync::Arc;

const STEP_LEN: usize = 4096;

/// Polynomial for the half step correction around a discontinuity.
const STEP_POLY: [f64; 8] = [
    0.99986, -2.97566, -0.23930, 7.83529, -3.25094, -11.51283, 13.50376, -4.36023,
];

static STEP: SharedTable<Vec<f32>> = SharedTable::new();

fn build_step() -> Vec<f32> {
    let mut tab = vec![0.0f32; STEP_LEN];
    linear(&mut tab, 1.0 / 8192.0, 8191.0 / 8192.0);
    polyval(&mut tab, &STEP_POLY);
    mul(&mut tab, 2_147_483_648.0);
    tab
}

/// Waveform of a [`VaOsc`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VaShape {
    /// Rising sawtooth.
    #[default]
    Saw,
    /// Pulse with variable width and no DC.
    Pulse,
}

/// Alias suppressed sawtooth and pulse oscillator.
///
/// Samples within one period increment of a discontinuity are corrected
/// by a polynomial step residual, and a first-order postfilter flattens the
/// response. The pitch range is limited to `0.0000611..0.333` times the
/// sample rate.
///
/// # Example
///
/// ```rust
/// use icst_synth::{VaOsc, VaShape};
///
/// let mut osc = VaOsc::new(4800.0, 100.0, 48000.0);
/// osc.set_shape(VaShape::Pulse);
/// let mut out = vec![0.0f32; 4800];
/// osc.update(&mut out, 0.0, 0.5, &vec![0; 4800]);
/// let mean = out.iter().sum::<f32>() / out.len() as f32;
/// assert!(mean.abs() < 1e-2);
/// ```
#[derive(Debug)]
pub struct VaOsc {
    table: Arc<Vec<f32>>,
    pitch: PitchMap,
    shape: VaShape,
    phi: i32,
    dphi: i32,
    invf: i32,
    pw: i32,
    prevout: f32,
    fresh: bool,
    mailbox: Arc<PhaseMailbox>,
}

impl VaOsc {
    /// Oscillator covering `minpitch` to `maxpitch` Hz.
    pub fn new(maxpitch: f32, minpitch: f32, sample_rate: f32) -> Self {
        Self {
            table: STEP.acquire(build_step),
            pitch: PitchMap::new(maxpitch, minpitch, sample_rate, 0.000_061_1, 0.333),
            shape: VaShape::Saw,
            phi: 0,
            dphi: 0,
            invf: i32::MAX,
            pw: -1_073_741_824,
            prevout: 0.0,
            fresh: true,
            mailbox: Arc::new(PhaseMailbox::new()),
        }
    }

    /// Waveform from the next block on.
    pub fn set_shape(&mut self, shape: VaShape) {
        self.shape = shape;
    }

    /// Current waveform.
    pub fn shape(&self) -> VaShape {
        self.shape
    }

    /// Request a phase of `phase` periods for the next block.
    pub fn set_phase(&self, phase: f32) {
        self.mailbox.set_phase(phase);
    }

    /// Handle for posting phase resets from another thread.
    pub fn phase_mailbox(&self) -> Arc<PhaseMailbox> {
        Arc::clone(&self.mailbox)
    }

    /// Phase `sphi` with the step residual applied when it lies within
    /// one increment of the wrap point.
    #[inline]
    fn corrected(&self, sphi: i32, invf: i64) -> f32 {
        let mut x = sphi as f32;
        let dist = (sphi.wrapping_sub(i32::MIN) >> 1).abs();
        if self.dphi > dist {
            let idx = ((i64::from(dist) * invf) >> 32).min(131_071) as usize >> 5;
            let r = self.table[idx];
            if x >= 0.0 {
                x -= r;
            } else {
                x += r;
            }
        }
        x
    }

    /// Render `out.len()` samples. `pwidth` in `0..=1` applies to the
    /// pulse shape.
    ///
    /// # Panics
    ///
    /// Panics if `pmod` is shorter than `out`.
    pub fn update(&mut self, out: &mut [f32], pitch: f32, pwidth: f32, pmod: &[i32]) {
        if out.is_empty() {
            return;
        }
        let n = out.len();
        let pmod = &pmod[..n];
        let fresh = core::mem::take(&mut self.fresh);

        let x = self.pitch.increment(pitch);
        let ptarget = fdtoi_f64(f64::from(x));
        let df = glide(&mut self.dphi, ptarget, n, fresh);
        let itarget = fdtoi_f64(562_949_953_421_312.0 / f64::from(x));
        let dinvf = glide(&mut self.invf, itarget, n, fresh);
        if let Some(phi) = self.mailbox.take() {
            self.phi = phi;
        }

        let invf0 = i64::from(self.invf);
        match self.shape {
            VaShape::Saw => {
                for (i, (y, &pm)) in out.iter_mut().zip(pmod).enumerate() {
                    let invf = invf0 + i as i64 * i64::from(dinvf);
                    let x = self.corrected(self.phi.wrapping_add(pm), invf);
                    self.prevout = 7.164_019_8e-10 * x - 0.538_461_5 * self.prevout;
                    *y = self.prevout;
                    self.phi = self.phi.wrapping_add(self.dphi);
                    self.dphi += df;
                }
            }
            VaShape::Pulse => {
                let wtarget = fdtoi_f64(-2_147_483_647.0 * f64::from(pwidth.clamp(0.0, 1.0)));
                let dpw = glide(&mut self.pw, wtarget, n, fresh);
                for (i, (y, &pm)) in out.iter_mut().zip(pmod).enumerate() {
                    let invf = invf0 + i as i64 * i64::from(dinvf);
                    let sphi = self.phi.wrapping_add(pm);
                    let x = self.corrected(sphi, invf);
                    let x2 = self.corrected(self.pw.wrapping_shl(1).wrapping_sub(sphi), invf);
                    self.prevout = 3.582_009_9e-10 * (x + x2) - 0.538_461_5 * self.prevout;
                    *y = self.prevout;
                    self.phi = self.phi.wrapping_add(self.dphi);
                    self.dphi += df;
                    self.pw += dpw;
                }
                self.pw = wtarget;
            }
        }
        self.dphi = ptarget;
        self.invf = itarget;
    }
}

/// Operating range of a [`RawSawOsc`], chosen at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RawSawMode {
    /// Full audio range.
    Audio,
    /// Increments carry 8 extra fractional bits for very slow rates.
    Lfo,
}

/// Naive sawtooth from the raw phase, for modulation and as a test signal.
///
/// A maximum pitch of at most 0.0038 times the sample rate selects
/// [`RawSawMode::Lfo`], which reaches down to 1e-7 times the sample rate.
///
/// # Example
///
/// ```rust
/// use icst_synth::{RawSawMode, RawSawOsc};
///
/// let mut lfo = RawSawOsc::new(10.0, 0.01, 48000.0);
/// assert_eq!(lfo.mode(), RawSawMode::Lfo);
/// let mut out = [0.0f32; 64];
/// lfo.update(&mut out, 0.5, &[0; 64]);
/// assert!(out.windows(2).all(|w| w[1] >= w[0]));
/// ```
#[derive(Debug)]
pub struct RawSawOsc {
    pitch: PitchMap,
    mode: RawSawMode,
    phi: i32,
    dphi: i32,
    fresh: bool,
    mailbox: Arc<PhaseMailbox>,
}

impl RawSawOsc {
    /// Oscillator covering `minpitch` to `maxpitch` Hz.
    pub fn new(maxpitch: f32, minpitch: f32, sample_rate: f32) -> Self {
        let (mode, lo) = if maxpitch.max(minpitch) > 0.0038 * sample_rate {
            (RawSawMode::Audio, 0.000_023)
        } else {
            (RawSawMode::Lfo, 1e-7)
        };
        let mut pitch = PitchMap::new(maxpitch, minpitch, sample_rate, lo, 0.4999);
        if mode == RawSawMode::Lfo {
            pitch.pmin *= 256.0;
        }
        Self {
            pitch,
            mode,
            phi: 0,
            dphi: 0,
            fresh: true,
            mailbox: Arc::new(PhaseMailbox::new()),
        }
    }

    /// Operating range.
    pub fn mode(&self) -> RawSawMode {
        self.mode
    }

    /// Request a phase of `phase` periods for the next block.
    pub fn set_phase(&self, phase: f32) {
        self.mailbox.set_phase(phase);
    }

    /// Handle for posting phase resets from another thread.
    pub fn phase_mailbox(&self) -> Arc<PhaseMailbox> {
        Arc::clone(&self.mailbox)
    }

    /// Render `out.len()` samples in `-1..1`.
    ///
    /// # Panics
    ///
    /// Panics if `pmod` is shorter than `out`.
    pub fn update(&mut self, out: &mut [f32], pitch: f32, pmod: &[i32]) {
        if out.is_empty() {
            return;
        }
        let n = out.len();
        let pmod = &pmod[..n];
        let fresh = core::mem::take(&mut self.fresh);
        let ptarget = self.pitch.target(pitch);
        let df = glide(&mut self.dphi, ptarget, n, fresh);
        if let Some(phi) = self.mailbox.take() {
            self.phi = phi;
        }
        let shift = match self.mode {
            RawSawMode::Audio => 0,
            RawSawMode::Lfo => 8,
        };
        for (y, &pm) in out.iter_mut().zip(pmod) {
            *y = 4.656_612_9e-10 * self.phi.wrapping_add(pm) as f32;
            self.phi = self.phi.wrapping_add(self.dphi >> shift);
            self.dphi += df;
        }
        self.dphi = ptarget;
    }
}

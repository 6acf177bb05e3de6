//! Cosine oscillator for FM synthesis with self feedback.

use super::{Mix, PitchMap, glide};
use crate::mailbox::PhaseMailbox;
use crate::shared::SharedTable;
use icst_core::fast_math::fdtoi_f64;
use std::sync::Arc;

/// Amplitude that scales the table to a peak of one.
const CARRIER_SCALE: f32 = 0.000_061_020_255;

/// Largest stable feedback without audible noise, in accumulator units.
const FEEDBACK_MAX: f32 = 0.63 * 2_147_483_520.0;

const MOD_MAX: f32 = 2_147_483_520.0;

static COSINE: SharedTable<Vec<i16>> = SharedTable::new();

/// Half period of a cosine, 16384 steps, peak 16383.
fn build_cosine() -> Vec<i16> {
    (0..=16384)
        .map(|i| (0.5 + 16383.0 * libm::cosf(core::f32::consts::PI / 16384.0 * i as f32)) as i16)
        .collect()
}

/// Integer cosine oscillator with feedback.
///
/// A carrier renders audio in `-1..=1`. A modulator renders a phase
/// modulation signal wrapped to `i32`, where full amplitude spans ±8
/// periods, ready to feed the `pmod` input of another oscillator.
/// Feedback runs from none at 0 to the largest noise-free amount at 1.
///
/// # Example
///
/// ```rust
/// use icst_synth::{FmOsc, Mix};
///
/// let mut modulator = FmOsc::new(4000.0, 20.0, 48000.0);
/// let mut carrier = FmOsc::new(4000.0, 20.0, 48000.0);
/// let zero = [0i32; 64];
/// let mut pm = [0i32; 64];
/// let mut out = [0.0f32; 64];
/// modulator.update_modulator(&mut pm, 0.5, 0.1, 0.0, &zero, Mix::Replace);
/// carrier.update_carrier(&mut out, 0.5, 1.0, 0.0, &pm, Mix::Replace);
/// assert!(out.iter().all(|x| x.abs() <= 1.0));
/// ```
#[derive(Debug)]
pub struct FmOsc {
    table: Arc<Vec<i16>>,
    pitch: PitchMap,
    phi: i32,
    dphi: i32,
    ampl: i32,
    fampl: f32,
    fb: i32,
    tval: i32,
    fresh: bool,
    mailbox: Arc<PhaseMailbox>,
}

impl FmOsc {
    /// Oscillator covering `minpitch` to `maxpitch` Hz.
    pub fn new(maxpitch: f32, minpitch: f32, sample_rate: f32) -> Self {
        Self {
            table: COSINE.acquire(build_cosine),
            pitch: PitchMap::new(maxpitch, minpitch, sample_rate, 0.000_023, 0.4999),
            phi: 0,
            dphi: 0,
            ampl: 0,
            fampl: 0.0,
            fb: 0,
            tval: 0,
            fresh: true,
            mailbox: Arc::new(PhaseMailbox::new()),
        }
    }

    /// Request a phase of `phase` periods for the next block.
    pub fn set_phase(&self, phase: f32) {
        self.mailbox.set_phase(phase);
    }

    /// Handle for posting phase resets from another thread.
    pub fn phase_mailbox(&self) -> Arc<PhaseMailbox> {
        Arc::clone(&self.mailbox)
    }

    /// Glide steps for pitch and feedback; applies a pending phase reset.
    fn begin(
        &mut self,
        samples: usize,
        pitch: f32,
        fbk: f32,
        fresh: bool,
    ) -> (i32, i32, i32, i32) {
        let ptarget = self.pitch.target(pitch);
        let df = glide(&mut self.dphi, ptarget, samples, fresh);
        let fbtarget = fdtoi_f64(f64::from(FEEDBACK_MAX * fbk.clamp(0.0, 1.0)));
        let dfb = glide(&mut self.fb, fbtarget, samples, fresh);
        if let Some(phi) = self.mailbox.take() {
            self.phi = phi;
            self.tval = 0;
        }
        (ptarget, df, fbtarget, dfb)
    }

    #[inline]
    fn lookup(table: &[i16], phi: i32, pm: i32, fb: i32, tval: i32) -> i32 {
        let j = phi.wrapping_add(pm).wrapping_add((fb >> 15).wrapping_mul(tval));
        i32::from(table[(j >> 17).unsigned_abs() as usize])
    }

    /// Render audio with amplitude `amp` in `0..=1`.
    ///
    /// # Panics
    ///
    /// Panics if `pmod` is shorter than `out`.
    pub fn update_carrier(
        &mut self,
        out: &mut [f32],
        pitch: f32,
        amp: f32,
        fbk: f32,
        pmod: &[i32],
        mix: Mix,
    ) {
        if out.is_empty() {
            return;
        }
        let n = out.len();
        let pmod = &pmod[..n];
        let fresh = core::mem::take(&mut self.fresh);
        let (ptarget, df, fbtarget, dfb) = self.begin(n, pitch, fbk, fresh);
        let atarget = CARRIER_SCALE * amp.clamp(1e-8, 1.0);
        if fresh {
            self.fampl = atarget;
        }
        let dampl = (atarget - self.fampl) / n as f32;

        let table = &self.table;
        let (mut phi, mut dphi, mut fb) = (self.phi, self.dphi, self.fb);
        let (mut tval, mut fampl) = (self.tval, self.fampl);
        for (y, &pm) in out.iter_mut().zip(pmod) {
            tval = Self::lookup(table, phi, pm, fb, tval);
            let x = fampl * tval as f32;
            match mix {
                Mix::Replace => *y = x,
                Mix::Add => *y += x,
            }
            phi = phi.wrapping_add(dphi);
            dphi += df;
            fb += dfb;
            fampl += dampl;
        }
        self.phi = phi;
        self.tval = tval;
        self.dphi = ptarget;
        self.fb = fbtarget;
        self.fampl = atarget;
    }

    /// Render a phase modulation signal with depth `amp` in `0..=1`.
    ///
    /// # Panics
    ///
    /// Panics if `pmod` is shorter than `out`.
    pub fn update_modulator(
        &mut self,
        out: &mut [i32],
        pitch: f32,
        amp: f32,
        fbk: f32,
        pmod: &[i32],
        mix: Mix,
    ) {
        if out.is_empty() {
            return;
        }
        let n = out.len();
        let pmod = &pmod[..n];
        let fresh = core::mem::take(&mut self.fresh);
        let (ptarget, df, fbtarget, dfb) = self.begin(n, pitch, fbk, fresh);
        let atarget = fdtoi_f64(f64::from(MOD_MAX * amp.clamp(0.0, 1.0)));
        let dampl = glide(&mut self.ampl, atarget, n, fresh);

        let table = &self.table;
        let (mut phi, mut dphi, mut fb) = (self.phi, self.dphi, self.fb);
        let (mut tval, mut ampl) = (self.tval, self.ampl);
        for (y, &pm) in out.iter_mut().zip(pmod) {
            tval = Self::lookup(table, phi, pm, fb, tval);
            let x = (ampl >> 10).wrapping_mul(tval);
            match mix {
                Mix::Replace => *y = x,
                Mix::Add => *y = y.wrapping_add(x),
            }
            phi = phi.wrapping_add(dphi);
            dphi += df;
            fb += dfb;
            ampl += dampl;
        }
        self.phi = phi;
        self.tval = tval;
        self.dphi = ptarget;
        self.fb = fbtarget;
        self.ampl = atarget;
    }
}

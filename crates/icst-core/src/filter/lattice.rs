//! Linear prediction analysis and synthesis filters.
//!
//! The predictor polynomial is `A(z) = 1 + a[1]·z⁻¹ + ... + a[order]·z⁻order`.
//! Analysis whitens a signal with `A(z)`; synthesis restores it with
//! `1/A(z)`, given either as direct coefficients, reflection coefficients
//! (lattice) or line spectral frequencies.
//!
//! # Real-time Safety
//!
//! [`lpssynth`] and [`lpssynth_glide`] allocate one coefficient set per call.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::PI;

use libm::{cos, sin};

use super::fir::fir_f64;
use super::iir::iir;
use crate::math::ANTI_DENORMAL;

#[inline]
fn flush(x: f64) -> f64 {
    if x.abs() < f64::from(ANTI_DENORMAL) { 0.0 } else { x }
}

/// Prediction error filter: replaces `d` by its LPC residual.
///
/// `c` holds the previous `order` inputs (start with zeros).
pub fn lpanalyze(d: &mut [f32], a: &[f64], c: &mut [f32]) {
    fir_f64(d, a, c);
}

/// Restores a signal from its LPC residual with a direct form filter.
///
/// `c` holds the previous `order` outputs (start with zeros).
pub fn lpdsynth(d: &mut [f32], a: &[f64], c: &mut [f64]) {
    iir(d, a, c);
}

/// Restores a signal from its LPC residual with a lattice filter driven by
/// the reflection coefficients `k[..order]`.
///
/// `c` holds `order` lattice states (start with zeros).
pub fn lplsynth(d: &mut [f32], k: &[f64], c: &mut [f64]) {
    let Some(last) = k.len().checked_sub(1) else {
        return;
    };
    debug_assert!(c.len() >= k.len());
    for x in d.iter_mut() {
        let mut acc = f64::from(*x) - k[last] * c[last];
        for j in (0..last).rev() {
            acc -= k[j] * c[j];
            c[j + 1] = c[j] + k[j] * acc;
        }
        let acc = flush(acc);
        c[0] = acc;
        *x = acc as f32;
    }
}

/// [`lplsynth`] with reflection coefficients gliding linearly from
/// `k_start` at the first sample to `k_end` at the last.
///
/// Blocks shorter than two samples use the midpoint set.
pub fn lplsynth_glide(d: &mut [f32], k_start: &[f64], k_end: &[f64], c: &mut [f64]) {
    let order = k_start.len();
    debug_assert_eq!(order, k_end.len());
    if order == 0 {
        return;
    }
    debug_assert!(c.len() >= order);
    let last = order - 1;
    let n = d.len();
    let scl = if n < 2 { 0.0 } else { 1.0 / (n - 1) as f64 };
    let k_at = |j: usize, t: f64| {
        if n < 2 {
            0.5 * (k_start[j] + k_end[j])
        } else {
            k_start[j] + t * (k_end[j] - k_start[j])
        }
    };
    for (i, x) in d.iter_mut().enumerate() {
        let t = scl * i as f64;
        let mut acc = f64::from(*x) - k_at(last, t) * c[last];
        for j in (0..last).rev() {
            let kj = k_at(j, t);
            acc -= kj * c[j];
            c[j + 1] = c[j] + kj * acc;
        }
        let acc = flush(acc);
        c[0] = acc;
        *x = acc as f32;
    }
}

/// Unit phasor of one line spectral frequency and its per-sample rotation.
#[derive(Clone, Copy)]
struct Rotor {
    re: f64,
    im: f64,
    step_re: f64,
    step_im: f64,
}

impl Rotor {
    fn new(f: f32, step: f64) -> Self {
        let w = 2.0 * PI * f64::from(f);
        Self {
            re: cos(w),
            im: sin(w),
            step_re: cos(2.0 * PI * step),
            step_im: sin(2.0 * PI * step),
        }
    }

    #[inline]
    fn advance(&mut self) {
        let re = self.re * self.step_re - self.im * self.step_im;
        self.im = self.re * self.step_im + self.im * self.step_re;
        self.re = re;
    }
}

/// Restores a signal from its LPC residual with a filter parameterized by
/// the line spectral frequencies `f[..order]` (relative to the sample rate,
/// ascending, `order` even).
///
/// `c` holds `2·order + 1` states (start with zeros).
pub fn lpssynth(d: &mut [f32], f: &[f32], c: &mut [f64]) {
    let rotors: Vec<Rotor> = f.iter().map(|&x| Rotor::new(x, 0.0)).collect();
    lsf_kernel(d, rotors, c, false);
}

/// [`lpssynth`] with line spectral frequencies gliding linearly from
/// `f_start` at the first sample to `f_end` at the last.
///
/// Blocks shorter than two samples use the midpoint set.
pub fn lpssynth_glide(d: &mut [f32], f_start: &[f32], f_end: &[f32], c: &mut [f64]) {
    debug_assert_eq!(f_start.len(), f_end.len());
    let rotors: Vec<Rotor> = if d.len() < 2 {
        f_start
            .iter()
            .zip(f_end)
            .map(|(&s, &e)| Rotor::new(0.5 * (s + e), 0.0))
            .collect()
    } else {
        let scl = 1.0 / (d.len() - 1) as f64;
        f_start
            .iter()
            .zip(f_end)
            .map(|(&s, &e)| Rotor::new(s, scl * f64::from(e - s)))
            .collect()
    };
    lsf_kernel(d, rotors, c, d.len() >= 2);
}

// Cascade of second order sections per LSF pair. c[0] is the feedback
// sample, c[1 + 4p..5 + 4p] the two states of each branch of pair p.
fn lsf_kernel(d: &mut [f32], mut rotors: Vec<Rotor>, c: &mut [f64], glide: bool) {
    let order = rotors.len();
    debug_assert!(order % 2 == 0);
    debug_assert!(c.len() > 2 * order);
    for s in d.iter_mut() {
        let (mut x, mut y) = (c[0], c[0]);
        let mut z = 0.0;
        for (p, pair) in rotors.chunks_exact_mut(2).enumerate() {
            let i = 1 + 4 * p;
            let t = c[i] - 2.0 * x * pair[0].re;
            c[i] = x;
            z += t;
            x += c[i + 2];
            c[i + 2] = t;
            let t = c[i + 1] - 2.0 * y * pair[1].re;
            c[i + 1] = y;
            z += t;
            y += c[i + 3];
            c[i + 3] = t;
            if glide {
                pair[0].advance();
                pair[1].advance();
            }
        }
        let out = flush(f64::from(*s) + z + x - y);
        c[0] = -0.5 * out;
        *s = out as f32;
    }
}

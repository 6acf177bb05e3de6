//! Frame and sample features: envelope followers, zero crossings, spectral
//! shape, flux and transient detectors.
//!
//! Spectral features take a half spectrum as produced by
//! [`SpectralAnalyzer`](crate::spectrum::SpectralAnalyzer). Stateful
//! features carry their continuation data in caller-owned state, zeroed
//! before the first call.

use icst_core::math::ANTI_DENORMAL;
use icst_core::vector::{dotp, gmean, mean, norm};

/// What an [`envelope`] follower tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeKind {
    /// Absolute value.
    #[default]
    Absolute,
    /// Power.
    Power,
    /// Square root of the followed power.
    Rms,
}

/// Attack/release envelope follower.
///
/// `atime` and `rtime` are time constants in samples; the coefficient
/// `1/time` approximates `1 - e^(-1/time)`. `c` carries the follower state.
pub fn envelope(d: &[f32], r: &mut [f32], c: &mut f32, atime: f32, rtime: f32, kind: EnvelopeKind) {
    debug_assert_eq!(d.len(), r.len());
    let a = 1.0 / atime.max(1.0);
    let rel = 1.0 / rtime.max(1.0);
    let mut step = |x: f32| {
        let k = if x > *c { a } else { rel };
        *c += k * (x - *c);
        *c
    };
    match kind {
        EnvelopeKind::Absolute => {
            for (y, &x) in r.iter_mut().zip(d) {
                *y = step(x.abs() + ANTI_DENORMAL);
            }
        }
        EnvelopeKind::Power => {
            for (y, &x) in r.iter_mut().zip(d) {
                *y = step(x * x + ANTI_DENORMAL);
            }
        }
        EnvelopeKind::Rms => {
            for (y, &x) in r.iter_mut().zip(d) {
                *y = step(x * x + ANTI_DENORMAL * ANTI_DENORMAL).sqrt();
            }
        }
    }
}

/// Zero crossings per sample, located by linear interpolation.
///
/// `c` holds the last sample of the previous block so a crossing at the
/// block boundary counts. Returns 0 when fewer than two crossings are seen.
pub fn zerocross(d: &[f32], c: &mut f32) -> f32 {
    let size = d.len();
    if size == 0 {
        return 0.0;
    }
    let crossing = |i: usize| i as f32 + d[i] / (d[i - 1] - d[i]);

    let mut i = 1;
    let start = if *c * d[0] < 0.0 {
        Some(d[0] / (*c - d[0]))
    } else {
        let mut first = None;
        while i < size {
            let hit = d[i - 1] * d[i] < 0.0;
            i += 1;
            if hit {
                first = Some(crossing(i - 1));
                break;
            }
        }
        first
    };

    let (mut count, mut last) = (0usize, 0usize);
    if start.is_some() {
        for j in i..size {
            if d[j - 1] * d[j] < 0.0 {
                last = j;
                count += 1;
            }
        }
    }
    *c = d[size - 1];
    match start {
        Some(start) if count > 0 => count as f32 / (crossing(last) - start),
        _ => 0.0,
    }
}

/// Spectral flatness of the power spectrum `d` between `f1` and `f2`
/// (relative to the sample rate, either order).
///
/// Geometric over arithmetic mean: 0 for pure tones, 1 for white noise and
/// for a silent band.
pub fn spectral_flatness(d: &[f32], f1: f32, f2: f32) -> f32 {
    let size = d.len();
    let dsize = 2.0 * size as f32;
    let bin = |f: f32| ((f * dsize + 0.5) as usize).clamp(1, size - 1);
    let (lo, hi) = (bin(f1.min(f2)), bin(f1.max(f2)));
    let band = &d[lo..=hi];
    let mari = mean(band);
    if mari >= f32::MIN_POSITIVE {
        gmean(band) / mari
    } else {
        1.0
    }
}

/// Upper cutoff frequency: the frequency below which the fraction `pth` of
/// the power in `d[1..]` lies.
///
/// 0.5 gives the cutoff of a first order lowpass, 0.95 the perceived upper
/// band limit. Returns 0 for silence.
pub fn ufc(d: &[f32], pth: f32) -> f32 {
    let size = d.len();
    let plim = pth * d[1..].iter().sum::<f32>();
    if plim < f32::MIN_POSITIVE {
        return 0.0;
    }
    let mut x = 0.0f32;
    for i in 1..size {
        x += d[i];
        if x > plim {
            let k = i as f32 + 0.5 + (plim - x) / d[i];
            return k * 0.5 / size as f32;
        }
    }
    0.5
}

/// Lower cutoff frequency: the frequency above which the fraction `pth` of
/// the power in `d[1..]` lies. Returns 0.5 for silence.
pub fn lfc(d: &[f32], pth: f32) -> f32 {
    let size = d.len();
    let plim = pth * d[1..].iter().sum::<f32>();
    if plim < f32::MIN_POSITIVE {
        return 0.5;
    }
    let mut x = 0.0f32;
    for i in (1..size).rev() {
        x += d[i];
        if x > plim {
            let k = i as f32 - 0.5 + (x - plim) / d[i];
            return k * 0.5 / size as f32;
        }
    }
    0.0
}

/// Spectral flux against the previous frame, independent of level.
///
/// Returns 0 for identical and 1 for orthogonal spectral shapes. With
/// magnitude spectra weaker components weigh in; with power spectra changes
/// of the strong ones dominate. `c` (same length as `d`) carries the
/// previous frame.
pub fn spectral_flux(d: &[f32], c: &mut [f32]) -> f32 {
    debug_assert_eq!(d.len(), c.len());
    let n = norm(&d[1..]);
    let x = n * c[0];
    c[0] = n;
    let flux = if x >= f32::MIN_POSITIVE {
        (1.0 - dotp(&c[1..], &d[1..]) / x).abs().sqrt()
    } else {
        0.0
    };
    c[1..].copy_from_slice(&d[1..]);
    flux
}

/// State of [`transamp`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransientState {
    fast: f32,
    slow: f32,
    hold: f32,
}

/// Amplitude-based attack detector.
///
/// Most sensitive to rises between `mintime` and `maxtime` samples. After a
/// detection the reference follows the signal for `rtime` samples.
/// Amplitudes well below `th` are ignored. `r` receives the transientness,
/// a transient when above 1.
pub fn transamp(
    d: &[f32],
    r: &mut [f32],
    c: &mut TransientState,
    mintime: f32,
    maxtime: f32,
    rtime: f32,
    th: f32,
) {
    debug_assert_eq!(d.len(), r.len());
    let slow = 1.0 / maxtime.max(1.0);
    let fast = 1.0 / mintime.max(1.0);
    for (y, &x) in r.iter_mut().zip(d) {
        let x = x.abs() + ANTI_DENORMAL;
        let k = if x > c.fast { fast } else { slow };
        c.fast += k * (x - c.fast);

        if c.hold > 0.0 {
            c.slow = c.fast;
            c.hold -= 1.0;
        } else {
            c.slow += slow * (c.fast - c.slow);
        }

        *y = (1.4 * (c.fast / (c.slow + th) - 1.0)).max(0.0);
        if *y > 1.0 {
            c.hold = rtime;
        }
    }
}

/// Spectrum-based transient detector on magnitude spectra.
///
/// Compares the summed bin changes against their smoothed history. Returns
/// the transientness, a transient when above 1. `c` (same length as `d`)
/// carries the history in `c[0]` and the previous frame in `c[1..]`.
pub fn transspec(d: &[f32], c: &mut [f32]) -> f32 {
    debug_assert_eq!(d.len(), c.len());
    let diff = ANTI_DENORMAL
        + d[1..]
            .iter()
            .zip(&c[1..])
            .map(|(a, b)| (a - b).abs())
            .sum::<f32>();
    c[0] += 0.25 * (diff - c[0]);
    c[1..].copy_from_slice(&d[1..]);
    (1.44 * (diff / c[0]).ln()).max(0.0)
}

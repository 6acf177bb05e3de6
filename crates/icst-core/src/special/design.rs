//! Filter design formulas.
//!
//! Discrete-time designs return `(a, b)` coefficient arrays for
//! `H(z) = (b0 + b1·z⁻¹ + ...) / (1 + a1·z⁻¹ + ...)` with `a[0] == 1`.
//! Continuous-time designs return `(a, b)` for
//! `G(s) = (... + b1·s + b0) / (... + a1·s + a0)`, highest `a` coefficient 1.
//! Frequencies are relative to the sample rate (discrete) or in Hz
//! (continuous).
//!
//! The equalizer biquads follow Robert Bristow-Johnson's Audio EQ Cookbook.

#[cfg(not(feature = "std"))]
use alloc::vec;
use core::f64::consts::{LN_2, PI};

use libm::{asinh, asinhf, cos, cosf, coshf, exp, expf, sin, sinf, sinh, sinhf, sqrtf, tanf};

/// Response type of a first or second order section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterType {
    /// Lowpass, -3 dB at the corner frequency.
    #[default]
    Lowpass,
    /// Bandpass around the center frequency.
    Bandpass,
    /// Highpass, -3 dB at the corner frequency.
    Highpass,
    /// Band reject.
    Notch,
    /// Low shelf, half the gain (in dB) at the corner frequency.
    LowShelf,
    /// High shelf, half the gain (in dB) at the corner frequency.
    HighShelf,
    /// Peaking (bell) equalizer.
    Peaking,
    /// Allpass with 180° phase at the center frequency.
    Allpass,
}

/// Width of a second order resonance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resonance {
    /// Quality factor, `> 0`.
    Q(f32),
    /// Bandwidth in octaves, `> 0`.
    Octaves(f32),
}

impl Resonance {
    fn octaves(self) -> f64 {
        match self {
            Self::Octaves(bw) => f64::from(bw),
            Self::Q(q) => 2.0 / LN_2 * asinh(0.5 / f64::from(q)),
        }
    }
}

#[inline]
fn db_to_amp(db: f32, div: f32) -> f32 {
    expf(db * core::f32::consts::LN_10 / div)
}

// ============================================================================
// Discrete time
// ============================================================================

/// First order section by the bilinear transform.
///
/// Supports [`FilterType::Lowpass`], [`Highpass`](FilterType::Highpass),
/// [`LowShelf`](FilterType::LowShelf), [`HighShelf`](FilterType::HighShelf)
/// and [`Allpass`](FilterType::Allpass); other types yield the identity.
pub fn dzbilin(fc: f32, ftype: FilterType, dbgain: f32) -> ([f32; 2], [f32; 2]) {
    let fn_ = fc * core::f32::consts::PI;
    let warp = || {
        let (x, y) = (sinf(fn_), cosf(fn_));
        2.0 * x / (x + y)
    };
    let shelf = || {
        let g = db_to_amp(dbgain, 40.0);
        let y = tanf(fn_) / g;
        (g * g * y, y, 1.0 / (1.0 + y))
    };
    let (a1, b) = match ftype {
        FilterType::Lowpass => {
            let z = warp();
            (z - 1.0, [0.5 * z, 0.5 * z])
        }
        FilterType::Highpass => {
            let z = warp();
            let b0 = 1.0 - 0.5 * z;
            (z - 1.0, [b0, -b0])
        }
        FilterType::LowShelf => {
            let (x, y, z) = shelf();
            (z * (y - 1.0), [z * (x + 1.0), z * (x - 1.0)])
        }
        FilterType::HighShelf => {
            let (x, y, z) = shelf();
            (z * (1.0 - y), [z * (x + 1.0), z * (1.0 - x)])
        }
        FilterType::Allpass => {
            let z = warp();
            (z - 1.0, [z - 1.0, 1.0])
        }
        _ => (0.0, [1.0, 0.0]),
    };
    ([1.0, a1], b)
}

/// Audio equalizer biquad.
///
/// `fc` is the corner, center or shelf midpoint frequency relative to the
/// sample rate, `dbgain` applies to the shelving and peaking types. Bandwidths
/// of the bandpass, notch, peaking and allpass types are prewarped with a
/// perceptual asymmetry compensation.
///
/// # Examples
///
/// ```
/// use icst_core::special::{FilterType, Resonance, eqzbiquad};
///
/// let (a, b) = eqzbiquad(0.1, Resonance::Q(0.7071), FilterType::Lowpass, 0.0);
/// assert_eq!(a[0], 1.0);
/// // unity gain at DC
/// let dc = (b[0] + b[1] + b[2]) / (a[0] + a[1] + a[2]);
/// assert!((dc - 1.0).abs() < 1e-12);
/// ```
pub fn eqzbiquad(
    fc: f32,
    resonance: Resonance,
    ftype: FilterType,
    dbgain: f32,
) -> ([f64; 3], [f64; 3]) {
    let omega = 2.0 * PI * f64::from(fc);
    let (sn, cs) = (sin(omega), cos(omega));
    let mut alpha = resonance.octaves();
    if matches!(
        ftype,
        FilterType::Bandpass | FilterType::Notch | FilterType::Peaking | FilterType::Allpass
    ) {
        alpha = 1.0 / (1.0 / alpha + 0.03225 * omega * omega * omega);
        alpha *= omega / sn;
    }
    let alpha = sn * sinh(0.5 * LN_2 * alpha);
    let gain = |div: f64| exp(f64::from(dbgain) * core::f64::consts::LN_10 / div);

    let (mut a, mut b) = match ftype {
        FilterType::Lowpass => {
            let b1 = 1.0 - cs;
            ([1.0 + alpha, -2.0 * cs, 1.0 - alpha], [0.5 * b1, b1, 0.5 * b1])
        }
        FilterType::Bandpass => ([1.0 + alpha, -2.0 * cs, 1.0 - alpha], [alpha, 0.0, -alpha]),
        FilterType::Highpass => {
            let b1 = -1.0 - cs;
            ([1.0 + alpha, -2.0 * cs, 1.0 - alpha], [-0.5 * b1, b1, -0.5 * b1])
        }
        FilterType::Notch => ([1.0 + alpha, -2.0 * cs, 1.0 - alpha], [1.0, -2.0 * cs, 1.0]),
        FilterType::LowShelf | FilterType::HighShelf => {
            let t = gain(80.0);
            let t2 = t * t;
            let t3 = t2 + 1.0;
            let t4 = t2 - 1.0;
            let t5 = 2.0 * t * alpha;
            let t6 = t2 * t5;
            let t7 = t4 * cs;
            let t8 = t3 * cs;
            if ftype == FilterType::LowShelf {
                let bb = t2 * (t3 - t7);
                let aa = t3 + t7;
                (
                    [aa + t5, -2.0 * (t4 + t8), aa - t5],
                    [bb + t6, 2.0 * t2 * (t4 - t8), bb - t6],
                )
            } else {
                let bb = t2 * (t3 + t7);
                let aa = t3 - t7;
                (
                    [aa + t5, 2.0 * (t4 - t8), aa - t5],
                    [bb + t6, -2.0 * t2 * (t4 + t8), bb - t6],
                )
            }
        }
        FilterType::Peaking => {
            let t = gain(40.0);
            let (t2, t3) = (alpha * t, alpha / t);
            ([1.0 + t3, -2.0 * cs, 1.0 - t3], [1.0 + t2, -2.0 * cs, 1.0 - t2])
        }
        FilterType::Allpass => {
            let b = [1.0 - alpha, -2.0 * cs, 1.0 + alpha];
            ([b[2], b[1], b[0]], b)
        }
    };
    let norm = 1.0 / a[0];
    for x in &mut b {
        *x *= norm;
    }
    a[1] *= norm;
    a[2] *= norm;
    a[0] = 1.0;
    (a, b)
}

// ============================================================================
// Continuous time
// ============================================================================

/// Bilinear z-transform of `G(s) = Σ d[i]·s^i / Σ c[i]·s^i` at sample
/// rate `fs`.
///
/// Writes `H(z) = Σ b[i]·z⁻ⁱ / (1 + Σ a[i]·z⁻ⁱ)` into `a` and `b`, which
/// must hold `c.len()` coefficients. Apply frequency prewarping beforehand
/// (see [`fqlowpass`]) where needed.
pub fn stoz(a: &mut [f64], b: &mut [f64], c: &[f32], d: &[f32], fs: f32) {
    let n = c.len();
    if n == 0 {
        return;
    }
    debug_assert!(d.len() == n && a.len() >= n && b.len() >= n);
    let order = n - 1;
    let twofs = 2.0 * f64::from(fs);
    // np[j]: coefficients of (2fs)^i·(1 - z)^i·(1 + z)^(order - i) expansion
    let mut np = vec![0.0f64; n];
    a[0] = f64::from(c[0]);
    b[0] = f64::from(d[0]);
    np[0] = 1.0;
    for i in 1..=order {
        let (cx, dx) = (f64::from(c[i]), f64::from(d[i]));
        np[i] = twofs * np[i - 1];
        a[i] = a[i - 1] + cx * np[i];
        b[i] = b[i - 1] + dx * np[i];
        for j in (1..i).rev() {
            np[j] = twofs * (np[j - 1] - np[j]);
            a[j] += a[j - 1] + cx * np[j];
            b[j] += b[j - 1] + dx * np[j];
        }
        np[0] *= -twofs;
        a[0] += cx * np[0];
        b[0] += dx * np[0];
    }
    a[..n].reverse();
    b[..n].reverse();
    let norm = 1.0 / a[0];
    for i in 0..n {
        a[i] *= norm;
        b[i] *= norm;
    }
}

/// First order analog prototype `(b1·s + b0) / (s + a0)` with corner
/// frequency `fc` in Hz.
///
/// Supports the same types as [`dzbilin`]; others yield the identity.
pub fn dsbilin(fc: f32, ftype: FilterType, dbgain: f32) -> ([f32; 2], [f32; 2]) {
    let w = fc * 2.0 * core::f32::consts::PI;
    let (a0, b) = match ftype {
        FilterType::Lowpass => (w, [w, 0.0]),
        FilterType::Highpass => (w, [0.0, 1.0]),
        FilterType::LowShelf => {
            let g = db_to_amp(dbgain, 40.0);
            (w / g, [w * g, 1.0])
        }
        FilterType::HighShelf => {
            let g = db_to_amp(dbgain, 40.0);
            (w * g, [w * g, g * g])
        }
        FilterType::Allpass => (w, [-w, 1.0]),
        _ => (1.0, [1.0, 1.0]),
    };
    ([a0, 1.0], b)
}

/// Second order analog prototype `(b2·s² + b1·s + b0) / (s² + a1·s + a0)`
/// with corner or center frequency `fc` in Hz.
pub fn dsbiquad(
    fc: f32,
    resonance: Resonance,
    ftype: FilterType,
    dbgain: f32,
) -> ([f32; 3], [f32; 3]) {
    let w = fc * 2.0 * core::f32::consts::PI;
    let w2 = w * w;
    let qbw = match resonance {
        Resonance::Q(q) => 1.0 / q,
        Resonance::Octaves(bw) => 2.0 * sinhf(0.5 * core::f32::consts::LN_2 * bw),
    };
    let wq = w * qbw;
    let (a, b) = match ftype {
        FilterType::Lowpass => ([w2, wq], [w2, 0.0, 0.0]),
        FilterType::Bandpass => ([w2, wq], [0.0, wq, 0.0]),
        FilterType::Highpass => ([w2, wq], [0.0, 0.0, 1.0]),
        FilterType::Notch => ([w2, wq], [w2, 0.0, 1.0]),
        FilterType::LowShelf => {
            let g = db_to_amp(dbgain, 80.0);
            let b1 = g * wq;
            let inv = 1.0 / (g * g);
            ([w2 * inv, b1 * inv], [g * g * w2, b1, 1.0])
        }
        FilterType::HighShelf => {
            let g = db_to_amp(dbgain, 80.0);
            let g2 = g * g;
            let b1 = g * wq;
            ([g2 * w2, b1], [w2 * g2, b1 * g2, g2 * g2])
        }
        FilterType::Peaking => {
            let g = db_to_amp(dbgain, 40.0);
            ([w2, wq / g], [w2, g * wq, 1.0])
        }
        FilterType::Allpass => ([w2, wq], [w2, -wq, 1.0]),
    };
    ([a[0], a[1], 1.0], b)
}

// ============================================================================
// Prototype lowpass cascades
// ============================================================================

/// Butterworth lowpass of degree `d` with corner 1 as a cascade of second
/// order stages.
///
/// Fills `(d + 1) / 2` corner frequencies `f` and quality factors `q`. For
/// odd `d` the last stage is first order and has `q == 0`.
pub fn fqbutter(f: &mut [f32], q: &mut [f32], d: usize) {
    let a = core::f32::consts::PI / d as f32;
    let mut b = 0.5f32;
    if d % 2 == 1 {
        b += 0.5;
        f[(d - 1) / 2] = 1.0;
        q[(d - 1) / 2] = 0.0;
    }
    for i in 0..d / 2 {
        f[i] = 1.0;
        q[i] = 0.5 / cosf(a * b);
        b += 1.0;
    }
}

/// Bessel lowpass of degree `d` (table up to 10) with corner 1, laid out as
/// in [`fqbutter`].
///
/// Degrees above 10 use the 10th degree table; the surplus stages get
/// `f = f32::MAX` and `q = 0`.
pub fn fqbessel(f: &mut [f32], q: &mut [f32], d: usize) {
    const TABLE: [&[(f32, f32)]; 10] = [
        &[(1.0, 0.0)],
        &[(1.2736, 0.5773)],
        &[(1.4524, 0.6910), (1.3270, 0.0)],
        &[(1.4192, 0.5219), (1.5912, 0.8055)],
        &[(1.5611, 0.5635), (1.7607, 0.9165), (1.5069, 0.0)],
        &[(1.6060, 0.5103), (1.6913, 0.6112), (1.9071, 1.0234)],
        &[(1.7174, 0.5324), (1.8235, 0.6608), (2.0507, 1.1262), (1.6853, 0.0)],
        &[(1.7837, 0.5060), (1.8376, 0.5596), (1.9591, 0.7109), (2.1953, 1.2258)],
        &[
            (1.8794, 0.5197),
            (1.9488, 0.5894),
            (2.0815, 0.7606),
            (2.3235, 1.3220),
            (1.8575, 0.0),
        ],
        &[
            (1.9490, 0.5040),
            (1.9870, 0.5380),
            (2.0680, 0.6200),
            (2.2110, 0.8100),
            (2.4850, 1.4150),
        ],
    ];
    let row = TABLE[d.clamp(1, 10) - 1];
    for (i, &(fi, qi)) in row.iter().enumerate() {
        f[i] = fi;
        q[i] = qi;
    }
    for i in row.len()..d.div_ceil(2) {
        f[i] = f32::MAX;
        q[i] = 0.0;
    }
}

/// Chebyshev type 1 lowpass of degree `d` with corner 1 and passband ripple
/// `rdb` dB, laid out as in [`fqbutter`].
pub fn fqcheby(f: &mut [f32], q: &mut [f32], rdb: f32, d: usize) {
    let inv = 1.0 / d as f32;
    let g = inv * asinhf(1.0 / sqrtf(expf(core::f32::consts::LN_10 * 0.1 * rdb.abs()) - 1.0));
    let c = coshf(g) * coshf(g);
    let e = sinhf(g);
    let mut b = 0.5f32;
    if d % 2 == 1 {
        b += 0.5;
        f[(d - 1) / 2] = e;
        q[(d - 1) / 2] = 0.0;
    }
    let a = inv * core::f32::consts::PI;
    for i in 0..d / 2 {
        let x = cosf(a * b);
        f[i] = sqrtf(c - x * x);
        q[i] = 0.5 * f[i] / (e * x);
        b += 1.0;
    }
}

fn prewarp(fc: f32, fs: f32) -> f32 {
    if fs > 0.0 {
        fs / core::f32::consts::PI * tanf(core::f32::consts::PI * fc / fs)
    } else {
        fc
    }
}

/// Scales normalized prototype frequencies to a lowpass with corner `fc`.
///
/// With `fs > 0` the corner is prewarped for a following [`stoz`].
pub fn fqlowpass(f: &mut [f32], fc: f32, fs: f32) {
    let fc = prewarp(fc, fs);
    for x in f.iter_mut() {
        *x *= fc;
    }
}

/// Maps normalized prototype frequencies to a highpass with corner `fc`.
pub fn fqhighpass(f: &mut [f32], fc: f32, fs: f32) {
    let fc = prewarp(fc, fs);
    for x in f.iter_mut() {
        *x = fc / *x;
    }
}

/// Turns a cascade of `n` normalized lowpass stages into `2n` second order
/// bandpass stages with center `fc` and absolute bandwidth `bw` (Hz).
///
/// Inputs are `f[..n]` and `q[..n]`; outputs are `f`, `q` and gains `g`
/// over `..2n`. Stages with `q < 0.5` become a single bandpass followed by a
/// stage with `q == 0`, meaning no filter. With `fs > 0` both band edges are
/// prewarped for a following [`stoz`].
pub fn fqbandpass(
    f: &mut [f32],
    q: &mut [f32],
    g: &mut [f32],
    fc: f32,
    bw: f32,
    n: usize,
    fs: f32,
) {
    debug_assert!(f.len() >= 2 * n && q.len() >= 2 * n && g.len() >= 2 * n);
    let (mut fc, mut bw) = (fc, bw);
    if fs > 0.0 {
        let a = core::f32::consts::PI / fs;
        let b = 1.0 / a;
        let c = sqrtf(bw * bw + 4.0 * fc * fc);
        let d = tanf(0.5 * a * (c + bw));
        let e = tanf(0.5 * a * (c - bw));
        bw = b * (d - e);
        fc = b * sqrtf(d * e);
    }
    for i in (0..n).rev() {
        if q[i] < 0.5 {
            f[2 * i] = fc;
            f[2 * i + 1] = fc;
            q[2 * i] = fc / bw;
            q[2 * i + 1] = 0.0;
            g[2 * i] = 1.0;
            g[2 * i + 1] = 1.0;
        } else {
            let bwi = bw * f[i];
            let bws = bwi * bwi;
            let a = 4.0 * fc * fc;
            let b = bws + a;
            let c = 0.5 * (b + sqrtf(b * b - a * bws / (q[i] * q[i])));
            let (d, e) = (sqrtf(c), sqrtf(c - a));
            let qi = q[i] * d / bwi;
            f[2 * i] = 0.5 * (d - e);
            f[2 * i + 1] = 0.5 * (d + e);
            q[2 * i] = qi;
            q[2 * i + 1] = qi;
            g[2 * i] = bwi * qi / fc;
            g[2 * i + 1] = g[2 * i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libm::log10;

    const FC: f32 = 0.1;

    fn analog_db(a: &[f32], b: &[f32], f: f32) -> f64 {
        let w = 2.0 * PI * f64::from(f);
        let eval = |c: &[f32]| {
            let (mut re, mut im) = (0.0f64, 0.0f64);
            let mut p = (1.0f64, 0.0f64);
            for &k in c {
                re += f64::from(k) * p.0;
                im += f64::from(k) * p.1;
                p = (-p.1 * w, p.0 * w);
            }
            re * re + im * im
        };
        10.0 * log10(eval(b) / eval(a))
    }

    fn mag_z(a: &[f64], b: &[f64], f: f64) -> f64 {
        let w = 2.0 * PI * f;
        let eval = |c: &[f64]| {
            let (re, im) = c.iter().enumerate().fold((0.0, 0.0), |(re, im), (k, &x)| {
                (re + x * cos(w * k as f64), im - x * sin(w * k as f64))
            });
            libm::sqrt(re * re + im * im)
        };
        eval(b) / eval(a)
    }

    // ====================================================================
    // Discrete time
    // ====================================================================

    #[test]
    fn bilinear_lowpass_corner() {
        let (a, b) = dzbilin(0.1, FilterType::Lowpass, 0.0);
        let (a, b) = (a.map(f64::from), b.map(f64::from));
        assert!((mag_z(&a, &b, 0.0) - 1.0).abs() < 1e-6);
        assert!((20.0 * log10(mag_z(&a, &b, 0.1)) + 3.0103).abs() < 0.01);
        let (a, b) = dzbilin(0.1, FilterType::Highpass, 0.0);
        let (a, b) = (a.map(f64::from), b.map(f64::from));
        assert!(mag_z(&a, &b, 0.0) < 1e-6);
        assert!((mag_z(&a, &b, 0.5) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn bilinear_shelf_and_allpass() {
        let (a, b) = dzbilin(0.05, FilterType::LowShelf, 12.0);
        let (a, b) = (a.map(f64::from), b.map(f64::from));
        assert!((20.0 * log10(mag_z(&a, &b, 0.0)) - 12.0).abs() < 0.01);
        assert!(20.0 * log10(mag_z(&a, &b, 0.5)).abs() < 0.01);
        let (a, b) = dzbilin(0.2, FilterType::Allpass, 0.0);
        let (a, b) = (a.map(f64::from), b.map(f64::from));
        for f in [0.0, 0.1, 0.3, 0.45] {
            assert!((mag_z(&a, &b, f) - 1.0).abs() < 1e-5);
        }
        assert_eq!(dzbilin(0.2, FilterType::Peaking, 6.0), ([1.0, 0.0], [1.0, 0.0]));
    }

    #[test]
    fn eq_lowpass_is_3db_down_at_corner() {
        let (a, b) = eqzbiquad(0.05, Resonance::Q(core::f32::consts::FRAC_1_SQRT_2), FilterType::Lowpass, 0.0);
        let db = 20.0 * log10(mag_z(&a, &b, 0.05));
        assert!((db + 3.0103).abs() < 0.01, "got {db} dB");
    }

    #[test]
    fn eq_peaking_gain_at_center() {
        let center = f64::from(FC);
        let (a, b) = eqzbiquad(FC, Resonance::Octaves(1.0), FilterType::Peaking, 9.0);
        assert!((20.0 * log10(mag_z(&a, &b, center)) - 9.0).abs() < 1e-3);
        assert!((mag_z(&a, &b, 0.0) - 1.0).abs() < 1e-9);
        let (a, b) = eqzbiquad(FC, Resonance::Q(2.0), FilterType::Notch, 0.0);
        assert!(mag_z(&a, &b, center) < 1e-6);
        let (a, b) = eqzbiquad(FC, Resonance::Q(2.0), FilterType::Allpass, 0.0);
        assert!((mag_z(&a, &b, 0.27) - 1.0).abs() < 1e-9);
        let (a, b) = eqzbiquad(FC, Resonance::Q(2.0), FilterType::Bandpass, 0.0);
        assert!((mag_z(&a, &b, center) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn eq_shelves_reach_full_gain() {
        let (a, b) = eqzbiquad(0.01, Resonance::Q(0.7071), FilterType::LowShelf, -6.0);
        assert!((20.0 * log10(mag_z(&a, &b, 0.0)) + 6.0).abs() < 1e-3);
        assert!(20.0 * log10(mag_z(&a, &b, 0.5)).abs() < 1e-3);
        let (a, b) = eqzbiquad(0.2, Resonance::Q(0.7071), FilterType::HighShelf, 6.0);
        assert!((20.0 * log10(mag_z(&a, &b, 0.5)) - 6.0).abs() < 1e-3);
        assert!(20.0 * log10(mag_z(&a, &b, 0.0)).abs() < 1e-3);
    }

    // ====================================================================
    // Continuous time
    // ====================================================================

    #[test]
    fn stoz_first_order_lowpass() {
        // G(s) = w / (s + w)
        let fs = 48_000.0;
        let fc = prewarp(1000.0, fs);
        let (a_s, b_s) = dsbilin(fc, FilterType::Lowpass, 0.0);
        let (mut a, mut b) = ([0.0f64; 2], [0.0f64; 2]);
        stoz(&mut a, &mut b, &a_s, &b_s, fs);
        assert!((a[0] - 1.0).abs() < 1e-12);
        assert!((mag_z(&a, &b, 0.0) - 1.0).abs() < 1e-6);
        let db = 20.0 * log10(mag_z(&a, &b, 1000.0 / 48_000.0));
        assert!((db + 3.0103).abs() < 0.01);
    }

    #[test]
    fn analog_prototypes() {
        let (a, b) = dsbiquad(100.0, Resonance::Q(core::f32::consts::FRAC_1_SQRT_2), FilterType::Lowpass, 0.0);
        assert!((analog_db(&a, &b, 100.0) + 3.0103).abs() < 0.01);
        let (a, b) = dsbiquad(100.0, Resonance::Octaves(1.0), FilterType::Peaking, 6.0);
        assert!((analog_db(&a, &b, 100.0) - 6.0).abs() < 1e-3);
        let (a, b) = dsbilin(50.0, FilterType::HighShelf, 10.0);
        assert!((analog_db(&a, &b, 1.0e6) - 10.0).abs() < 0.01);
    }

    // ====================================================================
    // Prototype cascades
    // ====================================================================

    #[test]
    fn butterworth_stages() {
        let (mut f, mut q) = ([0.0f32; 3], [0.0f32; 3]);
        fqbutter(&mut f, &mut q, 5);
        assert_eq!(f, [1.0; 3]);
        assert_eq!(q[2], 0.0);
        assert!((q[0] - 0.618_034).abs() < 1e-4);
        assert!((q[1] - 1.618_034).abs() < 1e-4);
        fqbutter(&mut f, &mut q, 2);
        assert!((q[0] - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn bessel_and_chebyshev_stages() {
        let (mut f, mut q) = ([0.0f32; 7], [0.0f32; 7]);
        fqbessel(&mut f, &mut q, 3);
        assert_eq!((f[1], q[1]), (1.3270, 0.0));
        fqbessel(&mut f, &mut q, 13);
        assert_eq!(f[4], 2.4850);
        assert_eq!((f[5], f[6]), (f32::MAX, f32::MAX));
        fqcheby(&mut f, &mut q, 1.0, 4);
        // 1 dB ripple, 4th order: Q ≈ 0.785 and 3.56
        assert!((q[0] - 0.785).abs() < 0.01);
        assert!((q[1] - 3.56).abs() < 0.02);
    }

    #[test]
    fn frequency_transforms() {
        let mut f = [1.0f32, 2.0];
        fqlowpass(&mut f, 100.0, 0.0);
        assert_eq!(f, [100.0, 200.0]);
        fqhighpass(&mut f, 100.0, 0.0);
        assert_eq!(f, [1.0, 0.5]);
        let (mut f, mut q, mut g) = ([1.0f32, 0.0], [0.0f32, 0.0], [0.0f32; 2]);
        fqbandpass(&mut f, &mut q, &mut g, 1000.0, 100.0, 1, 0.0);
        assert_eq!(f, [1000.0, 1000.0]);
        assert_eq!(q, [10.0, 0.0]);
        let (mut f, mut q, mut g) = ([1.0f32, 0.0], [0.7071f32, 0.0], [0.0f32; 2]);
        fqbandpass(&mut f, &mut q, &mut g, 1000.0, 100.0, 1, 0.0);
        assert!(f[0] < 1000.0 && f[1] > 1000.0);
        assert!(((f[0] * f[1]).sqrt() - 1000.0).abs() < 1.0);
        assert_eq!(q[0], q[1]);
    }
}

//! Test signal and noise generators.
//!
//! Periodic generators take `periods` as the number of cycles between the
//! first and the last sample and `phase` as a fraction of a period. They
//! return the phase at `periods` past the start, so consecutive calls with
//! `size - 1` spacing can be chained. Oscillations are produced by complex
//! rotation in `f64`.

use core::f64::consts::PI;

use libm::{cos, exp, floor, floorf, log, pow, sin, sinf, sqrt, sqrtf};

use crate::fast_math::fast_ln_abs;
use crate::math::{lcg_step, lcg_to_float};

// ============================================================================
// Ramps
// ============================================================================

/// Linear ramp from `start` to `end` inclusive. A single sample gets the
/// midpoint.
pub fn linear(d: &mut [f32], start: f32, end: f32) {
    let size = d.len();
    if size == 0 {
        return;
    }
    if size == 1 {
        d[0] = 0.5 * (start + end);
        return;
    }
    let delta = f64::from(end - start) / (size - 1) as f64;
    let start = f64::from(start);
    for (i, x) in d.iter_mut().enumerate() {
        *x = (start + delta * i as f64) as f32;
    }
}

/// Exponential segment from `start` to `end` with time constant `time`
/// relative to the segment length.
///
/// `time <= 0` jumps to `end` right away; very long time constants
/// degrade to [`linear`].
pub fn exponential(d: &mut [f32], start: f32, end: f32, time: f32) {
    let size = d.len();
    if size == 0 {
        return;
    }
    if size == 1 {
        d[0] = if time < -0.5 / libm::logf(f32::EPSILON) {
            end
        } else {
            start + (end - start) / (1.0 + libm::expf(-0.5 / time))
        };
        return;
    }
    let (a, delta) = if time <= 0.0 {
        (f64::from(end), 0.0)
    } else {
        let invsize = 1.0 / (size - 1) as f64;
        let t = f64::from(time);
        if t * sqrt(f64::EPSILON) > invsize {
            linear(d, start, end);
            return;
        }
        let rate = 1.0 / t;
        (
            f64::from(start) + f64::from(end - start) / (1.0 - exp(-rate)),
            exp(-rate * invsize),
        )
    };
    let mut x = f64::from(start) - a;
    for v in d.iter_mut() {
        *v = (x + a) as f32;
        x *= delta;
    }
}

/// Logarithmically spaced points from `start` to `end`.
///
/// `start` and `end` must have the same sign; otherwise the output is zero.
pub fn logspace(d: &mut [f32], start: f32, end: f32) {
    let size = d.len();
    if size == 0 {
        return;
    }
    if start * end <= 0.0 {
        d.fill(0.0);
        return;
    }
    if size == 1 {
        let g = sqrtf(start * end);
        d[0] = if start > 0.0 { g } else { -g };
        return;
    }
    let delta = pow(f64::from(end / start), 1.0 / (size - 1) as f64);
    let mut x = f64::from(start);
    for v in d.iter_mut() {
        *v = x as f32;
        x *= delta;
    }
}

// ============================================================================
// Oscillations
// ============================================================================

fn end_phase(phase: f32, periods: f32) -> f32 {
    let e = phase + periods;
    e - floorf(e)
}

/// Sine wave with `periods` cycles across the block. With `center`, `phase`
/// refers to the middle of the block.
///
/// Returns the end phase in `[0, 1)`.
///
/// # Examples
///
/// ```
/// use icst_core::vector::signal::sine;
///
/// let mut d = [0.0f32; 5];
/// let end = sine(&mut d, 1.0, 0.0, false);
/// assert!(d[1] > 0.99 && d[3] < -0.99);
/// assert_eq!(end, 0.0);
/// ```
pub fn sine(d: &mut [f32], periods: f32, phase: f32, center: bool) -> f32 {
    let phase = if center { phase - 0.5 * periods } else { phase };
    let endphase = end_phase(phase, periods);
    let size = d.len();
    if size == 0 {
        return endphase;
    }
    if size == 1 {
        d[0] = sinf(2.0 * core::f32::consts::PI * phase);
        return endphase;
    }
    let t = 2.0 * PI * f64::from(phase);
    let (mut re, mut im) = (cos(t), sin(t));
    let w = 2.0 * PI * f64::from(periods) / (size - 1) as f64;
    let (wre, wim) = (cos(w), sin(w));
    for x in d.iter_mut() {
        *x = im as f32;
        let tmp = re;
        re = wre * re - wim * im;
        im = wre * im + wim * tmp;
    }
    endphase
}

/// Linear chirp: sine with the number of periods per block changing
/// linearly from `startpd` to `endpd`.
pub fn chirp(d: &mut [f32], startpd: f32, endpd: f32, phase: f32) -> f32 {
    let endphase = end_phase(phase, 0.5 * (startpd + endpd));
    let size = d.len();
    if size == 0 {
        return endphase;
    }
    if size == 1 {
        d[0] = sinf(2.0 * core::f32::consts::PI * phase);
        return endphase;
    }
    let inv = 1.0 / (size - 1) as f64;
    let alpha = 2.0 * PI * f64::from(startpd) * inv;
    let beta = PI * f64::from(endpd - startpd) * inv * inv;
    let (mut hre, mut him) = (cos(alpha + beta), sin(alpha + beta));
    let (cre, cim) = (cos(2.0 * beta), sin(2.0 * beta));
    let t = 2.0 * PI * f64::from(phase);
    let (mut fre, mut fim) = (cos(t), sin(t));
    for x in d.iter_mut() {
        *x = fim as f32;
        let tmp = fre;
        fre = hre * fre - him * fim;
        fim = hre * fim + him * tmp;
        let tmp = hre;
        hre = cre * hre - cim * him;
        him = cre * him + cim * tmp;
    }
    endphase
}

/// Exponential chirp: the frequency changes geometrically from `startpd` to
/// `endpd` periods per block.
pub fn expchirp(d: &mut [f32], startpd: f32, endpd: f32, phase: f32) -> f32 {
    let size = d.len();
    let ph = f64::from(phase) - floor(f64::from(phase));
    let spd = f64::from(startpd.max(f32::MIN_POSITIVE));
    let epd = f64::from(endpd.max(f32::MIN_POSITIVE));
    let mut gamma = 1.0 / size.saturating_sub(1).max(1) as f64;
    let lambda = gamma * log(epd / spd);
    let beta = exp(lambda);
    if lambda.abs() > 1e-7 {
        gamma *= spd * (beta - 1.0) / lambda;
    } else {
        gamma *= spd;
    }
    let (mut alpha, mut delta) = (0.0f64, 1.0f64);
    let mut x = ph;
    for v in d.iter_mut() {
        x = ph + gamma * alpha;
        x -= floor(x);
        *v = sin(2.0 * PI * x) as f32;
        alpha += delta;
        delta *= beta;
    }
    if size <= 1 {
        x = ph + gamma * alpha;
        x -= floor(x);
    }
    x as f32
}

/// Complex phasor `e^(i·2π·(phase + k·periods/(n-1)))` into an interleaved
/// buffer. With phase 0 the first element is `1 + 0i`.
pub fn cpxphasor(d: &mut [f32], periods: f32, phase: f32, center: bool) -> f32 {
    debug_assert!(d.len() % 2 == 0);
    let phase = if center { phase - 0.5 * periods } else { phase };
    let endphase = end_phase(phase, periods);
    let size = d.len() / 2;
    if size == 0 {
        return endphase;
    }
    let t = 2.0 * PI * f64::from(phase);
    let (mut re, mut im) = (cos(t), sin(t));
    let w = if size > 1 {
        2.0 * PI * f64::from(periods) / (size - 1) as f64
    } else {
        0.0
    };
    let (wre, wim) = (cos(w), sin(w));
    for z in d.chunks_exact_mut(2) {
        z[0] = re as f32;
        z[1] = im as f32;
        let tmp = re;
        re = wre * re - wim * im;
        im = wre * im + wim * tmp;
    }
    endphase
}

/// Sawtooth / triangle wave in `[-1, 1]`.
///
/// `symmetry` 0 gives a falling saw, 0.5 a triangle, 1 a rising saw.
pub fn saw(d: &mut [f32], periods: f32, symmetry: f32, phase: f32, center: bool) -> f32 {
    let mut phase = if center { phase - 0.5 * periods } else { phase };
    phase -= floorf(phase);
    let endphase = end_phase(phase, periods);
    let size = d.len();
    let mut x = 2.0 * f64::from(phase);
    let dx = if size > 1 {
        2.0 * f64::from(periods) / (size - 1) as f64
    } else {
        0.0
    };
    let sym = symmetry.clamp(f32::EPSILON, 1.0 - f32::EPSILON);
    let c1 = 1.0 / sym;
    let c2 = 1.0 / (sym - 1.0);
    for v in d.iter_mut() {
        if x > 1.0 {
            x -= 2.0;
        }
        let y = x as f32;
        x += dx;
        *v = if y.abs() <= sym {
            c1 * y
        } else if y >= 0.0 {
            c2 * (y - 1.0)
        } else {
            c2 * (y + 1.0)
        };
    }
    endphase
}

/// Symmetric sinc window covering `periods` zero crossings on each side
/// of the center.
pub fn sinc(d: &mut [f32], periods: f64) {
    let size = d.len();
    if size == 0 {
        return;
    }
    if size == 1 {
        d[0] = 1.0;
        return;
    }
    let phi = 2.0 * PI * periods / (size - 1) as f64;
    let mut x = -PI * periods;
    for i in 0..size / 2 {
        let v = (sin(x) / x) as f32;
        d[i] = v;
        d[size - 1 - i] = v;
        x += phi;
    }
    if size % 2 == 1 {
        d[size / 2] = 1.0;
    }
}

/// Symmetric triangular window, zero at both ends.
pub fn triangle(d: &mut [f32]) {
    let size = d.len();
    if size == 0 {
        return;
    }
    if size == 1 {
        d[0] = 1.0;
        return;
    }
    let delta = 2.0 / (size - 1) as f64;
    for i in 0..size.div_ceil(2) {
        let v = (delta * i as f64) as f32;
        d[i] = v;
        d[size - 1 - i] = v;
    }
}

// ============================================================================
// Noise
// ============================================================================

/// Seedable pseudo-random source for the noise generators.
///
/// A multiplicative LCG (`x ← 663608941·x mod 2³²`). Each generator instance
/// owns its state, so independent streams never interfere.
///
/// # Example
///
/// ```rust
/// use icst_core::vector::signal::NoiseGen;
///
/// let mut rng = NoiseGen::new(1);
/// let mut d = [0.0f32; 64];
/// rng.unoise(&mut d);
/// assert!(d.iter().all(|x| (-1.0..1.0).contains(x)));
/// ```
#[derive(Debug, Clone)]
pub struct NoiseGen {
    state: u32,
}

impl NoiseGen {
    /// Creates a generator. Zero is replaced by 1.
    pub const fn new(seed: u32) -> Self {
        Self {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    #[inline]
    fn step(&mut self) -> u32 {
        self.state = lcg_step(self.state);
        self.state
    }

    /// One uniform sample in `[-1, 1)`.
    #[inline]
    pub fn next_uniform(&mut self) -> f32 {
        lcg_to_float(self.step()) - 3.0
    }

    /// Uniform noise in `[-1, 1)`, RMS ≈ 0.577.
    pub fn unoise(&mut self, d: &mut [f32]) {
        for x in d.iter_mut() {
            *x = self.next_uniform();
        }
    }

    /// Gaussian noise with unit variance, approximated by summing
    /// `apxorder` uniform values (10 is typical, 2 gives a triangular
    /// distribution). `apxorder` is clamped to `1..=255`.
    pub fn gnoise(&mut self, d: &mut [f32], apxorder: u32) {
        let order = apxorder.clamp(1, 255);
        let scl = sqrtf(3.0 / order as f32) / 4_194_304.0;
        for x in d.iter_mut() {
            let mut acc: i64 = 0;
            for _ in 0..order {
                acc += i64::from(self.step() >> 9);
            }
            acc -= i64::from(order) << 22;
            *x = scl * acc as f32;
        }
    }

    /// Exponentially distributed positive noise with unit mean.
    pub fn enoise(&mut self, d: &mut [f32]) {
        for x in d.iter_mut() {
            let u = 0.5 + 0.5 * self.next_uniform();
            *x = -fast_ln_abs(u);
        }
    }

    /// Standard Cauchy distributed noise, using a rational approximation of
    /// `tan(π/2·u)`.
    pub fn cnoise(&mut self, d: &mut [f32]) {
        const C1: f32 = -1.583_915_1;
        const C2: f32 = 0.269_032_25;
        const C3: f32 = -1.008_330_5;
        for v in d.iter_mut() {
            let mut x = self.next_uniform();
            *v = if x.abs() <= 0.5 {
                let y = x * x;
                x * (C1 + C2 * y) / (C3 + y)
            } else {
                x = if x > 0.0 { 1.000_000_1 - x } else { -1.000_000_1 - x };
                let y = x * x;
                (C3 + y) / (x * (C1 + C2 * y))
            };
        }
    }
}

impl Default for NoiseGen {
    fn default() -> Self {
        Self::new(1)
    }
}

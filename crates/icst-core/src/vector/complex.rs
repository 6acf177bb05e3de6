//! Operations on interleaved complex buffers `[re0, im0, re1, im1, …]`.
//!
//! Every function takes the buffer as an `f32` slice of even length; the
//! element count is `len / 2`. Scalar results use [`Complex`].

use libm::{atan2f, cosf, sinf, sqrtf};

use crate::complex::Complex;
use crate::vector::real;

/// Precision policy of [`cpxinv`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InversePrecision {
    /// Single precision `conj(z) / |z|²`. Overflows to inf/NaN for tiny `z`.
    #[default]
    Fast,
    /// Computes in double precision and maps results beyond the `f32` range
    /// to `+inf`.
    FullRange,
}

#[inline]
fn pairs(d: &[f32]) -> core::slice::ChunksExact<'_, f32> {
    debug_assert!(d.len() % 2 == 0, "complex buffer has odd length");
    d.chunks_exact(2)
}

#[inline]
fn pairs_mut(d: &mut [f32]) -> core::slice::ChunksExactMut<'_, f32> {
    debug_assert!(d.len() % 2 == 0, "complex buffer has odd length");
    d.chunks_exact_mut(2)
}

// ============================================================================
// Reductions
// ============================================================================

/// Sum of all elements, accumulated in `f64`.
pub fn cpxsum(d: &[f32]) -> Complex {
    let (mut re, mut im) = (0.0f64, 0.0f64);
    for z in pairs(d) {
        re += f64::from(z[0]);
        im += f64::from(z[1]);
    }
    Complex::new(re as f32, im as f32)
}

/// Energy `Σ |z|²`.
pub fn cpxenergy(d: &[f32]) -> f32 {
    real::energy(d)
}

/// L2 norm `sqrt(Σ |z|²)`.
pub fn cpxnorm(d: &[f32]) -> f32 {
    real::norm(d)
}

/// Power `Σ |z|² / n` where `n` is the element count.
pub fn cpxpower(d: &[f32]) -> f32 {
    let n = d.len() / 2;
    if n == 0 {
        0.0
    } else {
        real::energy(d) / n as f32
    }
}

/// RMS value `sqrt(cpxpower)`.
pub fn cpxrms(d: &[f32]) -> f32 {
    sqrtf(cpxpower(d))
}

/// Complex inner product `Σ d·conj(r)`.
pub fn cpxdotp(d: &[f32], r: &[f32]) -> Complex {
    debug_assert_eq!(d.len(), r.len());
    let (mut re, mut im) = (0.0f64, 0.0f64);
    for (a, b) in pairs(d).zip(pairs(r)) {
        let (dr, di) = (f64::from(a[0]), f64::from(a[1]));
        let (rr, ri) = (f64::from(b[0]), f64::from(b[1]));
        re += dr * rr + di * ri;
        im += di * rr - dr * ri;
    }
    Complex::new(re as f32, im as f32)
}

// ============================================================================
// Per-element transforms
// ============================================================================

/// Complex conjugate.
pub fn cpxconj(d: &mut [f32]) {
    for z in pairs_mut(d) {
        z[1] = -z[1];
    }
}

/// Complex reciprocal `1/z`.
///
/// With [`InversePrecision::FullRange`], elements whose reciprocal exceeds
/// the `f32` range become `(+inf, 0)`.
pub fn cpxinv(d: &mut [f32], precision: InversePrecision) {
    for z in pairs_mut(d) {
        let (re, im) = (z[0], z[1]);
        let m = re * re + im * im;
        match precision {
            InversePrecision::Fast => {
                let k = 1.0 / m;
                z[0] = re * k;
                z[1] = -im * k;
            }
            InversePrecision::FullRange if m >= f32::MIN_POSITIVE => {
                let k = 1.0 / m;
                z[0] = re * k;
                z[1] = -im * k;
            }
            InversePrecision::FullRange => {
                let (xr, xi) = (f64::from(re), f64::from(im));
                let xd = xr * xr + xi * xi;
                let lim = 1.0 / (f64::from(f32::MAX) * f64::from(f32::MAX));
                if xd > lim {
                    let k = 1.0 / xd;
                    z[0] = (xr * k) as f32;
                    z[1] = (-xi * k) as f32;
                } else {
                    z[0] = f32::INFINITY;
                    z[1] = 0.0;
                }
            }
        }
    }
}

/// Magnitude of each element into `d[..len/2]` of the real output `d`.
///
/// `d.len()` must be `r.len() / 2`.
pub fn cpxmag(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len() * 2, r.len());
    for (x, z) in d.iter_mut().zip(pairs(r)) {
        *x = sqrtf(z[0] * z[0] + z[1] * z[1]);
    }
}

/// Squared magnitude (power) of each element.
pub fn cpxpow(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len() * 2, r.len());
    for (x, z) in d.iter_mut().zip(pairs(r)) {
        *x = z[0] * z[0] + z[1] * z[1];
    }
}

/// Argument of each element in `(-π, π]`.
pub fn cpxarg(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len() * 2, r.len());
    for (x, z) in d.iter_mut().zip(pairs(r)) {
        *x = atan2f(z[1], z[0]);
    }
}

/// Scales to unit L2 norm and returns the applied factor (1 if the norm is
/// below `f32::MIN_POSITIVE`).
pub fn cpxnormalize(d: &mut [f32]) -> f32 {
    real::normalize(d)
}

/// Replaces elements with `|z| <= lim` by `(rep, 0)`.
pub fn cpxprune(d: &mut [f32], lim: f32, rep: f32) {
    let lim2 = lim * lim;
    for z in pairs_mut(d) {
        if z[0] * z[0] + z[1] * z[1] <= lim2 {
            z[0] = rep;
            z[1] = 0.0;
        }
    }
}

// ============================================================================
// Buffer moves
// ============================================================================

/// Fills every element with `c`.
pub fn cpxset(d: &mut [f32], c: Complex) {
    for z in pairs_mut(d) {
        z[0] = c.re;
        z[1] = c.im;
    }
}

/// Copies `r` into `d`.
pub fn cpxcopy(d: &mut [f32], r: &[f32]) {
    real::copy(d, r);
}

/// Exchanges `d` and `r`.
pub fn cpxswap(d: &mut [f32], r: &mut [f32]) {
    real::swap(d, r);
}

// ============================================================================
// Arithmetic
// ============================================================================

/// `d + c -> d`.
pub fn cpxadd(d: &mut [f32], c: Complex) {
    for z in pairs_mut(d) {
        z[0] += c.re;
        z[1] += c.im;
    }
}

/// `d + r -> d`.
pub fn cpxadd_vec(d: &mut [f32], r: &[f32]) {
    real::add_vec(d, r);
}

/// `d - c -> d`.
pub fn cpxsub(d: &mut [f32], c: Complex) {
    cpxadd(d, -c);
}

/// `d - r -> d`.
pub fn cpxsub_vec(d: &mut [f32], r: &[f32]) {
    real::sub_vec(d, r);
}

/// `c·d -> d`.
pub fn cpxmul(d: &mut [f32], c: Complex) {
    for z in pairs_mut(d) {
        let p = Complex::new(z[0], z[1]) * c;
        z[0] = p.re;
        z[1] = p.im;
    }
}

/// Elementwise complex product `d·r -> d`.
pub fn cpxmul_vec(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    for (z, w) in pairs_mut(d).zip(pairs(r)) {
        let p = Complex::new(z[0], z[1]) * Complex::new(w[0], w[1]);
        z[0] = p.re;
        z[1] = p.im;
    }
}

/// Multiply-accumulate `d + c·r -> d`.
pub fn cpxmac(d: &mut [f32], r: &[f32], c: Complex) {
    debug_assert_eq!(d.len(), r.len());
    for (z, w) in pairs_mut(d).zip(pairs(r)) {
        let p = Complex::new(w[0], w[1]) * c;
        z[0] += p.re;
        z[1] += p.im;
    }
}

// ============================================================================
// Conversions
// ============================================================================

/// Extracts the real parts of `r` into `d`.
pub fn cpxre(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len() * 2, r.len());
    for (x, z) in d.iter_mut().zip(pairs(r)) {
        *x = z[0];
    }
}

/// Extracts the imaginary parts of `r` into `d`.
pub fn cpxim(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len() * 2, r.len());
    for (x, z) in d.iter_mut().zip(pairs(r)) {
        *x = z[1];
    }
}

/// Builds a complex buffer from optional real and imaginary parts. A missing
/// part is filled with zeros.
pub fn realtocpx(d: &mut [f32], re: Option<&[f32]>, im: Option<&[f32]>) {
    let n = d.len() / 2;
    debug_assert!(re.is_none_or(|r| r.len() == n));
    debug_assert!(im.is_none_or(|r| r.len() == n));
    for (i, z) in pairs_mut(d).enumerate() {
        z[0] = re.map_or(0.0, |r| r[i]);
        z[1] = im.map_or(0.0, |r| r[i]);
    }
}

/// Converts `(magnitude, phase)` pairs to cartesian form in place.
pub fn cpxptc(d: &mut [f32]) {
    for z in pairs_mut(d) {
        let (m, p) = (z[0], z[1]);
        z[0] = m * cosf(p);
        z[1] = m * sinf(p);
    }
}

/// Replaces the magnitude of each element of `d` by `mag[i]`, keeping its
/// phase. Zero elements become `(mag·sqrt(1/MIN_POSITIVE)·0, …)`, i.e. zero.
pub fn cpxcombine(d: &mut [f32], mag: &[f32]) {
    debug_assert_eq!(d.len(), mag.len() * 2);
    for (z, &m) in pairs_mut(d).zip(mag) {
        let k = m / sqrtf((z[0] * z[0] + z[1] * z[1]).max(f32::MIN_POSITIVE));
        z[0] *= k;
        z[1] *= k;
    }
}

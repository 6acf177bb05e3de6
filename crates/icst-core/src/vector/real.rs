//! Elementary operations on real `f32` arrays.
//!
//! Reductions accumulate in `f64`, so results do not depend on how the
//! compiler vectorizes the loops. Operations taking two slices expect equal
//! lengths; a mismatch is a caller error checked with `debug_assert!`.

use libm::{cosf, expf, sinf, sqrtf};

use crate::fast_math::fast_ln_abs;

pub use crate::math::nexthipow2;

/// Integration rule for [`integrate`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Integration {
    /// `y[n+1] = y[n] + (x[n+1] + x[n]) / 2`.
    Trapezoidal,
    /// `y[n+1] = y[n] + 13/24·(x[n+1] + x[n]) - 1/24·(x[n+2] + x[n-1])`.
    ///
    /// `prev` and `next` are the samples just outside the block.
    FourthOrder {
        /// Sample preceding `d[0]`.
        prev: f32,
        /// Sample following the last element.
        next: f32,
    },
}

// ============================================================================
// Reductions
// ============================================================================

/// Sum of all elements, accumulated in `f64`.
pub fn sum(d: &[f32]) -> f32 {
    d.iter().map(|&x| f64::from(x)).sum::<f64>() as f32
}

/// Signal energy `<d, d>`.
pub fn energy(d: &[f32]) -> f32 {
    d.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>() as f32
}

/// Dot product `<d, r>`.
pub fn dotp(d: &[f32], r: &[f32]) -> f32 {
    debug_assert_eq!(d.len(), r.len());
    d.iter()
        .zip(r)
        .map(|(&a, &b)| f64::from(a) * f64::from(b))
        .sum::<f64>() as f32
}

/// L2 norm `sqrt(<d, d>)`.
pub fn norm(d: &[f32]) -> f32 {
    sqrtf(energy(d))
}

/// Signal power `<d, d> / len`. Zero for an empty slice.
pub fn power(d: &[f32]) -> f32 {
    if d.is_empty() {
        0.0
    } else {
        energy(d) / d.len() as f32
    }
}

/// RMS value `sqrt(<d, d> / len)`.
pub fn rms(d: &[f32]) -> f32 {
    sqrtf(power(d))
}

/// Largest absolute value, zero for an empty slice.
pub fn getmaxabs(d: &[f32]) -> f32 {
    d.iter().fold(0.0f32, |m, &x| m.max(x.abs()))
}

/// Squared euclidean distance between `d` and `r`.
pub fn sdist(d: &[f32], r: &[f32]) -> f32 {
    debug_assert_eq!(d.len(), r.len());
    d.iter().zip(r).map(|(&a, &b)| (a - b) * (a - b)).sum()
}

// ============================================================================
// Index searches
// ============================================================================

/// Index of the first maximum. Returns 0 for an empty slice.
pub fn maxi(d: &[f32]) -> usize {
    let mut idx = 0;
    for i in 1..d.len() {
        if d[i] > d[idx] {
            idx = i;
        }
    }
    idx
}

/// Index of the first minimum. Returns 0 for an empty slice.
pub fn mini(d: &[f32]) -> usize {
    let mut idx = 0;
    for i in 1..d.len() {
        if d[i] < d[idx] {
            idx = i;
        }
    }
    idx
}

/// Index of the first element with maximum `|d[i] - r|`.
pub fn farthesti(d: &[f32], r: f32) -> usize {
    let mut idx = 0;
    let mut diff = d.first().map_or(0.0, |&x| (x - r).abs());
    for (i, &x) in d.iter().enumerate().skip(1) {
        let e = (x - r).abs();
        if e > diff {
            diff = e;
            idx = i;
        }
    }
    idx
}

/// Index of the first element with minimum `|d[i] - r|`.
pub fn nearesti(d: &[f32], r: f32) -> usize {
    let mut idx = 0;
    let mut diff = d.first().map_or(0.0, |&x| (x - r).abs());
    for (i, &x) in d.iter().enumerate().skip(1) {
        let e = (x - r).abs();
        if e < diff {
            diff = e;
            idx = i;
        }
    }
    idx
}

// ============================================================================
// Calculus
// ============================================================================

/// Running sum, accumulated in `f64`.
pub fn cumsum(d: &mut [f32]) {
    let mut acc = 0.0f64;
    for x in d.iter_mut() {
        acc += f64::from(*x);
        *x = acc as f32;
    }
}

/// Differentiates `d` in place, normalized so that a ramp from 0 to 1 over
/// the block has derivative 1.
///
/// Uses a 5-point stencil in the interior and 3-point stencils for the first
/// two and last two samples.
pub fn diff(d: &mut [f32]) {
    let size = d.len();
    match size {
        0 => return,
        1 => {
            d[0] = 0.0;
            return;
        }
        2 => {
            let x = d[1] - d[0];
            d[0] = x;
            d[1] = x;
            return;
        }
        _ => {}
    }
    let c1 = 0.5 * (size - 1) as f32;
    let c2 = c1 / 6.0;
    let c3 = 8.0 * c2;

    let mut dm1 = d[0];
    d[0] = c1 * (4.0 * d[1] - d[2] - 3.0 * d[0]);
    let mut dm2 = dm1;
    dm1 = d[1];
    d[1] = c1 * (d[2] - dm2);
    for i in 2..size.saturating_sub(2) {
        let t = d[i];
        d[i] = c3 * (d[i + 1] - dm1) - c2 * (d[i + 2] - dm2);
        dm2 = dm1;
        dm1 = t;
    }
    if size > 3 {
        let t = d[size - 2];
        d[size - 2] = c1 * (d[size - 1] - dm1);
        dm2 = dm1;
        dm1 = t;
    }
    d[size - 1] = c1 * (3.0 * d[size - 1] - 4.0 * dm1 + dm2);
}

/// Integrates `d` in place, normalized so that a constant 1 integrates to a
/// ramp from 0 to 1 over the block. `d[0]` becomes 0.
pub fn integrate(d: &mut [f32], rule: Integration) {
    let size = d.len();
    if size == 0 {
        return;
    }
    if size == 1 {
        d[0] = 0.0;
        return;
    }
    let mut y = 0.0f64;
    match rule {
        Integration::Trapezoidal => {
            let c1 = 0.5 / (size - 1) as f32;
            let mut xm1 = d[0];
            d[0] = 0.0;
            for v in d.iter_mut().skip(1) {
                let x = *v;
                y += f64::from(c1 * (x + xm1));
                xm1 = x;
                *v = y as f32;
            }
        }
        Integration::FourthOrder { prev, next } => {
            let c1 = 1.0 / (24.0 * (size - 1) as f32);
            let c2 = 13.0 * c1;
            let mut xm2 = prev;
            let mut xm1 = d[0];
            let mut xp1 = d[1];
            d[0] = 0.0;
            for i in 1..size - 1 {
                let x = xp1;
                xp1 = d[i + 1];
                y += f64::from(c2 * (x + xm1) - c1 * (xp1 + xm2));
                xm2 = xm1;
                xm1 = x;
                d[i] = y as f32;
            }
            y += f64::from(c2 * (xp1 + xm1) - c1 * (next + xm2));
            d[size - 1] = y as f32;
        }
    }
}

// ============================================================================
// Element setters
// ============================================================================

/// Fills `d` with `c`.
pub fn set(d: &mut [f32], c: f32) {
    d.fill(c);
}

/// Replaces elements with `|d[i]| <= lim` by `±rep`, keeping the sign.
pub fn prune(d: &mut [f32], lim: f32, rep: f32) {
    for x in d.iter_mut() {
        if x.abs() <= lim {
            *x = if *x >= 0.0 { rep } else { -rep };
        }
    }
}

/// Clamps every element to `[lo, hi]`.
pub fn limit(d: &mut [f32], hi: f32, lo: f32) {
    for x in d.iter_mut() {
        *x = x.min(hi).max(lo);
    }
}

/// Replaces each element by ±1. The sign of zero follows IEEE 754.
pub fn sgn(d: &mut [f32]) {
    for x in d.iter_mut() {
        *x = 1.0f32.copysign(*x);
    }
}

/// Absolute value.
pub fn abs(d: &mut [f32]) {
    for x in d.iter_mut() {
        *x = x.abs();
    }
}

// ============================================================================
// Elementwise math
// ============================================================================

/// Reciprocal `1/d`.
pub fn finv(d: &mut [f32]) {
    for x in d.iter_mut() {
        *x = 1.0 / *x;
    }
}

/// Square root.
pub fn fsqrt(d: &mut [f32]) {
    for x in d.iter_mut() {
        *x = sqrtf(*x);
    }
}

/// Sine.
pub fn fsin(d: &mut [f32]) {
    for x in d.iter_mut() {
        *x = sinf(*x);
    }
}

/// Cosine.
pub fn fcos(d: &mut [f32]) {
    for x in d.iter_mut() {
        *x = cosf(*x);
    }
}

/// Natural logarithm of `|d|`, absolute error < 1e-6.
pub fn logabs(d: &mut [f32]) {
    for x in d.iter_mut() {
        *x = fast_ln_abs(*x);
    }
}

/// Natural exponential.
pub fn fexp(d: &mut [f32]) {
    for x in d.iter_mut() {
        *x = expf(*x);
    }
}

// ============================================================================
// Order and scale
// ============================================================================

/// Reverses the element order.
pub fn reverse(d: &mut [f32]) {
    d.reverse();
}

/// Scales `d` to unit L2 norm and returns the applied factor.
///
/// A vector with norm below `f32::MIN_POSITIVE` is left unchanged and the
/// returned factor is 1.
pub fn normalize(d: &mut [f32]) -> f32 {
    let n = norm(d);
    if n >= f32::MIN_POSITIVE {
        let k = 1.0 / n;
        mul(d, k);
        k
    } else {
        1.0
    }
}

// ============================================================================
// Buffer moves
// ============================================================================

/// Copies `r` into `d`.
pub fn copy(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    d.copy_from_slice(r);
}

/// Exchanges the contents of `d` and `r`.
pub fn swap(d: &mut [f32], r: &mut [f32]) {
    debug_assert_eq!(d.len(), r.len());
    d.swap_with_slice(r);
}

// ============================================================================
// Arithmetic
// ============================================================================

/// `d + c -> d`.
pub fn add(d: &mut [f32], c: f32) {
    for x in d.iter_mut() {
        *x += c;
    }
}

/// `d + r -> d`.
pub fn add_vec(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    for (x, &y) in d.iter_mut().zip(r) {
        *x += y;
    }
}

/// `d - c -> d`.
pub fn sub(d: &mut [f32], c: f32) {
    add(d, -c);
}

/// `d - r -> d`.
pub fn sub_vec(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    for (x, &y) in d.iter_mut().zip(r) {
        *x -= y;
    }
}

/// `c·d -> d`.
pub fn mul(d: &mut [f32], c: f32) {
    for x in d.iter_mut() {
        *x *= c;
    }
}

/// Elementwise product `d·r -> d`.
pub fn mul_vec(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    for (x, &y) in d.iter_mut().zip(r) {
        *x *= y;
    }
}

/// Multiply-accumulate `d + c·r -> d`.
pub fn mac(d: &mut [f32], r: &[f32], c: f32) {
    debug_assert_eq!(d.len(), r.len());
    for (x, &y) in d.iter_mut().zip(r) {
        *x += c * y;
    }
}

/// Elementwise maximum `max(d, r) -> d`.
pub fn max(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    for (x, &y) in d.iter_mut().zip(r) {
        *x = x.max(y);
    }
}

/// Elementwise minimum `min(d, r) -> d`.
pub fn min(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    for (x, &y) in d.iter_mut().zip(r) {
        *x = x.min(y);
    }
}

//! Symbolic polynomial arithmetic, root finding and Chebyshev series.
//!
//! Polynomials are `f64` coefficient slices in ascending powers:
//! `c[0] + c[1]·x + ... + c[d]·x^d`. Complex roots are interleaved
//! `[re0, im0, re1, im1, ...]`.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f64::consts::PI;

use libm::{cos, floor, sqrt};

use crate::math::{lcg_step, lcg_to_float};

// ============================================================================
// Arithmetic
// ============================================================================

/// `a += b`. `a` holds a polynomial of degree `da` and must have room for
/// degree `max(da, b.len() - 1)`.
pub fn addpoly(a: &mut [f64], da: usize, b: &[f64]) {
    for (i, &y) in b.iter().enumerate() {
        if i <= da {
            a[i] += y;
        } else {
            a[i] = y;
        }
    }
}

/// `a -= b`, sized as in [`addpoly`].
pub fn subpoly(a: &mut [f64], da: usize, b: &[f64]) {
    for (i, &y) in b.iter().enumerate() {
        if i <= da {
            a[i] -= y;
        } else {
            a[i] = -y;
        }
    }
}

/// Multiplies every coefficient by `a`.
pub fn mulpoly(c: &mut [f64], a: f64) {
    for x in c.iter_mut() {
        *x *= a;
    }
}

/// Polynomial product `a = a·b`, in place.
///
/// `a` holds degree `da` on entry and degree `da + b.len() - 1` on return.
///
/// # Examples
///
/// ```
/// use icst_core::special::pmulpoly;
///
/// // (1 + x)(1 - x) = 1 - x²
/// let mut a = [1.0, 1.0, 0.0];
/// pmulpoly(&mut a, 1, &[1.0, -1.0]);
/// assert_eq!(a, [1.0, 0.0, -1.0]);
/// ```
pub fn pmulpoly(a: &mut [f64], da: usize, b: &[f64]) {
    if b.is_empty() {
        return;
    }
    let db = b.len() - 1;
    let dtot = da + db;
    debug_assert!(a.len() > dtot);
    for i in (0..=dtot).rev() {
        let jlo = i.saturating_sub(da);
        let jhi = i.min(db);
        a[i] = (jlo..=jhi).map(|j| a[i - j] * b[j]).sum();
    }
}

/// Substitutes `x ← a` for the argument: `c[i] *= a^i`.
pub fn scalepoly(c: &mut [f64], a: f64) {
    let mut x = 1.0;
    for v in c.iter_mut() {
        *v *= x;
        x *= a;
    }
}

/// Substitutes polynomial `b` for the argument of `a`.
///
/// `a` holds degree `da` on entry and degree `da·(b.len() - 1)` on return.
/// Allocates a scratch buffer.
///
/// # Examples
///
/// ```
/// use icst_core::special::sspoly;
///
/// // a(x) = x², b(x) = 1 + x  ->  1 + 2x + x²
/// let mut a = [0.0, 0.0, 1.0];
/// sspoly(&mut a, 2, &[1.0, 1.0]);
/// assert_eq!(a, [1.0, 2.0, 1.0]);
/// ```
pub fn sspoly(a: &mut [f64], da: usize, b: &[f64]) {
    if b.is_empty() {
        return;
    }
    let db = b.len() - 1;
    let rsize = da * db + 1;
    debug_assert!(a.len() >= rsize);
    let mut c = vec![0.0f64; rsize];
    c[0] = a[da];
    let mut deg = 0;
    for i in (0..da).rev() {
        pmulpoly(&mut c, deg, b);
        c[0] += a[i];
        deg += db;
    }
    a[..rsize].copy_from_slice(&c);
}

/// Reverses the coefficient order, i.e. computes `x^d·c(1/x)`.
pub fn revpoly(c: &mut [f64]) {
    c.reverse();
}

/// Derivative, in place. The top coefficient becomes 0.
pub fn diffpoly(c: &mut [f64]) {
    let Some(d) = c.len().checked_sub(1) else {
        return;
    };
    for i in 0..d {
        c[i] = (i + 1) as f64 * c[i + 1];
    }
    c[d] = 0.0;
}

/// Antiderivative with zero constant term, in place.
///
/// `c[..len-1]` holds the input; the result uses all of `c`.
pub fn integratepoly(c: &mut [f64]) {
    let Some(d) = c.len().checked_sub(1) else {
        return;
    };
    for i in (1..=d).rev() {
        c[i] = c[i - 1] / i as f64;
    }
    c[0] = 0.0;
}

// ============================================================================
// Roots
// ============================================================================

fn restart(seed: &mut u32) -> f64 {
    *seed = lcg_step(*seed);
    f64::from(lcg_to_float(*seed)) - 3.0
}

/// Finds all roots of the polynomial `k` by Laguerre iteration with
/// deflation.
///
/// `k` is destroyed. `r` receives `d` complex roots, where `d` is the degree
/// after removing vanishing top coefficients, which is also the return
/// value. Zero roots are reported first, complex roots as conjugate pairs.
///
/// Stalled iterations restart from a pseudo-random real point drawn from a
/// fixed-seed generator, so results are reproducible. Returns `None` if the
/// iteration budget of 40 steps per root is exhausted.
///
/// # Examples
///
/// ```
/// use icst_core::special::findroot;
///
/// // (x - 1)(x - 2)(x - 3)
/// let mut k = [-6.0, 11.0, -6.0, 1.0];
/// let mut r = [0.0; 6];
/// assert_eq!(findroot(&mut k, &mut r), Some(3));
/// let mut re: Vec<f64> = r.chunks(2).map(|z| z[0]).collect();
/// re.sort_by(f64::total_cmp);
/// assert!((re[0] - 1.0).abs() < 1e-9 && (re[2] - 3.0).abs() < 1e-9);
/// ```
pub fn findroot(k: &mut [f64], r: &mut [f64]) -> Option<usize> {
    const MINERR: f64 = 5.0e-7 * f32::EPSILON as f64;
    const MAXITER: usize = 40;
    const EPSINC: f64 = 1.414_213_5;

    let Some(mut d) = k.len().checked_sub(1) else {
        return Some(0);
    };
    while d > 0 && k[d] == 0.0 {
        d -= 1;
    }
    debug_assert!(r.len() >= 2 * d);
    let mut cnt = 0;
    let mut ridx = 0;
    while d > cnt && k[cnt] == 0.0 {
        r[ridx] = 0.0;
        r[ridx + 1] = 0.0;
        ridx += 2;
        cnt += 1;
    }
    let mut budget = d * MAXITER;
    let mut seed = 0x5EED_0001u32;

    loop {
        let m = d - cnt;
        if m < 3 {
            solve_low_degree(&k[cnt..=d], &mut r[ridx..]);
            return Some(d);
        }
        let n = m as f64;
        let nm1 = n - 1.0;
        let kmax = k[cnt..d].iter().fold(0.0f64, |a, &x| a.max(x.abs()));
        let mut bound = 1.0 + kmax / k[d].abs();
        bound *= 4.0 * bound;

        let (mut xre, mut xim) = (0.0f64, 0.0f64);
        let mut eps = MINERR;
        let mut j = 0;
        loop {
            let cxre = xre * (1.0 + eps);
            let (mut pre, mut pim) = (k[d], 0.0f64);
            let (mut ure, mut uim) = (k[d], 0.0f64);
            let (mut pdre, mut pdim, mut pd2re, mut pd2im) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
            for i in (cnt..d).rev() {
                let t = pd2re;
                pd2re = pdre + pd2re * xre - pd2im * xim;
                pd2im = pdim + t * xim + pd2im * xre;
                let t = pdre;
                pdre = pre + pdre * xre - pdim * xim;
                pdim = pim + t * xim + pdim * xre;
                let t = pre;
                pre = k[i] + pre * xre - pim * xim;
                pim = t * xim + pim * xre;
                let t = ure;
                ure = k[i] + ure * cxre - uim * xim;
                uim = t * xim + uim * cxre;
            }
            pd2re *= 2.0;
            pd2im *= 2.0;

            // converged once |p(x)| no longer exceeds the change caused by
            // a relative perturbation of eps
            ure -= pre;
            uim -= pim;
            if pre * pre + pim * pim <= ure * ure + uim * uim {
                break;
            }
            if budget == 0 {
                #[cfg(feature = "tracing")]
                tracing::debug!(degree = d, "findroot: iteration budget exhausted");
                return None;
            }
            if j >= MAXITER {
                xre = restart(&mut seed);
                xim = 0.0;
                j = 0;
                eps = MINERR;
                continue;
            }
            eps *= EPSINC;
            j += 1;

            // Laguerre step
            let gre = pdre * pdre - pdim * pdim;
            let gim = 2.0 * pdre * pdim;
            let hre = pre * pd2re - pim * pd2im;
            let him = pre * pd2im + pim * pd2re;
            let tre = nm1 * (nm1 * gre - n * hre);
            let tim = nm1 * (nm1 * gim - n * him);
            let mag = sqrt(tre * tre + tim * tim);
            let sim = sqrt((0.5 * (mag - tre)).max(0.0));
            let sim = if tim >= 0.0 { sim } else { -sim };
            let sre = sqrt((0.5 * (mag + tre)).max(0.0));
            let (dre, dim) = if pdre * sre + pdim * sim >= 0.0 {
                (pdre + sre, pdim + sim)
            } else {
                (pdre - sre, pdim - sim)
            };
            let den = dre * dre + dim * dim;
            if den > 0.0 {
                let s = n / den;
                xre -= s * (pre * dre + pim * dim);
                xim -= s * (pim * dre - pre * dim);
                if xre * xre + xim * xim > bound {
                    xre = restart(&mut seed);
                    xim = 0.0;
                    j = 0;
                    eps = MINERR;
                }
            } else {
                xre = restart(&mut seed);
                xim = 0.0;
                j = 0;
                eps = MINERR;
            }
            budget -= 1;
        }

        eps *= sqrt(eps);
        let (re2, im2) = (xre * xre, xim * xim);
        if im2 <= eps * re2 {
            r[ridx] = xre;
            r[ridx + 1] = 0.0;
            for i in (cnt + 1..=d).rev() {
                k[i - 1] += xre * k[i];
            }
            cnt += 1;
            ridx += 2;
        } else {
            r[ridx] = xre;
            r[ridx + 1] = xim;
            r[ridx + 2] = xre;
            r[ridx + 3] = -xim;
            let (tre, tim) = (-2.0 * xre, re2 + im2);
            for i in (cnt + 2..=d).rev() {
                k[i - 1] -= tre * k[i];
                k[i - 2] -= tim * k[i];
            }
            cnt += 2;
            ridx += 4;
        }
    }
}

fn solve_low_degree(k: &[f64], r: &mut [f64]) {
    match k.len() {
        2 => {
            r[0] = -k[0] / k[1];
            r[1] = 0.0;
        }
        3 => {
            let disc = k[1] * k[1] - 4.0 * k[2] * k[0];
            let scl = -0.5 / k[2];
            if disc >= 0.0 {
                let s = sqrt(disc);
                r[0] = scl * (k[1] - s);
                r[1] = 0.0;
                r[2] = scl * (k[1] + s);
                r[3] = 0.0;
            } else {
                let s = sqrt(-disc);
                r[0] = scl * k[1];
                r[1] = scl * s;
                r[2] = r[0];
                r[3] = -r[1];
            }
        }
        _ => {}
    }
}

/// Roots of `c` without modifying it. See [`findroot`].
pub fn roots(c: &[f64], r: &mut [f64]) -> Option<usize> {
    let mut k = c.to_vec();
    findroot(&mut k, r)
}

/// Builds the monic polynomial with the complex roots `r`.
///
/// The complex coefficients are split into `cre` and `cim`, each of length
/// `r.len() / 2 + 1`. For conjugate-symmetric roots `cim` is zero.
pub fn roottops(cre: &mut [f64], cim: &mut [f64], r: &[f64]) {
    let d = r.len() / 2;
    debug_assert!(cre.len() > d && cim.len() > d);
    cre[0] = 1.0;
    cim[0] = 0.0;
    for i in 0..d {
        let (xre, xim) = (r[2 * i], r[2 * i + 1]);
        cre[i + 1] = cre[i];
        cim[i + 1] = cim[i];
        for j in (1..=i).rev() {
            let t = cre[j];
            cre[j] = cre[j - 1] - xre * cre[j] + xim * cim[j];
            cim[j] = cim[j - 1] - xre * cim[j] - xim * t;
        }
        let t = cre[0];
        cre[0] = -xre * cre[0] + xim * cim[0];
        cim[0] = -xre * cim[0] - xim * t;
    }
}

// ============================================================================
// Chebyshev series
// ============================================================================

/// Fills `c[..=d]` with the power series of the Chebyshev polynomial `T_d`.
pub fn chebypoly(c: &mut [f64], d: usize) {
    debug_assert!(c.len() > d);
    if d == 0 {
        c[0] = 1.0;
        return;
    }
    c[..=d].fill(0.0);
    c[1] = 1.0;
    let mut prev = vec![0.0f64; d + 1];
    prev[0] = 1.0;
    for i in 2..=d {
        c[i] = 2.0 * c[i - 1];
        for j in (1..i).rev() {
            let x = prev[j];
            prev[j] = c[j];
            c[j] = 2.0 * c[j - 1] - x;
        }
        let x = prev[0];
        prev[0] = c[0];
        c[0] = -x;
    }
}

/// Converts a Chebyshev series `Σ c[i]·T_i(x)` into power series
/// coefficients, in place.
pub fn chebytops(c: &mut [f64]) {
    let n = c.len();
    let mut acc = vec![0.0f64; n];
    let mut t = vec![0.0f64; n];
    for i in 0..n {
        chebypoly(&mut t, i);
        for j in 0..=i {
            acc[j] += c[i] * t[j];
        }
    }
    c.copy_from_slice(&acc);
}

/// Converts power series coefficients into a Chebyshev series, in place.
pub fn pstocheby(c: &mut [f64]) {
    let Some(d) = c.len().checked_sub(1) else {
        return;
    };
    let mut y = 1.0;
    c[0] *= 2.0;
    for i in 1..=d {
        let (mut a, mut b) = (i as f64, 1.0f64);
        let mut x = y * c[i];
        c[i] = 0.0;
        let mut j = i as isize;
        while j >= 0 {
            c[j as usize] += x;
            x *= a / b;
            a -= 1.0;
            b += 1.0;
            j -= 2;
        }
        y *= 0.5;
    }
    c[0] *= 0.5;
}

/// Chebyshev approximation of degree `c.len() - 1` to the function
/// tabulated in `y` over `[-1, 1]`.
///
/// The table is interpolated linearly, so it should be dense enough for
/// that to be accurate. Returns the maximum error at the table points
/// relative to `max|y|`. Allocates a scratch buffer.
///
/// # Examples
///
/// ```
/// use icst_core::special::chebyapprox;
///
/// // y = x² on [-1, 1] is 0.5·T0 + 0.5·T2
/// let y: Vec<f32> = (0..513).map(|i| { let x = -1.0 + i as f32 / 256.0; x * x }).collect();
/// let mut c = [0.0f64; 3];
/// let err = chebyapprox(&mut c, &y);
/// assert!((c[0] - 0.5).abs() < 1e-4 && (c[2] - 0.5).abs() < 1e-4);
/// assert!(err < 1e-4);
/// ```
pub fn chebyapprox(c: &mut [f64], y: &[f32]) -> f32 {
    let size = y.len();
    if size < 2 || c.is_empty() {
        return 0.0;
    }
    let d = c.len() - 1;
    let w = PI / size as f64;
    let scl = 2.0 / size as f64;
    let sz = (size - 1) as f64;

    let samples: Vec<f64> = (0..size)
        .map(|i| {
            let x = sz * (0.5 + 0.5 * cos(w * (i as f64 + 0.5)));
            let offset = floor(x);
            let j = (offset as usize).min(size - 2);
            let x = x - j as f64;
            (1.0 - x) * f64::from(y[j]) + x * f64::from(y[j + 1])
        })
        .collect();
    for (j, cj) in c.iter_mut().enumerate() {
        let s: f64 = samples
            .iter()
            .enumerate()
            .map(|(i, &v)| v * cos(w * j as f64 * (i as f64 + 0.5)))
            .sum();
        *cj = scl * s;
    }
    c[0] *= 0.5;

    let mut err = 0.0f64;
    let mut maxabs = 0.0f64;
    for (j, &yj) in y.iter().enumerate() {
        let a2 = -2.0 + 4.0 * j as f64 / sz;
        let (mut x, mut a1) = (0.0f64, 0.0f64);
        for &ci in c[1..=d].iter().rev() {
            let a3 = x;
            x = a2 * x - a1 + ci;
            a1 = a3;
        }
        x = 0.5 * a2 * x - a1 + c[0];
        err = err.max((x - f64::from(yj)).abs());
        maxabs = maxabs.max(f64::from(yj).abs());
    }
    if maxabs > 0.0 { (err / maxabs) as f32 } else { err as f32 }
}

// ============================================================================
// Cubic interpolation
// ============================================================================

/// Hermite cubic through `(x0, y0)` and `(x1, y1)` with slopes `m0`, `m1`.
///
/// Returns the ascending coefficients in absolute `x`. Coincident points
/// give the constant `(y0 + y1) / 2`.
pub fn fitcubic(x0: f32, y0: f32, m0: f32, x1: f32, y1: f32, m1: f32) -> [f64; 4] {
    let dx = x0 - x1;
    if dx.abs() < f32::MIN_POSITIVE {
        return [f64::from(0.5 * (y0 + y1)), 0.0, 0.0, 0.0];
    }
    let invdx = 1.0 / dx;
    let m = invdx * (y0 - y1);
    let c3 = (m0 + m1 - 2.0 * m) * invdx * invdx;
    let c2 = (m0 - m) * invdx - (2.0 * x0 + x1) * c3;
    let c1 = m - c2 * (x1 + x0) - c3 * (x1 * x1 + x0 * x0 + x1 * x0);
    let c0 = y0 - ((c3 * x0 + c2) * x0 + c1) * x0;
    [f64::from(c0), f64::from(c1), f64::from(c2), f64::from(c3)]
}

/// Cubic between `(x[1], y[1])` and `(x[2], y[2])` with slopes estimated
/// from the outer neighbours.
pub fn fitcubic_points(x: &[f32; 4], y: &[f32; 4]) -> [f64; 4] {
    let dx = x[2] - x[1];
    if dx.abs() < f32::MIN_POSITIVE {
        return [f64::from(0.5 * (y[1] + y[2])), 0.0, 0.0, 0.0];
    }
    let mm = (y[2] - y[1]) / dx;
    let slope = |dx: f32, dy: f32| {
        if dx.abs() < f32::MIN_POSITIVE {
            mm
        } else {
            0.5 * (mm + dy / dx)
        }
    };
    let m0 = slope(x[1] - x[0], y[1] - y[0]);
    let m1 = slope(x[3] - x[2], y[3] - y[2]);
    fitcubic(x[1], y[1], m0, x[2], y[2], m1)
}

/// Catmull-Rom cubic for samples at `x = -1, 0, 1, 2`, valid on `[0, 1]`.
///
/// # Examples
///
/// ```
/// use icst_core::special::fitcubic_uniform;
///
/// let c = fitcubic_uniform(&[0.0, 1.0, 2.0, 3.0]);
/// assert_eq!(c, [1.0, 1.0, 0.0, 0.0]);
/// ```
pub fn fitcubic_uniform(y: &[f32; 4]) -> [f32; 4] {
    let m0 = 0.5 * (y[2] - y[0]);
    let m1 = 0.5 * (y[3] - y[1]);
    let mm = y[2] - y[1];
    let a = m0 + m1 - 2.0 * mm;
    [y[1], m0, mm - m0 - a, a]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(c: &[f64], x: f64) -> f64 {
        c.iter().rev().fold(0.0, |acc, &k| acc * x + k)
    }

    // ---- arithmetic ----

    #[test]
    fn add_sub_grow_degree() {
        let mut a = [1.0, 2.0, 0.0, 0.0];
        addpoly(&mut a, 1, &[1.0, 1.0, 1.0, 1.0]);
        assert_eq!(a, [2.0, 3.0, 1.0, 1.0]);
        subpoly(&mut a, 3, &[2.0, 3.0]);
        assert_eq!(a, [0.0, 0.0, 1.0, 1.0]);
        let mut b = [1.0, 0.0, 0.0];
        subpoly(&mut b, 0, &[0.0, 0.0, 4.0]);
        assert_eq!(b, [1.0, 0.0, -4.0]);
    }

    #[test]
    fn multiply_with_shorter_and_longer_factor() {
        let mut a = [1.0, 2.0, 3.0, 0.0];
        pmulpoly(&mut a, 2, &[0.0, 1.0]);
        assert_eq!(a, [0.0, 1.0, 2.0, 3.0]);
        let mut b = [2.0, 0.0, 0.0, 0.0];
        pmulpoly(&mut b, 0, &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(b, [2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn scale_reverse_and_calculus() {
        let mut c = [1.0, 1.0, 1.0];
        scalepoly(&mut c, 2.0);
        assert_eq!(c, [1.0, 2.0, 4.0]);
        mulpoly(&mut c, 0.5);
        revpoly(&mut c);
        assert_eq!(c, [2.0, 1.0, 0.5]);
        diffpoly(&mut c);
        assert_eq!(c, [1.0, 1.0, 0.0]);
        integratepoly(&mut c);
        assert_eq!(c, [0.0, 1.0, 0.5]);
    }

    // ---- roots ----

    #[test]
    fn roots_with_zero_root_and_pair() {
        // x(x² - 1)
        let mut r = [0.0; 6];
        assert_eq!(roots(&[0.0, -1.0, 0.0, 1.0], &mut r), Some(3));
        assert_eq!(&r[..2], &[0.0, 0.0]);
        assert!((r[2].abs() - 1.0).abs() < 1e-12 && (r[4].abs() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn roots_of_quartic_are_complex_pairs() {
        // x⁴ + 1: roots e^{±iπ/4}, e^{±i3π/4}
        let c = [1.0, 0.0, 0.0, 0.0, 1.0];
        let mut r = [0.0; 8];
        assert_eq!(roots(&c, &mut r), Some(4));
        for z in r.chunks(2) {
            assert!((z[0] * z[0] + z[1] * z[1] - 1.0).abs() < 1e-9);
            assert!((z[0].abs() - core::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
        }
        let (mut cre, mut cim) = ([0.0; 5], [0.0; 5]);
        roottops(&mut cre, &mut cim, &r);
        for i in 0..5 {
            assert!((cre[i] - c[i]).abs() < 1e-9);
            assert!(cim[i].abs() < 1e-9);
        }
    }

    #[test]
    fn roots_of_high_degree_polynomial() {
        // (x - 0.5)(x + 0.25)(x - 2)(x² + x + 1)(x - 3)
        let mut c = vec![1.0];
        let mut deg = 0;
        for f in [[-0.5, 1.0], [0.25, 1.0], [-2.0, 1.0], [-3.0, 1.0]] {
            c.push(0.0);
            pmulpoly(&mut c, deg, &f);
            deg += 1;
        }
        c.extend([0.0, 0.0]);
        pmulpoly(&mut c, deg, &[1.0, 1.0, 1.0]);
        let mut r = vec![0.0; 12];
        assert_eq!(roots(&c, &mut r), Some(6));
        for z in r.chunks(2) {
            // |p(z)| tiny at each reported root
            let (mut pre, mut pim) = (0.0f64, 0.0f64);
            for &k in c.iter().rev() {
                let t = pre * z[0] - pim * z[1] + k;
                pim = pre * z[1] + pim * z[0];
                pre = t;
            }
            assert!(pre.hypot(pim) < 1e-6, "root {z:?}");
        }
        // reproducible restarts
        let mut r2 = vec![0.0; 12];
        roots(&c, &mut r2);
        assert_eq!(r, r2);
    }

    // ---- chebyshev ----

    #[test]
    fn chebyshev_polynomials() {
        let mut c = [0.0; 5];
        chebypoly(&mut c, 4);
        assert_eq!(c, [1.0, 0.0, -8.0, 0.0, 8.0]);
        chebypoly(&mut c, 3);
        assert_eq!(&c[..4], &[0.0, -3.0, 0.0, 4.0]);
    }

    #[test]
    fn chebyshev_power_series_round_trip() {
        let orig = [0.3, -1.0, 2.0, 0.5, -0.25];
        let mut c = orig;
        pstocheby(&mut c);
        chebytops(&mut c);
        for (a, b) in c.iter().zip(orig) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    // ---- cubic ----

    #[test]
    fn hermite_cubic_matches_endpoints() {
        let c = fitcubic(1.0, 2.0, 0.5, 3.0, -1.0, 1.5);
        assert!((eval(&c, 1.0) - 2.0).abs() < 1e-5);
        assert!((eval(&c, 3.0) + 1.0).abs() < 1e-5);
        let mut dc = c.to_vec();
        diffpoly(&mut dc);
        assert!((eval(&dc, 1.0) - 0.5).abs() < 1e-4);
        assert!((eval(&dc, 3.0) - 1.5).abs() < 1e-4);
        assert_eq!(fitcubic(1.0, 2.0, 0.0, 1.0, 4.0, 0.0), [3.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn point_cubic_reproduces_line() {
        let c = fitcubic_points(&[0.0, 1.0, 2.0, 4.0], &[1.0, 3.0, 5.0, 9.0]);
        assert!((eval(&c, 1.5) - 4.0).abs() < 1e-5);
    }
}

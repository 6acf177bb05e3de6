//! Descriptive statistics, regression and hypothesis tests.
//!
//! Functions that need order statistics (`median`, `quantile`, `mad`,
//! `outliers`, ...) allocate a scratch copy and are not real-time safe.
//!
//! p-values are returned as `f32`. If the underlying incomplete gamma or
//! beta function fails to converge the p-value is `-1.0`.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use libm::{expf, log, logf, sqrtf};

use super::matrix::{mident, minvmulm, mmulv};
use super::real::{abs, dotp, energy, farthesti, mac, maxi, mini, mul_vec, sub, sub_vec, sum};
use super::special::{isort, polyval};
use crate::special::{erfc, probit, rbeta, rgamma, scalepoly};

/// Result of [`linreg`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LinReg {
    /// Coefficient of determination `R²`.
    pub determination: f32,
    /// Model efficiency, `-ln(1 - R²) - 2(n+1)/size`.
    pub efficiency: f32,
    /// p-value of the hypothesis that all coefficients but the offset are 0.
    pub p_value: f32,
    /// Value of the underlying F statistic.
    pub f_value: f32,
}

/// Result of [`ttest`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TTest {
    /// p-value.
    pub p_value: f32,
    /// Effect size (Cohen's d).
    pub cohen_d: f32,
    /// t statistic.
    pub t: f32,
}

/// Result of [`chi2test`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Chi2Test {
    /// p-value.
    pub p_value: f32,
    /// Chi-square statistic.
    pub chi2: f32,
}

#[inline]
fn p_or_sentinel(p: Option<f64>) -> f32 {
    p.map_or(-1.0, |p| p as f32)
}

// ============================================================================
// Location and spread
// ============================================================================

/// Arithmetic mean. NaN for an empty slice.
pub fn mean(d: &[f32]) -> f32 {
    sum(d) / d.len() as f32
}

/// Mean of values `r` weighted by the unnormalized probabilities `d`.
///
/// Falls back to the plain mean of `r` if the weights sum to less than
/// `f32::MIN_POSITIVE`.
pub fn pdmean(d: &[f32], r: &[f32]) -> f32 {
    debug_assert_eq!(d.len(), r.len());
    let (x, y) = d
        .iter()
        .zip(r)
        .fold((0.0f64, 0.0f64), |(x, y), (&w, &v)| {
            (x + f64::from(w) * f64::from(v), y + f64::from(w))
        });
    if y >= f64::from(f32::MIN_POSITIVE) {
        (x / y) as f32
    } else {
        mean(r)
    }
}

/// Unbiased variance (two-pass). 0 for fewer than two elements.
pub fn var(d: &[f32]) -> f32 {
    if d.len() < 2 {
        return 0.0;
    }
    let m = mean(d);
    let s: f64 = d
        .iter()
        .map(|&x| {
            let z = f64::from(x - m);
            z * z
        })
        .sum();
    (s / (d.len() - 1) as f64) as f32
}

/// Unbiased variance of values `r` with reliability weights `d`.
pub fn pdvar(d: &[f32], r: &[f32]) -> f32 {
    debug_assert_eq!(d.len(), r.len());
    let m = pdmean(d, r);
    let (mut v, mut x, mut y) = (0.0f64, 0.0f64, 0.0f64);
    for (&w, &val) in d.iter().zip(r) {
        let w = f64::from(w);
        let t = f64::from(val - m);
        v += w * w;
        x += t * t * w;
        y += w;
    }
    if y * y > v {
        (x * y / (y * y - v)) as f32
    } else {
        var(r)
    }
}

/// Average absolute deviation from `m`, usually the mean or median.
pub fn aad(d: &[f32], m: f32) -> f32 {
    let s: f64 = d.iter().map(|&x| f64::from((x - m).abs())).sum();
    (s / d.len() as f64) as f32
}

fn select_nth(t: &mut [f32], k: usize) -> f32 {
    let (_, x, _) = t.select_nth_unstable_by(k, f32::total_cmp);
    *x
}

/// Median. Even lengths average the two middle values.
///
/// # Examples
///
/// ```
/// use icst_core::vector::median;
///
/// assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
/// assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
/// ```
pub fn median(d: &[f32]) -> f32 {
    let size = d.len();
    if size == 0 {
        return 0.0;
    }
    let mut t = d.to_vec();
    let half = size / 2;
    let x = select_nth(&mut t, half);
    if size % 2 == 0 {
        let lo = t[maxi(&t[..half])];
        0.5 * (x + lo)
    } else {
        x
    }
}

/// Median absolute deviation from the median.
pub fn mad(d: &[f32]) -> f32 {
    let mut t = d.to_vec();
    sub(&mut t, median(d));
    abs(&mut t);
    median(&t)
}

/// p-quantile by Hazen's rule, linear interpolation between order
/// statistics.
///
/// # Examples
///
/// ```
/// use icst_core::vector::{median, quantile};
///
/// let d = [5.0, 1.0, 4.0, 2.0, 3.0, 6.0];
/// assert_eq!(quantile(&d, 0.5), median(&d));
/// assert_eq!(quantile(&d, 0.0), 1.0);
/// assert_eq!(quantile(&d, 1.0), 6.0);
/// ```
pub fn quantile(d: &[f32], p: f32) -> f32 {
    let size = d.len();
    if size == 0 {
        return 0.0;
    }
    let pfrac = f64::from(p) * size as f64 - 0.5;
    if pfrac <= 0.0 {
        return d[mini(d)];
    }
    if pfrac >= (size - 1) as f64 {
        return d[maxi(d)];
    }
    let pint = pfrac as usize;
    let frac = (pfrac - pint as f64) as f32;
    let mut t = d.to_vec();
    let xlo = select_nth(&mut t, pint);
    let rest = &t[pint + 1..];
    let xhi = rest[mini(rest)];
    // convex form, equal to the median's midpoint at p = 0.5
    (1.0 - frac) * xlo + frac * xhi
}

/// Geometric mean. 0 if any element is 0 or negative.
pub fn gmean(d: &[f32]) -> f32 {
    const LO: f64 = 1.0e-150;
    const HI: f64 = 1.0e150;
    let mut x = 1.0f64;
    let mut y = 0.0f64;
    for &v in d {
        x *= f64::from(v);
        if x < f64::MIN_POSITIVE {
            return 0.0;
        }
        if !(LO..=HI).contains(&x) {
            y += log(x);
            x = 1.0;
        }
    }
    y += log(x);
    expf((y / d.len() as f64) as f32)
}

/// Harmonic mean. 0 if any element is below `f32::MIN_POSITIVE`.
pub fn hmean(d: &[f32]) -> f32 {
    let mut x = 0.0f64;
    for &v in d {
        if v < f32::MIN_POSITIVE {
            return 0.0;
        }
        x += f64::from(1.0 / v);
    }
    (d.len() as f64 / x) as f32
}

// ============================================================================
// Correlation
// ============================================================================

/// Covariance, normalized by `size`.
pub fn cov(x: &[f32], y: &[f32]) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    let (xm, ym) = (mean(x), mean(y));
    let a: f64 = x
        .iter()
        .zip(y)
        .map(|(&a, &b)| f64::from((a - xm) * (b - ym)))
        .sum();
    (a / x.len() as f64) as f32
}

/// Pearson's product-moment correlation. 0 if either input is constant.
pub fn cpears(x: &[f32], y: &[f32]) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    let (xm, ym) = (mean(x), mean(y));
    let (mut a, mut b, mut c) = (0.0f64, 0.0f64, 0.0f64);
    for (&u, &v) in x.iter().zip(y) {
        let (tx, ty) = (f64::from(u - xm), f64::from(v - ym));
        a += tx * ty;
        b += tx * tx;
        c += ty * ty;
    }
    let den = libm::sqrt(b * c);
    if den >= f64::from(f32::MIN_POSITIVE) {
        (a / den) as f32
    } else {
        0.0
    }
}

/// Spearman's rank correlation rho. 0 for fewer than two pairs.
pub fn cspear(x: &[f32], y: &[f32]) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    let size = x.len();
    if size < 2 {
        return 0.0;
    }
    let mut tx = x.to_vec();
    let mut idx = vec![0usize; size];
    isort(&mut tx, &mut idx);
    let mut ty: Vec<f32> = idx.iter().map(|&k| y[k]).collect();
    isort(&mut ty, &mut idx);
    let s: f64 = idx
        .iter()
        .enumerate()
        .map(|(i, &k)| {
            let t = k as f64 - i as f64;
            t * t
        })
        .sum();
    let n = size as f64;
    (1.0 - 6.0 * s / (n * (n * n - 1.0))) as f32
}

/// Kendall's rank correlation tau, `O(n²)`. 0 for fewer than two pairs.
///
/// Tied pairs count as concordant.
pub fn ckend(x: &[f32], y: &[f32]) -> f32 {
    debug_assert_eq!(x.len(), y.len());
    let size = x.len();
    if size < 2 {
        return 0.0;
    }
    let mut s = 0i64;
    for i in 0..size - 1 {
        for j in (i + 1)..size {
            let a = (x[j] - x[i]) * (y[j] - y[i]);
            s += if a.is_sign_negative() { -1 } else { 1 };
        }
    }
    let n = size as f64;
    (2.0 * s as f64 / (n * n - n)) as f32
}

// ============================================================================
// Fitting
// ============================================================================

/// Multiple linear regression `y ≈ c[0] + Σ c[i]·x_i`.
///
/// `x` holds the `n = c.len() - 1` regressors back to back, each
/// `y.len()` samples long. On return `y` holds the residual.
///
/// * `sdc` - optional output for the standard deviations of `c`
/// * `cov` - optional `(n+1)²` covariance matrix of the regressors; it is
///   used if `cov[0] > 0` and stored otherwise, so repeated fits on the same
///   `x` skip its computation
///
/// A singular system yields zero coefficients.
///
/// # Examples
///
/// ```
/// use icst_core::vector::linreg;
///
/// let x = [0.0, 1.0, 2.0, 3.0];
/// let mut y = [1.0, 3.0, 5.0, 7.0];
/// let mut c = [0.0; 2];
/// let r = linreg(&mut c, &x, &mut y, None, None);
/// assert!((c[0] - 1.0).abs() < 1e-5 && (c[1] - 2.0).abs() < 1e-5);
/// assert!((r.determination - 1.0).abs() < 1e-5);
/// ```
pub fn linreg(
    c: &mut [f32],
    x: &[f32],
    y: &mut [f32],
    sdc: Option<&mut [f32]>,
    cov: Option<&mut [f32]>,
) -> LinReg {
    let n = c.len();
    let size = y.len();
    debug_assert!(n >= 1 && x.len() >= (n - 1) * size);
    let xi = |i: usize| &x[i * size..(i + 1) * size];

    let mut a = vec![0.0f32; n];
    a[0] = sum(y);
    for i in 1..n {
        a[i] = dotp(xi(i - 1), y);
    }
    let use_cov = cov.as_deref().is_some_and(|m| m[0] > 0.0);
    let m: Vec<f32> = if use_cov {
        cov.as_deref().map_or_else(Vec::new, |m| m[..n * n].to_vec())
    } else {
        let mut m = vec![0.0f32; n * n];
        m[0] = size as f32;
        for j in 1..n {
            let s = sum(xi(j - 1));
            m[j] = s;
            m[j * n] = s;
        }
        for i in 1..n {
            let v = i * (n + 1);
            m[v] = energy(xi(i - 1));
            for j in 1..(n - i) {
                let p = dotp(xi(i - 1 + j), xi(i - 1));
                m[v + j] = p;
                m[v + j * n] = p;
            }
        }
        if let Some(cov) = cov {
            cov[..n * n].copy_from_slice(&m);
        }
        m
    };

    let mut sdc = sdc;
    if let Some(sdc) = sdc.as_deref_mut() {
        let mut inv = vec![0.0f32; n * n];
        mident(&mut inv, n);
        if minvmulm(&mut inv, &m, n, n) != 0.0 {
            for i in 0..n {
                sdc[i] = inv[i * (n + 1)];
            }
            mmulv(c, &inv, &a, n, n);
        } else {
            sdc[..n].fill(0.0);
            c.fill(0.0);
        }
    } else if minvmulm(&mut a, &m, n, 1) != 0.0 {
        c.copy_from_slice(&a);
    } else {
        c.fill(0.0);
    }

    let total = var(y);
    sub(y, c[0]);
    for i in 1..n {
        mac(y, xi(i - 1), -c[i]);
    }
    let resid = var(y);
    let (rel, mut out) = if total > f32::MIN_POSITIVE {
        let rel = (resid / total).max(f32::MIN_POSITIVE);
        let out = LinReg {
            determination: 1.0 - rel,
            efficiency: -logf(rel) - 2.0 * n as f32 / size as f32,
            ..LinReg::default()
        };
        (rel, out)
    } else {
        let out = LinReg {
            determination: 1.0,
            efficiency: -logf(f32::MIN_POSITIVE),
            ..LinReg::default()
        };
        (0.0, out)
    };

    if let Some(sdc) = sdc {
        if size > n {
            let scl = resid * (size - 1) as f32 / (size - n) as f32;
            for s in &mut sdc[..n] {
                *s = sqrtf(*s * scl);
            }
        } else {
            sdc[..n].fill(0.0);
        }
    }

    out.p_value = 0.0;
    out.f_value = f32::MAX;
    if size > n && n > 1 {
        let df1 = (n - 1) as f32;
        let df2 = (size - n) as f32;
        if size < 1_000_000 {
            out.p_value = p_or_sentinel(rbeta(
                f64::from(rel),
                f64::from(0.5 * df2),
                f64::from(0.5 * df1),
            ));
            out.f_value = df2 * (1.0 - rel) / (df1 * rel).max(df2 * f32::MIN_POSITIVE);
        } else if rel > 1.0e-6 {
            // Li & Martin (2002) approximation of the F distribution
            let f = df2 * (1.0 - rel) / (df1 * rel);
            let k = (df2 + 0.5 * df1 - 1.0 + df1 * f / 6.0) / (df2 + 2.0 * df1 * f / 3.0);
            out.f_value = f;
            out.p_value = p_or_sentinel(
                rgamma(f64::from(0.5 * df1), f64::from(0.5 * df1 * f * k)).map(|g| 1.0 - g),
            );
        }
    }
    out
}

/// Weighted least-squares polynomial fit of degree `c.len() - 1`.
///
/// `c` receives the ascending coefficients, `y` is replaced by the
/// residual. `w` defaults to uniform weights. The abscissae are scaled to
/// `[-1, 1]` internally to keep the normal equations well conditioned.
///
/// # Examples
///
/// ```
/// use icst_core::vector::polyfit;
///
/// let x = [-2.0, -1.0, 0.0, 1.0, 2.0];
/// let mut y = x.map(|v: f32| 1.0 - v + 0.5 * v * v);
/// let mut c = [0.0f64; 3];
/// polyfit(&mut c, &x, &mut y, None);
/// assert!((c[0] - 1.0).abs() < 1e-4 && (c[1] + 1.0).abs() < 1e-4 && (c[2] - 0.5).abs() < 1e-4);
/// assert!(y.iter().all(|r| r.abs() < 1e-4));
/// ```
pub fn polyfit(c: &mut [f64], x: &[f32], y: &mut [f32], w: Option<&[f32]>) {
    debug_assert_eq!(x.len(), y.len());
    let size = x.len();
    let nc = c.len();
    if nc == 0 {
        return;
    }
    let d = nc - 1;
    let maxabs = x.iter().fold(0.0f32, |m, v| m.max(v.abs()));
    let norm = if maxabs > 0.0 { 1.0 / maxabs } else { 1.0 };
    let xn: Vec<f32> = x.iter().map(|&v| v * norm).collect();
    let mut t: Vec<f32> = w.map_or_else(|| vec![1.0; size], <[f32]>::to_vec);

    let mut psum = vec![0.0f32; 2 * d + 1];
    let mut a = vec![0.0f32; nc];
    for (k, p) in psum.iter_mut().enumerate() {
        *p = sum(&t);
        if k <= d {
            a[k] = dotp(&t, y);
        }
        mul_vec(&mut t, &xn);
    }
    let mut m = vec![0.0f32; nc * nc];
    for i in 0..nc {
        m[i * nc..(i + 1) * nc].copy_from_slice(&psum[i..i + nc]);
    }
    if minvmulm(&mut a, &m, nc, 1) != 0.0 {
        for (ci, &ai) in c.iter_mut().zip(&a) {
            *ci = f64::from(ai);
        }
    } else {
        c.fill(0.0);
    }
    scalepoly(c, f64::from(norm));

    let mut est = x.to_vec();
    polyval(&mut est, c);
    sub_vec(y, &est);
}

// ============================================================================
// Distribution
// ============================================================================

/// Adds the values of `d` in `[min, max]` to the histogram `bin` and returns
/// the number of values outside the range. `bin` is not cleared first.
pub fn histogram(d: &[f32], bin: &mut [usize], min: f32, max: f32) -> usize {
    let bins = bin.len();
    if bins == 0 {
        return d.len();
    }
    let fbin = bins as f32;
    let r = fbin / (max - min);
    let mut outs = 0;
    for &v in d {
        let x = r * (v - min);
        if (0.0..fbin).contains(&x) {
            bin[x as usize] += 1;
        } else if x == fbin {
            bin[bins - 1] += 1;
        } else {
            outs += 1;
        }
    }
    outs
}

/// Quantile-quantile pairs: sorts `y` ascending and either sorts `x` or,
/// with `norm`, replaces it by standard normal quantiles at Blom positions.
pub fn qqpairs(x: &mut [f32], y: &mut [f32], norm: bool) {
    debug_assert_eq!(x.len(), y.len());
    y.sort_unstable_by(f32::total_cmp);
    if norm {
        let delta = 1.0 / (x.len() as f64 + 0.25);
        for (i, v) in x.iter_mut().enumerate() {
            *v = probit(((0.625 + i as f64) * delta) as f32);
        }
    } else {
        x.sort_unstable_by(f32::total_cmp);
    }
}

// ============================================================================
// Outliers
// ============================================================================

/// Modified z-score outlier detection.
///
/// `score[i] > 0` marks `d[i]` as an outlier at threshold `th` (1.0 is a
/// sensible default). Scores range from -1 upward. Returns the number of
/// outliers; if the median absolute deviation vanishes all scores are -1.
pub fn outliers(score: &mut [f32], d: &[f32], th: f32) -> usize {
    debug_assert_eq!(score.len(), d.len());
    score.copy_from_slice(d);
    sub(score, median(d));
    abs(score);
    let r = 5.18 * th * median(score);
    if r <= f32::MIN_POSITIVE {
        score.fill(-1.0);
        return 0;
    }
    let r = 1.0 / r;
    let mut cnt = 0;
    for s in score.iter_mut() {
        *s = r * *s - 1.0;
        if *s > 0.0 {
            cnt += 1;
        }
    }
    cnt
}

/// Two-sided Grubbs test on normally distributed data.
///
/// Returns the p-value of the value farthest from the mean and its index.
/// `mv` optionally supplies precomputed `(mean, variance)`. The p-value is 0
/// for fewer than three values.
pub fn grubbs(d: &[f32], mv: Option<(f32, f32)>) -> (f32, usize) {
    let n = d.len() as f32;
    let (m, v) = mv.unwrap_or_else(|| (mean(d), var(d)));
    let i = farthesti(d, m);
    if d.len() < 3 {
        return (0.0, i);
    }
    let nu = (n - 2.0).min(1.0e6);
    let x = d[i] - m;
    let x = x * x * n;
    let x = sqrtf((n - 2.0) * x / (v * (n - 1.0) * (n - 1.0) - x));
    let t = sqrtf(x * x + nu);
    let p = rbeta(
        f64::from(0.5 - 0.5 * x / t),
        f64::from(0.5 * nu),
        f64::from(0.5 * nu),
    )
    .map(|p| 2.0 * f64::from(n) * p);
    (p_or_sentinel(p), i)
}

// ============================================================================
// Hypothesis tests
// ============================================================================

/// Student's t-test of `mean(x) - mean(y)` against `reference`.
///
/// `ysize == 0` selects the one-sample (or paired) version; otherwise an
/// unpaired two-sample test with pooled variance. Variances are unbiased
/// estimates. `onesided` tests `mean(x) - mean(y) <= reference`.
#[allow(clippy::too_many_arguments)]
pub fn ttest(
    reference: f32,
    xsize: usize,
    xmean: f32,
    xvar: f32,
    onesided: bool,
    ysize: usize,
    ymean: f32,
    yvar: f32,
) -> TTest {
    let ieps = 10.0 / sqrtf(f32::EPSILON);
    let nx = xsize.max(2) as f32;
    let ny = ysize.max(2) as f32;
    let xvar = xvar.max(f32::MIN_POSITIVE);
    let yvar = yvar.max(f32::MIN_POSITIVE);
    let (nu, cohen_d, t) = if ysize == 0 {
        let d = (xmean - reference) / sqrtf(xvar);
        (nx - 1.0, d, d * sqrtf(nx))
    } else {
        let nu = nx + ny - 2.0;
        let d = (xmean - ymean - reference) * sqrtf(nu / ((nx - 1.0) * xvar + (ny - 1.0) * yvar));
        (nu, d, d * sqrtf(nx * ny / (nx + ny)))
    };
    let nu = nu.min(1.0e6);
    let at = t.abs();
    let beta = |s: f32| {
        rbeta(
            f64::from(0.5 - 0.5 * s / sqrtf(at * at + nu)),
            f64::from(0.5 * nu),
            f64::from(0.5 * nu),
        )
    };
    let p_value = if onesided {
        if at < ieps * nu {
            p_or_sentinel(beta(t))
        } else if t > 0.0 {
            0.0
        } else {
            1.0
        }
    } else if at < ieps * nu {
        p_or_sentinel(beta(at).map(|p| 2.0 * p))
    } else {
        0.0
    };
    TTest { p_value, cohen_d, t }
}

/// F-test of `var(x)` against `var(y)`.
///
/// `ysize == 0` means `yvar` is known exactly, which turns the test into a
/// chi-square test. `onesided` tests `var(x) <= var(y)`.
pub fn ftest(xvar: f32, xsize: usize, yvar: f32, ysize: usize, onesided: bool) -> f32 {
    let xnu = f64::from((xsize.max(2) - 1) as f32);
    let ynu = f64::from((ysize.max(2) - 1) as f32);
    let fold = |p: f64| if p > 1.0 { 2.0 - p } else { p };
    let tiny = |v: f32| v < f32::MIN_POSITIVE;
    let (xv, yv) = (f64::from(xvar), f64::from(yvar));
    if ysize == 0 {
        if tiny(yvar) {
            return match (onesided, tiny(xvar)) {
                (true, true) => 0.5,
                (false, true) => 1.0,
                _ => 0.0,
            };
        }
        let g = rgamma(0.5 * xnu, 0.5 * xnu * xv / yv);
        return if onesided {
            p_or_sentinel(g.map(|g| 1.0 - g))
        } else {
            p_or_sentinel(g.map(|g| fold(2.0 * g)))
        };
    }
    if tiny(xvar) && tiny(yvar) {
        return if onesided { 0.5 } else { 1.0 };
    }
    let ratio = |a: f64, anu: f64, b: f64, bnu: f64| {
        let t = a * anu;
        rbeta(t / (t + b * bnu), 0.5 * anu, 0.5 * bnu)
    };
    if onesided {
        p_or_sentinel(ratio(yv, ynu, xv, xnu))
    } else if xvar > yvar {
        p_or_sentinel(ratio(yv, ynu, xv, xnu).map(|p| fold(2.0 * p)))
    } else {
        p_or_sentinel(ratio(xv, xnu, yv, ynu).map(|p| fold(2.0 * p)))
    }
}

/// Levene (`bf = false`) or Brown-Forsythe (`bf = true`) test for equal
/// variances. Returns the p-value.
pub fn levtest(x: &[f32], y: &[f32], onesided: bool, bf: bool) -> f32 {
    let deviations = |d: &[f32]| {
        let mut z = d.to_vec();
        let c = if bf { median(d) } else { mean(d) };
        sub(&mut z, c);
        abs(&mut z);
        z
    };
    let zx = deviations(x);
    let zy = deviations(y);
    ttest(
        0.0,
        zx.len(),
        mean(&zx),
        var(&zx),
        onesided,
        zy.len(),
        mean(&zy),
        var(&zy),
    )
    .p_value
}

/// Pearson's chi-square goodness of fit test.
///
/// `fe` holds expected frequencies or probabilities (all `> 0`) and is
/// rescaled in place to the total of `fo`. The test has
/// `max(size - rdf, 1)` degrees of freedom.
pub fn chi2test(fo: &[f32], fe: &mut [f32], rdf: usize, yates: bool) -> Chi2Test {
    debug_assert_eq!(fo.len(), fe.len());
    let size = fo.len();
    super::real::mul(fe, sum(fo) / sum(fe));
    let chi2: f32 = fo
        .iter()
        .zip(fe.iter())
        .map(|(&o, &e)| {
            let t = if yates { (e - o).abs() - 0.5 } else { e - o };
            t * t / e
        })
        .sum();
    let df = size.saturating_sub(rdf).max(1) as f64;
    let p_value = p_or_sentinel(rgamma(0.5 * df, 0.5 * f64::from(chi2)).map(|g| 1.0 - g));
    Chi2Test { p_value, chi2 }
}

/// Binomial test for `a` hits in `t` trials with hit probability `pa`.
///
/// One-sided: `P(X >= a)`, exact. Two-sided: a conservative estimate,
/// `min(1, 2·min(P(X >= a), P(X <= a)))`.
pub fn binomtest(pa: f32, a: usize, t: usize, onesided: bool) -> f32 {
    if a > t {
        return 0.0;
    }
    let (pa, af, tf) = (f64::from(pa), a as f64, t as f64);
    if onesided {
        if a == 0 {
            return 1.0;
        }
        return p_or_sentinel(rbeta(pa, af, tf - af + 1.0));
    }
    if af > pa * tf {
        p_or_sentinel(rbeta(pa, af, tf - af + 1.0).map(|p| (2.0 * p).min(1.0)))
    } else if a == t {
        1.0
    } else {
        p_or_sentinel(rbeta(1.0 - pa, tf - af, af + 1.0).map(|p| (2.0 * p).min(1.0)))
    }
}

// ============================================================================
// Normal distribution
// ============================================================================

/// Normal CDF. A non-positive `std` gives a step with value 0.5 at `mean`.
pub fn cdfn(x: f32, mean: f32, std: f32) -> f32 {
    if std > 0.0 {
        (0.5 * erfc(f64::from((mean - x) / std) * core::f64::consts::FRAC_1_SQRT_2)) as f32
    } else if x > mean {
        1.0
    } else if x < mean {
        0.0
    } else {
        0.5
    }
}

/// Complement `1 - cdfn(x)` without cancellation.
pub fn cdfcn(x: f32, mean: f32, std: f32) -> f32 {
    if std > 0.0 {
        (0.5 * erfc(f64::from((x - mean) / std) * core::f64::consts::FRAC_1_SQRT_2)) as f32
    } else if x > mean {
        0.0
    } else if x < mean {
        1.0
    } else {
        0.5
    }
}

/// Two-sided confidence interval `(lo, hi)` at level `a` (e.g. 0.95) of
/// normally distributed data.
pub fn civn(mean: f32, std: f32, a: f32) -> (f32, f32) {
    let x = std * probit(0.5 * (a + 1.0));
    (mean - x, mean + x)
}

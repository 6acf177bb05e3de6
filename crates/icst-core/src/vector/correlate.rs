//! Direct-form convolution and correlation.
//!
//! These run in `O(n·m)` without scratch memory. For long kernels the FFT
//! based versions in `icst-analysis` are faster.

/// Linear convolution, in place.
///
/// `d[..dsize]` holds the input. On return `d[..dsize + r.len() - 1]` holds
/// `d * r`, so `d` must be at least that long.
///
/// # Examples
///
/// ```
/// use icst_core::vector::conv;
///
/// let mut d = [1.0, 2.0, 3.0, 0.0];
/// conv(&mut d, 3, &[1.0, 1.0]);
/// assert_eq!(d, [1.0, 3.0, 5.0, 3.0]);
/// ```
pub fn conv(d: &mut [f32], dsize: usize, r: &[f32]) {
    if dsize == 0 || r.is_empty() {
        return;
    }
    let rsize = r.len();
    let n = dsize + rsize - 1;
    debug_assert!(d.len() >= n);
    for i in (0..n).rev() {
        let jlo = i.saturating_sub(dsize - 1);
        let jhi = i.min(rsize - 1);
        let acc: f64 = (jlo..=jhi)
            .map(|j| f64::from(d[i - j]) * f64::from(r[j]))
            .sum();
        d[i] = acc as f32;
    }
}

/// Cross-correlation `d[i] = Σ_j d[i+j]·r[j]` for `i < pts`, in place.
///
/// Lags where `r` extends past the end of `d` sum over the overlapping part
/// only.
///
/// # Examples
///
/// ```
/// use icst_core::vector::ccorr;
///
/// let mut d = [1.0, 2.0, 3.0, 4.0];
/// ccorr(&mut d, &[1.0, 1.0], 4);
/// assert_eq!(d, [3.0, 5.0, 7.0, 4.0]);
/// ```
pub fn ccorr(d: &mut [f32], r: &[f32], pts: usize) {
    let dsize = d.len();
    let rsize = r.len();
    let pts = pts.min(dsize);
    let full = (dsize + 1).saturating_sub(rsize).min(pts);
    for i in 0..full {
        d[i] = lagged_dotp(&d[i..i + rsize], r);
    }
    for i in full..pts {
        let m = dsize - i;
        d[i] = lagged_dotp(&d[i..], &r[..m]);
    }
}

/// Unbiased autocorrelation of `r` for lags `0..d.len()`.
///
/// Every lag sums the same number of products, `r.len() - d.len() + 1`.
pub fn uacorr(d: &mut [f32], r: &[f32]) {
    debug_assert!(d.len() <= r.len());
    let m = r.len() + 1 - d.len();
    for (i, x) in d.iter_mut().enumerate() {
        *x = lagged_dotp(&r[i..i + m], &r[..m]);
    }
}

/// Biased autocorrelation `d[i] = Σ_j r[i+j]·r[j]` of `r` for lags
/// `0..d.len()`.
///
/// # Examples
///
/// ```
/// use icst_core::vector::bacorr;
///
/// let mut d = [0.0; 3];
/// bacorr(&mut d, &[1.0, 2.0, 3.0]);
/// assert_eq!(d, [14.0, 8.0, 3.0]);
/// ```
pub fn bacorr(d: &mut [f32], r: &[f32]) {
    debug_assert!(d.len() <= r.len());
    let rsize = r.len();
    for (i, x) in d.iter_mut().enumerate() {
        *x = lagged_dotp(&r[i..], &r[..rsize - i]);
    }
}

#[inline]
fn lagged_dotp(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum::<f64>() as f32
}

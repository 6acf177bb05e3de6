//! Linear prediction analysis: Levinson-Durbin and line spectral
//! frequencies.
//!
//! The matching synthesis filters (`lpanalyze`, `lpdsynth`, `lplsynth`,
//! `lpssynth`) live in `icst_core::filter`.

use icst_core::math::nexthipow2;
use icst_core::special::paraext;

use crate::error::LpcError;
use crate::transform::{FftBackend, FftProcessor};

/// Summary of a successful Levinson-Durbin recursion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    /// Largest reflection coefficient magnitude.
    pub max_reflection: f32,
    /// Residual energy relative to the input energy.
    pub residual_ratio: f32,
}

/// Solve the normal equations of order `k.len()` for the autocorrelation
/// `rm`.
///
/// Writes the predictor `a[0..=order]` with `a[0] = 1` and the reflection
/// coefficients `k[0..order]`. A biased autocorrelation (as from
/// `bacorr` or [`FftProcessor::fast_auto_correlation`]) always yields a
/// stable predictor. Silence (`rm[0]` below the smallest normal float) gives
/// the trivial predictor with residual ratio 1.
///
/// # Errors
///
/// [`LpcError::Unstable`] if a reflection coefficient reaches magnitude 1.
/// `a[1..]` and `k` are zeroed in that case.
///
/// # Panics
///
/// Debug builds panic unless `a` and `rm` hold `order + 1` values.
pub fn lp_durbin(a: &mut [f64], k: &mut [f64], rm: &[f32]) -> Result<Prediction, LpcError> {
    let order = k.len();
    debug_assert_eq!(a.len(), order + 1);
    debug_assert!(rm.len() > order, "autocorrelation needs order + 1 lags");

    a[0] = 1.0;
    if rm[0] < f32::MIN_POSITIVE {
        a[1..].fill(0.0);
        k.fill(0.0);
        return Ok(Prediction {
            max_reflection: 0.0,
            residual_ratio: 1.0,
        });
    }

    let r0 = f64::from(rm[0]);
    let mut err = r0;
    let mut rsmax = 0.0f64;
    for i in 1..=order {
        let mut acc = f64::from(rm[i]);
        for j in 1..i {
            acc += a[j] * f64::from(rm[i - j]);
        }
        let r = -acc / (err + f64::MIN_POSITIVE);
        a[i] = r;
        k[i - 1] = r;
        let r2 = r * r;
        if r2 >= 1.0 {
            let residual_ratio = (err / r0) as f32;
            a[1..].fill(0.0);
            k.fill(0.0);
            return Err(LpcError::Unstable { residual_ratio });
        }
        rsmax = rsmax.max(r2);
        err -= err * r2;

        // a[j] += r·a[i-j], pairwise so each pair is updated from old values
        let half = i / 2;
        if i % 2 == 0 {
            a[half] += r * a[half];
        }
        for j in 1..=(i - 1) / 2 {
            let t = a[j];
            a[j] += r * a[i - j];
            a[i - j] += r * t;
        }
    }
    Ok(Prediction {
        max_reflection: rsmax.sqrt() as f32,
        residual_ratio: (err / r0) as f32,
    })
}

/// Line spectral frequencies of an even order predictor.
///
/// Evaluates the symmetric and antisymmetric polynomials on a grid of
/// `nexthipow2(max(grid, order/2 + 1))` points and locates their
/// interleaved zeros with parabolic refinement. `f[0..order]` receives
/// ascending frequencies relative to the sample rate. Frequencies closer
/// than `fs / grid` cannot be separated.
///
/// Allocates two grid-sized buffers.
///
/// # Errors
///
/// [`LpcError::UnresolvedLsf`] when fewer than `order` zeros were found or
/// the result is not strictly ascending.
///
/// # Panics
///
/// Debug builds panic if the order is odd or `a` does not hold `order + 1`
/// values.
pub fn lpc_to_lsf<B: FftBackend>(
    f: &mut [f32],
    a: &[f64],
    grid: usize,
    fft: &mut FftProcessor<B>,
) -> Result<(), LpcError> {
    let order = f.len();
    debug_assert!(order % 2 == 0, "LSF conversion needs an even order");
    debug_assert_eq!(a.len(), order + 1);
    let horder = order / 2;
    let grid = nexthipow2(grid.max(horder + 1));
    let scale = 0.5 / grid as f32;

    let mut p = vec![0.0f32; grid];
    let mut q = vec![0.0f32; grid];
    p[horder] = 1.0;
    q[horder] = -1.0;
    for i in 0..horder {
        p[i] = (a[horder + i + 1] + a[horder - i]) as f32;
        q[i] = (a[horder + i + 1] - a[horder - i]) as f32;
    }
    fft.dct(&mut p);
    fft.dst(&mut q);

    let found = interleaved_zeros(f, &p, &q, scale);
    let ascending = f[..found].windows(2).all(|w| w[0] < w[1]);
    if found < order || !ascending {
        tracing::debug!(found, order, grid, ascending, "LSF search failed");
        return Err(LpcError::UnresolvedLsf { found, order });
    }
    Ok(())
}

// Alternately take the next sign change of p and of q, refining each on the
// squared values. Returns the number of frequencies written.
fn interleaved_zeros(f: &mut [f32], p: &[f32], q: &[f32], scale: f32) -> usize {
    let order = f.len();
    let last = p.len() - 1;
    let sq = |x: f32| x * x;
    let at = |i: usize, offset: f32| scale * (i as f32 + offset);
    let (mut i, mut j) = (1usize, 0usize);

    while i < last && j < order {
        while i < last && j < order {
            if p[i] * p[i + 1] <= 0.0 {
                let (x, y) = (sq(p[i]), sq(p[i + 1]));
                if x <= y {
                    f[j] = at(i, paraext(sq(p[i - 1]), x, y).0);
                } else {
                    i += 1;
                    let next = if i < last { sq(p[i + 1]) } else { 0.0 };
                    f[j] = at(i, paraext(x, y, next).0);
                }
                j += 1;
                break;
            }
            i += 1;
        }
        while i < last && j < order {
            if q[i] * q[i - 1] <= 0.0 {
                let (x, y) = (sq(q[i - 1]), sq(q[i]));
                if x <= y {
                    let prev = if i > 1 { sq(q[i - 2]) } else { 0.0 };
                    f[j] = at(i, paraext(prev, x, y).0);
                } else {
                    i += 1;
                    f[j] = at(i, paraext(x, y, sq(q[i])).0);
                }
                j += 1;
                break;
            }
            i += 1;
        }
        i += 1;
    }
    j
}

#[cfg(test)]
mod tests {
    use super::*;
    use icst_core::vector::bacorr;

    fn ar2_signal(len: usize, a1: f32, a2: f32) -> Vec<f32> {
        let mut x = vec![0.0f32; len];
        let mut seed = 12345u32;
        for i in 0..len {
            seed = seed.wrapping_mul(196_314_165).wrapping_add(907_633_515);
            let e = (seed >> 9) as f32 / (1u32 << 23) as f32 - 0.5;
            let y1 = if i >= 1 { x[i - 1] } else { 0.0 };
            let y2 = if i >= 2 { x[i - 2] } else { 0.0 };
            x[i] = e - a1 * y1 - a2 * y2;
        }
        x
    }

    // ========================================================================
    // Levinson-Durbin
    // ========================================================================

    #[test]
    fn recovers_ar2_coefficients() {
        let x = ar2_signal(8192, -1.2, 0.6);
        let mut rm = vec![0.0f32; 3];
        bacorr(&mut rm, &x);
        let mut a = [0.0f64; 3];
        let mut k = [0.0f64; 2];
        let pred = lp_durbin(&mut a, &mut k, &rm).unwrap();
        assert_eq!(a[0], 1.0);
        assert!((a[1] + 1.2).abs() < 0.05, "a1 = {}", a[1]);
        assert!((a[2] - 0.6).abs() < 0.05, "a2 = {}", a[2]);
        assert!(pred.max_reflection < 1.0);
        assert!(pred.residual_ratio > 0.0 && pred.residual_ratio < 1.0);
        assert!((k[1] - a[2]).abs() < 1e-12);
    }

    #[test]
    fn silence_gives_trivial_predictor() {
        let mut a = [9.0f64; 5];
        let mut k = [9.0f64; 4];
        let pred = lp_durbin(&mut a, &mut k, &[0.0; 5]).unwrap();
        assert_eq!(a, [1.0, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(k, [0.0; 4]);
        assert_eq!(pred.residual_ratio, 1.0);
    }

    #[test]
    fn invalid_autocorrelation_is_unstable() {
        // |r1| > r0 cannot come from a real signal
        let mut a = [0.0f64; 3];
        let mut k = [0.0f64; 2];
        let err = lp_durbin(&mut a, &mut k, &[1.0, 2.0, 0.0]).unwrap_err();
        assert!(matches!(err, LpcError::Unstable { residual_ratio } if residual_ratio == 1.0));
        assert_eq!(a, [1.0, 0.0, 0.0]);
        assert_eq!(k, [0.0, 0.0]);
    }

    #[test]
    fn higher_order_update_is_symmetric() {
        // order 5 exercises both the odd and even pair updates
        let x = ar2_signal(4096, -0.9, 0.2);
        let mut rm = vec![0.0f32; 6];
        bacorr(&mut rm, &x);
        let mut a = [0.0f64; 6];
        let mut k = [0.0f64; 5];
        lp_durbin(&mut a, &mut k, &rm).unwrap();
        // prediction error filter applied to rm: Σ a[j]·rm[|i-j|] = 0 for i ≥ 1
        for i in 1..=5usize {
            let s: f64 = (0..=5usize)
                .map(|j| a[j] * f64::from(rm[i.abs_diff(j)]))
                .sum();
            assert!(s.abs() < 1e-3 * f64::from(rm[0]), "row {i}: {s}");
        }
    }

    // ========================================================================
    // Line spectral frequencies
    // ========================================================================

    #[test]
    fn lsf_of_single_resonance() {
        // a = 1 - 2r·cos(w)z^-1 + r²z^-2 with the pole at 0.1·fs
        let (r, w) = (0.9f64, 2.0 * std::f64::consts::PI * 0.1);
        let a = [1.0, -2.0 * r * w.cos(), r * r];
        let mut f = [0.0f32; 2];
        lpc_to_lsf(&mut f, &a, 512, &mut FftProcessor::new()).unwrap();
        assert!(f[0] < 0.1 && f[1] > 0.1, "{f:?}");
        assert!(f[0] > 0.05 && f[1] < 0.15, "{f:?}");
    }

    #[test]
    fn trivial_predictor_spreads_lsf_evenly() {
        let mut a = vec![0.0f64; 9];
        a[0] = 1.0;
        let mut f = [0.0f32; 8];
        lpc_to_lsf(&mut f, &a, 1024, &mut FftProcessor::new()).unwrap();
        for (i, &x) in f.iter().enumerate() {
            let expected = (i + 1) as f32 / 18.0;
            assert!((x - expected).abs() < 2e-3, "f[{i}] = {x}, expected {expected}");
        }
    }

    #[test]
    fn coarse_grid_fails_to_resolve() {
        // two resonances 0.002·fs apart cannot be split on a 16 point grid
        let mut a = vec![0.0f64; 5];
        let poles = [0.2f64, 0.202];
        let mut poly = vec![1.0f64];
        for &p in &poles {
            let w = 2.0 * std::f64::consts::PI * p;
            let c = [1.0, -2.0 * 0.999 * w.cos(), 0.999 * 0.999];
            let mut next = vec![0.0f64; poly.len() + 2];
            for (i, &x) in poly.iter().enumerate() {
                for (j, &y) in c.iter().enumerate() {
                    next[i + j] += x * y;
                }
            }
            poly = next;
        }
        a.copy_from_slice(&poly);
        let mut f = [0.0f32; 4];
        let err = lpc_to_lsf(&mut f, &a, 16, &mut FftProcessor::new()).unwrap_err();
        assert!(matches!(err, LpcError::UnresolvedLsf { order: 4, .. }));
    }
}

//! Interleaving, mapping, polynomial evaluation, phase unwrapping and
//! table operations.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

use core::f32::consts::PI;

use libm::{cos, floorf, sin};

// ============================================================================
// Interleaving
// ============================================================================

/// Writes `r[i]` to `d[offset + i·interval]`. Skipped elements of `d` are
/// left unchanged.
pub fn interleave(d: &mut [f32], r: &[f32], interval: usize, offset: usize) {
    debug_assert!(r.is_empty() || offset + (r.len() - 1) * interval < d.len());
    for (i, &x) in r.iter().enumerate() {
        d[offset + i * interval] = x;
    }
}

/// Reads `d[i] = r[offset + i·interval]`.
pub fn deinterleave(d: &mut [f32], r: &[f32], interval: usize, offset: usize) {
    debug_assert!(d.is_empty() || offset + (d.len() - 1) * interval < r.len());
    for (i, x) in d.iter_mut().enumerate() {
        *x = r[offset + i * interval];
    }
}

// ============================================================================
// Mapping and fades
// ============================================================================

/// Maps the range `rlo..rhi` linearly onto `dlo..dhi`.
///
/// A degenerate source range maps everything to the center of the target.
pub fn maplin(d: &mut [f32], dhi: f32, dlo: f32, rhi: f32, rlo: f32) {
    let mut offset = 0.5 * (dhi + dlo);
    let mut scale = rhi - rlo;
    if scale.abs() >= f32::MIN_POSITIVE {
        scale = (dhi - dlo) / scale;
        offset -= 0.5 * scale * (rhi + rlo);
    }
    for x in d.iter_mut() {
        *x = offset + scale * *x;
    }
}

/// Linear crossfade from `d` to `r` across the block, result in `d`.
pub fn xfade(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    let size = d.len();
    if size == 1 {
        d[0] = 0.5 * (d[0] + r[0]);
        return;
    }
    let delta = 1.0 / size.saturating_sub(1).max(1) as f64;
    for (i, (x, &y)) in d.iter_mut().zip(r).enumerate() {
        let w = (delta * i as f64) as f32;
        *x += w * (y - *x);
    }
}

/// Weighted crossfade `(1 - w)·d + w·r -> d`.
pub fn xfade_weighted(d: &mut [f32], r: &[f32], w: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    debug_assert_eq!(d.len(), w.len());
    for ((x, &y), &k) in d.iter_mut().zip(r).zip(w) {
        *x += k * (y - *x);
    }
}

/// Constant power crossfade `d·cos(x) + r·sin(x)` with `x` running from 0 to
/// π/2 across the block.
pub fn pxfade(d: &mut [f32], r: &[f32]) {
    debug_assert_eq!(d.len(), r.len());
    let size = d.len();
    if size == 1 {
        d[0] = core::f32::consts::FRAC_1_SQRT_2 * (d[0] + r[0]);
        return;
    }
    let step = core::f64::consts::FRAC_PI_2 / size.saturating_sub(1).max(1) as f64;
    for (i, (x, &y)) in d.iter_mut().zip(r).enumerate() {
        let t = step * i as f64;
        *x = *x * cos(t) as f32 + y * sin(t) as f32;
    }
}

// ============================================================================
// Polynomial evaluation
// ============================================================================

/// Evaluates the power series `Σ c[i]·x^i` at every element (Horner).
pub fn polyval(d: &mut [f32], c: &[f64]) {
    let Some((&last, rest)) = c.split_last() else {
        d.fill(0.0);
        return;
    };
    for x in d.iter_mut() {
        let y = f64::from(*x);
        *x = rest.iter().rev().fold(last, |acc, &k| y * acc + k) as f32;
    }
}

/// Evaluates the power series at every element of an interleaved complex
/// buffer.
pub fn cpxpolyval(d: &mut [f32], c: &[f64]) {
    debug_assert!(d.len() % 2 == 0);
    let order = c.len().saturating_sub(1);
    if order < 1 {
        let c0 = c.first().copied().unwrap_or(0.0) as f32;
        for z in d.chunks_exact_mut(2) {
            z[0] = c0;
            z[1] = 0.0;
        }
        return;
    }
    for z in d.chunks_exact_mut(2) {
        let (x, y) = (f64::from(z[0]), f64::from(z[1]));
        let (mut a, mut b) = (c[order], c[order - 1]);
        let r = 2.0 * x;
        let s = x * x + y * y;
        for j in (0..order - 1).rev() {
            let t = a;
            a = b + r * a;
            b = c[j] - s * t;
        }
        z[0] = (a * x + b) as f32;
        z[1] = (a * y) as f32;
    }
}

/// Evaluates the Chebyshev series `Σ c[i]·T_i(x)` (Clenshaw recurrence).
pub fn chebyval(d: &mut [f32], c: &[f64]) {
    let Some(&c0) = c.first() else {
        d.fill(0.0);
        return;
    };
    for v in d.iter_mut() {
        let a = 2.0 * f64::from(*v);
        let (mut x, mut y) = (0.0f64, 0.0f64);
        for &k in c[1..].iter().rev() {
            let z = x;
            x = a * x + k - y;
            y = z;
        }
        *v = (0.5 * a * x + c0 - y) as f32;
    }
}

// ============================================================================
// Phase unwrapping
// ============================================================================

/// Removes 2π jumps from phase data so consecutive samples differ by at
/// most π.
pub fn unwrap(d: &mut [f32]) {
    const TWOPI: f32 = 2.0 * PI;
    let Some(&first) = d.first() else {
        return;
    };
    let mut offset = 0.0f32;
    let mut prev = first;
    for x in d.iter_mut().skip(1) {
        let phase = *x + offset;
        let mut delta = phase - prev;
        let mag = delta.abs();
        if mag < 10.0 * TWOPI {
            while delta > PI {
                offset -= TWOPI;
                delta -= TWOPI;
            }
            while delta < -PI {
                offset += TWOPI;
                delta += TWOPI;
            }
        } else {
            let k = TWOPI * floorf((mag + PI) / TWOPI * (1.0 - f32::EPSILON));
            if delta > PI {
                offset -= k;
                delta -= k;
                if delta > PI {
                    offset -= TWOPI;
                    delta -= TWOPI;
                }
            }
            if delta < -PI {
                offset += k;
                delta += k;
                if delta < -PI {
                    offset += TWOPI;
                    delta += TWOPI;
                }
            }
        }
        prev += delta;
        *x = prev;
    }
}

// ============================================================================
// Extrema
// ============================================================================

/// Writes the indices of local maxima to `idx` and returns their count.
///
/// A peak satisfies `d[i-1] <= d[i] > d[i+1]`; the sample right after a
/// peak is skipped. `idx` needs `len / 2` entries at most.
pub fn findpeaks(d: &[f32], idx: &mut [usize]) -> usize {
    find_extrema(d, idx, |l, c, r| c >= l && c > r)
}

/// Writes the indices of local minima (`d[i-1] > d[i] <= d[i+1]`) to `idx`
/// and returns their count.
pub fn finddips(d: &[f32], idx: &mut [usize]) -> usize {
    find_extrema(d, idx, |l, c, r| l > c && r >= c)
}

fn find_extrema(d: &[f32], idx: &mut [usize], hit: impl Fn(f32, f32, f32) -> bool) -> usize {
    let mut count = 0;
    let mut i = 1;
    while i + 1 < d.len() {
        if hit(d[i - 1], d[i], d[i + 1]) {
            idx[count] = i;
            count += 1;
            i += 2;
        } else {
            i += 1;
        }
    }
    count
}

// ============================================================================
// Selection and lookup
// ============================================================================

/// Output buffers of [`select`]. Every field is optional.
#[derive(Debug, Default)]
pub struct Selection<'a> {
    /// Values where `sel > 0`.
    pub a: Option<&'a mut [f32]>,
    /// Values where `sel <= 0`.
    pub b: Option<&'a mut [f32]>,
    /// Indices where `sel > 0`.
    pub aidx: Option<&'a mut [usize]>,
    /// Indices where `sel <= 0`.
    pub bidx: Option<&'a mut [usize]>,
}

/// Splits `d` into two subsets by the sign of `sel` and returns the size of
/// the positive subset.
pub fn select(d: &[f32], sel: &[f32], out: Selection<'_>) -> usize {
    debug_assert_eq!(d.len(), sel.len());
    let Selection {
        mut a,
        mut b,
        mut aidx,
        mut bidx,
    } = out;
    let (mut j, mut k) = (0, 0);
    for (i, (&x, &s)) in d.iter().zip(sel).enumerate() {
        if s > 0.0 {
            if let Some(a) = a.as_deref_mut() {
                a[j] = x;
            }
            if let Some(ai) = aidx.as_deref_mut() {
                ai[j] = i;
            }
            j += 1;
        } else {
            if let Some(b) = b.as_deref_mut() {
                b[k] = x;
            }
            if let Some(bi) = bidx.as_deref_mut() {
                bi[k] = i;
            }
            k += 1;
        }
    }
    j
}

/// Returns the largest `i` with `d[i] <= x` for monotonically increasing
/// `d`, or 0 if none.
pub fn mtabinv(d: &[f32], x: f32) -> usize {
    let mut offset = 0;
    let mut n = d.len();
    while n > 1 {
        let half = n / 2;
        if d[offset + half] <= x {
            offset += half;
        }
        n -= half;
    }
    offset
}

/// Linear interpolated cyclic table lookup.
///
/// `t` holds `2^ltsize + 1` samples with `t[0] == t[2^ltsize]`. Reading
/// starts at table index `start` and advances by `step` per output sample,
/// wrapping around. Returns the start index for the next call.
///
/// The read position is a 32-bit fixed point value, so the result is
/// independent of how a run is split into blocks.
pub fn linlookup(d: &mut [f32], t: &[f32], ltsize: u32, start: f32, step: f32) -> f32 {
    debug_assert!((1..32).contains(&ltsize));
    debug_assert_eq!(t.len(), (1usize << ltsize) + 1);
    let idxsft = 32 - ltsize;
    let fracmask = u32::MAX >> ltsize;
    let span = f64::from(fracmask) + 1.0;
    let to_fixed = |x: f32| (libm::floor(0.5 + f64::from(x) * span) as i64) as u32;
    let inc = to_fixed(step);
    let mut pos = to_fixed(start);
    let fracscl = (1.0 / span) as f32;
    for x in d.iter_mut() {
        let idx = (pos >> idxsft) as usize;
        let frac = (pos & fracmask) as f32 * fracscl;
        *x = t[idx] + frac * (t[idx + 1] - t[idx]);
        pos = pos.wrapping_add(inc);
    }
    (f64::from(pos) / span) as f32
}

/// Sorts `d` in descending order. `idx[i]` receives the original position of
/// the element that ends up at `d[i]`.
///
/// Allocates a scratch copy of `d`.
pub fn isort(d: &mut [f32], idx: &mut [usize]) {
    debug_assert_eq!(d.len(), idx.len());
    for (i, k) in idx.iter_mut().enumerate() {
        *k = i;
    }
    idx.sort_unstable_by(|&i, &j| d[j].total_cmp(&d[i]).then(i.cmp(&j)));
    let src: Vec<f32> = d.to_vec();
    for (x, &k) in d.iter_mut().zip(idx.iter()) {
        *x = src[k];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ---- interleaving ----

    #[test]
    fn interleave_round_trip() {
        let mut d = [0.0f32; 8];
        interleave(&mut d, &[1.0, 2.0, 3.0], 3, 1);
        assert_eq!(d, [0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 3.0]);
        let mut r = [0.0f32; 3];
        deinterleave(&mut r, &d, 3, 1);
        assert_eq!(r, [1.0, 2.0, 3.0]);
    }

    // ---- mapping and fades ----

    #[test]
    fn maplin_maps_ranges() {
        let mut d = [0.0, 0.5, 1.0];
        maplin(&mut d, 10.0, -10.0, 1.0, 0.0);
        assert_eq!(d, [-10.0, 0.0, 10.0]);
        let mut z = [3.0, 4.0];
        maplin(&mut z, 2.0, 0.0, 1.0, 1.0);
        assert_eq!(z, [1.0, 1.0]);
    }

    #[test]
    fn fades_start_at_d_and_end_at_r() {
        let mut d = [1.0f32; 5];
        let r = [0.0f32; 5];
        xfade(&mut d, &r);
        assert_eq!(d, [1.0, 0.75, 0.5, 0.25, 0.0]);

        let mut d = [1.0f32; 9];
        let r = [1.0f32; 9];
        pxfade(&mut d, &r);
        assert!((d[0] - 1.0).abs() < 1e-6 && (d[8] - 1.0).abs() < 1e-6);
        assert!((d[4] - core::f32::consts::SQRT_2).abs() < 1e-5);

        let mut d = [2.0f32, 2.0];
        xfade_weighted(&mut d, &[4.0, 4.0], &[0.25, 1.0]);
        assert_eq!(d, [2.5, 4.0]);
    }

    // ---- polynomials ----

    #[test]
    fn polyval_horner() {
        let mut d = [0.0, 1.0, 2.0];
        polyval(&mut d, &[1.0, -2.0, 1.0]);
        assert_eq!(d, [1.0, 0.0, 1.0]);
    }

    #[test]
    fn cpxpolyval_matches_direct_evaluation() {
        // p(z) = 1 + 2z + 3z^2 at z = 1 + i -> 1 + 2 + 2i + 6i = 3 + 8i
        let mut d = [1.0, 1.0];
        cpxpolyval(&mut d, &[1.0, 2.0, 3.0]);
        assert!((d[0] - 3.0).abs() < 1e-6 && (d[1] - 8.0).abs() < 1e-6);
        let mut d = [5.0, 5.0];
        cpxpolyval(&mut d, &[2.0]);
        assert_eq!(d, [2.0, 0.0]);
    }

    #[test]
    fn chebyval_reproduces_t3() {
        let mut d = [-1.0, -0.3, 0.5, 1.0];
        let expected: Vec<f32> = d.iter().map(|&x: &f32| 4.0 * x * x * x - 3.0 * x).collect();
        chebyval(&mut d, &[0.0, 0.0, 0.0, 1.0]);
        for (x, e) in d.iter().zip(&expected) {
            assert!((x - e).abs() < 1e-6);
        }
    }

    // ---- unwrap ----

    #[test]
    fn unwrap_removes_jumps() {
        let mut d: Vec<f32> = (0..40).map(|i| i as f32 * 0.5).collect();
        let truth = d.clone();
        for x in &mut d {
            *x = libm::atan2f(libm::sinf(*x), libm::cosf(*x));
        }
        unwrap(&mut d);
        for (x, t) in d.iter().zip(&truth) {
            assert!((x - t).abs() < 1e-4, "{x} vs {t}");
        }
    }

    #[test]
    fn unwrap_large_jump() {
        let mut d = [0.0, 100.0 * PI + 0.1];
        unwrap(&mut d);
        assert!((d[1] - 0.1).abs() < 1e-3, "{}", d[1]);
    }

    // ---- extrema ----

    #[test]
    fn peaks_and_dips() {
        let d = [0.0, 2.0, 1.0, 1.0, 3.0, 3.0, 0.0, -1.0, 0.0];
        let mut idx = [0usize; 4];
        let n = findpeaks(&d, &mut idx);
        assert_eq!(&idx[..n], &[1, 5]);
        let n = finddips(&d, &mut idx);
        assert_eq!(&idx[..n], &[2, 7]);
    }

    // ---- selection and lookup ----

    #[test]
    fn select_splits_by_sign() {
        let d = [1.0, 2.0, 3.0, 4.0];
        let sel = [1.0, -1.0, 0.0, 5.0];
        let mut a = [0.0; 4];
        let mut bidx = [0usize; 4];
        let n = select(
            &d,
            &sel,
            Selection {
                a: Some(&mut a),
                bidx: Some(&mut bidx),
                ..Selection::default()
            },
        );
        assert_eq!(n, 2);
        assert_eq!(&a[..2], &[1.0, 4.0]);
        assert_eq!(&bidx[..2], &[1, 2]);
    }

    #[test]
    fn mtabinv_binary_search() {
        let d = [0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(mtabinv(&d, 2.5), 2);
        assert_eq!(mtabinv(&d, 4.0), 4);
        assert_eq!(mtabinv(&d, -1.0), 0);
    }

    #[test]
    fn linlookup_interpolates_and_wraps() {
        let t = [0.0, 1.0, 2.0, 3.0, 0.0];
        let mut d = [0.0f32; 6];
        let next = linlookup(&mut d, &t, 2, 2.5, 0.5);
        assert_eq!(d, [2.5, 3.0, 1.5, 0.0, 0.5, 1.0]);
        assert!((next - 1.5).abs() < 1e-6);
    }

    #[test]
    fn isort_descending_with_indices() {
        let mut d = [0.5, 3.0, -1.0, 2.0];
        let mut idx = [0usize; 4];
        isort(&mut d, &mut idx);
        assert_eq!(d, [3.0, 2.0, 0.5, -1.0]);
        assert_eq!(idx, [1, 3, 0, 2]);
    }
}

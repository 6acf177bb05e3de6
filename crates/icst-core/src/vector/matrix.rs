//! Dense matrix helpers on row-major `f32` slices.
//!
//! A matrix with `m` rows and `n` columns occupies `a[..m * n]` with
//! element `(i, j)` at `a[i * n + j]`.

#[cfg(not(feature = "std"))]
use alloc::vec;
#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// LU decomposition with scaled partial pivoting, in place.
///
/// `a` is an `n × n` matrix that receives `L` (unit diagonal, below) and `U`
/// (on and above the diagonal) of the row-permuted input. `idx[i]`, if
/// given, records the row swapped with row `i` at step `i`.
///
/// Returns the determinant of the input, or 0 if the matrix is singular,
/// in which case `a` is left partially decomposed.
pub fn lu(a: &mut [f32], n: usize, mut idx: Option<&mut [usize]>) -> f32 {
    debug_assert!(a.len() >= n * n);
    let mut re: Vec<f32> = (0..n)
        .map(|i| a[i * n..(i + 1) * n].iter().map(|x| x * x).sum())
        .collect();
    let mut det = 1.0f32;
    for j in 0..n {
        for i in 0..j {
            let s: f32 = (0..i).map(|k| a[i * n + k] * a[k * n + j]).sum();
            a[i * n + j] -= s;
        }
        let (mut y, mut z) = (0.0f32, 0.0f32);
        let mut piv = j;
        for i in j..n {
            let s: f32 = (0..j).map(|k| a[i * n + k] * a[k * n + j]).sum();
            a[i * n + j] -= s;
            let x = a[i * n + j];
            if x * x * z >= y * re[i] {
                y = x * x;
                z = re[i];
                piv = i;
            }
        }
        if piv != j {
            swap_rows(a, n, piv, j);
            det = -det;
            re[piv] = re[j];
        }
        if let Some(idx) = idx.as_deref_mut() {
            idx[j] = piv;
        }
        let p = a[j * n + j];
        det *= p;
        if det.abs() < f32::MIN_POSITIVE {
            return 0.0;
        }
        let inv = 1.0 / p;
        for i in (j + 1)..n {
            a[i * n + j] *= inv;
        }
    }
    det
}

fn swap_rows(a: &mut [f32], n: usize, r1: usize, r2: usize) {
    if r1 == r2 {
        return;
    }
    let (lo, hi) = if r1 < r2 { (r1, r2) } else { (r2, r1) };
    let (head, tail) = a.split_at_mut(hi * n);
    head[lo * n..(lo + 1) * n].swap_with_slice(&mut tail[..n]);
}

/// Determinant of the `n × n` matrix `a`.
///
/// # Examples
///
/// ```
/// use icst_core::vector::mdet;
///
/// let a = [0.0, 2.0, 3.0, 1.0];
/// assert!((mdet(&a, 2) + 6.0).abs() < 1e-6);
/// ```
pub fn mdet(a: &[f32], n: usize) -> f32 {
    let mut tmp = a[..n * n].to_vec();
    lu(&mut tmp, n, None)
}

/// Trace of the `n × n` matrix `a`.
pub fn mtrace(a: &[f32], n: usize) -> f32 {
    (0..n).map(|i| a[i * n + i]).sum()
}

/// Transposes the `m × n` matrix `a` into an `n × m` matrix, in place.
pub fn mxpose(a: &mut [f32], m: usize, n: usize) {
    if m == n {
        for i in 0..n {
            for j in (i + 1)..n {
                a.swap(i * n + j, j * n + i);
            }
        }
        return;
    }
    let t = a[..m * n].to_vec();
    for i in 0..m {
        for j in 0..n {
            a[j * m + i] = t[i * n + j];
        }
    }
}

/// Sets the `n × n` matrix `a` to the identity.
pub fn mident(a: &mut [f32], n: usize) {
    a[..n * n].fill(0.0);
    for i in 0..n {
        a[i * n + i] = 1.0;
    }
}

/// `a += b` elementwise.
pub fn madd(a: &mut [f32], b: &[f32]) {
    super::real::add_vec(a, b);
}

/// `a -= b` elementwise.
pub fn msub(a: &mut [f32], b: &[f32]) {
    super::real::sub_vec(a, b);
}

/// `d = a·r` for an `m × n` matrix `a`.
pub fn mmulv(d: &mut [f32], a: &[f32], r: &[f32], m: usize, n: usize) {
    debug_assert!(d.len() >= m && r.len() >= n);
    for (i, x) in d[..m].iter_mut().enumerate() {
        *x = super::real::dotp(&a[i * n..(i + 1) * n], &r[..n]);
    }
}

/// `d = aᵀ·r` for an `m × n` matrix `a`.
pub fn mtmulv(d: &mut [f32], a: &[f32], r: &[f32], m: usize, n: usize) {
    debug_assert!(d.len() >= n && r.len() >= m);
    for (j, x) in d[..n].iter_mut().enumerate() {
        *x = (0..m)
            .map(|i| f64::from(a[i * n + j]) * f64::from(r[i]))
            .sum::<f64>() as f32;
    }
}

/// `c = a·b` for `a` of size `m × n` and `b` of size `n × p`.
pub fn mmulm(c: &mut [f32], a: &[f32], b: &[f32], m: usize, n: usize, p: usize) {
    for i in 0..m {
        for j in 0..p {
            c[i * p + j] = (0..n)
                .map(|k| f64::from(a[i * n + k]) * f64::from(b[k * p + j]))
                .sum::<f64>() as f32;
        }
    }
}

/// Solves `b·x = a` for the `m × n` matrix `x`, overwriting `a`.
///
/// `b` is a square `m × m` matrix. Setting `a` to the identity computes
/// the inverse of `b`. Returns the determinant of `b`; if it is 0, `a` is
/// left unchanged.
///
/// # Examples
///
/// ```
/// use icst_core::vector::{mident, minvmulm};
///
/// let b = [4.0, 7.0, 2.0, 6.0];
/// let mut inv = [0.0; 4];
/// mident(&mut inv, 2);
/// let det = minvmulm(&mut inv, &b, 2, 2);
/// assert!((det - 10.0).abs() < 1e-5);
/// assert!((inv[0] - 0.6).abs() < 1e-6 && (inv[1] + 0.7).abs() < 1e-6);
/// ```
pub fn minvmulm(a: &mut [f32], b: &[f32], m: usize, n: usize) -> f32 {
    let mut lub = b[..m * m].to_vec();
    let mut idx = vec![0usize; m];
    let det = lu(&mut lub, m, Some(&mut idx));
    if det == 0.0 {
        #[cfg(feature = "tracing")]
        tracing::debug!(m, "minvmulm: singular matrix");
        return 0.0;
    }
    for i in 0..m {
        swap_rows(a, n, i, idx[i]);
        for j in 0..n {
            let s: f32 = (0..i).map(|k| lub[i * m + k] * a[k * n + j]).sum();
            a[i * n + j] -= s;
        }
    }
    for i in (0..m).rev() {
        let inv = 1.0 / lub[i * m + i];
        for j in 0..n {
            let s: f32 = ((i + 1)..m).map(|k| lub[i * m + k] * a[k * n + j]).sum();
            a[i * n + j] = (a[i * n + j] - s) * inv;
        }
    }
    det
}

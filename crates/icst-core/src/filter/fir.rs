//! FIR filtering, static delay and median filters.
//!
//! Continuation state lives in caller-owned slices that start zeroed and
//! carry the filter across consecutive blocks. Splitting a signal into blocks
//! of any size produces the same output as one call on the whole signal.

/// FIR filter `H(z) = b[0] + b[1]·z⁻¹ + ... + b[order]·z⁻order`, in place.
///
/// `c` holds the previous `order = b.len() - 1` input samples, newest first.
///
/// # Examples
///
/// ```
/// use icst_core::filter::fir;
///
/// let b = [0.5, 0.5];
/// let mut c = [0.0];
/// let mut d = [1.0, 1.0, 0.0];
/// fir(&mut d, &b, &mut c);
/// assert_eq!(d, [0.5, 1.0, 0.5]);
/// assert_eq!(c, [0.0]);
/// ```
pub fn fir(d: &mut [f32], b: &[f32], c: &mut [f32]) {
    let Some((&b0, taps)) = b.split_first() else {
        return;
    };
    debug_assert!(c.len() >= taps.len());
    let c = &mut c[..taps.len()];
    for x in d.iter_mut() {
        let input = *x;
        let mut acc = b0 * input;
        for (&k, &s) in taps.iter().zip(c.iter()) {
            acc += k * s;
        }
        shift_in(c, input);
        *x = acc;
    }
}

/// [`fir`] with `f64` coefficients and accumulation.
pub fn fir_f64(d: &mut [f32], b: &[f64], c: &mut [f32]) {
    let Some((&b0, taps)) = b.split_first() else {
        return;
    };
    debug_assert!(c.len() >= taps.len());
    let c = &mut c[..taps.len()];
    for x in d.iter_mut() {
        let input = *x;
        let mut acc = b0 * f64::from(input);
        for (&k, &s) in taps.iter().zip(c.iter()) {
            acc += k * f64::from(s);
        }
        shift_in(c, input);
        *x = acc as f32;
    }
}

#[inline]
fn shift_in(c: &mut [f32], x: f32) {
    if !c.is_empty() {
        c.copy_within(..c.len() - 1, 1);
        c[0] = x;
    }
}

/// Delays `d` by `c.len()` samples, in place.
///
/// `c` is the circular delay line and `cp` its read position; both start at
/// zero. An empty `c` passes the signal through.
pub fn delay(d: &mut [f32], c: &mut [f32], cp: &mut usize) {
    let n = c.len();
    if n == 0 {
        return;
    }
    let mut p = (*cp).min(n - 1);
    let mut i = 0;
    while i < d.len() {
        let m = (n - p).min(d.len() - i);
        d[i..i + m].swap_with_slice(&mut c[p..p + m]);
        i += m;
        p += m;
        if p == n {
            p = 0;
        }
    }
    *cp = p;
}

#[inline]
fn median3(a: f32, b: f32, c: f32) -> f32 {
    a.min(b).max(a.max(b).min(c))
}

/// 3-point median filter, in place.
///
/// `c` holds the previous two inputs, oldest first. Output `i` is the
/// median of inputs `i-2..=i`.
pub fn med3(d: &mut [f32], c: &mut [f32; 2]) {
    let [mut a, mut b] = *c;
    for x in d.iter_mut() {
        let input = *x;
        *x = median3(a, b, input);
        a = b;
        b = input;
    }
    *c = [a, b];
}

/// 5-point median filter, in place.
///
/// `c` holds the previous four inputs, oldest first.
pub fn med5(d: &mut [f32], c: &mut [f32; 4]) {
    for x in d.iter_mut() {
        let input = *x;
        let mut s = [c[0], c[1], c[2], c[3], input];
        s.sort_unstable_by(f32::total_cmp);
        c.copy_within(1.., 0);
        c[3] = input;
        *x = s[2];
    }
}

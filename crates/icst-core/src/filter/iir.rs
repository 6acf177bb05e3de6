//! Recursive filters: all-pole direct form, first order and biquad sections.
//!
//! The recursive sections add an excitation of about [`ANTI_DENORMAL`]
//! drawn from a caller-owned [`AntiDenormal`] generator, which keeps decaying
//! states out of the denormal range. Coefficients come from
//! [`special::design`](crate::special::design).

use crate::math::{ANTI_DENORMAL, AntiDenormal};

/// All-pole filter `H(z) = 1 / (1 + a[1]·z⁻¹ + ... + a[order]·z⁻order)`,
/// in place.
///
/// `a[0]` is assumed to be 1. `c` holds the previous `order` outputs, newest
/// first. Outputs below [`ANTI_DENORMAL`] are flushed to zero.
pub fn iir(d: &mut [f32], a: &[f64], c: &mut [f64]) {
    let order = a.len().saturating_sub(1);
    if order == 0 {
        return;
    }
    debug_assert!(c.len() >= order);
    let c = &mut c[..order];
    for x in d.iter_mut() {
        let mut acc = f64::from(*x);
        for j in (1..order).rev() {
            acc -= a[j + 1] * c[j];
            c[j] = c[j - 1];
        }
        acc -= a[1] * c[0];
        if acc.abs() < f64::from(ANTI_DENORMAL) {
            acc = 0.0;
        }
        c[0] = acc;
        *x = acc as f32;
    }
}

/// Excitation pattern for one block: two alternating input terms and an
/// output offset.
#[inline]
fn excitation(adn: &mut AntiDenormal) -> [f32; 3] {
    let r = adn.next();
    [
        0.25 * ANTI_DENORMAL * (r + 2.0),
        -0.15 * ANTI_DENORMAL * r,
        0.08 * ANTI_DENORMAL * (r - 2.761),
    ]
}

/// First order section `H(z) = (b[0] + b[1]·z⁻¹) / (1 + a[1]·z⁻¹)`, in place.
///
/// `c` is the continuation state (start with 0).
///
/// # Examples
///
/// ```
/// use icst_core::filter::iir1;
/// use icst_core::math::AntiDenormal;
/// use icst_core::special::{FilterType, dzbilin};
///
/// let (a, b) = dzbilin(0.01, FilterType::Lowpass, 0.0);
/// let mut adn = AntiDenormal::default();
/// let mut c = 0.0;
/// let mut d = [1.0f32; 2000];
/// iir1(&mut d, &a, &b, &mut c, &mut adn);
/// assert!((d[1999] - 1.0).abs() < 1e-4);
/// ```
pub fn iir1(
    d: &mut [f32],
    a: &[f32; 2],
    b: &[f32; 2],
    c: &mut f32,
    adn: &mut AntiDenormal,
) {
    first_order(d, a[1], 0.0, *b, [0.0; 2], c, adn);
}

/// Time-varying first order section gliding linearly from
/// `(a_start, b_start)` at the first sample to `(a_end, b_end)` at the last.
///
/// Identical to [`iir1`] when start and end coefficients are equal.
pub fn viir1(
    d: &mut [f32],
    a_start: &[f32; 2],
    a_end: &[f32; 2],
    b_start: &[f32; 2],
    b_end: &[f32; 2],
    c: &mut f32,
    adn: &mut AntiDenormal,
) {
    let scl = 1.0 / (d.len().saturating_sub(1).max(1) as f32);
    let a_inc = scl * (a_end[1] - a_start[1]);
    let b_inc = [scl * (b_end[0] - b_start[0]), scl * (b_end[1] - b_start[1])];
    first_order(d, a_start[1], a_inc, *b_start, b_inc, c, adn);
}

fn first_order(
    d: &mut [f32],
    a1: f32,
    a_inc: f32,
    b: [f32; 2],
    b_inc: [f32; 2],
    c: &mut f32,
    adn: &mut AntiDenormal,
) {
    let ex = excitation(adn);
    let mut fb = -a1;
    let [mut b0, mut b1] = b;
    let mut acc = *c;
    for (i, x) in d.iter_mut().enumerate() {
        let prev = b1 * acc;
        acc = fb * acc + *x + ex[i & 1];
        *x = b0 * acc + prev + ex[2];
        fb -= a_inc;
        b0 += b_inc[0];
        b1 += b_inc[1];
    }
    *c = acc;
}

/// Biquad `H(z) = (b[0] + b[1]·z⁻¹ + b[2]·z⁻²) / (1 + a[1]·z⁻¹ + a[2]·z⁻²)`
/// in transposed direct form, in place.
///
/// `c` is the two-element continuation state (start with zeros). The
/// excitation is scaled by the smaller of the denominator gains at DC and
/// Nyquist.
///
/// For modulated filters prefer the state-variable structures in
/// `icst-synth`; switching biquad coefficients mid-stream produces clicks.
pub fn biquad(
    d: &mut [f32],
    a: &[f64; 3],
    b: &[f64; 3],
    c: &mut [f64; 2],
    adn: &mut AntiDenormal,
) {
    let (a1, a2) = (-a[1], -a[2]);
    let b0 = b[0];
    let b1 = b[1] - a[1] * b[0];
    let b2 = b[2] - a[2] * b[0];
    let scale = (1.0 - a1 - a2).abs().min((1.0 + a1 - a2).abs());
    let r = adn.next();
    let ex = [
        scale * f64::from(0.25 * ANTI_DENORMAL * (r + 2.0)),
        scale * f64::from(-0.15 * ANTI_DENORMAL * r),
    ];
    let [mut s1, mut s2] = *c;
    for (i, x) in d.iter_mut().enumerate() {
        let input = f64::from(*x);
        let out = b0 * input + s1;
        let next = b1 * input + s2 + a1 * s1;
        s2 = b2 * input + a2 * s1 + ex[i & 1];
        s1 = next;
        *x = out as f32;
    }
    *c = [s1, s2];
}

//! Oscillators built on 32-bit phase accumulators.
//!
//! One period spans the full `i32` range and wraps naturally, so phase
//! modulation inputs are plain `i32` offsets in the same units. Pitch
//! controls in `0..=1` map exponentially from the lowest to the highest
//! frequency given at construction.
//!
//! Controls are read once per block and glided linearly across it. Integer
//! glides truncate toward zero and land exactly on their target at the end
//! of the block, so constant controls render identically no matter how the
//! stream is cut into blocks. The first block after construction starts at
//! its control values.
//!
//! Phase resets go through a [`PhaseMailbox`](crate::PhaseMailbox) and take
//! effect at the start of the next block.

mod fm;
mod sample;
mod va;
mod wave;

pub use fm::FmOsc;
pub use sample::{PlaybackStatus, SAMPLE_GUARD, SampleOsc};
pub use va::{RawSawMode, RawSawOsc, VaOsc, VaShape};
pub use wave::WaveOsc;

use icst_core::fast_math::{fast_exp, fdtoi_f64};

/// Whether an oscillator overwrites or adds to its output buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mix {
    /// Overwrite the output.
    #[default]
    Replace,
    /// Add to the output.
    Add,
}

/// Exponential map from a pitch control to a phase increment.
#[derive(Debug, Clone, Copy)]
struct PitchMap {
    pmin: f32,
    pconv: f32,
}

impl PitchMap {
    /// Both limits are ordered and clamped to `lo..=hi` times the sample rate.
    fn new(maxpitch: f32, minpitch: f32, sample_rate: f32, lo: f32, hi: f32) -> Self {
        let (minpitch, maxpitch) = pitch_limits(maxpitch, minpitch, sample_rate, lo, hi);
        Self {
            pmin: 4_294_967_296.0 * minpitch / sample_rate,
            pconv: libm::logf(maxpitch / minpitch),
        }
    }

    /// Increment per sample in accumulator units, possibly scaled by the
    /// caller's fixed point factor.
    #[inline]
    fn increment(&self, pitch: f32) -> f32 {
        self.pmin * fast_exp(self.pconv * pitch.clamp(0.0, 1.0))
    }

    #[inline]
    fn target(&self, pitch: f32) -> i32 {
        fdtoi_f64(f64::from(self.increment(pitch)))
    }
}

/// Ordered `(min, max)` frequencies clamped to `lo..=hi` times the sample
/// rate.
fn pitch_limits(maxpitch: f32, minpitch: f32, sample_rate: f32, lo: f32, hi: f32) -> (f32, f32) {
    let (minpitch, maxpitch) = if maxpitch < minpitch {
        (maxpitch, minpitch)
    } else {
        (minpitch, maxpitch)
    };
    let (lo, hi) = (lo * sample_rate, hi * sample_rate);
    (minpitch.min(hi).max(lo), maxpitch.min(hi).max(lo))
}

/// Per-sample step taking `current` to `target` over `samples` samples.
///
/// A fresh control jumps straight to its target and the step is zero.
#[inline]
fn glide(current: &mut i32, target: i32, samples: usize, fresh: bool) -> i32 {
    if fresh {
        *current = target;
        return 0;
    }
    ((i64::from(target) - i64::from(*current)) / samples as i64) as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pitch_map_spans_limits() {
        let map = PitchMap::new(4410.0, 44.1, 44100.0, 0.000_023, 0.4999);
        let per_hz = 4_294_967_296.0 / 44100.0;
        assert!((map.increment(0.0) / per_hz - 44.1).abs() < 1e-3);
        assert!((map.increment(1.0) / per_hz - 4410.0).abs() < 0.1);
        assert!((map.increment(0.5) / per_hz - 441.0).abs() < 1e-2);
        // out of range controls clamp
        assert_eq!(map.increment(2.0), map.increment(1.0));
    }

    #[test]
    fn pitch_limits_are_ordered_and_clamped() {
        let a = PitchMap::new(10.0, 30000.0, 48000.0, 0.000_023, 0.4999);
        assert!(a.increment(0.0) < a.increment(1.0));
        let top = 0.4999 * 4_294_967_296.0;
        assert!((a.increment(1.0) - top).abs() < 1e-5 * top);
    }

    #[test]
    fn glide_truncates_toward_target() {
        let mut x = 0;
        assert_eq!(glide(&mut x, 10, 4, false), 2);
        assert_eq!(glide(&mut x, -10, 4, false), -2);
        assert_eq!(glide(&mut x, 7, 4, true), 0);
        assert_eq!(x, 7);
    }
}

//! Variable speed sample playback.

use crate::shared::SharedTable;
use icst_core::filter::fir;
use icst_core::vector::{interleave, kaiser, mul, mul_vec, reverse, sinc};
use std::sync::Arc;

/// Fractional positions resolved by the interpolation table.
const PHASES: usize = 2048;
const TAPS: usize = 10;
const TABLE_LEN: usize = PHASES * TAPS;

/// Guard samples [`SampleOsc::pre_comp`] appends to a sample.
pub const SAMPLE_GUARD: usize = 16;

/// Playback position lead that compensates the precompensation delay.
const START_OFFSET: i64 = 4;

const ONE: i64 = 1 << 32;

static SINC: SharedTable<Vec<f32>> = SharedTable::new();

/// Windowed sinc with a 18.3 kHz (at 48 kHz) cutoff, one row of ten taps per
/// fractional position.
fn build_sinc() -> Vec<f32> {
    let mut c = vec![1.0f32; TABLE_LEN];
    let mut tmp = vec![0.0f32; TABLE_LEN];
    kaiser(&mut tmp, 0.7);
    for (x, &k) in c.iter_mut().zip(&tmp) {
        *x -= 0.9 * k;
    }
    kaiser(&mut tmp, 9.0);
    mul_vec(&mut tmp, &c);
    sinc(&mut c, 10.0 * 18.3 / 48.0);
    mul_vec(&mut tmp, &c);
    mul(&mut tmp, 7.602_131);
    for (tap, chunk) in tmp.chunks_exact_mut(PHASES).enumerate() {
        reverse(chunk);
        interleave(&mut c, chunk, TAPS, tap);
    }
    tracing::debug!(len = TABLE_LEN, "built sample interpolation table");
    c
}

/// Outcome of a [`SampleOsc::update`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// The whole block was rendered.
    Playing,
    /// Forward playback passed the end of an unlooped sample.
    EndReached,
    /// Reverse playback passed the start of the sample.
    StartReached,
}

/// Sample player with ten-point windowed sinc interpolation.
///
/// Samples must be run through [`pre_comp`](Self::pre_comp) once after
/// loading. The position is a 32.32 fixed point sample index, the playback
/// rate glides linearly across each block.
///
/// # Example
///
/// ```rust
/// use icst_synth::{PlaybackStatus, SampleOsc};
///
/// let mut sample = vec![1.0f32; 100 + icst_synth::SAMPLE_GUARD];
/// SampleOsc::pre_comp(&mut sample, 100, 0, 48000.0);
///
/// let mut osc = SampleOsc::new();
/// let mut out = [0.0f32; 64];
/// let status = osc.update(&mut out, &sample, 1.0, 100, Some(0), 0.0);
/// assert_eq!(status, PlaybackStatus::Playing);
/// assert!((out[40] - 1.0).abs() < 1e-2);
/// ```
#[derive(Debug, Clone)]
pub struct SampleOsc {
    table: Arc<Vec<f32>>,
    idx: i64,
    didx: i64,
}

impl Default for SampleOsc {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleOsc {
    /// Player at position zero and normal speed.
    pub fn new() -> Self {
        Self {
            table: SINC.acquire(build_sinc),
            idx: 0,
            didx: ONE,
        }
    }

    /// Prepare `d[..length]` for playback.
    ///
    /// Fills the [`SAMPLE_GUARD`] samples after `length` with the loop continuation
    /// (or silence without a loop) and applies a linear phase correction
    /// filter with 8 samples of delay. The filter flattens the combined
    /// response of itself and the interpolator; a separate coefficient set
    /// is used below 47.5 kHz.
    ///
    /// # Panics
    ///
    /// Panics if `d` holds fewer than `length + SAMPLE_GUARD` samples.
    pub fn pre_comp(d: &mut [f32], length: usize, looplen: usize, sample_rate: f32) {
        const BHF: [f32; 17] = [
            0.0028, -0.0119, 0.0322, -0.0709, 0.1375, -0.2544, 0.4384, -0.6334, 1.7224, -0.6334,
            0.4384, -0.2544, 0.1375, -0.0709, 0.0322, -0.0119, 0.0028,
        ];
        const BLF: [f32; 17] = [
            0.0074, -0.0251, 0.0561, -0.1067, 0.1849, -0.3117, 0.5023, -0.7006, 1.7897, -0.7006,
            0.5023, -0.3117, 0.1849, -0.1067, 0.0561, -0.0251, 0.0074,
        ];
        let d = &mut d[..length + SAMPLE_GUARD];
        let looplen = looplen.min(length);
        if looplen > 0 {
            let mut j = length - looplen;
            for i in length..length + SAMPLE_GUARD {
                d[i] = d[j];
                j += 1;
                if j >= length {
                    j -= looplen;
                }
            }
        } else {
            d[length..].fill(0.0);
        }
        let b = if sample_rate > 47500.0 { &BHF } else { &BLF };
        fir(d, b, &mut [0.0; SAMPLE_GUARD]);
    }

    /// Render `out.len()` samples of `d`.
    ///
    /// `transpose` is the playback rate (negative plays backwards) and is
    /// reached at the end of the block. `Some(startpos)` restarts playback
    /// there at exactly `transpose`. Positions at or past `endpos` wrap back
    /// by `looplen` samples; without a loop playback stops there.
    ///
    /// On [`EndReached`](PlaybackStatus::EndReached) or
    /// [`StartReached`](PlaybackStatus::StartReached) the rest of `out` is
    /// zeroed. A player that has changed direction meanwhile resumes from
    /// the opposite end.
    ///
    /// # Panics
    ///
    /// Panics if `d` is shorter than `endpos + SAMPLE_GUARD`.
    pub fn update(
        &mut self,
        out: &mut [f32],
        d: &[f32],
        transpose: f32,
        endpos: usize,
        startpos: Option<usize>,
        looplen: f32,
    ) -> PlaybackStatus {
        let d = &d[..endpos + SAMPLE_GUARD];
        let target = (4_294_967_296.0 * f64::from(transpose)) as i64;
        if let Some(start) = startpos {
            self.idx = (start.min(endpos) as i64 + START_OFFSET) << 32;
            self.didx = target;
        }
        if out.is_empty() {
            return PlaybackStatus::Playing;
        }
        let mut sampleend = (endpos as i64) << 32;
        let llen = ((4_294_967_296.0 * f64::from(looplen.max(0.0))) as i64).min(sampleend);
        sampleend += START_OFFSET << 32;
        let txfinc = (target - self.didx) / out.len() as i64;

        let mut status = PlaybackStatus::Playing;
        let mut rendered = out.len();
        for (i, y) in out.iter_mut().enumerate() {
            if self.idx as u64 >= sampleend as u64 {
                if self.idx >= sampleend && llen > 0 {
                    self.idx -= llen;
                    if self.idx >= sampleend {
                        self.idx = (self.idx - sampleend) % llen + sampleend - llen;
                    }
                } else {
                    status = if self.idx >= sampleend {
                        PlaybackStatus::EndReached
                    } else {
                        PlaybackStatus::StartReached
                    };
                    rendered = i;
                    break;
                }
            }
            let k = TAPS * ((self.idx as u64 & 0xffff_ffff) >> 21) as usize;
            let j = (self.idx >> 32) as usize;
            *y = self.table[k..k + TAPS]
                .iter()
                .zip(&d[j..j + TAPS])
                .fold(0.0, |acc, (&c, &x)| acc + c * x);
            self.idx += self.didx;
            self.didx += txfinc;
        }
        out[rendered..].fill(0.0);
        self.didx = target;
        match status {
            PlaybackStatus::EndReached if self.didx < 0 => self.idx = sampleend - 1,
            PlaybackStatus::StartReached if self.didx > 0 => self.idx = 0,
            _ => {}
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn looped_sine(length: usize, period: usize) -> Vec<f32> {
        let mut d: Vec<f32> = (0..length + SAMPLE_GUARD)
            .map(|i| libm::sinf(2.0 * core::f32::consts::PI * i as f32 / period as f32))
            .collect();
        SampleOsc::pre_comp(&mut d, length, period, 48000.0);
        d
    }

    #[test]
    fn interpolation_rows_sum_to_unity() {
        let osc = SampleOsc::new();
        for row in osc.table.chunks_exact(TAPS) {
            let s: f32 = row.iter().sum();
            assert!((s - 0.997).abs() < 1e-3, "{s}");
        }
    }

    #[test]
    fn guard_continues_the_loop() {
        let mut looped = vec![1.0f32; 40 + SAMPLE_GUARD];
        SampleOsc::pre_comp(&mut looped, 40, 10, 48000.0);
        assert!((looped[40 + 15] - 1.003).abs() < 1e-4);

        let mut single = vec![1.0f32; 40 + SAMPLE_GUARD];
        SampleOsc::pre_comp(&mut single, 40, 0, 48000.0);
        assert!(single[40 + 15].abs() < 0.01);
    }

    #[test]
    fn looped_playback_follows_the_waveform() {
        let d = looped_sine(100, 20);
        let mut osc = SampleOsc::new();
        let mut out = vec![0.0f32; 300];
        let mut status = osc.update(&mut out[..50], &d, 1.0, 100, Some(0), 20.0);
        for block in out[50..].chunks_mut(50) {
            status = osc.update(block, &d, 1.0, 100, None, 20.0);
        }
        assert_eq!(status, PlaybackStatus::Playing);
        for (i, &y) in out.iter().enumerate().skip(20) {
            let expected = libm::sinf(2.0 * core::f32::consts::PI * i as f32 / 20.0);
            assert!((y - expected).abs() < 2e-3, "sample {i}: {y}");
        }
    }

    #[test]
    fn fractional_rate_interpolates() {
        let d = looped_sine(100, 20);
        let mut osc = SampleOsc::new();
        let mut out = vec![0.0f32; 250];
        osc.update(&mut out, &d, 0.37, 100, Some(0), 20.0);
        let step = (4_294_967_296.0 * f64::from(0.37f32)) as i64 as f64 / 4_294_967_296.0;
        for (i, &y) in out.iter().enumerate().skip(40) {
            let pos = i as f64 * step;
            let expected = (2.0 * core::f64::consts::PI * pos / 20.0).sin() as f32;
            assert!((y - expected).abs() < 2e-3, "sample {i}: {y}");
        }
    }

    #[test]
    fn unlooped_sample_ends() {
        let mut d = vec![0.5f32; 100 + SAMPLE_GUARD];
        SampleOsc::pre_comp(&mut d, 100, 0, 44100.0);
        let mut osc = SampleOsc::new();
        let mut out = [1.0f32; 160];
        let status = osc.update(&mut out, &d, 1.0, 100, Some(0), 0.0);
        assert_eq!(status, PlaybackStatus::EndReached);
        assert!(out[100..].iter().all(|&x| x == 0.0));
        assert!((out[50] - 0.5).abs() < 1e-2);
    }

    #[test]
    fn reverse_playback_reaches_start() {
        let mut d = vec![0.5f32; 100 + SAMPLE_GUARD];
        SampleOsc::pre_comp(&mut d, 100, 0, 48000.0);
        let mut osc = SampleOsc::new();
        let mut out = [1.0f32; 100];
        let status = osc.update(&mut out, &d, -1.0, 100, Some(50), 0.0);
        assert_eq!(status, PlaybackStatus::StartReached);
        // positions 54 down to 0
        assert!(out[..55].iter().all(|&x| x != 0.0));
        assert!(out[55..].iter().all(|&x| x == 0.0));

        // once the rate has turned positive playback resumes from the start
        let mut out = [0.0f32; 16];
        let status = osc.update(&mut out, &d, 1.0, 100, None, 0.0);
        assert_eq!(status, PlaybackStatus::StartReached);
        let status = osc.update(&mut out, &d, 1.0, 100, None, 0.0);
        assert_eq!(status, PlaybackStatus::Playing);
        assert!(out[8] != 0.0);
    }

    #[test]
    fn players_share_one_table() {
        let a = SampleOsc::new();
        let b = SampleOsc::new();
        assert!(Arc::ptr_eq(&a.table, &b.table));
    }
}

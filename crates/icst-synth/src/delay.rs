//! Delay lines: a static delay with click-free retuning and a modulated
//! fractional delay.

use crate::denormal::OffsetPairs;
use crate::effect::Effect;
use icst_core::filter::delay;

/// Phase of a [`Delay`] length change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DelayState {
    /// Running at the current length.
    #[default]
    Steady,
    /// Crossfading from the delayed to the direct signal.
    FadeOut,
    /// Direct signal only while the line refills at the new length.
    Refill,
    /// Crossfading from the direct to the delayed signal.
    FadeIn,
}

/// Integer delay line whose length changes are hidden behind crossfades.
///
/// A new length fades the delayed signal out, plays the direct signal
/// scaled by `zlevel` until the line has refilled, then fades the delayed
/// signal back in. The sequence is tracked per sample and may span any
/// number of blocks. A length requested while a change is running is
/// applied once that change has finished.
///
/// # Example
///
/// ```rust
/// use icst_synth::{Delay, Effect};
///
/// let mut line = Delay::new(100, 0.0);
/// line.prepare(1000.0, 32); // 20 sample crossfades
/// line.set_delay(10);
///
/// let mut out = vec![0.0f32; 200];
/// out[150] = 1.0;
/// for block in out.chunks_mut(32) {
///     line.process_in_place(block);
/// }
/// assert_eq!(out[160], 1.0);
/// assert_eq!(line.delay(), 10);
/// ```
#[derive(Debug, Clone)]
pub struct Delay {
    line: Vec<f32>,
    cp: usize,
    len: usize,
    target: usize,
    next_len: usize,
    state: DelayState,
    countdown: usize,
    a: f32,
    xflen: usize,
    invxflen: f32,
    zlevel: f32,
}

impl Delay {
    /// Line of up to `maxlen` samples; `zlevel` is the gain of the direct
    /// signal during length changes.
    pub fn new(maxlen: usize, zlevel: f32) -> Self {
        let maxlen = maxlen.max(1);
        tracing::debug!(maxlen, "allocating delay line");
        let mut line = Self {
            line: vec![0.0; maxlen],
            cp: 0,
            len: 0,
            target: 0,
            next_len: 0,
            state: DelayState::Steady,
            countdown: 0,
            a: 1.0,
            xflen: 1,
            invxflen: 1.0,
            zlevel,
        };
        line.set_sample_rate(48000.0);
        line
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        self.xflen = ((0.02 * sample_rate) as usize).max(1);
        self.invxflen = 1.0 / self.xflen as f32;
    }

    /// Request a delay of `samples`, clamped to the line capacity.
    pub fn set_delay(&mut self, samples: usize) {
        self.target = samples.min(self.line.len());
    }

    /// Length currently in effect.
    pub fn delay(&self) -> usize {
        self.len
    }

    /// Capacity of the line.
    pub fn max_delay(&self) -> usize {
        self.line.len()
    }

    /// Where the length change sequence stands.
    pub fn state(&self) -> DelayState {
        self.state
    }

    /// Swap `x` through the active part of the line.
    #[inline]
    fn tick(&mut self, x: f32) -> f32 {
        if self.len == 0 {
            return x;
        }
        let y = core::mem::replace(&mut self.line[self.cp], x);
        self.cp += 1;
        if self.cp == self.len {
            self.cp = 0;
        }
        y
    }

    /// Crossfade `data` over at most `countdown` samples, moving the delayed
    /// signal weight by `step` per sample. Returns the samples consumed.
    fn crossfade(&mut self, data: &mut [f32], step: f32) -> usize {
        let m = self.countdown.min(data.len());
        for x in &mut data[..m] {
            let dry = *x;
            let wet = self.tick(dry);
            self.a += step;
            *x = self.a * wet + (1.0 - self.a) * self.zlevel * dry;
        }
        self.countdown -= m;
        m
    }
}

impl Effect for Delay {
    fn prepare(&mut self, sample_rate: f32, _block_size: usize) {
        self.set_sample_rate(sample_rate);
    }

    fn process_in_place(&mut self, data: &mut [f32]) {
        let mut i = 0;
        while i < data.len() {
            match self.state {
                DelayState::Steady => {
                    if self.len == self.target {
                        delay(&mut data[i..], &mut self.line[..self.len], &mut self.cp);
                        return;
                    }
                    self.next_len = self.target;
                    self.countdown = self.xflen;
                    self.a = 1.0;
                    self.state = DelayState::FadeOut;
                }
                DelayState::FadeOut => {
                    i += self.crossfade(&mut data[i..], -self.invxflen);
                    if self.countdown == 0 {
                        self.len = self.next_len;
                        self.cp = 0;
                        self.countdown = self.len;
                        self.a = 0.0;
                        self.state = DelayState::Refill;
                    }
                }
                DelayState::Refill => {
                    let m = self.countdown.min(data.len() - i);
                    for x in &mut data[i..i + m] {
                        let dry = *x;
                        self.tick(dry);
                        *x = self.zlevel * dry;
                    }
                    i += m;
                    self.countdown -= m;
                    if self.countdown == 0 {
                        self.countdown = self.xflen;
                        self.state = DelayState::FadeIn;
                    }
                }
                DelayState::FadeIn => {
                    i += self.crossfade(&mut data[i..], self.invxflen);
                    if self.countdown == 0 {
                        self.a = 1.0;
                        self.state = DelayState::Steady;
                    }
                }
            }
        }
    }
}

/// Fractional delay line for modulation effects, interpolated by a
/// first-order allpass.
///
/// The delay glides linearly across each block to the requested length.
///
/// # Example
///
/// ```rust
/// use icst_synth::{Effect, VarDelay};
///
/// let mut line = VarDelay::new(64.0);
/// line.set_delay(10.5);
/// let x: Vec<f32> = (0..2048).map(|i| (0.02 * i as f32).sin()).collect();
/// let mut y = x.clone();
/// for block in y.chunks_mut(64) {
///     line.process_in_place(block);
/// }
/// let expected = (0.02 * (2000.0 - 10.5f32)).sin();
/// assert!((y[2000] - expected).abs() < 2e-3);
/// ```
#[derive(Debug, Clone)]
pub struct VarDelay {
    line: Vec<f32>,
    wrapmask: usize,
    dshift: u32,
    dmask: i32,
    dscl: f32,
    llim: f32,
    length: f32,
    delay: i32,
    widx: usize,
    outd: f32,
    adn: OffsetPairs,
}

impl VarDelay {
    /// Line holding delays up to `maxlen` samples.
    pub fn new(maxlen: f32) -> Self {
        let llim = maxlen.max(1.0);
        let mut len = 1usize;
        let mut dshift = 31u32;
        let mut dscl = 2_147_483_648.0f32;
        while len as f32 <= llim.ceil() {
            len <<= 1;
            dshift -= 1;
            dscl *= 0.5;
        }
        tracing::debug!(len, "allocating variable delay line");
        Self {
            line: vec![0.0; len],
            wrapmask: len - 1,
            dshift,
            dmask: ((1u32 << dshift) - 1) as i32,
            dscl,
            llim,
            length: 0.0,
            delay: 0,
            widx: 0,
            outd: 0.0,
            adn: OffsetPairs::new(),
        }
    }

    /// Request a delay of `samples`, reached at the end of the next block.
    pub fn set_delay(&mut self, samples: f32) {
        self.length = samples;
    }

    /// Longest supported delay.
    pub fn max_delay(&self) -> f32 {
        self.llim
    }
}

impl Effect for VarDelay {
    fn process_in_place(&mut self, data: &mut [f32]) {
        if data.is_empty() {
            return;
        }
        let adn = self.adn.next_pair();
        // the allpass adds about 0.3 samples at low frequencies
        let length = (self.length.min(self.llim) - 0.3).max(0.0);
        let target = (f64::from(self.dscl) * f64::from(length)).round() as i32;
        let dinc = (f64::from(target - self.delay) / data.len() as f64) as i32;
        let dscl2 = 1.0 / self.dscl;
        let mask = self.wrapmask;
        for (i, x) in data.iter_mut().enumerate() {
            self.delay += dinc;
            self.line[self.widx] = *x;
            let ridx = self.widx.wrapping_sub((self.delay >> self.dshift) as usize) & mask;
            self.widx = (self.widx + 1) & mask;
            let mut g = dscl2 * (self.delay & self.dmask) as f32;
            g = 0.539 + (0.369 * g - 1.037) * g;
            self.outd = g * (self.line[ridx] - self.outd)
                + self.line[ridx.wrapping_sub(1) & mask]
                + adn[i & 1];
            *x = self.outd;
        }
        self.delay = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(n: usize) -> Vec<f32> {
        (0..n).map(|i| i as f32 + 1.0).collect()
    }

    // ========================================================================
    // Delay
    // ========================================================================

    #[test]
    fn steady_line_delays_exactly() {
        let mut line = Delay::new(32, 0.0);
        line.prepare(100.0, 16);
        line.set_delay(5);
        let mut warm = vec![0.0f32; 64];
        line.process_in_place(&mut warm);
        assert_eq!(line.state(), DelayState::Steady);

        let input = ramp(40);
        let mut out = input.clone();
        for block in out.chunks_mut(7) {
            line.process_in_place(block);
        }
        for i in 5..40 {
            assert_eq!(out[i], input[i - 5]);
        }
    }

    #[test]
    fn length_change_walks_all_states() {
        let mut line = Delay::new(64, 1.0);
        line.prepare(500.0, 8); // 10 sample crossfades
        line.set_delay(4);
        let mut out = ramp(200);
        let mut states = Vec::new();
        for block in out.chunks_mut(3) {
            line.process_in_place(block);
            states.push(line.state());
        }
        assert!(states.contains(&DelayState::FadeOut));
        assert!(states.contains(&DelayState::Refill));
        assert!(states.contains(&DelayState::FadeIn));
        assert_eq!(line.state(), DelayState::Steady);
        // a zero-length line passes the signal through the first fade
        assert!((out[9] - 10.0).abs() < 1e-4);
        // refill plays the direct signal
        assert_eq!(out[12], 13.0);
        // settled output is the ramp delayed by four
        assert_eq!(out[150], 147.0);
    }

    #[test]
    fn request_during_change_is_applied_afterwards() {
        let mut line = Delay::new(64, 0.0);
        line.prepare(500.0, 8);
        line.set_delay(8);
        let mut block = [0.0f32; 5];
        line.process_in_place(&mut block);
        assert_eq!(line.state(), DelayState::FadeOut);
        line.set_delay(16);
        let mut rest = vec![0.0f32; 200];
        line.process_in_place(&mut rest);
        assert_eq!(line.delay(), 16);
        assert_eq!(line.state(), DelayState::Steady);
    }

    #[test]
    fn delay_clamped_to_capacity() {
        let mut line = Delay::new(10, 0.0);
        line.set_delay(1000);
        let mut data = vec![0.0f32; 4000];
        line.process_in_place(&mut data);
        assert_eq!(line.delay(), 10);
        assert_eq!(line.max_delay(), 10);
    }

    // ========================================================================
    // VarDelay
    // ========================================================================

    #[test]
    fn fractional_delay_of_low_frequency_sine() {
        for length in [5.5f32, 10.0, 10.3, 10.7] {
            let mut line = VarDelay::new(64.0);
            line.set_delay(length);
            let w = 0.02f32;
            let x: Vec<f32> = (0..4000).map(|i| (w * i as f32).sin()).collect();
            let mut y = x.clone();
            for block in y.chunks_mut(64) {
                line.process_in_place(block);
            }
            for i in 1000..4000 {
                let expected = (w * (i as f32 - length)).sin();
                assert!((y[i] - expected).abs() < 2e-3, "length {length} sample {i}");
            }
        }
    }

    #[test]
    fn capacity_rounds_up_to_power_of_two() {
        let line = VarDelay::new(100.0);
        assert_eq!(line.line.len(), 128);
        assert_eq!(line.max_delay(), 100.0);
    }
}

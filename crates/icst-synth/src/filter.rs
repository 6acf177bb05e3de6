//! Resonant and first-order filters with exponential cutoff control.
//!
//! Cutoff and resonance are normalized to `0..=1`. New values are glided
//! linearly across the next block.

use crate::denormal::{OffsetPairs, PinkOffsets};
use crate::effect::Effect;
use icst_core::fast_math::qdexp;
use libm::{logf, sqrtf};

const DEFAULT_SAMPLE_RATE: f32 = 48000.0;

/// Response of the [`ChambFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Second-order lowpass.
    #[default]
    Lowpass,
    /// Bandpass.
    Bandpass,
    /// Second-order highpass.
    Highpass,
    /// Resonance peak, lowpass minus highpass.
    Peak,
    /// Band reject.
    Notch,
}

/// Loop behavior of the [`ChambFilter`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChambVariant {
    /// Purely linear state variable filter.
    #[default]
    Linear,
    /// Quasi-linear compression in the feedback path. Resonance reaches
    /// self-oscillation with a bounded level.
    Compressing,
}

/// Chamberlin state variable filter, run twice per sample.
///
/// # Example
///
/// ```rust
/// use icst_synth::{ChambFilter, Effect, FilterMode};
///
/// let mut filter = ChambFilter::new();
/// filter.prepare(48000.0, 256);
/// filter.set_mode(FilterMode::Lowpass);
/// filter.set_frequency(0.5);
/// filter.set_resonance(0.2);
///
/// let mut data = [1.0f32; 256];
/// for _ in 0..50 {
///     data.fill(1.0);
///     filter.process_in_place(&mut data);
/// }
/// assert!((data[255] - 1.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct ChambFilter {
    mode: FilterMode,
    variant: ChambVariant,
    freq: f32,
    res: f32,
    fscl1: f32,
    fscl2: f32,
    // integrator states, tuning and damping
    a: f32,
    b: f32,
    fc: f32,
    d: f32,
    lim: f32,
    adn: PinkOffsets,
}

impl Default for ChambFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl ChambFilter {
    /// Linear lowpass, fully open, prepared for 48 kHz.
    pub fn new() -> Self {
        let mut filter = Self {
            mode: FilterMode::Lowpass,
            variant: ChambVariant::Linear,
            freq: 1.0,
            res: 0.0,
            fscl1: 1.0,
            fscl2: 0.0,
            a: 0.0,
            b: 0.0,
            fc: 1.0,
            d: 1.0,
            lim: 0.0,
            adn: PinkOffsets::new(),
        };
        filter.set_sample_rate(DEFAULT_SAMPLE_RATE);
        filter
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        const FMIN: f32 = 5.0;
        let x = core::f32::consts::PI * FMIN / (1.22 * sample_rate);
        self.fscl1 = sqrtf(x.clamp(0.0001, 1.0));
        self.fscl2 = -logf(self.fscl1);
    }

    /// Filter response.
    pub fn set_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    /// Linear or compressing loop.
    pub fn set_variant(&mut self, variant: ChambVariant) {
        self.variant = variant;
    }

    /// Normalized cutoff, exponential from 5 Hz at 0 to about fs/3 at 1.
    pub fn set_frequency(&mut self, freq: f32) {
        self.freq = freq;
    }

    /// Resonance in `0..=1`.
    pub fn set_resonance(&mut self, res: f32) {
        self.res = res;
    }

    /// Clear the filter state.
    pub fn reset(&mut self) {
        self.a = 0.0;
        self.b = 0.0;
        self.lim = 0.0;
    }

    fn render(&mut self, data: &mut [f32]) {
        let invsmp = 1.0 / data.len() as f32;
        let res = self.res.clamp(0.0, 1.0);
        let mut r = match self.variant {
            ChambVariant::Linear => {
                let r = 1.131_370_8 * (1.25 - res);
                r * r
            }
            ChambVariant::Compressing => {
                let r = 1.4 * (1.0 - res);
                r * r - 0.016
            }
        };
        let x = self.fscl1 * qdexp(self.fscl2 * self.freq.clamp(0.0, 1.0));
        let fcorr = x * (1.104_536_1 - 0.104_536_1 * r.min(1.0));
        r = r.min(2.0 - x * x);
        let dfc = invsmp * (fcorr - self.fc);
        let dd = invsmp * (r - self.d);

        let compressing = self.variant == ChambVariant::Compressing;
        let gain = if compressing { 0.7 } else { 1.0 };
        let (mut a, mut b, mut fc, mut d, mut lim) = (self.a, self.b, self.fc, self.d, self.lim);
        for y in data.iter_mut() {
            let (input, damp) = if compressing {
                lim = (0.06 * a * a + 0.98 * lim).min(1.0);
                (0.5 * (*y + self.adn.next()), d * (1.0 - lim) + lim)
            } else {
                (*y + self.adn.next(), d)
            };
            let f = fc * fc;
            fc += dfc;

            b += f * a;
            let c1 = input - b - damp * a;
            a += f * c1;
            let a1 = a;
            b += f * a;
            let c2 = input - b - damp * a;
            a += f * c2;

            *y = match self.mode {
                FilterMode::Lowpass => b + f * a,
                FilterMode::Bandpass => gain * (a + a1),
                FilterMode::Highpass => 0.5 * (c1 + c2),
                FilterMode::Peak => gain * (b - c1),
                FilterMode::Notch => b + c2,
            };
            d += dd;
        }
        (self.a, self.b, self.fc, self.d, self.lim) = (a, b, fc, d, lim);
    }
}

impl Effect for ChambFilter {
    fn prepare(&mut self, sample_rate: f32, _block_size: usize) {
        self.set_sample_rate(sample_rate);
    }

    fn process_in_place(&mut self, data: &mut [f32]) {
        if !data.is_empty() {
            self.render(data);
        }
    }
}

/// Virtual analog four-pole ladder lowpass.
///
/// Runs at twice the sample rate with saturation inside the loop and a
/// half-band decimator at the output.
#[derive(Debug, Clone)]
pub struct MoogFilter {
    freq: f32,
    res: f32,
    fscl1: f32,
    fscl2: f32,
    fc: f32,
    rc: f32,
    s: [f32; 8],
    slim: f32,
    previn: f32,
    adn: PinkOffsets,
}

impl Default for MoogFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl MoogFilter {
    /// Fully open filter prepared for 48 kHz.
    pub fn new() -> Self {
        let mut filter = Self {
            freq: 1.0,
            res: 0.0,
            fscl1: 1.0,
            fscl2: 0.0,
            fc: 1.0,
            rc: 0.0,
            s: [0.0; 8],
            slim: 0.0,
            previn: 0.0,
            adn: PinkOffsets::new(),
        };
        filter.set_sample_rate(DEFAULT_SAMPLE_RATE);
        filter
    }

    fn set_sample_rate(&mut self, sample_rate: f32) {
        const FMIN: f32 = 20.0;
        self.fscl1 = sqrtf((2.5 * FMIN / sample_rate).clamp(0.0001, 1.0));
        self.fscl2 = -logf(self.fscl1);
    }

    /// Normalized cutoff, exponential from 20 Hz at 0.
    pub fn set_frequency(&mut self, freq: f32) {
        self.freq = freq;
    }

    /// Resonance in `0..=1`.
    pub fn set_resonance(&mut self, res: f32) {
        self.res = res;
    }

    /// Clear the filter state.
    pub fn reset(&mut self) {
        self.s = [0.0; 8];
        self.slim = 0.0;
        self.previn = 0.0;
    }

    /// One pass through the four saturating poles. Returns the ladder output.
    #[inline]
    fn ladder(&mut self, input: f32, f: f32, r: f32, inscl: f32) -> f32 {
        let fcpl = 1.0 - f;
        let s = &mut self.s;
        let mut x = inscl * input - r * s[4];
        self.slim = (0.062 * x * x + 0.993 * self.slim).clamp(-1.0, 1.0);
        x *= 1.0 - self.slim + 0.5 * self.slim * self.slim;

        let mut y = 0.3 * s[0];
        s[0] = f * x + fcpl * s[0];
        y += s[0];
        x = 0.3 * s[1];
        s[1] = f * y + fcpl * s[1];
        x += s[1];

        x = x.clamp(-1.0, 1.0);
        x *= 1.0 - 0.333_333_34 * x * x;

        y = 0.3 * s[2];
        s[2] = f * x + fcpl * s[2];
        y += s[2];
        x = 0.3 * s[3];
        s[3] = f * y + fcpl * s[3];
        x + s[3]
    }

    fn render(&mut self, data: &mut [f32]) {
        let invsmp = 1.0 / data.len() as f32;
        let drc = invsmp * (1.05 * self.res.clamp(1e-5, 1.0) - self.rc);
        let target = self.fscl1 * qdexp(self.fscl2 * self.freq.clamp(0.0, 1.0));
        let dfc = invsmp * (target - self.fc);

        for out in data.iter_mut() {
            let y = self.fc * self.fc;
            let x = y * (1.0 - self.rc);
            let mut f = y + 0.5 * x * x;
            f *= 1.25 + (-0.743_75 + 0.3 * f) * f;
            let r = self.rc * (1.4 + (0.108 + (-0.164 - 0.069 * f) * f) * f);
            let inscl = 0.18 + 0.25 * r;
            self.fc += dfc;
            self.rc += drc;

            // first pass on the held input, second on the new one
            self.s[4] = self.ladder(self.previn, f, r, inscl);
            self.previn = *out + self.adn.next();
            let x = self.ladder(self.previn, f, r, inscl);

            let s = &mut self.s;
            s[5] = 0.19 * (x + s[7]) + 0.57 * (s[4] + s[6]) - 0.52 * s[5];
            *out = s[5];
            s[7] = s[4];
            s[6] = x;
            s[4] = x;
        }
    }
}

impl Effect for MoogFilter {
    fn prepare(&mut self, sample_rate: f32, _block_size: usize) {
        self.set_sample_rate(sample_rate);
    }

    fn process_in_place(&mut self, data: &mut [f32]) {
        if !data.is_empty() {
            self.render(data);
        }
    }
}

/// Shared cutoff mapping of the first-order filters.
#[derive(Debug, Clone)]
struct OnePoleTuning {
    fscl1: f32,
    fscl2: f32,
    fc: f32,
    s: f32,
    adn: OffsetPairs,
}

impl OnePoleTuning {
    fn new(sample_rate: f32, fmin: f32) -> Self {
        let fscl1 = sqrtf(2.0 * (fmin / sample_rate).clamp(0.000_05, 0.495));
        Self {
            fscl1,
            fscl2: -logf(fscl1) + 0.5 * logf(2.0 * 0.495),
            fc: 0.0,
            s: 0.0,
            adn: OffsetPairs::new(),
        }
    }

    /// Per-sample coefficient increment reaching `freq` at block end.
    fn glide(&self, freq: f32, samples: usize) -> f32 {
        let x = self.fscl1 * qdexp(self.fscl2 * freq.clamp(0.0, 1.0));
        let mut y = x * x;
        y *= y;
        y *= y;
        let target = (1.253_314_1 + (0.100_239_25 * y - 0.353_553_4) * x) * x;
        (target - self.fc) / samples as f32
    }
}

/// First-order lowpass with exponential cutoff control from `fmin` to
/// 0.495 fs.
///
/// # Example
///
/// ```rust
/// use icst_synth::Lowpass1;
///
/// let mut lp = Lowpass1::new(48000.0, 20.0);
/// let mut data = [1.0f32; 512];
/// for _ in 0..4 {
///     data.fill(1.0);
///     lp.update(&mut data, 0.5);
/// }
/// assert!((data[511] - 1.0).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct Lowpass1 {
    tuning: OnePoleTuning,
}

impl Lowpass1 {
    /// Filter for `sample_rate` whose cutoff at control value 0 is `fmin`.
    pub fn new(sample_rate: f32, fmin: f32) -> Self {
        Self {
            tuning: OnePoleTuning::new(sample_rate, fmin),
        }
    }

    /// Filter `data` in place, gliding the cutoff to `freq`.
    pub fn update(&mut self, data: &mut [f32], freq: f32) {
        if data.is_empty() {
            return;
        }
        let dfc = self.tuning.glide(freq, data.len());
        let adn = self.tuning.adn.next_pair();
        let t = &mut self.tuning;
        for (i, y) in data.iter_mut().enumerate() {
            t.fc += dfc;
            let x = t.fc * t.fc * (*y - t.s + adn[i & 1]);
            *y = x + t.s;
            t.s = x + *y;
        }
    }
}

/// First-order highpass, the complement of [`Lowpass1`].
#[derive(Debug, Clone)]
pub struct Highpass1 {
    tuning: OnePoleTuning,
}

impl Highpass1 {
    /// Filter for `sample_rate` whose cutoff at control value 0 is `fmin`.
    pub fn new(sample_rate: f32, fmin: f32) -> Self {
        Self {
            tuning: OnePoleTuning::new(sample_rate, fmin),
        }
    }

    /// Filter `data` in place, gliding the cutoff to `freq`.
    pub fn update(&mut self, data: &mut [f32], freq: f32) {
        if data.is_empty() {
            return;
        }
        let dfc = self.tuning.glide(freq, data.len());
        let adn = self.tuning.adn.next_pair();
        let t = &mut self.tuning;
        for (i, y) in data.iter_mut().enumerate() {
            t.fc += dfc;
            let x = t.fc * t.fc * (*y - t.s + adn[i & 1]);
            *y -= x + t.s;
            t.s += 2.0 * x;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use icst_core::vector::rms;

    fn sine_block(freq: f32, phase: &mut f32, n: usize) -> Vec<f32> {
        (0..n)
            .map(|_| {
                let v = libm::sinf(2.0 * core::f32::consts::PI * *phase);
                *phase = (*phase + freq) % 1.0;
                v
            })
            .collect()
    }

    /// Steady-state gain for a sine with normalized frequency `freq`.
    ///
    /// `1 / freq` must be a whole number of samples. The RMS is taken over
    /// whole periods of the second half of the output.
    fn response(effect: &mut impl Effect, freq: f32) -> f32 {
        let mut phase = 0.0;
        let mut out = Vec::with_capacity(64 * 256);
        for _ in 0..64 {
            let mut block = sine_block(freq, &mut phase, 256);
            effect.process_in_place(&mut block);
            out.extend_from_slice(&block);
        }
        let period = (1.0 / freq).round() as usize;
        let len = (out.len() / 2 / period) * period;
        rms(&out[out.len() - len..]) / core::f32::consts::FRAC_1_SQRT_2
    }

    // ========================================================================
    // ChambFilter
    // ========================================================================

    #[test]
    fn chamberlin_dc_gains() {
        for (mode, expected) in [
            (FilterMode::Lowpass, 1.0),
            (FilterMode::Highpass, 0.0),
            (FilterMode::Bandpass, 0.0),
            (FilterMode::Notch, 1.0),
        ] {
            let mut filter = ChambFilter::new();
            filter.set_mode(mode);
            filter.set_frequency(0.6);
            let mut data = [1.0f32; 256];
            for _ in 0..100 {
                data.fill(1.0);
                filter.process_in_place(&mut data);
            }
            assert!((data[255] - expected).abs() < 1e-3, "{mode:?}: {}", data[255]);
        }
    }

    #[test]
    fn chamberlin_lowpass_attenuates_highs() {
        let mut filter = ChambFilter::new();
        filter.set_frequency(0.6);
        let low = response(&mut filter, 0.001);
        let mut filter = ChambFilter::new();
        filter.set_frequency(0.6);
        let high = response(&mut filter, 0.2);
        assert!(low > 0.9, "passband {low}");
        assert!(high < 0.05, "stopband {high}");
    }

    #[test]
    fn response_integrates_whole_periods() {
        // a unity-gain pass-through must measure 1 for a slow sine
        struct Through;
        impl Effect for Through {
            fn process_in_place(&mut self, _: &mut [f32]) {}
        }
        for freq in [0.001, 0.002, 0.2, 0.25] {
            let g = response(&mut Through, freq);
            assert!((g - 1.0).abs() < 1e-3, "{freq}: {g}");
        }
    }

    #[test]
    fn chamberlin_compressing_stays_bounded_at_full_resonance() {
        let mut filter = ChambFilter::new();
        filter.set_variant(ChambVariant::Compressing);
        filter.set_resonance(1.0);
        filter.set_frequency(0.7);
        let mut noise = crate::Noise::new();
        let mut data = [0.0f32; 256];
        for _ in 0..200 {
            noise.render(&mut data);
            filter.process_in_place(&mut data);
            assert!(data.iter().all(|x| x.is_finite() && x.abs() < 20.0));
        }
    }

    // ========================================================================
    // MoogFilter
    // ========================================================================

    #[test]
    fn moog_lowpass_attenuates_highs() {
        let mut filter = MoogFilter::new();
        filter.set_frequency(0.5);
        let low = response(&mut filter, 0.002);
        let mut filter = MoogFilter::new();
        filter.set_frequency(0.5);
        let high = response(&mut filter, 0.25);
        assert!(high < 0.1 * low, "low {low} high {high}");
    }

    #[test]
    fn moog_self_oscillation_is_bounded() {
        let mut filter = MoogFilter::new();
        filter.set_resonance(1.0);
        filter.set_frequency(0.6);
        let mut data = [0.0f32; 128];
        data[0] = 1.0;
        for _ in 0..500 {
            filter.process_in_place(&mut data);
            assert!(data.iter().all(|x| x.is_finite() && x.abs() < 8.0));
            data.fill(0.0);
        }
    }

    // ========================================================================
    // First-order filters
    // ========================================================================

    #[test]
    fn one_pole_pair_is_complementary() {
        let mut lp = Lowpass1::new(48000.0, 20.0);
        let mut hp = Highpass1::new(48000.0, 20.0);
        let mut phase = 0.0;
        for _ in 0..20 {
            let input = sine_block(0.01, &mut phase, 128);
            let mut low = input.clone();
            let mut high = input.clone();
            lp.update(&mut low, 0.5);
            hp.update(&mut high, 0.5);
            for ((l, h), x) in low.iter().zip(&high).zip(&input) {
                assert!((l + h - x).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn highpass_blocks_dc() {
        let mut hp = Highpass1::new(48000.0, 20.0);
        let mut data = [1.0f32; 512];
        for _ in 0..20 {
            data.fill(1.0);
            hp.update(&mut data, 0.3);
        }
        assert!(data[511].abs() < 1e-3);
    }
}

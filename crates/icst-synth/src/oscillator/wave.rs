//! Band-limited multi-wavetable oscillator.

use super::{PitchMap, glide, pitch_limits};
use crate::mailbox::PhaseMailbox;
use icst_analysis::transform::FftProcessor;
use icst_core::fast_math::{fdtoi, fdtoi_f64};
use icst_core::nexthipow2;
use icst_core::vector::{mul, rms};
use std::sync::Arc;

/// Lowest frequency that aliased components may fold down to.
const ALIAS_BW: f32 = 18000.0;

const PHASE_UNIT: f32 = 1.0 / 2_147_483_648.0;

/// Wavetable oscillator with per-pitch band limiting.
///
/// Every wave is stored once per pitch block. Higher blocks drop the
/// harmonics that would alias at their pitch, so lookup never needs a
/// filter. The `wave` control crossfades between adjacent waves.
///
/// Table layout: `pitch block × wave × (table size + 1)`, where the last
/// sample of each wave repeats the first.
///
/// # Example
///
/// ```rust
/// use icst_synth::WaveOsc;
///
/// let mut osc = WaveOsc::new(256, 2, 4000.0, 40.0, 48000.0);
/// let mut spectrum = vec![0.0f32; 254];
/// spectrum[0] = 1.0; // fundamental, cosine phase
/// osc.load_table(&spectrum, 0);
///
/// let mut out = [0.0f32; 64];
/// osc.update(&mut out, 0.5, 0.0, 0.0, &[0; 64]);
/// assert!((out[0] - core::f32::consts::FRAC_1_SQRT_2).abs() < 1e-3);
/// ```
#[derive(Debug)]
pub struct WaveOsc {
    table: Vec<f32>,
    pitch: PitchMap,
    tablesize: usize,
    wsize: usize,
    tsize: usize,
    wtables: usize,
    pblocks: usize,
    gamma: f32,
    pcrit: f32,
    alpha: f32,
    beta: f32,
    pbkconv: f32,
    w: i32,
    wshift: u32,
    wmask: i32,
    wscl: f32,
    wconv: f64,
    phi: i32,
    dphi: i32,
    pshift: u32,
    pmask: i32,
    pscl: f32,
    fresh: bool,
    mailbox: Arc<PhaseMailbox>,
}

impl WaveOsc {
    /// Oscillator with `tables` waves (2 to 65536) of `tablesize` samples
    /// (rounded up to a power of two, at least 4) covering `minpitch` to
    /// `maxpitch` Hz.
    pub fn new(
        tablesize: usize,
        tables: usize,
        maxpitch: f32,
        minpitch: f32,
        sample_rate: f32,
    ) -> Self {
        let pitch = PitchMap::new(maxpitch, minpitch, sample_rate, 0.000_023, 0.4999);
        let (minpitch, maxpitch) =
            pitch_limits(maxpitch, minpitch, sample_rate, 0.000_023, 0.4999);

        let tablesize = nexthipow2(tablesize.max(4));
        let flim = ALIAS_BW.min(0.45 * sample_rate);
        let gamma = 1.0 / (sample_rate / flim - 1.0);
        let flow = (sample_rate / tablesize as f32).max(minpitch);
        let x = libm::logf(flow / maxpitch);
        let y = (x / libm::logf(gamma)).ceil().max(1.0);
        let pblocks = y as usize;
        let gamma = libm::expf(x / y);
        let pcrit = if pitch.pconv > 0.0 {
            (libm::logf(flow / minpitch) / pitch.pconv).clamp(0.0, 0.99)
        } else {
            0.0
        };

        let wtables = tables.clamp(2, 65536);
        let wsize = tablesize + 1;
        let tsize = wsize * wtables;

        let (mut wmask, mut wshift, mut wscl) = (0x7fff_ffff_i32, 31u32, PHASE_UNIT);
        let mut i = 1;
        while i < wtables {
            i <<= 1;
            wmask >>= 1;
            wshift -= 1;
            wscl *= 2.0;
        }

        let (mut pmask, mut pshift, mut pscl) = (0x7fff_ffff_i32, 31u32, PHASE_UNIT);
        let mut i = 2;
        while i < tablesize {
            i <<= 1;
            pmask >>= 1;
            pshift -= 1;
            pscl *= 2.0;
        }

        tracing::debug!(tablesize, wtables, pblocks, "allocating wavetables");
        Self {
            table: vec![0.0; pblocks * tsize],
            pitch,
            tablesize,
            wsize,
            tsize,
            wtables,
            pblocks,
            gamma,
            pcrit,
            alpha: 1.0 / (1.0 - pcrit),
            beta: flim / flow,
            pbkconv: 65535.0 * pblocks as f32,
            w: 0,
            wshift,
            wmask,
            wscl,
            wconv: f64::from(wmask) * (wtables - 1) as f64,
            phi: 0,
            dphi: 0,
            pshift,
            pmask,
            pscl,
            fresh: true,
            mailbox: Arc::new(PhaseMailbox::new()),
        }
    }

    /// Samples per wave.
    pub fn table_size(&self) -> usize {
        self.tablesize
    }

    /// Number of waves.
    pub fn tables(&self) -> usize {
        self.wtables
    }

    /// Number of band-limited copies per wave.
    pub fn pitch_blocks(&self) -> usize {
        self.pblocks
    }

    /// Load wave `idx` from its spectrum.
    ///
    /// `spectrum` holds interleaved real and imaginary parts of harmonics
    /// `1..table_size/2`, i.e. `table_size - 2` values; missing values count
    /// as zero. Harmonic `k` with real part `a` and imaginary part `b`
    /// contributes `a·cos(kθ) - b·sin(kθ)` before scaling. The spectrum is
    /// precompensated for the droop of linear interpolation and every pitch
    /// block is scaled so that one period of the full band version has an
    /// RMS of 0.5. Out of range indices are ignored.
    ///
    /// Runs an inverse FFT per pitch block, so keep it off the audio thread.
    pub fn load_table(&mut self, spectrum: &[f32], idx: usize) {
        if idx >= self.wtables {
            tracing::warn!(idx, tables = self.wtables, "wave index out of range");
            return;
        }
        let size = self.tablesize;
        let mut tmp = vec![0.0f32; size];
        let m = spectrum.len().min(size - 2);
        tmp[2..2 + m].copy_from_slice(&spectrum[..m]);

        let step = 2.0 / size as f32;
        let mut y = 0.0f32;
        for bin in tmp.chunks_exact_mut(2) {
            let x = 1.0 + (0.485 + 0.875 * y) * y * y;
            bin[0] *= x;
            bin[1] *= x;
            y += step;
        }

        let mut fft = FftProcessor::new();
        let mut wave = vec![0.0f32; self.wsize];
        let mut scale = 0.0;
        let mut harmonics = self.beta;
        for block in 0..self.pblocks {
            let n = (2 * harmonics as usize).min(size);
            wave[..n].copy_from_slice(&tmp[..n]);
            wave[n..size].fill(0.0);
            fft.realifft(&mut wave[..size]);
            wave[size] = wave[0];
            if block == 0 {
                // one period, without the wrap-around sample
                let r = rms(&wave[..size]);
                scale = if r >= f32::MIN_POSITIVE { 0.5 / r } else { 0.0 };
            }
            mul(&mut wave, scale);
            let offset = block * self.tsize + idx * self.wsize;
            self.table[offset..offset + self.wsize].copy_from_slice(&wave);
            harmonics *= self.gamma;
        }
    }

    /// Request a phase of `phase` periods for the next block.
    pub fn set_phase(&self, phase: f32) {
        self.mailbox.set_phase(phase);
    }

    /// Handle for posting phase resets from another thread.
    pub fn phase_mailbox(&self) -> Arc<PhaseMailbox> {
        Arc::clone(&self.mailbox)
    }

    /// Render `out.len()` samples.
    ///
    /// `pitch` selects the band-limited tables, `pitch + pitchmod` sets the
    /// frequency. `wave` in `0..=1` sweeps across all loaded waves. `pmod`
    /// is the phase modulation per sample.
    ///
    /// # Panics
    ///
    /// Panics if `pmod` is shorter than `out`.
    pub fn update(
        &mut self,
        out: &mut [f32],
        pitch: f32,
        pitchmod: f32,
        wave: f32,
        pmod: &[i32],
    ) {
        if out.is_empty() {
            return;
        }
        let n = out.len();
        let pmod = &pmod[..n];
        let fresh = core::mem::take(&mut self.fresh);

        let wtarget = fdtoi_f64(self.wconv * f64::from(wave.clamp(0.0, 1.0)));
        let dwave = glide(&mut self.w, wtarget, n, fresh);
        let x = (self.alpha * (pitch - self.pcrit)).clamp(0.0, 1.0);
        let pwave = self.tsize * (fdtoi(self.pbkconv * x) >> 16) as usize;
        let ptarget = self.pitch.target(pitch + pitchmod);
        let df = glide(&mut self.dphi, ptarget, n, fresh);
        if let Some(phi) = self.mailbox.take() {
            self.phi = phi;
        }

        let table = &self.table;
        let wsize = self.wsize;
        let (mut phi, mut dphi, mut w) = (self.phi, self.dphi, self.w);
        for (y, &pm) in out.iter_mut().zip(pmod) {
            let j = phi.wrapping_add(pm);
            let frac = self.pscl * (j & self.pmask) as f32;
            let cfrac = 1.0 - frac;
            phi = phi.wrapping_add(dphi);
            dphi += df;

            let idx = (j as u32 >> self.pshift) as usize
                + pwave
                + wsize * (w >> self.wshift) as usize;
            let wfrac = self.wscl * (w & self.wmask) as f32;
            w += dwave;

            let x = cfrac * table[idx] + frac * table[idx + 1];
            let x2 = cfrac * table[idx + wsize] + frac * table[idx + wsize + 1];
            *y = x + wfrac * (x2 - x);
        }
        self.phi = phi;
        self.dphi = ptarget;
        self.w = wtarget;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sawtooth(osc: &WaveOsc) -> Vec<f32> {
        let mut spectrum = vec![0.0f32; osc.table_size() - 2];
        for (k, bin) in spectrum.chunks_exact_mut(2).enumerate() {
            bin[1] = 1.0 / (k + 1) as f32;
        }
        spectrum
    }

    fn block_rms(osc: &WaveOsc, block: usize, wave: usize) -> f32 {
        let offset = block * osc.tsize + wave * osc.wsize;
        rms(&osc.table[offset..offset + osc.tablesize])
    }

    #[test]
    fn tables_wrap_around() {
        let mut osc = WaveOsc::new(512, 2, 8000.0, 50.0, 48000.0);
        let spectrum = sawtooth(&osc);
        osc.load_table(&spectrum, 1);
        for block in 0..osc.pitch_blocks() {
            let offset = block * osc.tsize + osc.wsize;
            assert_eq!(osc.table[offset], osc.table[offset + osc.tablesize]);
        }
    }

    #[test]
    fn spectrum_to_table_convention() {
        let mut osc = WaveOsc::new(256, 2, 4000.0, 40.0, 48000.0);
        let n = osc.table_size();
        let mut cosine = vec![0.0f32; n - 2];
        cosine[0] = 1.0;
        let mut sine = vec![0.0f32; n - 2];
        sine[1] = 1.0;
        osc.load_table(&cosine, 0);
        osc.load_table(&sine, 1);

        let amp = core::f32::consts::FRAC_1_SQRT_2;
        let (c, s) = (&osc.table[..n], &osc.table[osc.wsize..osc.wsize + n]);
        for k in 0..n {
            let theta = 2.0 * core::f32::consts::PI * k as f32 / n as f32;
            assert!((c[k] - amp * libm::cosf(theta)).abs() < 1e-4, "cos[{k}] = {}", c[k]);
            assert!((s[k] + amp * libm::sinf(theta)).abs() < 1e-4, "sin[{k}] = {}", s[k]);
        }
        assert!((rms(c) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn higher_pitch_blocks_drop_harmonics() {
        let mut osc = WaveOsc::new(1024, 2, 8000.0, 50.0, 48000.0);
        assert!(osc.pitch_blocks() > 1);
        let spectrum = sawtooth(&osc);
        osc.load_table(&spectrum, 0);
        assert!((block_rms(&osc, 0, 0) - 0.5).abs() < 1e-4);
        let mut prev = block_rms(&osc, 0, 0);
        for block in 1..osc.pitch_blocks() {
            let r = block_rms(&osc, block, 0);
            assert!(r < prev + 1e-6, "block {block}: {r} after {prev}");
            prev = r;
        }
        assert!(prev < 0.47);
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut osc = WaveOsc::new(64, 2, 8000.0, 50.0, 48000.0);
        osc.load_table(&[1.0; 62], 2);
        assert!(osc.table.iter().all(|&x| x == 0.0));
    }

    #[test]
    fn wave_control_crossfades() {
        let render = |wave: f32| {
            let mut osc = WaveOsc::new(256, 2, 4000.0, 40.0, 48000.0);
            let mut cosine = vec![0.0f32; 254];
            cosine[0] = 1.0;
            let mut second = vec![0.0f32; 254];
            second[2] = 1.0;
            osc.load_table(&cosine, 0);
            osc.load_table(&second, 1);
            let mut out = vec![0.0f32; 128];
            osc.update(&mut out, 0.3, 0.0, wave, &[0; 128]);
            out
        };
        let (a, b, mid) = (render(0.0), render(1.0), render(0.5));
        for i in 0..128 {
            assert!((mid[i] - 0.5 * (a[i] + b[i])).abs() < 1e-4, "sample {i}");
        }
        assert!(a.iter().zip(&b).any(|(x, y)| (x - y).abs() > 0.1));
    }

    #[test]
    fn phase_request_applies_next_block() {
        let mut osc = WaveOsc::new(1024, 2, 4410.0, 44.1, 44100.0);
        let mut spectrum = vec![0.0f32; 1022];
        spectrum[0] = 1.0;
        osc.load_table(&spectrum, 0);
        let mut out = [0.0f32; 32];
        osc.update(&mut out, 0.5, 0.0, 0.0, &[0; 32]);
        osc.phase_mailbox().set_phase(0.25);
        osc.update(&mut out, 0.5, 0.0, 0.0, &[0; 32]);
        // a quarter period into the cosine
        assert!(out[0].abs() < 1e-3, "{}", out[0]);
        assert!(out[1] < 0.0);
    }
}

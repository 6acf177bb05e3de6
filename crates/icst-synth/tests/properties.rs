//! Property-based tests for icst-synth block processors.
//!
//! Tests block size invariance of the oscillators and the delay line, and
//! output bounds of the envelope, using proptest for randomized controls
//! and block partitions.

use icst_synth::{
    Delay, Effect, Envelope, EnvelopeEvent, EnvelopeParam, EnvelopePreset, FmOsc, Mix, RawSawOsc,
    VaOsc, VaShape, WaveOsc,
};

use proptest::prelude::*;

/// Cut `total` samples into blocks of the given sizes, repeating them.
fn partition(total: usize, sizes: &[usize]) -> Vec<usize> {
    let mut out = Vec::new();
    let mut left = total;
    for &size in sizes.iter().cycle() {
        if left == 0 {
            break;
        }
        let n = size.min(left);
        out.push(n);
        left -= n;
    }
    out
}

/// Render `total` samples block by block through `render`.
fn render_split(total: usize, blocks: &[usize], mut render: impl FnMut(&mut [f32])) -> Vec<f32> {
    let mut out = vec![0.0f32; total];
    let mut start = 0;
    for &n in blocks {
        render(&mut out[start..start + n]);
        start += n;
    }
    out
}

fn saw_osc() -> WaveOsc {
    let mut osc = WaveOsc::new(256, 2, 8000.0, 40.0, 48000.0);
    let spectrum: Vec<f32> = (1..=127)
        .flat_map(|k| [0.0, -1.0 / k as f32])
        .collect();
    osc.load_table(&spectrum, 0);
    osc.load_table(&spectrum[..2], 1);
    osc
}

const TOTAL: usize = 1000;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// With constant controls, a wavetable oscillator renders the same
    /// samples whatever the block partition.
    #[test]
    fn wave_osc_block_invariance(
        pitch in 0.0f32..=1.0f32,
        wave in 0.0f32..=1.0f32,
        sizes in prop::collection::vec(1usize..200, 1..8),
    ) {
        let pm = vec![0i32; TOTAL];
        let mut whole = saw_osc();
        let mut reference = vec![0.0f32; TOTAL];
        whole.update(&mut reference, pitch, 0.0, wave, &pm);

        let mut split = saw_osc();
        let out = render_split(TOTAL, &partition(TOTAL, &sizes), |block| {
            split.update(block, pitch, 0.0, wave, &pm[..block.len()]);
        });
        for (i, (a, b)) in reference.iter().zip(&out).enumerate() {
            prop_assert!(
                a.to_bits() == b.to_bits(),
                "WaveOsc sample {} differs: {} vs {} (pitch={}, wave={}, sizes={:?})",
                i, a, b, pitch, wave, sizes
            );
        }
    }

    /// Alias suppressed oscillators are block size invariant for both
    /// shapes under constant controls.
    #[test]
    fn va_osc_block_invariance(
        pitch in 0.0f32..=1.0f32,
        width in 0.0f32..=1.0f32,
        pulse in any::<bool>(),
        sizes in prop::collection::vec(1usize..200, 1..8),
    ) {
        let shape = if pulse { VaShape::Pulse } else { VaShape::Saw };
        let pm = vec![0i32; TOTAL];
        let mut whole = VaOsc::new(4800.0, 60.0, 48000.0);
        whole.set_shape(shape);
        let mut reference = vec![0.0f32; TOTAL];
        whole.update(&mut reference, pitch, width, &pm);

        let mut split = VaOsc::new(4800.0, 60.0, 48000.0);
        split.set_shape(shape);
        let out = render_split(TOTAL, &partition(TOTAL, &sizes), |block| {
            split.update(block, pitch, width, &pm[..block.len()]);
        });
        for (i, (a, b)) in reference.iter().zip(&out).enumerate() {
            prop_assert!(
                a.to_bits() == b.to_bits(),
                "VaOsc {:?} sample {} differs: {} vs {}",
                shape, i, a, b
            );
        }
        prop_assert!(
            reference.iter().all(|x| x.is_finite() && x.abs() <= 2.0),
            "VaOsc {:?} left its range (pitch={}, width={})",
            shape, pitch, width
        );
    }

    /// The raw sawtooth is block size invariant in audio and LFO mode.
    #[test]
    fn raw_saw_block_invariance(
        pitch in 0.0f32..=1.0f32,
        lfo in any::<bool>(),
        sizes in prop::collection::vec(1usize..200, 1..8),
    ) {
        let (max, min) = if lfo { (50.0, 0.1) } else { (8000.0, 20.0) };
        let pm = vec![0i32; TOTAL];
        let mut whole = RawSawOsc::new(max, min, 48000.0);
        let mut reference = vec![0.0f32; TOTAL];
        whole.update(&mut reference, pitch, &pm);

        let mut split = RawSawOsc::new(max, min, 48000.0);
        let out = render_split(TOTAL, &partition(TOTAL, &sizes), |block| {
            split.update(block, pitch, &pm[..block.len()]);
        });
        prop_assert!(
            reference.iter().zip(&out).all(|(a, b)| a.to_bits() == b.to_bits()),
            "RawSawOsc ({:?}) output depends on block sizes {:?}",
            whole.mode(), sizes
        );
    }

    /// An FM carrier with feedback is block size invariant, and stays
    /// within full scale.
    #[test]
    fn fm_osc_block_invariance(
        pitch in 0.0f32..=1.0f32,
        amp in 0.0f32..=1.0f32,
        fbk in 0.0f32..=1.0f32,
        sizes in prop::collection::vec(1usize..200, 1..8),
    ) {
        let pm = vec![0i32; TOTAL];
        let mut whole = FmOsc::new(4000.0, 20.0, 48000.0);
        let mut reference = vec![0.0f32; TOTAL];
        whole.update_carrier(&mut reference, pitch, amp, fbk, &pm, Mix::Replace);

        let mut split = FmOsc::new(4000.0, 20.0, 48000.0);
        let out = render_split(TOTAL, &partition(TOTAL, &sizes), |block| {
            split.update_carrier(block, pitch, amp, fbk, &pm[..block.len()], Mix::Replace);
        });
        prop_assert!(
            reference.iter().zip(&out).all(|(a, b)| a.to_bits() == b.to_bits()),
            "FmOsc (pitch={}, amp={}, fbk={}) depends on block sizes {:?}",
            pitch, amp, fbk, sizes
        );
        prop_assert!(
            reference.iter().all(|x| x.abs() <= 1.0),
            "FmOsc exceeded full scale"
        );
    }

    /// Length changes of the crossfading delay run per sample, so any
    /// block partition yields the same output.
    #[test]
    fn delay_block_invariance(
        first in 0usize..64,
        second in 0usize..64,
        change_at in 0usize..TOTAL,
        sizes in prop::collection::vec(1usize..200, 1..8),
        zlevel in 0.0f32..=1.0f32,
    ) {
        let input: Vec<f32> = (0..TOTAL).map(|i| ((i * 7919) % 201) as f32 / 100.0 - 1.0).collect();

        let run = |blocks: &[usize]| {
            let mut line = Delay::new(64, zlevel);
            line.prepare(1000.0, 256);
            line.set_delay(first);
            let mut data = input.clone();
            let mut start = 0;
            for &n in blocks {
                // requests are picked up at block starts
                if start == change_at {
                    line.set_delay(second);
                }
                line.process_in_place(&mut data[start..start + n]);
                start += n;
            }
            data
        };

        let mut cut = Vec::new();
        let mut pos = 0;
        for n in partition(TOTAL, &sizes) {
            if pos < change_at && change_at < pos + n {
                cut.push(change_at - pos);
                cut.push(pos + n - change_at);
            } else {
                cut.push(n);
            }
            pos += n;
        }
        let whole = run(&[change_at, TOTAL - change_at]
            .into_iter()
            .filter(|&n| n > 0)
            .collect::<Vec<_>>());
        let split = run(&cut);
        prop_assert!(
            whole.iter().zip(&split).all(|(a, b)| a.to_bits() == b.to_bits()),
            "Delay {} -> {} at {} depends on block sizes {:?}",
            first, second, change_at, sizes
        );
    }

    /// Envelope output stays within the segment levels for any ADSR
    /// setting, gate length and block size.
    #[test]
    fn envelope_stays_within_levels(
        attack in 0.0f32..=1.0f32,
        decay in 0.0f32..=1.0f32,
        sustain in 0.0f32..=1.0f32,
        release in 0.0f32..=1.0f32,
        gate in 1usize..2000,
        block in 1usize..300,
    ) {
        let mut env = Envelope::new(2000.0, 1.0, 4);
        env.preset(EnvelopePreset::Adsr);
        env.set_param(0, EnvelopeParam::Time(attack));
        env.set_param(1, EnvelopeParam::Time(decay));
        env.set_param(1, EnvelopeParam::Level(sustain));
        env.set_param(2, EnvelopeParam::Time(release));
        env.event(EnvelopeEvent::KeyDown);

        let mut out = vec![0.0f32; 4000];
        let mut start = 0;
        let mut released = false;
        while start < out.len() {
            if !released && start >= gate {
                env.event(EnvelopeEvent::KeyUp);
                released = true;
            }
            let n = block.min(out.len() - start);
            env.update(&mut out[start..start + n], 0.0, 1.0);
            start += n;
        }
        for (i, &y) in out.iter().enumerate() {
            prop_assert!(
                (-1e-6..=1.0 + 1e-4).contains(&y),
                "envelope sample {} out of range: {} (a={}, d={}, s={}, r={})",
                i, y, attack, decay, sustain, release
            );
        }
    }
}

//! Integration tests for icst-synth crate.
//!
//! Tests cover wavetable rendering, envelope contours, delay length
//! changes, sample playback and chained FM oscillators.

use icst_synth::{
    Delay, DelayState, Effect, Envelope, EnvelopeEvent, EnvelopeParam, EnvelopePreset, FmOsc, Mix,
    PlaybackStatus, SAMPLE_GUARD, SampleOsc, VaOsc, VaShape, WaveOsc,
};

fn rms(x: &[f32]) -> f32 {
    (x.iter().map(|v| v * v).sum::<f32>() / x.len() as f32).sqrt()
}

// ---------------------------------------------------------------------------
// 1. Wavetable oscillator
// ---------------------------------------------------------------------------

fn sine_osc() -> WaveOsc {
    let mut osc = WaveOsc::new(1024, 2, 4410.0, 44.1, 44100.0);
    let mut spectrum = vec![0.0f32; 1022];
    spectrum[0] = 1.0;
    osc.load_table(&spectrum, 0);
    osc
}

#[test]
fn wavetable_renders_normalized_cosine() {
    let mut osc = sine_osc();
    let zero = [0i32; 64];

    // pitch 0.5 sits halfway between 44.1 Hz and 4.41 kHz on a log scale
    let mut block = [0.0f32; 64];
    osc.update(&mut block, 0.5, 0.0, 0.0, &zero);
    for (i, &y) in block.iter().enumerate() {
        let expected = 0.707_106_8
            * (2.0 * std::f32::consts::PI * 441.0 * i as f32 / 44100.0).cos();
        assert!(
            (y - expected).abs() < 1e-3,
            "sample {i}: got {y}, expected {expected}"
        );
    }

    let mut out = vec![0.0f32; 4400];
    for chunk in out.chunks_mut(64) {
        osc.update(chunk, 0.5, 0.0, 0.0, &zero[..chunk.len()]);
    }
    // 44 whole periods
    let r = rms(&out);
    assert!((r - 0.5).abs() < 1e-3, "RMS {r}");
}

#[test]
fn wavetable_pitch_glide_stays_bounded() {
    let mut osc = sine_osc();
    let zero = [0i32; 128];
    let mut out = [0.0f32; 128];
    for step in 0..64 {
        let pitch = step as f32 / 63.0;
        osc.update(&mut out, pitch, 0.0, 0.0, &zero);
        assert!(
            out.iter().all(|x| x.is_finite() && x.abs() < 0.75),
            "pitch {pitch} left the normalized range"
        );
    }
}

// ---------------------------------------------------------------------------
// 2. Envelope
// ---------------------------------------------------------------------------

#[test]
fn adsr_rises_then_falls() {
    let mut env = Envelope::new(10_000.0, 1.0, 4);
    env.preset(EnvelopePreset::Adsr);
    env.set_param(0, EnvelopeParam::Time(0.6));
    env.set_param(1, EnvelopeParam::Time(0.5));
    env.set_param(1, EnvelopeParam::Level(0.5));
    env.set_param(2, EnvelopeParam::Time(0.5));

    env.event(EnvelopeEvent::KeyDown);
    let mut held = vec![0.0f32; 1000];
    for chunk in held.chunks_mut(64) {
        env.update(chunk, 0.0, 1.0);
    }
    env.event(EnvelopeEvent::KeyUp);
    let mut released = vec![0.0f32; 1000];
    for chunk in released.chunks_mut(64) {
        env.update(chunk, 0.0, 1.0);
    }

    let (peak, &top) = held
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .unwrap();
    assert!((top - 1.0).abs() < 1e-3, "peak {top}");
    assert!((200..300).contains(&peak), "attack ended at {peak}");

    for w in held[..=peak].windows(2) {
        assert!(w[1] >= w[0] - 1e-6, "attack not monotone: {} -> {}", w[0], w[1]);
    }
    let tail: Vec<f32> = held[peak..].iter().chain(&released).copied().collect();
    for w in tail.windows(2) {
        assert!(w[1] <= w[0] + 1e-6, "decay not monotone: {} -> {}", w[0], w[1]);
    }
    assert!((held[999] - 0.5).abs() < 1e-2, "sustain {}", held[999]);
    assert!(released[999] < 1e-3, "release ended at {}", released[999]);
}

/// Render one sample per update, posting `events` before the given sample
/// indices. Returns the output and the indices of samples that start a new
/// segment.
fn trace_segments(
    env: &mut Envelope,
    n: usize,
    events: &[(usize, EnvelopeEvent)],
) -> (Vec<f32>, Vec<usize>) {
    let mut out = Vec::with_capacity(n);
    let mut starts = Vec::new();
    let mut running = env.current_segment();
    for k in 0..n {
        if let Some(&(_, event)) = events.iter().find(|(at, _)| *at == k) {
            env.event(event);
        }
        // an empty update only applies the pending event
        env.update(&mut [], 0.0, 1.0);
        if env.current_segment() != running {
            running = env.current_segment();
            starts.push(k);
        }
        let mut y = [0.0f32];
        env.update(&mut y, 0.0, 1.0);
        out.push(y[0]);
    }
    (out, starts)
}

#[test]
fn segment_transitions_are_continuous() {
    const LSB: f32 = 1.0 / 32768.0;
    let events = [(16, EnvelopeEvent::KeyDown), (1200, EnvelopeEvent::KeyUp)];

    let mut adsr = Envelope::new(10_000.0, 1.0, 4);
    adsr.preset(EnvelopePreset::Adsr);
    adsr.set_param(0, EnvelopeParam::Time(0.6));
    adsr.set_param(1, EnvelopeParam::Time(0.5));
    adsr.set_param(1, EnvelopeParam::Level(0.5));
    adsr.set_param(2, EnvelopeParam::Time(0.5));

    let mut abdsr = Envelope::new(10_000.0, 1.0, 4);
    abdsr.preset(EnvelopePreset::Abdsr);
    abdsr.set_param(0, EnvelopeParam::Time(0.6));
    abdsr.set_param(0, EnvelopeParam::Level(1.0));
    abdsr.set_param(1, EnvelopeParam::Time(0.4));
    abdsr.set_param(1, EnvelopeParam::Level(0.7));
    abdsr.set_param(2, EnvelopeParam::Time(0.5));
    abdsr.set_param(2, EnvelopeParam::Level(0.4));
    abdsr.set_param(3, EnvelopeParam::Time(0.5));

    // key down, end of attack, (end of breakpoint,) key up
    for (name, mut env, expected) in [("adsr", adsr, 3), ("abdsr", abdsr, 4)] {
        let (out, starts) = trace_segments(&mut env, 2400, &events);
        assert_eq!(starts.len(), expected, "{name}: transitions at {starts:?}");
        assert_eq!(starts[0], 16);
        assert_eq!(*starts.last().unwrap(), 1200);

        // the first sample of a segment continues from the last output:
        // it moves no further than the segment's own next step
        for &t in &starts {
            let jump = (out[t] - out[t - 1]).abs();
            let next = (out[t + 1] - out[t]).abs();
            assert!(
                jump <= 1.05 * next + LSB,
                "{name}: jump {jump} at sample {t}, next step {next}"
            );
        }
    }
}

#[test]
fn release_settles_at_zero() {
    let mut env = Envelope::new(1000.0, 1.0, 4);
    env.preset(EnvelopePreset::Adsr);
    env.set_param(1, EnvelopeParam::Level(0.8));
    env.event(EnvelopeEvent::KeyDown);
    let mut out = [0.0f32; 256];
    env.update(&mut out, 0.0, 1.0);
    assert!(!env.is_idle());

    env.event(EnvelopeEvent::KeyUp);
    for _ in 0..400 {
        env.update(&mut out, 0.0, 1.0);
    }
    // the release segment of the preset loops onto itself
    assert_eq!(env.current_segment(), 2);
    assert!(env.output().abs() < 1e-4);
}

// ---------------------------------------------------------------------------
// 3. Delay length changes
// ---------------------------------------------------------------------------

#[test]
fn delay_change_crossfades_without_gaps() {
    let mut line = Delay::new(100, 1.0);
    line.prepare(1000.0, 32); // 20 sample crossfades
    line.set_delay(10);

    let mut data = vec![1.0f32; 400];
    for (n, chunk) in data.chunks_mut(7).enumerate() {
        if n == 20 {
            line.set_delay(30);
        }
        line.process_in_place(chunk);
    }
    for (i, &y) in data.iter().enumerate() {
        assert!((y - 1.0).abs() < 1e-5, "sample {i}: {y}");
    }
    assert_eq!(line.delay(), 30);
    assert_eq!(line.state(), DelayState::Steady);
}

#[test]
fn delay_refill_plays_direct_signal_at_zlevel() {
    let mut line = Delay::new(100, 0.0);
    line.prepare(1000.0, 32);
    line.set_delay(50);

    let mut data = vec![1.0f32; 40];
    line.process_in_place(&mut data);
    assert_eq!(line.state(), DelayState::Refill);
    // the fade out of an empty line passes the input, then silence
    assert!(data[25..].iter().all(|&y| y == 0.0));
}

// ---------------------------------------------------------------------------
// 4. Sample playback
// ---------------------------------------------------------------------------

#[test]
fn looped_sample_plays_past_its_end() {
    let length = 1000;
    let mut d: Vec<f32> = (0..length + SAMPLE_GUARD)
        .map(|i| (2.0 * std::f32::consts::PI * i as f32 / 100.0).sin())
        .collect();
    SampleOsc::pre_comp(&mut d, length, length, 48000.0);

    let mut player = SampleOsc::new();
    let mut out = vec![0.0f32; 3000];
    let mut first = Some(0);
    for chunk in out.chunks_mut(64) {
        let status = player.update(chunk, &d, 1.0, length, first.take(), length as f32);
        assert_eq!(status, PlaybackStatus::Playing);
    }
    // three passes through a loop of ten periods
    let late = rms(&out[2000..3000]);
    assert!((late - std::f32::consts::FRAC_1_SQRT_2).abs() < 2e-2, "RMS {late}");
}

#[test]
fn one_shot_sample_reports_end() {
    let length = 300;
    let mut d = vec![0.5f32; length + SAMPLE_GUARD];
    SampleOsc::pre_comp(&mut d, length, 0, 44100.0);

    let mut player = SampleOsc::new();
    let mut out = [0.0f32; 128];
    let mut statuses = Vec::new();
    let mut first = Some(0);
    for _ in 0..4 {
        statuses.push(player.update(&mut out, &d, 1.0, length, first.take(), 0.0));
    }
    assert_eq!(statuses[0], PlaybackStatus::Playing);
    assert!(statuses.contains(&PlaybackStatus::EndReached));
    assert!(out.iter().all(|&y| y == 0.0));
}

// ---------------------------------------------------------------------------
// 5. Oscillator chains
// ---------------------------------------------------------------------------

#[test]
fn fm_modulator_drives_carrier() {
    let mut modulator = FmOsc::new(4000.0, 20.0, 48000.0);
    let mut carrier = FmOsc::new(4000.0, 20.0, 48000.0);
    let mut plain = FmOsc::new(4000.0, 20.0, 48000.0);
    let zero = [0i32; 64];
    let mut pm = [0i32; 64];
    let mut fm = vec![0.0f32; 1024];
    let mut pure = vec![0.0f32; 1024];

    for (a, b) in fm.chunks_mut(64).zip(pure.chunks_mut(64)) {
        modulator.update_modulator(&mut pm, 0.6, 0.05, 0.0, &zero, Mix::Replace);
        carrier.update_carrier(a, 0.5, 1.0, 0.0, &pm, Mix::Replace);
        plain.update_carrier(b, 0.5, 1.0, 0.0, &zero, Mix::Replace);
    }
    assert!(fm.iter().all(|x| x.abs() <= 1.0));
    assert!(fm.iter().zip(&pure).any(|(x, y)| (x - y).abs() > 0.1));
    // phase modulation leaves the carrier power alone
    assert!((rms(&fm) - rms(&pure)).abs() < 0.1);
}

#[test]
fn va_saw_feeds_effect_chain() {
    let mut osc = VaOsc::new(4800.0, 100.0, 48000.0);
    osc.set_shape(VaShape::Saw);
    let mut amp = icst_synth::Amp::new();
    amp.prepare(48000.0, 64);
    amp.set_amp(0.5);

    let zero = [0i32; 64];
    let mut out = vec![0.0f32; 4800];
    for chunk in out.chunks_mut(64) {
        osc.update(chunk, 0.5, 0.0, &zero[..chunk.len()]);
        amp.process_in_place(chunk);
    }
    assert!(out.iter().all(|x| x.is_finite()));
    assert!(out[2400..].iter().all(|x| x.abs() <= 1.0));
    assert!(rms(&out[2400..]) > 0.05);
}

//! Tests for the control-rate modulators

use lazerbass_dsp::envelope::Envelope;
use lazerbass_dsp::lfo::Lfo;
use lazerbass_dsp::params::SynthParams;

const SAMPLE_RATE: u32 = 48000;
const UPDATE_RATE: u32 = 1000;

// Default rate value 0.5 maps to 2 Hz free-running, so the phase advances
// by 2 * 1000 / 48000 = 1/24 per tick at these rates.
const PHASE_PER_TICK: f32 = 2.0 * UPDATE_RATE as f32 / SAMPLE_RATE as f32;

#[test]
fn lfo_falling_saw() {
    let mut params = SynthParams::new();
    params.lfo1.shape.add(-50, false); // shape 0.0

    let mut lfo = Lfo::new();
    lfo.init(SAMPLE_RATE, UPDATE_RATE, 1);

    lfo.tick(params.bpm, &params.lfo1);
    assert!((lfo.output() - (1.0 - PHASE_PER_TICK)).abs() < 1e-4);

    lfo.tick(params.bpm, &params.lfo1);
    assert!((lfo.output() - (1.0 - 2.0 * PHASE_PER_TICK)).abs() < 1e-4);
}

#[test]
fn lfo_rising_saw() {
    let mut params = SynthParams::new();
    params.lfo1.shape.add(50, false); // shape 1.0

    let mut lfo = Lfo::new();
    lfo.init(SAMPLE_RATE, UPDATE_RATE, 1);

    lfo.tick(params.bpm, &params.lfo1);
    assert!((lfo.output() - PHASE_PER_TICK).abs() < 1e-4);
}

#[test]
fn lfo_triangle_peaks_at_shape() {
    let params = SynthParams::new(); // shape 0.5

    let mut lfo = Lfo::new();
    lfo.init(SAMPLE_RATE, UPDATE_RATE, 1);

    let mut peak = 0.0_f32;
    let mut ticks_to_peak = 0;
    for n in 0..24 {
        lfo.tick(params.bpm, &params.lfo1);
        if lfo.output() > peak {
            peak = lfo.output();
            ticks_to_peak = n;
        }
        assert!(lfo.output() >= 0.0 && lfo.output() <= 1.0);
    }

    // One full cycle is 24 ticks; the triangle peaks halfway through.
    assert!(peak > 0.95);
    assert!((10..=13).contains(&ticks_to_peak));
}

#[test]
fn lfo_sample_and_hold_is_constant_between_wraps() {
    let mut params = SynthParams::new();
    params.lfo1.waveform.add(1);

    let mut lfo = Lfo::new();
    lfo.init(SAMPLE_RATE, UPDATE_RATE, 1);

    lfo.tick(params.bpm, &params.lfo1);
    let held = lfo.output();
    assert!((0.0..1.0).contains(&held));

    for _ in 0..10 {
        lfo.tick(params.bpm, &params.lfo1);
        assert_eq!(lfo.output(), held);
    }

    // Past the cycle boundary a new value is held.
    for _ in 0..20 {
        lfo.tick(params.bpm, &params.lfo1);
    }
    assert_ne!(lfo.output(), held);
}

#[test]
fn lfo_noise_stays_in_range() {
    let mut params = SynthParams::new();
    params.lfo1.waveform.add(2);

    let mut lfo = Lfo::new();
    lfo.init(SAMPLE_RATE, UPDATE_RATE, 7);

    for _ in 0..200 {
        lfo.tick(params.bpm, &params.lfo1);
        assert!((0.0..1.0).contains(&lfo.output()));
    }
}

#[test]
fn lfo_reset_phase_honors_restart_flag() {
    let mut params = SynthParams::new();
    params.lfo1.shape.add(-50, false);

    let mut lfo = Lfo::new();
    lfo.init(SAMPLE_RATE, UPDATE_RATE, 1);

    lfo.tick(params.bpm, &params.lfo1);
    let first = lfo.output();

    // Restart disabled: the phase keeps running.
    lfo.reset_phase(&params.lfo1);
    lfo.tick(params.bpm, &params.lfo1);
    assert_ne!(lfo.output(), first);

    params.lfo1.restart.add(1);
    lfo.reset_phase(&params.lfo1);
    lfo.tick(params.bpm, &params.lfo1);
    assert_eq!(lfo.output(), first);
}

#[test]
fn envelope_attack_rises_to_peak() {
    let params = SynthParams::new();

    let mut env = Envelope::new();
    env.init(SAMPLE_RATE, UPDATE_RATE);

    assert_eq!(env.output(), 0.0);
    env.trigger_attack();

    let mut previous = 0.0;
    for _ in 0..20 {
        env.tick(&params.amp_env);
        assert!(env.output() > previous);
        assert!(env.output() <= 1.0);
        previous = env.output();
    }
}

#[test]
fn envelope_short_attack_falls_through_to_release() {
    let mut params = SynthParams::new();
    // Attack 0.005: shorter than one tick but above the minimum time.
    params.amp_env.attack.add(-99, false);

    let mut env = Envelope::new();
    env.init(SAMPLE_RATE, UPDATE_RATE);
    env.trigger_attack();

    // The attack overflows and the release starts within the same tick.
    env.tick(&params.amp_env);
    assert!(env.output() > 0.9);

    let first = env.output();
    env.tick(&params.amp_env);
    assert!(env.output() < first);
}

#[test]
fn envelope_minimum_attack_collapses() {
    let mut params = SynthParams::new();
    params.amp_env.attack.add(-100, false); // 0.0

    let mut env = Envelope::new();
    env.init(SAMPLE_RATE, UPDATE_RATE);
    env.trigger_attack();

    env.tick(&params.amp_env);
    assert!(env.output() > 0.9);
}

#[test]
fn envelope_minimum_release_goes_silent() {
    let mut params = SynthParams::new();
    params.amp_env.release.add(-100, false); // 0.0

    let mut env = Envelope::new();
    env.init(SAMPLE_RATE, UPDATE_RATE);
    env.trigger_attack();
    for _ in 0..10 {
        env.tick(&params.amp_env);
    }

    env.trigger_release();
    env.tick(&params.amp_env);
    assert_eq!(env.output(), 0.0);
}

#[test]
fn envelope_release_decays_to_zero() {
    let params = SynthParams::new();

    let mut env = Envelope::new();
    env.init(SAMPLE_RATE, UPDATE_RATE);
    env.trigger_attack();
    for _ in 0..10 {
        env.tick(&params.amp_env);
    }

    env.trigger_release();
    let mut previous = f32::MAX;
    for _ in 0..2000 {
        env.tick(&params.amp_env);
        assert!(env.output() <= previous);
        previous = env.output();
    }
    assert_eq!(env.output(), 0.0);
}

#[test]
fn envelope_peak_scales_the_segments() {
    let mut params = SynthParams::new();
    params.amp_env.peak.add(-50, false); // 0.5

    let mut env = Envelope::new();
    env.init(SAMPLE_RATE, UPDATE_RATE);
    env.trigger_attack();

    for _ in 0..5000 {
        env.tick(&params.amp_env);
        assert!(env.output() <= 0.5);
    }
}

#[test]
fn envelope_invert_flips_the_output() {
    let mut params = SynthParams::new();
    params.amp_env.invert.add(1);

    let mut env = Envelope::new();
    env.init(SAMPLE_RATE, UPDATE_RATE);

    // Idle state reads fully open when inverted.
    env.tick(&params.amp_env);
    assert_eq!(env.output(), 1.0);

    env.trigger_attack();
    let mut previous = 1.0;
    for _ in 0..20 {
        env.tick(&params.amp_env);
        assert!(env.output() < previous);
        previous = env.output();
    }
}

#[test]
fn envelope_retrigger_restarts_attack() {
    let params = SynthParams::new();

    let mut env = Envelope::new();
    env.init(SAMPLE_RATE, UPDATE_RATE);
    env.trigger_attack();
    for _ in 0..30 {
        env.tick(&params.amp_env);
    }
    let settled = env.output();

    env.trigger_attack();
    env.tick(&params.amp_env);
    assert!(env.output() < settled);
}
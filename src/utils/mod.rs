//! Small math helpers shared by the processing stages.

pub mod random;

#[allow(unused_imports)]
use num_traits::float::Float;

/// Parabolic warp of a value in 0..1 by a warp factor in -1..1.
#[inline]
pub fn parabola_warp(val01: f32, warp: f32) -> f32 {
    ((warp + 1.0) - val01.abs() * warp) * val01
}

/// Ramp that stays linear up to the breakpoint `bp`, then holds at 1.
///
/// Used by the period filter to morph between the raw waveform and its
/// dB-shaped version as the peak control rises.
#[inline]
pub fn breakpoint_ramp(v: f32, bp: f32) -> f32 {
    let v0 = 1.0 - v;
    let v1 = 1.0 - bp;

    if v0 > v1 {
        1.0 - (v0 - v1) / bp
    } else {
        1.0 - v0
    }
}

#[inline]
pub fn db_to_gain(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

#[inline]
pub fn semitones_to_ratio(semitones: f32) -> f32 {
    (semitones / 12.0).exp2()
}

/// MIDI note number (in semitones, fractional allowed) to frequency in Hz.
#[inline]
pub fn note_to_frequency(note: f32) -> f32 {
    // 8.1758 Hz is MIDI note 0.
    8.175_799 * (note / 12.0).exp2()
}

#[inline]
pub fn crossfade(a: f32, b: f32, fade: f32) -> f32 {
    a + (b - a) * fade
}

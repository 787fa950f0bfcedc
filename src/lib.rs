#![doc = include_str!("../README.md")]
#![cfg_attr(not(test), no_std)]

pub mod engine;
pub mod envelope;
pub mod lfo;
pub mod modulation;
pub mod note_stack;
pub mod param;
pub mod params;
pub mod utils;

/// One frame of interleaved 16-bit stereo output.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StereoSample {
    pub left: i16,
    pub right: i16,
}

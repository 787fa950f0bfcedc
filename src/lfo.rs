//! Low frequency oscillator running at the control rate.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::params::{lfo_frequency, LfoParams, LfoWaveform};
use crate::utils::crossfade;
use crate::utils::random::Lcg;

#[derive(Debug)]
pub struct Lfo {
    output: f32,
    phase: f32,
    inv_update_rate: f32,
    last_random: f32,
    now_random: f32,
    rng: Lcg,
}

impl Default for Lfo {
    fn default() -> Self {
        Self {
            output: 0.0,
            phase: 0.0,
            inv_update_rate: 0.0,
            last_random: 0.0,
            now_random: 0.0,
            rng: Lcg::default(),
        }
    }
}

impl Lfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, sample_rate: u32, update_rate: u32, seed: u32) {
        self.inv_update_rate = update_rate as f32 / sample_rate as f32;
        self.rng = Lcg::new(seed);
        self.last_random = self.rng.next_float();
        self.now_random = self.rng.next_float();
        self.phase = 0.0;
        self.output = 0.0;
    }

    /// Advances one control tick and updates the output.
    pub fn tick(&mut self, bpm: u32, desc: &LfoParams) {
        let rate = lfo_frequency(bpm, desc, desc.rate.get_with_modulation());
        self.phase += rate * self.inv_update_rate;
        if self.phase > 1.0 {
            self.phase -= 1.0;
            // New random pair for the sample/hold style shapes.
            self.last_random = self.now_random;
            self.now_random = self.rng.next_float();
        }

        self.output = match LfoWaveform::from(desc.waveform.get() as usize) {
            LfoWaveform::SawTriangle => {
                let shape = desc.shape.get_with_modulation();
                if shape == 0.0 {
                    1.0 - self.phase
                } else if shape == 1.0 {
                    self.phase
                } else if self.phase < shape {
                    self.phase / shape
                } else {
                    (1.0 - self.phase) / (1.0 - shape)
                }
            }
            LfoWaveform::SampleAndHold => self.now_random,
            LfoWaveform::Noise => crossfade(self.last_random, self.now_random, self.phase),
        };
    }

    /// Restarts the cycle, but only when the restart flag is set.
    pub fn reset_phase(&mut self, desc: &LfoParams) {
        if desc.restart.get() {
            self.phase = 0.0;
            self.last_random = self.now_random;
            self.now_random = self.rng.next_float();
        }
    }

    #[inline]
    pub fn output(&self) -> f32 {
        self.output
    }
}

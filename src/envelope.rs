//! Attack/release envelope running at the control rate.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::params::{env_segment_time, EnvParams};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum State {
    #[default]
    Init,
    Attack,
    Release,
}

#[derive(Debug, Default)]
pub struct Envelope {
    output: f32,
    inv_update_rate: f32,
    state: State,
    phase: f32,
}

impl Envelope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn init(&mut self, sample_rate: u32, update_rate: u32) {
        self.inv_update_rate = update_rate as f32 / sample_rate as f32;
        self.state = State::Init;
        self.phase = 0.0;
        self.output = 0.0;
    }

    /// Advances one control tick. An attack segment that overflows (or is
    /// shorter than the minimum time) falls through into the release segment
    /// within the same tick, so no tick is lost at the transition.
    pub fn tick(&mut self, desc: &EnvParams) {
        match self.state {
            State::Init => self.output = 0.0,
            State::Attack => {
                let time = env_segment_time(desc.attack.get());
                if time > EnvParams::MIN_SEG_TIME {
                    self.phase += 1.0 / time * self.inv_update_rate;
                    if self.phase > 1.0 {
                        self.phase = 0.0;
                        self.state = State::Release;
                    }
                    self.output = self.phase * desc.peak.get();
                } else {
                    self.state = State::Release;
                    self.phase = 0.0;
                }

                if self.state == State::Release {
                    self.release_segment(desc);
                }
            }
            State::Release => self.release_segment(desc),
        }

        if desc.invert.get() {
            self.output = 1.0 - self.output;
        }
    }

    fn release_segment(&mut self, desc: &EnvParams) {
        let time = env_segment_time(desc.release.get());
        if time > EnvParams::MIN_SEG_TIME {
            self.phase += 1.0 / time * self.inv_update_rate;
            if self.phase > 1.0 {
                self.phase = 1.0;
                self.state = State::Init;
                self.output = 0.0;
            } else {
                self.output = (1.0 - self.phase) * desc.peak.get();
            }
        } else {
            self.state = State::Init;
            self.output = 0.0;
        }
    }

    /// Forces the attack segment from the start. Called on note trigger.
    pub fn trigger_attack(&mut self) {
        self.state = State::Attack;
        self.phase = 0.0;
    }

    /// Forces the release segment from the start. Called on note release.
    pub fn trigger_release(&mut self) {
        self.state = State::Release;
        self.phase = 0.0;
    }

    #[inline]
    pub fn output(&self) -> f32 {
        self.output
    }
}

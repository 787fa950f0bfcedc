//! Additive voice engine.
//!
//! A bank of up to 256 sinusoidal partials, each one a two-state modified
//! coupled-form (MCF) resonator, advanced at the sample rate. All spectral
//! shaping (oscillator model, ratio processing, beating, period filter) runs
//! at the much slower control rate: `process()` interleaves control ticks
//! with audio generation so that every recomputation lands on a fixed sample
//! boundary and audio between ticks uses frozen per-partial state.

#[allow(unused_imports)]
use num_traits::float::Float;

use core::f32::consts::PI;

use spin::Once;

use crate::envelope::Envelope;
use crate::lfo::Lfo;
use crate::modulation::{ModSource, ModulationBank};
use crate::note_stack::NoteStack;
use crate::params::{ratio_mul_amount, OscillatorType, SynthParams};
use crate::utils::random::Lcg;
use crate::utils::{
    crossfade, db_to_gain, note_to_frequency, parabola_warp, breakpoint_ramp, semitones_to_ratio,
};
use crate::StereoSample;

/// Capacity of the partial arrays; the active prefix is set by the
/// numPartials parameter.
pub const MAX_PARTIALS: usize = 256;

/// Partial count of the instrument's original full series. The spectral
/// curves (dispersion, period filter) normalize the partial index against
/// this span, not against the active count.
const FULL_SERIES_PARTIALS: usize = 324;

/// Partials above this frequency are muted (their recurrence still runs).
pub const MAX_PARTIAL_FREQ_HZ: f32 = 12_000.0;

/// Full scale divided by 8 for summing headroom.
const OUTPUT_SCALE: f32 = i16::MAX as f32 / 8.0;

static SAW_GAIN: Once<[f32; MAX_PARTIALS * 2]> = Once::new();

/// `1/(n+1)` harmonic falloff table shared by the saw and square models.
fn saw_gain_table() -> &'static [f32; MAX_PARTIALS * 2] {
    SAW_GAIN.call_once(|| {
        let mut table = [0.0; MAX_PARTIALS * 2];
        for (i, gain) in table.iter_mut().enumerate() {
            *gain = 1.0 / (1.0 + i as f32);
        }
        table
    })
}

/// Cosine companion predicted from a sine sample, magnitude only.
#[inline]
fn predicted_cos(sin: f32) -> f32 {
    let e = 1.0 - sin * sin;
    e.clamp(0.0, 1.0).sqrt()
}

/// Runs `apply` on the affected sub-run of every repeating window of
/// `pattern` partials: the leading `pattern / 2` indices are skipped, the
/// remaining ones are affected.
fn for_each_patterned(num: usize, pattern: usize, mut apply: impl FnMut(usize)) {
    let skip = pattern / 2;
    let affect = pattern - skip;

    let mut i = 0;
    while i < num {
        i += skip;
        let mut j = 0;
        while j < affect && i < num {
            apply(i);
            i += 1;
            j += 1;
        }
    }
}

/// The complete voice: oscillator bank, parameters, modulators and the
/// modulation bank. One instance lives for the whole process; GUI/MIDI
/// contexts mutate it through the accessors, serialized by the caller
/// against `process()`.
#[derive(Debug)]
pub struct Lazerbass {
    sample_rate: u32,
    two_pi_inv_sample_rate: f32,
    max_angular_freq: f32,
    tick_pos: u32,
    tick_period: u32,

    // MCF resonator state.
    sin0: [f32; MAX_PARTIALS],
    sin1: [f32; MAX_PARTIALS],
    coefs: [f32; MAX_PARTIALS],

    // Per-partial angular frequencies and activity.
    freqs: [f32; MAX_PARTIALS],
    old_freqs: [f32; MAX_PARTIALS],
    enabled: [bool; MAX_PARTIALS],

    // Start phases used on retrigger. Persist across renders; a disabled
    // phase randomization leaves the last randomized values in place.
    start_phase: [f32; MAX_PARTIALS],

    // Spectral state recomputed every tick.
    gains: [f32; MAX_PARTIALS],
    ratio: [f32; MAX_PARTIALS],

    // Note state.
    output: bool,
    velocity: f32,
    pending_retrigger: bool,
    note_number: u8,
    pitch_bend: f32,
    pitch: f32,
    fundamental: f32,
    note_stack: NoteStack,

    rng: Lcg,

    params: SynthParams,
    modulation_bank: ModulationBank,
    lfo1: Lfo,
    lfo2: Lfo,
    lfo3: Lfo,
    lfo4: Lfo,
    amp_env: Envelope,
    env1: Envelope,
    env2: Envelope,
}

impl Default for Lazerbass {
    fn default() -> Self {
        Self::new()
    }
}

impl Lazerbass {
    pub fn new() -> Self {
        Self {
            sample_rate: 0,
            two_pi_inv_sample_rate: 0.0,
            max_angular_freq: 0.0,
            tick_pos: 0,
            tick_period: 0,
            sin0: [0.0; MAX_PARTIALS],
            sin1: [0.0; MAX_PARTIALS],
            coefs: [0.0; MAX_PARTIALS],
            freqs: [0.0; MAX_PARTIALS],
            old_freqs: [-1.0; MAX_PARTIALS],
            enabled: [false; MAX_PARTIALS],
            start_phase: [0.0; MAX_PARTIALS],
            gains: [0.0; MAX_PARTIALS],
            ratio: [0.0; MAX_PARTIALS],
            output: false,
            velocity: 0.0,
            pending_retrigger: false,
            note_number: 0,
            pitch_bend: 0.0,
            pitch: 0.0,
            fundamental: 0.0,
            note_stack: NoteStack::new(),
            rng: Lcg::default(),
            params: SynthParams::new(),
            modulation_bank: ModulationBank::new(),
            lfo1: Lfo::new(),
            lfo2: Lfo::new(),
            lfo3: Lfo::new(),
            lfo4: Lfo::new(),
            amp_env: Envelope::new(),
            env1: Envelope::new(),
            env2: Envelope::new(),
        }
    }

    /// Computes the derived rate constants. Must run before `process()`.
    /// `update_rate` is the control rate in Hz.
    pub fn init(&mut self, sample_rate: u32, update_rate: u32) {
        self.sample_rate = sample_rate;
        self.tick_pos = 0;
        self.tick_period = sample_rate / update_rate;
        self.two_pi_inv_sample_rate = 2.0 * PI / sample_rate as f32;
        self.max_angular_freq = MAX_PARTIAL_FREQ_HZ * self.two_pi_inv_sample_rate;
        self.pending_retrigger = false;
        self.output = false;

        self.old_freqs = [-1.0; MAX_PARTIALS];

        self.rng = Lcg::default();
        self.lfo1.init(sample_rate, update_rate, 0x11);
        self.lfo2.init(sample_rate, update_rate, 0x22);
        self.lfo3.init(sample_rate, update_rate, 0x33);
        self.lfo4.init(sample_rate, update_rate, 0x44);
        self.amp_env.init(sample_rate, update_rate);
        self.env1.init(sample_rate, update_rate);
        self.env2.init(sample_rate, update_rate);
    }

    /// Fills the block, running a control tick whenever the sample countdown
    /// reaches zero. Audio between two ticks always uses the per-partial
    /// state frozen by the last tick.
    pub fn process(&mut self, block: &mut [StereoSample]) {
        let mut pos = 0;
        while pos < block.len() {
            if self.tick_pos == 0 {
                self.tick();
                self.tick_pos = self.tick_period;
            }
            let num_samples = (self.tick_pos as usize).min(block.len() - pos);
            self.tick_pos -= num_samples as u32;
            self.render(&mut block[pos..pos + num_samples]);
            pos += num_samples;
        }
    }

    pub fn note_on(&mut self, note: u8, velocity: f32) {
        self.note_stack.enqueue(note);
        self.note_number = note;
        self.velocity = velocity;
        // The actual phase/modulator reset happens at the end of the next
        // tick so it always lands on a control boundary.
        self.pending_retrigger = true;
        self.output = true;
    }

    pub fn note_off(&mut self, note: u8, _velocity: f32) {
        match self.note_stack.dequeue(note) {
            None => {
                self.output = false;
                self.amp_env.trigger_release();
                self.env1.trigger_release();
                self.env2.trigger_release();
            }
            Some(top) if top != self.note_number => {
                // Legato: glide to the remaining note without retriggering
                // phases or envelopes.
                self.note_number = top;
            }
            Some(_) => {}
        }
    }

    /// Pitch bend in semitones, applied at the next tick.
    pub fn set_pitch_bend(&mut self, pitch_bend: f32) {
        self.pitch_bend = pitch_bend;
    }

    pub fn params(&self) -> &SynthParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut SynthParams {
        &mut self.params
    }

    pub fn modulation_bank(&self) -> &ModulationBank {
        &self.modulation_bank
    }

    pub fn modulation_bank_mut(&mut self) -> &mut ModulationBank {
        &mut self.modulation_bank
    }

    /// Current output of a modulator, as routed by the modulation bank.
    pub fn modulator_output(&self, source: ModSource) -> f32 {
        match source {
            ModSource::Lfo1 => self.lfo1.output(),
            ModSource::Lfo2 => self.lfo2.output(),
            ModSource::Lfo3 => self.lfo3.output(),
            ModSource::Lfo4 => self.lfo4.output(),
            ModSource::AmpEnv => self.amp_env.output(),
            ModSource::Env1 => self.env1.output(),
            ModSource::Env2 => self.env2.output(),
        }
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    /// True while at least one note is held.
    pub fn active(&self) -> bool {
        self.output
    }

    // ----------------------------------------------------------------------
    // Control tick
    // ----------------------------------------------------------------------

    fn tick(&mut self) {
        let num_partials = self.params.oscillator.num_partials.get() as usize;

        self.update_modulators();
        let outputs = self.modulator_outputs();
        self.modulation_bank.tick(&outputs, &mut self.params);

        self.pitch = self.note_number as f32 + self.pitch_bend;
        self.fundamental = note_to_frequency(self.pitch);

        self.oscillator_processing(num_partials);
        self.ratio_processing(num_partials);

        self.filter_processing(num_partials);
        self.period_filter_processing(num_partials);

        let angular_fundamental = self.fundamental * self.two_pi_inv_sample_rate;
        for i in 0..num_partials {
            self.freqs[i] = self.ratio[i] * angular_fundamental;
        }

        self.beating_processing(num_partials);

        if self.pending_retrigger {
            self.reset_phase();
            self.reset_modulators();
            self.pending_retrigger = false;
        }
    }

    fn update_modulators(&mut self) {
        self.lfo1.tick(self.params.bpm, &self.params.lfo1);
        self.lfo2.tick(self.params.bpm, &self.params.lfo2);
        self.lfo3.tick(self.params.bpm, &self.params.lfo3);
        self.lfo4.tick(self.params.bpm, &self.params.lfo4);
        self.amp_env.tick(&self.params.amp_env);
        self.env1.tick(&self.params.env1);
        self.env2.tick(&self.params.env2);
    }

    fn modulator_outputs(&self) -> [f32; ModSource::COUNT] {
        [
            self.lfo1.output(),
            self.lfo2.output(),
            self.lfo3.output(),
            self.lfo4.output(),
            self.amp_env.output(),
            self.env1.output(),
            self.env2.output(),
        ]
    }

    fn reset_modulators(&mut self) {
        self.lfo1.reset_phase(&self.params.lfo1);
        self.lfo2.reset_phase(&self.params.lfo2);
        self.lfo3.reset_phase(&self.params.lfo3);
        self.lfo4.reset_phase(&self.params.lfo4);
        self.amp_env.trigger_attack();
        self.env1.trigger_attack();
        self.env2.trigger_attack();
    }

    // ----------------------------------------------------------------------
    // Audio generation
    // ----------------------------------------------------------------------

    /// Renders `out.len()` samples with the per-partial state frozen by the
    /// last tick.
    ///
    /// Frequency changes are committed at the first sample: the new
    /// coefficient is derived from the new angular frequency and the
    /// companion state is reseeded from the predicted cosine
    ///
    /// ```text
    /// phi      = (pi - w) / 2
    /// x(n)     = sin(phase)            (unchanged)
    /// y'(n)    = x(n) * sin(w'/2) - cos(phase) * cos(w'/2)
    /// cos(phase) ~ +/- sqrt(1 - x(n)^2), sign from the ramp direction
    /// ```
    ///
    /// which preserves instantaneous phase and amplitude across the step.
    fn render(&mut self, out: &mut [StereoSample]) {
        out.fill(StereoSample::default());

        if !self.output {
            return;
        }

        let num_partials = self.params.oscillator.num_partials.get() as usize;

        // First sample: advance every partial once, commit pending frequency
        // changes, and accumulate through the same enabled-only path as the
        // remaining samples so the output does not depend on where the
        // render-call boundaries fall.
        for i in 0..num_partials {
            let previous = self.sin0[i];

            self.sin0[i] -= self.coefs[i] * self.sin1[i];
            self.sin1[i] += self.coefs[i] * self.sin0[i];

            if self.old_freqs[i] != self.freqs[i] {
                let out_of_range = self.freqs[i] > self.max_angular_freq || self.freqs[i] < 0.0;
                self.enabled[i] = !out_of_range;

                let x = self.sin0[i];
                let cos = if x > previous {
                    predicted_cos(x)
                } else {
                    -predicted_cos(x)
                };
                let half_freq = self.freqs[i] / 2.0;
                self.coefs[i] = 2.0 * half_freq.sin();
                self.sin1[i] = x * half_freq.sin() - cos * half_freq.cos();

                self.old_freqs[i] = self.freqs[i];
            }

            if self.enabled[i] {
                let value = (previous * self.gains[i] * OUTPUT_SCALE) as i16;
                out[0].left = out[0].left.saturating_add(value);
            }
        }

        // Constant-frequency recurrence for the remaining samples, one
        // partial at a time. Disabled partials advance without contributing
        // so they stay phase-synchronized.
        for i in 0..num_partials {
            let c = self.coefs[i];
            let mut x = self.sin0[i];
            let mut y = self.sin1[i];
            let g = self.gains[i];

            if self.enabled[i] {
                for frame in out.iter_mut().skip(1) {
                    let value = (x * g * OUTPUT_SCALE) as i16;
                    frame.left = frame.left.saturating_add(value);

                    x -= y * c;
                    y += x * c;
                }
            } else {
                for _ in 1..out.len() {
                    x -= y * c;
                    y += x * c;
                }
            }

            self.sin0[i] = x;
            self.sin1[i] = y;
        }

        for frame in out.iter_mut() {
            frame.right = frame.left;
        }
    }

    /// Reseeds each partial's resonator from its start phase:
    /// `x0 = sin(phase), y0 = sin(phase - phi)` with `phi = (pi - w) / 2`.
    fn reset_phase(&mut self) {
        let num_partials = self.params.oscillator.num_partials.get() as usize;

        self.randomize_start_phase(num_partials);

        for i in 0..num_partials {
            let phi = (PI - self.freqs[i]) / 2.0;
            let phase = self.start_phase[i];
            self.sin0[i] = phase.sin();
            self.sin1[i] = (phase - phi).sin();
        }
    }

    /// Pattern-gated start phase randomization: each window of `pattern`
    /// partials is split into a left and a right run with independently
    /// scaled random phases. Writes nothing when the feature is off.
    fn randomize_start_phase(&mut self, num_partials: usize) {
        if !self.params.osc_phase.enable.get() {
            return;
        }

        let random = self.params.osc_phase.random.get_with_modulation();
        let symmetry = self.params.osc_phase.symmetry.get_with_modulation();
        let pattern = self.params.osc_phase.pattern.get() as usize;

        let left_len = pattern / 2;
        let right_len = pattern - left_len;
        let max_radians = PI * random;
        let left_amount = (1.0 - symmetry) * 2.0 * max_radians;
        let right_amount = symmetry * 2.0 * max_radians;

        let mut i = 0;
        while i < num_partials {
            let run = left_len.min(num_partials - i);
            for _ in 0..run {
                self.start_phase[i] = left_amount * self.rng.next_float();
                i += 1;
            }
            let run = right_len.min(num_partials - i);
            for _ in 0..run {
                self.start_phase[i] = right_amount * self.rng.next_float();
                i += 1;
            }
        }
    }

    // ----------------------------------------------------------------------
    // Processing pipeline
    // ----------------------------------------------------------------------

    /// Stage 1: base gain/ratio arrays per oscillator model.
    fn oscillator_processing(&mut self, num: usize) {
        let table = saw_gain_table();

        let beating = self.params.oscillator.beating.get_with_modulation();
        let transpose = self.params.oscillator.transpose.get_with_modulation();
        // Even partials are offset by a constant beating frequency and the
        // transpose interval.
        let ratio_beating = (beating / self.fundamental + 1.0) * semitones_to_ratio(transpose);

        match OscillatorType::from(self.params.oscillator.kind.get() as usize) {
            OscillatorType::FullSaw => {
                self.gains[..num].copy_from_slice(&table[..num]);

                let mut i = 0;
                while i < num {
                    self.ratio[i] = i as f32 + 1.0;
                    self.ratio[i + 1] = (i as f32 + 2.0) * ratio_beating;
                    i += 2;
                }
            }
            OscillatorType::DualSaw => {
                let mut partial = 0;
                let mut i = 0;
                while i < num {
                    self.gains[i] = table[partial];
                    self.gains[i + 1] = table[partial];
                    self.ratio[i] = partial as f32 + 1.0;
                    self.ratio[i + 1] = (partial as f32 + 1.0) * ratio_beating;
                    partial += 1;
                    i += 2;
                }
            }
            OscillatorType::MultiSaw => {
                self.multi_series(num, beating, 1, table);
            }
            OscillatorType::FullSquare => {
                let mut i = 0;
                while i < num {
                    self.gains[i] = table[2 * i];
                    self.gains[i + 1] = table[2 * i + 3];
                    self.ratio[i] = 2.0 * i as f32 + 1.0;
                    self.ratio[i + 1] = (2.0 * i as f32 + 3.0) * ratio_beating;
                    i += 2;
                }
            }
            OscillatorType::DualSquare => {
                let mut partial = 0;
                let mut i = 0;
                while i < num {
                    self.gains[i] = table[partial];
                    self.gains[i + 1] = table[partial];
                    self.ratio[i] = partial as f32 + 1.0;
                    self.ratio[i + 1] = (partial as f32 + 1.0) * ratio_beating;
                    partial += 2;
                    i += 2;
                }
            }
            OscillatorType::MultiSquare => {
                self.multi_series(num, beating, 2, table);
            }
            OscillatorType::PwmSquare => {
                let pulse_width = self.params.oscillator.pulse_width.get_with_modulation();
                let phase_mul = pulse_width * PI;

                let mut i = 0;
                while i < num {
                    self.ratio[i] = i as f32 + 1.0;
                    self.ratio[i + 1] = (i as f32 + 2.0) * ratio_beating;

                    self.gains[i] = table[i] * ((phase_mul * (i as f32 + 1.0)).cos() - 1.0) * 0.5;
                    self.gains[i + 1] =
                        table[i + 1] * ((phase_mul * (i as f32 + 2.0)).cos() - 1.0) * 0.5;
                    i += 2;
                }
            }
            OscillatorType::FullPulse => {
                for i in 0..num {
                    self.gains[i] = 0.5;
                    self.ratio[i] = i as f32 + 1.0;
                }
            }
        }

        self.gains[0] *= self.params.oscillator.fundamental.get();
    }

    /// MultiSaw/MultiSquare: `number` independently detuned copies of the
    /// harmonic series interleaved across the partial array. `stride` selects
    /// every harmonic (saw) or every other one (square).
    fn multi_series(&mut self, num: usize, beating: f32, stride: usize, table: &[f32]) {
        let num_osc = self.params.oscillator.number.get() as usize;
        let lowest_ratio = semitones_to_ratio(-beating);
        let interval = semitones_to_ratio(beating * 2.0 / (num_osc as f32 - 1.0));

        let mut osc_ratio = lowest_ratio;
        for osc in 0..num_osc {
            let mut partial = 0;
            let mut i = osc;
            while i < num {
                self.gains[i] = table[partial];
                self.ratio[i] = (partial as f32 + 1.0) * osc_ratio;
                partial += stride;
                i += num_osc;
            }
            osc_ratio *= interval;
        }
    }

    /// Stage 2: dispersion, ratio-mul and ratio-add.
    fn ratio_processing(&mut self, num: usize) {
        if self.params.dispersion.enable.get() {
            let delta_pitch = self.pitch - 60.0;
            let key_ratio = semitones_to_ratio(delta_pitch);
            let key_scale = crossfade(
                1.0,
                1.0 / key_ratio,
                self.params.dispersion.key.get_with_modulation(),
            );
            let shape = self.params.dispersion.shape.get_with_modulation();
            let amount = self.params.dispersion.amount.get_with_modulation();
            let abs_amount = amount.abs();

            for i in 0..num {
                let idx01 = i as f32 / FULL_SERIES_PARTIALS as f32;
                let warp = parabola_warp(idx01, shape) * key_scale;
                let stretch = abs_amount * 4.0 * warp + 1.0;
                if amount > 0.0 {
                    self.ratio[i] *= stretch;
                } else {
                    self.ratio[i] /= stretch;
                }
            }
        }

        if self.params.ratio_mul.enable.get() {
            let pattern = self.params.ratio_mul.pattern.get() as usize;
            let amount = ratio_mul_amount(self.params.ratio_mul.amount.get_with_modulation());
            let ratio = &mut self.ratio;
            for_each_patterned(num, pattern, |i| ratio[i] *= amount);
        }

        if self.params.ratio_add.enable.get() {
            let pattern = self.params.ratio_add.pattern.get() as usize;
            let amount = self.params.ratio_add.amount.get_with_modulation();
            let ratio = &mut self.ratio;
            for_each_patterned(num, pattern, |i| ratio[i] += amount);
        }
    }

    /// Stage 3 (after ratio -> frequency conversion): flat angular frequency
    /// offset on a pattern-gated subset.
    fn beating_processing(&mut self, num: usize) {
        if !self.params.partial_beating.enable.get() {
            return;
        }

        let pattern = self.params.partial_beating.pattern.get() as usize;
        let amount = self.params.partial_beating.amount.get_with_modulation();
        let angular_offset = amount * self.two_pi_inv_sample_rate;

        let freqs = &mut self.freqs;
        for_each_patterned(num, pattern, |i| freqs[i] += angular_offset);
    }

    /// Brightness filter stage. Declared in the parameter set but without
    /// DSP behavior; kept as an explicit pass-through.
    fn filter_processing(&mut self, _num: usize) {}

    /// Stage 4: synthesized periodic gain envelope over the partial index,
    /// blended multiplicatively into the gains.
    fn period_filter_processing(&mut self, num: usize) {
        if !self.params.period_filter.enable.get() {
            return;
        }

        let peak = self.params.period_filter.peak.get_with_modulation();
        let apply = self.params.period_filter.apply.get_with_modulation();
        let blocks = self.params.period_filter.blocks.get();
        let pinch = self.params.period_filter.pinch.get_with_modulation();
        let stretch = self.params.period_filter.stretch.get();
        let cycle = self.params.period_filter.cycle.get_with_modulation();
        let phase_shift = self.params.period_filter.phase_shift.get_with_modulation();

        let inv_log2_num = 1.0 / (num as f32).log2();

        let mag_floor = crossfade(24.0, 300.0, peak);
        let peak_blend = breakpoint_ramp(peak, 0.5);
        let drive = 1.0 + apply * 0.3 + peak * 1.2 * if blocks { 0.0 } else { 1.0 };
        let wet = drive * apply;
        let dry = 1.0 - apply;

        for i in 0..num {
            let idx01 = i as f32 / FULL_SERIES_PARTIALS as f32;
            let warped = parabola_warp(idx01, pinch);
            let mut phase = warped * cycle + phase_shift;
            if stretch {
                // Log-stretch the envelope across the spectrum.
                let spread = warped * cycle * num as f32 + 1.0;
                phase = spread.log2() * (cycle * inv_log2_num) + phase_shift;
            }
            let frac = phase - (phase as i32) as f32;

            let mut wave = if frac > 0.5 { 1.0 } else { 0.0 };
            if !blocks {
                wave = ((frac * 2.0 * PI).cos() + 1.0) * 0.5;
            }

            let db = (wave - 1.0) * mag_floor;
            let level = db_to_gain(db);
            let shaped = crossfade(wave, level, peak_blend);
            self.gains[i] *= shaped * wet + dry;
        }
    }
}

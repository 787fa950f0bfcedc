//! Parameter tree of the whole voice.
//!
//! Ranges, steps, defaults and alt-step multipliers follow the front-panel
//! layout of the instrument: a plain encoder step moves by `step`, a step
//! with the alt modifier held moves `alt_mul` times as far.

#[allow(unused_imports)]
use num_traits::float::Float;

use crate::modulation::ModTarget;
use crate::param::{BoolParam, EnumParam, FloatParam, IntParam};

/// Harmonic series models of the oscillator bank.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorType {
    #[default]
    FullSaw,
    DualSaw,
    MultiSaw,
    FullSquare,
    DualSquare,
    MultiSquare,
    PwmSquare,
    FullPulse,
}

impl OscillatorType {
    pub const COUNT: usize = 8;

    pub fn name(self) -> &'static str {
        match self {
            OscillatorType::FullSaw => "FullSaw",
            OscillatorType::DualSaw => "DualSaw",
            OscillatorType::MultiSaw => "MultiSaw",
            OscillatorType::FullSquare => "FullSquare",
            OscillatorType::DualSquare => "DualSquare",
            OscillatorType::MultiSquare => "MultiSquare",
            OscillatorType::PwmSquare => "PwmSquare",
            OscillatorType::FullPulse => "FullPulse",
        }
    }
}

impl<T> From<T> for OscillatorType
where
    T: Into<usize>,
{
    fn from(value: T) -> Self {
        match value.into() {
            1 => OscillatorType::DualSaw,
            2 => OscillatorType::MultiSaw,
            3 => OscillatorType::FullSquare,
            4 => OscillatorType::DualSquare,
            5 => OscillatorType::MultiSquare,
            6 => OscillatorType::PwmSquare,
            7 => OscillatorType::FullPulse,
            _ => OscillatorType::FullSaw,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum LfoWaveform {
    #[default]
    SawTriangle,
    SampleAndHold,
    Noise,
}

impl LfoWaveform {
    pub const COUNT: usize = 3;

    pub fn name(self) -> &'static str {
        match self {
            LfoWaveform::SawTriangle => "sawTri",
            LfoWaveform::SampleAndHold => "s&h",
            LfoWaveform::Noise => "noise",
        }
    }
}

impl<T> From<T> for LfoWaveform
where
    T: Into<usize>,
{
    fn from(value: T) -> Self {
        match value.into() {
            1 => LfoWaveform::SampleAndHold,
            2 => LfoWaveform::Noise,
            _ => LfoWaveform::SawTriangle,
        }
    }
}

/// Enable/amount/pattern triple shared by the ratio-add, ratio-mul and
/// partial-beating stages.
#[derive(Debug)]
pub struct PatternedParams {
    pub enable: BoolParam,
    pub amount: FloatParam,
    pub pattern: IntParam,
}

#[derive(Debug)]
pub struct OscillatorParams {
    pub kind: EnumParam,
    pub num_partials: IntParam,
    pub number: IntParam,
    pub transpose: FloatParam,
    pub fundamental: FloatParam,
    pub beating: FloatParam,
    pub pulse_width: FloatParam,
}

#[derive(Debug)]
pub struct DispersionParams {
    pub enable: BoolParam,
    pub amount: FloatParam,
    pub key: FloatParam,
    pub shape: FloatParam,
}

#[derive(Debug)]
pub struct OscPhaseParams {
    pub enable: BoolParam,
    pub random: FloatParam,
    pub pattern: IntParam,
    pub symmetry: FloatParam,
}

/// Brightness filter controls. The stage itself is a declared no-op for now,
/// the parameters exist so patches and modulation links referencing them
/// stay valid.
#[derive(Debug)]
pub struct FilterParams {
    pub enable: BoolParam,
    pub brightness: FloatParam,
    pub key: FloatParam,
    pub floor: FloatParam,
}

#[derive(Debug)]
pub struct PeriodFilterParams {
    pub enable: BoolParam,
    pub stretch: BoolParam,
    pub blocks: BoolParam,
    pub apply: FloatParam,
    pub peak: FloatParam,
    pub cycle: FloatParam,
    pub phase_shift: FloatParam,
    pub pinch: FloatParam,
}

#[derive(Debug)]
pub struct LfoParams {
    pub name: &'static str,
    pub bpm_sync: BoolParam,
    pub snap: BoolParam,
    pub restart: BoolParam,
    pub waveform: EnumParam,
    pub rate: FloatParam,
    /// 0.5x / 1x / 2x rate multiplier.
    pub times: IntParam,
    /// Triplet (2/3x) / straight / dotted (3/2x) rate multiplier.
    pub dot_trip: IntParam,
    pub shape: FloatParam,
}

impl LfoParams {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            bpm_sync: BoolParam::new("bpm", false),
            snap: BoolParam::new("snap", false),
            restart: BoolParam::new("restart", false),
            waveform: EnumParam::new("type", 0, LfoWaveform::COUNT as i32),
            rate: FloatParam::new("rate", 0.0, 1.0, 0.005, 0.5, 10),
            times: IntParam::new("times", 0, 2, 1, 1),
            dot_trip: IntParam::new("dotTrip", 0, 2, 1, 1),
            shape: FloatParam::new("shape", 0.0, 1.0, 0.01, 0.5, 10),
        }
    }
}

#[derive(Debug)]
pub struct EnvParams {
    pub name: &'static str,
    pub invert: BoolParam,
    pub attack: FloatParam,
    pub peak: FloatParam,
    pub release: FloatParam,
}

impl EnvParams {
    /// Segment times below this threshold collapse instantly.
    pub const MIN_SEG_TIME: f32 = 1.0 / 1000.0;

    fn new(name: &'static str) -> Self {
        Self {
            name,
            invert: BoolParam::new("invert", false),
            attack: FloatParam::new("attack", 0.0, 1.0, 0.005, 0.5, 20),
            peak: FloatParam::new("peak", 0.0, 1.0, 0.01, 1.0, 10),
            release: FloatParam::new("release", 0.0, 1.0, 0.005, 0.5, 20),
        }
    }
}

#[derive(Debug)]
pub struct SynthParams {
    pub bpm: u32,
    pub oscillator: OscillatorParams,
    pub ratio_add: PatternedParams,
    pub ratio_mul: PatternedParams,
    pub partial_beating: PatternedParams,
    pub dispersion: DispersionParams,
    pub osc_phase: OscPhaseParams,
    pub filter: FilterParams,
    pub period_filter: PeriodFilterParams,
    pub lfo1: LfoParams,
    pub lfo2: LfoParams,
    pub lfo3: LfoParams,
    pub lfo4: LfoParams,
    pub amp_env: EnvParams,
    pub env1: EnvParams,
    pub env2: EnvParams,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            bpm: 120,
            oscillator: OscillatorParams {
                kind: EnumParam::new("type", 0, OscillatorType::COUNT as i32),
                num_partials: IntParam::new("numPartials", 2, 256, 256, 8),
                number: IntParam::new("number", 2, 6, 2, 1),
                transpose: FloatParam::new("transpose", -24.0, 24.0, 0.01, 0.0, 25),
                fundamental: FloatParam::new("fundamental", 0.0, 1.0, 0.01, 1.0, 10),
                beating: FloatParam::new("beating", 0.0, 16.0, 0.01, 0.0, 25),
                pulse_width: FloatParam::new("pulseWidth", 0.0, 1.0, 0.01, 1.0, 10),
            },
            ratio_add: PatternedParams {
                enable: BoolParam::new("enable", false),
                amount: FloatParam::new("amount", 0.0, 16.0, 0.01, 0.0, 10),
                pattern: IntParam::new("pattern", 2, 64, 2, 5),
            },
            ratio_mul: PatternedParams {
                enable: BoolParam::new("enable", false),
                // Negative amounts turn into reciprocal multipliers, see
                // ratio_mul_amount().
                amount: FloatParam::new("amount", -4.0, 5.0, 0.5, 1.0, 10),
                pattern: IntParam::new("pattern", 2, 64, 2, 5),
            },
            partial_beating: PatternedParams {
                enable: BoolParam::new("enable", false),
                amount: FloatParam::new("amount", 0.0, 16.0, 0.01, 0.0, 10),
                pattern: IntParam::new("pattern", 2, 64, 2, 10),
            },
            dispersion: DispersionParams {
                enable: BoolParam::new("enable", false),
                amount: FloatParam::new("amount", -1.0, 1.0, 0.01, 0.0, 10),
                key: FloatParam::new("key", 0.0, 1.0, 0.01, 1.0, 10),
                shape: FloatParam::new("shape", -1.0, 1.0, 0.01, 0.0, 10),
            },
            osc_phase: OscPhaseParams {
                enable: BoolParam::new("enable", false),
                random: FloatParam::new("random", 0.0, 1.0, 0.01, 0.0, 10),
                pattern: IntParam::new("pattern", 2, 64, 2, 10),
                symmetry: FloatParam::new("symmetry", 0.0, 1.0, 0.01, 0.5, 10),
            },
            filter: FilterParams {
                enable: BoolParam::new("enable", false),
                brightness: FloatParam::new("brightness", 0.0, 1.0, 0.01, 1.0, 10),
                key: FloatParam::new("key", 0.0, 1.0, 0.01, 1.0, 10),
                floor: FloatParam::new("floor", 0.0, 1.0, 0.01, 1.0, 10),
            },
            period_filter: PeriodFilterParams {
                enable: BoolParam::new("enable", false),
                stretch: BoolParam::new("stretch", true),
                blocks: BoolParam::new("blocks", false),
                apply: FloatParam::new("apply", 0.0, 1.0, 0.01, 1.0, 10),
                peak: FloatParam::new("peak", 0.0, 1.0, 0.01, 0.0, 10),
                cycle: FloatParam::new("cycle", 0.0, 162.0, 0.01, 6.0, 25),
                phase_shift: FloatParam::new("phaseShift", 0.0, 1.0, 0.01, 0.0, 10),
                pinch: FloatParam::new("pinch", -1.0, 1.0, 0.01, 0.0, 10),
            },
            lfo1: LfoParams::new("lfo1"),
            lfo2: LfoParams::new("lfo2"),
            lfo3: LfoParams::new("lfo3"),
            lfo4: LfoParams::new("lfo4"),
            amp_env: EnvParams::new("ampEnv"),
            env1: EnvParams::new("env1"),
            env2: EnvParams::new("env2"),
        }
    }
}

impl SynthParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Float parameter behind a modulation target id.
    pub fn float_param(&self, target: ModTarget) -> &FloatParam {
        use ModTarget::*;

        match target {
            RatioAddAmount => &self.ratio_add.amount,
            RatioMulAmount => &self.ratio_mul.amount,
            PartialBeatingAmount => &self.partial_beating.amount,
            DispersionAmount => &self.dispersion.amount,
            DispersionKey => &self.dispersion.key,
            DispersionShape => &self.dispersion.shape,
            OscTranspose => &self.oscillator.transpose,
            OscFundamental => &self.oscillator.fundamental,
            OscBeating => &self.oscillator.beating,
            OscPulseWidth => &self.oscillator.pulse_width,
            PhaseRandom => &self.osc_phase.random,
            PhaseSymmetry => &self.osc_phase.symmetry,
            FilterBrightness => &self.filter.brightness,
            FilterKey => &self.filter.key,
            FilterFloor => &self.filter.floor,
            PeriodApply => &self.period_filter.apply,
            PeriodPeak => &self.period_filter.peak,
            PeriodCycle => &self.period_filter.cycle,
            PeriodPhaseShift => &self.period_filter.phase_shift,
            PeriodPinch => &self.period_filter.pinch,
            Lfo1Rate => &self.lfo1.rate,
            Lfo1Shape => &self.lfo1.shape,
            Lfo2Rate => &self.lfo2.rate,
            Lfo2Shape => &self.lfo2.shape,
            Lfo3Rate => &self.lfo3.rate,
            Lfo3Shape => &self.lfo3.shape,
            Lfo4Rate => &self.lfo4.rate,
            Lfo4Shape => &self.lfo4.shape,
            AmpEnvAttack => &self.amp_env.attack,
            AmpEnvPeak => &self.amp_env.peak,
            AmpEnvRelease => &self.amp_env.release,
            Env1Attack => &self.env1.attack,
            Env1Peak => &self.env1.peak,
            Env1Release => &self.env1.release,
            Env2Attack => &self.env2.attack,
            Env2Peak => &self.env2.peak,
            Env2Release => &self.env2.release,
        }
    }

    pub fn float_param_mut(&mut self, target: ModTarget) -> &mut FloatParam {
        use ModTarget::*;

        match target {
            RatioAddAmount => &mut self.ratio_add.amount,
            RatioMulAmount => &mut self.ratio_mul.amount,
            PartialBeatingAmount => &mut self.partial_beating.amount,
            DispersionAmount => &mut self.dispersion.amount,
            DispersionKey => &mut self.dispersion.key,
            DispersionShape => &mut self.dispersion.shape,
            OscTranspose => &mut self.oscillator.transpose,
            OscFundamental => &mut self.oscillator.fundamental,
            OscBeating => &mut self.oscillator.beating,
            OscPulseWidth => &mut self.oscillator.pulse_width,
            PhaseRandom => &mut self.osc_phase.random,
            PhaseSymmetry => &mut self.osc_phase.symmetry,
            FilterBrightness => &mut self.filter.brightness,
            FilterKey => &mut self.filter.key,
            FilterFloor => &mut self.filter.floor,
            PeriodApply => &mut self.period_filter.apply,
            PeriodPeak => &mut self.period_filter.peak,
            PeriodCycle => &mut self.period_filter.cycle,
            PeriodPhaseShift => &mut self.period_filter.phase_shift,
            PeriodPinch => &mut self.period_filter.pinch,
            Lfo1Rate => &mut self.lfo1.rate,
            Lfo1Shape => &mut self.lfo1.shape,
            Lfo2Rate => &mut self.lfo2.rate,
            Lfo2Shape => &mut self.lfo2.shape,
            Lfo3Rate => &mut self.lfo3.rate,
            Lfo3Shape => &mut self.lfo3.shape,
            Lfo4Rate => &mut self.lfo4.rate,
            Lfo4Shape => &mut self.lfo4.shape,
            AmpEnvAttack => &mut self.amp_env.attack,
            AmpEnvPeak => &mut self.amp_env.peak,
            AmpEnvRelease => &mut self.amp_env.release,
            Env1Attack => &mut self.env1.attack,
            Env1Peak => &mut self.env1.peak,
            Env1Release => &mut self.env1.release,
            Env2Attack => &mut self.env2.attack,
            Env2Peak => &mut self.env2.peak,
            Env2Release => &mut self.env2.release,
        }
    }
}

/// LFO rate in Hz for a raw 0..1 rate value.
///
/// Either BPM-synced over power-of-two note divisions (optionally snapped to
/// the division grid) or an exponential free-running mapping up to 8 Hz, then
/// scaled by the `times` and `dot_trip` multipliers.
pub fn lfo_frequency(bpm: u32, lfo: &LfoParams, rate: f32) -> f32 {
    let mut freq = if lfo.bpm_sync.get() {
        let mut division = rate * 4.0; // 2^0 .. 2^4
        if lfo.snap.get() {
            division = division.round();
        }
        60.0 / bpm.max(1) as f32 * division.exp2()
    } else {
        const ALPHA: f32 = 2.2;
        let bend = (ALPHA * rate).exp() - 1.0;
        let f = bend / (ALPHA.exp() - 1.0) * 8.0;
        (f * 100.0).round() / 100.0
    };

    freq *= match lfo.times.get() {
        0 => 0.5,
        2 => 2.0,
        _ => 1.0,
    };
    freq *= match lfo.dot_trip.get() {
        0 => 2.0 / 3.0,
        2 => 3.0 / 2.0,
        _ => 1.0,
    };

    freq
}

/// Exponential mapping of a raw 0..1 envelope time value to seconds
/// (up to 10 s).
pub fn env_segment_time(val01: f32) -> f32 {
    const ALPHA: f32 = 4.4;
    let bend = (ALPHA * val01).exp() - 1.0;
    bend / (ALPHA.exp() - 1.0) * 10.0
}

/// Converts the raw ratio-mul amount: values below 0.4 fold into reciprocal
/// multipliers so the left half of the range divides instead of multiplies.
pub fn ratio_mul_amount(mut amount: f32) -> f32 {
    if amount < 0.4 {
        amount -= 1.0;
        amount = -amount;
        amount = 1.0 / amount;
    }
    amount
}

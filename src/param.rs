//! Quantized parameter descriptors.
//!
//! Every user-facing parameter carries its identity (name, range, step,
//! default) next to its current value. Float parameters store the value as a
//! fixed-point integer so repeated encoder steps stay exact, and carry a
//! transient modulation offset written by the modulation bank each control
//! tick.

/// Float parameter with fixed-point storage and a modulation overlay.
#[derive(Debug)]
pub struct FloatParam {
    name: &'static str,
    min: i32,
    max: i32,
    step: i32,
    default: i32,
    value: i32,
    alt_mul: i32,
    modulation: f32,
}

impl FloatParam {
    /// Fixed-point scale factor of the stored value.
    const SCALE: f32 = 10_000.0;

    pub fn new(
        name: &'static str,
        min: f32,
        max: f32,
        step: f32,
        default: f32,
        alt_mul: i32,
    ) -> Self {
        Self {
            name,
            min: (min * Self::SCALE) as i32,
            max: (max * Self::SCALE) as i32,
            step: (step * Self::SCALE) as i32,
            default: (default * Self::SCALE) as i32,
            value: (default * Self::SCALE) as i32,
            alt_mul,
            modulation: 0.0,
        }
    }

    /// Steps the value by `delta` increments, `alt_mul` times as far when the
    /// alt modifier is held. Clamps to the declared range; the intermediate is
    /// widened so no delta magnitude can overflow before the clamp.
    pub fn add(&mut self, delta: i32, alt: bool) {
        let mul = if alt { self.alt_mul } else { 1 };
        let stepped = self.value as i64 + delta as i64 * self.step as i64 * mul as i64;
        self.value = stepped.clamp(self.min as i64, self.max as i64) as i32;
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value as f32 / Self::SCALE
    }

    /// Value with the current modulation offset applied, clamped to the
    /// declared range. The only read path the audio pipeline uses for
    /// modulatable parameters.
    #[inline]
    pub fn get_with_modulation(&self) -> f32 {
        self.get_with_offset(self.modulation)
    }

    /// Like [`Self::get_with_modulation`] but with an explicit offset in
    /// -1..1 of the full range.
    #[inline]
    pub fn get_with_offset(&self, offset: f32) -> f32 {
        let mapped = (self.max - self.min) as f32 * offset + self.value as f32;
        mapped.clamp(self.min as f32, self.max as f32) / Self::SCALE
    }

    /// Stored value mapped to 0..1.
    pub fn normalized(&self) -> f32 {
        (self.value - self.min) as f32 / (self.max - self.min) as f32
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub fn modulation(&self) -> f32 {
        self.modulation
    }

    #[inline]
    pub fn set_modulation(&mut self, value: f32) {
        self.modulation = value;
    }
}

#[derive(Debug)]
pub struct IntParam {
    name: &'static str,
    min: i32,
    max: i32,
    default: i32,
    value: i32,
    alt_mul: i32,
}

impl IntParam {
    pub fn new(name: &'static str, min: i32, max: i32, default: i32, alt_mul: i32) -> Self {
        Self {
            name,
            min,
            max,
            default,
            value: default,
            alt_mul,
        }
    }

    pub fn add(&mut self, delta: i32, alt: bool) {
        let mul = if alt { self.alt_mul } else { 1 };
        let stepped = self.value as i64 + delta as i64 * mul as i64;
        self.value = stepped.clamp(self.min as i64, self.max as i64) as i32;
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }

    #[inline]
    pub fn get(&self) -> i32 {
        self.value
    }

    pub fn normalized(&self) -> f32 {
        (self.value - self.min) as f32 / (self.max - self.min) as f32
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

#[derive(Debug)]
pub struct BoolParam {
    name: &'static str,
    default: bool,
    value: bool,
}

impl BoolParam {
    pub fn new(name: &'static str, default: bool) -> Self {
        Self {
            name,
            default,
            value: default,
        }
    }

    /// A positive delta switches on, anything else switches off.
    pub fn add(&mut self, delta: i32) {
        self.value = delta > 0;
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Integer-backed selector for an enumerated choice, clamped to
/// `0..count - 1`. Conversion to the concrete enum happens at the call site
/// via its `From<usize>` impl.
#[derive(Debug)]
pub struct EnumParam {
    name: &'static str,
    count: i32,
    default: i32,
    value: i32,
}

impl EnumParam {
    pub fn new(name: &'static str, default: i32, count: i32) -> Self {
        Self {
            name,
            count,
            default,
            value: default,
        }
    }

    pub fn add(&mut self, delta: i32) {
        let stepped = self.value as i64 + delta as i64;
        self.value = stepped.clamp(0, self.count as i64 - 1) as i32;
    }

    pub fn reset(&mut self) {
        self.value = self.default;
    }

    #[inline]
    pub fn get(&self) -> i32 {
        self.value
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

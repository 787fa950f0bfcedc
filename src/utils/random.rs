//! Fast pseudo random number generator.
//!
//! Each consumer owns its own generator state so renders are reproducible
//! for a given set of seeds.

/// Linear congruential generator with the classic Numerical Recipes
/// constants.
#[derive(Debug, Clone, Copy)]
pub struct Lcg {
    state: u32,
}

impl Default for Lcg {
    fn default() -> Self {
        Self { state: 0x21 }
    }
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    #[inline]
    pub fn next_word(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
        self.state
    }

    /// Uniform float in 0..1.
    #[inline]
    pub fn next_float(&mut self) -> f32 {
        self.next_word() as f32 / 4_294_967_296.0
    }
}

//! Many-to-one modulation routing between modulator outputs and float
//! parameters.
//!
//! Sources and targets are identified by stable value-typed ids, so links
//! survive any relocation of the underlying objects. Both the link table and
//! the per-target registration records are dense fixed-capacity arrays with
//! swap-with-last removal.

use crate::params::SynthParams;

/// Maximum number of simultaneous modulation links (and of distinct
/// modulated targets).
pub const MAX_LINKS: usize = 16;

/// Modulator outputs routable into parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModSource {
    Lfo1,
    Lfo2,
    Lfo3,
    Lfo4,
    AmpEnv,
    Env1,
    Env2,
}

impl ModSource {
    pub const COUNT: usize = 7;

    pub const ALL: [ModSource; Self::COUNT] = [
        ModSource::Lfo1,
        ModSource::Lfo2,
        ModSource::Lfo3,
        ModSource::Lfo4,
        ModSource::AmpEnv,
        ModSource::Env1,
        ModSource::Env2,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn name(self) -> &'static str {
        match self {
            ModSource::Lfo1 => "lfo1",
            ModSource::Lfo2 => "lfo2",
            ModSource::Lfo3 => "lfo3",
            ModSource::Lfo4 => "lfo4",
            ModSource::AmpEnv => "ampEnv",
            ModSource::Env1 => "env1",
            ModSource::Env2 => "env2",
        }
    }
}

/// Modulatable float parameters, dispatched through
/// [`SynthParams::float_param_mut`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModTarget {
    RatioAddAmount,
    RatioMulAmount,
    PartialBeatingAmount,
    DispersionAmount,
    DispersionKey,
    DispersionShape,
    OscTranspose,
    OscFundamental,
    OscBeating,
    OscPulseWidth,
    PhaseRandom,
    PhaseSymmetry,
    FilterBrightness,
    FilterKey,
    FilterFloor,
    PeriodApply,
    PeriodPeak,
    PeriodCycle,
    PeriodPhaseShift,
    PeriodPinch,
    Lfo1Rate,
    Lfo1Shape,
    Lfo2Rate,
    Lfo2Shape,
    Lfo3Rate,
    Lfo3Shape,
    Lfo4Rate,
    Lfo4Shape,
    AmpEnvAttack,
    AmpEnvPeak,
    AmpEnvRelease,
    Env1Attack,
    Env1Peak,
    Env1Release,
    Env2Attack,
    Env2Peak,
    Env2Release,
}

/// One routing edge from a modulator to a float parameter.
#[derive(Debug, Clone, Copy)]
pub struct ModulationLink {
    pub enabled: bool,
    pub symmetric: bool,
    /// Modulation depth in -1..1 of the target's full range.
    pub amount: f32,
    pub source: ModSource,
    pub target: ModTarget,
}

impl Default for ModulationLink {
    fn default() -> Self {
        Self {
            enabled: false,
            symmetric: false,
            amount: 0.0,
            source: ModSource::Lfo1,
            target: ModTarget::OscTranspose,
        }
    }
}

impl ModulationLink {
    /// Displayed excursion of this link: symmetric links swing around the
    /// current value, asymmetric links only push upward.
    pub fn modulation_range(&self) -> (f32, f32) {
        if self.symmetric {
            (-self.amount * 0.5, self.amount * 0.5)
        } else {
            (0.0, self.amount)
        }
    }
}

/// Result of [`ModulationBank::add_link`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddedLink {
    /// Index of the link; stable until the next removal.
    pub index: usize,
    /// True when an identical (source, target) link already existed and was
    /// returned instead of a new one.
    pub existed: bool,
}

#[derive(Debug, Clone, Copy)]
struct TargetInfo {
    target: ModTarget,
    num_links: u32,
}

#[derive(Debug)]
pub struct ModulationBank {
    links: [ModulationLink; MAX_LINKS],
    num_links: usize,

    targets: [TargetInfo; MAX_LINKS],
    num_targets: usize,
}

impl Default for ModulationBank {
    fn default() -> Self {
        Self {
            links: [ModulationLink::default(); MAX_LINKS],
            num_links: 0,
            targets: [TargetInfo {
                target: ModTarget::OscTranspose,
                num_links: 0,
            }; MAX_LINKS],
            num_targets: 0,
        }
    }
}

impl ModulationBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Recomputes every registered target's modulation offset from the
    /// current modulator outputs. Must run once per control tick, before the
    /// targets are read with modulation applied.
    pub fn tick(&mut self, outputs: &[f32; ModSource::COUNT], params: &mut SynthParams) {
        for info in &self.targets[..self.num_targets] {
            params.float_param_mut(info.target).set_modulation(0.0);
        }

        for link in &self.links[..self.num_links] {
            if !link.enabled {
                continue;
            }
            let output = outputs[link.source.index()];
            let value = if link.symmetric {
                (output - 0.5) * link.amount
            } else {
                output * link.amount
            };
            let param = params.float_param_mut(link.target);
            let accumulated = param.modulation() + value;
            param.set_modulation(accumulated);
        }
    }

    /// Allocates a link. Returns `None` when the table is full. If the same
    /// (source, target) pair is already linked, the existing link is returned
    /// with `existed` set instead of duplicating it.
    pub fn add_link(&mut self, source: ModSource, target: ModTarget) -> Option<AddedLink> {
        if self.num_links >= MAX_LINKS {
            return None;
        }

        if let Some(index) = self.find_link(source, target) {
            return Some(AddedLink {
                index,
                existed: true,
            });
        }

        let index = self.num_links;
        self.links[index] = ModulationLink {
            enabled: true,
            symmetric: false,
            amount: 0.0,
            source,
            target,
        };
        self.num_links += 1;
        self.register_target(target);

        Some(AddedLink {
            index,
            existed: false,
        })
    }

    pub fn find_link(&self, source: ModSource, target: ModTarget) -> Option<usize> {
        self.links[..self.num_links]
            .iter()
            .position(|link| link.source == source && link.target == target)
    }

    pub fn link(&self, index: usize) -> &ModulationLink {
        &self.links[index]
    }

    pub fn link_mut(&mut self, index: usize) -> &mut ModulationLink {
        &mut self.links[index]
    }

    /// Live links, in table order.
    pub fn links(&self) -> &[ModulationLink] {
        &self.links[..self.num_links]
    }

    /// Fills `indices` with the links of `source`, truncating silently.
    /// Returns the number written.
    pub fn links_of_source(&self, source: ModSource, indices: &mut [usize]) -> usize {
        let mut write = 0;
        for (i, link) in self.links[..self.num_links].iter().enumerate() {
            if link.source == source {
                if write >= indices.len() {
                    break;
                }
                indices[write] = i;
                write += 1;
            }
        }
        write
    }

    /// Fills `indices` with the links targeting `target`, truncating
    /// silently. Returns the number written.
    pub fn links_of_target(&self, target: ModTarget, indices: &mut [usize]) -> usize {
        let mut write = 0;
        for (i, link) in self.links[..self.num_links].iter().enumerate() {
            if link.target == target {
                if write >= indices.len() {
                    break;
                }
                indices[write] = i;
                write += 1;
            }
        }
        write
    }

    /// Removes a link in O(1) by swapping it with the last live slot.
    /// Invalidates indices of the last link and of `index`.
    pub fn remove_link(&mut self, index: usize) {
        debug_assert!(index < self.num_links);

        let target = self.links[index].target;
        self.links.swap(index, self.num_links - 1);
        self.num_links -= 1;

        self.unregister_target(target);
    }

    pub fn remove_links_of_source(&mut self, source: ModSource) {
        let mut i = 0;
        while i < self.num_links {
            if self.links[i].source == source {
                self.remove_link(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn remove_links_of_target(&mut self, target: ModTarget) {
        let mut i = 0;
        while i < self.num_links {
            if self.links[i].target == target {
                self.remove_link(i);
            } else {
                i += 1;
            }
        }
    }

    pub fn remove_all_links(&mut self) {
        self.num_links = 0;
        self.num_targets = 0;
    }

    /// Number of links currently targeting `target`.
    pub fn target_link_count(&self, target: ModTarget) -> u32 {
        self.targets[..self.num_targets]
            .iter()
            .find(|info| info.target == target)
            .map(|info| info.num_links)
            .unwrap_or(0)
    }

    fn register_target(&mut self, target: ModTarget) {
        for info in &mut self.targets[..self.num_targets] {
            if info.target == target {
                info.num_links += 1;
                return;
            }
        }
        self.targets[self.num_targets] = TargetInfo {
            target,
            num_links: 1,
        };
        self.num_targets += 1;
    }

    fn unregister_target(&mut self, target: ModTarget) {
        for i in 0..self.num_targets {
            if self.targets[i].target == target {
                self.targets[i].num_links -= 1;
                if self.targets[i].num_links == 0 {
                    self.targets.swap(i, self.num_targets - 1);
                    self.num_targets -= 1;
                }
                return;
            }
        }
    }
}

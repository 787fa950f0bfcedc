//! Tests for the modulation bank

use lazerbass_dsp::modulation::{ModSource, ModTarget, ModulationBank, MAX_LINKS};
use lazerbass_dsp::params::SynthParams;

const TARGETS: [ModTarget; 16] = [
    ModTarget::RatioAddAmount,
    ModTarget::RatioMulAmount,
    ModTarget::PartialBeatingAmount,
    ModTarget::DispersionAmount,
    ModTarget::DispersionKey,
    ModTarget::DispersionShape,
    ModTarget::OscTranspose,
    ModTarget::OscFundamental,
    ModTarget::OscBeating,
    ModTarget::OscPulseWidth,
    ModTarget::PhaseRandom,
    ModTarget::PhaseSymmetry,
    ModTarget::PeriodApply,
    ModTarget::PeriodPeak,
    ModTarget::PeriodCycle,
    ModTarget::PeriodPinch,
];

fn outputs_with(source: ModSource, value: f32) -> [f32; ModSource::COUNT] {
    let mut outputs = [0.0; ModSource::COUNT];
    outputs[source.index()] = value;
    outputs
}

#[test]
fn add_link_deduplicates() {
    let mut bank = ModulationBank::new();

    let first = bank
        .add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    assert!(!first.existed);

    let second = bank
        .add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    assert!(second.existed);
    assert_eq!(second.index, first.index);
    assert_eq!(bank.links().len(), 1);

    // Same target from a different source is a new link.
    let third = bank
        .add_link(ModSource::Lfo2, ModTarget::OscTranspose)
        .unwrap();
    assert!(!third.existed);
    assert_eq!(bank.links().len(), 2);
}

#[test]
fn add_link_rejects_when_full() {
    let mut bank = ModulationBank::new();

    for target in TARGETS {
        assert!(bank.add_link(ModSource::Lfo1, target).is_some());
    }
    assert_eq!(bank.links().len(), MAX_LINKS);

    assert!(bank
        .add_link(ModSource::Lfo2, ModTarget::OscTranspose)
        .is_none());
}

#[test]
fn tick_applies_modulation() {
    let mut bank = ModulationBank::new();
    let mut params = SynthParams::new();

    let added = bank
        .add_link(ModSource::Lfo1, ModTarget::PeriodApply)
        .unwrap();
    bank.link_mut(added.index).amount = 0.25;

    bank.tick(&outputs_with(ModSource::Lfo1, 1.0), &mut params);
    assert_eq!(params.period_filter.apply.modulation(), 0.25);

    // A zero modulator output clears the offset again.
    bank.tick(&outputs_with(ModSource::Lfo1, 0.0), &mut params);
    assert_eq!(params.period_filter.apply.modulation(), 0.0);
}

#[test]
fn tick_accumulates_links_on_one_target() {
    let mut bank = ModulationBank::new();
    let mut params = SynthParams::new();

    let a = bank
        .add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    bank.link_mut(a.index).amount = 0.5;
    let b = bank
        .add_link(ModSource::Env1, ModTarget::OscTranspose)
        .unwrap();
    bank.link_mut(b.index).amount = 0.5;

    let mut outputs = [0.0; ModSource::COUNT];
    outputs[ModSource::Lfo1.index()] = 0.5;
    outputs[ModSource::Env1.index()] = 1.0;
    bank.tick(&outputs, &mut params);

    assert_eq!(params.oscillator.transpose.modulation(), 0.75);
}

#[test]
fn symmetric_link_is_centered() {
    let mut bank = ModulationBank::new();
    let mut params = SynthParams::new();

    let added = bank
        .add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    bank.link_mut(added.index).amount = 1.0;
    bank.link_mut(added.index).symmetric = true;

    bank.tick(&outputs_with(ModSource::Lfo1, 0.5), &mut params);
    assert_eq!(params.oscillator.transpose.modulation(), 0.0);

    bank.tick(&outputs_with(ModSource::Lfo1, 0.0), &mut params);
    assert_eq!(params.oscillator.transpose.modulation(), -0.5);
}

#[test]
fn disabled_link_contributes_nothing() {
    let mut bank = ModulationBank::new();
    let mut params = SynthParams::new();

    let added = bank
        .add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    bank.link_mut(added.index).amount = 1.0;
    bank.link_mut(added.index).enabled = false;

    bank.tick(&outputs_with(ModSource::Lfo1, 1.0), &mut params);
    assert_eq!(params.oscillator.transpose.modulation(), 0.0);
}

#[test]
fn remove_link_swaps_with_last() {
    let mut bank = ModulationBank::new();

    bank.add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    bank.add_link(ModSource::Lfo2, ModTarget::OscBeating).unwrap();
    bank.add_link(ModSource::Lfo3, ModTarget::PeriodApply)
        .unwrap();

    bank.remove_link(0);

    assert_eq!(bank.links().len(), 2);
    assert!(bank
        .find_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .is_none());
    // The last link moved into the freed slot.
    assert_eq!(bank.find_link(ModSource::Lfo3, ModTarget::PeriodApply), Some(0));
    assert_eq!(bank.find_link(ModSource::Lfo2, ModTarget::OscBeating), Some(1));
}

#[test]
fn target_link_counts_follow_removal() {
    let mut bank = ModulationBank::new();

    bank.add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    bank.add_link(ModSource::Lfo2, ModTarget::OscTranspose)
        .unwrap();
    assert_eq!(bank.target_link_count(ModTarget::OscTranspose), 2);

    bank.remove_link(0);
    assert_eq!(bank.target_link_count(ModTarget::OscTranspose), 1);

    bank.remove_link(0);
    assert_eq!(bank.target_link_count(ModTarget::OscTranspose), 0);
}

#[test]
fn remove_links_of_source() {
    let mut bank = ModulationBank::new();

    bank.add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    bank.add_link(ModSource::Lfo1, ModTarget::OscBeating).unwrap();
    bank.add_link(ModSource::Env1, ModTarget::PeriodApply)
        .unwrap();

    bank.remove_links_of_source(ModSource::Lfo1);

    assert_eq!(bank.links().len(), 1);
    assert!(bank
        .find_link(ModSource::Env1, ModTarget::PeriodApply)
        .is_some());
}

#[test]
fn remove_links_of_target() {
    let mut bank = ModulationBank::new();

    bank.add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    bank.add_link(ModSource::Lfo2, ModTarget::OscTranspose)
        .unwrap();
    bank.add_link(ModSource::Lfo1, ModTarget::OscBeating).unwrap();

    bank.remove_links_of_target(ModTarget::OscTranspose);

    assert_eq!(bank.links().len(), 1);
    assert_eq!(bank.target_link_count(ModTarget::OscTranspose), 0);
    assert_eq!(bank.target_link_count(ModTarget::OscBeating), 1);
}

#[test]
fn links_of_source_truncates_silently() {
    let mut bank = ModulationBank::new();

    bank.add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    bank.add_link(ModSource::Lfo1, ModTarget::OscBeating).unwrap();
    bank.add_link(ModSource::Lfo1, ModTarget::PeriodApply)
        .unwrap();

    let mut indices = [0; 2];
    let written = bank.links_of_source(ModSource::Lfo1, &mut indices);
    assert_eq!(written, 2);
    assert_eq!(indices, [0, 1]);

    let mut all = [0; MAX_LINKS];
    assert_eq!(bank.links_of_source(ModSource::Lfo1, &mut all), 3);
    assert_eq!(bank.links_of_target(ModTarget::OscBeating, &mut all), 1);
}

#[test]
fn remove_all_links() {
    let mut bank = ModulationBank::new();

    bank.add_link(ModSource::Lfo1, ModTarget::OscTranspose)
        .unwrap();
    bank.add_link(ModSource::Env1, ModTarget::PeriodApply)
        .unwrap();

    bank.remove_all_links();

    assert!(bank.links().is_empty());
    assert_eq!(bank.target_link_count(ModTarget::OscTranspose), 0);
}

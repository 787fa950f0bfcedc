//! Renders a short phrase to a WAV file.

use hound::{SampleFormat, WavSpec, WavWriter};
use simple_logger::SimpleLogger;

use lazerbass_dsp::engine::Lazerbass;
use lazerbass_dsp::modulation::{ModSource, ModTarget};
use lazerbass_dsp::StereoSample;

const SAMPLE_RATE: u32 = 48000;
const UPDATE_RATE: u32 = 1000;
const BLOCK_SIZE: usize = 32;

fn main() {
    SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init()
        .unwrap();

    let mut synth = Lazerbass::new();
    synth.init(SAMPLE_RATE, UPDATE_RATE);

    // A slightly dispersed dual saw with an LFO wobbling the period filter.
    let params = synth.params_mut();
    params.oscillator.kind.add(1);
    params.oscillator.beating.add(150, false);
    params.dispersion.enable.add(1);
    params.dispersion.amount.add(10, false);
    params.period_filter.enable.add(1);
    params.period_filter.peak.add(40, false);

    let added = synth
        .modulation_bank_mut()
        .add_link(ModSource::Lfo1, ModTarget::PeriodCycle)
        .expect("link table full");
    synth.modulation_bank_mut().link_mut(added.index).amount = 0.1;

    let spec = WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create("lazerbass.wav", spec).unwrap();

    let mut block = [StereoSample::default(); BLOCK_SIZE];
    for (step, note) in [36, 39, 43, 36].into_iter().enumerate() {
        log::info!("step {step}: note {note}");
        synth.note_on(note, 0.8);

        let blocks = SAMPLE_RATE as usize / 2 / BLOCK_SIZE;
        for _ in 0..blocks {
            synth.process(&mut block);
            for frame in &block {
                writer.write_sample(frame.left).unwrap();
                writer.write_sample(frame.right).unwrap();
            }
        }

        synth.note_off(note, 0.0);
    }

    writer.finalize().unwrap();
    log::info!("wrote lazerbass.wav");
}

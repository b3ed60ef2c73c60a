//! Resolved voice parameters.
//!
//! A `VoiceParams` is the flattened result for one sample of one note:
//! the accumulated generator set, modulator contributions at note-on, and
//! the derived values a playback engine needs in physical units.

use alloc::vec::Vec;
use hb_ir::{GeneratorId, GeneratorSet, LoopMode, SampleHeader};

use crate::modulation::{LiveModulation, ModulationDeltas};
use crate::units::{
    absolute_cents_to_hz, attenuation_to_gain, centibels_to_db, cents_to_ratio,
    key_scaled_timecents, timecents_to_seconds,
};

/// Frames covered by one coarse address offset unit.
pub const COARSE_OFFSET_FRAMES: i64 = 32768;

/// Which graph nodes produced a voice.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct VoiceSource {
    pub preset: usize,
    pub preset_zone: usize,
    pub instrument: usize,
    pub instrument_zone: usize,
    pub sample: usize,
}

/// Absolute frame positions in the sample pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SampleAddresses {
    pub start: u32,
    pub end: u32,
    pub loop_start: u32,
    pub loop_end: u32,
}

impl SampleAddresses {
    /// Apply the fine and coarse offset generators to a header, keeping
    /// every position inside the sample and the loop inside start..end.
    pub fn from_header(header: &SampleHeader, generators: &GeneratorSet) -> Self {
        let offset = |fine: GeneratorId, coarse: GeneratorId| {
            generators.get(fine) as i64 + generators.get(coarse) as i64 * COARSE_OFFSET_FRAMES
        };
        let lo = header.start as i64;
        let hi = (header.end as i64).max(lo);

        let start = (lo
            + offset(GeneratorId::StartAddrsOffset, GeneratorId::StartAddrsCoarseOffset))
        .clamp(lo, hi);
        let end = (hi + offset(GeneratorId::EndAddrsOffset, GeneratorId::EndAddrsCoarseOffset))
            .clamp(start, hi);
        let loop_start = (header.loop_start as i64
            + offset(GeneratorId::StartloopAddrsOffset, GeneratorId::StartloopAddrsCoarseOffset))
        .clamp(start, end);
        let loop_end = (header.loop_end as i64
            + offset(GeneratorId::EndloopAddrsOffset, GeneratorId::EndloopAddrsCoarseOffset))
        .clamp(loop_start, end);

        Self {
            start: start as u32,
            end: end as u32,
            loop_start: loop_start as u32,
            loop_end: loop_end as u32,
        }
    }
}

/// DAHDSR envelope in seconds; `sustain` is a 0..1 level.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Envelope {
    pub delay: f32,
    pub attack: f32,
    pub hold: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
}

/// LFO delay in seconds and frequency in Hz.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Lfo {
    pub delay: f32,
    pub frequency: f32,
}

/// Everything the playback engine needs to start one voice.
#[derive(Clone, Debug, PartialEq)]
pub struct VoiceParams {
    pub source: VoiceSource,
    /// Effective key (after a `keynum` override)
    pub key: u8,
    /// Effective velocity (after a `velocity` override)
    pub velocity: u8,
    /// Key the sample plays back unshifted at
    pub root_key: u8,
    pub sample_rate: u32,
    /// Sample pitch correction in cents
    pub pitch_correction: i8,
    pub addresses: SampleAddresses,
    /// Accumulated generators, clamped, without modulation
    pub generators: GeneratorSet,
    /// Modulator contributions at note-on
    pub modulation: ModulationDeltas,
    /// Modulators following live controllers
    pub live: Vec<LiveModulation>,
}

impl VoiceParams {
    pub fn new(
        source: VoiceSource,
        key: u8,
        velocity: u8,
        header: &SampleHeader,
        generators: GeneratorSet,
        modulation: ModulationDeltas,
        live: Vec<LiveModulation>,
    ) -> Self {
        Self {
            source,
            key: effective_key(&generators, key),
            velocity: effective_velocity(&generators, velocity),
            root_key: root_key(&generators, header),
            sample_rate: header.sample_rate,
            pitch_correction: header.pitch_correction,
            addresses: SampleAddresses::from_header(header, &generators),
            generators,
            modulation,
            live,
        }
    }

    /// Generator value plus modulation, clamped to the slot's range.
    pub fn value(&self, id: GeneratorId) -> f32 {
        let (min, max) = id.range();
        (self.generators.get(id) as f32 + self.modulation.get(id)).clamp(min as f32, max as f32)
    }

    pub fn loop_mode(&self) -> LoopMode {
        LoopMode::from_sample_modes(self.generators.get(GeneratorId::SampleModes))
    }

    /// Pitch shift relative to the recorded sample, in cents.
    pub fn pitch_cents(&self) -> f32 {
        let keys = self.key as f32 - self.root_key as f32;
        keys * self.value(GeneratorId::ScaleTuning)
            + self.value(GeneratorId::CoarseTune) * 100.0
            + self.value(GeneratorId::FineTune)
            + self.pitch_correction as f32
            + self.value(GeneratorId::InitialPitch)
    }

    /// Playback rate relative to the output rate.
    pub fn pitch_ratio(&self, output_rate: u32) -> f32 {
        if output_rate == 0 {
            return 0.0;
        }
        cents_to_ratio(self.pitch_cents()) * self.sample_rate as f32 / output_rate as f32
    }

    /// Pan from -0.5 (left) to 0.5 (right).
    pub fn pan(&self) -> f32 {
        self.value(GeneratorId::Pan) / 1000.0
    }

    pub fn attenuation_db(&self) -> f32 {
        centibels_to_db(self.value(GeneratorId::InitialAttenuation))
    }

    pub fn filter_cutoff_hz(&self) -> f32 {
        absolute_cents_to_hz(self.value(GeneratorId::InitialFilterFc))
    }

    pub fn filter_resonance_db(&self) -> f32 {
        centibels_to_db(self.value(GeneratorId::InitialFilterQ))
    }

    pub fn volume_envelope(&self) -> Envelope {
        Envelope {
            delay: self.seconds(GeneratorId::DelayVolEnv),
            attack: self.seconds(GeneratorId::AttackVolEnv),
            hold: self.key_scaled_seconds(GeneratorId::HoldVolEnv, GeneratorId::KeynumToVolEnvHold),
            decay: self
                .key_scaled_seconds(GeneratorId::DecayVolEnv, GeneratorId::KeynumToVolEnvDecay),
            // centibels of attenuation below peak
            sustain: attenuation_to_gain(self.value(GeneratorId::SustainVolEnv)),
            release: self.seconds(GeneratorId::ReleaseVolEnv),
        }
    }

    pub fn modulation_envelope(&self) -> Envelope {
        Envelope {
            delay: self.seconds(GeneratorId::DelayModEnv),
            attack: self.seconds(GeneratorId::AttackModEnv),
            hold: self.key_scaled_seconds(GeneratorId::HoldModEnv, GeneratorId::KeynumToModEnvHold),
            decay: self
                .key_scaled_seconds(GeneratorId::DecayModEnv, GeneratorId::KeynumToModEnvDecay),
            // 0.1% units of decrease from peak
            sustain: 1.0 - self.value(GeneratorId::SustainModEnv) / 1000.0,
            release: self.seconds(GeneratorId::ReleaseModEnv),
        }
    }

    pub fn modulation_lfo(&self) -> Lfo {
        Lfo {
            delay: self.seconds(GeneratorId::DelayModLfo),
            frequency: absolute_cents_to_hz(self.value(GeneratorId::FreqModLfo)),
        }
    }

    pub fn vibrato_lfo(&self) -> Lfo {
        Lfo {
            delay: self.seconds(GeneratorId::DelayVibLfo),
            frequency: absolute_cents_to_hz(self.value(GeneratorId::FreqVibLfo)),
        }
    }

    /// Reverb send, 0..1.
    pub fn reverb_send(&self) -> f32 {
        self.value(GeneratorId::ReverbEffectsSend) / 1000.0
    }

    /// Chorus send, 0..1.
    pub fn chorus_send(&self) -> f32 {
        self.value(GeneratorId::ChorusEffectsSend) / 1000.0
    }

    /// Voices sharing a non-zero class cut each other off.
    pub fn exclusive_class(&self) -> u8 {
        self.generators.get(GeneratorId::ExclusiveClass).clamp(0, 127) as u8
    }

    fn seconds(&self, id: GeneratorId) -> f32 {
        timecents_to_seconds(self.value(id))
    }

    fn key_scaled_seconds(&self, time: GeneratorId, per_key: GeneratorId) -> f32 {
        timecents_to_seconds(key_scaled_timecents(self.value(time), self.value(per_key), self.key))
    }
}

fn midi_override(value: i32, fallback: u8) -> u8 {
    if (0..=127).contains(&value) {
        value as u8
    } else {
        fallback
    }
}

fn effective_key(generators: &GeneratorSet, key: u8) -> u8 {
    midi_override(generators.get(GeneratorId::Keynum), key)
}

fn effective_velocity(generators: &GeneratorSet, velocity: u8) -> u8 {
    midi_override(generators.get(GeneratorId::Velocity), velocity)
}

fn root_key(generators: &GeneratorSet, header: &SampleHeader) -> u8 {
    midi_override(generators.get(GeneratorId::OverridingRootKey), header.root_key())
}

//! Generator table: every synthesis parameter slot a zone can override.
//!
//! Slot ids follow the SoundFont 2.04 generator enumeration. Structural
//! records (`instrument`, `keyRange`, `velRange`, `sampleID`) are not
//! slots; `ZoneBuilder` turns them into zone fields instead.

/// Number of generator slots in the table.
pub const SLOT_COUNT: usize = 49;

/// Raw SoundFont ids of structural generator records.
pub const RAW_INSTRUMENT: u16 = 41;
pub const RAW_KEY_RANGE: u16 = 43;
pub const RAW_VEL_RANGE: u16 = 44;
pub const RAW_SAMPLE_ID: u16 = 53;

/// A synthesis parameter slot.
///
/// Discriminants are dense table indices; use [`GeneratorId::raw`] for the
/// SoundFont id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum GeneratorId {
    StartAddrsOffset = 0,
    EndAddrsOffset,
    StartloopAddrsOffset,
    EndloopAddrsOffset,
    StartAddrsCoarseOffset,
    ModLfoToPitch,
    VibLfoToPitch,
    ModEnvToPitch,
    InitialFilterFc,
    InitialFilterQ,
    ModLfoToFilterFc,
    ModEnvToFilterFc,
    EndAddrsCoarseOffset,
    ModLfoToVolume,
    ChorusEffectsSend,
    ReverbEffectsSend,
    Pan,
    DelayModLfo,
    FreqModLfo,
    DelayVibLfo,
    FreqVibLfo,
    DelayModEnv,
    AttackModEnv,
    HoldModEnv,
    DecayModEnv,
    SustainModEnv,
    ReleaseModEnv,
    KeynumToModEnvHold,
    KeynumToModEnvDecay,
    DelayVolEnv,
    AttackVolEnv,
    HoldVolEnv,
    DecayVolEnv,
    SustainVolEnv,
    ReleaseVolEnv,
    KeynumToVolEnvHold,
    KeynumToVolEnvDecay,
    StartloopAddrsCoarseOffset,
    Keynum,
    Velocity,
    InitialAttenuation,
    EndloopAddrsCoarseOffset,
    CoarseTune,
    FineTune,
    SampleModes,
    ScaleTuning,
    ExclusiveClass,
    OverridingRootKey,
    /// Modulation-only pitch offset (pitch wheel target).
    InitialPitch,
}

/// Unit of a generator amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit {
    /// Sample frames
    Samples,
    /// Multiples of 32768 sample frames
    CoarseSamples,
    /// Relative pitch in cents
    Cents,
    /// Absolute pitch: 8.176 Hz * 2^(cents/1200)
    AbsoluteCents,
    /// Time: 2^(tc/1200) seconds
    Timecents,
    /// Timecents added per key below/above 60
    TimecentsPerKey,
    /// Attenuation in 0.1 dB
    Centibels,
    /// 0.1 % steps
    PerMille,
    /// Whole semitones
    Semitones,
    /// Cents of pitch per key
    CentsPerKey,
    /// Bit flags
    Flags,
    /// MIDI key or velocity number (-1 = unset)
    MidiNumber,
    /// Plain integer
    Integer,
}

/// How preset-level and instrument-level values combine for a slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Semantics {
    /// Preset level offsets the instrument level.
    Additive,
    /// Instrument level only; preset-level values are ignored.
    Absolute,
}

/// Static description of a generator slot.
#[derive(Clone, Copy, Debug)]
pub struct GeneratorInfo {
    pub id: GeneratorId,
    /// SoundFont generator id
    pub raw: u16,
    pub name: &'static str,
    pub default: i32,
    pub min: i32,
    pub max: i32,
    pub unit: Unit,
    pub semantics: Semantics,
    /// Whether zone generator lists may set this slot.
    pub settable: bool,
}

const fn info(
    id: GeneratorId,
    raw: u16,
    name: &'static str,
    default: i32,
    min: i32,
    max: i32,
    unit: Unit,
    semantics: Semantics,
) -> GeneratorInfo {
    GeneratorInfo { id, raw, name, default, min, max, unit, semantics, settable: true }
}

/// Sample address offset: any i16, instrument-level only.
const fn address(id: GeneratorId, raw: u16, name: &'static str, unit: Unit) -> GeneratorInfo {
    info(id, raw, name, 0, i16::MIN as i32, i16::MAX as i32, unit, Semantics::Absolute)
}

/// Envelope hold/decay scaling per key.
const fn key_scaling(id: GeneratorId, raw: u16, name: &'static str) -> GeneratorInfo {
    info(id, raw, name, 0, -1200, 1200, Unit::TimecentsPerKey, Semantics::Additive)
}

use GeneratorId as G;
use Semantics::{Absolute, Additive};
use Unit::*;

/// The generator table, indexed by `GeneratorId as usize`.
pub static GENERATORS: [GeneratorInfo; SLOT_COUNT] = [
    address(G::StartAddrsOffset, 0, "startAddrsOffset", Samples),
    address(G::EndAddrsOffset, 1, "endAddrsOffset", Samples),
    address(G::StartloopAddrsOffset, 2, "startloopAddrsOffset", Samples),
    address(G::EndloopAddrsOffset, 3, "endloopAddrsOffset", Samples),
    address(G::StartAddrsCoarseOffset, 4, "startAddrsCoarseOffset", CoarseSamples),
    info(G::ModLfoToPitch, 5, "modLfoToPitch", 0, -12000, 12000, Cents, Additive),
    info(G::VibLfoToPitch, 6, "vibLfoToPitch", 0, -12000, 12000, Cents, Additive),
    info(G::ModEnvToPitch, 7, "modEnvToPitch", 0, -12000, 12000, Cents, Additive),
    info(G::InitialFilterFc, 8, "initialFilterFc", 13500, 1500, 13500, AbsoluteCents, Additive),
    info(G::InitialFilterQ, 9, "initialFilterQ", 0, 0, 960, Centibels, Additive),
    info(G::ModLfoToFilterFc, 10, "modLfoToFilterFc", 0, -12000, 12000, Cents, Additive),
    info(G::ModEnvToFilterFc, 11, "modEnvToFilterFc", 0, -12000, 12000, Cents, Additive),
    address(G::EndAddrsCoarseOffset, 12, "endAddrsCoarseOffset", CoarseSamples),
    info(G::ModLfoToVolume, 13, "modLfoToVolume", 0, -960, 960, Centibels, Additive),
    info(G::ChorusEffectsSend, 15, "chorusEffectsSend", 0, 0, 1000, PerMille, Additive),
    info(G::ReverbEffectsSend, 16, "reverbEffectsSend", 0, 0, 1000, PerMille, Additive),
    info(G::Pan, 17, "pan", 0, -500, 500, PerMille, Additive),
    info(G::DelayModLfo, 21, "delayModLFO", -12000, -12000, 5000, Timecents, Additive),
    info(G::FreqModLfo, 22, "freqModLFO", 0, -16000, 4500, AbsoluteCents, Additive),
    info(G::DelayVibLfo, 23, "delayVibLFO", -12000, -12000, 5000, Timecents, Additive),
    info(G::FreqVibLfo, 24, "freqVibLFO", 0, -16000, 4500, AbsoluteCents, Additive),
    info(G::DelayModEnv, 25, "delayModEnv", -12000, -12000, 5000, Timecents, Additive),
    info(G::AttackModEnv, 26, "attackModEnv", -12000, -12000, 8000, Timecents, Additive),
    info(G::HoldModEnv, 27, "holdModEnv", -12000, -12000, 5000, Timecents, Additive),
    info(G::DecayModEnv, 28, "decayModEnv", -12000, -12000, 8000, Timecents, Additive),
    info(G::SustainModEnv, 29, "sustainModEnv", 0, 0, 1000, PerMille, Additive),
    info(G::ReleaseModEnv, 30, "releaseModEnv", -12000, -12000, 8000, Timecents, Additive),
    key_scaling(G::KeynumToModEnvHold, 31, "keynumToModEnvHold"),
    key_scaling(G::KeynumToModEnvDecay, 32, "keynumToModEnvDecay"),
    info(G::DelayVolEnv, 33, "delayVolEnv", -12000, -12000, 5000, Timecents, Additive),
    info(G::AttackVolEnv, 34, "attackVolEnv", -12000, -12000, 8000, Timecents, Additive),
    info(G::HoldVolEnv, 35, "holdVolEnv", -12000, -12000, 5000, Timecents, Additive),
    info(G::DecayVolEnv, 36, "decayVolEnv", -12000, -12000, 8000, Timecents, Additive),
    info(G::SustainVolEnv, 37, "sustainVolEnv", 0, 0, 1440, Centibels, Additive),
    info(G::ReleaseVolEnv, 38, "releaseVolEnv", -12000, -12000, 8000, Timecents, Additive),
    key_scaling(G::KeynumToVolEnvHold, 39, "keynumToVolEnvHold"),
    key_scaling(G::KeynumToVolEnvDecay, 40, "keynumToVolEnvDecay"),
    address(G::StartloopAddrsCoarseOffset, 45, "startloopAddrsCoarseOffset", CoarseSamples),
    info(G::Keynum, 46, "keynum", -1, -1, 127, MidiNumber, Absolute),
    info(G::Velocity, 47, "velocity", -1, -1, 127, MidiNumber, Absolute),
    info(G::InitialAttenuation, 48, "initialAttenuation", 0, 0, 1440, Centibels, Additive),
    address(G::EndloopAddrsCoarseOffset, 50, "endloopAddrsCoarseOffset", CoarseSamples),
    info(G::CoarseTune, 51, "coarseTune", 0, -120, 120, Semitones, Additive),
    info(G::FineTune, 52, "fineTune", 0, -99, 99, Cents, Additive),
    info(G::SampleModes, 54, "sampleModes", 0, 0, 3, Flags, Absolute),
    info(G::ScaleTuning, 56, "scaleTuning", 100, 0, 1200, CentsPerKey, Additive),
    info(G::ExclusiveClass, 57, "exclusiveClass", 0, 0, 127, Integer, Absolute),
    info(G::OverridingRootKey, 58, "overridingRootKey", -1, -1, 127, MidiNumber, Absolute),
    GeneratorInfo {
        settable: false,
        ..info(G::InitialPitch, 59, "initialPitch", 0, -12700, 12700, Cents, Additive)
    },
];

impl GeneratorId {
    /// All slots in table order.
    pub fn all() -> impl Iterator<Item = GeneratorId> {
        GENERATORS.iter().map(|g| g.id)
    }

    /// Look up a slot by its SoundFont id.
    ///
    /// Returns `None` for structural, reserved, and unknown ids.
    pub fn from_raw(raw: u16) -> Option<GeneratorId> {
        let id = match raw {
            0 => G::StartAddrsOffset,
            1 => G::EndAddrsOffset,
            2 => G::StartloopAddrsOffset,
            3 => G::EndloopAddrsOffset,
            4 => G::StartAddrsCoarseOffset,
            5 => G::ModLfoToPitch,
            6 => G::VibLfoToPitch,
            7 => G::ModEnvToPitch,
            8 => G::InitialFilterFc,
            9 => G::InitialFilterQ,
            10 => G::ModLfoToFilterFc,
            11 => G::ModEnvToFilterFc,
            12 => G::EndAddrsCoarseOffset,
            13 => G::ModLfoToVolume,
            15 => G::ChorusEffectsSend,
            16 => G::ReverbEffectsSend,
            17 => G::Pan,
            21 => G::DelayModLfo,
            22 => G::FreqModLfo,
            23 => G::DelayVibLfo,
            24 => G::FreqVibLfo,
            25 => G::DelayModEnv,
            26 => G::AttackModEnv,
            27 => G::HoldModEnv,
            28 => G::DecayModEnv,
            29 => G::SustainModEnv,
            30 => G::ReleaseModEnv,
            31 => G::KeynumToModEnvHold,
            32 => G::KeynumToModEnvDecay,
            33 => G::DelayVolEnv,
            34 => G::AttackVolEnv,
            35 => G::HoldVolEnv,
            36 => G::DecayVolEnv,
            37 => G::SustainVolEnv,
            38 => G::ReleaseVolEnv,
            39 => G::KeynumToVolEnvHold,
            40 => G::KeynumToVolEnvDecay,
            45 => G::StartloopAddrsCoarseOffset,
            46 => G::Keynum,
            47 => G::Velocity,
            48 => G::InitialAttenuation,
            50 => G::EndloopAddrsCoarseOffset,
            51 => G::CoarseTune,
            52 => G::FineTune,
            54 => G::SampleModes,
            56 => G::ScaleTuning,
            57 => G::ExclusiveClass,
            58 => G::OverridingRootKey,
            59 => G::InitialPitch,
            _ => return None,
        };
        Some(id)
    }

    /// Table entry for this slot.
    pub fn info(self) -> &'static GeneratorInfo {
        &GENERATORS[self as usize]
    }

    /// SoundFont generator id.
    pub fn raw(self) -> u16 {
        self.info().raw
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }

    pub fn default_value(self) -> i32 {
        self.info().default
    }

    /// Valid range, inclusive.
    pub fn range(self) -> (i32, i32) {
        let info = self.info();
        (info.min, info.max)
    }

    pub fn semantics(self) -> Semantics {
        self.info().semantics
    }

    /// Whether a modulator may target this slot.
    pub fn is_modulatable(self) -> bool {
        self.info().semantics == Semantics::Additive
    }

    /// Clamp an absolute value into the slot's range.
    pub fn clamp(self, value: i32) -> i32 {
        let (min, max) = self.range();
        value.clamp(min, max)
    }

    /// Clamp a preset-level offset to the width of the slot's range.
    pub fn clamp_offset(self, offset: i32) -> i32 {
        let (min, max) = self.range();
        let span = max - min;
        offset.clamp(-span, span)
    }
}

/// A generator override attached to a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorOverride {
    pub id: GeneratorId,
    pub amount: i16,
}

impl GeneratorOverride {
    pub fn new(id: GeneratorId, amount: i16) -> Self {
        Self { id, amount }
    }
}

/// A dense value per generator slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GeneratorSet {
    values: [i32; SLOT_COUNT],
}

impl GeneratorSet {
    /// Every slot at its table default.
    pub fn defaults() -> Self {
        let mut values = [0; SLOT_COUNT];
        for (value, info) in values.iter_mut().zip(GENERATORS.iter()) {
            *value = info.default;
        }
        Self { values }
    }

    /// Every slot at zero (an offset layer).
    pub fn zeroed() -> Self {
        Self { values: [0; SLOT_COUNT] }
    }

    pub fn get(&self, id: GeneratorId) -> i32 {
        self.values[id as usize]
    }

    pub fn set(&mut self, id: GeneratorId, value: i32) {
        self.values[id as usize] = value;
    }

    pub fn add(&mut self, id: GeneratorId, delta: i32) {
        self.values[id as usize] = self.values[id as usize].saturating_add(delta);
    }

    /// Clamp every slot into its declared range.
    pub fn clamp_all(&mut self) {
        for id in GeneratorId::all() {
            self.values[id as usize] = id.clamp(self.values[id as usize]);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (GeneratorId, i32)> + '_ {
        GeneratorId::all().map(move |id| (id, self.values[id as usize]))
    }
}

impl Default for GeneratorSet {
    fn default() -> Self {
        Self::defaults()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_indexed_by_discriminant() {
        for (i, info) in GENERATORS.iter().enumerate() {
            assert_eq!(info.id as usize, i, "{} out of place", info.name);
        }
    }

    #[test]
    fn raw_ids_round_trip() {
        for info in GENERATORS.iter() {
            assert_eq!(GeneratorId::from_raw(info.raw), Some(info.id), "{}", info.name);
        }
    }

    #[test]
    fn defaults_lie_within_range() {
        for info in GENERATORS.iter() {
            assert!(info.min <= info.default && info.default <= info.max, "{}", info.name);
        }
    }

    #[test]
    fn structural_and_reserved_ids_are_not_slots() {
        let structural = [RAW_INSTRUMENT, RAW_KEY_RANGE, RAW_VEL_RANGE, RAW_SAMPLE_ID];
        for raw in structural.into_iter().chain([14, 18, 19, 20, 42, 49, 55, 60, 999]) {
            assert_eq!(GeneratorId::from_raw(raw), None, "raw id {}", raw);
        }
    }

    #[test]
    fn absolute_slots_are_instrument_only() {
        let absolute: alloc::vec::Vec<_> = GeneratorId::all()
            .filter(|id| id.semantics() == Semantics::Absolute)
            .collect();
        assert!(absolute.contains(&GeneratorId::SampleModes));
        assert!(absolute.contains(&GeneratorId::OverridingRootKey));
        assert!(absolute.contains(&GeneratorId::StartAddrsOffset));
        assert!(!absolute.contains(&GeneratorId::Pan));
        assert!(!absolute.contains(&GeneratorId::CoarseTune));
        assert!(absolute.iter().all(|id| !id.is_modulatable()));
    }

    #[test]
    fn initial_pitch_is_modulation_only() {
        let info = GeneratorId::InitialPitch.info();
        assert!(!info.settable);
        assert!(GeneratorId::InitialPitch.is_modulatable());
    }

    #[test]
    fn clamp_uses_slot_range() {
        assert_eq!(GeneratorId::Pan.clamp(900), 500);
        assert_eq!(GeneratorId::Pan.clamp(-900), -500);
        assert_eq!(GeneratorId::InitialFilterFc.clamp(0), 1500);
        assert_eq!(GeneratorId::Pan.clamp_offset(-1500), -1000);
    }

    #[test]
    fn generator_set_starts_at_defaults() {
        let set = GeneratorSet::defaults();
        assert_eq!(set.get(GeneratorId::InitialFilterFc), 13500);
        assert_eq!(set.get(GeneratorId::ScaleTuning), 100);
        assert_eq!(set.get(GeneratorId::OverridingRootKey), -1);
        assert_eq!(set.get(GeneratorId::Pan), 0);
    }

    #[test]
    fn generator_set_add_and_clamp() {
        let mut set = GeneratorSet::defaults();
        set.add(GeneratorId::CoarseTune, 100);
        set.add(GeneratorId::CoarseTune, 100);
        set.clamp_all();
        assert_eq!(set.get(GeneratorId::CoarseTune), 120);
    }
}

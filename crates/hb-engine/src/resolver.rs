//! Note-on resolution.
//!
//! Walks preset → matching preset zones → instrument → matching
//! instrument zones → sample, flattening generators at each step. Every
//! matching (preset zone, instrument zone) pair becomes one voice.

use alloc::vec::Vec;
use hb_ir::{
    GeneratorSet, GraphError, Modulator, Owner, Preset, Semantics, SoundBank, Zone, ZoneFault,
    ZoneLink, ZoneOverrides,
};

use crate::controller::{ControllerSnapshot, NoteOn};
use crate::defaults::DEFAULT_MODULATORS;
use crate::modulation::{evaluate_all, layer_modulators, NoteContext};
use crate::voice::{VoiceParams, VoiceSource};

/// Resolution switches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Start every instrument zone from the SoundFont default modulators
    pub default_modulators: bool,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self { default_modulators: true }
    }
}

/// Flatten one instrument zone under one preset zone.
///
/// Instrument-level values replace the table defaults. Preset-level
/// values are offsets added to additive slots; absolute slots only take
/// instrument-level values.
pub fn accumulate(preset: &ZoneOverrides, instrument: &ZoneOverrides) -> GeneratorSet {
    let mut set = GeneratorSet::defaults();
    for (id, amount) in instrument.iter() {
        set.set(id, id.clamp(amount as i32));
    }
    for (id, amount) in preset.iter() {
        match id.semantics() {
            Semantics::Additive => set.add(id, id.clamp_offset(amount as i32)),
            Semantics::Absolute => tracing::debug!(
                generator = id.name(),
                amount,
                "ignoring preset-level absolute generator"
            ),
        }
    }
    set.clamp_all();
    set
}

/// Resolves note-ons against one bank graph.
///
/// Holds only a shared borrow; any number of resolvers may read the same
/// `SoundBank` concurrently.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    bank: &'a SoundBank,
    options: ResolveOptions,
}

impl<'a> Resolver<'a> {
    pub fn new(bank: &'a SoundBank) -> Self {
        Self::with_options(bank, ResolveOptions::default())
    }

    pub fn with_options(bank: &'a SoundBank, options: ResolveOptions) -> Self {
        Self { bank, options }
    }

    pub fn bank(&self) -> &'a SoundBank {
        self.bank
    }

    pub fn options(&self) -> ResolveOptions {
        self.options
    }

    /// Resolve a note-on into one parameter set per voice.
    ///
    /// A missing preset is `PresetNotFound`; a zone pointing at a missing
    /// instrument or sample is `CorruptGraph`. A note matching no zone, or
    /// outside MIDI range, yields no voices.
    pub fn resolve(
        &self,
        note: &NoteOn,
        controllers: &ControllerSnapshot,
    ) -> Result<Vec<VoiceParams>, GraphError> {
        let preset = self
            .bank
            .preset(note.bank, note.program)
            .ok_or(GraphError::PresetNotFound { bank: note.bank, program: note.program })?;

        let mut voices = Vec::new();
        if !note.is_valid() {
            tracing::debug!(key = note.key, velocity = note.velocity, "note outside MIDI range");
            return Ok(voices);
        }

        for (index, zone) in preset.matching_zones(note.key, note.velocity) {
            self.resolve_preset_zone(preset, index, zone, note, controllers, &mut voices)?;
        }

        tracing::debug!(
            bank = note.bank,
            program = note.program,
            key = note.key,
            velocity = note.velocity,
            voices = voices.len(),
            "resolved note"
        );
        Ok(voices)
    }

    fn resolve_preset_zone(
        &self,
        preset: &Preset,
        preset_zone: usize,
        zone: &Zone,
        note: &NoteOn,
        controllers: &ControllerSnapshot,
        voices: &mut Vec<VoiceParams>,
    ) -> Result<(), GraphError> {
        let owner = Owner::Preset(preset.id);
        let corrupt = |link| GraphError::CorruptGraph { owner, zone: preset_zone, link };
        let instrument_index = match zone.link {
            Some(ZoneLink::Instrument(i)) => i,
            Some(link) => return Err(corrupt(link)),
            None => {
                let err = GraphError::MalformedZone {
                    owner,
                    zone: preset_zone,
                    fault: ZoneFault::MissingLink,
                };
                tracing::warn!(%err, "skipping preset zone");
                return Ok(());
            }
        };
        let instrument = self
            .bank
            .instrument(instrument_index)
            .ok_or_else(|| corrupt(ZoneLink::Instrument(instrument_index)))?;

        let preset_overrides = ZoneOverrides::layered(preset.global_zone.as_ref(), zone);
        let defaults: &[Modulator] =
            if self.options.default_modulators { &DEFAULT_MODULATORS } else { &[] };

        for (instrument_zone, izone) in instrument.matching_zones(note.key, note.velocity) {
            let owner = Owner::Instrument(instrument.id);
            let corrupt = |link| GraphError::CorruptGraph { owner, zone: instrument_zone, link };
            let sample_index = match izone.link {
                Some(ZoneLink::Sample(s)) => s,
                Some(link) => return Err(corrupt(link)),
                None => {
                    let err = GraphError::MalformedZone {
                        owner,
                        zone: instrument_zone,
                        fault: ZoneFault::MissingLink,
                    };
                    tracing::warn!(%err, "skipping instrument zone");
                    continue;
                }
            };
            let header = self
                .bank
                .sample(sample_index)
                .ok_or_else(|| corrupt(ZoneLink::Sample(sample_index)))?;

            let instrument_overrides =
                ZoneOverrides::layered(instrument.global_zone.as_ref(), izone);
            let generators = accumulate(&preset_overrides, &instrument_overrides);

            let modulators = layer_modulators(
                defaults,
                instrument.global_zone.as_ref(),
                izone,
                preset.global_zone.as_ref(),
                zone,
            );
            let source = VoiceSource {
                preset: preset.id,
                preset_zone,
                instrument: instrument_index,
                instrument_zone,
                sample: sample_index,
            };
            let mut voice = VoiceParams::new(
                source,
                note.key,
                note.velocity,
                header,
                generators,
                Default::default(),
                Vec::new(),
            );
            // modulators see the effective key and velocity
            let ctx = NoteContext::new(voice.key, voice.velocity, controllers);
            let (modulation, live) = evaluate_all(&modulators, &ctx);
            voice.modulation = modulation;
            voice.live = live;
            voices.push(voice);
        }
        Ok(())
    }
}

//! Banks: the loaded preset/instrument/sample graph.
//!
//! `SoundBankBuilder` is the only path from loader output to a
//! `SoundBank`. It checks every link once, so the resolver can treat the
//! finished graph as read-only shared data.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::error::{GraphError, Owner, ZoneFault};
use crate::instrument::{split_global_zone, Instrument, Preset};
use crate::sample::{truncated_name, SampleHeader};
use crate::zone::{Zone, ZoneLink};

/// The presets of one MIDI bank number, sorted by program.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Bank {
    pub number: u16,
    pub presets: Vec<Preset>,
}

impl Bank {
    pub fn new(number: u16) -> Self {
        Self { number, presets: Vec::new() }
    }

    /// Look up a preset by program number.
    pub fn preset(&self, program: u8) -> Option<&Preset> {
        self.presets
            .binary_search_by_key(&program, |p| p.program)
            .ok()
            .map(|i| &self.presets[i])
    }

    /// Program numbers present in this bank, ascending.
    pub fn programs(&self) -> impl Iterator<Item = u8> + '_ {
        self.presets.iter().map(|p| p.program)
    }
}

/// A complete loaded bank graph.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SoundBank {
    /// Bank name
    pub name: ArrayString<20>,
    /// Banks keyed by MIDI bank number
    pub banks: BTreeMap<u16, Bank>,
    /// Instruments, indexed by preset zone links
    pub instruments: Vec<Instrument>,
    /// Sample headers, indexed by instrument zone links
    pub samples: Vec<SampleHeader>,
}

impl SoundBank {
    /// Look up a preset by bank and program.
    pub fn preset(&self, bank: u16, program: u8) -> Option<&Preset> {
        self.banks.get(&bank).and_then(|b| b.preset(program))
    }

    /// Banks ordered by number.
    pub fn banks(&self) -> impl Iterator<Item = &Bank> {
        self.banks.values()
    }

    pub fn bank(&self, number: u16) -> Option<&Bank> {
        self.banks.get(&number)
    }

    pub fn instrument(&self, index: usize) -> Option<&Instrument> {
        self.instruments.get(index)
    }

    pub fn sample(&self, index: usize) -> Option<&SampleHeader> {
        self.samples.get(index)
    }

    /// All presets ordered by (bank, program).
    pub fn presets(&self) -> impl Iterator<Item = &Preset> {
        self.banks.values().flat_map(|b| b.presets.iter())
    }

    pub fn preset_count(&self) -> usize {
        self.banks.values().map(|b| b.presets.len()).sum()
    }

    /// The preset with the lowest (bank, program) pair.
    ///
    /// For a General MIDI set this is the acoustic grand piano.
    pub fn default_preset(&self) -> Option<&Preset> {
        self.presets().next()
    }
}

/// Collects loader output and validates it into a `SoundBank`.
#[derive(Clone, Debug, Default)]
pub struct SoundBankBuilder {
    name: ArrayString<20>,
    presets: Vec<Preset>,
    instruments: Vec<Instrument>,
    samples: Vec<SampleHeader>,
}

impl SoundBankBuilder {
    pub fn new(name: &str) -> Self {
        Self { name: truncated_name(name), ..Self::default() }
    }

    /// Add a sample header, returning its index.
    pub fn add_sample(&mut self, sample: SampleHeader) -> usize {
        self.samples.push(sample);
        self.samples.len() - 1
    }

    /// Add an instrument, returning its index.
    pub fn add_instrument(&mut self, mut instrument: Instrument) -> usize {
        instrument.id = self.instruments.len();
        self.instruments.push(instrument);
        self.instruments.len() - 1
    }

    /// Add a preset, returning its id.
    pub fn add_preset(&mut self, mut preset: Preset) -> usize {
        preset.id = self.presets.len();
        self.presets.push(preset);
        self.presets.len() - 1
    }

    /// Validate every link and publish the graph.
    pub fn build(mut self) -> Result<SoundBank, GraphError> {
        let sample_count = self.samples.len();
        for inst in &mut self.instruments {
            let owner = Owner::Instrument(inst.id);
            promote_global_zone(&mut inst.global_zone, &mut inst.zones);
            sanitize_global_zone(owner, &mut inst.global_zone);
            for (i, zone) in inst.zones.iter().enumerate() {
                check_ranges(owner, i, zone);
                match zone.link {
                    Some(ZoneLink::Sample(s)) if s < sample_count => {}
                    Some(link) => return Err(GraphError::CorruptGraph { owner, zone: i, link }),
                    None => return Err(missing_link(owner, i)),
                }
            }
        }

        let instrument_count = self.instruments.len();
        let mut banks: BTreeMap<u16, Bank> = BTreeMap::new();
        for mut preset in self.presets {
            let owner = Owner::Preset(preset.id);
            promote_global_zone(&mut preset.global_zone, &mut preset.zones);
            sanitize_global_zone(owner, &mut preset.global_zone);
            for (i, zone) in preset.zones.iter().enumerate() {
                check_ranges(owner, i, zone);
                match zone.link {
                    Some(ZoneLink::Instrument(n)) if n < instrument_count => {}
                    Some(link) => return Err(GraphError::CorruptGraph { owner, zone: i, link }),
                    None => return Err(missing_link(owner, i)),
                }
            }

            let bank = banks.entry(preset.bank).or_insert_with(|| Bank::new(preset.bank));
            match bank.presets.binary_search_by_key(&preset.program, |p| p.program) {
                Ok(_) => {
                    let (bank, program) = (preset.bank, preset.program);
                    return Err(GraphError::DuplicatePreset { bank, program });
                }
                Err(pos) => bank.presets.insert(pos, preset),
            }
        }

        tracing::debug!(
            presets = banks.values().map(|b| b.presets.len()).sum::<usize>(),
            instruments = instrument_count,
            samples = sample_count,
            "bank graph built"
        );

        Ok(SoundBank {
            name: self.name,
            banks,
            instruments: self.instruments,
            samples: self.samples,
        })
    }
}

fn missing_link(owner: Owner, zone: usize) -> GraphError {
    GraphError::MalformedZone { owner, zone, fault: ZoneFault::MissingLink }
}

/// Without an explicit global zone, a leading unlinked zone becomes one.
fn promote_global_zone(global: &mut Option<Zone>, zones: &mut Vec<Zone>) {
    if global.is_none() {
        let (promoted, rest) = split_global_zone(core::mem::take(zones));
        *global = promoted;
        *zones = rest;
    }
}

/// Global zones only contribute defaults; a link on one is dropped.
fn sanitize_global_zone(owner: Owner, zone: &mut Option<Zone>) {
    if let Some(zone) = zone {
        if zone.link.take().is_some() {
            let fault = ZoneFault::LinkedGlobalZone;
            let err = GraphError::MalformedZone { owner, zone: 0, fault };
            tracing::warn!(%err, "ignoring link on global zone");
        }
    }
}

/// Inverted ranges are kept; such a zone simply never matches.
fn check_ranges(owner: Owner, index: usize, zone: &Zone) {
    let fault = if zone.key_range.is_inverted() {
        ZoneFault::InvertedKeyRange
    } else if zone.vel_range.is_inverted() {
        ZoneFault::InvertedVelocityRange
    } else {
        return;
    };
    let err = GraphError::MalformedZone { owner, zone: index, fault };
    tracing::warn!(%err, "zone will never match");
}

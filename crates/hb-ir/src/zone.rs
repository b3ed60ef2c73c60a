//! Zones: key/velocity-gated bundles of generator overrides and modulators.

use alloc::vec::Vec;
use core::fmt;

use crate::error::GraphError;
use crate::generator::{
    GeneratorId, GeneratorOverride, RAW_INSTRUMENT, RAW_KEY_RANGE, RAW_SAMPLE_ID, RAW_VEL_RANGE,
    SLOT_COUNT,
};
use crate::modulator::Modulator;

/// Inclusive key or velocity range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Range {
    pub lo: u8,
    pub hi: u8,
}

impl Range {
    /// Range used when a zone does not specify one.
    pub const FULL: Range = Range { lo: 0, hi: 128 };

    pub const fn new(lo: u8, hi: u8) -> Self {
        Self { lo, hi }
    }

    pub fn contains(&self, value: u8) -> bool {
        self.lo <= value && value <= self.hi
    }

    pub fn is_inverted(&self) -> bool {
        self.lo > self.hi
    }

    /// Decode the packed SoundFont amount (lo byte, hi byte).
    pub fn from_amount(amount: i16) -> Self {
        let bits = amount as u16;
        Self { lo: (bits & 0xff) as u8, hi: (bits >> 8) as u8 }
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::FULL
    }
}

/// What a zone plays: an instrument (preset zones) or a sample (instrument zones).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneLink {
    Instrument(usize),
    Sample(usize),
}

impl fmt::Display for ZoneLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZoneLink::Instrument(i) => write!(f, "instrument {}", i),
            ZoneLink::Sample(i) => write!(f, "sample {}", i),
        }
    }
}

/// A range-gated bundle of generator overrides and modulators.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Zone {
    pub key_range: Range,
    pub vel_range: Range,
    /// Overrides in declaration order; a later entry for the same slot wins.
    pub generators: Vec<GeneratorOverride>,
    pub modulators: Vec<Modulator>,
    pub link: Option<ZoneLink>,
}

impl Zone {
    /// Create an empty full-range zone.
    pub fn new() -> Self {
        Self::default()
    }

    /// Does this zone cover the note?
    pub fn matches(&self, key: u8, velocity: u8) -> bool {
        self.key_range.contains(key) && self.vel_range.contains(velocity)
    }

    /// Last override for a slot, if any.
    pub fn generator(&self, id: GeneratorId) -> Option<i16> {
        self.generators.iter().rev().find(|g| g.id == id).map(|g| g.amount)
    }

    pub fn instrument(&self) -> Option<usize> {
        match self.link {
            Some(ZoneLink::Instrument(i)) => Some(i),
            _ => None,
        }
    }

    pub fn sample(&self) -> Option<usize> {
        match self.link {
            Some(ZoneLink::Sample(i)) => Some(i),
            _ => None,
        }
    }
}

/// Per-slot overrides of one level (global zone, then local zone).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoneOverrides {
    slots: [Option<i16>; SLOT_COUNT],
}

impl ZoneOverrides {
    /// Apply `global` then `local`; the last value written for a slot wins.
    pub fn layered(global: Option<&Zone>, local: &Zone) -> Self {
        let mut overrides = Self { slots: [None; SLOT_COUNT] };
        for zone in global.into_iter().chain(core::iter::once(local)) {
            for g in &zone.generators {
                overrides.slots[g.id as usize] = Some(g.amount);
            }
        }
        overrides
    }

    pub fn get(&self, id: GeneratorId) -> Option<i16> {
        self.slots[id as usize]
    }

    /// Set slots in table order.
    pub fn iter(&self) -> impl Iterator<Item = (GeneratorId, i16)> + '_ {
        GeneratorId::all().filter_map(move |id| self.slots[id as usize].map(|v| (id, v)))
    }
}

/// What to do with a generator record whose id is not in the table.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeneratorPolicy {
    /// Fail construction.
    #[default]
    Reject,
    /// Drop the record and log it.
    Skip,
}

/// Builds a zone from typed values or from raw loader records.
#[derive(Clone, Debug, Default)]
pub struct ZoneBuilder {
    zone: Zone,
    policy: GeneratorPolicy,
}

impl ZoneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: GeneratorPolicy) -> Self {
        Self { zone: Zone::new(), policy }
    }

    pub fn key_range(mut self, lo: u8, hi: u8) -> Self {
        self.zone.key_range = Range::new(lo, hi);
        self
    }

    pub fn vel_range(mut self, lo: u8, hi: u8) -> Self {
        self.zone.vel_range = Range::new(lo, hi);
        self
    }

    pub fn instrument(mut self, index: usize) -> Self {
        self.zone.link = Some(ZoneLink::Instrument(index));
        self
    }

    pub fn sample(mut self, index: usize) -> Self {
        self.zone.link = Some(ZoneLink::Sample(index));
        self
    }

    pub fn generator(mut self, id: GeneratorId, amount: i16) -> Self {
        self.zone.generators.push(GeneratorOverride::new(id, amount));
        self
    }

    pub fn modulator(mut self, modulator: Modulator) -> Self {
        self.zone.modulators.push(modulator);
        self
    }

    /// Add a generator record as the loader read it.
    ///
    /// Range and link records become zone fields. Unknown or
    /// modulation-only ids follow the builder's `GeneratorPolicy`.
    pub fn raw_generator(mut self, raw: u16, amount: i16) -> Result<Self, GraphError> {
        match raw {
            RAW_KEY_RANGE => self.zone.key_range = Range::from_amount(amount),
            RAW_VEL_RANGE => self.zone.vel_range = Range::from_amount(amount),
            RAW_INSTRUMENT => self.zone.link = Some(ZoneLink::Instrument(amount as u16 as usize)),
            RAW_SAMPLE_ID => self.zone.link = Some(ZoneLink::Sample(amount as u16 as usize)),
            _ => match GeneratorId::from_raw(raw).filter(|id| id.info().settable) {
                Some(id) => self.zone.generators.push(GeneratorOverride::new(id, amount)),
                None => match self.policy {
                    GeneratorPolicy::Reject => return Err(GraphError::UnsupportedGenerator(raw)),
                    GeneratorPolicy::Skip => {
                        tracing::warn!(raw, amount, "skipping unsupported generator");
                    }
                },
            },
        }
        Ok(self)
    }

    pub fn build(self) -> Zone {
        self.zone
    }
}

//! Instruments and presets.

use alloc::vec::Vec;
use arrayvec::ArrayString;

use crate::sample::truncated_name;
use crate::zone::Zone;

/// A named group of sample zones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Instrument {
    /// Instrument name
    pub name: ArrayString<20>,
    /// Index of this instrument in its bank graph
    pub id: usize,
    /// Defaults for every zone that does not set a slot itself
    pub global_zone: Option<Zone>,
    /// Zones, each linking one sample
    pub zones: Vec<Zone>,
}

impl Instrument {
    /// Create an empty instrument.
    pub fn new(name: &str) -> Self {
        Self { name: truncated_name(name), ..Self::default() }
    }

    pub fn with_global_zone(mut self, zone: Zone) -> Self {
        self.global_zone = Some(zone);
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    /// Zones covering a note, in declaration order.
    pub fn matching_zones(&self, key: u8, velocity: u8) -> impl Iterator<Item = (usize, &Zone)> {
        self.zones.iter().enumerate().filter(move |(_, z)| z.matches(key, velocity))
    }
}

/// A bank/program-addressed group of instrument zones.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Preset {
    /// Preset name
    pub name: ArrayString<20>,
    /// Index of this preset in its bank graph
    pub id: usize,
    /// MIDI bank number (128 = percussion by convention)
    pub bank: u16,
    /// MIDI program number
    pub program: u8,
    /// Defaults for every zone that does not set a slot itself
    pub global_zone: Option<Zone>,
    /// Zones, each linking one instrument
    pub zones: Vec<Zone>,
}

impl Preset {
    /// Create an empty preset at a bank/program address.
    pub fn new(name: &str, bank: u16, program: u8) -> Self {
        Self { name: truncated_name(name), bank, program, ..Self::default() }
    }

    pub fn with_global_zone(mut self, zone: Zone) -> Self {
        self.global_zone = Some(zone);
        self
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zones.push(zone);
        self
    }

    /// Zones covering a note, in declaration order.
    pub fn matching_zones(&self, key: u8, velocity: u8) -> impl Iterator<Item = (usize, &Zone)> {
        self.zones.iter().enumerate().filter(move |(_, z)| z.matches(key, velocity))
    }
}

/// Split a loader's zone list into (global, regular) zones.
///
/// A leading zone without a link is the global zone. Only the first
/// zone can play that role.
pub fn split_global_zone(mut zones: Vec<Zone>) -> (Option<Zone>, Vec<Zone>) {
    if zones.len() > 1 && zones[0].link.is_none() {
        let global = zones.remove(0);
        (Some(global), zones)
    } else {
        (None, zones)
    }
}

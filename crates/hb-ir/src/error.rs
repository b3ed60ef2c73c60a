//! Error taxonomy for bank graphs and note resolution.

use core::fmt;
use thiserror::Error;

use crate::zone::ZoneLink;

/// Errors raised while building or resolving against a bank graph.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    /// No preset at this bank/program pair
    #[error("preset not found: bank {bank}, program {program}")]
    PresetNotFound { bank: u16, program: u8 },

    /// A zone violates a structural rule
    #[error("malformed zone {zone} in {owner}: {fault}")]
    MalformedZone { owner: Owner, zone: usize, fault: ZoneFault },

    /// Generator id outside the known table
    #[error("unsupported generator id {0}")]
    UnsupportedGenerator(u16),

    /// Modulator with an unknown or unsupported field
    #[error("unsupported modulator: {0}")]
    UnsupportedModulator(ModulatorFault),

    /// A zone links to an index that does not exist, or to the wrong kind of node
    #[error("corrupt graph: zone {zone} in {owner} links to missing {link}")]
    CorruptGraph { owner: Owner, zone: usize, link: ZoneLink },

    /// Two presets share a bank/program pair
    #[error("duplicate preset: bank {bank}, program {program}")]
    DuplicatePreset { bank: u16, program: u8 },
}

/// Node that owns a zone, by index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Owner {
    Preset(usize),
    Instrument(usize),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Preset(i) => write!(f, "preset {}", i),
            Owner::Instrument(i) => write!(f, "instrument {}", i),
        }
    }
}

/// What is wrong with a malformed zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZoneFault {
    /// Global zone carries an instrument or sample link
    LinkedGlobalZone,
    /// Key range with lo > hi
    InvertedKeyRange,
    /// Velocity range with lo > hi
    InvertedVelocityRange,
    /// Regular zone without an instrument or sample link
    MissingLink,
}

impl fmt::Display for ZoneFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ZoneFault::LinkedGlobalZone => "global zone carries a link",
            ZoneFault::InvertedKeyRange => "inverted key range",
            ZoneFault::InvertedVelocityRange => "inverted velocity range",
            ZoneFault::MissingLink => "zone has no link",
        };
        f.write_str(text)
    }
}

/// Which modulator field could not be decoded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModulatorFault {
    Source(u16),
    Destination(u16),
    Transform(u16),
}

impl fmt::Display for ModulatorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModulatorFault::Source(raw) => write!(f, "source {:#06x}", raw),
            ModulatorFault::Destination(raw) => write!(f, "destination {:#06x}", raw),
            ModulatorFault::Transform(raw) => write!(f, "transform {}", raw),
        }
    }
}

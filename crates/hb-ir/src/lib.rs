//! Core bank graph types for hibank.
//!
//! This crate defines the immutable preset → instrument → zone → sample
//! graph and the generator table every layer refers to. Loaders build the
//! graph through `SoundBankBuilder`; the engine only reads it.
//!
//! Designed to be `no_std` compatible with the `alloc` crate.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod bank;
mod error;
mod generator;
mod instrument;
mod modulator;
mod sample;
mod zone;

pub use bank::{Bank, SoundBank, SoundBankBuilder};
pub use error::{GraphError, ModulatorFault, Owner, ZoneFault};
pub use generator::{
    GeneratorId, GeneratorInfo, GeneratorOverride, GeneratorSet, Semantics, Unit, GENERATORS,
    RAW_INSTRUMENT, RAW_KEY_RANGE, RAW_SAMPLE_ID, RAW_VEL_RANGE, SLOT_COUNT,
};
pub use instrument::{split_global_zone, Instrument, Preset};
pub use modulator::{
    CurveShape, DecodedModulator, Direction, ModController, ModSource, Modulator, Polarity,
    Transform,
};
pub use sample::{LoopMode, SampleHeader, SampleKind};
pub use zone::{GeneratorPolicy, Range, Zone, ZoneBuilder, ZoneLink, ZoneOverrides};

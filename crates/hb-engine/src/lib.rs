//! Preset resolution engine for hibank.
//!
//! Turns a note-on plus a controller snapshot into the flattened
//! parameter set of every voice the note should start.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

mod controller;
mod defaults;
mod modulation;
mod resolver;
mod units;
mod voice;

pub use controller::{ControllerSnapshot, NoteOn, PITCH_WHEEL_CENTER};
pub use defaults::DEFAULT_MODULATORS;
pub use modulation::{
    concave, convex, evaluate, evaluate_all, layer_modulators, source_value, LiveModulation,
    ModulationDeltas, NoteContext,
};
pub use resolver::{accumulate, ResolveOptions, Resolver};
pub use units::{
    absolute_cents_to_hz, attenuation_to_gain, centibels_to_db, cents_to_ratio,
    key_scaled_timecents, timecents_to_seconds,
};
pub use voice::{Envelope, Lfo, SampleAddresses, VoiceParams, VoiceSource, COARSE_OFFSET_FRAMES};

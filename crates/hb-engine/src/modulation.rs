//! Modulator evaluation.
//!
//! Each modulator contributes `amount * primary * secondary` to its
//! destination slot, where each source is a controller value normalised
//! to 0..1, optionally reversed, then shaped by its curve and polarity.
//! Contributions to the same slot sum.

use alloc::vec::Vec;
use hb_ir::{
    CurveShape, DecodedModulator, Direction, GeneratorId, ModController, ModSource, Modulator,
    Polarity, Transform, Zone, SLOT_COUNT,
};

use crate::controller::ControllerSnapshot;

/// The note-level values a modulator source may read.
#[derive(Clone, Copy, Debug)]
pub struct NoteContext<'a> {
    pub key: u8,
    pub velocity: u8,
    pub controllers: &'a ControllerSnapshot,
}

impl<'a> NoteContext<'a> {
    pub fn new(key: u8, velocity: u8, controllers: &'a ControllerSnapshot) -> Self {
        Self { key, velocity, controllers }
    }

    /// Controller value normalised to 0..1.
    ///
    /// 7-bit controllers divide by 128 so the MIDI centre value 64 lands on
    /// exactly 0.5 and a bipolar source reads 0 there. Wheel sensitivity
    /// divides by 127 so an amount of 12700 reads as whole semitones. The
    /// 14-bit pitch wheel divides by 16384 (8192 is the centre).
    fn normalized(&self, controller: ModController) -> f32 {
        let seven_bit = |v: u8| v.min(127) as f32 / 128.0;
        let controllers = self.controllers;
        match controller {
            ModController::None => 1.0,
            ModController::NoteOnVelocity => seven_bit(self.velocity),
            ModController::NoteOnKey => seven_bit(self.key),
            ModController::PolyPressure => {
                seven_bit(controllers.poly_pressure[(self.key & 0x7f) as usize])
            }
            ModController::ChannelPressure => seven_bit(controllers.channel_pressure),
            ModController::PitchWheel => controllers.pitch_wheel.min(16383) as f32 / 16384.0,
            ModController::PitchWheelSensitivity => {
                controllers.pitch_wheel_sensitivity.min(127) as f32 / 127.0
            }
            ModController::Cc(cc) => seven_bit(controllers.cc(cc)),
        }
    }
}

/// Concave curve: the SoundFont 96 dB attenuation shape, 0..1 → 0..1.
pub fn concave(x: f32) -> f32 {
    if x <= 0.0 {
        return 0.0;
    }
    if x >= 1.0 {
        return 1.0;
    }
    (-(5.0 / 12.0) * libm::log10f(1.0 - x)).min(1.0)
}

/// Convex curve: concave mirrored about both axes.
pub fn convex(x: f32) -> f32 {
    1.0 - concave(1.0 - x)
}

fn unipolar(curve: CurveShape, x: f32) -> f32 {
    match curve {
        CurveShape::Linear => x,
        CurveShape::Concave => concave(x),
        CurveShape::Convex => convex(x),
        CurveShape::Switch => {
            if x >= 0.5 {
                1.0
            } else {
                0.0
            }
        }
    }
}

fn bipolar(curve: CurveShape, x: f32) -> f32 {
    match curve {
        CurveShape::Linear => 2.0 * x - 1.0,
        CurveShape::Switch => {
            if x >= 0.5 {
                1.0
            } else {
                -1.0
            }
        }
        CurveShape::Concave | CurveShape::Convex => {
            if x >= 0.5 {
                unipolar(curve, 2.0 * x - 1.0)
            } else {
                -unipolar(curve, 1.0 - 2.0 * x)
            }
        }
    }
}

/// Map a source through direction, curve and polarity.
pub fn source_value(source: &ModSource, ctx: &NoteContext) -> f32 {
    if source.controller == ModController::None {
        return 1.0;
    }
    let mut x = ctx.normalized(source.controller);
    if source.direction == Direction::Negative {
        x = 1.0 - x;
    }
    match source.polarity {
        Polarity::Unipolar => unipolar(source.curve, x),
        Polarity::Bipolar => bipolar(source.curve, x),
    }
}

/// Contribution of one modulator to its destination slot.
pub fn evaluate(modulator: &DecodedModulator, ctx: &NoteContext) -> f32 {
    let primary = source_value(&modulator.source, ctx);
    let value = modulator.amount * primary * source_value(&modulator.amount_source, ctx);
    match modulator.transform {
        Transform::Linear => value,
        Transform::Absolute => libm::fabsf(value),
    }
}

/// A modulator bound to a live controller, reported for re-evaluation
/// after note-on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LiveModulation {
    pub modulator: DecodedModulator,
    /// Contribution at note-on time
    pub contribution: f32,
}

impl LiveModulation {
    pub fn destination(&self) -> GeneratorId {
        self.modulator.destination
    }

    /// Recompute against a newer controller snapshot.
    pub fn reevaluate(&self, ctx: &NoteContext) -> f32 {
        evaluate(&self.modulator, ctx)
    }
}

/// Summed modulator contributions per slot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModulationDeltas {
    deltas: [f32; SLOT_COUNT],
}

impl ModulationDeltas {
    pub fn new() -> Self {
        Self { deltas: [0.0; SLOT_COUNT] }
    }

    pub fn get(&self, id: GeneratorId) -> f32 {
        self.deltas[id as usize]
    }

    pub fn add(&mut self, id: GeneratorId, delta: f32) {
        self.deltas[id as usize] += delta;
    }
}

impl Default for ModulationDeltas {
    fn default() -> Self {
        Self::new()
    }
}

/// Evaluate every modulator, returning per-slot sums and the live subset.
pub fn evaluate_all(
    modulators: &[DecodedModulator],
    ctx: &NoteContext,
) -> (ModulationDeltas, Vec<LiveModulation>) {
    let mut deltas = ModulationDeltas::new();
    let mut live = Vec::new();
    for m in modulators {
        let contribution = evaluate(m, ctx);
        deltas.add(m.destination, contribution);
        if m.is_live() {
            live.push(LiveModulation { modulator: *m, contribution });
        }
    }
    (deltas, live)
}

/// Decode raw records, dropping the ones the engine cannot evaluate.
fn decode_supported<'a, I>(modulators: I) -> impl Iterator<Item = DecodedModulator> + 'a
where
    I: Iterator<Item = &'a Modulator> + 'a,
{
    modulators.filter_map(|m| match m.decode() {
        Ok(decoded) => Some(decoded),
        Err(err) => {
            tracing::warn!(%err, "skipping modulator");
            None
        }
    })
}

/// Insert, replacing an identical modulator.
fn override_into(list: &mut Vec<DecodedModulator>, m: DecodedModulator) {
    match list.iter_mut().find(|existing| existing.is_identical(&m)) {
        Some(existing) => *existing = m,
        None => list.push(m),
    }
}

/// Insert, summing into an identical modulator.
fn sum_into(list: &mut Vec<DecodedModulator>, m: DecodedModulator) {
    match list.iter_mut().find(|existing| existing.is_identical(&m)) {
        Some(existing) => existing.amount += m.amount,
        None => list.push(m),
    }
}

/// Build the modulator list for one voice.
///
/// Instrument level: defaults, then the global zone, then the local zone,
/// each replacing identical modulators. Preset level: global then local
/// the same way, then added on top, summing identical amounts.
pub fn layer_modulators(
    defaults: &[Modulator],
    instrument_global: Option<&Zone>,
    instrument_zone: &Zone,
    preset_global: Option<&Zone>,
    preset_zone: &Zone,
) -> Vec<DecodedModulator> {
    let mut list = Vec::new();
    let instrument_level = defaults
        .iter()
        .chain(instrument_global.into_iter().flat_map(|z| z.modulators.iter()))
        .chain(instrument_zone.modulators.iter());
    for m in decode_supported(instrument_level) {
        override_into(&mut list, m);
    }

    let mut preset_list = Vec::new();
    let preset_level =
        preset_global.into_iter().flat_map(|z| z.modulators.iter()).chain(&preset_zone.modulators);
    for m in decode_supported(preset_level) {
        override_into(&mut preset_list, m);
    }
    for m in preset_list {
        sum_into(&mut list, m);
    }
    list
}

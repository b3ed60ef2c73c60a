//! Modulator records: live controller → generator bindings.
//!
//! A `Modulator` keeps the five SoundFont fields as the loader read them.
//! `decode` turns them into typed parts; anything the engine cannot
//! evaluate comes back as `GraphError::UnsupportedModulator` so the caller
//! can drop that single modulator.

use crate::error::{GraphError, ModulatorFault};
use crate::generator::GeneratorId;

/// Raw modulator record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Modulator {
    /// Primary source operator
    pub source: u16,
    /// Destination generator id (bit 15 = link)
    pub destination: u16,
    /// Scale applied to the transformed sources
    pub amount: i16,
    /// Secondary source operator, multiplies the primary
    pub amount_source: u16,
    /// Output transform
    pub transform: u16,
}

impl Modulator {
    pub const fn new(
        source: u16,
        destination: u16,
        amount: i16,
        amount_source: u16,
        transform: u16,
    ) -> Self {
        Self { source, destination, amount, amount_source, transform }
    }

    /// Two modulators are identical when everything but the amount matches.
    pub fn is_identical(&self, other: &Modulator) -> bool {
        self.source == other.source
            && self.destination == other.destination
            && self.amount_source == other.amount_source
            && self.transform == other.transform
    }

    /// Decode into typed parts.
    pub fn decode(&self) -> Result<DecodedModulator, GraphError> {
        let unsupported = GraphError::UnsupportedModulator;

        let source_of =
            |raw: u16| ModSource::from_raw(raw).ok_or(unsupported(ModulatorFault::Source(raw)));
        let source = source_of(self.source)?;
        let amount_source = source_of(self.amount_source)?;

        if self.destination & 0x8000 != 0 {
            return Err(unsupported(ModulatorFault::Destination(self.destination)));
        }
        let destination = GeneratorId::from_raw(self.destination)
            .filter(|id| id.is_modulatable())
            .ok_or(unsupported(ModulatorFault::Destination(self.destination)))?;

        let transform = match self.transform {
            0 => Transform::Linear,
            2 => Transform::Absolute,
            other => return Err(unsupported(ModulatorFault::Transform(other))),
        };

        Ok(DecodedModulator {
            source,
            destination,
            amount: self.amount as f32,
            amount_source,
            transform,
        })
    }
}

/// A modulator with every field understood.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DecodedModulator {
    pub source: ModSource,
    pub destination: GeneratorId,
    /// Summed amount (preset and instrument amounts add when merged)
    pub amount: f32,
    pub amount_source: ModSource,
    pub transform: Transform,
}

impl DecodedModulator {
    /// Identity ignoring the amount.
    pub fn is_identical(&self, other: &DecodedModulator) -> bool {
        self.source == other.source
            && self.destination == other.destination
            && self.amount_source == other.amount_source
            && self.transform == other.transform
    }

    /// Whether either source follows a controller that can change after note-on.
    pub fn is_live(&self) -> bool {
        self.source.controller.is_live() || self.amount_source.controller.is_live()
    }
}

/// Where a source value comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ModController {
    /// Constant 1.0
    None,
    NoteOnVelocity,
    NoteOnKey,
    PolyPressure,
    ChannelPressure,
    PitchWheel,
    PitchWheelSensitivity,
    /// MIDI continuous controller number
    Cc(u8),
}

impl ModController {
    /// Controllers that keep changing while the note sounds.
    pub fn is_live(self) -> bool {
        matches!(
            self,
            ModController::PolyPressure
                | ModController::ChannelPressure
                | ModController::PitchWheel
                | ModController::PitchWheelSensitivity
                | ModController::Cc(_)
        )
    }
}

/// Transfer curve applied to the normalised source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CurveShape {
    Linear,
    Concave,
    Convex,
    Switch,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Polarity {
    /// 0..1
    Unipolar,
    /// -1..1
    Bipolar,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// min → max
    Positive,
    /// max → min
    Negative,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transform {
    Linear,
    Absolute,
}

/// A decoded source operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModSource {
    pub controller: ModController,
    pub curve: CurveShape,
    pub polarity: Polarity,
    pub direction: Direction,
}

impl ModSource {
    /// The "no controller" source (constant 1).
    pub const NONE: ModSource = ModSource {
        controller: ModController::None,
        curve: CurveShape::Linear,
        polarity: Polarity::Unipolar,
        direction: Direction::Positive,
    };

    /// Decode a SoundFont source operator.
    ///
    /// Bits 0-6 index, bit 7 CC flag, bit 8 direction, bit 9 polarity,
    /// bits 10-15 curve type.
    pub fn from_raw(raw: u16) -> Option<ModSource> {
        let index = (raw & 0x7f) as u8;
        let controller = if raw & 0x80 != 0 {
            if !cc_is_modulatable(index) {
                return None;
            }
            ModController::Cc(index)
        } else {
            match index {
                0 => ModController::None,
                2 => ModController::NoteOnVelocity,
                3 => ModController::NoteOnKey,
                10 => ModController::PolyPressure,
                13 => ModController::ChannelPressure,
                14 => ModController::PitchWheel,
                16 => ModController::PitchWheelSensitivity,
                // 127 = link, unsupported
                _ => return None,
            }
        };
        let curve = match raw >> 10 {
            0 => CurveShape::Linear,
            1 => CurveShape::Concave,
            2 => CurveShape::Convex,
            3 => CurveShape::Switch,
            _ => return None,
        };
        let direction = if raw & 0x100 != 0 { Direction::Negative } else { Direction::Positive };
        let polarity = if raw & 0x200 != 0 { Polarity::Bipolar } else { Polarity::Unipolar };
        Some(ModSource { controller, curve, polarity, direction })
    }

    /// Encode back into a SoundFont source operator.
    pub fn to_raw(&self) -> u16 {
        let index = match self.controller {
            ModController::None => 0,
            ModController::NoteOnVelocity => 2,
            ModController::NoteOnKey => 3,
            ModController::PolyPressure => 10,
            ModController::ChannelPressure => 13,
            ModController::PitchWheel => 14,
            ModController::PitchWheelSensitivity => 16,
            ModController::Cc(cc) => 0x80 | (cc as u16 & 0x7f),
        };
        let curve = match self.curve {
            CurveShape::Linear => 0,
            CurveShape::Concave => 1,
            CurveShape::Convex => 2,
            CurveShape::Switch => 3,
        };
        let direction = if self.direction == Direction::Negative { 0x100 } else { 0 };
        let polarity = if self.polarity == Polarity::Bipolar { 0x200 } else { 0 };
        (curve << 10) | polarity | direction | index
    }
}

/// MIDI CCs the SoundFont standard forbids as modulator sources.
fn cc_is_modulatable(cc: u8) -> bool {
    !matches!(cc, 0 | 6 | 32..=63 | 98..=101 | 120..=127)
}

//! Per-note inputs: the note-on itself and the channel's controller state.

/// A note-on request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NoteOn {
    /// MIDI bank number
    pub bank: u16,
    /// MIDI program number
    pub program: u8,
    /// MIDI key (0-127)
    pub key: u8,
    /// MIDI velocity (0-127)
    pub velocity: u8,
}

impl NoteOn {
    pub fn new(bank: u16, program: u8, key: u8, velocity: u8) -> Self {
        Self { bank, program, key, velocity }
    }

    /// Same note addressed to another preset.
    pub fn with_preset(self, bank: u16, program: u8) -> Self {
        Self { bank, program, ..self }
    }

    /// Key and velocity both within MIDI range.
    pub fn is_valid(&self) -> bool {
        self.key <= 127 && self.velocity <= 127
    }
}

/// Pitch wheel centre position.
pub const PITCH_WHEEL_CENTER: u16 = 8192;

/// Snapshot of a channel's controllers at note-on time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControllerSnapshot {
    /// MIDI continuous controllers
    pub cc: [u8; 128],
    /// Polyphonic key pressure per key
    pub poly_pressure: [u8; 128],
    pub channel_pressure: u8,
    /// 14-bit pitch wheel (0-16383, centre 8192)
    pub pitch_wheel: u16,
    /// Pitch wheel range in semitones (RPN 0)
    pub pitch_wheel_sensitivity: u8,
}

impl Default for ControllerSnapshot {
    /// General MIDI reset values.
    fn default() -> Self {
        let mut cc = [0; 128];
        cc[7] = 100; // volume
        cc[10] = 64; // pan
        cc[11] = 127; // expression
        Self {
            cc,
            poly_pressure: [0; 128],
            channel_pressure: 0,
            pitch_wheel: PITCH_WHEEL_CENTER,
            pitch_wheel_sensitivity: 2,
        }
    }
}

impl ControllerSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a controller, masking both number and value to 7 bits.
    pub fn with_cc(mut self, cc: u8, value: u8) -> Self {
        self.cc[(cc & 0x7f) as usize] = value & 0x7f;
        self
    }

    pub fn with_pitch_wheel(mut self, value: u16) -> Self {
        self.pitch_wheel = value.min(16383);
        self
    }

    pub fn with_channel_pressure(mut self, value: u8) -> Self {
        self.channel_pressure = value & 0x7f;
        self
    }

    pub fn cc(&self, cc: u8) -> u8 {
        self.cc[(cc & 0x7f) as usize]
    }
}

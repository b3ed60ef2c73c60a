//! Sample header types.
//!
//! Only the header travels with the bank graph; the audio data belongs to
//! the playback engine.

use arrayvec::ArrayString;

/// Copy a name into a 20-byte field, cutting at the last char boundary
/// that fits.
pub(crate) fn truncated_name(name: &str) -> ArrayString<20> {
    let mut end = name.len().min(20);
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    let mut out = ArrayString::new();
    out.push_str(&name[..end]);
    out
}

/// A sample header as read from the bank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleHeader {
    /// Sample name
    pub name: ArrayString<20>,
    /// First frame in the sample pool
    pub start: u32,
    /// One past the last frame
    pub end: u32,
    /// First frame of the loop
    pub loop_start: u32,
    /// One past the last frame of the loop
    pub loop_end: u32,
    /// Recording rate in Hz
    pub sample_rate: u32,
    /// MIDI key recorded at (255 = unpitched)
    pub original_pitch: u8,
    /// Pitch correction in cents
    pub pitch_correction: i8,
    /// Channel layout
    pub kind: SampleKind,
}

impl Default for SampleHeader {
    fn default() -> Self {
        Self {
            name: ArrayString::new(),
            start: 0,
            end: 0,
            loop_start: 0,
            loop_end: 0,
            sample_rate: 44100,
            original_pitch: 60,
            pitch_correction: 0,
            kind: SampleKind::Mono,
        }
    }
}

impl SampleHeader {
    /// Create a header spanning `start..end` with no loop.
    pub fn new(name: &str, start: u32, end: u32) -> Self {
        Self {
            name: truncated_name(name),
            start,
            end,
            loop_start: start,
            loop_end: start,
            ..Self::default()
        }
    }

    /// Set the loop range.
    pub fn with_loop(mut self, loop_start: u32, loop_end: u32) -> Self {
        self.loop_start = loop_start;
        self.loop_end = loop_end;
        self
    }

    /// Length in frames.
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root key to use when no zone overrides it.
    ///
    /// Out-of-range pitches fall back to middle C.
    pub fn root_key(&self) -> u8 {
        if self.original_pitch > 127 {
            60
        } else {
            self.original_pitch
        }
    }
}

/// Channel layout of a sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SampleKind {
    #[default]
    Mono,
    Right,
    Left,
    Linked,
}

/// Loop behaviour decoded from the `sampleModes` generator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoopMode {
    /// Play once
    #[default]
    None,
    /// Loop for the whole note
    Continuous,
    /// Loop until note-off, then play to the end
    UntilRelease,
}

impl LoopMode {
    /// Decode a `sampleModes` value. Mode 2 is reserved and plays unlooped.
    pub fn from_sample_modes(value: i32) -> Self {
        match value & 3 {
            1 => LoopMode::Continuous,
            3 => LoopMode::UntilRelease,
            _ => LoopMode::None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_header_has_empty_loop() {
        let header = SampleHeader::new("piano C4", 100, 1100);
        assert_eq!(header.name.as_str(), "piano C4");
        assert_eq!(header.len(), 1000);
        assert_eq!(header.loop_start, header.loop_end);
    }

    #[test]
    fn long_names_are_truncated_not_rejected() {
        let header = SampleHeader::new("a sample name longer than twenty", 0, 10);
        assert_eq!(header.name.as_str(), "a sample name longer");
        assert_eq!(header.len(), 10);
    }

    #[test]
    fn truncation_stops_at_char_boundary() {
        // 19 ASCII bytes, then a 2-byte char that would straddle the limit
        let name = "nineteen bytes long\u{e9}";
        assert_eq!(truncated_name(name).as_str(), "nineteen bytes long");
        assert_eq!(truncated_name("piano").as_str(), "piano");
    }

    #[test]
    fn unpitched_sample_roots_at_middle_c() {
        let mut header = SampleHeader::new("drum", 0, 10);
        header.original_pitch = 255;
        assert_eq!(header.root_key(), 60);
        header.original_pitch = 48;
        assert_eq!(header.root_key(), 48);
    }

    #[test]
    fn sample_modes_decode() {
        assert_eq!(LoopMode::from_sample_modes(0), LoopMode::None);
        assert_eq!(LoopMode::from_sample_modes(1), LoopMode::Continuous);
        assert_eq!(LoopMode::from_sample_modes(2), LoopMode::None);
        assert_eq!(LoopMode::from_sample_modes(3), LoopMode::UntilRelease);
    }
}

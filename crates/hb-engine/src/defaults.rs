//! The SoundFont 2.04 default modulator set.
//!
//! Every instrument zone starts from these; an identical instrument
//! modulator replaces the default, a preset modulator adds to it.

use hb_ir::Modulator;

/// Default modulators in raw form, as they would appear in a bank.
pub const DEFAULT_MODULATORS: [Modulator; 10] = [
    // velocity → initial attenuation (concave, negative)
    Modulator::new(0x0502, 48, 960, 0, 0),
    // velocity → filter cutoff (linear, negative)
    Modulator::new(0x0102, 8, -2400, 0, 0),
    // channel pressure → vibrato LFO pitch depth
    Modulator::new(0x000D, 6, 50, 0, 0),
    // mod wheel → vibrato LFO pitch depth
    Modulator::new(0x0081, 6, 50, 0, 0),
    // CC7 volume → initial attenuation
    Modulator::new(0x0587, 48, 960, 0, 0),
    // CC10 pan → pan
    Modulator::new(0x028A, 17, 1000, 0, 0),
    // CC11 expression → initial attenuation
    Modulator::new(0x058B, 48, 960, 0, 0),
    // CC91 → reverb send
    Modulator::new(0x00DB, 16, 200, 0, 0),
    // CC93 → chorus send
    Modulator::new(0x00DD, 15, 200, 0, 0),
    // pitch wheel, scaled by wheel sensitivity → initial pitch
    Modulator::new(0x020E, 59, 12700, 0x0010, 0),
];

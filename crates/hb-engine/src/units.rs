//! Generator unit conversions.
//!
//! Converts SoundFont generator units (timecents, absolute cents,
//! centibels) into seconds, Hz and gain for the playback engine.

/// Frequency of absolute cents 0 (MIDI key 0).
pub const ABSOLUTE_CENTS_BASE_HZ: f32 = 8.176;

/// Timecents at or below this value mean "instantaneous".
pub const TIMECENTS_ZERO: f32 = -32768.0;

/// Key around which keynum-to-envelope scaling pivots.
pub const KEY_SCALING_PIVOT: i32 = 60;

/// Convert timecents to seconds: 2^(tc/1200).
pub fn timecents_to_seconds(timecents: f32) -> f32 {
    if timecents <= TIMECENTS_ZERO {
        return 0.0;
    }
    libm::exp2f(timecents / 1200.0)
}

/// Convert absolute cents to Hz: 8.176 * 2^(cents/1200).
pub fn absolute_cents_to_hz(cents: f32) -> f32 {
    ABSOLUTE_CENTS_BASE_HZ * libm::exp2f(cents / 1200.0)
}

/// Frequency ratio of a relative pitch offset in cents.
pub fn cents_to_ratio(cents: f32) -> f32 {
    libm::exp2f(cents / 1200.0)
}

/// Centibels to decibels.
pub fn centibels_to_db(centibels: f32) -> f32 {
    centibels / 10.0
}

/// Attenuation in centibels to a linear gain factor.
pub fn attenuation_to_gain(centibels: f32) -> f32 {
    libm::powf(10.0, -centibels / 200.0)
}

/// Apply keynum-to-hold/decay scaling: `tc + per_key * (60 - key)`.
pub fn key_scaled_timecents(timecents: f32, per_key: f32, key: u8) -> f32 {
    timecents + per_key * (KEY_SCALING_PIVOT - key as i32) as f32
}

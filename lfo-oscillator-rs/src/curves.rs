//! Control curves mapping a 7-bit controller value (pot or MIDI CC, `0..=127`)
//! onto LFO parameters.
//!
//! Values above 127 are clamped.

const MAX_VALUE: u8 = 127;

/// LFO rate in Hz: `r + r³` with `r = 3v / 127`. 0 Hz at 0, 30 Hz at 127.
pub fn rate_hz(value: u8) -> f32 {
    let r = value.min(MAX_VALUE) as f32 * 3.0 / MAX_VALUE as f32;
    r + r * r * r
}

/// Glide time in milliseconds, roughly quadratic up to 5 s.
pub fn ramp_time_ms(value: u8) -> u32 {
    let v = value.min(MAX_VALUE) as u32;
    ((1001 * v) >> 7) + ((4071 * v * v) >> 14)
}

/// Ramp time converted to oscillator ticks.
pub fn ramp_samples(value: u8, sample_rate: u32) -> u32 {
    (ramp_time_ms(value) as u64 * sample_rate as u64 / 1000) as u32
}

/// Linear gain `0..=u16::MAX` with an expression-pedal taper.
pub fn expression_gain(value: u8) -> u16 {
    let v = value.min(MAX_VALUE) as u32;
    (((v * v) << 1) + v * 262) as u16
}

/// Auto-pan width in percent: rises to 100 at mid travel, then wraps to the
/// negative side so the top of the range reverses the pan direction.
pub fn autopan_width(value: u8) -> i8 {
    let p = value.min(MAX_VALUE) as i32 * 200 / 128;
    (if p > 100 { p - 200 } else { p }) as i8
}

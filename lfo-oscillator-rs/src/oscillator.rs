//! Multi-channel fixed-point wavetable oscillator.
//!
//! A single `u32` phase accumulator covers one table period: the top
//! [`TABLE_ORDER`] bits index [`SINE_TABLE`], the next 16 bits are the
//! interpolation fraction. Wrapping addition makes the period normalisation
//! free, for the accumulator and for every `phase + offset` sum alike.
//!
//! Each of the `N` channels reads the table at its own phase offset, so all
//! channels stay phase-locked to the one accumulator.
//!
//! Frequency (as a per-tick phase delta) and every channel offset can be
//! changed immediately or ramped linearly over a number of ticks. A ramp
//! reaches its target exactly on its last tick; retargeting mid-ramp starts
//! the new ramp from wherever the old one had got to.
//!
//! # Example
//!
//! ```
//! use lfo_oscillator::{phase_from_degrees, PhaseOscillator};
//!
//! let mut lfo = PhaseOscillator::<2>::new(1000, 1.0);
//! lfo.set_phase_offset(1, phase_from_degrees(180.0));
//! lfo.ramp_frequency(2.0, 100);
//!
//! for _ in 0..100 {
//!     lfo.advance();
//! }
//! let left = lfo.sample_ip(0);
//! let right = lfo.sample_ip(1);
//! assert!((left + right).abs() < 0.01);
//! ```

use crate::sine_table::{BIT_DEPTH, SINE_TABLE, TABLE_ORDER, TABLE_SIZE};

/// Accumulator value for one full period.
const PERIOD: f64 = 4_294_967_296.0;

const INDEX_SHIFT: u32 = 32 - TABLE_ORDER;
const FRACTION_SHIFT: u32 = INDEX_SHIFT - 16;

/// Fractional bits carried by a ramp's running total.
const RAMP_FRACTION_BITS: u32 = 32;

/// Maps a table entry onto `[-1, 1)`.
const SCALE: f32 = 2.0 / (1u32 << BIT_DEPTH) as f32;

/// Convert degrees to an accumulator offset. Any angle is accepted and
/// reduced into one period.
pub fn phase_from_degrees(degrees: f32) -> u32 {
    let turns = degrees as f64 / 360.0;
    let mut fraction = turns - (turns as i64) as f64;
    if fraction < 0.0 {
        fraction += 1.0;
    }
    (fraction * PERIOD) as u64 as u32
}

// ── Ramp ─────────────────────────────────────────────────────────────────

/// Linear move between two accumulator-domain values.
///
/// The running total is kept in 32.32 fixed point, so the per-tick error
/// never accumulates past one unit.
#[derive(Debug, Clone, Copy, Default)]
struct Ramp {
    start: u32,
    target: u32,
    travelled: i64,
    step: i64,
    remaining: u32,
}

impl Ramp {
    const fn fixed(value: u32) -> Self {
        Self {
            start: value,
            target: value,
            travelled: 0,
            step: 0,
            remaining: 0,
        }
    }

    fn current(&self) -> u32 {
        self.start.wrapping_add((self.travelled >> RAMP_FRACTION_BITS) as u32)
    }

    /// Head for `target` over `samples` ticks, taking the shorter way round.
    fn retarget(&mut self, target: u32, samples: u32) {
        let from = self.current();
        if samples == 0 {
            *self = Self::fixed(target);
            return;
        }
        let distance = target.wrapping_sub(from) as i32 as i64;
        *self = Self {
            start: from,
            target,
            travelled: 0,
            step: (distance << RAMP_FRACTION_BITS) / samples as i64,
            remaining: samples,
        };
    }

    fn snap(&mut self) {
        *self = Self::fixed(self.target);
    }

    fn tick(&mut self) {
        match self.remaining {
            0 => {}
            1 => self.snap(),
            _ => {
                self.remaining -= 1;
                self.travelled += self.step;
            }
        }
    }

    fn is_ramping(&self) -> bool {
        self.remaining > 0
    }
}

// ── Oscillator ───────────────────────────────────────────────────────────

/// Phase-locked `N`-channel sine oscillator.
#[derive(Debug, Clone)]
pub struct PhaseOscillator<const N: usize> {
    sample_rate: u32,
    frequency: f32,
    phase: u32,
    delta: Ramp,
    offsets: [Ramp; N],
}

impl<const N: usize> PhaseOscillator<N> {
    /// Channels per oscillator.
    pub const CHANNELS: usize = N;

    /// Create an oscillator ticking `sample_rate` times per second.
    ///
    /// All channel offsets start at 0.
    pub fn new(sample_rate: u32, frequency: f32) -> Self {
        let sample_rate = sample_rate.max(1);
        Self {
            sample_rate,
            frequency,
            phase: 0,
            delta: Ramp::fixed(delta_for(frequency, sample_rate)),
            offsets: [Ramp::fixed(0); N],
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Target frequency in Hz.
    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Per-tick accumulator increment currently in effect.
    pub fn phase_delta(&self) -> u32 {
        self.delta.current()
    }

    /// Raw accumulator.
    pub fn phase(&self) -> u32 {
        self.phase
    }

    /// Whether any frequency or offset ramp is still running.
    pub fn is_ramping(&self) -> bool {
        self.delta.is_ramping() || self.offsets.iter().any(Ramp::is_ramping)
    }

    /// Jump to `frequency` and finish every ramp in progress.
    ///
    /// [`frequency`](Self::frequency) reports `frequency` as given; the
    /// per-tick phase delta derived from it is clamped to `[0, i32::MAX]`,
    /// i.e. at most half a cycle per tick.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.delta = Ramp::fixed(delta_for(frequency, self.sample_rate));
        for offset in self.offsets.iter_mut() {
            offset.snap();
        }
    }

    /// Move linearly to `frequency` over `samples` ticks.
    ///
    /// `samples == 0` behaves like [`set_frequency`](Self::set_frequency).
    pub fn ramp_frequency(&mut self, frequency: f32, samples: u32) {
        if samples == 0 {
            self.set_frequency(frequency);
            return;
        }
        self.frequency = frequency;
        self.delta.retarget(delta_for(frequency, self.sample_rate), samples);
    }

    /// Offset of `channel` currently in effect. Out-of-range channels read 0.
    pub fn phase_offset(&self, channel: usize) -> u32 {
        self.offsets.get(channel).map_or(0, Ramp::current)
    }

    /// Jump `channel` to `offset`.
    pub fn set_phase_offset(&mut self, channel: usize, offset: u32) {
        self.ramp_phase_offset(channel, offset, 0);
    }

    /// Move `channel` to `offset` over `samples` ticks, the short way round.
    pub fn ramp_phase_offset(&mut self, channel: usize, offset: u32, samples: u32) {
        match self.offsets.get_mut(channel) {
            Some(ramp) => ramp.retarget(offset, samples),
            None => {
                #[cfg(feature = "defmt")]
                defmt::warn!("phase offset for channel {} ignored ({} channels)", channel, N);
            }
        }
    }

    /// One tick: step the accumulator, then every running ramp.
    pub fn advance(&mut self) {
        self.phase = self.phase.wrapping_add(self.delta.current());
        self.delta.tick();
        for offset in self.offsets.iter_mut() {
            offset.tick();
        }
    }

    /// Nearest table entry for `channel`.
    pub fn raw(&self, channel: usize) -> u16 {
        let phase = self.channel_phase(channel);
        SINE_TABLE[(phase >> INDEX_SHIFT) as usize]
    }

    /// Linearly interpolated table value for `channel`.
    pub fn raw_ip(&self, channel: usize) -> u16 {
        let (a, b, fraction) = self.neighbours(channel);
        (a + (((b - a) * fraction) >> 16)) as u16
    }

    /// Nearest-entry sample in `[-1, 1)`.
    pub fn sample(&self, channel: usize) -> f32 {
        self.raw(channel) as f32 * SCALE - 1.0
    }

    /// Interpolated sample in `[-1, 1)`.
    pub fn sample_ip(&self, channel: usize) -> f32 {
        let (a, b, fraction) = self.neighbours(channel);
        let alpha = fraction as f32 / 65536.0;
        (a as f32 * (1.0 - alpha) + b as f32 * alpha) * SCALE - 1.0
    }

    fn channel_phase(&self, channel: usize) -> u32 {
        self.phase.wrapping_add(self.phase_offset(channel))
    }

    fn neighbours(&self, channel: usize) -> (i32, i32, i32) {
        let phase = self.channel_phase(channel);
        let index = (phase >> INDEX_SHIFT) as usize;
        let next = (index + 1) % TABLE_SIZE;
        let fraction = ((phase >> FRACTION_SHIFT) & 0xFFFF) as i32;
        (SINE_TABLE[index] as i32, SINE_TABLE[next] as i32, fraction)
    }
}

/// Per-tick accumulator increment for `frequency`.
fn delta_for(frequency: f32, sample_rate: u32) -> u32 {
    let frequency = if frequency > 0.0 { frequency as f64 } else { 0.0 };
    let delta = frequency * PERIOD / sample_rate as f64;
    // Keeps every ramp distance inside i32.
    (delta as u64).min(i32::MAX as u64) as u32
}

// ── Unit Tests ───────────────────────────────────────────────────────────

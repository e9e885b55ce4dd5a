//! Phase-locked low-frequency oscillator engine.
//!
//! - **[`oscillator`]**: [`PhaseOscillator`], an `N`-channel sine oscillator
//!   on a single fixed-point phase accumulator, with linear frequency and
//!   phase-offset ramps.
//! - **[`sine_table`]**: the 256-entry, 16-bit lookup table it reads.
//! - **[`curves`]**: mappings from 7-bit controller values to rate, glide
//!   time, gain and pan width.
//!
//! Everything is `no_std`, allocation free and safe to call from an audio
//! interrupt: [`PhaseOscillator::advance`] is a handful of integer adds.
//!
//! # Features
//!
//! - **`defmt`**: warnings for ignored out-of-range channel requests.

#![no_std]

pub mod curves;
pub mod oscillator;
pub mod sine_table;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use oscillator::{phase_from_degrees, PhaseOscillator};
pub use sine_table::{SINE_TABLE, TABLE_SIZE};

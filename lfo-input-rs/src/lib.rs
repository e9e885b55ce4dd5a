//! Input front ends for the LFO module: quadrature encoder, push button and
//! potentiometer.
//!
//! # Architecture
//!
//! - **[`quadrature`]**: transition-table decoder. [`EncoderChannel`] shares
//!   it between a pin-change handler and the main loop under a critical
//!   section; [`PolledDecoder`] samples the pins on demand.
//! - **[`counter`]**: bounded wrap-or-saturate [`Counter`], also used as the
//!   saved-state snapshot.
//! - **[`button`]**: debounced [`PressDetector`] reporting taps and long
//!   presses.
//! - **[`rotary`]**: [`RotaryEncoder`] ties the three together and exposes the
//!   [`Rotary`] trait consumed by the settings menu.
//! - **[`watch`]**: async task body feeding an [`EncoderChannel`] from pin
//!   edges.
//! - **[`pot`]**: hysteresis filter for potentiometer readings.
//!
//! # Quick start
//!
//! ```ignore
//! use lfo_input::{Button, ButtonConfig, EncoderChannel, Rotary, RotaryEncoder};
//!
//! static ENCODER: EncoderChannel = EncoderChannel::new();
//!
//! // Spawn a task running `lfo_input::watch_encoder_pins(pin_a, pin_b, &ENCODER)`.
//!
//! let mut rotary = RotaryEncoder::interrupt_driven(&ENCODER, Button::new(push, ButtonConfig::default()));
//! rotary.set_counter_range(0, 7, true);
//! if rotary.update(now_ms)? && rotary.take_tap() {
//!     // ...
//! }
//! ```
//!
//! # Features
//!
//! - **`defmt`**: [`defmt::Format`] on public types and debug logging.

#![no_std]

pub mod button;
pub mod counter;
pub mod error;
pub mod pot;
pub mod quadrature;
pub mod rotary;
pub mod watch;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use button::{Button, ButtonConfig, PressDetector, PressEvent};
pub use counter::Counter;
pub use error::InputError;
pub use pot::{PotConfig, PotFilter};
pub use quadrature::{DetentSource, EncoderChannel, PinState, PolledDecoder, QuadratureDecoder};
pub use rotary::{Rotary, RotaryEncoder};
pub use watch::watch_encoder_pins;

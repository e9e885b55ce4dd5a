//! Push-button rotary encoder.
//!
//! [`RotaryEncoder`] combines a [`DetentSource`] (interrupt-fed or polled), a
//! bounded [`Counter`] and a [`Button`]. The main loop calls
//! [`update`](RotaryEncoder::update) once per tick; consumers such as the
//! settings menu talk to it through the [`Rotary`] trait so they can be
//! driven by a fake in tests.
//!
//! # Example
//!
//! ```ignore
//! static ENCODER: EncoderChannel = EncoderChannel::new();
//!
//! let button = Button::new(push_pin, ButtonConfig::default());
//! let mut rotary = RotaryEncoder::new(&ENCODER, button);
//! rotary.set_counter_range(0, 127, false);
//!
//! loop {
//!     if rotary.update(now_ms())? {
//!         defmt::info!("counter = {}", rotary.counter());
//!     }
//! }
//! ```

use embedded_hal::digital::InputPin;

use crate::button::{Button, PressEvent};
use crate::counter::Counter;
use crate::error::InputError;
use crate::quadrature::{DetentSource, EncoderChannel, PolledDecoder};

/// The operations a menu needs from a push-button encoder.
pub trait Rotary {
    /// Current counter value.
    fn counter(&self) -> i32;

    /// Snapshot of value, range and wrap flag.
    fn save_state(&self) -> Counter;

    /// Restore a snapshot taken with [`save_state`](Self::save_state).
    fn restore_state(&mut self, state: Counter);

    /// See [`Counter::set_range`].
    fn set_counter_range(&mut self, minimum: i32, maximum: i32, wrap: bool);

    /// Set the counter (clamped) and discard pending motion.
    fn reset_counter(&mut self, value: i32);

    /// Consume a pending tap, if there is one.
    fn take_tap(&mut self) -> bool;

    /// Drop any pending button event.
    fn clear_events(&mut self);
}

/// Encoder with push button and bounded counter.
pub struct RotaryEncoder<S, P> {
    source: S,
    button: Button<P>,
    counter: Counter,
    was_turned: bool,
}

impl<P: InputPin> RotaryEncoder<&'static EncoderChannel, P> {
    /// Encoder fed by a pin-change interrupt or [`crate::watch::watch_encoder_pins`].
    pub fn interrupt_driven(channel: &'static EncoderChannel, button: Button<P>) -> Self {
        Self::new(channel, button)
    }
}

impl<A: InputPin, B: InputPin, P: InputPin> RotaryEncoder<PolledDecoder<A, B>, P> {
    /// Encoder whose pins are sampled on every [`update`](Self::update).
    pub fn polled(pin_a: A, pin_b: B, button: Button<P>) -> Result<Self, InputError> {
        Ok(Self::new(PolledDecoder::new(pin_a, pin_b)?, button))
    }
}

impl<S, P> RotaryEncoder<S, P>
where
    S: DetentSource,
    P: InputPin,
{
    /// Counter starts at 0 spanning the full `i32` range, wrapping.
    pub fn new(source: S, button: Button<P>) -> Self {
        Self {
            source,
            button,
            counter: Counter::new(),
            was_turned: false,
        }
    }

    /// Drain detents into the counter and sample the button.
    ///
    /// Returns `true` if the counter changed or the button produced an event.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Pin`] if a polled encoder pin or the button pin
    /// cannot be read. Detents drained before the failure are kept.
    pub fn update(&mut self, now_ms: u64) -> Result<bool, InputError> {
        let detents = self.source.take_detents()?;
        self.was_turned = self.counter.apply(detents);
        let event = self.button.update(now_ms)?;
        Ok(self.was_turned || event.is_some())
    }

    /// Whether the last [`update`](Self::update) changed the counter.
    pub fn was_turned(&self) -> bool {
        self.was_turned
    }

    /// Consume the pending button event.
    pub fn take_event(&mut self) -> Option<PressEvent> {
        self.button.detector_mut().take_event()
    }

    pub fn button(&self) -> &Button<P> {
        &self.button
    }

    pub fn counter_maximum(&self) -> i32 {
        self.counter.maximum()
    }
}

impl<S, P> Rotary for RotaryEncoder<S, P>
where
    S: DetentSource,
    P: InputPin,
{
    fn counter(&self) -> i32 {
        self.counter.value()
    }

    fn save_state(&self) -> Counter {
        self.counter
    }

    fn restore_state(&mut self, state: Counter) {
        self.counter = state;
    }

    fn set_counter_range(&mut self, minimum: i32, maximum: i32, wrap: bool) {
        self.counter.set_range(minimum, maximum, wrap);
    }

    fn reset_counter(&mut self, value: i32) {
        self.counter.reset(value);
        self.source.clear();
        self.was_turned = false;
    }

    fn take_tap(&mut self) -> bool {
        matches!(self.take_event(), Some(PressEvent::Tap))
    }

    fn clear_events(&mut self) {
        self.button.detector_mut().clear();
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

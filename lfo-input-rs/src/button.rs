//! Debounced push-button with tap and long-press detection.
//!
//! [`PressDetector`] is pure logic: feed it raw "is pressed" samples with a
//! millisecond timestamp and it reports [`PressEvent`]s. [`Button`] wraps it
//! around an [`InputPin`].
//!
//! A press that is released before `long_press_ms` produces a
//! [`PressEvent::Tap`] on release. A press held for `long_press_ms` produces
//! a [`PressEvent::LongPress`] while still held, and its release produces
//! nothing.

use embedded_hal::digital::InputPin;

use crate::error::InputError;

/// What a completed (or held) press amounted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PressEvent {
    /// Short press, reported on release.
    Tap,
    /// Press held past the long-press threshold, reported while held.
    LongPress,
}

/// Button timing and polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonConfig {
    /// Pin reads low while pressed (switch to ground with a pull-up).
    pub active_low: bool,
    /// A level must be stable this long before it is believed.
    pub debounce_ms: u32,
    /// Hold time that turns a press into a long press.
    pub long_press_ms: u32,
}

impl Default for ButtonConfig {
    fn default() -> Self {
        Self {
            active_low: true,
            debounce_ms: 10,
            long_press_ms: 600,
        }
    }
}

/// Debounce and press classification state machine.
#[derive(Debug, Clone)]
pub struct PressDetector {
    config: ButtonConfig,
    stable: bool,
    candidate: bool,
    candidate_since: u64,
    pressed_at: u64,
    long_press_sent: bool,
    pending: Option<PressEvent>,
}

impl PressDetector {
    pub fn new(config: ButtonConfig) -> Self {
        Self {
            config,
            stable: false,
            candidate: false,
            candidate_since: 0,
            pressed_at: 0,
            long_press_sent: false,
            pending: None,
        }
    }

    /// Feed one raw sample.
    ///
    /// Returns the event produced by this sample, if any. The event is also
    /// latched until [`take_event`](Self::take_event) or [`clear`](Self::clear).
    pub fn update(&mut self, pressed: bool, now_ms: u64) -> Option<PressEvent> {
        if pressed != self.candidate {
            self.candidate = pressed;
            self.candidate_since = now_ms;
        }

        let settled = now_ms.saturating_sub(self.candidate_since) >= self.config.debounce_ms as u64;
        let event = if self.candidate != self.stable && settled {
            self.stable = self.candidate;
            if self.stable {
                self.pressed_at = now_ms;
                self.long_press_sent = false;
                None
            } else if self.long_press_sent {
                None
            } else {
                Some(PressEvent::Tap)
            }
        } else if self.stable
            && !self.long_press_sent
            && now_ms.saturating_sub(self.pressed_at) >= self.config.long_press_ms as u64
        {
            self.long_press_sent = true;
            Some(PressEvent::LongPress)
        } else {
            None
        };

        if event.is_some() {
            self.pending = event;
        }
        event
    }

    /// Debounced level.
    pub fn is_pressed(&self) -> bool {
        self.stable
    }

    /// Latched event without consuming it.
    pub fn peek_event(&self) -> Option<PressEvent> {
        self.pending
    }

    /// Consume the latched event.
    pub fn take_event(&mut self) -> Option<PressEvent> {
        self.pending.take()
    }

    /// Drop any latched event.
    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn config(&self) -> &ButtonConfig {
        &self.config
    }
}

/// A [`PressDetector`] reading its samples from a GPIO pin.
pub struct Button<P> {
    pin: P,
    detector: PressDetector,
}

impl<P: InputPin> Button<P> {
    pub fn new(pin: P, config: ButtonConfig) -> Self {
        Self {
            pin,
            detector: PressDetector::new(config),
        }
    }

    /// Sample the pin once and advance the detector.
    ///
    /// # Errors
    ///
    /// Returns [`InputError::Pin`] if the pin cannot be read.
    pub fn update(&mut self, now_ms: u64) -> Result<Option<PressEvent>, InputError> {
        let high = self.pin.is_high().map_err(InputError::pin)?;
        let pressed = high != self.detector.config().active_low;
        Ok(self.detector.update(pressed, now_ms))
    }

    pub fn detector(&self) -> &PressDetector {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut PressDetector {
        &mut self.detector
    }

    /// Give the pin back.
    pub fn release(self) -> P {
        self.pin
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

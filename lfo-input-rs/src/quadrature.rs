//! Quadrature decoding.
//!
//! The decoder turns a stream of sampled {A, B} pin levels into signed
//! half-steps. Each (old, new) pair indexes [`TRANSITIONS`]: the four legal
//! single-bit changes count as ±1, everything else (no change, or both pins
//! flipping at once) counts as 0. That is what rejects contact bounce.
//!
//! Two [`DetentSource`]s are provided:
//!
//! - [`EncoderChannel`] is shared between a pin-change interrupt (or the async
//!   watcher in [`crate::watch`]) and the main loop. Every access runs inside a
//!   [`critical_section`], which also stops a decode step from being re-entered
//!   by a second pin-change interrupt on the same encoder.
//! - [`PolledDecoder`] owns both pins and samples them whenever the main loop
//!   asks for detents.

use core::cell::Cell;

use critical_section::Mutex;
use embedded_hal::digital::InputPin;

use crate::error::InputError;

/// Half-steps per mechanical detent.
pub const HALF_STEPS_PER_DETENT: i32 = 2;

/// Half-step contribution indexed by `[old][new]` pin state, where a state is
/// `(A << 1) | B`.
pub const TRANSITIONS: [[i8; 4]; 4] = [
    [0, 1, -1, 0],
    [-1, 0, 0, 1],
    [1, 0, 0, -1],
    [0, -1, 1, 0],
];

/// Levels of the A and B pins packed as `(A << 1) | B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinState(u8);

impl PinState {
    /// Pack two pin levels.
    pub const fn new(a: bool, b: bool) -> Self {
        Self(((a as u8) << 1) | b as u8)
    }

    /// Packed 2-bit value.
    pub const fn bits(self) -> u8 {
        self.0
    }
}

/// Transition-table decoder with a signed half-step accumulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuadratureDecoder {
    pin_state: PinState,
    half_steps: i32,
}

impl QuadratureDecoder {
    /// Create a decoder whose last observed levels are `initial`.
    pub const fn new(initial: PinState) -> Self {
        Self {
            pin_state: initial,
            half_steps: 0,
        }
    }

    /// Observe a new pin sample and return its contribution (-1, 0 or +1).
    pub fn step(&mut self, new_state: PinState) -> i8 {
        let delta = TRANSITIONS[self.pin_state.0 as usize][new_state.0 as usize];
        self.half_steps = self.half_steps.wrapping_add(delta as i32);
        self.pin_state = new_state;
        delta
    }

    /// Last observed pin levels.
    pub fn pin_state(&self) -> PinState {
        self.pin_state
    }

    /// Half-steps accumulated since the last drain.
    pub fn pending_half_steps(&self) -> i32 {
        self.half_steps
    }

    /// Drain whole detents.
    ///
    /// Division truncates toward zero and the odd half-step stays in the
    /// accumulator, so a detent split across two drains is still counted once.
    pub fn take_detents(&mut self) -> i32 {
        let detents = self.half_steps / HALF_STEPS_PER_DETENT;
        self.half_steps -= detents * HALF_STEPS_PER_DETENT;
        detents
    }

    /// Forget pending half-steps and resynchronise to `state`.
    pub fn reset(&mut self, state: PinState) {
        self.pin_state = state;
        self.half_steps = 0;
    }

    /// Forget pending half-steps, keeping the last pin levels.
    pub fn clear(&mut self) {
        self.half_steps = 0;
    }
}

/// Anything that can hand out whole encoder detents.
pub trait DetentSource {
    /// Drain detents accumulated since the previous call.
    fn take_detents(&mut self) -> Result<i32, InputError>;

    /// Discard any pending half-steps.
    fn clear(&mut self);
}

// ── Interrupt-shared decoder ─────────────────────────────────────────────

/// Decoder state shared between pin-change handlers and the main loop.
///
/// Intended to live in a `static` for the lifetime of the firmware:
///
/// ```
/// use lfo_input::EncoderChannel;
///
/// static ENCODER: EncoderChannel = EncoderChannel::new();
///
/// // Pin-change handler:
/// ENCODER.on_pin_change(false, true);
/// ENCODER.on_pin_change(true, true);
///
/// // Main loop:
/// assert_eq!(ENCODER.take_detents(), 1);
/// ```
pub struct EncoderChannel {
    decoder: Mutex<Cell<QuadratureDecoder>>,
}

impl EncoderChannel {
    /// Create a channel assuming both pins start low.
    pub const fn new() -> Self {
        Self {
            decoder: Mutex::new(Cell::new(QuadratureDecoder::new(PinState::new(false, false)))),
        }
    }

    /// Record the idle pin levels without counting a transition.
    pub fn prime(&self, a: bool, b: bool) {
        self.with_decoder(|decoder| decoder.reset(PinState::new(a, b)));
    }

    /// Decode step, called on every edge of either pin.
    pub fn on_pin_change(&self, a: bool, b: bool) {
        self.with_decoder(|decoder| {
            decoder.step(PinState::new(a, b));
        });
    }

    /// Read-and-zero the accumulated half-steps, returning whole detents.
    pub fn take_detents(&self) -> i32 {
        self.with_decoder(QuadratureDecoder::take_detents)
    }

    /// Discard pending half-steps.
    pub fn clear(&self) {
        self.with_decoder(QuadratureDecoder::clear);
    }

    /// Half-steps not yet drained.
    pub fn pending_half_steps(&self) -> i32 {
        critical_section::with(|cs| self.decoder.borrow(cs).get().pending_half_steps())
    }

    fn with_decoder<R>(&self, f: impl FnOnce(&mut QuadratureDecoder) -> R) -> R {
        critical_section::with(|cs| {
            let cell = self.decoder.borrow(cs);
            let mut decoder = cell.get();
            let result = f(&mut decoder);
            cell.set(decoder);
            result
        })
    }
}

impl Default for EncoderChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl DetentSource for &EncoderChannel {
    fn take_detents(&mut self) -> Result<i32, InputError> {
        Ok(EncoderChannel::take_detents(self))
    }

    fn clear(&mut self) {
        EncoderChannel::clear(self);
    }
}

// ── Polled decoder ───────────────────────────────────────────────────────

/// Decoder that owns the encoder pins and samples them on demand.
///
/// Each [`take_detents`](DetentSource::take_detents) call samples the pins
/// once; call [`poll`](Self::poll) more often when the main loop is slow
/// relative to the rotation speed.
pub struct PolledDecoder<A, B> {
    pin_a: A,
    pin_b: B,
    decoder: QuadratureDecoder,
    resync: bool,
}

impl<A, B> PolledDecoder<A, B>
where
    A: InputPin,
    B: InputPin,
{
    /// Take ownership of the pins and record their current levels.
    pub fn new(mut pin_a: A, mut pin_b: B) -> Result<Self, InputError> {
        let initial = read_pins(&mut pin_a, &mut pin_b)?;
        Ok(Self {
            pin_a,
            pin_b,
            decoder: QuadratureDecoder::new(initial),
            resync: false,
        })
    }

    /// Sample both pins and run one decode step.
    pub fn poll(&mut self) -> Result<(), InputError> {
        let state = read_pins(&mut self.pin_a, &mut self.pin_b)?;
        if self.resync {
            self.decoder.reset(state);
            self.resync = false;
        } else {
            self.decoder.step(state);
        }
        Ok(())
    }

    /// Give the pins back.
    pub fn release(self) -> (A, B) {
        (self.pin_a, self.pin_b)
    }
}

impl<A, B> DetentSource for PolledDecoder<A, B>
where
    A: InputPin,
    B: InputPin,
{
    fn take_detents(&mut self) -> Result<i32, InputError> {
        self.poll()?;
        Ok(self.decoder.take_detents())
    }

    fn clear(&mut self) {
        // The next poll re-reads the levels instead of counting against stale ones.
        self.decoder.clear();
        self.resync = true;
    }
}

fn read_pins<A: InputPin, B: InputPin>(pin_a: &mut A, pin_b: &mut B) -> Result<PinState, InputError> {
    let a = pin_a.is_high().map_err(InputError::pin)?;
    let b = pin_b.is_high().map_err(InputError::pin)?;
    Ok(PinState::new(a, b))
}

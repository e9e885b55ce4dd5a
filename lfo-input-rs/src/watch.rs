//! Async pin-change front end for [`EncoderChannel`].
//!
//! On an executor there is no need to hook the GPIO interrupt by hand: the
//! HAL's [`Wait`] futures are woken by that interrupt. [`watch_encoder_pins`]
//! waits for an edge on either pin and runs one decode step per wake-up.

use embassy_futures::select::{select, Either};
use embedded_hal::digital::InputPin;
use embedded_hal_async::digital::Wait;

use crate::error::InputError;
use crate::quadrature::EncoderChannel;

/// Feed every edge on either encoder pin into `channel`.
///
/// Only returns if a pin stops responding.
///
/// # Errors
///
/// Returns [`InputError::Pin`] when reading or waiting on a pin fails.
pub async fn watch_encoder_pins<A, B>(
    mut pin_a: A,
    mut pin_b: B,
    channel: &EncoderChannel,
) -> Result<(), InputError>
where
    A: InputPin + Wait,
    B: InputPin + Wait,
{
    let a = pin_a.is_high().map_err(InputError::pin)?;
    let b = pin_b.is_high().map_err(InputError::pin)?;
    channel.prime(a, b);

    #[cfg(feature = "defmt")]
    defmt::debug!("encoder watcher primed at a={} b={}", a, b);

    loop {
        match select(pin_a.wait_for_any_edge(), pin_b.wait_for_any_edge()).await {
            Either::First(result) => result.map_err(InputError::pin)?,
            Either::Second(result) => result.map_err(InputError::pin)?,
        }
        let a = pin_a.is_high().map_err(InputError::pin)?;
        let b = pin_b.is_high().map_err(InputError::pin)?;
        channel.on_pin_change(a, b);
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

//! Error types for the input front ends.

use core::fmt;

use embedded_hal::digital::ErrorKind;

/// Errors that can occur when sampling encoder or button pins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    /// A GPIO read failed.
    Pin(ErrorKind),
}

impl InputError {
    /// Collapse a HAL-specific pin error into its portable [`ErrorKind`].
    pub(crate) fn pin<E: embedded_hal::digital::Error>(error: E) -> Self {
        InputError::Pin(error.kind())
    }
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            InputError::Pin(kind) => write!(f, "GPIO read error: {:?}", kind),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for InputError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            InputError::Pin(_) => defmt::write!(f, "GPIO read error"),
        }
    }
}

//! Failures reported by [`OledDriver`](crate::OledDriver).

use core::fmt;

use display_interface::DisplayError;

/// Why a bring-up or frame transfer did not reach the panel.
///
/// Drawing only touches RAM, so these come from `init()` and `present()`.
#[derive(Debug)]
pub enum OledError {
    /// The panel ignored or rejected its power-on command sequence.
    PanelSilent,
    /// `present()` was called before a successful `init()`.
    NotReady,
    /// A frame transfer failed part way; the frame stays pending.
    Bus(DisplayError),
}

impl OledError {
    /// Whether calling `present()` again may succeed without a new `init()`.
    pub fn is_transient(&self) -> bool {
        matches!(self, OledError::Bus(_))
    }
}

impl From<DisplayError> for OledError {
    fn from(error: DisplayError) -> Self {
        OledError::Bus(error)
    }
}

impl fmt::Display for OledError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OledError::PanelSilent => f.write_str("panel did not acknowledge init sequence"),
            OledError::NotReady => f.write_str("frame presented before init"),
            OledError::Bus(error) => write!(f, "frame transfer failed: {:?}", error),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for OledError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            OledError::PanelSilent => defmt::write!(f, "panel silent at init"),
            OledError::NotReady => defmt::write!(f, "present before init"),
            OledError::Bus(_) => defmt::write!(f, "frame transfer failed"),
        }
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    extern crate std;

    use super::*;
    use std::string::ToString;

    #[test]
    fn bus_errors_convert_and_are_transient() {
        let error: OledError = DisplayError::BusWriteError.into();
        assert!(matches!(error, OledError::Bus(DisplayError::BusWriteError)));
        assert!(error.is_transient());
    }

    #[test]
    fn lifecycle_errors_need_init() {
        assert!(!OledError::PanelSilent.is_transient());
        assert!(!OledError::NotReady.is_transient());
    }

    #[test]
    fn messages_name_the_failing_stage() {
        assert_eq!(OledError::NotReady.to_string(), "frame presented before init");
        assert!(OledError::Bus(DisplayError::BusWriteError)
            .to_string()
            .starts_with("frame transfer failed"));
    }
}

//! SSD1306 (128×64) back end for the LFO settings menu.
//!
//! This crate provides [`OledDriver`], a wrapper around the [`ssd1306`]
//! crate in async buffered-graphics mode that implements
//! [`MenuDisplay`](lfo_settings_menu::MenuDisplay). The menu draws
//! synchronously into the frame buffer; the UI loop then calls
//! [`OledDriver::present`] to flush whatever frame the menu last showed.
//!
//! # Quick Start
//!
//! ```ignore
//! use lfo_oled_display::{DisplayConfig, OledDriver};
//! use lfo_settings_menu::MenuNavigator;
//!
//! let mut oled = OledDriver::new(i2c, 0x3C, DisplayConfig::default());
//! oled.init().await?;
//! let mut menu = MenuNavigator::new(&TREE, oled);
//!
//! loop {
//!     ticker.next().await;
//!     menu.update(&mut rotary, &mut hooks);
//!     menu.display_mut().present().await?;
//! }
//! ```
//!
//! # Crate Features
//!
//! - **`defmt`**: structured logging via [`defmt`].

#![no_std]

pub mod driver;
pub mod error;
pub mod layout;

// ── Re-exports for convenience ───────────────────────────────────────────

pub use driver::OledDriver;
pub use error::OledError;
pub use layout::{draw_text, font_for_height, DisplayConfig};

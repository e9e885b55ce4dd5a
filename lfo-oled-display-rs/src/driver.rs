//! SSD1306 driver in async buffered graphics mode, usable as a menu display.
//!
//! [`OledDriver`] keeps the panel lifecycle explicit: construction without
//! I2C traffic, an async [`init`](OledDriver::init), synchronous drawing into
//! the frame buffer through [`MenuDisplay`], and an async
//! [`present`](OledDriver::present) that flushes only frames the menu has
//! marked as shown.

use display_interface_i2c::I2CInterface;
use embedded_graphics::mono_font::MonoFont;
use embedded_hal_async::i2c::I2c;
use lfo_settings_menu::{Align, MenuDisplay};
use ssd1306::{mode::BufferedGraphicsModeAsync, prelude::*, I2CDisplayInterface, Ssd1306Async};

use crate::error::OledError;
use crate::layout::{self, DisplayConfig};

/// Concrete display type used internally by [`OledDriver`].
type Display<I2C> =
    Ssd1306Async<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsModeAsync<DisplaySize128x64>>;

/// Async SSD1306 128×64 driver over I2C.
///
/// # Lifecycle
///
/// 1. [`OledDriver::new()`]: no I2C traffic.
/// 2. [`OledDriver::init()`]: sends the SSD1306 initialisation sequence.
/// 3. The menu draws through [`MenuDisplay`] and calls `show()`.
/// 4. [`OledDriver::present()`] from the UI loop transfers the shown frame.
///
/// # Example
///
/// ```no_run
/// use lfo_oled_display::{DisplayConfig, OledDriver};
///
/// # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// let mut oled = OledDriver::new(i2c, 0x3C, DisplayConfig::default());
/// oled.init().await.unwrap();
/// // ... menu.update(&mut rotary, &mut hooks) draws into `oled` ...
/// oled.present().await.unwrap();
/// # }
/// ```
pub struct OledDriver<I2C> {
    display: Display<I2C>,
    config: DisplayConfig,
    font: &'static MonoFont<'static>,
    initialized: bool,
    /// A complete frame is in the buffer and has not been flushed yet.
    frame_ready: bool,
}

impl<I2C> OledDriver<I2C>
where
    I2C: I2c,
{
    /// Construct an uninitialised driver.
    ///
    /// No I2C traffic is generated. Call [`init()`](Self::init) before
    /// [`present()`](Self::present).
    ///
    /// # Arguments
    /// * `i2c`: I2C peripheral (taken for exclusive access).
    /// * `address`: 7-bit device address (typically `0x3C` or `0x3D`).
    /// * `config`: panel geometry and refresh rate.
    pub fn new(i2c: I2C, address: u8, config: DisplayConfig) -> Self {
        let interface = I2CDisplayInterface::new_custom_address(i2c, address);
        let display = Ssd1306Async::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();

        Self {
            display,
            config,
            font: layout::font_for_height(lfo_settings_menu::FONT_HEIGHT),
            initialized: false,
            frame_ready: false,
        }
    }

    /// Initialise the SSD1306 hardware and blank it.
    ///
    /// # Errors
    ///
    /// Returns [`OledError::PanelSilent`] if the panel does not
    /// respond, or [`OledError::Bus`] if the first flush fails.
    pub async fn init(&mut self) -> Result<(), OledError> {
        self.display
            .init()
            .await
            .map_err(|_| OledError::PanelSilent)?;
        self.initialized = true;
        self.display.clear_buffer();
        self.display.flush().await?;
        Ok(())
    }

    /// Flush the frame buffer if the menu has shown a new frame since the
    /// last call. Returns whether anything was sent.
    ///
    /// A full 1024-byte frame takes roughly 20 ms at 400 kHz.
    ///
    /// # Errors
    ///
    /// [`OledError::NotReady`] before a successful
    /// [`init()`](Self::init), or [`OledError::Bus`] on a bus failure.
    /// A failed frame stays pending and is retried on the next call.
    pub async fn present(&mut self) -> Result<bool, OledError> {
        if !self.initialized {
            return Err(OledError::NotReady);
        }
        if !self.frame_ready {
            return Ok(false);
        }
        self.display.flush().await?;
        self.frame_ready = false;
        Ok(true)
    }

    /// Whether a shown frame is waiting for [`present()`](Self::present).
    pub fn frame_pending(&self) -> bool {
        self.frame_ready
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    /// Direct access to the buffered display for `embedded-graphics`
    /// drawing outside the menu. `None` before initialisation.
    pub fn display_mut(&mut self) -> Option<&mut Display<I2C>> {
        self.initialized.then_some(&mut self.display)
    }

    /// No I2C traffic is generated.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}

impl<I2C> MenuDisplay for OledDriver<I2C>
where
    I2C: I2c,
{
    fn clear(&mut self) {
        self.display.clear_buffer();
    }

    fn show(&mut self) {
        self.frame_ready = true;
    }

    fn width(&self) -> i32 {
        self.config.usable_width()
    }

    fn height(&self) -> i32 {
        self.config.height as i32
    }

    fn request_font_height(&mut self, height: i32) {
        self.font = layout::font_for_height(height);
    }

    fn font_height(&self) -> i32 {
        layout::line_height(self.font)
    }

    fn draw_string(&mut self, x: i32, y: i32, text: &str, align: Align) {
        let x = self.config.panel_x(x);
        // Buffered mode only writes RAM; off-panel pixels are clipped.
        if layout::draw_text(&mut self.display, self.font, x, y, text, align).is_err() {
            #[cfg(feature = "defmt")]
            defmt::warn!("OLED draw failed");
        }
    }
}

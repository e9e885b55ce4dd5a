//! Panel geometry, font selection and text placement.
//!
//! Everything here is pure `embedded-graphics` and runs against any
//! [`DrawTarget`], so it is tested on the host with a mock display.

use embedded_graphics::{
    mono_font::{
        ascii::{FONT_10X20, FONT_4X6, FONT_5X8, FONT_6X10, FONT_6X13, FONT_7X14, FONT_9X15, FONT_9X18},
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use lfo_settings_menu::Align;

// ── DisplayConfig ────────────────────────────────────────────────────────

/// Geometry and refresh rate of the menu panel.
///
/// [`DisplayConfig::default()`] matches a 128×64 SSD1306 refreshed at 30 Hz
/// with no margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Panel width in pixels. Default: 128.
    pub width: u32,
    /// Panel height in pixels. Default: 64.
    pub height: u32,
    /// Pixels kept clear at the left and right edges, for panels whose
    /// bezel hides the outer columns. Default: 0.
    pub inset: i32,
    /// How often the UI loop flushes a shown frame, in Hz. Default: 30.
    pub refresh_hz: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: 128,
            height: 64,
            inset: 0,
            refresh_hz: 30,
        }
    }
}

impl DisplayConfig {
    /// Width the menu may draw into: the panel minus both insets.
    pub fn usable_width(&self) -> i32 {
        (self.width as i32 - 2 * self.inset).max(0)
    }

    /// Map a menu x coordinate to a panel column.
    pub fn panel_x(&self, x: i32) -> i32 {
        x + self.inset
    }

    /// Refresh period in milliseconds (`1000 / refresh_hz`).
    pub fn refresh_period_ms(&self) -> u64 {
        1000 / self.refresh_hz.max(1) as u64
    }
}

// ── Fonts ────────────────────────────────────────────────────────────────

/// Fonts on offer, shortest first.
pub static FONTS: [&MonoFont<'static>; 8] = [
    &FONT_4X6, &FONT_5X8, &FONT_6X10, &FONT_6X13, &FONT_7X14, &FONT_9X15, &FONT_9X18, &FONT_10X20,
];

/// The tallest font no taller than `height`, or the shortest font if none
/// fits.
pub fn font_for_height(height: i32) -> &'static MonoFont<'static> {
    FONTS
        .iter()
        .rev()
        .copied()
        .find(|font| font.character_size.height as i32 <= height)
        .unwrap_or(FONTS[0])
}

/// Line height of `font` in pixels.
pub fn line_height(font: &MonoFont<'_>) -> i32 {
    font.character_size.height as i32
}

// ── Text ─────────────────────────────────────────────────────────────────

/// Draw `text` with its top edge at `y`. `x` is the left edge for
/// [`Align::Left`] and the right edge for [`Align::Right`].
pub fn draw_text<D>(
    target: &mut D,
    font: &MonoFont<'_>,
    x: i32,
    y: i32,
    text: &str,
    align: Align,
) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let character_style = MonoTextStyle::new(font, BinaryColor::On);
    let alignment = match align {
        Align::Left => Alignment::Left,
        Align::Right => Alignment::Right,
    };
    let text_style = TextStyleBuilder::new()
        .alignment(alignment)
        .baseline(Baseline::Top)
        .build();
    Text::with_text_style(text, Point::new(x, y), character_style, text_style).draw(target)?;
    Ok(())
}

// ── Tests ────────────────────────────────────────────────────────────────

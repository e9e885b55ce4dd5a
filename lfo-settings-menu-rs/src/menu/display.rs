/// Horizontal anchoring of a string relative to its `x` coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Align {
    /// `x` is the left edge of the text.
    #[default]
    Left,
    /// `x` is the right edge of the text.
    Right,
}

/// Text-only display the menu renders onto.
///
/// Coordinates are pixels with the origin top-left; `y` is the top of the
/// text line. A frame is `clear`, any number of `draw_string`s, then `show`.
pub trait MenuDisplay {
    /// Blank the frame buffer.
    fn clear(&mut self);

    /// Present the frame buffer.
    fn show(&mut self);

    fn width(&self) -> i32;

    fn height(&self) -> i32;

    /// Ask for a font of about `height` pixels; the display picks the
    /// nearest it has and reports it through [`font_height`](Self::font_height).
    fn request_font_height(&mut self, height: i32);

    fn font_height(&self) -> i32;

    fn draw_string(&mut self, x: i32, y: i32, text: &str, align: Align);
}

impl<D: MenuDisplay + ?Sized> MenuDisplay for &mut D {
    fn clear(&mut self) {
        (**self).clear()
    }

    fn show(&mut self) {
        (**self).show()
    }

    fn width(&self) -> i32 {
        (**self).width()
    }

    fn height(&self) -> i32 {
        (**self).height()
    }

    fn request_font_height(&mut self, height: i32) {
        (**self).request_font_height(height)
    }

    fn font_height(&self) -> i32 {
        (**self).font_height()
    }

    fn draw_string(&mut self, x: i32, y: i32, text: &str, align: Align) {
        (**self).draw_string(x, y, text, align)
    }
}

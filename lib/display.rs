use core::fmt::{Arguments, Write};
use embedded_graphics::mono_font::ascii::FONT_10X20;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::{Rgb565, RgbColor};
use embedded_graphics::prelude::{Drawable, Point};
use embedded_graphics::text::{Baseline, Text};
use heapless::String;

use crate::error::{Error, Result};

/// Cells per display line. Position `LINE_WIDTH` is the start of line two.
pub const LINE_WIDTH: u8 = 40;

pub type Line = String<{ LINE_WIDTH as usize }>;

/// Text output used by the measurement engine.
pub trait DisplayAdapter {
    type Error;

    fn clear(&mut self) -> core::result::Result<(), Self::Error>;
    fn set_cursor(&mut self, position: u8) -> core::result::Result<(), Self::Error>;
    fn write_text(&mut self, text: &str) -> core::result::Result<(), Self::Error>;
    fn write_hex_byte(&mut self, byte: u8) -> core::result::Result<(), Self::Error>;

    /// Replace the screen with a single status line.
    fn show_status(&mut self, text: &str) -> core::result::Result<(), Self::Error> {
        self.clear()?;
        self.set_cursor(0)?;
        self.write_text(text)
    }

    /// Replace the screen with two lines.
    fn show_lines(&mut self, first: &str, second: &str) -> core::result::Result<(), Self::Error> {
        self.clear()?;
        self.set_cursor(0)?;
        self.write_text(first)?;
        self.set_cursor(LINE_WIDTH)?;
        self.write_text(second)
    }
}

/// Format into a display line.
pub fn line<LCDER>(args: Arguments<'_>) -> Result<Line, LCDER> {
    let mut buffer = Line::new();
    buffer.write_fmt(args).map_err(|_| Error::BufferWrite)?;
    Ok(buffer)
}

pub fn hex_digits(byte: u8) -> [u8; 2] {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";
    [DIGITS[(byte >> 4) as usize], DIGITS[(byte & 0x0f) as usize]]
}

/// Pixel display the text grid is rendered on.
pub trait Lcd {
    type Error;
    fn clear(&mut self, color: Rgb565) -> core::result::Result<(), Self::Error>;
    fn draw<D: Drawable<Color = Rgb565>>(
        &mut self,
        drawable: &D,
    ) -> core::result::Result<D::Output, Self::Error>;
}

/// Character display emulated on a pixel LCD, one mono font cell per
/// character position.
pub struct TextLcd<LCD> {
    lcd: LCD,
    cursor: u8,
}

impl<LCD> TextLcd<LCD>
where
    LCD: Lcd,
{
    pub fn new(lcd: LCD) -> core::result::Result<Self, LCD::Error> {
        let mut display = TextLcd { lcd, cursor: 0 };
        display.clear()?;
        Ok(display)
    }

    pub fn cursor(&self) -> u8 {
        self.cursor
    }

    fn cell_origin(position: u8) -> Point {
        let column = (position % LINE_WIDTH) as i32;
        let row = (position / LINE_WIDTH) as i32;
        Point::new(
            Offset::LEFT + column * Cell::WIDTH,
            Offset::TOP + row * Cell::HEIGHT,
        )
    }

    fn style() -> MonoTextStyle<'static, Rgb565> {
        MonoTextStyleBuilder::new()
            .font(&FONT_10X20)
            .text_color(Color::TEXT)
            .background_color(Color::BACKGROUND)
            .build()
    }
}

impl<LCD> DisplayAdapter for TextLcd<LCD>
where
    LCD: Lcd,
{
    type Error = LCD::Error;

    fn clear(&mut self) -> core::result::Result<(), Self::Error> {
        self.lcd.clear(Color::BACKGROUND)?;
        self.cursor = 0;
        Ok(())
    }

    fn set_cursor(&mut self, position: u8) -> core::result::Result<(), Self::Error> {
        self.cursor = position;
        Ok(())
    }

    fn write_text(&mut self, text: &str) -> core::result::Result<(), Self::Error> {
        let origin = Self::cell_origin(self.cursor);
        let text = Text::with_baseline(text, origin, Self::style(), Baseline::Top);
        self.lcd.draw(&text)?;
        let len = text.text.chars().count().min(u8::MAX as usize) as u8;
        self.cursor = self.cursor.saturating_add(len);
        Ok(())
    }

    fn write_hex_byte(&mut self, byte: u8) -> core::result::Result<(), Self::Error> {
        let digits = hex_digits(byte);
        // Both digits are ASCII.
        let text = core::str::from_utf8(&digits).unwrap_or("??");
        self.write_text(text)
    }
}

struct Cell;

impl Cell {
    const WIDTH: i32 = 10;
    const HEIGHT: i32 = 20;
}

struct Offset;

impl Offset {
    const LEFT: i32 = 10;
    const TOP: i32 = 10;
}

struct Color;

impl Color {
    const BACKGROUND: Rgb565 = Rgb565::BLACK;
    const TEXT: Rgb565 = Rgb565::YELLOW;
}

//! SSD1306 128x64 OLED adapter.
//!
//! Implements [`DisplayPort`]: each [`Frame`] line is drawn with the 6x10
//! mono font on a 16-pixel row pitch, then the buffer is flushed over I2C.

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};
use embedded_hal::i2c::I2c;
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::{I2CDisplayInterface, Ssd1306};

use crate::app::ports::DisplayPort;
use crate::display::Frame;
use crate::error::{Error, Result};

const ROW_PITCH_PX: i32 = 16;

type Panel<I> = Ssd1306<I2CInterface<I>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

pub struct OledDisplay<I: I2c> {
    panel: Panel<I>,
}

impl<I: I2c> OledDisplay<I> {
    /// Bring up the panel at the default 0x3C address.
    pub fn new(i2c: I) -> Result<Self> {
        let interface = I2CDisplayInterface::new(i2c);
        let mut panel = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
            .into_buffered_graphics_mode();
        panel.init().map_err(|_| Error::Display)?;
        Ok(Self { panel })
    }
}

impl<I: I2c> DisplayPort for OledDisplay<I> {
    fn show(&mut self, frame: &Frame) -> Result<()> {
        let style = MonoTextStyle::new(&FONT_6X10, BinaryColor::On);
        self.panel.clear_buffer();
        for (row, line) in frame.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            Text::with_baseline(line, Point::new(0, row as i32 * ROW_PITCH_PX), style, Baseline::Top)
                .draw(&mut self.panel)
                .map_err(|_| Error::Display)?;
        }
        self.panel.flush().map_err(|_| Error::Display)
    }
}

use log::warn;

use crate::chip::{
    chip8::{
        constants::{CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_SIZE, CHIP8_DISPLAY_WIDTH},
        Chip8,
    },
    Chip, ChipWithCursiveDisplay,
};

use cursive::{
    theme::{BaseColor, Color, ColorStyle},
    view::View,
    CbSink, Printer, Vec2,
};

/// Name under which the display view is registered in the cursive tree.
pub const DISPLAY_VIEW_NAME: &str = "chip8-display";

/// Represents the display of the Chip 8
pub struct Display {
    pixels: [bool; CHIP8_DISPLAY_SIZE],
}

impl Display {
    /// Creates a new display from a slice.
    ///
    /// # Panics
    /// In case `pixels` does not hold exactly one entry per pixel.
    pub fn new(pixels: &[bool]) -> Self {
        let mut display = Display {
            pixels: [false; CHIP8_DISPLAY_SIZE],
        };
        display.set_pixels(pixels);
        display
    }

    /// Replaces the shown frame.
    ///
    /// # Panics
    /// In case `pixels` does not hold exactly one entry per pixel.
    pub fn set_pixels(&mut self, pixels: &[bool]) {
        assert_eq!(pixels.len(), CHIP8_DISPLAY_SIZE);
        self.pixels.copy_from_slice(pixels);
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new(&[false; CHIP8_DISPLAY_SIZE])
    }
}

/// Implements cursive::view::View for Display to enable drawing it
/// as a View out of the box.
impl View for Display {
    fn draw(&self, printer: &Printer) {
        printer.with_color(
            ColorStyle::new(Color::Dark(BaseColor::Black), Color::RgbLowRes(0, 0, 0)),
            |printer| {
                for x in 0..CHIP8_DISPLAY_WIDTH {
                    for y in 0..CHIP8_DISPLAY_HEIGHT {
                        if self.pixels[x + CHIP8_DISPLAY_WIDTH * y] {
                            printer.print((x, y), " ");
                        }
                    }
                }
            },
        );
    }

    fn required_size(&mut self, _: Vec2) -> Vec2 {
        Vec2 {
            x: CHIP8_DISPLAY_WIDTH,
            y: CHIP8_DISPLAY_HEIGHT,
        }
    }
}

impl ChipWithCursiveDisplay for Chip8 {
    fn update_ui(&mut self, gfx_sink: &CbSink) {
        let pixels = match self.take_frame() {
            Some(frame) => frame.to_vec(),
            None => return,
        };

        let sent = gfx_sink.send(Box::new(move |s: &mut cursive::Cursive| {
            s.call_on_name(DISPLAY_VIEW_NAME, |display: &mut Display| {
                display.set_pixels(&pixels)
            });
        }));
        if sent.is_err() {
            warn!("dropping frame, the UI is no longer running");
        }
    }
}

use crate::chip::{
    chip8::constants::{
        CHIP8_CHARSET, CHIP8_CHARSET_OFFSET, CHIP8_DISPLAY_HEIGHT, CHIP8_DISPLAY_SIZE,
        CHIP8_DISPLAY_WIDTH, CHIP8_MEMORY_SIZE,
    },
    Chip8Error,
};

/// Main memory of the CHIP-8 together with the framebuffer and the flag that
/// tells the presentation layer whether the framebuffer needs to be redrawn.
pub struct Memory {
    /// 4096 bytes of addressable memory. The charset lives at
    /// `CHIP8_CHARSET_OFFSET`, programs start at `CHIP8_PROGRAM_OFFSET`.
    bytes: [u8; CHIP8_MEMORY_SIZE],

    /// One flag per pixel, indexed as `y * 64 + x`.
    display: [bool; CHIP8_DISPLAY_SIZE],

    /// Set whenever the display changes, cleared when a frame is taken.
    draw: bool,
}

impl Memory {
    /// Constructs zeroed memory with the charset loaded and a blank display.
    pub fn new() -> Self {
        let mut bytes = [0; CHIP8_MEMORY_SIZE];
        let offset = CHIP8_CHARSET_OFFSET as usize;
        bytes[offset..offset + CHIP8_CHARSET.len()].copy_from_slice(&CHIP8_CHARSET);

        Memory {
            bytes,
            display: [false; CHIP8_DISPLAY_SIZE],
            draw: false,
        }
    }

    pub fn read_byte(&self, address: u16) -> Result<u8, Chip8Error> {
        self.bytes
            .get(address as usize)
            .copied()
            .ok_or(Chip8Error::Address {
                address: address as usize,
            })
    }

    pub fn write_byte(&mut self, address: u16, value: u8) -> Result<(), Chip8Error> {
        let byte = self
            .bytes
            .get_mut(address as usize)
            .ok_or(Chip8Error::Address {
                address: address as usize,
            })?;
        *byte = value;
        Ok(())
    }

    /// Reads the big-endian word starting at `address`.
    pub fn read_word(&self, address: u16) -> Result<u16, Chip8Error> {
        let high = self.read_byte(address)?;
        let low = self.read_byte(address.checked_add(1).ok_or(Chip8Error::Address {
            address: address as usize + 1,
        })?)?;
        Ok(u16::from_be_bytes([high, low]))
    }

    /// Copies `data` into memory starting at `offset`. Nothing is written if
    /// `data` does not fit.
    pub fn load(&mut self, offset: u16, data: &[u8]) -> Result<(), Chip8Error> {
        let start = offset as usize;
        if start > CHIP8_MEMORY_SIZE {
            return Err(Chip8Error::Address { address: start });
        }
        let max = CHIP8_MEMORY_SIZE - start;
        if data.len() > max {
            return Err(Chip8Error::Load {
                size: data.len(),
                max,
            });
        }
        self.bytes[start..start + data.len()].copy_from_slice(data);
        Ok(())
    }

    pub fn clear_display(&mut self) {
        self.display = [false; CHIP8_DISPLAY_SIZE];
        self.draw = true;
    }

    /// Flips the pixel at (`x`, `y`) and returns whether it was set before.
    /// Coordinates past the screen edge wrap around.
    pub fn toggle_pixel(&mut self, x: usize, y: usize) -> bool {
        let position =
            (x % CHIP8_DISPLAY_WIDTH) + (y % CHIP8_DISPLAY_HEIGHT) * CHIP8_DISPLAY_WIDTH;
        let was_set = self.display[position];
        self.display[position] = !was_set;
        self.draw = true;
        was_set
    }

    pub fn request_redraw(&mut self) {
        self.draw = true;
    }

    pub fn frame(&self) -> &[bool] {
        &self.display
    }

    pub fn redraw_needed(&self) -> bool {
        self.draw
    }

    /// Returns the display if it changed since the last call.
    pub fn take_frame(&mut self) -> Option<&[bool]> {
        if !self.draw {
            return None;
        }
        self.draw = false;
        Some(&self.display)
    }
}

impl Default for Memory {
    fn default() -> Self {
        Memory::new()
    }
}

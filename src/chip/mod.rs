pub mod chip8;
mod error;

pub use error::Chip8Error;

use cursive::CbSink;

/// The interface a host driver uses to run a chip. The driver owns the chip
/// and calls `step` once per scheduling tick, feeding input in between and
/// picking up frames whenever the chip reports a change.
pub trait Chip {
    /// The type used to address a single input pin (i.e., a key).
    type PinAddress;

    /// The error reported when a step or a program load fails.
    type Error;

    /// Copies `program` into main memory at the program start address and
    /// returns the number of bytes loaded.
    fn load_program(&mut self, program: &[u8]) -> Result<usize, Self::Error>;

    /// Advances the chip by one timer tick and one fetch-decode-execute cycle.
    fn step(&mut self) -> Result<(), Self::Error>;

    /// Returns the current frame if it changed since the last call and clears
    /// the redraw flag.
    fn take_frame(&mut self) -> Option<&[bool]>;

    /// Sets the state of a single input pin.
    fn set_key(&mut self, pin: Self::PinAddress, pressed: bool);

    /// Releases all input pins.
    fn reset_keys(&mut self);

    /// The current value of the sound timer. A nonzero value means a tone
    /// should be audible.
    fn sound_timer(&self) -> u8;
}

/// A chip whose output can be pushed to a cursive UI.
pub trait ChipWithCursiveDisplay {
    /// Sends the current frame to the UI behind `gfx_sink` if it changed.
    fn update_ui(&mut self, gfx_sink: &CbSink);
}

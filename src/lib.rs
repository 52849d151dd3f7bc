//! An interpreter for the CHIP-8 instruction set. The implementation follows the instruction
//! set described [here](https://en.wikipedia.org/wiki/CHIP-8#Opcode_table). Every memory access,
//! stack operation and instruction decode is checked; a malformed program halts the machine
//! with a [`chip::Chip8Error`] instead of corrupting its state.
//!
//! For graphical output the bundled text UI relies on the cursive text user interface library.
pub mod chip;
